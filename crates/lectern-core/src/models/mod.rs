pub mod material;
pub mod upload;

pub use material::{CourseId, Material, MaterialId, MaterialSource, UserId, Visibility};
pub use upload::{
    DeleteMaterialRequest, FileDescriptor, FormFields, MaterialAction, MaterialEnvelope,
    MaterialListResponse, PresignedUpload,
};
