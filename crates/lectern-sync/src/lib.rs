//! Lectern Sync Library
//!
//! Client-side upload orchestration and materials synchronization: intake
//! screening, the upload queue and its item state machine, bounded-concurrency
//! scheduling of the three-step upload protocol, the materials store, optimistic
//! visibility changes and the owner/type projection.

pub mod events;
pub mod filter;
pub mod intake;
pub mod item;
pub mod optimistic;
pub mod pipeline;
pub mod queue;
pub mod scheduler;
pub mod session;
pub mod store;

pub use events::{UploadEvent, UploadEventSender};
pub use filter::{MaterialFilter, OwnerFilter, TypeFilter};
pub use intake::{load_paths, screen, IntakeRejection, IntakeReport, PendingFile};
pub use item::{TransitionError, UploadItem, UploadItemId, UploadStatus};
pub use optimistic::{optimistic_toggle, ToggleOutcome, ToggleSlot, ToggleState};
pub use pipeline::run_protocol;
pub use queue::UploadQueue;
pub use scheduler::run_scheduled;
pub use session::{MaterialsSession, UploadSummary};
pub use store::MaterialsStore;
