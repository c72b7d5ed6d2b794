use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Formatter, Result as FmtResult};

use super::material::{CourseId, Material, MaterialId, Visibility};

/// Name, size and media type of a file picked for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    pub media_type: String,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, size: u64, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            media_type: media_type.into(),
        }
    }
}

/// Body of `POST /material`. The `action` tag selects the server operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MaterialAction {
    RequestUpload {
        course_id: CourseId,
        filename: String,
        file_type: String,
        visibility: Visibility,
    },
    ConfirmUpload {
        storage_key: String,
        course_id: CourseId,
        filename: String,
        file_type: String,
        visibility: Visibility,
    },
    UpdateVisibility {
        material_id: MaterialId,
        visibility: Visibility,
    },
}

/// Direct-to-storage upload authorization returned by `request_upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUpload {
    /// Storage endpoint the multipart form is posted to
    pub upload_url: String,
    /// Form fields that must precede the file part
    #[serde(default)]
    pub fields: FormFields,
    /// Opaque key handed back on confirm
    #[serde(alias = "s3_key")]
    pub storage_key: String,
}

/// Storage form fields, kept in the order the server listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FormFields(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a FormFields {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for FormFields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FormFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = FormFields;

            fn expecting(&self, f: &mut Formatter<'_>) -> FmtResult {
                write!(f, "a map of form field names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<FormFields, A::Error> {
                let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    fields.push((key, value));
                }
                Ok(FormFields(fields))
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Response of `confirm_upload` (and of `update_visibility` on servers that echo it).
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialEnvelope {
    pub material: Material,
}

/// Response of `GET /material?course_id=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialListResponse {
    #[serde(default)]
    pub materials: Vec<Material>,
}

/// Body of `DELETE /material`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteMaterialRequest {
    pub material_id: MaterialId,
    pub course_id: CourseId,
}
