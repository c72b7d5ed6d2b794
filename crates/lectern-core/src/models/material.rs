use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

pub type MaterialId = i64;
pub type CourseId = i64;
pub type UserId = i64;

/// Material visibility within a course
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Private,
}

impl Visibility {
    pub fn from_public(is_public: bool) -> Self {
        if is_public {
            Visibility::Public
        } else {
            Visibility::Private
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

impl FromStr for Visibility {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "private" => Ok(Visibility::Private),
            _ => Err(anyhow::anyhow!(
                "Invalid visibility: {} (expected public or private)",
                s
            )),
        }
    }
}

impl Display for Visibility {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Where a material came from: a user upload or server-side generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialSource {
    #[default]
    Upload,
    Generated,
}

/// Stored course file, as returned by the materials API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub name: String,
    /// Media type (MIME) of the stored file
    #[serde(rename = "file_type", default)]
    pub media_type: String,
    /// Time-limited download link; absent when the server could not sign one
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(rename = "uploaded_by")]
    pub owner_id: UserId,
    #[serde(rename = "source_type", default)]
    pub source: MaterialSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<CourseId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Set while a visibility change for this material is in flight
    #[serde(skip)]
    pub updating: bool,
}

impl Material {
    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_record() {
        let json = r#"{
            "id": 42,
            "name": "syllabus.pdf",
            "file_url": "https://bucket.s3.us-east-1.amazonaws.com/materials/abc.pdf",
            "file_type": "application/pdf",
            "source_type": "upload",
            "uploaded_by": 7,
            "course_id": 3,
            "visibility": "public",
            "created_at": "2025-01-10 09:00:00",
            "download_url": null
        }"#;

        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.id, 42);
        assert_eq!(material.media_type, "application/pdf");
        assert_eq!(material.owner_id, 7);
        assert_eq!(material.source, MaterialSource::Upload);
        assert!(material.is_public());
        assert!(material.download_url.is_none());
        assert!(!material.updating);
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let json = r#"{"id": 1, "name": "notes", "uploaded_by": 2}"#;
        let material: Material = serde_json::from_str(json).unwrap();
        assert_eq!(material.visibility, Visibility::Private);
        assert_eq!(material.source, MaterialSource::Upload);
        assert_eq!(material.course_id, None);
    }

    #[test]
    fn updating_flag_is_never_serialized() {
        let json = r#"{"id": 1, "name": "n", "uploaded_by": 2, "source_type": "generated"}"#;
        let mut material: Material = serde_json::from_str(json).unwrap();
        material.updating = true;
        let out = serde_json::to_value(&material).unwrap();
        assert!(out.get("updating").is_none());
        assert_eq!(out["source_type"], "generated");
        assert_eq!(out["uploaded_by"], 2);
    }

    #[test]
    fn visibility_parses_case_insensitively() {
        assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("private".parse::<Visibility>().unwrap(), Visibility::Private);
        assert!("hidden".parse::<Visibility>().is_err());
        assert_eq!(Visibility::from_public(true).to_string(), "public");
    }
}
