//! Accepted media types
//!
//! The nine document, text, image and spreadsheet formats the materials
//! endpoint accepts. Anything else is dropped at intake.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcceptedMediaType {
    Pdf,
    Docx,
    Text,
    Jpeg,
    Png,
    Gif,
    Svg,
    Xlsx,
    Csv,
}

impl AcceptedMediaType {
    pub const ALL: [AcceptedMediaType; 9] = [
        AcceptedMediaType::Pdf,
        AcceptedMediaType::Docx,
        AcceptedMediaType::Text,
        AcceptedMediaType::Jpeg,
        AcceptedMediaType::Png,
        AcceptedMediaType::Gif,
        AcceptedMediaType::Svg,
        AcceptedMediaType::Xlsx,
        AcceptedMediaType::Csv,
    ];

    pub fn mime(&self) -> &'static str {
        match self {
            AcceptedMediaType::Pdf => "application/pdf",
            AcceptedMediaType::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            AcceptedMediaType::Text => "text/plain",
            AcceptedMediaType::Jpeg => "image/jpeg",
            AcceptedMediaType::Png => "image/png",
            AcceptedMediaType::Gif => "image/gif",
            AcceptedMediaType::Svg => "image/svg+xml",
            AcceptedMediaType::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            AcceptedMediaType::Csv => "text/csv",
        }
    }

    /// Short display label (PDF, DOCX, ...)
    pub fn label(&self) -> &'static str {
        match self {
            AcceptedMediaType::Pdf => "PDF",
            AcceptedMediaType::Docx => "DOCX",
            AcceptedMediaType::Text => "TXT",
            AcceptedMediaType::Jpeg => "JPG",
            AcceptedMediaType::Png => "PNG",
            AcceptedMediaType::Gif => "GIF",
            AcceptedMediaType::Svg => "SVG",
            AcceptedMediaType::Xlsx => "XLSX",
            AcceptedMediaType::Csv => "CSV",
        }
    }

    /// Exact match on the MIME string; no parameter or case folding.
    pub fn from_mime(mime: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.mime() == mime)
    }

    /// Map a file extension (without the dot, any case) to its media type.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "pdf" => Some(AcceptedMediaType::Pdf),
            "docx" => Some(AcceptedMediaType::Docx),
            "txt" => Some(AcceptedMediaType::Text),
            "jpg" | "jpeg" => Some(AcceptedMediaType::Jpeg),
            "png" => Some(AcceptedMediaType::Png),
            "gif" => Some(AcceptedMediaType::Gif),
            "svg" => Some(AcceptedMediaType::Svg),
            "xlsx" => Some(AcceptedMediaType::Xlsx),
            "csv" => Some(AcceptedMediaType::Csv),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

impl FromStr for AcceptedMediaType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_mime(s).ok_or_else(|| anyhow::anyhow!("Unsupported media type: {}", s))
    }
}

impl Display for AcceptedMediaType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.mime())
    }
}

/// Label for any MIME string; `FILE` for types outside the accepted set.
pub fn media_label(mime: &str) -> &'static str {
    AcceptedMediaType::from_mime(mime)
        .map(|t| t.label())
        .unwrap_or("FILE")
}

pub fn is_accepted(mime: &str) -> bool {
    AcceptedMediaType::from_mime(mime).is_some()
}
