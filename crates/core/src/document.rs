//! The two independent document-submission tracks.

use crate::error::{Error, Result};
use crate::schema::Column;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Document kind a stockist submits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentKind {
    Aws,
    Sss,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Aws, DocumentKind::Sss];

    /// Canonical upper-case name, also used as the upload folder name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aws => "AWS",
            Self::Sss => "SSS",
        }
    }

    pub fn status_column(self) -> Column {
        match self {
            Self::Aws => Column::AwsStatus,
            Self::Sss => Column::SssStatus,
        }
    }

    pub fn file_column(self) -> Column {
        match self {
            Self::Aws => Column::AwsFile,
            Self::Sss => Column::SssFile,
        }
    }

    pub fn submitted_by_column(self) -> Column {
        match self {
            Self::Aws => Column::AwsSubmittedBy,
            Self::Sss => Column::SssSubmittedBy,
        }
    }

    /// Multipart field carrying the uploaded file.
    pub fn form_field(self) -> &'static str {
        match self {
            Self::Aws => "aws_files",
            Self::Sss => "sss_files",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = Error;

    /// Parse a kind name. Matching is exact, like the upload folder names.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "AWS" => Ok(Self::Aws),
            "SSS" => Ok(Self::Sss),
            other => Err(Error::InvalidDocumentKind(other.to_string())),
        }
    }
}
