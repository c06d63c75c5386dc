//! Caller identities and the division/role access policy.

use crate::error::{Error, Result};
use crate::filename::folder_name;
use crate::table::{StockistRecord, division_matches};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wildcard division bound to main and download administrators.
pub const ALL_DIVISIONS: &str = "ALL";

/// Administrator role.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Sees and edits every division.
    Main,
    /// Sees and edits a single bound division.
    Division,
    /// Reaches only the bulk-download surface.
    Download,
}

impl AdminRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Division => "division",
            Self::Download => "download",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "main" => Ok(Self::Main),
            "division" => Ok(Self::Division),
            "download" => Ok(Self::Download),
            other => Err(Error::InvalidRole(other.to_string())),
        }
    }
}

/// Which divisions an administrator is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DivisionScope {
    All,
    Only(String),
}

impl DivisionScope {
    /// Parse a configured division; `ALL` (any case) is the wildcard.
    pub fn parse(division: &str) -> Self {
        if division.eq_ignore_ascii_case(ALL_DIVISIONS) {
            Self::All
        } else {
            Self::Only(division.to_string())
        }
    }

    pub fn permits(&self, division: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(bound) => division_matches(bound, division),
        }
    }

    /// Like [`permits`](Self::permits), but for an upload-tree folder name.
    ///
    /// Folder names are sanitized, so both sides are compared in sanitized form.
    pub fn permits_folder(&self, folder: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(bound) => {
                division_matches(&folder_name(bound), &folder_name(folder))
            }
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_DIVISIONS,
            Self::Only(bound) => bound,
        }
    }
}

/// A signed-in administrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminIdentity {
    pub email: String,
    pub division: DivisionScope,
    pub role: AdminRole,
}

impl AdminIdentity {
    /// Edit dashboard and row mutations are closed to download admins.
    pub fn can_edit(&self) -> bool {
        self.role != AdminRole::Download
    }

    /// Everything-at-once archive is limited to main and download admins.
    pub fn can_download_all(&self) -> bool {
        matches!(self.role, AdminRole::Main | AdminRole::Download)
    }

    /// Whether rows and files of `division` are reachable.
    ///
    /// Only division admins are scoped; main and download admins reach all divisions.
    pub fn can_access_division(&self, division: &str) -> bool {
        match self.role {
            AdminRole::Division => self.division.permits(division),
            AdminRole::Main | AdminRole::Download => true,
        }
    }

    /// Whether the upload-tree folder of `division` is reachable.
    pub fn can_access_folder(&self, division: &str) -> bool {
        match self.role {
            AdminRole::Division => self.division.permits_folder(division),
            AdminRole::Main | AdminRole::Download => true,
        }
    }

    /// Whether this admin may edit the given row.
    pub fn can_edit_record(&self, record: &StockistRecord) -> bool {
        self.can_edit() && self.can_access_division(&record.division)
    }

    /// Upload-tree divisions listed on the downloads page.
    pub fn folder_scope(&self) -> DivisionScope {
        match self.role {
            AdminRole::Division => self.division.clone(),
            AdminRole::Main | AdminRole::Download => DivisionScope::All,
        }
    }

    /// Division the table view is forced to, if any.
    pub fn forced_division(&self) -> Option<&str> {
        match (&self.role, &self.division) {
            (AdminRole::Division, DivisionScope::Only(bound)) => Some(bound),
            _ => None,
        }
    }
}

/// Who is making a request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Principal {
    #[default]
    Anonymous,
    /// Regional manager identified by a routing email (stored lowercased).
    Regional { email: String },
    Admin(AdminIdentity),
}

impl Principal {
    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin(_))
    }

    pub fn admin(&self) -> Option<&AdminIdentity> {
        match self {
            Self::Admin(admin) => Some(admin),
            _ => None,
        }
    }

    /// Email recorded as the submitter of uploads.
    pub fn email(&self) -> Option<&str> {
        match self {
            Self::Anonymous => None,
            Self::Regional { email } => Some(email),
            Self::Admin(admin) => Some(&admin.email),
        }
    }

    /// Whether this caller may upload documents for `record`.
    pub fn can_submit_for(&self, record: &StockistRecord) -> bool {
        match self {
            Self::Anonymous => false,
            Self::Regional { email } => record.routes_to(email),
            Self::Admin(admin) => admin.can_edit_record(record),
        }
    }

    /// Whether this caller may fetch a stored file under `division`.
    pub fn can_read_division(&self, division: &str) -> bool {
        match self {
            Self::Anonymous => false,
            Self::Regional { .. } => true,
            Self::Admin(admin) => admin.can_access_folder(division),
        }
    }
}
