//! Configuration types shared across crates.

use crate::access::{ALL_DIVISIONS, AdminIdentity, AdminRole, DivisionScope};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Maximum accepted request body, which bounds a single document upload.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Name of the session cookie.
    #[serde(default = "default_session_cookie")]
    pub session_cookie: String,
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_session_cookie() -> String {
    "portal_session".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
            max_upload_bytes: default_max_upload_bytes(),
            session_cookie: default_session_cookie(),
        }
    }
}

impl ServerConfig {
    /// Replace the port of `bind`, keeping its host.
    pub fn set_port(&mut self, port: u16) {
        let host = self
            .bind
            .rsplit_once(':')
            .map(|(host, _)| host)
            .unwrap_or(&self.bind);
        self.bind = format!("{host}:{port}");
    }
}

/// Filesystem locations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathsConfig {
    /// The stockist master spreadsheet.
    #[serde(default = "default_master_table")]
    pub master_table: PathBuf,
    /// Root of the `<division>/<state>/<kind>` upload tree.
    #[serde(default = "default_upload_root")]
    pub upload_root: PathBuf,
    /// Scratch directory for archives being streamed.
    #[serde(default = "default_scratch_dir")]
    pub scratch_dir: PathBuf,
}

fn default_master_table() -> PathBuf {
    PathBuf::from("./data/stockist_master.xlsx")
}

fn default_upload_root() -> PathBuf {
    PathBuf::from("./data/uploads")
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("./data/temp_zips")
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            master_table: default_master_table(),
            upload_root: default_upload_root(),
            scratch_dir: default_scratch_dir(),
        }
    }
}

impl PathsConfig {
    /// All paths rooted under `root`.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            master_table: root.join("stockist_master.xlsx"),
            upload_root: root.join("uploads"),
            scratch_dir: root.join("temp_zips"),
        }
    }
}

/// One administrator credential.
///
/// WARNING: passwords are held and compared in plaintext.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    /// Bound division, or `ALL`.
    pub division: String,
    pub role: AdminRole,
}

impl AdminAccount {
    fn new(email: &str, password: &str, division: &str, role: AdminRole) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            division: division.to_string(),
            role,
        }
    }

    pub fn identity(&self) -> AdminIdentity {
        AdminIdentity {
            email: self.email.to_lowercase(),
            division: DivisionScope::parse(&self.division),
            role: self.role,
        }
    }
}

/// Administrator credential table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdminConfig {
    #[serde(default = "default_admin_accounts")]
    pub accounts: Vec<AdminAccount>,
}

fn default_admin_accounts() -> Vec<AdminAccount> {
    let division = |name: &str, password: &str| {
        AdminAccount::new(
            &format!("{}.admin@linuxlabs.com", name.to_lowercase()),
            password,
            name,
            AdminRole::Division,
        )
    };
    vec![
        AdminAccount::new("admin@linuxlabs.com", "admin123", ALL_DIVISIONS, AdminRole::Main),
        AdminAccount::new(
            "download.admin@linuxlabs.com",
            "download123",
            ALL_DIVISIONS,
            AdminRole::Download,
        ),
        division("IMPERIA", "imperia123"),
        division("INFINA", "infina123"),
        division("INTEGRA", "integra123"),
        division("DERMANEX", "dermanex123"),
        division("DERMASCIENCE", "dermascience123"),
        division("NUTRIMAX", "nutrimax123"),
        division("META", "meta123"),
    ]
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            accounts: default_admin_accounts(),
        }
    }
}

impl AdminConfig {
    /// Check an email/password pair against the table.
    ///
    /// The email is trimmed and compared case-insensitively; the password is
    /// trimmed and compared exactly.
    pub fn authenticate(&self, email: &str, password: &str) -> Option<AdminIdentity> {
        let email = email.trim().to_lowercase();
        let password = password.trim();
        self.accounts
            .iter()
            .find(|account| account.email.to_lowercase() == email && account.password == password)
            .map(AdminAccount::identity)
    }

    /// Validate account invariants.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for account in &self.accounts {
            let email = account.email.trim().to_lowercase();
            if email.is_empty() {
                return Err("admin.accounts entry has an empty email".to_string());
            }
            if !seen.insert(email.clone()) {
                return Err(format!("admin.accounts has duplicate email {email}"));
            }
            let wildcard = account.division.eq_ignore_ascii_case(ALL_DIVISIONS);
            match account.role {
                AdminRole::Division if wildcard || account.division.trim().is_empty() => {
                    return Err(format!(
                        "admin {email} has role division but no concrete division"
                    ));
                }
                AdminRole::Main | AdminRole::Download if !wildcard => {
                    return Err(format!(
                        "admin {email} has role {} but division {} (expected {ALL_DIVISIONS})",
                        account.role, account.division
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub admin: AdminConfig,
}

impl AppConfig {
    /// Create a test configuration with every path under `root`.
    ///
    /// **For testing only.** Uses the built-in admin table.
    pub fn for_testing(root: impl AsRef<Path>) -> Self {
        Self {
            server: ServerConfig::default(),
            paths: PathsConfig::under(root),
            admin: AdminConfig::default(),
        }
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.server.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes cannot be 0".to_string());
        }
        if self.server.session_cookie.trim().is_empty() {
            return Err("server.session_cookie cannot be empty".to_string());
        }
        if lexical_absolute(&self.paths.scratch_dir)
            .starts_with(lexical_absolute(&self.paths.upload_root))
        {
            return Err("paths.scratch_dir cannot be inside paths.upload_root".to_string());
        }
        self.admin.validate()
    }
}

/// Absolute form of `path` with `.` and `..` folded away, without touching
/// the filesystem.
fn lexical_absolute(path: &Path) -> PathBuf {
    let base = if path.is_absolute() {
        PathBuf::new()
    } else {
        std::env::current_dir().unwrap_or_default()
    };
    let mut out = PathBuf::new();
    for component in base.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}
