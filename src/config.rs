use base64::{prelude::BASE64_STANDARD, Engine};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to decode login user mapping: {0}")]
    MapDecode(#[from] base64::DecodeError),

    #[error("Login user mapping is not valid UTF-8: {0}")]
    MapUtf8(#[from] std::string::FromUtf8Error),

    #[error("Failed to parse login user mapping: {0}")]
    MapParse(#[from] serde_json::Error),
}

/// Top-level configuration loaded from .pr-status.toml.
///
/// All fields are optional; the tool works with zero config and the usual
/// GitHub Actions environment variables win over file values.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// Target repository (owner/name). GITHUB_REPOSITORY wins.
    pub repository: Option<String>,

    /// Token the publisher uses for the authenticated push URL.
    /// GITHUB_TOKEN wins.
    pub token: Option<String>,

    /// Commit author for published updates. GITHUB_ACTOR wins.
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Project fields shown in the report, in column order.
    #[serde(default = "default_fields")]
    pub fields: Vec<String>,

    /// Reviewers whose approval alone marks a PR approved.
    #[serde(default)]
    pub required_reviewers: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            fields: default_fields(),
            required_reviewers: Vec::new(),
        }
    }
}

fn default_fields() -> Vec<String> {
    ["Status", "Priority", "Target Date", "Sprint"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Config {
    /// Load configuration from .pr-status.toml in the current directory,
    /// falling back to defaults when the file doesn't exist.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new(".pr-status.toml");
        if path.exists() {
            Self::load_from(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Target repository: GITHUB_REPOSITORY env var, then the config file.
    pub fn repository(&self) -> Option<String> {
        std::env::var("GITHUB_REPOSITORY")
            .ok()
            .filter(|r| !r.is_empty())
            .or_else(|| self.github.repository.clone())
    }

    pub fn token(&self) -> Option<String> {
        std::env::var("GITHUB_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or_else(|| self.github.token.clone())
    }

    /// Commit author, defaulting to the bot identity GitHub Actions uses.
    pub fn actor(&self) -> String {
        std::env::var("GITHUB_ACTOR")
            .ok()
            .filter(|a| !a.is_empty())
            .or_else(|| self.github.actor.clone())
            .unwrap_or_else(|| "github-actions".to_string())
    }
}

/// Mapping of reviewer logins to organization labels, decoded from the
/// base64 JSON in LOGIN_USERS_B64. Column order follows first appearance.
#[derive(Debug, Clone, Default)]
pub struct LoginMap {
    org_order: Vec<String>,
    by_login: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct LoginUsersFile {
    #[serde(default, rename = "loginUsers")]
    login_users: Vec<LoginUser>,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    #[serde(rename = "loginUser")]
    login_user: Option<String>,
    organization: Option<String>,
}

impl LoginMap {
    /// Read LOGIN_USERS_B64. A decode or parse failure is logged and yields
    /// an empty mapping so the run continues with only the `other` reviewer
    /// column.
    pub fn from_env() -> LoginMap {
        let Ok(encoded) = std::env::var("LOGIN_USERS_B64") else {
            warn!("LOGIN_USERS_B64 is not set");
            return LoginMap::default();
        };
        match Self::decode(&encoded) {
            Ok(map) => {
                debug!(
                    orgs = map.org_order.len(),
                    logins = map.by_login.len(),
                    "decoded login user mapping"
                );
                map
            }
            Err(err) => {
                error!(%err, "LOGIN_USERS_B64 decode failed");
                LoginMap::default()
            }
        }
    }

    pub fn decode(encoded: &str) -> Result<LoginMap, ConfigError> {
        let decoded = String::from_utf8(BASE64_STANDARD.decode(encoded.trim())?)?;
        let file: LoginUsersFile = serde_json::from_str(&decoded)?;

        let mut map = LoginMap::default();
        for item in file.login_users {
            let (Some(login), Some(org)) = (item.login_user, item.organization) else {
                continue;
            };
            if login.is_empty() || org.is_empty() {
                continue;
            }
            if !map.org_order.contains(&org) {
                map.org_order.push(org.clone());
            }
            map.by_login.insert(login, org);
        }
        Ok(map)
    }

    /// Reviewer column labels: every organization plus the trailing `other`.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = self.org_order.clone();
        columns.push("other".to_string());
        columns
    }

    /// Organization a login belongs to, or `other`.
    pub fn org_for(&self, login: &str) -> &str {
        self.by_login
            .get(login)
            .map(String::as_str)
            .unwrap_or("other")
    }
}
