//! Configuration management for the board client.
//!
//! Loads configuration from ${BOARD_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "BOARD_API_URL";

/// Which backend the Auth Gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AuthBackendKind {
    /// Custom REST auth endpoints next to the content API
    #[default]
    Rest,
    /// Managed identity provider (Cognito user pool)
    IdentityProvider,
}

impl AuthBackendKind {
    pub fn id(&self) -> &'static str {
        match self {
            AuthBackendKind::Rest => "rest",
            AuthBackendKind::IdentityProvider => "identity-provider",
        }
    }

    pub fn from_id(id: &str) -> Option<AuthBackendKind> {
        match id.trim().to_lowercase().as_str() {
            "rest" => Some(AuthBackendKind::Rest),
            "identity-provider" | "cognito" | "idp" => Some(AuthBackendKind::IdentityProvider),
            _ => None,
        }
    }
}

/// `[auth]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub backend: AuthBackendKind,
    pub rest_prefix: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend: AuthBackendKind::Rest,
            rest_prefix: "/api/v1/auth".to_string(),
        }
    }
}

/// `[identity_provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityProviderConfig {
    pub region: String,
    pub user_pool_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub endpoint: Option<String>,
}

impl Default for IdentityProviderConfig {
    fn default() -> Self {
        Self {
            region: "ap-northeast-2".to_string(),
            user_pool_id: None,
            client_id: None,
            client_secret: None,
            endpoint: None,
        }
    }
}

impl IdentityProviderConfig {
    /// Explicit endpoint if set, otherwise the regional Cognito endpoint.
    pub fn effective_endpoint(&self) -> String {
        match self.endpoint.as_deref().map(str::trim) {
            Some(endpoint) if !endpoint.is_empty() => endpoint.trim_end_matches('/').to_string(),
            _ => format!("https://cognito-idp.{}.amazonaws.com", self.region.trim()),
        }
    }

    pub fn effective_client_secret(&self) -> Option<&str> {
        self.client_secret
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// `[log]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the REST content API
    pub api_base_url: String,

    /// Per-request timeout in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Page size of the board listing
    pub posts_per_page: usize,

    pub auth: AuthConfig,

    pub identity_provider: IdentityProviderConfig,

    pub log: LogConfig,

    /// Base URL given on the command line. Wins over the environment.
    #[serde(skip)]
    pub api_url_override: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: Self::DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: 0,
            posts_per_page: Self::DEFAULT_POSTS_PER_PAGE,
            auth: AuthConfig::default(),
            identity_provider: IdentityProviderConfig::default(),
            log: LogConfig::default(),
            api_url_override: None,
        }
    }
}

/// Returns the default config template with comments.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

/// Merges user config values into the default template.
///
/// New comments/sections from the template are always present, user values win.
fn merge_with_template(user_config: &str) -> Result<String> {
    use toml_edit::DocumentMut;

    let mut doc: DocumentMut = default_config_template()
        .parse()
        .context("Failed to parse default config template")?;
    let user_doc: DocumentMut = user_config.parse().context("Failed to parse user config")?;

    merge_items(doc.as_table_mut(), user_doc.as_table());

    Ok(doc.to_string())
}

/// Recursively merges items from source table into target table.
fn merge_items(target: &mut toml_edit::Table, source: &toml_edit::Table) {
    use toml_edit::Item;

    for (key, value) in source {
        match value {
            Item::Value(v) => {
                target[key] = Item::Value(v.clone());
            }
            Item::Table(src_table) => {
                if let Some(Item::Table(target_table)) = target.get_mut(key) {
                    merge_items(target_table, src_table);
                } else {
                    target[key] = Item::Table(src_table.clone());
                }
            }
            Item::ArrayOfTables(src_arr) => {
                target[key] = Item::ArrayOfTables(src_arr.clone());
            }
            Item::None => {}
        }
    }
}

pub mod paths {
    //! Path resolution for board configuration and credentials.
    //!
    //! BOARD_HOME resolution order:
    //! 1. BOARD_HOME environment variable (if set)
    //! 2. ~/.config/board (default)

    use std::path::PathBuf;

    /// Returns the board home directory.
    pub fn board_home() -> PathBuf {
        if let Ok(home) = std::env::var("BOARD_HOME")
            && !home.trim().is_empty()
        {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("board"))
            .unwrap_or_else(|| PathBuf::from(".board"))
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        board_home().join("config.toml")
    }

    /// Returns the path to the credential file holding the bearer token.
    pub fn credentials_path() -> PathBuf {
        board_home().join("credentials.json")
    }
}

impl Config {
    const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
    const DEFAULT_POSTS_PER_PAGE: usize = 10;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Saves only `auth.backend` to a specific config file path.
    ///
    /// Creates the file with the default template if it doesn't exist,
    /// otherwise merges user values into the latest template.
    pub fn save_auth_backend_to(path: &Path, backend: AuthBackendKind) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            let user_config = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            merge_with_template(&user_config)?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        doc["auth"]["backend"] = value(backend.id());

        Self::write_config(path, &doc.to_string())
    }

    /// Resolves the content API base URL with precedence:
    /// command line > env > config > default.
    pub fn effective_api_base_url(&self) -> Result<String> {
        let candidate = self
            .api_url_override
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(API_URL_ENV)
                    .ok()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
            })
            .or_else(|| {
                let trimmed = self.api_base_url.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| Self::DEFAULT_API_BASE_URL.to_string());

        url::Url::parse(&candidate).with_context(|| format!("Invalid API base URL: {candidate}"))?;
        Ok(candidate.trim_end_matches('/').to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }

    pub fn effective_posts_per_page(&self) -> usize {
        if self.posts_per_page == 0 {
            Self::DEFAULT_POSTS_PER_PAGE
        } else {
            self.posts_per_page
        }
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}
