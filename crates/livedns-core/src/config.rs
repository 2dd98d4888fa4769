//! Configuration types for the LiveDNS updater
//!
//! The configuration file is JSON:
//!
//! ```json
//! {
//!   "username": "account",
//!   "password": "secret",
//!   "domain": "example.com",
//!   "requiredHosts": ["", "www", "vpn"],
//!   "ttl": 14400,
//!   "ipServiceUrl": "https://api.ipify.org"
//! }
//! ```
//!
//! `ttl` and `ipServiceUrl` are optional. Everything else is required; a
//! missing field is a startup error, reported before any network call.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// TTL given to A records synthesized for hosts missing from the zone
pub const DEFAULT_TTL: u32 = 14400;

/// Echo service used to discover the public address
pub const DEFAULT_IP_SERVICE_URL: &str = "https://api.ipify.org";

/// Directory under the user's home that holds config and state
pub const CONFIG_DIR_NAME: &str = ".liveDnsUpdater";

/// Config file name, both in the home directory and the working directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// IP state file name inside [`CONFIG_DIR_NAME`]
pub const STATE_FILE_NAME: &str = ".iprecord";

/// Account credentials sent with every provider call
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    /// ⚠️ NEVER log this value
    pub password: String,
    /// Zone (domain) being managed, e.g. `example.com`
    pub domain: String,
}

impl Credentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            domain: domain.into(),
        }
    }
}

// Custom Debug implementation that hides the password
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Immutable configuration for a single run
///
/// Built once at startup and handed to the run controller; nothing reads
/// configuration from ambient state after that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Provider credentials and managed domain
    pub credentials: Credentials,

    /// Short host names that must resolve to the current IP.
    /// `""` denotes the zone apex.
    pub required_hosts: Vec<String>,

    /// TTL for synthesized records
    pub default_ttl: u32,

    /// Public IP echo service
    pub ip_service_url: String,
}

impl RunConfig {
    /// Create a configuration with default TTL and IP service
    pub fn new(credentials: Credentials, required_hosts: Vec<String>) -> Self {
        Self {
            credentials,
            required_hosts,
            default_ttl: DEFAULT_TTL,
            ip_service_url: DEFAULT_IP_SERVICE_URL.to_string(),
        }
    }

    /// Set the TTL used for synthesized records
    pub fn with_default_ttl(mut self, ttl: u32) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Set the public IP echo service
    pub fn with_ip_service_url(mut self, url: impl Into<String>) -> Self {
        self.ip_service_url = url.into();
        self
    }

    /// The managed domain
    pub fn domain(&self) -> &str {
        &self.credentials.domain
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        let mut missing = Vec::new();
        if self.credentials.username.is_empty() {
            missing.push("username");
        }
        if self.credentials.password.is_empty() {
            missing.push("password");
        }
        if self.credentials.domain.is_empty() {
            missing.push("domain");
        }
        if !missing.is_empty() {
            return Err(crate::Error::config(format!(
                "config must contain a non-empty {}",
                missing.join("/")
            )));
        }

        if self.default_ttl == 0 {
            return Err(crate::Error::config("ttl must be greater than 0"));
        }

        if !self.ip_service_url.starts_with("https://")
            && !self.ip_service_url.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "ipServiceUrl must use HTTP or HTTPS scheme. Got: {}",
                self.ip_service_url
            )));
        }

        Ok(())
    }

    /// Parse a configuration file's contents
    pub fn from_json_str(content: &str) -> Result<Self, crate::Error> {
        let file: ConfigFile = serde_json::from_str(content)
            .map_err(|e| crate::Error::config(format!("Failed to parse config: {}", e)))?;
        file.into_run_config()
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> Result<Self, crate::Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }
}

/// On-disk configuration format
///
/// Every field is optional at the serde level so that a missing field is
/// reported by name instead of as a generic parse error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    username: Option<String>,
    password: Option<String>,
    domain: Option<String>,
    required_hosts: Option<Vec<String>>,
    ttl: Option<u32>,
    ip_service_url: Option<String>,
}

impl ConfigFile {
    fn into_run_config(self) -> Result<RunConfig, crate::Error> {
        let present = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

        let mut missing = Vec::new();
        if !present(&self.username) {
            missing.push("username");
        }
        if !present(&self.password) {
            missing.push("password");
        }
        if !present(&self.domain) {
            missing.push("domain");
        }
        if self.required_hosts.is_none() {
            missing.push("requiredHosts");
        }
        if !missing.is_empty() {
            return Err(crate::Error::config(format!(
                "please ensure config file contains {}",
                missing.join("/")
            )));
        }

        let credentials = Credentials::new(
            self.username.unwrap_or_default(),
            self.password.unwrap_or_default(),
            self.domain.unwrap_or_default(),
        );

        let mut config = RunConfig::new(credentials, self.required_hosts.unwrap_or_default());
        if let Some(ttl) = self.ttl {
            config = config.with_default_ttl(ttl);
        }
        if let Some(url) = self.ip_service_url {
            config = config.with_ip_service_url(url);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Where a configuration file was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Path given explicitly by the operator
    Explicit(PathBuf),
    /// `config.json` in the working directory (works, but discouraged)
    WorkingDirectory(PathBuf),
    /// `<home>/.liveDnsUpdater/config.json`
    Home(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Explicit(path)
            | ConfigLocation::WorkingDirectory(path)
            | ConfigLocation::Home(path) => path,
        }
    }
}

/// `<home>/.liveDnsUpdater`
pub fn app_dir(home: &Path) -> PathBuf {
    home.join(CONFIG_DIR_NAME)
}

/// `<home>/.liveDnsUpdater/.iprecord`
pub fn default_state_path(home: &Path) -> PathBuf {
    app_dir(home).join(STATE_FILE_NAME)
}

/// Find the configuration file
///
/// Search order:
/// 1. `explicit`, which must exist
/// 2. `config.json` in `working_dir`
/// 3. `config.json` in `<home>/.liveDnsUpdater`
pub fn locate_config_file(
    explicit: Option<&Path>,
    working_dir: &Path,
    home: Option<&Path>,
) -> Result<ConfigLocation, crate::Error> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(ConfigLocation::Explicit(path.to_path_buf()));
        }
        return Err(crate::Error::config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }

    let local = working_dir.join(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(ConfigLocation::WorkingDirectory(local));
    }

    let expected = match home {
        Some(home) => {
            let path = app_dir(home).join(CONFIG_FILE_NAME);
            if path.is_file() {
                return Ok(ConfigLocation::Home(path));
            }
            path.display().to_string()
        }
        None => format!("~/{}/{}", CONFIG_DIR_NAME, CONFIG_FILE_NAME),
    };

    Err(crate::Error::config(format!(
        "could not find {}. Please ensure it exists at {}",
        CONFIG_FILE_NAME, expected
    )))
}
