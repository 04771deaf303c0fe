//! Global eventlens configuration.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::backend::ImageTransform;
use crate::error::{EventLensError, EventLensResult};
use crate::storage_path;

static DEFAULT_BIND: &str = "127.0.0.1:4096";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;
static DEFAULT_BUCKET: &str = "event-media";
const DEFAULT_SIGNED_URL_EXPIRY_SECS: u64 = 60 * 60;

const TEMPLATE_HEADER: &str = "\
# eventlens configuration
#
# backend.url and backend.anon_key must be set before `eventlens serve`.

";

const ACCESS_HINTS: &str = "\
# How long an unlocked event stays unlocked. Visitor sessions live in memory
# and are dropped on restart; with a TTL they also expire after this much
# inactivity:
# grant_ttl_secs = 86400

# Limit password attempts per event:
# attempts_per_minute = 10
";

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_signed_url_expiry() -> u64 {
    DEFAULT_SIGNED_URL_EXPIRY_SECS
}

/// Configuration at ~/.config/eventlens/config.toml, overridable with
/// `EVENTLENS__<SECTION>__<KEY>` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct EventLensConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub access: AccessConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Largest accepted upload request
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Send the session cookie only over HTTPS
    #[serde(default)]
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            secure_cookies: false,
        }
    }
}

/// Where the hosted backend lives and how to reach it.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub anon_key: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig {
            url: String::new(),
            anon_key: String::new(),
            bucket: default_bucket(),
        }
    }
}

impl BackendConfig {
    /// Public URL prefix of objects in the media bucket.
    pub fn public_prefix(&self) -> String {
        storage_path::public_prefix(&self.url, &self.bucket)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MediaConfig {
    #[serde(default = "default_signed_url_expiry")]
    pub signed_url_expiry_secs: u64,

    #[serde(default)]
    pub thumbnail: ImageTransform,
}

impl Default for MediaConfig {
    fn default() -> Self {
        MediaConfig {
            signed_url_expiry_secs: default_signed_url_expiry(),
            thumbnail: ImageTransform::default(),
        }
    }
}

/// Access gate policy. Both knobs are off unless configured.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AccessConfig {
    /// Lifetime of an unlock; unset means it never expires
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_ttl_secs: Option<u64>,

    /// Password attempts allowed per event and minute; unset means unlimited
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts_per_minute: Option<u32>,
}

impl EventLensConfig {
    pub fn config_path() -> EventLensResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| EventLensError::Config("Could not determine config directory".into()))?
            .join("eventlens");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, writing a template there first if
    /// nothing exists yet.
    pub fn load() -> EventLensResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file (which may be missing) plus the environment.
    pub fn load_from(path: &Path) -> EventLensResult<Self> {
        let config: EventLensConfig = Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("EVENTLENS").separator("__"))
            .build()
            .map_err(|e| EventLensError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| EventLensError::Config(e.to_string()))?;

        Ok(config)
    }

    /// Check the settings the server cannot start without.
    pub fn validate(&self) -> EventLensResult<()> {
        if self.backend.url.trim().is_empty() {
            return Err(EventLensError::Config("backend.url is not set".into()));
        }
        if self.backend.anon_key.trim().is_empty() {
            return Err(EventLensError::Config("backend.anon_key is not set".into()));
        }
        if self.access.attempts_per_minute == Some(0) {
            return Err(EventLensError::Config(
                "access.attempts_per_minute must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// The default configuration as TOML, every setting commented out.
    pub fn default_template() -> EventLensResult<String> {
        let rendered = toml::to_string_pretty(&EventLensConfig::default())
            .map_err(|e| EventLensError::Serialization(e.to_string()))?;

        let mut template = String::from(TEMPLATE_HEADER);
        for line in rendered.lines() {
            if !line.is_empty() && !line.starts_with('[') {
                template.push_str("# ");
            }
            template.push_str(line);
            template.push('\n');
        }

        // Access knobs are unset by default and so not rendered
        if !template.contains("[access]") {
            template.push_str("\n[access]\n");
        }
        template.push_str(ACCESS_HINTS);

        Ok(template)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> EventLensResult<()> {
        let contents = Self::default_template()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                EventLensError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EventLensError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Expand a user-supplied path such as `~/eventlens.toml`.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}
