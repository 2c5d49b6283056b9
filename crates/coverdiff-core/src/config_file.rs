use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::service::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_BIND: &str = "0.0.0.0:4000";
pub const DEFAULT_MAX_UPLOAD_MB: u32 = 50;

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    pub service: Option<ServiceConfig>,
    pub extraction: Option<ExtractionConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Fraction of page height excluded at the top. 0 disables.
    pub header_exclusion: Option<f32>,
    /// Fraction of page height excluded at the bottom. 0 disables.
    pub footer_exclusion: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: Option<String>,
    pub max_upload_mb: Option<u32>,
}

/// Platform config directory path: `<config_dir>/coverdiff/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("coverdiff").join("config.toml"))
}

/// Load config by cascading CWD `.coverdiff.toml` over platform config.
/// CWD values override platform values.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_from_path(&p));
    let cwd = load_from_path(Path::new(".coverdiff.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

/// Load a config from a specific path. Returns `None` if the file doesn't
/// exist or can't be parsed.
pub fn load_from_path(path: &Path) -> Option<ConfigFile> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparsable config file");
            None
        }
    }
}

fn pick<T: Clone>(overlay: Option<&T>, base: Option<&T>) -> Option<T> {
    overlay.or(base).cloned()
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let (bs, os) = (base.service.as_ref(), overlay.service.as_ref());
    let (be, oe) = (base.extraction.as_ref(), overlay.extraction.as_ref());
    let (bv, ov) = (base.server.as_ref(), overlay.server.as_ref());

    ConfigFile {
        service: Some(ServiceConfig {
            api_key: pick(
                os.and_then(|s| s.api_key.as_ref()),
                bs.and_then(|s| s.api_key.as_ref()),
            ),
            base_url: pick(
                os.and_then(|s| s.base_url.as_ref()),
                bs.and_then(|s| s.base_url.as_ref()),
            ),
            model: pick(
                os.and_then(|s| s.model.as_ref()),
                bs.and_then(|s| s.model.as_ref()),
            ),
            timeout_secs: pick(
                os.and_then(|s| s.timeout_secs.as_ref()),
                bs.and_then(|s| s.timeout_secs.as_ref()),
            ),
        }),
        extraction: Some(ExtractionConfig {
            header_exclusion: pick(
                oe.and_then(|e| e.header_exclusion.as_ref()),
                be.and_then(|e| e.header_exclusion.as_ref()),
            ),
            footer_exclusion: pick(
                oe.and_then(|e| e.footer_exclusion.as_ref()),
                be.and_then(|e| e.footer_exclusion.as_ref()),
            ),
        }),
        server: Some(ServerConfig {
            bind: pick(
                ov.and_then(|v| v.bind.as_ref()),
                bv.and_then(|v| v.bind.as_ref()),
            ),
            max_upload_mb: pick(
                ov.and_then(|v| v.max_upload_mb.as_ref()),
                bv.and_then(|v| v.max_upload_mb.as_ref()),
            ),
        }),
    }
}

/// Resolved runtime configuration.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub header_exclusion: f32,
    pub footer_exclusion: f32,
    pub bind: String,
    pub max_upload_mb: u32,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("header_exclusion", &self.header_exclusion)
            .field("footer_exclusion", &self.footer_exclusion)
            .field("bind", &self.bind)
            .field("max_upload_mb", &self.max_upload_mb)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            header_exclusion: 0.0,
            footer_exclusion: 0.0,
            bind: DEFAULT_BIND.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl Config {
    /// Resolve configuration: env vars > config files > defaults.
    pub fn load() -> Self {
        Self::from_file(&load_config()).with_env(|key| std::env::var(key).ok())
    }

    /// Apply config file values over the defaults.
    pub fn from_file(file: &ConfigFile) -> Self {
        let mut config = Self::default();
        if let Some(s) = &file.service {
            config.api_key = s.api_key.clone().or(config.api_key);
            if let Some(v) = &s.base_url {
                config.base_url = v.clone();
            }
            if let Some(v) = &s.model {
                config.model = v.clone();
            }
            if let Some(v) = s.timeout_secs {
                config.timeout_secs = v;
            }
        }
        if let Some(e) = &file.extraction {
            if let Some(v) = e.header_exclusion {
                config.header_exclusion = v;
            }
            if let Some(v) = e.footer_exclusion {
                config.footer_exclusion = v;
            }
        }
        if let Some(v) = &file.server {
            if let Some(bind) = &v.bind {
                config.bind = bind.clone();
            }
            if let Some(mb) = v.max_upload_mb {
                config.max_upload_mb = mb;
            }
        }
        config
    }

    /// Apply environment overrides looked up through `var`.
    ///
    /// `OPENAPI_KEY` is accepted as a fallback spelling of `OPENAI_API_KEY`.
    /// Unparsable numbers are ignored.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.is_empty());

        if let Some(key) = non_empty("OPENAI_API_KEY").or_else(|| non_empty("OPENAPI_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty("COVERDIFF_BASE_URL") {
            self.base_url = url;
        }
        if let Some(model) = non_empty("COVERDIFF_MODEL") {
            self.model = model;
        }
        if let Some(secs) = non_empty("COVERDIFF_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.timeout_secs = secs;
        }
        if let Some(bind) = non_empty("COVERDIFF_BIND") {
            self.bind = bind;
        }
        self
    }
}
