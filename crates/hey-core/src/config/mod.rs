mod paths;

pub use paths::AppPaths;

use crate::constants::{defaults, proxy};
use crate::error::{HeyError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// User configuration, stored as TOML in the config directory.
///
/// Missing keys fall back to their defaults, so hand-edited files only need
/// the fields they change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// DuckDuckGo terms of service accepted.
    pub tos: bool,
    pub model: String,
    /// System prompt applied to every question.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// HTTP/HTTPS proxy URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// SOCKS proxy URL, applied to every scheme.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub socks_proxy: Option<String>,
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tos: false,
            model: defaults::MODEL.to_string(),
            prompt: None,
            proxy: None,
            socks_proxy: None,
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
        }
    }
}

/// A proxy and the requests it applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyRule {
    Http(String),
    Https(String),
    All(String),
}

impl Settings {
    /// Load from `paths`, falling back to defaults if the file is missing or
    /// unreadable.
    pub fn load(paths: &AppPaths) -> Self {
        Self::load_from(&paths.config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring invalid config file");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read config file");
                Self::default()
            }
        }
    }

    pub fn save(&self, paths: &AppPaths) -> Result<()> {
        self.save_to(&paths.config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| HeyError::persistence(parent, e))?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| HeyError::Config(e.to_string()))?;

        let tmp_path = path.with_extension(format!("toml.{}.tmp", std::process::id()));
        {
            let mut file =
                fs::File::create(&tmp_path).map_err(|e| HeyError::persistence(&tmp_path, e))?;
            file.write_all(content.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| HeyError::persistence(&tmp_path, e))?;
        }
        fs::rename(&tmp_path, path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            HeyError::persistence(path, e)
        })?;
        debug!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Check a proxy URL has a host and a supported scheme.
    pub fn validate_proxy_url(url: &str, allow_socks: bool) -> bool {
        let Ok(parsed) = reqwest::Url::parse(url) else {
            return false;
        };
        if parsed.host_str().map_or(true, str::is_empty) {
            return false;
        }
        let allowed = if allow_socks {
            proxy::SOCKS_SCHEMES
        } else {
            proxy::HTTP_SCHEMES
        };
        allowed.contains(&parsed.scheme())
    }

    /// Proxies from the config file, falling back to the usual environment
    /// variables.
    pub fn proxies(&self) -> Vec<ProxyRule> {
        self.proxies_with(|key| std::env::var(key).ok())
    }

    pub fn proxies_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Vec<ProxyRule> {
        let first_of = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(k).filter(|v| !v.is_empty()))
        };
        let mut rules = Vec::new();

        if let Some(ref url) = self.proxy {
            rules.push(ProxyRule::Http(url.clone()));
            rules.push(ProxyRule::Https(url.clone()));
        } else {
            if let Some(url) = first_of(proxy::HTTP_ENV) {
                rules.push(ProxyRule::Http(url));
            }
            if let Some(url) = first_of(proxy::HTTPS_ENV) {
                rules.push(ProxyRule::Https(url));
            }
        }

        if let Some(ref url) = self.socks_proxy {
            rules.push(ProxyRule::All(url.clone()));
        } else if let Some(url) = first_of(proxy::SOCKS_ENV) {
            rules.push(ProxyRule::All(url));
        }

        rules
    }

    /// Client settings without proxies. `timeout_secs` bounds connecting and
    /// each wait for more body bytes, not the whole answer, so a long reply
    /// that keeps streaming is never cut off.
    pub fn http_client_builder(&self) -> reqwest::ClientBuilder {
        let timeout = Duration::from_secs(self.timeout_secs);
        reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .user_agent(crate::constants::headers::USER_AGENT)
            .no_proxy()
    }

    /// Build the HTTP client used for backend requests.
    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        let mut builder = self.http_client_builder();

        for rule in self.proxies() {
            let (url, allow_socks) = match &rule {
                ProxyRule::Http(url) | ProxyRule::Https(url) => (url, false),
                ProxyRule::All(url) => (url, true),
            };
            if !Self::validate_proxy_url(url, allow_socks) {
                return Err(HeyError::Config(format!("Invalid proxy URL: {url}")));
            }

            let proxy = match &rule {
                ProxyRule::Http(url) => reqwest::Proxy::http(url),
                ProxyRule::Https(url) => reqwest::Proxy::https(url),
                ProxyRule::All(url) => reqwest::Proxy::all(url),
            }
            .map_err(|e| HeyError::Config(format!("Invalid proxy {rule:?}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        builder
            .build()
            .map_err(|e| HeyError::Config(format!("Failed to create HTTP client: {e}")))
    }
}
