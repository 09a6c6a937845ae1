use hey_core::{AppPaths, HeyError, Settings};

/// Settings given on the command line. They apply to this run only unless
/// `save` is set; accepting the terms is always persisted.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub prompt: Option<String>,
    pub proxy: Option<String>,
    pub socks_proxy: Option<String>,
    pub timeout_secs: Option<u64>,
    pub agree_tos: bool,
    pub save: bool,
}

/// Settings for this run, plus whether the terms were accepted just now.
#[derive(Debug)]
pub struct Applied {
    pub settings: Settings,
    pub tos_accepted: bool,
}

impl Overrides {
    /// Reject malformed proxy URLs before anything is written.
    pub fn validate(&self) -> Result<(), HeyError> {
        if let Some(ref url) = self.proxy {
            if !Settings::validate_proxy_url(url, false) {
                return Err(HeyError::Config(format!("Invalid proxy URL: {url}")));
            }
        }
        if let Some(ref url) = self.socks_proxy {
            if !Settings::validate_proxy_url(url, true) {
                return Err(HeyError::Config(format!("Invalid SOCKS proxy URL: {url}")));
            }
        }
        Ok(())
    }

    pub fn apply(&self, paths: &AppPaths, mut settings: Settings) -> Result<Applied, HeyError> {
        let mut tos_accepted = false;
        if self.agree_tos && !settings.tos {
            // Only the flag is written; run-only values stay out of the file.
            let mut stored = Settings::load(paths);
            stored.tos = true;
            stored.save(paths)?;
            settings.tos = true;
            tos_accepted = true;
        }

        let mut changed = false;
        if let Some(ref url) = self.proxy {
            settings.proxy = Some(url.clone());
            changed = true;
        }
        if let Some(ref url) = self.socks_proxy {
            settings.socks_proxy = Some(url.clone());
            changed = true;
        }
        if let Some(ref prompt) = self.prompt {
            settings.prompt = Some(prompt.clone());
            changed = true;
        }
        if self.save && changed {
            settings.save(paths)?;
        }

        if let Some(secs) = self.timeout_secs {
            settings.timeout_secs = secs;
        }

        Ok(Applied {
            settings,
            tos_accepted,
        })
    }
}
