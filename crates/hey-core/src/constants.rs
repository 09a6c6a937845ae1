/// hey — centralized constants.
/// Policy limits, endpoints and file names live here.

// ─── Conversation Memory ──────────────────────────────────────────────────────

pub mod memory {
    /// Most recent messages kept on disk (user + assistant entries).
    pub const MAX_MESSAGES: usize = 10;
    /// Stored conversations older than this start over on the next turn.
    pub const EXPIRY_HOURS: i64 = 24;
}

// ─── DuckDuckGo Chat ──────────────────────────────────────────────────────────

pub mod endpoints {
    pub const DUCKDUCKGO_BASE_URL: &str = "https://duckduckgo.com";
    pub const STATUS_PATH: &str = "/duckchat/v1/status";
    pub const CHAT_PATH: &str = "/duckchat/v1/chat";
    pub const TERMS_URL: &str = "https://duckduckgo.com/terms";
}

pub mod headers {
    /// Carries the continuation token in both directions.
    pub const VQD: &str = "x-vqd-4";
    pub const VQD_ACCEPT: &str = "x-vqd-accept";
    pub const USER_AGENT: &str =
        "Mozilla/5.0 (X11; Linux x86_64; rv:109.0) Gecko/20100101 Firefox/115.0";
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const MODEL: &str = "claude-3-haiku-20240307";
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const STATUS_TIMEOUT_SECS: u64 = 10;
}

// ─── Paths ────────────────────────────────────────────────────────────────────

pub mod paths {
    pub const APP_DIR: &str = "hey";
    pub const CONFIG_FILE: &str = "conf.toml";
    pub const MESSAGES_FILE: &str = "messages.json";

    pub const CONFIG_DIR_ENV: &str = "HEY_CONFIG_PATH";
    pub const CONFIG_FILE_ENV: &str = "HEY_CONFIG_FILENAME";
    pub const CACHE_DIR_ENV: &str = "HEY_CACHE_PATH";
}

// ─── Proxy Environment ────────────────────────────────────────────────────────

pub mod proxy {
    pub const HTTP_ENV: &[&str] = &["HTTP_PROXY", "http_proxy"];
    pub const HTTPS_ENV: &[&str] = &["HTTPS_PROXY", "https_proxy"];
    pub const SOCKS_ENV: &[&str] = &["SOCKS_PROXY", "socks_proxy"];
    pub const HTTP_SCHEMES: &[&str] = &["http", "https"];
    pub const SOCKS_SCHEMES: &[&str] = &["http", "https", "socks4", "socks5"];
}
