use serde::Deserialize;

/// Cookie names and lifetime of the browser session that keys stored credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub state_cookie_name: String,
    pub cookie_secure: bool,
    pub ttl_secs: u64,
}
