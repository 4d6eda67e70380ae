use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsSettings {
    /// Exact origins, or a single "*" to accept any origin.
    pub allowed_origins: Vec<String>,
    pub max_age_secs: usize,
}

impl CorsSettings {
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}
