//! Snapshot of the environment variables the pipeline reads.

use std::collections::HashMap;

const TOKEN_VARS: [&str; 2] = ["GH_TOKEN", "GITHUB_TOKEN"];

/// Environment captured once at startup so commands never read `std::env` directly
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    /// Capture the variables relevant to releasing
    pub fn from_env() -> Self {
        let vars = TOKEN_VARS
            .iter()
            .chain(["GITHUB_REPOSITORY", "GITHUB_API_URL"].iter())
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self { vars }
    }

    /// Add or replace a variable
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Non-empty value of `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).filter(|v| !v.trim().is_empty()).cloned()
    }

    /// `GH_TOKEN`, falling back to `GITHUB_TOKEN`
    pub fn github_token(&self) -> Option<String> {
        TOKEN_VARS.iter().find_map(|key| self.get(key))
    }

    /// `GITHUB_REPOSITORY` (set by GitHub Actions)
    pub fn github_repository(&self) -> Option<String> {
        self.get("GITHUB_REPOSITORY")
    }

    /// `GITHUB_API_URL`, defaulting to the public API
    pub fn github_api_url(&self) -> String {
        self.get("GITHUB_API_URL")
            .unwrap_or_else(|| crate::github::DEFAULT_API_URL.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_precedence_and_blanks() {
        let env = EnvConfig::default()
            .with("GITHUB_TOKEN", "from-actions")
            .with("GH_TOKEN", "  ");
        assert_eq!(env.github_token().as_deref(), Some("from-actions"));

        let env = env.with("GH_TOKEN", "from-cli");
        assert_eq!(env.github_token().as_deref(), Some("from-cli"));
    }

    #[test]
    fn api_url_default() {
        assert_eq!(EnvConfig::default().github_api_url(), "https://api.github.com");
        let env = EnvConfig::default().with("GITHUB_API_URL", "https://ghe.local/api/v3");
        assert_eq!(env.github_api_url(), "https://ghe.local/api/v3");
    }
}
