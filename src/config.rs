use std::{path::PathBuf, time::Duration};

use crate::utils;

pub const DEFAULT_BASE_URL: &str = "https://hyscaler-event.onrender.com/api";
const DEFAULT_TIMEOUT_SECS: u64 = 20;
const DEFAULT_AI_REPLY_DELAY_MS: u64 = 1500;
const DEFAULT_USER_AGENT: &str = "event-hub/0.1";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub timeout: Duration,
    pub ai_reply_delay: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: utils::default_data_root(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ai_reply_delay: Duration::from_millis(DEFAULT_AI_REPLY_DELAY_MS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let base_url = lookup("EVENT_HUB_API_URL")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.base_url);
        let data_dir = lookup("EVENT_HUB_DATA_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);
        let timeout = lookup("EVENT_HUB_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);
        let ai_reply_delay = lookup("EVENT_HUB_AI_REPLY_DELAY_MS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.ai_reply_delay);
        let user_agent = lookup("EVENT_HUB_USER_AGENT").unwrap_or(defaults.user_agent);

        Self {
            base_url,
            data_dir,
            timeout,
            ai_reply_delay,
            user_agent,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    pub fn with_ai_reply_delay(mut self, delay: Duration) -> Self {
        self.ai_reply_delay = delay;
        self
    }

    pub fn session_path(&self) -> PathBuf {
        utils::session_path(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("EVENT_HUB_API_URL", "http://localhost:5000/api"),
            ("EVENT_HUB_DATA_DIR", "/tmp/hub"),
            ("EVENT_HUB_AI_REPLY_DELAY_MS", "10"),
            ("EVENT_HUB_TIMEOUT_SECS", "not-a-number"),
        ]);
        let config = ClientConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.base_url, "http://localhost:5000/api");
        assert_eq!(config.session_path(), PathBuf::from("/tmp/hub/current_user.json"));
        assert_eq!(config.ai_reply_delay, Duration::from_millis(10));
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn blank_values_fall_back() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "EVENT_HUB_API_URL").then(|| "  ".to_string())
        });
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }
}
