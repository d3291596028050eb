//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling the client.

use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::client::{
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USERNAME, cookie_value, parse_base_url,
};
use crate::error::{Error, Result};
use crate::render::DEFAULT_BANNER;
use crate::sync::DEFAULT_POLL_INTERVAL;

/// Command-line arguments for the webchat-chat tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Server root URL.
    #[arrrg(optional, "Server URL (default: http://localhost/)", "URL")]
    pub url: Option<String>,

    /// Display name sent as the username cookie.
    #[arrrg(optional, "Display name to post as (default: Anonymous)", "NAME")]
    pub name: Option<String>,

    /// Poll period in milliseconds.
    #[arrrg(optional, "Poll interval in milliseconds (default: 1000)", "MS")]
    pub interval_ms: Option<u32>,

    /// Per-request timeout in seconds.
    #[arrrg(optional, "Request timeout in seconds (default: 10)", "SECS")]
    pub timeout_secs: Option<u32>,

    /// Welcome banner text.
    #[arrrg(optional, "Welcome banner shown at start", "TEXT")]
    pub banner: Option<String>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat client.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Server root URL; endpoints are resolved beneath it.
    pub base_url: String,

    /// Display name to post as.
    pub username: Option<String>,

    /// Time between polls.
    pub poll_interval: Duration,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Banner shown once before any chat traffic.
    pub banner: String,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Server: http://localhost/
    /// - Name: Anonymous
    /// - Poll interval: 1000 ms
    /// - Timeout: 10 s
    /// - Color: enabled
    pub fn new() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            username: Some(DEFAULT_USERNAME.to_string()),
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            banner: DEFAULT_BANNER.to_string(),
            use_color: true,
        }
    }

    /// Sets the server URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the display name. `None` posts as `Anonymous`.
    pub fn with_username(mut self, username: Option<String>) -> Self {
        self.username = username;
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the banner text.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Check every setting, reporting the first bad one.
    pub fn validate(&self) -> Result<()> {
        parse_base_url(&self.base_url)?;
        if let Some(name) = &self.username {
            cookie_value(name)?;
        }
        if self.poll_interval.is_zero() {
            return Err(Error::validation(
                "poll interval must be positive",
                Some("interval_ms".to_string()),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::validation(
                "timeout must be positive",
                Some("timeout_secs".to_string()),
            ));
        }
        Ok(())
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let defaults = ChatConfig::new();
        ChatConfig {
            base_url: args.url.unwrap_or(defaults.base_url),
            username: args.name.or(defaults.username),
            poll_interval: args
                .interval_ms
                .map(|ms| Duration::from_millis(ms.into()))
                .unwrap_or(defaults.poll_interval),
            timeout: args
                .timeout_secs
                .map(|secs| Duration::from_secs(secs.into()))
                .unwrap_or(defaults.timeout),
            banner: args.banner.unwrap_or(defaults.banner),
            use_color: !args.no_color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ChatConfig::new();
        assert_eq!(config.base_url, "http://localhost/");
        assert_eq!(config.username.as_deref(), Some("Anonymous"));
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.banner, "Welcome to go-webchat!");
        assert!(config.use_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_from_args_defaults() {
        let config = ChatConfig::from(ChatArgs::default());
        assert_eq!(config, ChatConfig::new());
    }

    #[test]
    fn config_from_args_custom() {
        let args = ChatArgs {
            url: Some("http://chat.example:8080".to_string()),
            name: Some("Ada Lovelace".to_string()),
            interval_ms: Some(250),
            timeout_secs: Some(3),
            banner: Some("hi".to_string()),
            no_color: true,
        };
        let config = ChatConfig::from(args);
        assert_eq!(config.base_url, "http://chat.example:8080");
        assert_eq!(config.username.as_deref(), Some("Ada Lovelace"));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.banner, "hi");
        assert!(!config.use_color);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_builder_pattern() {
        let config = ChatConfig::new()
            .with_base_url("https://chat.example/")
            .with_username(Some("bob".to_string()))
            .with_poll_interval(Duration::from_millis(50))
            .with_timeout(Duration::from_secs(1))
            .with_banner("Welcome")
            .without_color();

        assert_eq!(config.base_url, "https://chat.example/");
        assert_eq!(config.username.as_deref(), Some("bob"));
        assert_eq!(config.poll_interval, Duration::from_millis(50));
        assert_eq!(config.timeout, Duration::from_secs(1));
        assert_eq!(config.banner, "Welcome");
        assert!(!config.use_color);
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let zero = ChatConfig::new().with_poll_interval(Duration::ZERO);
        assert!(zero.validate().unwrap_err().is_validation());

        let no_timeout = ChatConfig::new().with_timeout(Duration::ZERO);
        assert!(no_timeout.validate().is_err());

        let bad_url = ChatConfig::new().with_base_url("localhost chat");
        assert!(bad_url.validate().is_err());

        let bad_name = ChatConfig::new().with_username(Some("a;b".to_string()));
        assert!(bad_name.validate().is_err());
    }
}
