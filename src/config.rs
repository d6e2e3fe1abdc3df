//! Client configuration
//!
//! Values come from the process environment (after an optional `.env` file
//! has been loaded) and fall back to the defaults below.

use crate::connection::protocol::{ENGINE_IO_VERSION, SOCKET_IO_PATH};
use crate::error::{HudError, Result};
use std::time::Duration;
use url::Url;

/// Environment key for the assistant service endpoint
pub const ENV_API_URL: &str = "VOICE_HUD_API_URL";
/// Environment key toggling automatic reconnection
pub const ENV_RECONNECT: &str = "VOICE_HUD_RECONNECT";
/// Environment key for the first reconnect delay in milliseconds
pub const ENV_RECONNECT_DELAY_MS: &str = "VOICE_HUD_RECONNECT_DELAY_MS";
/// Environment key for the reconnect delay ceiling in milliseconds
pub const ENV_RECONNECT_DELAY_MAX_MS: &str = "VOICE_HUD_RECONNECT_DELAY_MAX_MS";
/// Environment key for the number of reconnect attempts
pub const ENV_RECONNECT_ATTEMPTS: &str = "VOICE_HUD_RECONNECT_ATTEMPTS";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:5000";
pub const DEFAULT_WELCOME: &str = "Hello! I'm your voice assistant. How can I help you?";

/// Bounded exponential backoff for re-opening the session channel
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Whether a dropped channel is re-opened automatically
    pub enabled: bool,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Ceiling for any single delay
    pub max_delay: Duration,
    /// Retries before giving up
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(5000),
            max_attempts: 5,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry `attempt` (1-based), or `None` once retries are exhausted
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if !self.enabled || attempt == 0 || attempt > self.max_attempts {
            return None;
        }
        let exp = (attempt - 1).min(16);
        let factor = 1u32 << exp;
        Some(self.base_delay.saturating_mul(factor).min(self.max_delay))
    }
}

/// Render loop settings for the listening indicator
#[derive(Clone, Debug, PartialEq)]
pub struct HudConfig {
    /// Edge length of the square drawing surface
    pub size: f32,
    /// Number of previous frames kept for the fade trail
    pub trail_frames: usize,
    /// Fraction of each frame faded toward the background
    pub fade: f32,
}

impl Default for HudConfig {
    fn default() -> Self {
        Self {
            size: 400.0,
            trail_frames: 12,
            fade: 0.1,
        }
    }
}

/// Configuration for the complete client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Assistant service endpoint (`http`, `https`, `ws` or `wss`)
    pub endpoint: String,

    /// Reconnection policy
    pub reconnect: ReconnectPolicy,

    /// Text of the synthetic assistant turn added on the first connect
    pub welcome_message: String,

    /// Listening indicator settings
    pub hud: HudConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            reconnect: ReconnectPolicy::default(),
            welcome_message: DEFAULT_WELCOME.to_string(),
            hud: HudConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            config.endpoint = endpoint.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_RECONNECT) {
            config.reconnect.enabled = parse_bool(ENV_RECONNECT, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RECONNECT_DELAY_MS) {
            config.reconnect.base_delay = Duration::from_millis(parse_num(ENV_RECONNECT_DELAY_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_RECONNECT_DELAY_MAX_MS) {
            config.reconnect.max_delay =
                Duration::from_millis(parse_num(ENV_RECONNECT_DELAY_MAX_MS, &raw)?);
        }
        if let Some(raw) = lookup(ENV_RECONNECT_ATTEMPTS) {
            config.reconnect.max_attempts = parse_num::<u32>(ENV_RECONNECT_ATTEMPTS, &raw)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the reconnection policy
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }

    /// Disable automatic reconnection
    pub fn without_reconnect(mut self) -> Self {
        self.reconnect.enabled = false;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.websocket_url()?;

        if self.reconnect.base_delay > self.reconnect.max_delay {
            return Err(HudError::Config(format!(
                "reconnect delay {:?} exceeds ceiling {:?}",
                self.reconnect.base_delay, self.reconnect.max_delay
            )));
        }

        if self.hud.size <= 0.0 {
            return Err(HudError::Config("HUD size must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.hud.fade) {
            return Err(HudError::Config("HUD fade must be within 0..=1".to_string()));
        }

        Ok(())
    }

    /// Socket.IO WebSocket URL for the configured endpoint
    ///
    /// `http` maps to `ws` and `https` to `wss`; other schemes are rejected.
    /// The Socket.IO path is appended to the endpoint path.
    pub fn websocket_url(&self) -> Result<Url> {
        let mut url = Url::parse(&self.endpoint)?;
        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(HudError::Config(format!("unsupported scheme: {}", other)));
            }
        };
        url.set_scheme(scheme)
            .map_err(|_| HudError::Config(format!("cannot use scheme {} for {}", scheme, self.endpoint)))?;

        let path = format!("{}/{}", url.path().trim_end_matches('/'), SOCKET_IO_PATH);
        url.set_path(&path);
        url.set_query(Some(&format!("EIO={}&transport=websocket", ENGINE_IO_VERSION)));
        url.set_fragment(None);
        Ok(url)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HudError::Config(format!("{} must be a boolean, got {:?}", key, raw))),
    }
}

fn parse_num<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| HudError::Config(format!("{} must be a number, got {:?}", key, raw)))
}
