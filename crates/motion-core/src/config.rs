//! Bridge configuration.

use std::time::Duration;

use motion_proto::limits;

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Commands admitted per `rate_limit_window`
    pub rate_limit_max_messages: usize,
    /// Sliding window length
    pub rate_limit_window: Duration,
    /// Minimum gap between two "no session" warnings
    pub rejection_log_interval: Duration,
    /// Native game object receiving commands
    pub game_object: String,
    /// Method invoked on `game_object`
    pub method: String,
    /// Token characters allowed in debug logs
    pub token_log_prefix: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            rate_limit_max_messages: limits::RATE_LIMIT_MAX_MESSAGES,
            rate_limit_window: limits::RATE_LIMIT_WINDOW,
            rejection_log_interval: Duration::from_secs(5),
            game_object: limits::UNITY_GAME_OBJECT.to_string(),
            method: limits::UNITY_METHOD.to_string(),
            token_log_prefix: limits::TOKEN_LOG_PREFIX,
        }
    }
}
