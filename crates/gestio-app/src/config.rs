//! # Application Configuration
//!
//! Runtime configuration for the service layer. Database settings live in
//! [`gestio_db::DbConfig`]; this covers everything above the store.

use std::time::Duration;

/// How often the low-stock checker re-runs while the app is open.
pub const DEFAULT_ALERT_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Application configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = AppConfig::new("Mercearia Central")
///     .alert_interval(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Company name shown in document headers and exports.
    pub company_name: String,

    /// Interval between low-stock checks.
    /// Default: 30 minutes
    pub alert_interval: Duration,

    /// Whether to load all entity lists into the caches on startup.
    /// Default: true
    pub warm_caches: bool,
}

impl AppConfig {
    /// Creates a configuration with the given company name and defaults.
    pub fn new(company_name: impl Into<String>) -> Self {
        AppConfig {
            company_name: company_name.into(),
            alert_interval: DEFAULT_ALERT_INTERVAL,
            warm_caches: true,
        }
    }

    /// Sets the low-stock check interval.
    pub fn alert_interval(mut self, interval: Duration) -> Self {
        self.alert_interval = interval;
        self
    }

    /// Sets whether caches are warmed on startup.
    pub fn warm_caches(mut self, warm: bool) -> Self {
        self.warm_caches = warm;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig::new("Gestio")
    }
}
