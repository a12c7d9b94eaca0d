//! Report and mail delivery configuration.

use serde::Deserialize;

/// Default transactional email API.
pub const DEFAULT_MAIL_API_URL: &str = "https://api.resend.com";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// `From` header of every report email.
    pub from: String,
    /// Expiring items listed in the email before the overflow line.
    pub overflow_limit: usize,
    /// Look-ahead for documents and right-to-work re-checks, in days.
    pub expiry_horizon_days: i64,
    /// Look-ahead for mandatory training, in days.
    pub training_horizon_days: i64,
    /// Target of the call-to-action button.
    pub app_url: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            from: "Novum Compliance <compliance@novum.local>".into(),
            overflow_limit: 10,
            expiry_horizon_days: 90,
            training_horizon_days: 30,
            app_url: "http://localhost:8080/compliance".into(),
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct MailerConfig {
    pub base_url: String,
    /// Sending is disabled when absent or blank.
    pub api_key: Option<String>,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_MAIL_API_URL.into(),
            api_key: None,
        }
    }
}

impl MailerConfig {
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for MailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailerConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_api_key_disables_sending() {
        let config = MailerConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(config.api_key(), None);
        assert_eq!(MailerConfig::default().api_key(), None);
    }

    #[test]
    fn debug_output_hides_the_key() {
        let config = MailerConfig {
            api_key: Some("re_secret".into()),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("re_secret"));
        assert!(printed.contains("<redacted>"));
    }
}
