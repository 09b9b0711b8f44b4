//! Server-tier configuration: secrets and build-environment classification.

use std::fmt;

use crate::{
    env::RawEnv,
    error::SchemaViolation,
    schema::{Parsed, SERVER_SCHEMA},
};

/// `NODE_ENV` classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeEnv {
    /// Local development (default).
    #[default]
    Development,
    /// Test runs.
    Test,
    /// Production builds.
    Production,
}

impl NodeEnv {
    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("production") => Self::Production,
            Some("test") => Self::Test,
            _ => Self::Development,
        }
    }

    /// The variable value this classification was parsed from.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for NodeEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A secret value whose `Debug` output never shows the contents.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Borrow the secret for handing to the service that needs it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[redacted]")
    }
}

/// Validated server-only configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Build environment.
    pub node_env: NodeEnv,

    /// Canonical site URL for absolute links.
    pub site_url: Option<String>,

    /// Whether server-side forms are enabled.
    pub forms_enabled: bool,

    /// hCaptcha verification secret; present whenever forms are enabled.
    pub hcaptcha_secret: Option<Secret>,

    /// Mailchimp API key.
    pub mailchimp_api_key: Option<Secret>,

    /// ConvertKit API secret.
    pub convertkit_api_secret: Option<Secret>,

    /// Stripe secret key.
    pub stripe_secret_key: Option<Secret>,

    /// PayPal secret.
    pub paypal_secret: Option<Secret>,
}

impl ServerConfig {
    /// Validate the server tier of a raw mapping.
    pub fn load(raw: &RawEnv) -> Result<Self, SchemaViolation> {
        tracing::debug!(vars = raw.len(), "Loading server configuration");
        let parsed = SERVER_SCHEMA.parse(raw)?;
        let config = Self::from_parsed(&parsed);
        tracing::info!(
            node_env = %config.node_env,
            forms = config.forms_enabled,
            "Server configuration loaded"
        );
        Ok(config)
    }

    fn from_parsed(parsed: &Parsed) -> Self {
        let secret = |name| parsed.owned(name).map(Secret);

        Self {
            node_env: NodeEnv::from_value(parsed.text("NODE_ENV")),
            site_url: parsed.owned("SITE_URL"),
            forms_enabled: parsed.flag("ENABLE_FORMS").unwrap_or(false),
            hcaptcha_secret: secret("HCAPTCHA_SECRET"),
            mailchimp_api_key: secret("MAILCHIMP_API_KEY"),
            convertkit_api_secret: secret("CONVERTKIT_API_SECRET"),
            stripe_secret_key: secret("STRIPE_SECRET_KEY"),
            paypal_secret: secret("PAYPAL_SECRET"),
        }
    }

    /// `NODE_ENV=development`.
    pub fn is_development(&self) -> bool {
        self.node_env == NodeEnv::Development
    }

    /// `NODE_ENV=test`.
    pub fn is_test(&self) -> bool {
        self.node_env == NodeEnv::Test
    }

    /// `NODE_ENV=production`.
    pub fn is_production(&self) -> bool {
        self.node_env == NodeEnv::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> RawEnv {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_load_defaults() {
        let config = ServerConfig::load(&RawEnv::default()).expect("load");

        assert!(config.is_development());
        assert!(!config.is_production());
        assert!(!config.forms_enabled);
        assert!(config.site_url.is_none());
        assert!(config.hcaptcha_secret.is_none());
    }

    #[test]
    fn test_load_full() {
        let config = ServerConfig::load(&env(&[
            ("NODE_ENV", "production"),
            ("SITE_URL", "https://movement.example"),
            ("ENABLE_FORMS", "true"),
            ("HCAPTCHA_SECRET", "0xcaptcha"),
            ("STRIPE_SECRET_KEY", "sk_live_123"),
        ]))
        .expect("load");

        assert!(config.is_production());
        assert_eq!(config.site_url.as_deref(), Some("https://movement.example"));
        assert!(config.forms_enabled);
        assert_eq!(
            config.hcaptcha_secret.as_ref().map(Secret::expose),
            Some("0xcaptcha")
        );
        assert_eq!(
            config.stripe_secret_key.as_ref().map(Secret::expose),
            Some("sk_live_123")
        );
        assert!(config.paypal_secret.is_none());
    }

    #[test]
    fn test_test_env() {
        let config = ServerConfig::load(&env(&[("NODE_ENV", "test")])).expect("load");
        assert!(config.is_test());
        assert_eq!(config.node_env.to_string(), "test");
    }

    #[test]
    fn test_forms_without_captcha_fails() {
        let err = ServerConfig::load(&env(&[("ENABLE_FORMS", "true")])).unwrap_err();
        assert!(err.has_field("HCAPTCHA_SECRET"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ServerConfig::load(&env(&[("PAYPAL_SECRET", "hunter2")])).expect("load");
        let debug = format!("{config:?}");

        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[redacted]"));
    }
}
