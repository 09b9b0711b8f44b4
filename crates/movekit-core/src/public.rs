//! Public-tier configuration: site metadata, feature flags, analytics and
//! deployment classification. Everything here may be shipped to a browser.

use std::fmt;

use serde::Serialize;

use crate::{
    env::RawEnv,
    error::SchemaViolation,
    schema::{PUBLIC_SCHEMA, Parsed, is_enabled_value},
};

/// `PUBLIC_ENVIRONMENT` classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeployEnvironment {
    /// Local development.
    Development,
    /// Staging deployment.
    Staging,
    /// Production deployment.
    Production,
}

impl DeployEnvironment {
    fn from_value(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Self::Development),
            "staging" => Some(Self::Staging),
            "production" => Some(Self::Production),
            _ => None,
        }
    }

    /// The variable value for this classification.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// `PUBLIC_DEPLOY_CONTEXT`, as set by the hosting platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeployContext {
    /// Production deploy.
    Production,
    /// Pull-request preview.
    DeployPreview,
    /// Branch deploy.
    BranchDeploy,
}

impl DeployContext {
    fn from_value(value: &str) -> Option<Self> {
        match value {
            "production" => Some(Self::Production),
            "deploy-preview" => Some(Self::DeployPreview),
            "branch-deploy" => Some(Self::BranchDeploy),
            _ => None,
        }
    }

    /// The variable value for this context.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::DeployPreview => "deploy-preview",
            Self::BranchDeploy => "branch-deploy",
        }
    }
}

/// `PUBLIC_ANALYTICS` provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyticsProvider {
    /// Plausible; needs `PUBLIC_ANALYTICS_DOMAIN`.
    Plausible,
    /// Matomo.
    Matomo,
    /// Google Analytics 4; needs `PUBLIC_GOOGLE_ANALYTICS_ID`.
    Google,
    /// No analytics.
    #[default]
    None,
}

impl AnalyticsProvider {
    fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("plausible") => Self::Plausible,
            Some("matomo") => Self::Matomo,
            Some("google") => Self::Google,
            _ => Self::None,
        }
    }

    /// The variable value for this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plausible => "plausible",
            Self::Matomo => "matomo",
            Self::Google => "google",
            Self::None => "none",
        }
    }
}

impl fmt::Display for AnalyticsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site features that can be switched off per deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureFlag {
    /// News updates section.
    Updates,
    /// Stories collection.
    Stories,
    /// Events collection.
    Events,
    /// Dark mode toggle.
    DarkMode,
    /// Newsletter signup.
    Newsletter,
    /// Donation links.
    Donations,
}

impl FeatureFlag {
    /// Every flag, in declaration order.
    pub const ALL: [FeatureFlag; 6] = [
        Self::Updates,
        Self::Stories,
        Self::Events,
        Self::DarkMode,
        Self::Newsletter,
        Self::Donations,
    ];

    /// Environment variable controlling this flag.
    pub fn env_key(&self) -> &'static str {
        match self {
            Self::Updates => "PUBLIC_FEATURE_UPDATES",
            Self::Stories => "PUBLIC_FEATURE_STORIES",
            Self::Events => "PUBLIC_FEATURE_EVENTS",
            Self::DarkMode => "PUBLIC_FEATURE_DARKMODE",
            Self::Newsletter => "PUBLIC_FEATURE_NEWSLETTER",
            Self::Donations => "PUBLIC_FEATURE_DONATIONS",
        }
    }

    /// Key used in the site configuration's `features` map.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Updates => "updates",
            Self::Stories => "stories",
            Self::Events => "events",
            Self::DarkMode => "darkMode",
            Self::Newsletter => "newsletter",
            Self::Donations => "donations",
        }
    }

    /// Lower-case label used in reports.
    pub fn label(&self) -> String {
        self.env_key()["PUBLIC_FEATURE_".len()..].to_lowercase()
    }

    /// Value assumed when the variable is unset.
    pub fn default_enabled(&self) -> bool {
        true
    }
}

/// Decoded feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureFlags {
    updates: bool,
    stories: bool,
    events: bool,
    dark_mode: bool,
    newsletter: bool,
    donations: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            updates: FeatureFlag::Updates.default_enabled(),
            stories: FeatureFlag::Stories.default_enabled(),
            events: FeatureFlag::Events.default_enabled(),
            dark_mode: FeatureFlag::DarkMode.default_enabled(),
            newsletter: FeatureFlag::Newsletter.default_enabled(),
            donations: FeatureFlag::Donations.default_enabled(),
        }
    }
}

impl FeatureFlags {
    fn from_parsed(parsed: &Parsed) -> Self {
        let flag = |f: FeatureFlag| parsed.flag(f.env_key()).unwrap_or(f.default_enabled());

        Self {
            updates: flag(FeatureFlag::Updates),
            stories: flag(FeatureFlag::Stories),
            events: flag(FeatureFlag::Events),
            dark_mode: flag(FeatureFlag::DarkMode),
            newsletter: flag(FeatureFlag::Newsletter),
            donations: flag(FeatureFlag::Donations),
        }
    }

    /// Whether `flag` is on.
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::Updates => self.updates,
            FeatureFlag::Stories => self.stories,
            FeatureFlag::Events => self.events,
            FeatureFlag::DarkMode => self.dark_mode,
            FeatureFlag::Newsletter => self.newsletter,
            FeatureFlag::Donations => self.donations,
        }
    }

    /// Enabled flags, in declaration order.
    pub fn enabled(&self) -> Vec<FeatureFlag> {
        FeatureFlag::ALL
            .into_iter()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }
}

/// Pick the URL the site is served from.
///
/// Production URL when the environment is production and one is configured,
/// else the staging URL when staging and configured, else the base URL.
pub fn resolve_site_url<'a>(
    environment: Option<DeployEnvironment>,
    production_url: Option<&'a str>,
    staging_url: Option<&'a str>,
    base_url: &'a str,
) -> &'a str {
    match (environment, production_url, staging_url) {
        (Some(DeployEnvironment::Production), Some(url), _) => url,
        (Some(DeployEnvironment::Staging), _, Some(url)) => url,
        _ => base_url,
    }
}

/// Validated public configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicConfig {
    /// Local or fallback base URL.
    pub base_url: String,
    /// Production URL.
    pub production_url: Option<String>,
    /// Staging URL.
    pub staging_url: Option<String>,

    /// Site name.
    pub site_name: String,
    /// Tagline.
    pub site_tagline: String,
    /// Meta description.
    pub site_description: String,
    /// Organisation or author name.
    pub author_name: String,

    /// Contact email address.
    pub contact_email: Option<String>,
    /// Twitter/X handle.
    pub twitter_handle: Option<String>,

    /// Feature toggles.
    pub features: FeatureFlags,

    /// Call-to-action label.
    pub primary_action: String,
    /// Call-to-action link.
    pub primary_action_url: String,
    /// Donation link.
    pub donate_url: String,

    /// Analytics provider.
    pub analytics: AnalyticsProvider,
    /// Plausible domain.
    pub analytics_domain: Option<String>,
    /// Write-only analytics key.
    pub analytics_write_key: Option<String>,
    /// GA4 measurement ID.
    pub google_analytics_id: Option<String>,

    /// Deployment environment.
    pub environment: Option<DeployEnvironment>,
    /// Hosting platform deploy context.
    pub deploy_context: Option<DeployContext>,
}

impl PublicConfig {
    /// Validate the public tier of a raw mapping.
    pub fn load(raw: &RawEnv) -> Result<Self, SchemaViolation> {
        tracing::debug!(vars = raw.len(), "Loading public configuration");
        let parsed = PUBLIC_SCHEMA.parse(raw)?;
        let config = Self::from_parsed(&parsed);

        if config.base_url.ends_with('/') {
            tracing::warn!("PUBLIC_BASE_URL should not have a trailing slash");
        }

        tracing::info!(
            site = %config.site_name,
            analytics = %config.analytics,
            "Public configuration loaded"
        );
        Ok(config)
    }

    fn from_parsed(parsed: &Parsed) -> Self {
        let text = |name: &str| parsed.owned(name).unwrap_or_default();

        Self {
            base_url: text("PUBLIC_BASE_URL"),
            production_url: parsed.owned("PUBLIC_PRODUCTION_URL"),
            staging_url: parsed.owned("PUBLIC_STAGING_URL"),
            site_name: text("PUBLIC_SITE_NAME"),
            site_tagline: text("PUBLIC_SITE_TAGLINE"),
            site_description: text("PUBLIC_SITE_DESCRIPTION"),
            author_name: text("PUBLIC_AUTHOR_NAME"),
            contact_email: parsed.owned("PUBLIC_CONTACT_EMAIL"),
            twitter_handle: parsed.owned("PUBLIC_TWITTER_HANDLE"),
            features: FeatureFlags::from_parsed(parsed),
            primary_action: text("PUBLIC_PRIMARY_ACTION"),
            primary_action_url: text("PUBLIC_PRIMARY_ACTION_URL"),
            donate_url: text("PUBLIC_DONATE_URL"),
            analytics: AnalyticsProvider::from_value(parsed.text("PUBLIC_ANALYTICS")),
            analytics_domain: parsed.owned("PUBLIC_ANALYTICS_DOMAIN"),
            analytics_write_key: parsed.owned("PUBLIC_ANALYTICS_WRITE_KEY"),
            google_analytics_id: parsed.owned("PUBLIC_GOOGLE_ANALYTICS_ID"),
            environment: parsed
                .text("PUBLIC_ENVIRONMENT")
                .and_then(DeployEnvironment::from_value),
            deploy_context: parsed
                .text("PUBLIC_DEPLOY_CONTEXT")
                .and_then(DeployContext::from_value),
        }
    }

    /// `PUBLIC_ENVIRONMENT=development`.
    pub fn is_development(&self) -> bool {
        self.environment == Some(DeployEnvironment::Development)
    }

    /// `PUBLIC_ENVIRONMENT=staging`.
    pub fn is_staging(&self) -> bool {
        self.environment == Some(DeployEnvironment::Staging)
    }

    /// `PUBLIC_ENVIRONMENT=production`.
    pub fn is_production(&self) -> bool {
        self.environment == Some(DeployEnvironment::Production)
    }

    /// URL the site is served from in the current environment.
    pub fn site_url(&self) -> &str {
        resolve_site_url(
            self.environment,
            self.production_url.as_deref(),
            self.staging_url.as_deref(),
            &self.base_url,
        )
    }

    /// Stored value of a public variable, rendered as its string form.
    ///
    /// Flags render as `"true"`/`"false"`; unset optionals and unknown names
    /// yield `None`.
    pub fn value(&self, name: &str) -> Option<String> {
        if let Some(flag) = FeatureFlag::ALL.into_iter().find(|f| f.env_key() == name) {
            return Some(self.features.is_enabled(flag).to_string());
        }

        let opt = |v: &Option<String>| v.clone();
        match name {
            "PUBLIC_BASE_URL" => Some(self.base_url.clone()),
            "PUBLIC_PRODUCTION_URL" => opt(&self.production_url),
            "PUBLIC_STAGING_URL" => opt(&self.staging_url),
            "PUBLIC_SITE_NAME" => Some(self.site_name.clone()),
            "PUBLIC_SITE_TAGLINE" => Some(self.site_tagline.clone()),
            "PUBLIC_SITE_DESCRIPTION" => Some(self.site_description.clone()),
            "PUBLIC_AUTHOR_NAME" => Some(self.author_name.clone()),
            "PUBLIC_CONTACT_EMAIL" => opt(&self.contact_email),
            "PUBLIC_TWITTER_HANDLE" => opt(&self.twitter_handle),
            "PUBLIC_PRIMARY_ACTION" => Some(self.primary_action.clone()),
            "PUBLIC_PRIMARY_ACTION_URL" => Some(self.primary_action_url.clone()),
            "PUBLIC_DONATE_URL" => Some(self.donate_url.clone()),
            "PUBLIC_ANALYTICS" => Some(self.analytics.as_str().to_string()),
            "PUBLIC_ANALYTICS_DOMAIN" => opt(&self.analytics_domain),
            "PUBLIC_ANALYTICS_WRITE_KEY" => opt(&self.analytics_write_key),
            "PUBLIC_GOOGLE_ANALYTICS_ID" => opt(&self.google_analytics_id),
            "PUBLIC_ENVIRONMENT" => self.environment.map(|e| e.as_str().to_string()),
            "PUBLIC_DEPLOY_CONTEXT" => self.deploy_context.map(|c| c.as_str().to_string()),
            _ => None,
        }
    }

    /// Whether the named variable counts as an enabled feature.
    ///
    /// Anything but the literal `"false"` is enabled, including unset
    /// variables. Prefer [`FeatureFlags::is_enabled`] for declared flags.
    pub fn is_feature_enabled(&self, name: &str) -> bool {
        is_enabled_value(self.value(name).as_deref())
    }

    /// Enabled feature flags, in declaration order.
    pub fn enabled_features(&self) -> Vec<FeatureFlag> {
        self.features.enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> RawEnv {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_defaults() {
        let config = PublicConfig::load(&RawEnv::default()).expect("load");

        assert_eq!(config.base_url, "http://localhost:4321");
        assert_eq!(config.site_name, "Movement Site");
        assert_eq!(config.site_tagline, "Building power for change");
        assert_eq!(config.author_name, "Your Organization");
        assert_eq!(config.primary_action, "Take Action");
        assert_eq!(config.primary_action_url, "/action");
        assert_eq!(config.donate_url, "/donate");
        assert_eq!(config.analytics, AnalyticsProvider::None);
        assert_eq!(config.environment, None);
        assert_eq!(config.features, FeatureFlags::default());
        assert_eq!(config.enabled_features(), FeatureFlag::ALL.to_vec());
    }

    #[test]
    fn test_site_url_production() {
        let config = PublicConfig::load(&env(&[
            ("PUBLIC_ENVIRONMENT", "production"),
            ("PUBLIC_PRODUCTION_URL", "https://x.org"),
            ("PUBLIC_STAGING_URL", "https://s.x.org"),
        ]))
        .expect("load");

        assert!(config.is_production());
        assert_eq!(config.site_url(), "https://x.org");
    }

    #[test]
    fn test_site_url_staging() {
        let config = PublicConfig::load(&env(&[
            ("PUBLIC_ENVIRONMENT", "staging"),
            ("PUBLIC_STAGING_URL", "https://s.x.org"),
        ]))
        .expect("load");

        assert!(config.is_staging());
        assert_eq!(config.site_url(), "https://s.x.org");
    }

    #[test]
    fn test_site_url_falls_back_to_base() {
        let config = PublicConfig::load(&RawEnv::default()).expect("load");
        assert_eq!(config.site_url(), "http://localhost:4321");

        let config = PublicConfig::load(&env(&[
            ("PUBLIC_ENVIRONMENT", "production"),
            ("PUBLIC_BASE_URL", "https://base.x.org"),
        ]))
        .expect("load");
        assert_eq!(config.site_url(), "https://base.x.org");
    }

    #[test]
    fn test_production_without_url_ignores_staging() {
        assert_eq!(
            resolve_site_url(
                Some(DeployEnvironment::Production),
                None,
                Some("https://s.x.org"),
                "http://base"
            ),
            "http://base"
        );
    }

    #[test]
    fn test_development_uses_base() {
        assert_eq!(
            resolve_site_url(
                Some(DeployEnvironment::Development),
                Some("https://x.org"),
                Some("https://s.x.org"),
                "http://base"
            ),
            "http://base"
        );
    }

    #[test]
    fn test_feature_flags_decoded() {
        let config = PublicConfig::load(&env(&[
            ("PUBLIC_FEATURE_STORIES", "false"),
            ("PUBLIC_FEATURE_DONATIONS", "false"),
        ]))
        .expect("load");

        assert!(!config.features.is_enabled(FeatureFlag::Stories));
        assert!(config.features.is_enabled(FeatureFlag::Events));
        assert_eq!(
            config.enabled_features(),
            vec![
                FeatureFlag::Updates,
                FeatureFlag::Events,
                FeatureFlag::DarkMode,
                FeatureFlag::Newsletter,
            ]
        );
    }

    #[test]
    fn test_is_feature_enabled_literal_semantics() {
        let config = PublicConfig::load(&env(&[
            ("PUBLIC_FEATURE_EVENTS", "false"),
            ("PUBLIC_SITE_NAME", "false"),
        ]))
        .expect("load");

        assert!(!config.is_feature_enabled("PUBLIC_FEATURE_EVENTS"));
        assert!(config.is_feature_enabled("PUBLIC_FEATURE_UPDATES"));
        // Any stored string other than "false" is enabled.
        assert!(config.is_feature_enabled("PUBLIC_TAGLINE_TYPO"));
        assert!(config.is_feature_enabled("PUBLIC_SITE_TAGLINE"));
        assert!(config.is_feature_enabled("PUBLIC_TWITTER_HANDLE"));
        assert!(!config.is_feature_enabled("PUBLIC_SITE_NAME"));
    }

    #[test]
    fn test_value_view() {
        let config = PublicConfig::load(&env(&[
            ("PUBLIC_ANALYTICS", "plausible"),
            ("PUBLIC_ANALYTICS_DOMAIN", "x.org"),
            ("PUBLIC_DEPLOY_CONTEXT", "deploy-preview"),
        ]))
        .expect("load");

        assert_eq!(config.value("PUBLIC_ANALYTICS").as_deref(), Some("plausible"));
        assert_eq!(config.value("PUBLIC_FEATURE_NEWSLETTER").as_deref(), Some("true"));
        assert_eq!(
            config.value("PUBLIC_DEPLOY_CONTEXT").as_deref(),
            Some("deploy-preview")
        );
        assert_eq!(config.deploy_context, Some(DeployContext::DeployPreview));
        assert_eq!(config.value("PUBLIC_CONTACT_EMAIL"), None);
        assert_eq!(config.value("NODE_ENV"), None);
    }

    #[test]
    fn test_feature_labels() {
        assert_eq!(FeatureFlag::DarkMode.label(), "darkmode");
        assert_eq!(FeatureFlag::DarkMode.name(), "darkMode");
    }
}
