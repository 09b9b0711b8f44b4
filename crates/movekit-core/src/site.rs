//! Template-facing site configuration.
//!
//! [`SiteConfig`] is a projection of a validated [`PublicConfig`]: site
//! metadata, a `features` map keyed the way templates address it, campaign
//! call-to-action fields and a declarative navigation tree whose entries
//! carry visibility expressions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    public::{DeployEnvironment, FeatureFlag, PublicConfig, resolve_site_url},
};

/// Prefix of a visibility expression that refers to a feature flag.
const FEATURE_PATH_PREFIX: &str = "features.";

/// When a navigation entry is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Visibility {
    /// Static visibility.
    Always(bool),
    /// Dotted path into the features map, e.g. `features.stories`.
    Feature(String),
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Always(true)
    }
}

impl From<bool> for Visibility {
    fn from(value: bool) -> Self {
        Self::Always(value)
    }
}

impl From<&str> for Visibility {
    fn from(path: &str) -> Self {
        Self::Feature(path.to_string())
    }
}

/// A navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    /// Display label.
    pub label: String,

    /// Link target.
    pub href: String,

    /// Visibility expression.
    #[serde(default)]
    pub show: Visibility,

    /// Render as the emphasised call to action.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub highlight: bool,
}

impl NavItem {
    /// Create an always-visible entry.
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            show: Visibility::default(),
            highlight: false,
        }
    }

    /// Set the visibility expression.
    pub fn with_show(mut self, show: impl Into<Visibility>) -> Self {
        self.show = show.into();
        self
    }

    /// Mark as highlighted.
    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

/// Main and footer navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Navigation {
    /// Header navigation, in display order.
    #[serde(default)]
    pub main: Vec<NavItem>,

    /// Footer links, in display order.
    #[serde(default)]
    pub footer: Vec<NavItem>,
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            main: vec![
                NavItem::new("Home", "/"),
                NavItem::new("About", "/about"),
                NavItem::new("Stories", "/stories").with_show("features.stories"),
                NavItem::new("Events", "/events").with_show("features.events"),
                NavItem::new("Updates", "/updates").with_show("features.updates"),
                NavItem::new("Take Action", "/action").with_highlight(true),
            ],
            footer: vec![
                NavItem::new("Privacy Policy", "/privacy"),
                NavItem::new("Accessibility", "/accessibility-statement"),
                NavItem::new("Contact", "/contact"),
            ],
        }
    }
}

impl Navigation {
    /// Parse a navigation tree from YAML with `main` and `footer` lists.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Campaign call-to-action fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    /// Primary call-to-action label.
    pub primary_action: String,
    /// Primary call-to-action link.
    pub primary_action_url: String,
    /// Donation link.
    pub donate_url: String,
}

/// Configuration handed to page templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
    pub name: String,
    pub tagline: String,
    pub description: String,
    pub author: String,

    pub base_url: String,
    pub production_url: Option<String>,
    pub staging_url: Option<String>,

    pub email: Option<String>,
    pub twitter: Option<String>,

    /// Feature name (`stories`, `darkMode`, ...) to enabled state.
    pub features: BTreeMap<String, bool>,

    pub campaign: Campaign,

    pub navigation: Navigation,

    pub environment: Option<DeployEnvironment>,
}

impl SiteConfig {
    /// Project a validated public configuration.
    pub fn from_public(public: &PublicConfig) -> Self {
        let features = FeatureFlag::ALL
            .into_iter()
            .map(|f| (f.name().to_string(), public.features.is_enabled(f)))
            .collect();

        Self {
            name: public.site_name.clone(),
            tagline: public.site_tagline.clone(),
            description: public.site_description.clone(),
            author: public.author_name.clone(),
            base_url: public.base_url.clone(),
            production_url: public.production_url.clone(),
            staging_url: public.staging_url.clone(),
            email: public.contact_email.clone(),
            twitter: public.twitter_handle.clone(),
            features,
            campaign: Campaign {
                primary_action: public.primary_action.clone(),
                primary_action_url: public.primary_action_url.clone(),
                donate_url: public.donate_url.clone(),
            },
            navigation: Navigation::default(),
            environment: public.environment,
        }
    }

    /// Replace the navigation tree.
    #[must_use]
    pub fn with_navigation(mut self, navigation: Navigation) -> Self {
        self.navigation = navigation;
        self
    }

    /// Evaluate a visibility expression.
    ///
    /// Literal booleans pass through. `features.<name>` looks up the
    /// features map; unknown names and any other string are not shown.
    pub fn is_feature_enabled(&self, show: &Visibility) -> bool {
        match show {
            Visibility::Always(value) => *value,
            Visibility::Feature(path) => path
                .strip_prefix(FEATURE_PATH_PREFIX)
                .and_then(|name| self.features.get(name))
                .copied()
                .unwrap_or(false),
        }
    }

    /// Main navigation entries whose visibility holds, in order.
    pub fn visible_main(&self) -> Vec<&NavItem> {
        self.visible(&self.navigation.main)
    }

    /// Footer entries whose visibility holds, in order.
    pub fn visible_footer(&self) -> Vec<&NavItem> {
        self.visible(&self.navigation.footer)
    }

    fn visible<'a>(&self, items: &'a [NavItem]) -> Vec<&'a NavItem> {
        items
            .iter()
            .filter(|item| self.is_feature_enabled(&item.show))
            .collect()
    }

    /// Deployed to production.
    pub fn is_production(&self) -> bool {
        self.environment == Some(DeployEnvironment::Production)
    }

    /// Deployed to staging.
    pub fn is_staging(&self) -> bool {
        self.environment == Some(DeployEnvironment::Staging)
    }

    /// Running in development.
    pub fn is_development(&self) -> bool {
        self.environment == Some(DeployEnvironment::Development)
    }

    /// URL the site is served from; same policy as [`PublicConfig::site_url`].
    pub fn site_url(&self) -> &str {
        resolve_site_url(
            self.environment,
            self.production_url.as_deref(),
            self.staging_url.as_deref(),
            &self.base_url,
        )
    }
}
