//! Movekit Core Library
//!
//! Typed environment configuration, template-facing site configuration and
//! content collection schemas for Movekit sites.
//!
//! Configuration is built once with [`SiteEnv::load`] and passed explicitly
//! to whatever needs it; nothing here is global.

pub mod content;
pub mod env;
pub mod error;
pub mod public;
pub mod schema;
pub mod server;
pub mod site;

pub use content::{Collection, Entry, parse_entry};
pub use env::{EnvironmentSource, RawEnv};
pub use error::{CoreError, Issue, Result, SchemaViolation};
pub use public::{AnalyticsProvider, DeployEnvironment, FeatureFlag, PublicConfig};
pub use schema::{PUBLIC_SCHEMA, SERVER_SCHEMA, Tier};
pub use server::{NodeEnv, ServerConfig};
pub use site::{NavItem, Navigation, SiteConfig, Visibility};

/// Both validated configuration tiers, resolved from one source.
#[derive(Debug, Clone)]
pub struct SiteEnv {
    /// Server-only configuration.
    pub server: ServerConfig,

    /// Public configuration.
    pub public: PublicConfig,
}

impl SiteEnv {
    /// Resolve the active mapping once and validate both tiers.
    ///
    /// When either tier fails, the returned violation carries the issues of
    /// both.
    pub fn load(source: &EnvironmentSource) -> std::result::Result<Self, SchemaViolation> {
        let raw = source.resolve();

        match (ServerConfig::load(raw), PublicConfig::load(raw)) {
            (Ok(server), Ok(public)) => Ok(Self { server, public }),
            (Err(mut violation), Err(public)) => {
                violation.merge(public);
                Err(violation)
            }
            (Err(violation), Ok(_)) | (Ok(_), Err(violation)) => Err(violation),
        }
    }

    /// Template-facing projection of the public tier.
    pub fn site(&self) -> SiteConfig {
        SiteConfig::from_public(&self.public)
    }
}
