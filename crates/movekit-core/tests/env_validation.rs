//! Loader behaviour through the public API.

use movekit_core::{
    AnalyticsProvider, DeployEnvironment, EnvironmentSource, FeatureFlag, NodeEnv, PublicConfig,
    RawEnv, ServerConfig, SiteEnv, Visibility,
    public::DeployContext,
};

fn env(pairs: &[(&str, &str)]) -> RawEnv {
    pairs.iter().copied().collect()
}

#[test]
fn test_public_round_trip() {
    let raw = env(&[
        ("PUBLIC_BASE_URL", "https://preview.climate.example"),
        ("PUBLIC_PRODUCTION_URL", "https://climate.example"),
        ("PUBLIC_STAGING_URL", "https://staging.climate.example"),
        ("PUBLIC_SITE_NAME", "Climate Now"),
        ("PUBLIC_SITE_TAGLINE", "Act today"),
        ("PUBLIC_SITE_DESCRIPTION", "Local climate organizing"),
        ("PUBLIC_AUTHOR_NAME", "Climate Now Collective"),
        ("PUBLIC_CONTACT_EMAIL", "team@climate.example"),
        ("PUBLIC_TWITTER_HANDLE", "@climatenow"),
        ("PUBLIC_FEATURE_UPDATES", "true"),
        ("PUBLIC_FEATURE_STORIES", "false"),
        ("PUBLIC_FEATURE_EVENTS", "true"),
        ("PUBLIC_FEATURE_DARKMODE", "false"),
        ("PUBLIC_FEATURE_NEWSLETTER", "true"),
        ("PUBLIC_FEATURE_DONATIONS", "true"),
        ("PUBLIC_PRIMARY_ACTION", "Sign the pledge"),
        ("PUBLIC_PRIMARY_ACTION_URL", "/pledge"),
        ("PUBLIC_DONATE_URL", "https://give.example/climate"),
        ("PUBLIC_ANALYTICS", "plausible"),
        ("PUBLIC_ANALYTICS_DOMAIN", "climate.example"),
        ("PUBLIC_ANALYTICS_WRITE_KEY", "wk_123"),
        ("PUBLIC_ENVIRONMENT", "staging"),
        ("PUBLIC_DEPLOY_CONTEXT", "branch-deploy"),
    ]);

    let config = PublicConfig::load(&raw).expect("load");

    assert_eq!(config.base_url, "https://preview.climate.example");
    assert_eq!(config.production_url.as_deref(), Some("https://climate.example"));
    assert_eq!(config.site_name, "Climate Now");
    assert_eq!(config.site_tagline, "Act today");
    assert_eq!(config.author_name, "Climate Now Collective");
    assert_eq!(config.contact_email.as_deref(), Some("team@climate.example"));
    assert_eq!(config.twitter_handle.as_deref(), Some("@climatenow"));
    assert!(!config.features.is_enabled(FeatureFlag::Stories));
    assert!(!config.features.is_enabled(FeatureFlag::DarkMode));
    assert!(config.features.is_enabled(FeatureFlag::Donations));
    assert_eq!(config.primary_action, "Sign the pledge");
    assert_eq!(config.primary_action_url, "/pledge");
    assert_eq!(config.donate_url, "https://give.example/climate");
    assert_eq!(config.analytics, AnalyticsProvider::Plausible);
    assert_eq!(config.analytics_domain.as_deref(), Some("climate.example"));
    assert_eq!(config.analytics_write_key.as_deref(), Some("wk_123"));
    assert_eq!(config.google_analytics_id, None);
    assert_eq!(config.environment, Some(DeployEnvironment::Staging));
    assert_eq!(config.deploy_context, Some(DeployContext::BranchDeploy));

    // The stored-value view reproduces every raw input exactly.
    for (key, value) in [
        ("PUBLIC_SITE_NAME", "Climate Now"),
        ("PUBLIC_FEATURE_STORIES", "false"),
        ("PUBLIC_ANALYTICS", "plausible"),
        ("PUBLIC_ENVIRONMENT", "staging"),
        ("PUBLIC_DEPLOY_CONTEXT", "branch-deploy"),
    ] {
        assert_eq!(config.value(key).as_deref(), Some(value), "{key}");
    }
}

#[test]
fn test_server_round_trip() {
    let config = ServerConfig::load(&env(&[
        ("NODE_ENV", "test"),
        ("SITE_URL", "https://climate.example"),
        ("ENABLE_FORMS", "false"),
        ("MAILCHIMP_API_KEY", "mc-key"),
        ("CONVERTKIT_API_SECRET", "ck-secret"),
    ]))
    .expect("load");

    assert_eq!(config.node_env, NodeEnv::Test);
    assert_eq!(config.site_url.as_deref(), Some("https://climate.example"));
    assert!(!config.forms_enabled);
    assert_eq!(
        config.mailchimp_api_key.as_ref().map(|s| s.expose()),
        Some("mc-key")
    );
    assert_eq!(
        config.convertkit_api_secret.as_ref().map(|s| s.expose()),
        Some("ck-secret")
    );
}

#[test]
fn test_defaults_substituted_for_missing_fields() {
    let env = SiteEnv::load(&EnvironmentSource::injected_only(RawEnv::default())).expect("load");

    assert_eq!(env.server.node_env, NodeEnv::Development);
    assert!(!env.server.forms_enabled);
    assert_eq!(env.public.base_url, "http://localhost:4321");
    assert_eq!(
        env.public.site_description,
        "A progressive movement site focused on organizing and action"
    );
    assert_eq!(env.public.analytics, AnalyticsProvider::None);
    assert_eq!(env.public.enabled_features().len(), FeatureFlag::ALL.len());
}

#[test]
fn test_forms_without_captcha_names_secret() {
    let err = ServerConfig::load(&env(&[("ENABLE_FORMS", "true")])).unwrap_err();
    assert_eq!(err.issues().len(), 1);
    assert_eq!(err.issues()[0].field, "HCAPTCHA_SECRET");
}

#[test]
fn test_analytics_refinements_name_provider_field() {
    for provider in ["plausible", "google"] {
        let err = PublicConfig::load(&env(&[("PUBLIC_ANALYTICS", provider)])).unwrap_err();
        assert_eq!(err.issues()[0].field, "PUBLIC_ANALYTICS", "{provider}");
    }

    PublicConfig::load(&env(&[
        ("PUBLIC_ANALYTICS", "google"),
        ("PUBLIC_GOOGLE_ANALYTICS_ID", "G-ABC123"),
    ]))
    .expect("load");
}

#[test]
fn test_site_url_priority() {
    let production = PublicConfig::load(&env(&[
        ("PUBLIC_ENVIRONMENT", "production"),
        ("PUBLIC_PRODUCTION_URL", "https://x.org"),
        ("PUBLIC_STAGING_URL", "https://s.x.org"),
    ]))
    .expect("load");
    assert_eq!(production.site_url(), "https://x.org");

    let staging = PublicConfig::load(&env(&[
        ("PUBLIC_ENVIRONMENT", "staging"),
        ("PUBLIC_STAGING_URL", "https://s.x.org"),
    ]))
    .expect("load");
    assert_eq!(staging.site_url(), "https://s.x.org");

    let neither = PublicConfig::load(&env(&[])).expect("load");
    assert_eq!(neither.site_url(), "http://localhost:4321");
}

#[test]
fn test_process_environment_preferred_over_injected() {
    let injected = env(&[("PUBLIC_SITE_NAME", "Injected Name")]);

    let browser = EnvironmentSource::injected_only(injected.clone());
    let env = SiteEnv::load(&browser).expect("load");
    assert_eq!(env.public.site_name, "Injected Name");

    // A host source always carries some process variables, so the injected
    // mapping is never consulted.
    let host = EnvironmentSource::from_host().with_injected(injected);
    assert!(host.resolve().get("PUBLIC_SITE_NAME") != Some("Injected Name"));
}

#[test]
fn test_navigation_follows_feature_flags() {
    let env = SiteEnv::load(&EnvironmentSource::injected_only(env(&[(
        "PUBLIC_FEATURE_EVENTS",
        "false",
    )])))
    .expect("load");
    let site = env.site();

    let hrefs: Vec<_> = site.visible_main().iter().map(|i| i.href.as_str()).collect();
    assert!(!hrefs.contains(&"/events"));
    assert!(hrefs.contains(&"/stories"));
    assert!(!site.is_feature_enabled(&Visibility::Feature("features.volunteers".into())));
}
