//! Check command - validate the deployment environment before a build

use std::{
    path::{Path, PathBuf},
    sync::LazyLock,
};

use color_eyre::eyre::{Result, WrapErr, bail};
use movekit_core::{
    AnalyticsProvider, Collection, EnvironmentSource, FeatureFlag, PublicConfig, RawEnv,
    SchemaViolation, ServerConfig, SiteEnv, parse_entry, schema::DEFAULT_DONATE_URL,
};
use regex::Regex;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Options for the check command.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// Treat warnings as errors.
    pub strict: bool,

    /// Flat TOML file with the build-injected environment.
    pub injected: Option<PathBuf>,

    /// Content root to validate collections under.
    pub content_dir: Option<PathBuf>,
}

/// Everything the check found.
#[derive(Debug, Default)]
pub struct CheckReport {
    /// Checks that passed, in the order they ran.
    pub passed: Vec<String>,

    /// Fatal problems.
    pub errors: Vec<String>,

    /// Advisory problems.
    pub warnings: Vec<String>,

    /// Effective configuration, as label/value pairs.
    pub summary: Vec<(String, String)>,
}

impl CheckReport {
    fn pass(&mut self, msg: impl Into<String>) {
        self.passed.push(msg.into());
    }

    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn add_summary(&mut self, label: &str, value: impl Into<String>) {
        self.summary.push((label.to_string(), value.into()));
    }

    fn add_violation(&mut self, violation: SchemaViolation) {
        for issue in violation.issues() {
            self.add_error(format!("{issue}"));
        }
    }

    /// Whether any error was recorded.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether any warning was recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    fn print(&self) {
        for msg in &self.passed {
            println!("  ✓ {msg}");
        }

        if self.has_warnings() {
            println!();
            println!("Warnings:");
            for warn in &self.warnings {
                println!("  ⚠ {warn}");
            }
        }

        if self.has_errors() {
            eprintln!();
            eprintln!("Errors:");
            for err in &self.errors {
                eprintln!("  ✗ {err}");
            }
            eprintln!();
            eprintln!("Check your .env.local file and ensure all required variables are set.");
        }

        if !self.summary.is_empty() {
            println!();
            println!("Current configuration:");
            for (label, value) in &self.summary {
                println!("  {label}: {value}");
            }
        }

        println!();
        println!("Summary:");
        println!("  Errors:   {}", self.errors.len());
        println!("  Warnings: {}", self.warnings.len());
    }
}

/// Run the check command against the process environment.
pub fn run(options: &CheckOptions) -> Result<()> {
    tracing::info!(?options, "Checking environment");

    let mut source = EnvironmentSource::from_host();
    if let Some(path) = &options.injected {
        let injected = RawEnv::from_toml_file(path)
            .wrap_err("Failed to load injected environment")?;
        source = source.with_injected(injected);
    }

    run_with(&source, options).map(|_| ())
}

/// Run the check command against an explicit source.
///
/// Every check runs before the outcome is decided, so a single run reports
/// all problems.
pub fn run_with(source: &EnvironmentSource, options: &CheckOptions) -> Result<CheckReport> {
    println!("Validating environment variables...");
    println!();

    let report = evaluate(source, options.content_dir.as_deref());
    report.print();

    if report.has_errors() {
        bail!("Environment validation failed with {} error(s)", report.errors.len());
    }

    if options.strict && report.has_warnings() {
        bail!(
            "Environment validation failed with {} warning(s) (strict mode)",
            report.warnings.len()
        );
    }

    println!();
    println!("✓ Environment validation completed successfully");

    Ok(report)
}

/// Run all checks without printing anything.
pub fn evaluate(source: &EnvironmentSource, content_dir: Option<&Path>) -> CheckReport {
    let mut report = CheckReport::default();
    let raw = source.resolve();

    let server = match ServerConfig::load(raw) {
        Ok(config) => {
            report.pass("Server environment variables validated");
            Some(config)
        }
        Err(violation) => {
            report.add_violation(violation);
            None
        }
    };

    let public = match PublicConfig::load(raw) {
        Ok(config) => {
            report.pass("Public environment variables validated");
            Some(config)
        }
        Err(violation) => {
            report.add_violation(violation);
            None
        }
    };

    let errors_before = report.errors.len();

    if let Some(public) = &public {
        check_analytics(public, &mut report);
    }
    if let Some(server) = &server {
        check_forms(server, &mut report);
        check_production_urls(server, public.as_ref(), raw, &mut report);
    }
    if let Some(public) = &public {
        check_donations(public, &mut report);
        check_contact_email(public, &mut report);
    }

    if server.is_some() && public.is_some() && report.errors.len() == errors_before {
        report.pass("All conditional requirements satisfied");
    }

    if let Some(dir) = content_dir {
        validate_collections(dir, &mut report);
    }

    if let (Some(server), Some(public)) = (server, public) {
        add_summary(&SiteEnv { server, public }, &mut report);
    }

    report
}

/// Provider-specific analytics settings.
fn check_analytics(public: &PublicConfig, report: &mut CheckReport) {
    match public.analytics {
        AnalyticsProvider::Plausible if is_blank(&public.analytics_domain) => {
            report.add_error("PUBLIC_ANALYTICS_DOMAIN is required when using Plausible analytics");
        }
        AnalyticsProvider::Google if is_blank(&public.google_analytics_id) => {
            report.add_error("PUBLIC_GOOGLE_ANALYTICS_ID is required when using Google Analytics");
        }
        _ => {}
    }
}

fn check_forms(server: &ServerConfig, report: &mut CheckReport) {
    let has_secret = server
        .hcaptcha_secret
        .as_ref()
        .is_some_and(|s| !s.expose().is_empty());

    if server.forms_enabled && !has_secret {
        report.add_error("HCAPTCHA_SECRET is required when ENABLE_FORMS=true");
    }
}

/// Production builds need an HTTPS site URL.
///
/// When the public tier failed to load, the production URL is read from the
/// raw mapping so its scheme is still checked.
fn check_production_urls(
    server: &ServerConfig,
    public: Option<&PublicConfig>,
    raw: &RawEnv,
    report: &mut CheckReport,
) {
    if !server.is_production() {
        return;
    }

    let public_url = match public {
        Some(public) => public.production_url.as_deref(),
        None => raw.get("PUBLIC_PRODUCTION_URL").filter(|url| !url.is_empty()),
    };
    let prod_url = server.site_url.as_deref().or(public_url);

    match prod_url {
        None => report.add_warning(
            "Neither SITE_URL nor PUBLIC_PRODUCTION_URL is set for production; \
             absolute URLs and SEO metadata may be wrong",
        ),
        Some(url) if !url.starts_with("https://") => {
            report.add_error(format!(
                "Production URLs must use HTTPS for security (got {url})"
            ));
        }
        Some(_) => {}
    }
}

fn check_donations(public: &PublicConfig, report: &mut CheckReport) {
    if public.features.is_enabled(FeatureFlag::Donations)
        && public.donate_url == DEFAULT_DONATE_URL
    {
        report.add_warning(format!(
            "Using default donate URL '{DEFAULT_DONATE_URL}' - consider setting \
             PUBLIC_DONATE_URL to an external donation platform"
        ));
    }
}

fn check_contact_email(public: &PublicConfig, report: &mut CheckReport) {
    if let Some(email) = public.contact_email.as_deref()
        && !is_plausible_email(email)
    {
        report.add_error("PUBLIC_CONTACT_EMAIL must be a valid email address");
    }
}

fn is_plausible_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

/// Validate every collection entry under `content_dir`.
fn validate_collections(content_dir: &Path, report: &mut CheckReport) {
    let mut checked = 0;
    let mut failed = 0;

    for collection in Collection::ALL {
        let dir = content_dir.join(collection.name());
        if !dir.is_dir() {
            tracing::debug!(?dir, "Collection directory missing, skipping");
            continue;
        }

        for entry in walkdir::WalkDir::new(&dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            if !collection.accepts(path) {
                continue;
            }

            checked += 1;

            let content = match std::fs::read_to_string(path) {
                Ok(c) => c,
                Err(e) => {
                    report.add_error(format!("{}: Failed to read file: {e}", path.display()));
                    failed += 1;
                    continue;
                }
            };

            if let Err(e) = parse_entry(collection, &content, path) {
                report.add_error(e.to_string());
                failed += 1;
            }
        }
    }

    if failed == 0 {
        report.pass(format!("All {checked} content entries valid"));
    } else {
        tracing::warn!(failed, checked, "Content entries failed validation");
    }
}

fn add_summary(env: &SiteEnv, report: &mut CheckReport) {
    report.add_summary("Environment", env.server.node_env.as_str());
    report.add_summary("Site", env.public.site_name.as_str());
    report.add_summary("Base URL", env.public.base_url.as_str());
    report.add_summary("Site URL", env.public.site_url());
    report.add_summary("Analytics", env.public.analytics.as_str());
    report.add_summary("Forms enabled", env.server.forms_enabled.to_string());

    let enabled: Vec<_> = env
        .public
        .enabled_features()
        .iter()
        .map(|f| f.label())
        .collect();
    if !enabled.is_empty() {
        report.add_summary("Enabled features", enabled.join(", "));
    }
}
