//! Declarative schemas for the server and public environment tiers.
//!
//! A [`Schema`] is an ordered list of [`VarSpec`] declarations plus
//! [`Refinement`] rules over the parsed set. Parsing collects every field
//! failure before returning; refinements only run once all fields passed.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;

use crate::{
    env::RawEnv,
    error::{Issue, SchemaViolation},
};

/// Classification of a variable: secret or safe to ship to a browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Server-only; may contain secrets.
    Server,
    /// Distributed to untrusted clients; `PUBLIC_` prefixed.
    Public,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server => f.write_str("server"),
            Self::Public => f.write_str("public"),
        }
    }
}

/// Value shape of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    /// Any string.
    Text,
    /// `"true"` or `"false"`, decoded to `bool`.
    Flag,
    /// Absolute URL.
    Url,
    /// Email address.
    Email,
    /// One of a closed set of strings.
    Choice(&'static [&'static str]),
    /// Finite number.
    Number,
}

/// Declaration of one recognised environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSpec {
    /// Variable name, unique within its tier.
    pub name: &'static str,

    /// Expected shape.
    pub kind: VarKind,

    /// Value substituted when the variable is absent.
    pub default: Option<&'static str>,

    /// Tier the variable belongs to.
    pub tier: Tier,
}

impl VarSpec {
    const fn server(name: &'static str, kind: VarKind, default: Option<&'static str>) -> Self {
        Self {
            name,
            kind,
            default,
            tier: Tier::Server,
        }
    }

    const fn public(name: &'static str, kind: VarKind, default: Option<&'static str>) -> Self {
        Self {
            name,
            kind,
            default,
            tier: Tier::Public,
        }
    }
}

/// Cross-field predicate evaluated after every field passed its own checks.
#[derive(Debug, Clone, Copy)]
pub struct Refinement {
    /// Field the failure is reported against.
    pub field: &'static str,

    /// Failure message.
    pub message: &'static str,

    /// Returns `true` when the rule holds.
    pub check: fn(&Parsed) -> bool,
}

/// A decoded variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text, URL, email and choice values.
    Text(String),
    /// Decoded flag.
    Flag(bool),
    /// Decoded number.
    Number(f64),
}

/// Output of a successful [`Schema::parse`]: present and defaulted values.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    values: BTreeMap<&'static str, Value>,
}

impl Parsed {
    /// Textual value of a variable (text, URL, email or choice kinds).
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(Value::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Owned textual value.
    pub fn owned(&self, name: &str) -> Option<String> {
        self.text(name).map(str::to_string)
    }

    /// Decoded flag value.
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(Value::Flag(b)) => Some(*b),
            _ => None,
        }
    }

    /// Decoded numeric value.
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.values.get(name) {
            Some(Value::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Whether a variable carries a non-empty value.
    pub fn is_set(&self, name: &str) -> bool {
        match self.values.get(name) {
            Some(Value::Text(s)) => !s.is_empty(),
            Some(_) => true,
            None => false,
        }
    }
}

/// Ordered variable declarations plus refinement rules for one tier.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Tier covered by this schema.
    pub tier: Tier,

    /// Variable declarations in report order.
    pub vars: &'static [VarSpec],

    /// Cross-field rules.
    pub refinements: &'static [Refinement],
}

impl Schema {
    /// Look up a declaration by name.
    pub fn var(&self, name: &str) -> Option<&VarSpec> {
        self.vars.iter().find(|spec| spec.name == name)
    }

    /// Apply the schema to a raw mapping.
    ///
    /// Unknown keys are ignored. Defaults are applied before refinements run.
    pub fn parse(&self, raw: &RawEnv) -> Result<Parsed, SchemaViolation> {
        let mut violation = SchemaViolation::default();
        let mut values = BTreeMap::new();

        for spec in self.vars {
            let Some(input) = raw.get(spec.name).or(spec.default) else {
                continue;
            };

            match decode(spec.kind, input) {
                Ok(value) => {
                    values.insert(spec.name, value);
                }
                Err(message) => violation.push(Issue::new(self.tier, spec.name, message)),
            }
        }

        if !violation.is_empty() {
            return Err(violation);
        }

        let parsed = Parsed { values };

        for rule in self.refinements {
            if !(rule.check)(&parsed) {
                violation.push(Issue::new(self.tier, rule.field, rule.message));
            }
        }

        if violation.is_empty() {
            Ok(parsed)
        } else {
            Err(violation)
        }
    }
}

/// Literal feature semantic: every stored value except `"false"` is enabled.
pub fn is_enabled_value(value: Option<&str>) -> bool {
    value != Some("false")
}

fn decode(kind: VarKind, input: &str) -> Result<Value, String> {
    match kind {
        VarKind::Text => Ok(Value::Text(input.to_string())),
        VarKind::Flag => match input {
            "true" => Ok(Value::Flag(true)),
            "false" => Ok(Value::Flag(false)),
            other => Err(enum_message(FLAG_VALUES, other)),
        },
        VarKind::Url => match url::Url::parse(input) {
            Ok(_) => Ok(Value::Text(input.to_string())),
            Err(_) => Err("Invalid url".to_string()),
        },
        VarKind::Email => {
            if is_valid_email(input) {
                Ok(Value::Text(input.to_string()))
            } else {
                Err("Invalid email".to_string())
            }
        }
        VarKind::Choice(options) => {
            if options.contains(&input) {
                Ok(Value::Text(input.to_string()))
            } else {
                Err(enum_message(options, input))
            }
        }
        VarKind::Number => match input.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Number(n)),
            _ => Err(format!("Expected number, received '{input}'")),
        },
    }
}

fn enum_message(options: &[&str], received: &str) -> String {
    let expected = options
        .iter()
        .map(|o| format!("'{o}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("Invalid enum value. Expected {expected}, received '{received}'")
}

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("valid regex")
});

fn is_valid_email(input: &str) -> bool {
    !input.starts_with('.') && !input.contains("..") && EMAIL_RE.is_match(input)
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

const FLAG_VALUES: &[&str] = &["true", "false"];

/// `NODE_ENV` values.
pub const NODE_ENV_VALUES: &[&str] = &["development", "test", "production"];

/// `PUBLIC_ANALYTICS` values.
pub const ANALYTICS_VALUES: &[&str] = &["plausible", "matomo", "google", "none"];

/// `PUBLIC_ENVIRONMENT` values.
pub const ENVIRONMENT_VALUES: &[&str] = &["development", "staging", "production"];

/// `PUBLIC_DEPLOY_CONTEXT` values.
pub const DEPLOY_CONTEXT_VALUES: &[&str] = &["production", "deploy-preview", "branch-deploy"];

/// Default for `PUBLIC_BASE_URL`.
pub const DEFAULT_BASE_URL: &str = "http://localhost:4321";

/// Default for `PUBLIC_DONATE_URL`; the driver warns when it is left in place.
pub const DEFAULT_DONATE_URL: &str = "/donate";

const SERVER_VARS: &[VarSpec] = &[
    VarSpec::server(
        "NODE_ENV",
        VarKind::Choice(NODE_ENV_VALUES),
        Some("development"),
    ),
    VarSpec::server("SITE_URL", VarKind::Url, None),
    VarSpec::server("ENABLE_FORMS", VarKind::Flag, Some("false")),
    VarSpec::server("HCAPTCHA_SECRET", VarKind::Text, None),
    VarSpec::server("MAILCHIMP_API_KEY", VarKind::Text, None),
    VarSpec::server("CONVERTKIT_API_SECRET", VarKind::Text, None),
    VarSpec::server("STRIPE_SECRET_KEY", VarKind::Text, None),
    VarSpec::server("PAYPAL_SECRET", VarKind::Text, None),
];

const SERVER_REFINEMENTS: &[Refinement] = &[Refinement {
    field: "HCAPTCHA_SECRET",
    message: "HCAPTCHA_SECRET is required when ENABLE_FORMS=true",
    check: forms_have_captcha,
}];

fn forms_have_captcha(data: &Parsed) -> bool {
    !(data.flag("ENABLE_FORMS") == Some(true) && !data.is_set("HCAPTCHA_SECRET"))
}

const PUBLIC_VARS: &[VarSpec] = &[
    VarSpec::public("PUBLIC_BASE_URL", VarKind::Url, Some(DEFAULT_BASE_URL)),
    VarSpec::public("PUBLIC_PRODUCTION_URL", VarKind::Url, None),
    VarSpec::public("PUBLIC_STAGING_URL", VarKind::Url, None),
    VarSpec::public("PUBLIC_SITE_NAME", VarKind::Text, Some("Movement Site")),
    VarSpec::public(
        "PUBLIC_SITE_TAGLINE",
        VarKind::Text,
        Some("Building power for change"),
    ),
    VarSpec::public(
        "PUBLIC_SITE_DESCRIPTION",
        VarKind::Text,
        Some("A progressive movement site focused on organizing and action"),
    ),
    VarSpec::public(
        "PUBLIC_AUTHOR_NAME",
        VarKind::Text,
        Some("Your Organization"),
    ),
    VarSpec::public("PUBLIC_CONTACT_EMAIL", VarKind::Email, None),
    VarSpec::public("PUBLIC_TWITTER_HANDLE", VarKind::Text, None),
    VarSpec::public("PUBLIC_FEATURE_UPDATES", VarKind::Flag, Some("true")),
    VarSpec::public("PUBLIC_FEATURE_STORIES", VarKind::Flag, Some("true")),
    VarSpec::public("PUBLIC_FEATURE_EVENTS", VarKind::Flag, Some("true")),
    VarSpec::public("PUBLIC_FEATURE_DARKMODE", VarKind::Flag, Some("true")),
    VarSpec::public("PUBLIC_FEATURE_NEWSLETTER", VarKind::Flag, Some("true")),
    VarSpec::public("PUBLIC_FEATURE_DONATIONS", VarKind::Flag, Some("true")),
    VarSpec::public("PUBLIC_PRIMARY_ACTION", VarKind::Text, Some("Take Action")),
    VarSpec::public("PUBLIC_PRIMARY_ACTION_URL", VarKind::Text, Some("/action")),
    VarSpec::public("PUBLIC_DONATE_URL", VarKind::Text, Some(DEFAULT_DONATE_URL)),
    VarSpec::public(
        "PUBLIC_ANALYTICS",
        VarKind::Choice(ANALYTICS_VALUES),
        Some("none"),
    ),
    VarSpec::public("PUBLIC_ANALYTICS_DOMAIN", VarKind::Text, None),
    VarSpec::public("PUBLIC_ANALYTICS_WRITE_KEY", VarKind::Text, None),
    VarSpec::public("PUBLIC_GOOGLE_ANALYTICS_ID", VarKind::Text, None),
    VarSpec::public(
        "PUBLIC_ENVIRONMENT",
        VarKind::Choice(ENVIRONMENT_VALUES),
        None,
    ),
    VarSpec::public(
        "PUBLIC_DEPLOY_CONTEXT",
        VarKind::Choice(DEPLOY_CONTEXT_VALUES),
        None,
    ),
];

const PUBLIC_REFINEMENTS: &[Refinement] = &[Refinement {
    field: "PUBLIC_ANALYTICS",
    message: "Analytics configuration incomplete for selected provider",
    check: analytics_provider_configured,
}];

fn analytics_provider_configured(data: &Parsed) -> bool {
    match data.text("PUBLIC_ANALYTICS") {
        Some("plausible") => data.is_set("PUBLIC_ANALYTICS_DOMAIN"),
        Some("google") => data.is_set("PUBLIC_GOOGLE_ANALYTICS_ID"),
        _ => true,
    }
}

/// Server-only variables. Never shipped to a client.
pub const SERVER_SCHEMA: Schema = Schema {
    tier: Tier::Server,
    vars: SERVER_VARS,
    refinements: SERVER_REFINEMENTS,
};

/// Public variables, safe to embed in client bundles.
pub const PUBLIC_SCHEMA: Schema = Schema {
    tier: Tier::Public,
    vars: PUBLIC_VARS,
    refinements: PUBLIC_REFINEMENTS,
};
