//! Error types for the Movekit core library.

use std::{fmt, path::PathBuf};

use thiserror::Error;

use crate::schema::Tier;

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Core error types for Movekit.
#[derive(Error, Debug)]
pub enum CoreError {
    /// One or more environment variables failed schema validation.
    #[error("Environment validation failed:\n{0}")]
    Schema(#[from] SchemaViolation),

    /// Configuration source loading error.
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Content entry frontmatter error.
    #[error("Frontmatter error in {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Create a new configuration error with a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source.
    pub fn config_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new frontmatter error.
    pub fn frontmatter(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Frontmatter {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A single failed check, attached to the variable it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Tier the variable belongs to.
    pub tier: Tier,

    /// Variable name the failure is reported against.
    pub field: String,

    /// Human-readable reason.
    pub message: String,
}

impl Issue {
    /// Create a new issue.
    pub fn new(tier: Tier, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tier,
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every violation found while applying a schema to a raw environment.
///
/// Issues are kept in declaration order: field checks first, then
/// refinements.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", render_issues(.issues))]
pub struct SchemaViolation {
    issues: Vec<Issue>,
}

impl SchemaViolation {
    /// Create a violation from a list of issues.
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    /// All collected issues.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Whether any issue is attached to `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }

    /// Append the issues of another violation.
    pub fn merge(&mut self, other: SchemaViolation) {
        self.issues.extend(other.issues);
    }

    pub(crate) fn push(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}

fn render_issues(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| format!("   • {issue}"))
        .collect::<Vec<_>>()
        .join("\n")
}
