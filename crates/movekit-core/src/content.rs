//! Content collection schemas.
//!
//! Three collections (projects, stories, events) of documents with YAML or
//! TOML frontmatter. Discovery of the files is the caller's concern; this
//! module only defines and enforces the entry shapes.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};

use crate::error::{CoreError, Result};

/// A named content collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    /// Long-running campaign projects.
    Projects,
    /// Published stories.
    Stories,
    /// Upcoming and past events.
    Events,
}

impl Collection {
    /// Every collection.
    pub const ALL: [Collection; 3] = [Self::Projects, Self::Stories, Self::Events];

    /// Collection name, also its directory under the content root.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Stories => "stories",
            Self::Events => "events",
        }
    }

    /// Accepted file extensions.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Projects => &["mdx"],
            Self::Stories | Self::Events => &["md", "mdx"],
        }
    }

    /// Whether `path` has an extension this collection accepts.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions().contains(&ext))
    }
}

/// Frontmatter of a project entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub title: String,
    pub author: String,
    pub description: String,
}

/// Frontmatter of a story entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryEntry {
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub publish_date: DateTime<Utc>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub image_alt: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Frontmatter of an event entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry {
    pub title: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub start_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub end_date: Option<DateTime<Utc>>,
    pub location: String,
    #[serde(default, rename = "virtual")]
    pub is_virtual: Option<bool>,
    #[serde(default)]
    pub registration_url: Option<String>,
    #[serde(default)]
    pub capacity: Option<f64>,
}

/// A validated entry of any collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Project(ProjectEntry),
    Story(StoryEntry),
    Event(EventEntry),
}

impl Entry {
    /// Entry title.
    pub fn title(&self) -> &str {
        match self {
            Self::Project(e) => &e.title,
            Self::Story(e) => &e.title,
            Self::Event(e) => &e.title,
        }
    }

    /// Collection the entry belongs to.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Project(_) => Collection::Projects,
            Self::Story(_) => Collection::Stories,
            Self::Event(_) => Collection::Events,
        }
    }
}

/// Delimiter types for frontmatter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontmatterFormat {
    /// YAML frontmatter delimited by `---`.
    Yaml,
    /// TOML frontmatter delimited by `+++`.
    Toml,
}

impl FrontmatterFormat {
    /// Get the delimiter string for this format.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Self::Yaml => "---",
            Self::Toml => "+++",
        }
    }
}

/// Split a document into frontmatter and body.
pub fn split_frontmatter(content: &str) -> Option<(FrontmatterFormat, &str, &str)> {
    let content = content.trim_start();

    let format = if content.starts_with("---") {
        FrontmatterFormat::Yaml
    } else if content.starts_with("+++") {
        FrontmatterFormat::Toml
    } else {
        return None;
    };

    let delimiter = format.delimiter();
    let after_first = &content[delimiter.len()..];
    let closing_pos = after_first.find(delimiter)?;

    let frontmatter = after_first[..closing_pos].trim();
    let body = after_first[closing_pos + delimiter.len()..].trim_start();

    Some((format, frontmatter, body))
}

/// Parse and validate a document against a collection's schema.
pub fn parse_entry(collection: Collection, content: &str, path: &Path) -> Result<Entry> {
    let Some((format, fm, _body)) = split_frontmatter(content) else {
        return Err(CoreError::frontmatter(path, "missing frontmatter block"));
    };

    let entry = match collection {
        Collection::Projects => Entry::Project(decode(format, fm, path)?),
        Collection::Stories => Entry::Story(decode(format, fm, path)?),
        Collection::Events => Entry::Event(decode(format, fm, path)?),
    };

    tracing::debug!(collection = collection.name(), title = entry.title(), ?path, "Parsed entry");
    Ok(entry)
}

fn decode<T: DeserializeOwned>(format: FrontmatterFormat, fm: &str, path: &Path) -> Result<T> {
    match format {
        FrontmatterFormat::Yaml => {
            serde_yaml::from_str(fm).map_err(|e| CoreError::frontmatter(path, e.to_string()))
        }
        FrontmatterFormat::Toml => {
            toml::from_str(fm).map_err(|e| CoreError::frontmatter(path, e.to_string()))
        }
    }
}

/// Date as written in frontmatter: plain string, or a TOML datetime literal.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Toml(toml::value::Datetime),
}

/// Parse `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS`, or RFC 3339.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match RawDate::deserialize(deserializer)? {
        RawDate::Text(s) => s,
        RawDate::Toml(dt) => dt.to_string(),
    };
    parse_date(&text).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {text}")))
}

fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_date(deserializer).map(Some)
}
