//! Record schema for categories, authors, and apps.
//!
//! Every record in the data directory is hand-written YAML, so the schema is
//! closed: a key that is not declared here is rejected instead of silently
//! ignored. A typo like `downlaod:` fails the build with the record and field
//! named, rather than producing an app page without a download button.
//!
//! ## Validation Order
//!
//! Each record goes through the same three steps:
//!
//! 1. **Shape**: the raw YAML must be a mapping whose keys are all declared
//!    and whose required keys are all present.
//! 2. **Types**: serde deserializes the mapping into the record struct
//!    (`deny_unknown_fields` repeats the closed-schema rule at the type level).
//! 3. **Content**: patterns and length bounds are checked field by field.
//!
//! The first failure is returned as a [`SchemaViolation`]. Validation is pure:
//! nothing here touches the filesystem except [`App::splash`], which only
//! probes for a file's existence.
//!
//! ## Identity
//!
//! Authors and apps take their ids from file names, never from file content.
//! App files are named `<author>.<app>.yaml`; the stem is parsed into an
//! [`AppId`] whose author segment decides which [`Author`] the app is joined
//! with.
//!
//! Lengths are counted in characters (Unicode scalar values), not bytes.

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// A record failed a schema constraint.
///
/// `record` is the record's identifier (author id, app id, category full slug,
/// or file name when no id could be derived). `field` is `*` when the problem
/// concerns the record as a whole, e.g. a type mismatch reported by serde.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{record}: field `{field}` {reason}")]
pub struct SchemaViolation {
    pub record: String,
    pub field: String,
    pub reason: String,
}

impl SchemaViolation {
    pub fn new(record: &str, field: &str, reason: impl Into<String>) -> Self {
        Self {
            record: record.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

static GROUP_SLUG: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[a-z-]{3,}$"));
static CATEGORY_SLUG: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[a-zA-Z0-9-]+$"));
static CATEGORY_ICON: LazyLock<Regex> = LazyLock::new(|| pattern(r"^fa.+$"));
static APP_ICON: LazyLock<Regex> = LazyLock::new(|| pattern(r"^fa-"));
static PRONOUNS: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[a-z]{1,8}/[a-z]{1,8}$"));
static ADDED: LazyLock<Regex> = LazyLock::new(|| pattern(r"^20[234][0-9]-[01][0-9]-[0123][0-9]$"));
static DOWNLOAD: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"^https://[^/]+/(?:[^/]+/)*[^/]+\.[A-Za-z0-9]+$"));

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("schema patterns are valid regexes")
}

/// Maximum number of entries in a `links` mapping.
pub const MAX_LINKS: usize = 16;

/// Maximum length of an author id and of each app id segment.
pub const MAX_ID_LEN: usize = 16;

// ============================================================================
// Field checks
// ============================================================================

/// Field-level checks bound to one record, so every violation names it.
struct Fields<'a> {
    record: &'a str,
}

impl Fields<'_> {
    fn violation(&self, field: &str, reason: impl Into<String>) -> SchemaViolation {
        SchemaViolation::new(self.record, field, reason)
    }

    fn matches(&self, field: &str, value: &str, re: &Regex) -> Result<(), SchemaViolation> {
        if re.is_match(value) {
            Ok(())
        } else {
            Err(self.violation(
                field,
                format!("value {value:?} does not match {}", re.as_str()),
            ))
        }
    }

    fn length(
        &self,
        field: &str,
        value: &str,
        min: usize,
        max: Option<usize>,
    ) -> Result<(), SchemaViolation> {
        let len = value.chars().count();
        if len < min {
            return Err(self.violation(
                field,
                format!("must be at least {min} characters (got {len})"),
            ));
        }
        if let Some(max) = max
            && len > max
        {
            return Err(self.violation(
                field,
                format!("must be at most {max} characters (got {len})"),
            ));
        }
        Ok(())
    }

    fn entries(
        &self,
        field: &str,
        count: usize,
        min: usize,
        max: Option<usize>,
    ) -> Result<(), SchemaViolation> {
        if count < min {
            return Err(self.violation(
                field,
                format!("must have at least {min} entries (got {count})"),
            ));
        }
        if let Some(max) = max
            && count > max
        {
            return Err(self.violation(
                field,
                format!("must have at most {max} entries (got {count})"),
            ));
        }
        Ok(())
    }

    fn optional<T>(
        &self,
        value: Option<&T>,
        check: impl FnOnce(&T) -> Result<(), SchemaViolation>,
    ) -> Result<(), SchemaViolation> {
        value.map_or(Ok(()), check)
    }
}

/// Closed-schema deserialization of a raw YAML value into a record struct.
///
/// Unknown and missing keys are reported by name before serde runs, since
/// serde's own messages don't say which record they came from.
fn parse_record<T: DeserializeOwned>(
    record: &str,
    raw: serde_yaml::Value,
    allowed: &[&str],
    required: &[&str],
) -> Result<T, SchemaViolation> {
    let serde_yaml::Value::Mapping(map) = &raw else {
        return Err(SchemaViolation::new(record, "*", "record must be a mapping"));
    };
    for key in map.keys() {
        let Some(name) = key.as_str() else {
            return Err(SchemaViolation::new(
                record,
                &format!("{key:?}"),
                "field names must be strings",
            ));
        };
        if !allowed.contains(&name) {
            return Err(SchemaViolation::new(
                record,
                name,
                format!("is not a known field (expected one of: {})", allowed.join(", ")),
            ));
        }
    }
    for field in required {
        if !map.contains_key(*field) {
            return Err(SchemaViolation::new(record, field, "is required"));
        }
    }
    serde_yaml::from_value(raw).map_err(|e| SchemaViolation::new(record, "*", e.to_string()))
}

// ============================================================================
// Category
// ============================================================================

/// Fields of a category entry inside `categories.yaml`.
///
/// The group and slug come from the enclosing mapping keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

const CATEGORY_FIELDS: &[&str] = &["name", "icon"];
const CATEGORY_REQUIRED: &[&str] = &["name"];

/// A tag under which apps are grouped, addressed by its full slug.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub group_slug: String,
    pub slug: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    /// Validate a raw `{name, icon?}` entry found under `group_slug → slug`.
    pub fn parse(
        group_slug: &str,
        slug: &str,
        raw: serde_yaml::Value,
    ) -> Result<Self, SchemaViolation> {
        let record_id = format!("{group_slug}/{slug}");
        let record = parse_record(&record_id, raw, CATEGORY_FIELDS, CATEGORY_REQUIRED)?;
        Self::from_record(group_slug, slug, record)
    }

    pub fn from_record(
        group_slug: &str,
        slug: &str,
        record: CategoryRecord,
    ) -> Result<Self, SchemaViolation> {
        let category = Self {
            group_slug: group_slug.to_string(),
            slug: slug.to_string(),
            name: record.name,
            icon: record.icon,
        };
        category.validate()?;
        Ok(category)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let full_slug = self.full_slug();
        let f = Fields { record: &full_slug };
        f.matches("group_slug", &self.group_slug, &GROUP_SLUG)?;
        f.matches("slug", &self.slug, &CATEGORY_SLUG)?;
        f.length("name", &self.name, 1, None)?;
        f.optional(self.icon.as_ref(), |icon| {
            f.matches("icon", icon, &CATEGORY_ICON)
        })
    }

    /// `group_slug/slug`, the lookup key across the whole category set.
    pub fn full_slug(&self) -> String {
        format!("{}/{}", self.group_slug, self.slug)
    }
}

// ============================================================================
// Author
// ============================================================================

/// Contents of an `authors/<id>.yaml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthorRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    pub links: BTreeMap<String, String>,
    pub short: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

const AUTHOR_FIELDS: &[&str] = &["name", "pronouns", "links", "short", "about"];
const AUTHOR_REQUIRED: &[&str] = &["name", "links", "short"];

/// A person or entity publishing apps. The id is the file stem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pronouns: Option<String>,
    pub links: BTreeMap<String, String>,
    pub short: String,
    /// Long-form markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl Author {
    pub fn parse(id: &str, raw: serde_yaml::Value) -> Result<Self, SchemaViolation> {
        let record = parse_record(id, raw, AUTHOR_FIELDS, AUTHOR_REQUIRED)?;
        Self::from_record(id, record)
    }

    pub fn from_record(id: &str, record: AuthorRecord) -> Result<Self, SchemaViolation> {
        let author = Self {
            id: id.to_string(),
            name: record.name,
            pronouns: record.pronouns,
            links: record.links,
            short: record.short,
            about: record.about,
        };
        author.validate()?;
        Ok(author)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let f = Fields { record: &self.id };
        validate_id_segment(&f, "id", &self.id)?;
        f.length("name", &self.name, 2, Some(40))?;
        f.optional(self.pronouns.as_ref(), |p| {
            f.matches("pronouns", p, &PRONOUNS)
        })?;
        f.entries("links", self.links.len(), 1, Some(MAX_LINKS))?;
        f.length("short", &self.short, 4, Some(140))?;
        f.optional(self.about.as_ref(), |about| {
            f.length("about", about, 10, Some(10_000))
        })
    }
}

/// Author ids and app id segments: 1–16 characters, no `.` separator.
fn validate_id_segment(f: &Fields<'_>, field: &str, value: &str) -> Result<(), SchemaViolation> {
    f.length(field, value, 1, Some(MAX_ID_LEN))?;
    if value.contains('.') || value.contains('/') {
        return Err(f.violation(field, format!("value {value:?} must not contain '.' or '/'")));
    }
    Ok(())
}

// ============================================================================
// App
// ============================================================================

/// Composite app identity `<author>.<app>`, parsed from the record's file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId {
    author: String,
    app: String,
}

impl AppId {
    pub fn new(author: &str, app: &str) -> Result<Self, SchemaViolation> {
        let display = format!("{author}.{app}");
        let f = Fields { record: &display };
        validate_id_segment(&f, "id", author)?;
        validate_id_segment(&f, "id", app)?;
        Ok(Self {
            author: author.to_string(),
            app: app.to_string(),
        })
    }

    /// The author segment; selects the [`Author`] this app is joined with.
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn app(&self) -> &str {
        &self.app
    }
}

impl FromStr for AppId {
    type Err = SchemaViolation;

    /// Parse `author.app`. Exactly one `.` is allowed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((author, app)) => Self::new(author, app),
            None => Err(SchemaViolation::new(
                s,
                "id",
                "must have the form <author>.<app>",
            )),
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.author, self.app)
    }
}

impl Serialize for AppId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Contents of an `apps/<author>.<app>.yaml` file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppRecord {
    pub name: String,
    pub short: String,
    pub added: String,
    pub download: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub categories: Vec<String>,
    pub desc: String,
}

const APP_FIELDS: &[&str] = &[
    "name",
    "short",
    "added",
    "download",
    "links",
    "icon",
    "categories",
    "desc",
];
const APP_REQUIRED: &[&str] = &["name", "short", "added", "download", "categories", "desc"];

/// A described piece of software, joined with its author.
///
/// The author is shared with every other app by the same author; category
/// references stay as full slugs and are resolved against
/// [`Categories`](crate::loader::Categories) when needed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct App {
    pub id: AppId,
    pub name: String,
    pub author: Arc<Author>,
    pub short: String,
    /// `YYYY-MM-DD`; sorts lexicographically in date order.
    pub added: String,
    pub download: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Category full slugs, in authored order.
    pub categories: Vec<String>,
    /// Long-form markdown.
    pub desc: String,
}

/// Reduced projection of an [`App`] used by listing artifacts.
#[derive(Debug, Serialize)]
pub struct AppSummary<'a> {
    pub id: &'a AppId,
    pub name: &'a str,
    pub author: &'a str,
    pub short: &'a str,
    pub added: &'a str,
}

impl App {
    pub fn parse(
        id: AppId,
        author: Arc<Author>,
        raw: serde_yaml::Value,
    ) -> Result<Self, SchemaViolation> {
        let record = parse_record(&id.to_string(), raw, APP_FIELDS, APP_REQUIRED)?;
        Self::from_record(id, author, record)
    }

    pub fn from_record(
        id: AppId,
        author: Arc<Author>,
        record: AppRecord,
    ) -> Result<Self, SchemaViolation> {
        if id.author() != author.id {
            return Err(SchemaViolation::new(
                &id.to_string(),
                "author",
                format!("is {:?} but the id names {:?}", author.id, id.author()),
            ));
        }
        let app = Self {
            id,
            name: record.name,
            author,
            short: record.short,
            added: record.added,
            download: record.download,
            links: record.links,
            icon: record.icon,
            categories: record.categories,
            desc: record.desc,
        };
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<(), SchemaViolation> {
        let record_id = self.id.to_string();
        let f = Fields { record: &record_id };
        f.length("name", &self.name, 2, Some(40))?;
        f.length("short", &self.short, 4, Some(140))?;
        f.matches("added", &self.added, &ADDED)?;
        f.matches("download", &self.download, &DOWNLOAD)?;
        f.optional(self.links.as_ref(), |links| {
            f.entries("links", links.len(), 0, Some(MAX_LINKS))
        })?;
        f.optional(self.icon.as_ref(), |icon| f.matches("icon", icon, &APP_ICON))?;
        f.entries("categories", self.categories.len(), 1, None)?;
        f.length("desc", &self.desc, 10, Some(10_000))
    }

    /// True if `download` points straight at the archive rather than a
    /// landing page.
    pub fn direct(&self) -> bool {
        self.download.ends_with(".zip")
    }

    /// Site-relative path of the app's splash image, if `splash_dir` has one.
    pub fn splash(&self, splash_dir: &Path) -> Option<String> {
        let file_name = format!("{}.png", self.id);
        splash_dir
            .join(&file_name)
            .is_file()
            .then(|| format!("splash/{file_name}"))
    }

    pub fn summary(&self) -> AppSummary<'_> {
        AppSummary {
            id: &self.id,
            name: &self.name,
            author: &self.author.name,
            short: &self.short,
            added: &self.added,
        }
    }
}
