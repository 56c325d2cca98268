//! Data loading: discover record files, validate them, and join them.
//!
//! ## Data Layout
//!
//! ```text
//! data/
//! ├── config.toml                # Site configuration (optional)
//! ├── categories.yaml            # group → slug → {name, icon?}
//! ├── authors/
//! │   ├── alice.yaml             # Author id = file stem
//! │   └── bob.yaml
//! ├── apps/
//! │   ├── alice.snake.yaml       # <author_id>.<app_id>.yaml
//! │   └── bob.clock.yaml
//! └── splash/
//!     └── alice.snake.png        # Optional, existence-checked only
//! ```
//!
//! ## Validation
//!
//! Loading is fail-fast: the first invalid record aborts the whole load, so
//! a site is never generated with entries silently dropped. On top of the
//! per-record schema, the loader enforces the cross-record rules:
//!
//! - At least [`MIN_CATEGORIES`] categories, each full slug defined once
//! - Author ids are unique and not one of [`RESERVED_IDS`]
//! - Every app's author exists and every app category resolves
//!
//! Files are visited in file-name order so that errors and output are the
//! same on every machine.

use crate::config::{DataPaths, SiteConfig};
use crate::schema::{App, AppId, Author, Category, SchemaViolation};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use walkdir::WalkDir;

/// Fewest categories a catalog may define.
pub const MIN_CATEGORIES: usize = 20;

/// Author ids that would collide with pages and assets the build writes itself.
pub const RESERVED_IDS: &[&str] = &["index", "apps", "authors", "random", "404", "splash"];

const RECORD_EXTENSIONS: &[&str] = &["yaml", "yml"];

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("YAML error in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid record in {path}: {source}")]
    Schema {
        path: PathBuf,
        source: SchemaViolation,
    },
    #[error("App {app} references unknown author {author:?}")]
    UnknownAuthor { app: String, author: String },
    #[error("App {app} references unknown category {category:?}")]
    UnknownCategory { app: String, category: String },
    #[error("Author id {0:?} is reserved for generated pages")]
    ReservedIdentifier(String),
    #[error("Found {found} categories, at least {required} are required")]
    InsufficientCategories { found: usize, required: usize },
    #[error("Category {0} is defined more than once")]
    DuplicateCategory(String),
    #[error("Author {0:?} is defined by more than one file")]
    DuplicateAuthor(String),
    #[error("App {0} is defined by more than one file")]
    DuplicateApp(String),
    #[error("App file name must be <author_id>.<app_id>.yaml: {0}")]
    InvalidFileName(PathBuf),
}

/// The validated, joined input graph handed to the generator.
#[derive(Debug)]
pub struct Catalog {
    pub categories: Categories,
    /// Sorted by id.
    pub authors: Vec<Arc<Author>>,
    /// Newest first, see [`sort_apps`].
    pub apps: Vec<App>,
    pub splash_dir: PathBuf,
}

impl Catalog {
    /// Apps published by `author_id`, in catalog order.
    pub fn apps_by(&self, author_id: &str) -> Vec<&App> {
        self.apps
            .iter()
            .filter(|app| app.author.id == author_id)
            .collect()
    }
}

/// Load and join the whole catalog under `root`.
pub fn load_catalog(root: &Path, config: &SiteConfig) -> Result<Catalog, LoadError> {
    let DataPaths {
        categories,
        authors,
        apps,
        splash,
    } = config.paths.resolve(root);

    let categories = load_categories(&categories)?;
    let authors = load_authors(&authors)?;
    let apps = load_apps(&apps, &authors, &categories)?;

    Ok(Catalog {
        categories,
        authors,
        apps,
        splash_dir: splash,
    })
}

// ============================================================================
// Categories
// ============================================================================

/// The flattened category set, in authored order, indexed by full slug.
#[derive(Debug, Clone)]
pub struct Categories {
    items: Vec<Category>,
    index: BTreeMap<String, usize>,
}

impl Categories {
    pub fn new(items: Vec<Category>) -> Result<Self, LoadError> {
        let mut index = BTreeMap::new();
        for (pos, category) in items.iter().enumerate() {
            let full_slug = category.full_slug();
            if index.insert(full_slug.clone(), pos).is_some() {
                return Err(LoadError::DuplicateCategory(full_slug));
            }
        }
        if items.len() < MIN_CATEGORIES {
            return Err(LoadError::InsufficientCategories {
                found: items.len(),
                required: MIN_CATEGORIES,
            });
        }
        Ok(Self { items, index })
    }

    pub fn get(&self, full_slug: &str) -> Option<&Category> {
        self.index.get(full_slug).map(|&pos| &self.items[pos])
    }

    /// The app's categories in the order the app lists them.
    pub fn resolve(&self, app: &App) -> Result<Vec<&Category>, LoadError> {
        app.categories
            .iter()
            .map(|slug| {
                self.get(slug).ok_or_else(|| LoadError::UnknownCategory {
                    app: app.id.to_string(),
                    category: slug.clone(),
                })
            })
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Load the nested `group_slug → slug → {name, icon?}` file.
pub fn load_categories(path: &Path) -> Result<Categories, LoadError> {
    let schema_error = |source| LoadError::Schema {
        path: path.to_path_buf(),
        source,
    };
    let record_name = path.file_name().map_or_else(
        || path.display().to_string(),
        |n| n.to_string_lossy().into_owned(),
    );

    let serde_yaml::Value::Mapping(groups) = read_yaml(path)? else {
        return Err(schema_error(SchemaViolation::new(
            &record_name,
            "*",
            "must be a mapping of group slugs",
        )));
    };

    let mut items = Vec::new();
    for (group_key, group) in groups {
        let group_slug = mapping_key(&group_key).ok_or_else(|| {
            schema_error(SchemaViolation::new(
                &record_name,
                &format!("{group_key:?}"),
                "group slugs must be strings",
            ))
        })?;
        let serde_yaml::Value::Mapping(entries) = group else {
            return Err(schema_error(SchemaViolation::new(
                &record_name,
                &group_slug,
                "must be a mapping of category slugs",
            )));
        };
        for (slug_key, raw) in entries {
            let slug = mapping_key(&slug_key).ok_or_else(|| {
                schema_error(SchemaViolation::new(
                    &record_name,
                    &format!("{group_slug}/{slug_key:?}"),
                    "category slugs must be strings",
                ))
            })?;
            items.push(Category::parse(&group_slug, &slug, raw).map_err(schema_error)?);
        }
    }
    Categories::new(items)
}

/// YAML keys may parse as numbers (`3d:`); slugs are their text form.
fn mapping_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

// ============================================================================
// Authors
// ============================================================================

/// Load one author per record file in `dir`; the file stem is the id.
pub fn load_authors(dir: &Path) -> Result<Vec<Arc<Author>>, LoadError> {
    let mut authors = Vec::new();
    let mut seen = BTreeSet::new();

    for path in record_files(dir)? {
        let id = file_stem(&path);
        if RESERVED_IDS.iter().any(|r| r.eq_ignore_ascii_case(&id)) {
            return Err(LoadError::ReservedIdentifier(id));
        }
        if !seen.insert(id.clone()) {
            return Err(LoadError::DuplicateAuthor(id));
        }
        let author = Author::parse(&id, read_yaml(&path)?)
            .map_err(|source| LoadError::Schema { path, source })?;
        authors.push(Arc::new(author));
    }
    Ok(authors)
}

// ============================================================================
// Apps
// ============================================================================

/// Load one app per `<author_id>.<app_id>.yaml` file in `dir`, joined with
/// its author, checked against the categories, and sorted newest first.
pub fn load_apps(
    dir: &Path,
    authors: &[Arc<Author>],
    categories: &Categories,
) -> Result<Vec<App>, LoadError> {
    let mut apps = Vec::new();
    let mut seen = BTreeSet::new();

    for path in record_files(dir)? {
        let stem = file_stem(&path);
        if stem.matches('.').count() != 1 {
            return Err(LoadError::InvalidFileName(path));
        }
        let id: AppId = match stem.parse() {
            Ok(id) => id,
            Err(source) => return Err(LoadError::Schema { path, source }),
        };
        if !seen.insert(id.clone()) {
            return Err(LoadError::DuplicateApp(id.to_string()));
        }

        let author = authors
            .iter()
            .find(|a| a.id == id.author())
            .ok_or_else(|| LoadError::UnknownAuthor {
                app: id.to_string(),
                author: id.author().to_string(),
            })?;

        let raw = read_yaml(&path)?;
        let app = App::parse(id, Arc::clone(author), raw)
            .map_err(|source| LoadError::Schema { path, source })?;
        categories.resolve(&app)?;
        apps.push(app);
    }

    sort_apps(&mut apps);
    Ok(apps)
}

/// Catalog order: `added` descending, then name case-insensitively, then id.
///
/// The id tie-break makes the order total, so sorting is deterministic and
/// idempotent.
pub fn sort_apps(apps: &mut [App]) {
    apps.sort_by(|a, b| {
        b.added
            .cmp(&a.added)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ============================================================================
// Filesystem helpers
// ============================================================================

/// YAML record files directly inside `dir`, sorted by file name.
///
/// Hidden files and files with other extensions are skipped.
fn record_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        let is_record = !name.starts_with('.')
            && entry
                .path()
                .extension()
                .is_some_and(|ext| RECORD_EXTENSIONS.iter().any(|r| ext.eq_ignore_ascii_case(r)));
        if is_record {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn read_yaml(path: &Path) -> Result<serde_yaml::Value, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}
