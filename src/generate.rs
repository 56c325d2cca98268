//! Site generation.
//!
//! Loads the catalog, renders every artifact into memory, then replaces the
//! output directory in one pass. Nothing is written unless loading and
//! rendering both succeed, so a broken record never leaves a half-built site.
//!
//! ## Output Structure
//!
//! ```text
//! public/
//! ├── index.html              # All apps, newest first
//! ├── 404.html
//! ├── random.html
//! ├── apps.json               # Reduced projection of every app
//! ├── authors.html
//! ├── style.css
//! ├── alice.html              # Author page
//! ├── alice.json              # Author + summaries of their apps
//! ├── alice.snake.html        # App page
//! ├── alice.snake.json        # Full app, author embedded
//! └── splash/
//!     └── alice.snake.png
//! ```
//!
//! Author ids never contain a `.`, so author and app files cannot collide,
//! and reserved ids keep authors away from the fixed page names.
//!
//! ## Regeneration
//!
//! Every build removes the previous output directory first. The output
//! directory may therefore never be the data directory, one of the
//! configured input paths, or an ancestor of either; [`generate`] refuses
//! such a layout with [`GenerateError::UnsafeOutput`] before loading any
//! records.

use crate::config::{self, ConfigError, DataPaths, SiteConfig};
use crate::icons::IconResolver;
use crate::loader::{self, Catalog, LoadError};
use crate::render::{self, Renderer, View};
use crate::schema::{AppSummary, Author};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid icon pattern: {0}")]
    Icons(#[from] glob::PatternError),
    #[error("Output directory {output} would remove data directory {data}")]
    UnsafeOutput { output: PathBuf, data: PathBuf },
}

/// One file of the generated site, relative to the output directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

impl Artifact {
    fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// What a successful build produced.
#[derive(Debug)]
pub struct BuildReport {
    pub catalog: Catalog,
    pub output_dir: PathBuf,
    pub files: usize,
    pub bytes: usize,
}

/// Author JSON document: the author's own fields plus their apps.
#[derive(Serialize)]
struct AuthorDocument<'a> {
    #[serde(flatten)]
    author: &'a Author,
    apps: Vec<AppSummary<'a>>,
}

/// Build the site for the data directory `source` into `output_dir`.
pub fn generate(source: &Path, output_dir: &Path) -> Result<BuildReport, GenerateError> {
    let config = config::load_config(source)?;
    check_output_dir(source, &config.paths.resolve(source), output_dir)?;

    let catalog = loader::load_catalog(source, &config)?;
    let artifacts = render_site(&catalog, &config)?;
    write_site(&artifacts, output_dir)?;

    Ok(BuildReport {
        catalog,
        output_dir: output_dir.to_path_buf(),
        files: artifacts.len(),
        bytes: artifacts.iter().map(|a| a.contents.len()).sum(),
    })
}

/// Render every artifact of the site in memory, in a fixed order.
pub fn render_site(catalog: &Catalog, config: &SiteConfig) -> Result<Vec<Artifact>, GenerateError> {
    let icons = IconResolver::new(&config.icon_table())?;
    let renderer = Renderer::new(&config.site, icons, &catalog.splash_dir);
    let apps = catalog.apps.as_slice();
    let mut artifacts = Vec::new();

    let mut page = |path: String, view: View<'_>| {
        artifacts.push(Artifact::new(path, renderer.render(&view)));
    };
    page("index.html".into(), View::Index { apps });
    page("404.html".into(), View::NotFound { apps });
    page("random.html".into(), View::Random { apps });
    page(
        "authors.html".into(),
        View::Authors {
            authors: &catalog.authors,
        },
    );
    for app in apps {
        let categories = catalog.categories.resolve(app)?;
        page(format!("{}.html", app.id), View::App { app, categories });
    }
    for author in &catalog.authors {
        let apps = catalog.apps_by(&author.id);
        page(format!("{}.html", author.id), View::Author { author, apps });
    }

    let summaries: Vec<AppSummary<'_>> = apps.iter().map(|app| app.summary()).collect();
    artifacts.push(Artifact::new("apps.json", listing_json(&summaries)?));

    for app in apps {
        artifacts.push(Artifact::new(
            format!("{}.json", app.id),
            serde_json::to_vec(app)?,
        ));
    }
    for author in &catalog.authors {
        let document = AuthorDocument {
            author,
            apps: catalog
                .apps_by(&author.id)
                .into_iter()
                .map(|app| app.summary())
                .collect(),
        };
        artifacts.push(Artifact::new(
            format!("{}.json", author.id),
            serde_json::to_vec(&document)?,
        ));
    }

    artifacts.push(Artifact::new("style.css", render::CSS));

    for app in apps {
        if let Some(splash) = app.splash(&catalog.splash_dir) {
            let source = catalog.splash_dir.join(format!("{}.png", app.id));
            artifacts.push(Artifact::new(splash, fs::read(source)?));
        }
    }

    Ok(artifacts)
}

/// Replace `output_dir` with exactly `artifacts`.
pub fn write_site(artifacts: &[Artifact], output_dir: &Path) -> Result<(), GenerateError> {
    if output_dir.exists() {
        fs::remove_dir_all(output_dir)?;
    }
    fs::create_dir_all(output_dir)?;

    for artifact in artifacts {
        let path = output_dir.join(&artifact.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &artifact.contents)?;
    }
    Ok(())
}

/// `apps.json` layout: pretty-printed with a one-space indent.
fn listing_json<T: Serialize>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b" "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Refuse an output directory whose removal would take any input with it:
/// the data root or one of the configured input paths.
fn check_output_dir(
    source: &Path,
    inputs: &DataPaths,
    output_dir: &Path,
) -> Result<(), GenerateError> {
    let output = resolve(output_dir)?;
    let candidates: [&Path; 5] = [
        source,
        &inputs.categories,
        &inputs.authors,
        &inputs.apps,
        &inputs.splash,
    ];
    for candidate in candidates {
        let data = resolve(candidate)?;
        if data.starts_with(&output) {
            return Err(GenerateError::UnsafeOutput { output, data });
        }
    }
    Ok(())
}

/// Absolute form of `path` with symlinks resolved for the part that exists.
fn resolve(path: &Path) -> io::Result<PathBuf> {
    let path = std::path::absolute(path)?;
    match path.canonicalize() {
        Ok(canonical) => Ok(canonical),
        Err(e) if e.kind() == io::ErrorKind::NotFound => match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) => Ok(resolve(parent)?.join(name)),
            _ => Err(e),
        },
        Err(e) => Err(e),
    }
}

// ============================================================================
// Tests
// ============================================================================
