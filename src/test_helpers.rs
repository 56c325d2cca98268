//! Shared test utilities for the catalog-gen test suite.
//!
//! Two ways to get a data directory:
//!
//! - [`setup_fixtures`] copies the committed `fixtures/catalog/` tree (three
//!   authors, five apps, a splash image) into a temp dir.
//! - [`minimal_catalog`] writes just enough categories to pass validation
//!   and leaves `authors/` and `apps/` empty for the test to fill with
//!   [`write_author`] and [`write_app`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = minimal_catalog();
//! write_author(tmp.path(), "alice", "Alice");
//! write_app(tmp.path(), "alice.snake", "Snake", "2024-01-01", &["games/arcade"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::schema::Author;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/catalog/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// A data directory with exactly 20 categories and no authors or apps.
pub fn minimal_catalog() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_file(tmp.path(), "categories.yaml", &categories_yaml());
    std::fs::create_dir_all(tmp.path().join("authors")).unwrap();
    std::fs::create_dir_all(tmp.path().join("apps")).unwrap();
    tmp
}

/// Two groups of ten: `games/*` and `tools/*`.
pub fn categories_yaml() -> String {
    let groups: [(&str, [&str; 10]); 2] = [
        (
            "games",
            [
                "arcade",
                "puzzle",
                "action",
                "racing",
                "strategy",
                "rpg",
                "sports",
                "platformer",
                "shooter",
                "music",
            ],
        ),
        (
            "tools",
            [
                "editor",
                "viewer",
                "clock",
                "calculator",
                "notes",
                "paint",
                "terminal",
                "emulator",
                "system",
                "network",
            ],
        ),
    ];
    let mut out = String::new();
    for (group, slugs) in groups {
        out.push_str(&format!("{group}:\n"));
        for slug in slugs {
            out.push_str(&format!("  {slug}:\n    name: {}\n", capitalize(slug)));
        }
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

pub fn write_author(root: &Path, id: &str, name: &str) {
    write_file(root, &format!("authors/{id}.yaml"), &author_yaml(name));
}

pub fn write_app(root: &Path, id: &str, name: &str, added: &str, categories: &[&str]) {
    write_file(
        root,
        &format!("apps/{id}.yaml"),
        &app_yaml(name, added, categories),
    );
}

// =========================================================================
// Record builders
// =========================================================================

pub fn yaml(source: &str) -> serde_yaml::Value {
    serde_yaml::from_str(source).unwrap()
}

/// A valid author record with the given display name.
pub fn author_yaml(name: &str) -> String {
    format!(
        "name: \"{name}\"\nshort: Makes small games\nlinks:\n  github: https://github.com/example\n"
    )
}

/// A valid app record; `categories` may be empty to provoke a violation.
pub fn app_yaml(name: &str, added: &str, categories: &[&str]) -> String {
    format!(
        "name: \"{name}\"\n\
         short: A tiny app\n\
         added: \"{added}\"\n\
         download: https://example.com/releases/app.zip\n\
         categories: [{}]\n\
         desc: A longer description of what the app does.\n",
        categories.join(", ")
    )
}

/// A validated author named "Alice" with the given id.
pub fn sample_author(id: &str) -> Author {
    Author::parse(id, yaml(&author_yaml("Alice"))).unwrap()
}
