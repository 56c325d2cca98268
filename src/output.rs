//! CLI output formatting for `check` and `build`.
//!
//! Output is information-first: every entity is shown by its positional
//! index and display name, with ids and file names as indented context lines.
//!
//! ## Check
//!
//! ```text
//! Categories (20)
//!     games: Arcade, Puzzle, Action
//!     tools: Editor, Clock
//!
//! Authors
//! 001 Alice Liddell (2 apps)
//!     Id: alice
//!
//! Apps
//! 001 Snake
//!     Id: alice.snake
//!     Added: 2024-03-01
//!     Categories: games/arcade, games/action
//! ```
//!
//! ## Build
//!
//! ```text
//! Site
//!     index.html
//!     apps.json (5 apps)
//!
//! Apps
//! 001 Snake → alice.snake.html
//!     JSON: alice.snake.json
//!     Splash: splash/alice.snake.png
//!
//! Authors
//! 001 Alice Liddell → alice.html
//!     JSON: alice.json
//!
//! Generated 5 app pages, 3 author pages, 1 splash image (23 files)
//! ```
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout.

use crate::generate::BuildReport;
use crate::loader::Catalog;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `1 app`, `2 apps`.
fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("{n} {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

/// Format an entity header: positional index + name, with optional detail.
///
/// ```text
/// 001 Alice Liddell (2 apps)
/// 002 Snake → alice.snake.html
/// ```
fn entity_header(index: usize, name: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} {}", format_index(index), name, d),
        None => format!("{} {}", format_index(index), name),
    }
}

/// Format the catalog inventory shown by `check`.
pub fn format_check_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(format!("Categories ({})", catalog.categories.len()));
    let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
    for category in catalog.categories.iter() {
        match groups.last_mut() {
            Some((group, names)) if *group == category.group_slug => {
                names.push(category.name.as_str());
            }
            _ => groups.push((category.group_slug.as_str(), vec![category.name.as_str()])),
        }
    }
    for (group, names) in groups {
        lines.push(format!("{}{}: {}", indent(1), group, names.join(", ")));
    }

    lines.push(String::new());
    lines.push("Authors".to_string());
    for (i, author) in catalog.authors.iter().enumerate() {
        let count = format!("({})", plural(catalog.apps_by(&author.id).len(), "app"));
        lines.push(entity_header(i + 1, &author.name, Some(&count)));
        lines.push(format!("{}Id: {}", indent(1), author.id));
    }

    lines.push(String::new());
    lines.push("Apps".to_string());
    for (i, app) in catalog.apps.iter().enumerate() {
        lines.push(entity_header(i + 1, &app.name, None));
        lines.push(format!("{}Id: {}", indent(1), app.id));
        lines.push(format!("{}Added: {}", indent(1), app.added));
        lines.push(format!(
            "{}Categories: {}",
            indent(1),
            app.categories.join(", ")
        ));
    }

    lines
}

pub fn print_check_output(catalog: &Catalog) {
    for line in format_check_output(catalog) {
        println!("{}", line);
    }
}

/// Format the summary of a finished build.
pub fn format_build_output(report: &BuildReport) -> Vec<String> {
    let catalog = &report.catalog;
    let mut lines = Vec::new();

    lines.push("Site".to_string());
    for page in ["index.html", "404.html", "random.html", "authors.html", "style.css"] {
        lines.push(format!("{}{}", indent(1), page));
    }
    lines.push(format!(
        "{}apps.json ({})",
        indent(1),
        plural(catalog.apps.len(), "app")
    ));

    lines.push(String::new());
    lines.push("Apps".to_string());
    let mut splashes = 0;
    for (i, app) in catalog.apps.iter().enumerate() {
        let target = format!("→ {}.html", app.id);
        lines.push(entity_header(i + 1, &app.name, Some(&target)));
        lines.push(format!("{}JSON: {}.json", indent(1), app.id));
        if let Some(splash) = app.splash(&catalog.splash_dir) {
            lines.push(format!("{}Splash: {}", indent(1), splash));
            splashes += 1;
        }
    }

    lines.push(String::new());
    lines.push("Authors".to_string());
    for (i, author) in catalog.authors.iter().enumerate() {
        let target = format!("→ {}.html", author.id);
        lines.push(entity_header(i + 1, &author.name, Some(&target)));
        lines.push(format!("{}JSON: {}.json", indent(1), author.id));
    }

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {} ({})",
        plural(catalog.apps.len(), "app page"),
        plural(catalog.authors.len(), "author page"),
        plural(splashes, "splash image"),
        plural(report.files, "file")
    ));

    lines
}

pub fn print_build_output(report: &BuildReport) {
    for line in format_build_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
