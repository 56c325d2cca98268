//! # catalog-gen
//!
//! A static site generator for an app catalog. Hand-written YAML records
//! describe categories, authors and apps; the generator validates them
//! against a closed schema, joins them, and renders a set of HTML pages and
//! JSON documents that can be served from any static file host.
//!
//! # Pipeline
//!
//! ```text
//! data/  →  load  →  validate  →  join + sort  →  render  →  public/
//! ```
//!
//! Loading is fail-fast: the first invalid record aborts the build with an
//! error naming the file and field. Rendering happens entirely in memory, and
//! the output directory is only replaced once every artifact exists.
//!
//! # Data Layout
//!
//! ```text
//! data/
//! ├── config.toml                 # Optional site config
//! ├── categories.yaml             # group_slug → slug → {name, icon?}
//! ├── authors/
//! │   └── alice.yaml              # Author id = file stem
//! ├── apps/
//! │   └── alice.snake.yaml        # <author_id>.<app_id>.yaml
//! └── splash/
//!     └── alice.snake.png         # Optional splash image
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`schema`] | Record types, field constraints, the composite [`schema::AppId`] key |
//! | [`icons`] | Link name / host → icon class lookup, exact and glob entries |
//! | [`config`] | `config.toml` loading over stock defaults, validation, `gen-config` |
//! | [`loader`] | Record discovery, validation, joins, app ordering |
//! | [`render`] | Maud page templates, one [`render::View`] per page |
//! | [`generate`] | In-memory rendering of every artifact, then the output write |
//! | [`output`] | CLI output formatting for `check` and `build` |
//!
//! # Design Decisions
//!
//! ## Closed Schema
//!
//! Records are plain serde structs with `deny_unknown_fields`. Unknown and
//! missing fields are reported by name before deserialization runs, so a
//! typo in a hand-written file points at the exact key. Constraints that
//! serde cannot express (lengths, patterns, list sizes) live in each type's
//! `validate()`.
//!
//! ## Derived Values Are Accessors
//!
//! Whether a download is direct, where an app's splash image lives, and a
//! category's full slug are computed on demand from the validated fields.
//! Nothing derived is ever stored next to the data it came from.
//!
//! ## Explicit Icon Table
//!
//! Link icons come from a table in `config.toml` merged onto built-in
//! defaults and handed to the renderer. Keys are link names, hosts, or host
//! globs (`*.itch.io`).
//!
//! ## Deterministic Output
//!
//! Record files are discovered in file-name order, apps sort on a total key
//! (date, name, id), and templates use no clock or randomness, so two builds
//! of the same data are byte-identical.

pub mod config;
pub mod generate;
pub mod icons;
pub mod loader;
pub mod output;
pub mod render;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_helpers;
