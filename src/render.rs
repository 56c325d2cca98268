//! HTML page rendering.
//!
//! Every page the site has is one variant of [`View`]: the variant names the
//! template and carries exactly the values that template needs. The
//! [`Renderer`] owns what all pages share (site info, the icon resolver, the
//! splash directory) and turns a view into an HTML string.
//!
//! ## Templates
//!
//! | View | Output | Values |
//! |------|--------|--------|
//! | `Index` | `index.html` | all apps |
//! | `NotFound` | `404.html` | all apps (newest few are suggested) |
//! | `Random` | `random.html` | all apps (script picks one) |
//! | `App` | `<app_id>.html` | app, resolved categories |
//! | `Authors` | `authors.html` | all authors |
//! | `Author` | `<author_id>.html` | author, their apps |
//!
//! Long-form fields (`desc`, `about`) are markdown, converted with
//! pulldown-cmark. Everything else is interpolated through maud and escaped.
//!
//! All links are relative: every page sits at the output root.

use crate::config::SiteInfo;
use crate::icons::IconResolver;
use crate::schema::{App, Author, Category};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stylesheet written next to the pages as `style.css`.
pub const CSS: &str = include_str!("../static/style.css");

const ICON_STYLESHEET: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css";

/// How many apps the 404 page suggests.
const NOT_FOUND_SUGGESTIONS: usize = 5;

/// A page to render: the template and the values it is rendered against.
#[derive(Debug)]
pub enum View<'a> {
    Index {
        apps: &'a [App],
    },
    NotFound {
        apps: &'a [App],
    },
    Random {
        apps: &'a [App],
    },
    App {
        app: &'a App,
        categories: Vec<&'a Category>,
    },
    Authors {
        authors: &'a [Arc<Author>],
    },
    Author {
        author: &'a Author,
        apps: Vec<&'a App>,
    },
}

pub struct Renderer<'a> {
    site: &'a SiteInfo,
    icons: IconResolver,
    splash_dir: PathBuf,
}

impl<'a> Renderer<'a> {
    pub fn new(site: &'a SiteInfo, icons: IconResolver, splash_dir: &Path) -> Self {
        Self {
            site,
            icons,
            splash_dir: splash_dir.to_path_buf(),
        }
    }

    pub fn render(&self, view: &View<'_>) -> String {
        let markup = match view {
            View::Index { apps } => self.render_index(apps),
            View::NotFound { apps } => self.render_not_found(apps),
            View::Random { apps } => self.render_random(apps),
            View::App { app, categories } => self.render_app(app, categories),
            View::Authors { authors } => self.render_authors(authors),
            View::Author { author, apps } => self.render_author(author, apps),
        };
        markup.into_string()
    }

    // ========================================================================
    // HTML Components
    // ========================================================================

    /// Renders the base HTML document structure
    fn base_document(&self, title: &str, current: Option<&str>, content: Markup) -> Markup {
        let full_title = if title == self.site.title {
            title.to_string()
        } else {
            format!("{} | {}", title, self.site.title)
        };
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    meta name="description" content=(self.site.description);
                    title { (full_title) }
                    link rel="stylesheet" href="style.css";
                    link rel="stylesheet" href=(ICON_STYLESHEET);
                }
                body {
                    (self.site_header(current))
                    main { (content) }
                }
            }
        }
    }

    /// Renders the site header with the top-level navigation
    fn site_header(&self, current: Option<&str>) -> Markup {
        let items = [
            ("index", "index.html", "Apps"),
            ("authors", "authors.html", "Authors"),
            ("random", "random.html", "Random"),
        ];
        html! {
            header.site-header {
                a.site-title href="index.html" { (self.site.title) }
                nav.site-nav {
                    ul {
                        @for (key, href, label) in items {
                            li class=[(current == Some(key)).then_some("current")] {
                                a href=(href) { (label) }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Renders a link list, each entry with its resolved icon when known
    fn link_list(&self, links: &BTreeMap<String, String>) -> Markup {
        html! {
            ul.links {
                @for (name, url) in links {
                    li {
                        a href=(url) rel="noopener" {
                            @if let Some(icon) = self.icons.resolve(name, url) {
                                i class=(icon) aria-hidden="true" {}
                                " "
                            }
                            (name)
                        }
                    }
                }
            }
        }
    }

    /// Renders one app as a card linking to its page
    fn app_card(&self, app: &App) -> Markup {
        html! {
            article.app-card {
                @if let Some(splash) = app.splash(&self.splash_dir) {
                    a.app-splash href={ (app.id) ".html" } {
                        img src=(splash) alt=(app.name) loading="lazy";
                    }
                }
                h2.app-name {
                    @if let Some(icon) = &app.icon {
                        i class=(icon) aria-hidden="true" {}
                        " "
                    }
                    a href={ (app.id) ".html" } { (app.name) }
                }
                p.app-meta {
                    "by "
                    a href={ (app.author.id) ".html" } { (app.author.name) }
                    " · "
                    time datetime=(app.added) { (app.added) }
                }
                p.app-short { (app.short) }
            }
        }
    }

    fn app_grid<'b>(&self, apps: impl IntoIterator<Item = &'b App>) -> Markup {
        html! {
            div.app-grid {
                @for app in apps {
                    (self.app_card(app))
                }
            }
        }
    }

    // ========================================================================
    // Page Renderers
    // ========================================================================

    /// Renders the index page: every app, newest first
    fn render_index(&self, apps: &[App]) -> Markup {
        let content = html! {
            section.intro {
                h1 { (self.site.title) }
                p { (self.site.description) }
            }
            (self.app_grid(apps))
        };
        self.base_document(&self.site.title, Some("index"), content)
    }

    /// Renders the 404 page with a few of the newest apps as suggestions
    fn render_not_found(&self, apps: &[App]) -> Markup {
        let content = html! {
            section.not-found {
                h1 { "Page not found" }
                p {
                    "There is nothing at this address. "
                    a href="index.html" { "Browse all apps" }
                    " or try one of the newest:"
                }
            }
            (self.app_grid(apps.iter().take(NOT_FOUND_SUGGESTIONS)))
        };
        self.base_document("Page not found", None, content)
    }

    /// Renders the random page: a script jumps to one of the listed apps
    fn render_random(&self, apps: &[App]) -> Markup {
        let content = html! {
            section.random {
                h1 { "Random app" }
                p { "Picking an app for you…" }
                ul id="random-apps" {
                    @for app in apps {
                        li { a href={ (app.id) ".html" } { (app.name) } }
                    }
                }
            }
            script {
                (PreEscaped(
                    "const links = document.querySelectorAll('#random-apps a');\n\
                     if (links.length > 0) {\n\
                     \x20   location.replace(links[Math.floor(Math.random() * links.length)].href);\n\
                     }\n"
                ))
            }
        };
        self.base_document("Random app", Some("random"), content)
    }

    /// Renders an app's detail page
    fn render_app(&self, app: &App, categories: &[&Category]) -> Markup {
        let content = html! {
            article.app-page {
                @if let Some(splash) = app.splash(&self.splash_dir) {
                    img.splash src=(splash) alt=(app.name);
                }
                header.app-header {
                    h1 {
                        @if let Some(icon) = &app.icon {
                            i class=(icon) aria-hidden="true" {}
                            " "
                        }
                        (app.name)
                    }
                    p.app-meta {
                        "by "
                        a href={ (app.author.id) ".html" } { (app.author.name) }
                        @if let Some(pronouns) = &app.author.pronouns {
                            " (" (pronouns) ")"
                        }
                        " · added "
                        time datetime=(app.added) { (app.added) }
                    }
                    p.app-short { (app.short) }
                }
                p.download {
                    @if app.direct() {
                        a.button href=(app.download) download { "Download" }
                    } @else {
                        a.button href=(app.download) rel="noopener" { "Download page" }
                    }
                }
                ul.categories {
                    @for category in categories {
                        li data-slug=(category.full_slug()) {
                            @if let Some(icon) = &category.icon {
                                i class=(icon) aria-hidden="true" {}
                                " "
                            }
                            (category.name)
                        }
                    }
                }
                @if let Some(links) = &app.links {
                    (self.link_list(links))
                }
                section.app-desc {
                    (markdown(&app.desc))
                }
                footer {
                    a href={ (app.id) ".json" } { "JSON" }
                }
            }
        };
        self.base_document(&app.name, None, content)
    }

    /// Renders the list of all authors
    fn render_authors(&self, authors: &[Arc<Author>]) -> Markup {
        let content = html! {
            h1 { "Authors" }
            ul.author-list {
                @for author in authors {
                    li {
                        a href={ (author.id) ".html" } { (author.name) }
                        @if let Some(pronouns) = &author.pronouns {
                            span.pronouns { " (" (pronouns) ")" }
                        }
                        p.author-short { (author.short) }
                    }
                }
            }
        };
        self.base_document("Authors", Some("authors"), content)
    }

    /// Renders an author's page with their apps
    fn render_author(&self, author: &Author, apps: &[&App]) -> Markup {
        let content = html! {
            article.author-page {
                header {
                    h1 {
                        (author.name)
                        @if let Some(pronouns) = &author.pronouns {
                            span.pronouns { " (" (pronouns) ")" }
                        }
                    }
                    p.author-short { (author.short) }
                }
                (self.link_list(&author.links))
                @if let Some(about) = &author.about {
                    section.author-about {
                        (markdown(about))
                    }
                }
                h2 { "Apps" }
                @if apps.is_empty() {
                    p.empty { "No apps published yet." }
                } @else {
                    (self.app_grid(apps.iter().copied()))
                }
                footer {
                    a href={ (author.id) ".json" } { "JSON" }
                }
            }
        };
        self.base_document(&author.name, None, content)
    }
}

/// Convert markdown to HTML
fn markdown(source: &str) -> PreEscaped<String> {
    let mut body = String::new();
    md_html::push_html(&mut body, Parser::new(source));
    PreEscaped(body)
}

// ============================================================================
// Tests
// ============================================================================
