//! # genysite
//!
//! A static site generator with two output strategies from one content tree:
//! pre-rendered HTML pages, or a client-rendered app bundle whose routes
//! mirror the same pages.
//!
//! # Architecture: One Build, Five Stages
//!
//! ```text
//! 1. Config      genysite.toml + src/template/config.toml  →  SiteConfig
//! 2. Runtime     SiteConfig                                →  TemplateRuntime (minijinja + filters)
//! 3. Resolve     src/pages                                 →  page tree + page/directory pools
//! 4. Materialize directory pool + src/assets               →  dist/ skeleton, compiled CSS
//! 5. Render      tree + pools + runtime                    →  dist/*.html  |  dist/index.html + bundle
//! ```
//!
//! Stages run in order inside [`site::build`]; each is a plain function over
//! the previous stage's output, so unit tests drive them in isolation with
//! temporary directories.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | Layered TOML config: stock defaults, template config, project config |
//! | [`runtime`] | Template engine with URL filters and `highlight` / `markdown` blocks |
//! | [`tree`] | Walks `src/pages` into the ordered navigation tree and flat pools |
//! | [`naming`] | Raw names, page keys, and output path rules |
//! | [`types`] | Tree node and page source types shared across stages |
//! | [`materialize`] | Clears and lays out the destination, copies assets, compiles stylesheets |
//! | [`stylesheet`] | Sass compiler seam ([`stylesheet::StylesheetCompiler`]) |
//! | [`markdown`] | Markdown to HTML conversion |
//! | [`render`] | Strategy dispatch: static pages or a bundled client app |
//! | [`site`] | Build orchestration and project layout |
//! | [`catalog`] | Built-in templates and template installation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Minijinja For Page Templates
//!
//! Pages and layouts are user files, so they are rendered with a runtime
//! template engine. Markup generated by the tool itself (the default app
//! shell, injected script tags) uses [Maud](https://maud.lambda.xyz/).
//!
//! ## External Bundler
//!
//! The client app is staged as plain ES modules and handed to an external
//! command (esbuild by default). The [`render::bundler::Bundler`] trait keeps
//! that process out of tests.
//!
//! ## Pure-Rust Sass
//!
//! Stylesheets compile with `grass`, so a static HTML build needs no Node
//! toolchain at all.

pub mod catalog;
pub mod config;
pub mod markdown;
pub mod materialize;
pub mod naming;
pub mod output;
pub mod render;
pub mod runtime;
pub mod site;
pub mod stylesheet;
pub mod tree;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
