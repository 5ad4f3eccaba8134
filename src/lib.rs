//! flutter-ci - CI checks for Flutter projects
//!
//! Runs `pub get`, `pub outdated`, `analyze` and `test --coverage` against a
//! project and assembles one Markdown report, optionally posted on the pull
//! request.
//!
//! The two pieces with real semantics are usable on their own:
//! [`versions::classify`] and [`coverage::summarize`].

pub mod checks;
pub mod cli;
pub mod config;
pub mod coverage;
pub mod github;
pub mod models;
pub mod reporters;
pub mod runner;
pub mod versions;
