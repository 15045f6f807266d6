//! Rendering of page state: askama views for HTTP and reports for the CLI.

pub mod report;
pub mod views;
