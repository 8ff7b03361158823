//! Report and view rendering.
//!
//! This module turns analytics and task lists into Markdown, JSON, CSV and
//! plain-text terminal output.

pub mod csv;
pub mod generator;
pub mod views;

pub use generator::{generate_json_report, generate_markdown_report, generate_terminal_summary};
