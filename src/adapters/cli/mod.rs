//! CLI Adapter
//!
//! Command-line interface for the decision executor.
//! Uses clap derive macros for argument parsing.

mod commands;

pub use commands::{
    CliApp, Command, OutputFormat, RunCmd, ValidateCmd, load_decisions, parse_decisions,
    render_json_report, render_text_report, render_validation_report,
};
