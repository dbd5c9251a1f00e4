//! CLI module for dispersim.
//!
//! All CLI logic lives here rather than in main.rs so every path is
//! testable. The entry point `run_cli` takes parsed arguments.

mod args;
mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::{analyze, inspect, run_cli, sample};
pub use output::{
    print_help, print_inspect_report, print_sample_report, print_summary_report, print_version,
};
