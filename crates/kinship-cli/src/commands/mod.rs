//! CLI command implementations

pub mod comment;
pub mod completions;
pub mod config;
pub mod friend;
pub mod post;
pub mod user;

use crate::output::{format_rows, AsRow, OutputFormat};
use serde::Serialize;

/// Print a list, or a short notice in table mode when it is empty
pub(crate) fn print_rows<T: AsRow + Serialize>(
    rows: &[T],
    format: OutputFormat,
    empty: &str,
) -> anyhow::Result<()> {
    if rows.is_empty() && format == OutputFormat::Table {
        println!("{}", empty);
    } else {
        println!("{}", format_rows(rows, format)?);
    }
    Ok(())
}
