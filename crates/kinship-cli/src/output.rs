//! Output formatting utilities

use kinship_core::{Comment, Post, User};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Table,
        }
    }
}

/// A node that can be shown as a table row
pub trait AsRow {
    type Row: Tabled;

    fn to_row(&self) -> Self::Row;
}

#[derive(Tabled)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "EMAIL")]
    email: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

impl AsRow for User {
    type Row = UserRow;

    fn to_row(&self) -> UserRow {
        UserRow {
            id: self.id.to_string(),
            name: self.name.clone(),
            email: self.email.clone(),
            created: self.created_at.to_rfc3339(),
        }
    }
}

#[derive(Tabled)]
pub struct PostRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "CONTENT")]
    content: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

impl AsRow for Post {
    type Row = PostRow;

    fn to_row(&self) -> PostRow {
        PostRow {
            id: self.id.to_string(),
            title: self.title.clone(),
            content: preview(&self.content),
            created: self.created_at.to_rfc3339(),
        }
    }
}

#[derive(Tabled)]
pub struct CommentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "CONTENT")]
    content: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

impl AsRow for Comment {
    type Row = CommentRow;

    fn to_row(&self) -> CommentRow {
        CommentRow {
            id: self.id.to_string(),
            content: preview(&self.content),
            created: self.created_at.to_rfc3339(),
        }
    }
}

const PREVIEW_CHARS: usize = 48;

fn preview(text: &str) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() > PREVIEW_CHARS || line.len() < text.trim_end().len() {
        let cut: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}

/// Format a list of rows
pub fn format_rows<T: AsRow + Serialize>(
    rows: &[T],
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table => Ok(table(rows.iter().map(AsRow::to_row))),
    }
}

/// Format a single row
pub fn format_one<T: AsRow + Serialize>(row: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(row)?),
        OutputFormat::Table => Ok(table(std::iter::once(row.to_row()))),
    }
}

fn table<R: Tabled>(rows: impl IntoIterator<Item = R>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::blank());
    table.to_string()
}
