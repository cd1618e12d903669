//! External editor integration.
//!
//! A post is edited as a plain text buffer:
//!
//! ```text
//! My Title
//! Tags: rust, web
//!
//! Markdown content...
//! ```
//!
//! The `Tags:` line is optional; everything after the first blank line is
//! content.

use crate::error::{PostError, Result};
use crate::model::DraftFields;
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;
use uuid::Uuid;

const TAGS_PREFIX: &str = "Tags:";

/// Title, tags and content as laid out in an editor buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorContent {
    pub title: String,
    pub tags: String,
    pub content: String,
}

impl EditorContent {
    pub fn new(title: impl Into<String>, tags: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tags: tags.into(),
            content: content.into(),
        }
    }

    pub fn from_fields(fields: &DraftFields) -> Self {
        Self::new(&fields.title, &fields.tags, &fields.content)
    }

    pub fn to_buffer(&self) -> String {
        format!(
            "{}\n{} {}\n\n{}",
            self.title, TAGS_PREFIX, self.tags, self.content
        )
    }

    pub fn from_buffer(buffer: &str) -> Self {
        let mut lines = buffer.lines().peekable();
        let title = lines.next().map(str::trim).unwrap_or_default().to_string();

        let mut tags = String::new();
        if let Some(line) = lines.peek() {
            if let Some(rest) = strip_tags_prefix(line) {
                tags = rest.trim().to_string();
                lines.next();
            }
        }

        while lines.peek().is_some_and(|l| l.trim().is_empty()) {
            lines.next();
        }
        let content = lines.collect::<Vec<_>>().join("\n").trim_end().to_string();

        Self {
            title,
            tags,
            content,
        }
    }

    pub fn into_fields(self) -> DraftFields {
        DraftFields::new(self.title, self.content, self.tags)
    }
}

fn strip_tags_prefix(line: &str) -> Option<&str> {
    let head = line.get(..TAGS_PREFIX.len())?;
    if head.eq_ignore_ascii_case(TAGS_PREFIX) {
        Some(&line[TAGS_PREFIX.len()..])
    } else {
        None
    }
}

/// Gets the editor command from environment.
/// Checks $EDITOR, then $VISUAL, then falls back to common editors.
pub fn get_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    for fallback in &["vim", "vi", "nano"] {
        if Command::new("which")
            .arg(fallback)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
        {
            return Ok((*fallback).to_string());
        }
    }

    Err(PostError::Api(
        "No editor found. Set $EDITOR environment variable.".to_string(),
    ))
}

/// Opens a file in the user's editor and waits for it to close.
/// Returns the contents of the file after editing.
pub fn open_in_editor<P: AsRef<Path>>(file_path: P) -> Result<String> {
    let editor = get_editor()?;
    let path = file_path.as_ref();
    log::debug!("launching editor `{}` on {}", editor, path.display());

    // $EDITOR may carry arguments, e.g. "code --wait".
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or_default();
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| PostError::Api(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(PostError::Api(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    fs::read_to_string(path).map_err(PostError::Io)
}

/// Opens an editor with initial content and returns the edited content.
pub fn edit_content(initial: &EditorContent, file_extension: &str) -> Result<EditorContent> {
    let temp_file = env::temp_dir().join(format!("postbook-{}{}", Uuid::new_v4(), file_extension));
    fs::write(&temp_file, initial.to_buffer()).map_err(PostError::Io)?;

    let result = open_in_editor(&temp_file);
    if let Err(e) = fs::remove_file(&temp_file) {
        log::warn!("could not remove {}: {}", temp_file.display(), e);
    }

    Ok(EditorContent::from_buffer(&result?))
}
