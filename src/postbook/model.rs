use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default number of characters kept in a post excerpt.
pub const DEFAULT_EXCERPT_LENGTH: usize = 150;

const EXCERPT_ELLIPSIS: &str = "...";
const WORDS_PER_MINUTE: usize = 200;

/// Opaque post identifier.
///
/// New posts get a UUID v4, but any string found in persisted data is a valid
/// id: older snapshots used millisecond timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First eight characters, for compact display.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((end, _)) => &self.0[..end],
            None => &self.0,
        }
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Estimated reading time at 200 words per minute, never below one minute.
    pub fn reading_minutes(&self) -> usize {
        let words = self.content.split_whitespace().count();
        words.div_ceil(WORDS_PER_MINUTE).max(1)
    }

    pub fn was_edited(&self) -> bool {
        self.updated_at != self.created_at
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A full post payload committed from the editor.
///
/// `id` is `None` for a new post. Tags are normalized on save, so callers may
/// pass raw user input here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub id: Option<PostId>,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl Draft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: content.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: PostId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// The raw editor fields as the user typed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    pub title: String,
    pub content: String,
    /// Comma-separated tag input, e.g. `"rust, web"`.
    pub tags: String,
}

impl DraftFields {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tags: tags.into(),
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            content: post.content.clone(),
            tags: post.tags.join(", "),
        }
    }

    pub fn into_draft(self, id: Option<PostId>) -> Draft {
        Draft {
            id,
            title: self.title,
            content: self.content,
            tags: parse_tags(&self.tags),
        }
    }
}

/// Splits comma-separated tag input and normalizes the result.
///
/// ```
/// use postbook::model::parse_tags;
///
/// assert_eq!(parse_tags(" go, go ,  , web "), vec!["go", "web"]);
/// ```
pub fn parse_tags(input: &str) -> Vec<String> {
    normalize_tags(input.split(','))
}

/// Trims every tag, drops empty ones and collapses duplicates, keeping the
/// first occurrence's position.
pub fn normalize_tags<I, T>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
    }
    out
}

/// Derives the excerpt shown in post listings.
///
/// Counts characters, not bytes, so a multi-byte character is never split.
/// Markup is not interpreted: the cut may land inside a code fence.
pub fn make_excerpt(content: &str, max_chars: usize) -> String {
    let content = content.trim();
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{}", &content[..end], EXCERPT_ELLIPSIS),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post(content: &str) -> Post {
        let now = Utc::now();
        Post {
            id: PostId::generate(),
            title: "Title".into(),
            content: content.into(),
            excerpt: make_excerpt(content, DEFAULT_EXCERPT_LENGTH),
            tags: vec!["rust".into()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn parse_tags_collapses_duplicates_and_blanks() {
        assert_eq!(parse_tags(" go, go ,  , web "), vec!["go", "web"]);
        assert!(parse_tags("").is_empty());
        assert!(parse_tags(" , ,").is_empty());
    }

    #[test]
    fn normalize_tags_keeps_first_position() {
        let tags = normalize_tags(["web", " rust", "web ", "cli"]);
        assert_eq!(tags, vec!["web", "rust", "cli"]);
    }

    #[test]
    fn excerpt_short_content_is_unchanged() {
        assert_eq!(make_excerpt("# Hi\nBody text.", 150), "# Hi\nBody text.");
    }

    #[test]
    fn excerpt_truncates_with_ellipsis() {
        let content = "a".repeat(200);
        let excerpt = make_excerpt(&content, 150);
        assert_eq!(excerpt.len(), 153);
        assert!(excerpt.ends_with("..."));
    }

    #[test]
    fn excerpt_exact_length_has_no_ellipsis() {
        let content = "b".repeat(150);
        assert_eq!(make_excerpt(&content, 150), content);
    }

    #[test]
    fn excerpt_never_splits_multibyte_chars() {
        let content = "é".repeat(10);
        assert_eq!(make_excerpt(&content, 3), "ééé...");
    }

    #[test]
    fn excerpt_ignores_surrounding_whitespace() {
        assert_eq!(make_excerpt("   padded   ", 150), "padded");
    }

    #[test]
    fn reading_time_rounds_up_with_floor_of_one() {
        assert_eq!(sample_post("").reading_minutes(), 1);
        assert_eq!(sample_post("one two three").reading_minutes(), 1);
        let long = vec!["word"; 201].join(" ");
        assert_eq!(sample_post(&long).reading_minutes(), 2);
    }

    #[test]
    fn post_serializes_with_camel_case_keys() {
        let post = sample_post("Body");
        let value = serde_json::to_value(&post).unwrap();
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("created_at").is_none());
        assert_eq!(value["id"], serde_json::json!(post.id.as_str()));
    }

    #[test]
    fn post_ignores_unknown_fields() {
        let json = serde_json::json!({
            "id": "1700000000000",
            "title": "Legacy",
            "content": "Body",
            "excerpt": "Body",
            "tags": [],
            "createdAt": "2024-01-01T00:00:00.000Z",
            "updatedAt": "2024-01-02T00:00:00.000Z",
            "pinned": true
        });
        let post: Post = serde_json::from_value(json).unwrap();
        assert_eq!(post.id.as_str(), "1700000000000");
        assert!(post.was_edited());
    }

    #[test]
    fn draft_fields_parse_tags() {
        let draft = DraftFields::new("T", "C", "a, b, a").into_draft(None);
        assert_eq!(draft.tags, vec!["a", "b"]);
        assert!(draft.id.is_none());
    }

    #[test]
    fn short_id_handles_short_strings() {
        assert_eq!(PostId::from("abc").short(), "abc");
        assert_eq!(PostId::from("0123456789").short(), "01234567");
    }
}
