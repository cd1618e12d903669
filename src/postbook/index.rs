//! # Post References
//!
//! The CLI lets users name a post two ways:
//!
//! - **Position**: the 1-based number shown by `postbook list` (`1`, `2`, ...),
//!   counted over the unfiltered collection, newest first.
//! - **Id**: a full post id or any prefix of it that matches exactly one post
//!   (`3f2a9c1b`, or a legacy timestamp id).
//!
//! A purely numeric input is tried as a position first; if no post sits at
//! that position it falls back to an exact id match, so legacy timestamp ids
//! stay addressable.

use crate::error::{PostError, Result};
use crate::model::{Post, PostId};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostRef {
    Position(usize),
    Id(String),
}

impl FromStr for PostRef {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PostError::Api("Post reference cannot be empty".into()));
        }
        match s.parse::<usize>() {
            Ok(0) => Err(PostError::Api("Post positions start at 1".into())),
            Ok(n) => Ok(PostRef::Position(n)),
            Err(_) => Ok(PostRef::Id(s.to_string())),
        }
    }
}

impl PostRef {
    /// Finds the id this reference points at within `posts`.
    pub fn resolve(&self, posts: &[Post]) -> Result<PostId> {
        match self {
            PostRef::Position(n) => match posts.get(n - 1) {
                Some(post) => Ok(post.id.clone()),
                None => {
                    let needle = n.to_string();
                    posts
                        .iter()
                        .find(|p| p.id.as_str() == needle)
                        .map(|p| p.id.clone())
                        .ok_or_else(|| PostError::Api(format!("No post at position {}", n)))
                }
            },
            PostRef::Id(id) => match_id(id, posts),
        }
    }
}

fn match_id(needle: &str, posts: &[Post]) -> Result<PostId> {
    if let Some(post) = posts.iter().find(|p| p.id.as_str() == needle) {
        return Ok(post.id.clone());
    }

    let matches: Vec<&Post> = posts
        .iter()
        .filter(|p| p.id.as_str().starts_with(needle))
        .collect();
    match matches.as_slice() {
        [] => Err(PostError::NotFound(PostId::from(needle))),
        [post] => Ok(post.id.clone()),
        many => Err(PostError::Api(format!(
            "Ambiguous post id '{}' matches {} posts",
            needle,
            many.len()
        ))),
    }
}
