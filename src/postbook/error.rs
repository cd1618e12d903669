use crate::controller::Screen;
use crate::model::PostId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PostError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Post not found: {0}")]
    NotFound(PostId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Cannot {action} from the {screen} screen")]
    InvalidTransition {
        screen: Screen,
        action: &'static str,
    },

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, PostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_message() {
        let err = PostError::InvalidTransition {
            screen: Screen::Reader,
            action: "save a draft",
        };
        assert_eq!(err.to_string(), "Cannot save a draft from the reader screen");
    }
}
