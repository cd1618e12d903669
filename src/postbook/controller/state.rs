use crate::model::Post;
use std::fmt;

/// Which screen is active, without the focused post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    List,
    Editor,
    Reader,
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Screen::List => "list",
            Screen::Editor => "editor",
            Screen::Reader => "reader",
        };
        f.write_str(name)
    }
}

/// The active screen and the post it is focused on.
///
/// Held by value: the editor and reader keep the snapshot of the post taken
/// when the screen was entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    List,
    /// `None` while composing a new post.
    Editor { focus: Option<Post> },
    Reader { focus: Post },
}

impl ViewState {
    pub fn screen(&self) -> Screen {
        match self {
            ViewState::List => Screen::List,
            ViewState::Editor { .. } => Screen::Editor,
            ViewState::Reader { .. } => Screen::Reader,
        }
    }

    /// The post under edit or under view, if any.
    pub fn focus(&self) -> Option<&Post> {
        match self {
            ViewState::List => None,
            ViewState::Editor { focus } => focus.as_ref(),
            ViewState::Reader { focus } => Some(focus),
        }
    }
}
