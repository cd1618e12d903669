//! # View Controller
//!
//! [`ViewController`] is the UI boundary of postbook. It owns the
//! [`ViewState`] and routes every user action through a named transition:
//!
//! ```text
//!            new_post / edit_post(id)              save_post / cancel_edit
//!   ┌──────┐ ───────────────────────▶ ┌────────┐ ──────────────────────▶ ┌──────┐
//!   │ List │                          │ Editor │                         │ List │
//!   └──────┘ ───────────────────────▶ └────────┘ ◀─────────┐             └──────┘
//!            open_post(id)  ┌────────┐    edit_current     │
//!                        ──▶│ Reader │─────────────────────┘
//!                           └────────┘──── back ──▶ List
//! ```
//!
//! `delete_post` is only valid on the list screen and keeps it. Any action
//! outside this table returns [`PostError::InvalidTransition`] and leaves the
//! state untouched.
//!
//! The controller never writes to stdout or prompts the user. Confirmation for
//! deletes is the caller's job; the controller only receives the answer.

mod result;
mod state;

pub use result::{CmdMessage, CmdResult, MessageLevel};
pub use state::{Screen, ViewState};

use crate::error::{PostError, Result};
use crate::model::{DraftFields, Post, PostId};
use crate::render::{MarkupRenderer, SafeHtml};
use crate::repository::{PostFilter, PostRepository};
use crate::store::PersistentStore;

pub struct ViewController<S: PersistentStore> {
    repo: PostRepository<S>,
    renderer: MarkupRenderer,
    state: ViewState,
}

impl<S: PersistentStore> ViewController<S> {
    /// Starts on the list screen.
    pub fn new(repo: PostRepository<S>) -> Self {
        Self {
            repo,
            renderer: MarkupRenderer::new(),
            state: ViewState::List,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen()
    }

    pub fn repository(&self) -> &PostRepository<S> {
        &self.repo
    }

    // --- Queries ---

    pub fn list_posts(&self, filter: &PostFilter) -> Vec<&Post> {
        self.repo.filter(filter)
    }

    pub fn all_tags(&self) -> Vec<String> {
        self.repo.all_tags()
    }

    pub fn find(&self, id: &PostId) -> Option<&Post> {
        self.repo.find(id)
    }

    /// Rendered body of the post on the reader screen.
    pub fn render_current(&self) -> Option<SafeHtml> {
        match &self.state {
            ViewState::Reader { focus } => Some(self.renderer.render(&focus.content)),
            _ => None,
        }
    }

    /// Renders unsaved editor content.
    pub fn preview(&self, content: &str) -> SafeHtml {
        self.renderer.render(content)
    }

    /// Initial editor fields: the focused post, or blank for a new post.
    pub fn draft_fields(&self) -> Option<DraftFields> {
        match &self.state {
            ViewState::Editor { focus: Some(post) } => Some(DraftFields::from_post(post)),
            ViewState::Editor { focus: None } => Some(DraftFields::default()),
            _ => None,
        }
    }

    // --- Transitions ---

    /// List → Editor with no focus.
    pub fn new_post(&mut self) -> Result<()> {
        self.require_screen(Screen::List, "start a new post")?;
        self.state = ViewState::Editor { focus: None };
        Ok(())
    }

    /// List → Reader.
    pub fn open_post(&mut self, id: &PostId) -> Result<&Post> {
        self.require_screen(Screen::List, "open a post")?;
        let post = self.lookup(id)?;
        self.state = ViewState::Reader { focus: post };
        self.focused()
    }

    /// List → Editor focused on an existing post.
    pub fn edit_post(&mut self, id: &PostId) -> Result<&Post> {
        self.require_screen(Screen::List, "edit a post")?;
        let post = self.lookup(id)?;
        self.state = ViewState::Editor { focus: Some(post) };
        self.focused()
    }

    /// Reader → Editor on the post being read.
    pub fn edit_current(&mut self) -> Result<&Post> {
        let focus = match &self.state {
            ViewState::Reader { focus } => focus.clone(),
            _ => return Err(self.invalid("edit the current post")),
        };
        self.state = ViewState::Editor { focus: Some(focus) };
        self.focused()
    }

    /// Editor → List, committing the draft.
    ///
    /// On a validation error the editor stays open with its focus unchanged.
    pub fn save_post(&mut self, fields: DraftFields) -> Result<CmdResult> {
        let id = match &self.state {
            ViewState::Editor { focus } => focus.as_ref().map(|p| p.id.clone()),
            _ => return Err(self.invalid("save a draft")),
        };
        let is_new = id.is_none();

        let committed = self.repo.save(fields.into_draft(id))?;
        self.state = ViewState::List;

        let post = committed.value;
        let verb = if is_new { "created" } else { "updated" };
        let mut result = CmdResult::default().with_message(CmdMessage::success(format!(
            "Post {} ({}): {}",
            verb,
            post.id.short(),
            post.title
        )));
        if let Some(err) = &committed.storage_error {
            result.add_message(CmdMessage::storage_warning(err));
        }
        Ok(result.with_affected_post(post))
    }

    /// Editor → List, discarding the draft.
    pub fn cancel_edit(&mut self) -> Result<()> {
        self.require_screen(Screen::Editor, "cancel editing")?;
        self.state = ViewState::List;
        Ok(())
    }

    /// Reader → List.
    pub fn back(&mut self) -> Result<()> {
        self.require_screen(Screen::Reader, "go back")?;
        self.state = ViewState::List;
        Ok(())
    }

    /// Deletes a post from the list screen once the user has confirmed.
    /// An unconfirmed request changes nothing.
    pub fn delete_post(&mut self, id: &PostId, confirmed: bool) -> Result<CmdResult> {
        self.require_screen(Screen::List, "delete a post")?;
        if !confirmed {
            return Ok(CmdResult::default().with_message(CmdMessage::info("Deletion cancelled.")));
        }

        let committed = self.repo.delete(id)?;
        let post = committed.value;
        let mut result = CmdResult::default().with_message(CmdMessage::success(format!(
            "Post deleted ({}): {}",
            post.id.short(),
            post.title
        )));
        if let Some(err) = &committed.storage_error {
            result.add_message(CmdMessage::storage_warning(err));
        }
        Ok(result.with_affected_post(post))
    }

    fn lookup(&self, id: &PostId) -> Result<Post> {
        self.repo
            .find(id)
            .cloned()
            .ok_or_else(|| PostError::NotFound(id.clone()))
    }

    fn focused(&self) -> Result<&Post> {
        self.state
            .focus()
            .ok_or_else(|| self.invalid("use the focused post"))
    }

    fn require_screen(&self, screen: Screen, action: &'static str) -> Result<()> {
        if self.screen() == screen {
            Ok(())
        } else {
            Err(self.invalid(action))
        }
    }

    fn invalid(&self, action: &'static str) -> PostError {
        log::error!("invalid transition: {} from {}", action, self.screen());
        PostError::InvalidTransition {
            screen: self.screen(),
            action,
        }
    }
}
