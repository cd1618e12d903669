//! # CLI Behavior
//!
//! This is **one possible UI client** for postbook, not the application
//! itself. It is the only place that knows about terminal I/O, prompts,
//! exit codes and output formatting.
//!
//! Each command drives the [`postbook::controller::ViewController`] through
//! the same transitions an interactive front end would:
//!
//! - `postbook` / `postbook list`: the list screen.
//! - `postbook new`: list → editor → list. With `--no-editor` the flags are
//!   saved directly; otherwise `$EDITOR` opens and a validation error offers
//!   to re-open it.
//! - `postbook read <post>`: list → reader → list, printing sanitized HTML.
//! - `postbook edit <post>`: list → editor → list. Field flags skip the editor.
//! - `postbook delete <post>`: confirmation prompt unless `--yes`.
//!
//! `<post>` is a list position or a unique id prefix (see
//! [`postbook::index`]).
//!
//! ## Module Structure
//!
//! - `commands`: Context setup and per-command handlers
//! - `print`: Output formatting (lists, reader view, messages)
//! - `setup`: Argument parsing via clap

mod commands;
mod print;
pub mod setup;

pub use commands::run;
