use clap::{Parser, Subcommand};
use std::sync::OnceLock;

/// "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "postbook", bin_name = "postbook", version = get_version())]
#[command(about = "Write, browse and render markdown posts", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// List posts, newest first
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Only posts whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,

        /// Only posts carrying this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Write a new post
    #[command(alias = "n", display_order = 2)]
    New {
        #[arg(long)]
        title: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Markdown content ("-" reads stdin)
        #[arg(long)]
        content: Option<String>,

        /// Save directly instead of opening $EDITOR
        #[arg(long)]
        no_editor: bool,
    },

    /// Print a post rendered to sanitized HTML
    #[command(alias = "r", display_order = 3)]
    Read {
        /// List position or id prefix
        post: String,
    },

    /// Edit a post in $EDITOR, or directly with field flags
    #[command(alias = "e", display_order = 4)]
    Edit {
        /// List position or id prefix
        post: String,

        #[arg(long)]
        title: Option<String>,

        /// Comma-separated tags
        #[arg(long)]
        tags: Option<String>,

        /// Markdown content ("-" reads stdin)
        #[arg(long)]
        content: Option<String>,
    },

    /// Delete a post
    #[command(alias = "rm", display_order = 5)]
    Delete {
        /// List position or id prefix
        post: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// List tags in use
    #[command(display_order = 6)]
    Tags,

    /// Render a markdown file ("-" for stdin) without saving it
    #[command(display_order = 7)]
    Preview { path: String },

    /// Get or set configuration
    #[command(display_order = 8)]
    Config {
        /// Configuration key (excerpt-length, storage-key, editor-ext)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },
}
