use super::print::{print_config, print_messages, print_post, print_post_list, print_tags};
use super::setup::{Cli, Commands};
use clap::Parser;
use directories::ProjectDirs;
use postbook::config::PostbookConfig;
use postbook::controller::{CmdMessage, CmdResult, ViewController};
use postbook::editor::{edit_content, EditorContent};
use postbook::error::{PostError, Result};
use postbook::index::PostRef;
use postbook::logging::init_logging;
use postbook::model::{DraftFields, PostId};
use postbook::repository::{PostFilter, PostRepository};
use postbook::store::fs::FileStore;
use std::fs;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;

const HOME_ENV: &str = "POSTBOOK_HOME";

struct AppContext {
    controller: ViewController<FileStore>,
    config: PostbookConfig,
    data_dir: PathBuf,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Warning: {}", e);
    }

    let mut ctx = init_context()?;

    match cli.command {
        Some(Commands::List { search, tag }) => handle_list(&ctx, search, tag),
        Some(Commands::New {
            title,
            tags,
            content,
            no_editor,
        }) => handle_new(&mut ctx, title, tags, content, no_editor),
        Some(Commands::Read { post }) => handle_read(&mut ctx, &post),
        Some(Commands::Edit {
            post,
            title,
            tags,
            content,
        }) => handle_edit(&mut ctx, &post, title, tags, content),
        Some(Commands::Delete { post, yes }) => handle_delete(&mut ctx, &post, yes),
        Some(Commands::Tags) => handle_tags(&ctx),
        Some(Commands::Preview { path }) => handle_preview(&ctx, &path),
        Some(Commands::Config { key, value }) => handle_config(&mut ctx, key, value),
        None => handle_list(&ctx, None, None),
    }
}

fn data_dir() -> Result<PathBuf> {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|h| !h.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    ProjectDirs::from("com", "postbook", "postbook")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| PostError::Api(format!("Could not determine data dir; set ${}", HOME_ENV)))
}

fn init_context() -> Result<AppContext> {
    let data_dir = data_dir()?;
    fs::create_dir_all(&data_dir)?;
    log::debug!("data dir: {}", data_dir.display());

    let config = PostbookConfig::load(&data_dir).unwrap_or_else(|e| {
        log::warn!("ignoring unreadable config: {}", e);
        PostbookConfig::default()
    });

    let opened = PostRepository::open(FileStore::new(&data_dir), &config);
    if let Some(err) = &opened.storage_error {
        let mut messages = vec![CmdMessage::warning(format!(
            "Could not load saved posts, starting empty: {}",
            err
        ))];
        if let Some(path) = opened.value.set_aside_snapshot() {
            messages.push(CmdMessage::warning(format!(
                "The unreadable file was kept as {}",
                path
            )));
        }
        if opened.value.is_read_only() {
            messages.push(CmdMessage::warning(
                "Changes will not be saved until the file can be read.",
            ));
        }
        print_messages(&messages);
    }

    Ok(AppContext {
        controller: ViewController::new(opened.value),
        config,
        data_dir,
    })
}

fn resolve(ctx: &AppContext, input: &str) -> Result<PostId> {
    input
        .parse::<PostRef>()?
        .resolve(ctx.controller.repository().list())
}

fn handle_list(ctx: &AppContext, search: Option<String>, tag: Option<String>) -> Result<()> {
    let filter = PostFilter { search, tag };
    let repo = ctx.controller.repository();
    let rows: Vec<(usize, &_)> = ctx
        .controller
        .list_posts(&filter)
        .into_iter()
        .filter_map(|post| repo.position(&post.id).map(|pos| (pos + 1, post)))
        .collect();
    print_post_list(&rows);
    Ok(())
}

fn handle_new(
    ctx: &mut AppContext,
    title: Option<String>,
    tags: Option<String>,
    content: Option<String>,
    no_editor: bool,
) -> Result<()> {
    let content = content.map(read_if_stdin).transpose()?;
    ctx.controller.new_post()?;

    let fields = DraftFields::new(
        title.unwrap_or_default(),
        content.unwrap_or_default(),
        tags.unwrap_or_default(),
    );
    let result = if no_editor {
        Some(ctx.controller.save_post(fields)?)
    } else {
        edit_until_saved(ctx, fields)?
    };

    if let Some(result) = result {
        print_messages(&result.messages);
    }
    Ok(())
}

fn handle_read(ctx: &mut AppContext, input: &str) -> Result<()> {
    let id = resolve(ctx, input)?;
    let post = ctx.controller.open_post(&id)?.clone();
    if let Some(html) = ctx.controller.render_current() {
        print_post(&post, &html);
    }
    ctx.controller.back()
}

fn handle_edit(
    ctx: &mut AppContext,
    input: &str,
    title: Option<String>,
    tags: Option<String>,
    content: Option<String>,
) -> Result<()> {
    let id = resolve(ctx, input)?;
    let content = content.map(read_if_stdin).transpose()?;
    ctx.controller.edit_post(&id)?;

    let mut fields = ctx.controller.draft_fields().unwrap_or_default();
    let direct = title.is_some() || tags.is_some() || content.is_some();
    if let Some(title) = title {
        fields.title = title;
    }
    if let Some(tags) = tags {
        fields.tags = tags;
    }
    if let Some(content) = content {
        fields.content = content;
    }

    let result = if direct {
        Some(ctx.controller.save_post(fields)?)
    } else {
        edit_until_saved(ctx, fields)?
    };

    if let Some(result) = result {
        print_messages(&result.messages);
    }
    Ok(())
}

/// Runs the editor until the draft saves or the user gives up. On giving up
/// the controller's edit is cancelled and `None` is returned.
fn edit_until_saved(ctx: &mut AppContext, initial: DraftFields) -> Result<Option<CmdResult>> {
    let mut buffer = EditorContent::from_fields(&initial);
    loop {
        buffer = edit_content(&buffer, &ctx.config.editor_ext)?;
        match ctx.controller.save_post(buffer.clone().into_fields()) {
            Ok(result) => return Ok(Some(result)),
            Err(PostError::Validation(msg)) => {
                print_messages(&[CmdMessage::error(msg)]);
                if !confirm("Re-open the editor? [Y/n] ", true)? {
                    ctx.controller.cancel_edit()?;
                    print_messages(&[CmdMessage::info("Edit discarded.")]);
                    return Ok(None);
                }
            }
            Err(e) => {
                if let Err(cancel_err) = ctx.controller.cancel_edit() {
                    log::debug!("could not cancel edit after failed save: {}", cancel_err);
                }
                return Err(e);
            }
        }
    }
}

fn handle_delete(ctx: &mut AppContext, input: &str, yes: bool) -> Result<()> {
    let id = resolve(ctx, input)?;
    let confirmed = yes || {
        let title = ctx
            .controller
            .find(&id)
            .map(|p| p.title.clone())
            .unwrap_or_default();
        confirm(&format!("Delete \"{}\"? [y/N] ", title), false)?
    };

    let result = ctx.controller.delete_post(&id, confirmed)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_tags(ctx: &AppContext) -> Result<()> {
    let counts: Vec<(String, usize)> = ctx
        .controller
        .all_tags()
        .into_iter()
        .map(|tag| {
            let count = ctx.controller.list_posts(&PostFilter::tag(tag.as_str())).len();
            (tag, count)
        })
        .collect();
    print_tags(&counts);
    Ok(())
}

fn handle_preview(ctx: &AppContext, path: &str) -> Result<()> {
    let markup = if path == "-" {
        read_stdin()?
    } else {
        fs::read_to_string(path)?
    };
    println!("{}", ctx.controller.preview(&markup));
    Ok(())
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    match (key, value) {
        (None, _) => print_config(&ctx.config.entries()),
        (Some(key), None) => {
            let value = ctx.config.get(&key)?;
            print_config(&[(key.as_str(), value)]);
        }
        (Some(key), Some(value)) => {
            ctx.config.set(&key, &value)?;
            ctx.config.save(&ctx.data_dir)?;
            print_messages(&[CmdMessage::success(format!(
                "{} set to {}",
                key,
                ctx.config.get(&key)?
            ))]);
        }
    }
    Ok(())
}

fn read_if_stdin(value: String) -> Result<String> {
    if value == "-" {
        read_stdin()
    } else {
        Ok(value)
    }
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Asks a yes/no question. Without a terminal on stdin the default answer is
/// used only when nothing is piped in.
fn confirm(prompt: &str, default: bool) -> Result<bool> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        print!("{}", prompt);
        io::stdout().flush()?;
    }

    let mut answer = String::new();
    if stdin.lock().read_line(&mut answer)? == 0 {
        return Ok(default);
    }
    Ok(match answer.trim().to_lowercase().as_str() {
        "" => default,
        "y" | "yes" => true,
        _ => false,
    })
}
