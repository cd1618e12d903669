use chrono::{DateTime, Utc};
use colored::Colorize;
use postbook::controller::{CmdMessage, MessageLevel};
use postbook::model::Post;
use postbook::render::SafeHtml;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const LINE_WIDTH: usize = 100;
const TIME_WIDTH: usize = 14;

pub(super) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => eprintln!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

/// One line per post: position, title, excerpt and age, then its tags.
pub(super) fn print_post_list(posts: &[(usize, &Post)]) {
    if posts.is_empty() {
        println!("No posts found.");
        return;
    }

    for (position, post) in posts {
        let idx_str = format!("{}. ", position);
        let time_ago = format_time_ago(post.created_at);

        let fixed_width = 4 + idx_str.width() + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed_width);

        let title = truncate_to_width(&post.title, available);
        let excerpt_width = available.saturating_sub(title.width() + 1);
        let excerpt = if excerpt_width == 0 {
            String::new()
        } else {
            let flat: String = post
                .excerpt
                .chars()
                .map(|c| if c == '\n' { ' ' } else { c })
                .collect();
            format!(" {}", truncate_to_width(&flat, excerpt_width))
        };
        let padding = available.saturating_sub(title.width() + excerpt.width());

        println!(
            "    {}{}{}{}{}",
            idx_str.yellow(),
            title.bold(),
            excerpt.dimmed(),
            " ".repeat(padding),
            time_ago.dimmed()
        );
        if !post.tags.is_empty() {
            let tags: Vec<String> = post.tags.iter().map(|t| format!("#{}", t)).collect();
            println!("    {}{}", " ".repeat(idx_str.width()), tags.join(" ").cyan());
        }
    }
}

/// Reader view: metadata header followed by the rendered HTML.
pub(super) fn print_post(post: &Post, html: &SafeHtml) {
    println!("{}", post.title.bold());
    let mut meta = vec![
        format!("id {}", post.id.short()),
        format!("{} min read", post.reading_minutes()),
        format!("created {}", post.created_at.format("%Y-%m-%d %H:%M")),
    ];
    if post.was_edited() {
        meta.push(format!("updated {}", post.updated_at.format("%Y-%m-%d %H:%M")));
    }
    println!("{}", meta.join(" · ").dimmed());
    if !post.tags.is_empty() {
        println!("{}", post.tags.join(", ").cyan());
    }
    println!("--------------------------------");
    println!("{}", html);
}

pub(super) fn print_tags(tags: &[(String, usize)]) {
    if tags.is_empty() {
        println!("No tags in use.");
        return;
    }
    let width = tags.iter().map(|(t, _)| t.width()).max().unwrap_or(0);
    for (tag, count) in tags {
        let pad = width - tag.width();
        println!("{}{}  {}", tag.cyan(), " ".repeat(pad), count);
    }
}

pub(super) fn print_config(entries: &[(&str, String)]) {
    for (key, value) in entries {
        println!("{} = {}", key, value);
    }
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
