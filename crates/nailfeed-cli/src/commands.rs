use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use tracing::debug;

use nailfeed_core::{Attachment, Feed, FeedError, ReactionTab, Services};
use nailfeed_types::{Comment, Post, ReactionKind};

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List one page of the post feed
    Feed {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Show a single post
    Post { post: String },
    /// Replace a post's description
    EditPost { post: String, description: String },
    DeletePost { post: String },
    /// Print a post's comment thread
    Comments {
        post: String,
        /// Number of pages to walk
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Add a comment, or a reply with --reply-to
    Comment {
        post: String,
        #[arg(default_value = "")]
        content: String,
        #[arg(long)]
        reply_to: Option<u64>,
        /// Image to attach
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    EditComment { post: String, id: u64, content: String },
    DeleteComment { post: String, id: u64 },
    /// Toggle a reaction (like, love, haha, wow, sad, angry, or none)
    React { post: String, reaction: String },
    /// List who reacted, optionally for one reaction type
    Reactions {
        post: String,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    /// Report a comment (BAD_LANGUAGE, DISCRIMINATION or OTHER)
    Report { post: String, id: u64, reason: String },
    /// Ask the backend for a post's comment total
    Count { post: String },
}

pub async fn run(command: Command, services: Services, page_size: u32) -> anyhow::Result<()> {
    let feed = Arc::new(Feed::new(services).with_page_size(page_size));

    match command {
        Command::Feed { page } => {
            feed.load_posts(page, page <= 1).await?;
            for post in feed.posts() {
                print_post(&post);
            }
            if feed.has_more() {
                println!("-- more posts on page {} --", page + 1);
            }
        }
        Command::Post { post } => {
            let post = feed.get_post(&post).await?;
            print_post(&post);
            if let Some(reactions) = feed.reactions(&post.document_id) {
                let state = reactions.state();
                for kind in state.counts.present() {
                    println!("  {} {}", reactions.emoji(kind).await, state.counts.get(kind));
                }
            }
        }
        Command::EditPost { post, description } => {
            let post = feed.update_post(&post, &description).await?;
            print_post(&post);
        }
        Command::DeletePost { post } => {
            feed.delete_post(&post).await?;
        }
        Command::Comments { post, pages } => {
            let thread = feed.comment_thread(&post).with_page_size(page_size);
            thread.load_comments(1, true).await?;
            for _ in 1..pages {
                if !thread.on_sentinel_visible().await? {
                    break;
                }
            }
            println!("{} comments", thread.total());
            print_thread(&thread.comments());
        }
        Command::Comment {
            post,
            content,
            reply_to,
            attach,
        } => {
            let thread = feed.comment_thread(&post).with_page_size(page_size);
            thread.load_comments(1, true).await?;
            thread.set_content(content);
            thread.reply_to(reply_to);
            if let Some(path) = attach {
                thread.attach(Some(read_attachment(&path).await?));
            }
            let created = thread.submit_comment().await?;
            println!("created comment {}", describe(&created));
        }
        Command::EditComment { post, id, content } => {
            let thread = feed.comment_thread(&post).with_page_size(page_size);
            thread.load_comments(1, true).await?;
            if !thread.start_edit(id) {
                anyhow::bail!("comment {} is not on the first page of {}", id, post);
            }
            thread.set_content(content);
            let updated = thread.submit_comment().await?;
            println!("updated comment {}", describe(&updated));
        }
        Command::DeleteComment { post, id } => {
            let thread = feed.comment_thread(&post).with_page_size(page_size);
            thread.load_comments(1, true).await?;
            match thread.delete_comment(id).await {
                Err(FeedError::CommentRefreshed) => {
                    anyhow::bail!("comment {} was not found; the thread was refreshed", id)
                }
                other => other?,
            }
        }
        Command::React { post, reaction } => {
            let requested = parse_reaction(&reaction)?;
            feed.get_post(&post).await?;
            let reactions = feed
                .reactions(&post)
                .with_context(|| format!("post {} is not loaded", post))?;
            let state = reactions.set_reaction(requested).await?;
            match state.current {
                Some(kind) => println!("you reacted {} ({} total)", kind, state.total_reactions),
                None => println!("reaction cleared ({} total)", state.total_reactions),
            }
        }
        Command::Reactions { post, kind } => {
            let listing = feed.reaction_listing(&post);
            listing.open().await?;
            let tabs = listing.tabs();
            let labels: Vec<String> = tabs
                .iter()
                .map(|(tab, count)| match tab {
                    ReactionTab::All => format!("all {}", count),
                    ReactionTab::Kind(k) => format!("{} {}", k.default_emoji(), count),
                })
                .collect();
            println!("{}", labels.join(" | "));

            let tab = match kind.as_deref().map(parse_reaction).transpose()?.flatten() {
                Some(kind) => ReactionTab::Kind(kind),
                None => ReactionTab::All,
            };
            listing.select_tab(tab).await?;
            while listing.load_more(tab).await? {}
            for entry in listing.tab(tab).users {
                println!("{} {}", entry.reaction_type.default_emoji(), entry.user.username);
            }
        }
        Command::Report { post, id, reason } => {
            let thread = feed.comment_thread(&post).with_page_size(page_size);
            thread.load_comments(1, true).await?;
            debug!("Reporting comment {} on {} as {}", id, post, reason);
            thread.report_comment(id, &reason).await?;
        }
        Command::Count { post } => {
            let thread = feed.comment_thread(&post);
            println!("{}", thread.refresh_total().await?);
        }
    }
    Ok(())
}

/// `none` clears the viewer's reaction.
fn parse_reaction(raw: &str) -> anyhow::Result<Option<ReactionKind>> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    ReactionKind::parse(raw)
        .map(Some)
        .with_context(|| format!("unknown reaction type {:?}", raw))
}

async fn read_attachment(path: &Path) -> anyhow::Result<Attachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".into());
    Ok(Attachment {
        mime: mime_for(path).to_string(),
        file_name,
        bytes,
    })
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

fn describe(comment: &Comment) -> String {
    match comment.id {
        Some(id) => format!("#{} ({})", id, comment.document_id),
        None => comment.document_id.clone(),
    }
}

fn print_post(post: &Post) {
    let author = post.author.as_ref().map(|a| a.username.as_str()).unwrap_or("unknown");
    let when = post
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "[{}] @{} {} ({} reactions, {} comments)",
        post.document_id, author, when, post.reaction_summary.total, post.comments_count
    );
    if let Some(description) = &post.description {
        println!("    {}", description);
    }
}

fn print_thread(comments: &[Comment]) {
    let mut stack: Vec<(&Comment, usize)> = comments.iter().rev().map(|c| (c, 0)).collect();
    while let Some((comment, depth)) = stack.pop() {
        let author = comment
            .author
            .as_ref()
            .map(|a| a.username.as_str())
            .unwrap_or("unknown");
        let body = if comment.removed || comment.blocked {
            "[removed]"
        } else {
            comment.content.as_str()
        };
        println!("{}{} @{}: {}", "  ".repeat(depth), describe(comment), author, body);
        stack.extend(comment.children.iter().rev().map(|c| (c, depth + 1)));
    }
}
