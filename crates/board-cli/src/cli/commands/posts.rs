//! Post command handlers.

use anyhow::{Result, bail};
use board_core::Board;
use board_core::content::view::BoardQuery;
use board_types::{Category, Post, PostId};
use chrono::{DateTime, Utc};

use super::comments;
use crate::cli::ListArgs;

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "unknown".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

/// One-line headline: the title, or the first line of the content.
fn headline(post: &Post) -> &str {
    post.title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| post.content.lines().next().unwrap_or_default())
}

fn print_row(post: &Post) {
    println!(
        "#{}  [{}]  {}  by {}  likes:{} comments:{}  {}",
        post.id,
        post.category,
        headline(post),
        post.user_name,
        post.like_count(),
        post.comment_count(),
        format_timestamp(post.created_at)
    );
}

pub async fn list(board: &mut Board, args: &ListArgs) -> Result<()> {
    board.load_posts().await?;
    let query = BoardQuery {
        category: Category::from_label(&args.category),
        search: args.search.clone().unwrap_or_default(),
        sort: args.sort,
        page: args.page,
        ..board.query()
    };
    let page = board.page(&query);

    if page.posts.is_empty() {
        println!("No posts found.");
        return Ok(());
    }
    for post in &page.posts {
        print_row(post);
    }
    println!(
        "Page {}/{} ({} posts, {})",
        page.page, page.total_pages, page.total, query.sort
    );
    Ok(())
}

pub async fn show(board: &mut Board, id: PostId) -> Result<()> {
    let open = board.open_post(id).await?;
    let post = &open.post;

    match post.title.as_deref().filter(|t| !t.trim().is_empty()) {
        Some(title) => println!("#{} [{}] {}", post.id, post.category, title),
        None => println!("#{} [{}]", post.id, post.category),
    }
    println!("by {}  {}", post.user_name, format_timestamp(post.created_at));
    println!();
    println!("{}", post.content);
    println!();
    println!("likes:{} comments:{}", post.like_count(), open.comments.len());
    for comment in &open.comments {
        comments::print_row(comment);
    }
    Ok(())
}

pub async fn new(
    board: &mut Board,
    title: Option<&str>,
    content: &str,
    category: &str,
) -> Result<()> {
    let post = board
        .create_post(title, content, Category::from_label(category))
        .await?;
    println!("Created post #{}", post.id);
    Ok(())
}

pub async fn edit(board: &mut Board, id: PostId, content: &str) -> Result<()> {
    board.load_posts().await?;
    let post = board.edit_post(id, content).await?;
    println!("Updated post #{}", post.id);
    Ok(())
}

pub async fn delete(board: &mut Board, id: PostId, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete post #{id} without --yes");
    }
    board.delete_post(id).await?;
    println!("Deleted post #{id}");
    Ok(())
}

pub async fn like(board: &mut Board, id: PostId) -> Result<()> {
    board.open_post(id).await?;
    let post = board.toggle_like(id).await?;
    let liked = board
        .current_user()
        .is_some_and(|u| board.content().state().is_liked(id, u.display_name()));
    let verb = if liked { "Liked" } else { "Unliked" };
    println!("{verb} post #{} ({} likes)", post.id, post.like_count());
    Ok(())
}
