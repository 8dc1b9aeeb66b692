//! Comment command handlers.

use anyhow::{Result, bail};
use board_core::Board;
use board_types::{Comment, CommentId, PostId};

use super::posts::format_timestamp;

pub fn print_row(comment: &Comment) {
    println!(
        "  #{} {} ({}): {}",
        comment.id,
        comment.user_name,
        format_timestamp(comment.created_at),
        comment.text
    );
}

pub async fn list(board: &mut Board, post: PostId) -> Result<()> {
    let comments = board.list_comments(post).await?;
    if comments.is_empty() {
        println!("No comments on post #{post}.");
    }
    for comment in &comments {
        print_row(comment);
    }
    Ok(())
}

pub async fn add(board: &mut Board, post: PostId, text: &str) -> Result<()> {
    let comment = board.add_comment(post, text).await?;
    println!("Added comment #{} to post #{post}", comment.id);
    Ok(())
}

pub async fn edit(board: &mut Board, id: CommentId, text: &str) -> Result<()> {
    let comment = board.edit_comment(id, text).await?;
    println!("Updated comment #{}: {}", comment.id, comment.text);
    Ok(())
}

pub async fn delete(board: &mut Board, id: CommentId, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete comment #{id} without --yes");
    }
    board.delete_comment(id).await?;
    println!("Deleted comment #{id}");
    Ok(())
}
