//! Account command handlers.

use anyhow::{Result, bail};
use board_core::Board;
use board_core::validation::ChangePassword;
use board_types::wire::{Credentials, Registration};

pub async fn login(board: &mut Board, username: &str, password: &str) -> Result<()> {
    let user = board.login(&Credentials::new(username, password)).await?;
    println!("Logged in as {}", user.username);
    Ok(())
}

pub async fn logout(board: &mut Board) -> Result<()> {
    board.logout().await;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(board: &Board) -> Result<()> {
    match board.current_user() {
        Some(user) => {
            println!("{}", user.username);
            if let Some(email) = user.email.as_deref() {
                let verified = if user.email_verified { "" } else { " (unverified)" };
                println!("email: {email}{verified}");
            }
            if !user.id.is_empty() {
                println!("id: {}", user.id);
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

pub async fn signup(
    board: &mut Board,
    username: String,
    email: String,
    password: String,
    name: Option<String>,
) -> Result<()> {
    let outcome = board
        .sign_up(&Registration {
            username,
            email,
            password,
            name,
        })
        .await?;

    if outcome.confirmation_required {
        let email = outcome.user.email.as_deref().unwrap_or("your email");
        println!(
            "Account {} created. Confirm the code sent to {email}, then log in.",
            outcome.user.username
        );
    } else if board.current_user().is_some() {
        println!("Signed up and logged in as {}", outcome.user.username);
    } else {
        println!("Account {} created. You can log in now.", outcome.user.username);
    }
    Ok(())
}

pub async fn find_username(board: &Board, email: &str) -> Result<()> {
    board.request_username_recovery(email).await?;
    println!("If an account uses {}, its username is on the way.", email.trim());
    Ok(())
}

pub async fn reset_password(board: &Board, username: &str, email: &str) -> Result<()> {
    board.request_password_reset(username, email).await?;
    println!("Password reset instructions sent.");
    Ok(())
}

pub async fn passwd(board: &mut Board, current: String, new: String, confirm: String) -> Result<()> {
    board
        .change_password(&ChangePassword::new(current, new, confirm))
        .await?;
    println!("Password changed.");
    Ok(())
}

pub async fn delete_account(board: &mut Board, yes: bool) -> Result<()> {
    if !yes {
        bail!("Refusing to delete the account without --yes");
    }
    board.delete_account().await?;
    println!("Account deleted.");
    Ok(())
}
