//! CLI entry and dispatch.

use anyhow::{Context, Result};
use board_core::Board;
use board_core::config::{self, AuthBackendKind};
use board_core::content::view::SortOrder;
use board_types::{CommentId, PostId};
use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(name = "board")]
#[command(version)]
#[command(about = "Community board client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Content API base URL (overrides config and BOARD_API_URL)
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget the stored token
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account
    Signup {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
    },
    /// Send the username of the account using this email
    FindUsername {
        #[arg(short, long)]
        email: String,
    },
    /// Start a password reset
    ResetPassword {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
    },
    /// Change the password of the signed-in user
    Passwd {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
    /// Delete the signed-in account
    DeleteAccount {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Browse and write posts
    Posts {
        #[command(subcommand)]
        command: PostCommands,
    },
    /// Read and write comments
    Comments {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Manage the profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    /// Category label or slug (all, pets, travel, health, celebrities)
    #[arg(long, default_value = "all")]
    pub category: String,
    /// Case-insensitive text to look for in title, content and author
    #[arg(long)]
    pub search: Option<String>,
    /// latest or popular
    #[arg(long, default_value = "latest")]
    pub sort: SortOrder,
    /// 1-based page number
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

#[derive(clap::Subcommand)]
enum PostCommands {
    /// Lists posts
    List(ListArgs),
    /// Shows a post with its comments
    Show {
        #[arg(value_name = "POST_ID")]
        id: PostId,
    },
    /// Writes a new post
    New {
        #[arg(long)]
        content: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// Replaces the content of a post
    Edit {
        #[arg(value_name = "POST_ID")]
        id: PostId,
        #[arg(long)]
        content: String,
    },
    /// Deletes a post
    Delete {
        #[arg(value_name = "POST_ID")]
        id: PostId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Likes a post, or takes the like back
    Like {
        #[arg(value_name = "POST_ID")]
        id: PostId,
    },
}

#[derive(clap::Subcommand)]
enum CommentCommands {
    /// Lists the comments of a post
    List {
        #[arg(value_name = "POST_ID")]
        post: PostId,
    },
    /// Comments on a post
    Add {
        #[arg(value_name = "POST_ID")]
        post: PostId,
        #[arg(long)]
        text: String,
    },
    /// Replaces the text of a comment
    Edit {
        #[arg(value_name = "COMMENT_ID")]
        id: CommentId,
        #[arg(long)]
        text: String,
    },
    /// Deletes a comment
    Delete {
        #[arg(value_name = "COMMENT_ID")]
        id: CommentId,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum ProfileCommands {
    /// Uploads a profile image (PNG, JPEG, GIF or WebP)
    Upload {
        #[arg(value_name = "PATH")]
        path: std::path::PathBuf,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Select the auth backend (rest or identity-provider)
    Backend {
        #[arg(value_name = "BACKEND", value_parser = parse_backend)]
        backend: AuthBackendKind,
    },
}

fn parse_backend(raw: &str) -> Result<AuthBackendKind, String> {
    AuthBackendKind::from_id(raw)
        .ok_or_else(|| format!("unknown backend '{raw}' (expected rest or identity-provider)"))
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // config commands work even when the config file is broken
    let command = match cli.command {
        Commands::Config { command } => return run_config(command),
        command => command,
    };

    let mut config = config::Config::load().context("load config")?;
    config.api_url_override = cli.api_url;
    let _log_guard = board_core::logging::init(&config.log)?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(command, &config).await })
}

async fn dispatch(command: Commands, config: &config::Config) -> Result<()> {
    let mut board = Board::from_config(config).context("set up board")?;
    board.restore_session().await;

    match command {
        Commands::Login { username, password } => {
            commands::auth::login(&mut board, &username, &password).await
        }
        Commands::Logout => commands::auth::logout(&mut board).await,
        Commands::Whoami => commands::auth::whoami(&board),
        Commands::Signup {
            username,
            email,
            password,
            name,
        } => commands::auth::signup(&mut board, username, email, password, name).await,
        Commands::FindUsername { email } => commands::auth::find_username(&board, &email).await,
        Commands::ResetPassword { username, email } => {
            commands::auth::reset_password(&board, &username, &email).await
        }
        Commands::Passwd {
            current,
            new,
            confirm,
        } => commands::auth::passwd(&mut board, current, new, confirm).await,
        Commands::DeleteAccount { yes } => commands::auth::delete_account(&mut board, yes).await,

        Commands::Posts { command } => match command {
            PostCommands::List(args) => commands::posts::list(&mut board, &args).await,
            PostCommands::Show { id } => commands::posts::show(&mut board, id).await,
            PostCommands::New {
                content,
                title,
                category,
            } => commands::posts::new(&mut board, title.as_deref(), &content, &category).await,
            PostCommands::Edit { id, content } => {
                commands::posts::edit(&mut board, id, &content).await
            }
            PostCommands::Delete { id, yes } => commands::posts::delete(&mut board, id, yes).await,
            PostCommands::Like { id } => commands::posts::like(&mut board, id).await,
        },

        Commands::Comments { command } => match command {
            CommentCommands::List { post } => commands::comments::list(&mut board, post).await,
            CommentCommands::Add { post, text } => {
                commands::comments::add(&mut board, post, &text).await
            }
            CommentCommands::Edit { id, text } => {
                commands::comments::edit(&mut board, id, &text).await
            }
            CommentCommands::Delete { id, yes } => {
                commands::comments::delete(&mut board, id, yes).await
            }
        },

        Commands::Profile { command } => match command {
            ProfileCommands::Upload { path } => commands::profile::upload(&mut board, &path).await,
        },

        Commands::Config { command } => run_config(command),
    }
}

fn run_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::Backend { backend } => commands::config::backend(backend),
    }
}
