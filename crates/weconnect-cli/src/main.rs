//! WeConnect CLI - a command-line front end for the WeConnect social network.
//!
//! Log in once, then read the feed, post, like, comment and follow from the
//! terminal. Every command that needs an account passes the route guard
//! first and points back to `weconnect login` when no session is held.

mod commands;
mod render;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use weconnect_core::ApiError;

/// Environment variable naming a log file to write alongside stderr
const LOG_FILE_ENV: &str = "WECONNECT_LOG_FILE";

#[derive(Debug, Parser)]
#[command(name = "weconnect", version, about = "WeConnect from the terminal")]
pub struct Cli {
    /// Backend URL, overriding config and WECONNECT_API_URL
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Print raw JSON instead of formatted text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long, short)]
        username: Option<String>,
    },
    /// Create an account (log in separately afterwards)
    Register {
        #[arg(long, short)]
        username: String,
        #[arg(long, short)]
        email: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show whether a session is held
    Status,
    #[command(flatten)]
    Protected(ProtectedCommand),
}

/// Commands that need a session and run behind the route guard.
#[derive(Debug, Subcommand)]
pub enum ProtectedCommand {
    /// Show the home feed
    Feed {
        #[arg(long, default_value_t = 0)]
        skip: u32,
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Also fetch and show comments under each post
        #[arg(long)]
        comments: bool,
    },
    /// Publish a post
    Post {
        #[arg(long, short)]
        title: String,
        #[arg(long, short)]
        content: String,
    },
    /// Delete one of your posts
    DeletePost { id: i64 },
    Like { id: i64 },
    Unlike { id: i64 },
    /// List comments on a post
    Comments { post: i64 },
    /// Comment on a post
    Comment { post: i64, text: String },
    /// Edit one of your comments (within ten minutes of posting)
    EditComment { id: i64, text: String },
    DeleteComment { id: i64 },
    /// List people you can follow
    Users,
    Follow { id: i64 },
    Unfollow { id: i64 },
    /// Show your profile, or another user's with their posts
    Profile { id: Option<i64> },
    /// List your own posts
    MyPosts,
    /// Permanently delete your account
    DeleteAccount {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match std::env::var_os(LOG_FILE_ENV).map(PathBuf::from) {
        Some(path) => {
            let dir = path.parent().map(PathBuf::from).unwrap_or_default();
            let file_name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "weconnect.log".into());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _log_guard = init_tracing();
    info!(command = ?cli.command, "weconnect starting");

    match commands::run(cli).await {
        Ok(code) => code,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn report(error: &anyhow::Error) {
    match error.downcast_ref::<ApiError>() {
        Some(api_error) if api_error.is_unauthorized() => {
            eprintln!("Your session has expired. Run `weconnect login` to sign in again.");
        }
        Some(ApiError::Transport(e)) => {
            eprintln!("Could not reach the server: {}", e);
        }
        _ => eprintln!("Error: {:#}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_feed_defaults() {
        let cli = Cli::try_parse_from(["weconnect", "feed"]).expect("parse");
        match cli.command {
            Command::Protected(ProtectedCommand::Feed { skip, limit, comments }) => {
                assert_eq!((skip, limit, comments), (0, 10, false));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["weconnect", "comment", "5", "nice post", "--json", "--api-url", "http://localhost:9000"])
            .expect("parse");
        assert!(cli.json);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9000"));
        assert!(matches!(
            cli.command,
            Command::Protected(ProtectedCommand::Comment { post: 5, ref text }) if text == "nice post"
        ));
    }

    #[test]
    fn test_delete_account_requires_flag_value() {
        let cli = Cli::try_parse_from(["weconnect", "delete-account"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Protected(ProtectedCommand::DeleteAccount { yes: false })
        ));
    }

    #[test]
    fn test_parse_comment_edits() {
        let cli = Cli::try_parse_from(["weconnect", "edit-comment", "11", "fixed typo"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Protected(ProtectedCommand::EditComment { id: 11, ref text }) if text == "fixed typo"
        ));

        let cli = Cli::try_parse_from(["weconnect", "delete-comment", "11"]).expect("parse");
        assert!(matches!(cli.command, Command::Protected(ProtectedCommand::DeleteComment { id: 11 })));
    }
}
