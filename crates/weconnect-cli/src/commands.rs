use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};
use weconnect_core::auth::FileTokenStore;
use weconnect_core::models::{Comment, NewPost, Page, PostWithCounts};
use weconnect_core::{
    ApiClient, ApiError, Config, ConflictKind, ErrorKind, Gate, RouteGuard, TokenBackend,
    TokenStore,
};

use crate::render;
use crate::{Cli, Command, ProtectedCommand};

/// Environment variable supplying the password for non-interactive logins
const PASSWORD_ENV: &str = "WECONNECT_PASSWORD";

/// Exit status when a protected command runs without a session
const EXIT_NOT_LOGGED_IN: u8 = 2;

struct App {
    config: Config,
    store: Arc<dyn TokenStore>,
    api: ApiClient,
    json: bool,
}

pub async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.base_url = url;
    }
    let store = config.open_token_store()?;
    let api = ApiClient::from_config(&config, Arc::clone(&store))?;
    let mut app = App {
        config,
        store,
        api,
        json: cli.json,
    };

    match cli.command {
        Command::Login { username } => login(&mut app, username).await,
        Command::Register { username, email } => register(&app, &username, &email).await,
        Command::Logout => {
            app.api.logout();
            println!("Logged out.");
            Ok(ExitCode::SUCCESS)
        }
        Command::Status => status(&app),
        Command::Protected(protected) => {
            let mut guard = RouteGuard::new(Arc::clone(&app.store)).with_entry_route("weconnect login");
            match guard.gate(|| ()) {
                Gate::Render(()) => run_protected(&app, protected).await,
                Gate::Redirect(entry) => {
                    eprintln!("You are not logged in. Run `{}` first.", entry);
                    Ok(ExitCode::from(EXIT_NOT_LOGGED_IN))
                }
            }
        }
    }
}

async fn run_protected(app: &App, command: ProtectedCommand) -> Result<ExitCode> {
    let api = &app.api;
    match command {
        ProtectedCommand::Feed { skip, limit, comments } => {
            let posts = api.feed(Page { skip, limit }).await?;
            if !comments {
                return output(app, &posts, || render::print_feed(&posts));
            }
            let fetched = join_all(posts.iter().map(|p| api.comments(p.id))).await;
            let threads = attach_comments(posts, fetched)?;
            output(app, &threads, || render::print_threads(&threads))
        }
        ProtectedCommand::Post { title, content } => {
            let post = api.create_post(&NewPost::new(title, content)).await?;
            output(app, &post, || println!("Posted #{}: {}", post.id, post.title))
        }
        ProtectedCommand::DeletePost { id } => {
            api.delete_post(id).await?;
            println!("Deleted post #{}.", id);
            Ok(ExitCode::SUCCESS)
        }
        ProtectedCommand::Like { id } => toggle(api.like(id).await, &format!("Liked post #{}.", id)),
        ProtectedCommand::Unlike { id } => toggle(api.unlike(id).await, &format!("Unliked post #{}.", id)),
        ProtectedCommand::Comments { post } => {
            let comments = api.comments(post).await?;
            output(app, &comments, || render::print_comments(&comments))
        }
        ProtectedCommand::Comment { post, text } => {
            let comment = api.add_comment(post, &text).await?;
            output(app, &comment, || println!("Commented on post #{}.", comment.post_id))
        }
        ProtectedCommand::EditComment { id, text } => {
            let comment = api.update_comment(id, &text).await?;
            output(app, &comment, || println!("Updated comment #{}.", comment.id))
        }
        ProtectedCommand::DeleteComment { id } => {
            api.delete_comment(id).await?;
            println!("Deleted comment #{}.", id);
            Ok(ExitCode::SUCCESS)
        }
        ProtectedCommand::Users => {
            let users = api.list_users().await?;
            output(app, &users, || render::print_users(&users))
        }
        ProtectedCommand::Follow { id } => toggle(api.follow(id).await, &format!("Following user #{}.", id)),
        ProtectedCommand::Unfollow { id } => {
            toggle(api.unfollow(id).await, &format!("Unfollowed user #{}.", id))
        }
        ProtectedCommand::Profile { id: Some(id) } => {
            let profile = api.user_profile(id).await?;
            output(app, &profile, || render::print_user_profile(&profile))
        }
        ProtectedCommand::Profile { id: None } => {
            let (profile, posts) = futures::try_join!(api.my_profile(), api.my_posts())?;
            output(app, &(&profile, &posts), || render::print_my_profile(&profile, &posts))
        }
        ProtectedCommand::MyPosts => {
            let posts = api.my_posts().await?;
            output(app, &posts, || render::print_posts(&posts))
        }
        ProtectedCommand::DeleteAccount { yes } => {
            if !yes {
                bail!("Refusing to delete your account without --yes");
            }
            api.delete_account().await?;
            println!("Account deleted. You have been logged out.");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Pair each post with its comments. A post whose comments failed to load
/// is shown without them, unless the session itself was rejected.
fn attach_comments(
    posts: Vec<PostWithCounts>,
    fetched: Vec<Result<Vec<Comment>, ApiError>>,
) -> Result<Vec<(PostWithCounts, Vec<Comment>)>, ApiError> {
    posts
        .into_iter()
        .zip(fetched)
        .map(|(post, comments)| match comments {
            Ok(comments) => Ok((post, comments)),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(post_id = post.id, error = %e, "Failed to fetch comments");
                Ok((post, Vec::new()))
            }
        })
        .collect()
}

fn output<T: Serialize + ?Sized>(app: &App, value: &T, text: impl FnOnce()) -> Result<ExitCode> {
    if app.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text();
    }
    Ok(ExitCode::SUCCESS)
}

/// Report a like/follow toggle. A conflict means the server already holds
/// the requested state, so it is a note rather than a failure.
fn toggle(result: Result<(), ApiError>, done: &str) -> Result<ExitCode> {
    match result {
        Ok(()) => println!("{}", done),
        Err(e) => match e.conflict_kind() {
            Some(ConflictKind::AlreadyLiked) => println!("You already like this post."),
            Some(ConflictKind::NotLiked) => println!("You had not liked this post."),
            Some(ConflictKind::AlreadyFollowing) => println!("You already follow this user."),
            Some(ConflictKind::NotFollowing) => println!("You were not following this user."),
            Some(ConflictKind::SelfFollow) => bail!("You cannot follow or unfollow yourself"),
            None => return Err(e.into()),
        },
    }
    Ok(ExitCode::SUCCESS)
}

async fn login(app: &mut App, username: Option<String>) -> Result<ExitCode> {
    let username = match username.or_else(|| app.config.last_username.clone()) {
        Some(name) => name,
        None => prompt_username()?,
    };
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => rpassword::prompt_password(format!("Password for {}: ", username))
            .context("Failed to read password")?,
    };

    match app.api.login(&username, &password).await {
        Ok(_) => {
            println!("Logged in as {}.", username);
            app.config.last_username = Some(username);
            if let Err(e) = app.config.save() {
                warn!(error = %e, "Failed to save config");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) if e.kind() == ErrorKind::AuthenticationFailed => {
            eprintln!("{}", e);
            eprintln!("Don't have an account? Run `weconnect register --username {} --email <email>`.", username);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let name = line.trim().to_string();
    if name.is_empty() {
        bail!("A username is required");
    }
    Ok(name)
}

async fn register(app: &App, username: &str, email: &str) -> Result<ExitCode> {
    let password = match std::env::var(PASSWORD_ENV) {
        Ok(password) => password,
        Err(_) => {
            let first = rpassword::prompt_password("Choose a password: ")?;
            let second = rpassword::prompt_password("Repeat password: ")?;
            if first != second {
                bail!("Passwords do not match");
            }
            first
        }
    };

    let user = app.api.register(username, email, &password).await?;
    debug!(user_id = user.id, "Account created");
    output(app, &user, || {
        println!("Account {} created. Run `weconnect login -u {}` to sign in.", user.username, user.username)
    })
}

fn status(app: &App) -> Result<ExitCode> {
    if !app.store.is_present() {
        println!("Not logged in ({}).", app.config.base_url);
        return Ok(ExitCode::from(EXIT_NOT_LOGGED_IN));
    }
    let who = app.config.last_username.as_deref().unwrap_or("unknown user");
    let since = match app.config.token_backend {
        TokenBackend::File => FileTokenStore::open(app.config.data_dir()?)
            .session()
            .map(|s| format!(", since {}", render::age(s.created_at))),
        TokenBackend::Keyring => None,
    };
    println!("Logged in as {} at {}{}.", who, app.config.base_url, since.unwrap_or_default());
    Ok(ExitCode::SUCCESS)
}
