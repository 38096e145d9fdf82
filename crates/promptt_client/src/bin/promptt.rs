//! crates/promptt_client/src/bin/promptt.rs
//!
//! Usage:
//! ```bash
//! promptt signup --email me@example.com --password hunter22
//! promptt generate --category marketing --copy "launch tweet for a coffee app"
//! promptt history
//! promptt password --password n3w-secret --confirm n3w-secret
//! promptt favorite <id>
//! promptt usage
//! ```

use clap::{Parser, Subcommand};
use promptt_client::{
    config::{ClientConfig, ConfigError},
    error::{ClientError, ClientResult},
    ApiClient, AuthClient, CommandClipboard, HttpGenerationGateway, HttpPromptStore, SessionFile,
};
use promptt_core::{
    Category, FavoriteOutcome, HistoryView, HistoryViewer, PromptError,
    PromptGenerationController, SessionContext, SessionEvent, SubmitOutcome,
};
use std::sync::Arc;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "promptt",
    about = "Turn a goal into an optimized AI prompt",
    long_about = "Generates prompts through the Promptt API and manages the prompt history of a signed-in user."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// End the current session
    Logout,
    /// Set a new password for the signed-in account
    Password {
        #[arg(long)]
        password: String,
        /// Must repeat --password
        #[arg(long)]
        confirm: String,
    },
    /// Generate a prompt for a goal
    Generate {
        /// What the prompt should achieve
        #[arg(required = true)]
        goal: Vec<String>,
        /// One of: writing, marketing, coding, analysis, creative, business
        #[arg(long, short)]
        category: Option<Category>,
        /// Copy the result to the clipboard
        #[arg(long)]
        copy: bool,
        /// Mark the saved result as a favorite (signed-in users only)
        #[arg(long)]
        favorite: bool,
        /// Model API key, for deployments that accept caller-supplied keys
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List saved prompts, newest first
    History,
    /// Toggle the favorite flag of a saved prompt
    Favorite { id: Uuid },
    /// Delete a saved prompt
    Delete { id: Uuid },
    /// Copy a saved prompt to the clipboard
    Copy { id: Uuid },
    /// Show how many generations are left today
    Usage,
}

/// Everything a command needs, wired for the current session.
struct App {
    config: ClientConfig,
    session_file: SessionFile,
    session: SessionContext,
    api: ApiClient,
    store: Arc<HttpPromptStore>,
    clipboard: Arc<CommandClipboard>,
}

impl App {
    async fn start(config: ClientConfig) -> ClientResult<Self> {
        let session_file = SessionFile::new(&config.session_file);
        let clipboard = CommandClipboard::from_command_line(&config.clipboard_command)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "PROMPTT_CLIPBOARD_COMMAND".to_string(),
                    "no program given".to_string(),
                )
            })?;

        let stored = session_file.load().await?;
        let api = ApiClient::new(&config.api_url).with_token(stored.as_ref().map(|s| s.token.clone()));

        // A token the server no longer accepts is dropped, leaving an anonymous session.
        let session = match AuthClient::new(api.clone()).me().await? {
            Some(user) => SessionContext::signed_in(user),
            None => {
                if stored.is_some() {
                    warn!("Stored session expired; continuing signed out");
                    session_file.clear().await?;
                }
                SessionContext::anonymous()
            }
        };
        let api = if session.is_authenticated() {
            api
        } else {
            api.with_token(None)
        };

        Ok(Self {
            store: Arc::new(HttpPromptStore::new(api.clone())),
            clipboard: Arc::new(clipboard),
            config,
            session_file,
            session,
            api,
        })
    }

    fn controller(&self, api_key: Option<String>) -> PromptGenerationController {
        let gateway = HttpGenerationGateway::new(self.api.clone()).with_api_key(api_key);
        PromptGenerationController::new(Arc::new(gateway), self.store.clone(), self.clipboard.clone())
    }

    fn viewer(&self) -> HistoryViewer {
        HistoryViewer::new(self.store.clone(), self.clipboard.clone())
    }

    fn require_sign_in(&self) -> ClientResult<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(ClientError::NotSignedIn)
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    let config = ClientConfig::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let app = App::start(config).await?;

    match cli.command {
        Command::Signup { email, password } => sign_in(app, &email, &password, true).await,
        Command::Login { email, password } => sign_in(app, &email, &password, false).await,
        Command::Logout => logout(app).await,
        Command::Password { password, confirm } => change_password(app, &password, &confirm).await,
        Command::Generate {
            goal,
            category,
            copy,
            favorite,
            api_key,
        } => generate(app, &goal.join(" "), category, copy, favorite, api_key).await,
        Command::History => history(app).await,
        Command::Favorite { id } => toggle_favorite(app, id).await,
        Command::Delete { id } => delete(app, id).await,
        Command::Copy { id } => copy(app, id).await,
        Command::Usage => usage(app).await,
    }
}

//=========================================================================================
// Commands
//=========================================================================================

async fn sign_in(mut app: App, email: &str, password: &str, new_account: bool) -> ClientResult<()> {
    let auth = AuthClient::new(ApiClient::new(&app.config.api_url));
    let stored = if new_account {
        auth.signup(email, password).await?
    } else {
        auth.login(email, password).await?
    };
    app.session_file.save(&stored).await?;

    let event = SessionEvent::SignedIn(stored.user());
    app.session.apply(&event);
    app.api = ApiClient::new(&app.config.api_url).with_token(Some(stored.token.clone()));
    app.store = Arc::new(HttpPromptStore::new(app.api.clone()));

    let controller = app.controller(None);
    controller.handle_session_event(&event).await;
    println!("Signed in as {}", stored.email.as_deref().unwrap_or("(no email)"));
    match controller.refresh_usage(&app.session, app.store.as_ref()).await {
        Ok(left) => println!("{} prompts left today", left),
        Err(e) => warn!("Could not read usage: {}", e),
    }
    Ok(())
}

async fn logout(app: App) -> ClientResult<()> {
    if !app.session.is_authenticated() {
        println!("Not signed in");
        return Ok(());
    }
    if let Err(e) = AuthClient::new(app.api.clone()).logout().await {
        warn!("Server-side logout failed: {}", e);
    }
    app.session_file.clear().await?;
    println!("Signed out");
    Ok(())
}

async fn change_password(app: App, password: &str, confirm: &str) -> ClientResult<()> {
    app.require_sign_in()?;
    AuthClient::new(app.api.clone())
        .change_password(password, confirm)
        .await?;
    println!("Password updated");
    Ok(())
}

async fn generate(
    app: App,
    goal: &str,
    category: Option<Category>,
    copy: bool,
    favorite: bool,
    api_key: Option<String>,
) -> ClientResult<()> {
    let controller = app.controller(api_key);
    if app.session.is_authenticated() {
        if let Err(e) = controller.refresh_usage(&app.session, app.store.as_ref()).await {
            warn!("Could not read usage: {}", e);
        }
    }

    let current = match controller.submit(&app.session, goal, category).await {
        Ok(SubmitOutcome::Generated(current)) => current,
        Ok(SubmitOutcome::Ignored) => return Ok(()),
        Err(PromptError::QuotaExceeded) => {
            eprintln!("You have used all of today's free prompts. Upgrade for unlimited generations.");
            return Err(PromptError::QuotaExceeded.into());
        }
        Err(e) => return Err(e.into()),
    };
    println!("{}", current.result.text);

    if copy {
        controller.copy_result().await?;
        eprintln!("Copied to clipboard");
    }
    if favorite {
        match controller.toggle_favorite(&app.session).await? {
            FavoriteOutcome::Updated { is_favorite } => {
                eprintln!("{}", if is_favorite { "Saved as favorite" } else { "Removed from favorites" })
            }
            FavoriteOutcome::SignInRequired => eprintln!("Sign in to save favorites"),
        }
    }
    if app.session.is_authenticated() {
        eprintln!("{} prompts left today", controller.daily_uses_left().await);
    }
    Ok(())
}

async fn history(app: App) -> ClientResult<()> {
    app.require_sign_in()?;
    match app.viewer().list(&app.session).await? {
        HistoryView::Empty => println!("No prompts yet. Generate one with `promptt generate`."),
        HistoryView::Entries(records) => {
            for record in records {
                println!(
                    "{} {} {} [{}] {}",
                    record.id,
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    if record.is_favorite { "*" } else { " " },
                    record.category.map(|c| c.as_str()).unwrap_or("-"),
                    record.goal
                );
                let preview = record.generated_text.lines().next().unwrap_or_default();
                println!("    {}", preview);
            }
        }
    }
    Ok(())
}

async fn toggle_favorite(app: App, id: Uuid) -> ClientResult<()> {
    app.require_sign_in()?;
    let viewer = app.viewer();
    viewer.list(&app.session).await?;
    let is_favorite = viewer.toggle_favorite(&app.session, id).await?;
    println!("{}", if is_favorite { "Marked as favorite" } else { "Removed from favorites" });
    Ok(())
}

async fn delete(app: App, id: Uuid) -> ClientResult<()> {
    app.require_sign_in()?;
    app.viewer().delete(&app.session, id).await?;
    println!("Deleted {}", id);
    Ok(())
}

async fn copy(app: App, id: Uuid) -> ClientResult<()> {
    app.require_sign_in()?;
    let viewer = app.viewer();
    viewer.list(&app.session).await?;
    viewer.copy(id).await?;
    println!("Copied to clipboard");
    Ok(())
}

async fn usage(app: App) -> ClientResult<()> {
    app.require_sign_in()?;
    let left = app
        .controller(None)
        .refresh_usage(&app.session, app.store.as_ref())
        .await?;
    println!("{} prompts left today", left);
    Ok(())
}
