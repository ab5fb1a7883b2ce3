/// ChezFlora Admin - command line dashboard
///
/// Each subcommand drives one screen controller against the REST backend.
use anyhow::{bail, Context};
use chezflora_admin::{
    api::ListApi,
    auth::Session,
    config::ClientConfig,
    controller::{ContentController, ListController, ScreenKind, SettingsController},
    export,
    models::{
        Comment, ContentEntry, FileUpload, NewContent, NewUser, Role, Subscriber, User, UserUpdate,
    },
    notify::{Notice, Notifier},
    RestClient, UserScope,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "chezflora-admin", version, about = "Administration du site ChezFlora")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in with a staff account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "CHEZFLORA_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Manage administrator accounts
    Admins {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage customer accounts
    Clients {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Moderate blog comments
    Comments {
        #[command(subcommand)]
        action: CommentAction,
    },
    /// Manage newsletter subscribers
    Newsletter {
        #[command(subcommand)]
        action: NewsletterAction,
    },
    /// Edit site content
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },
    /// Shop settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    List,
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: Option<String>,
        /// Only honoured on the admins screen (admin or superadmin)
        #[arg(long, default_value = "admin")]
        role: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        role: Option<String>,
    },
    Delete {
        id: i64,
    },
    /// Set a status: verification, active, blocked or deleted
    Status {
        id: i64,
        status: String,
    },
}

#[derive(Subcommand)]
enum CommentAction {
    List,
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum NewsletterAction {
    List,
    Delete {
        id: i64,
    },
    /// Set a status, or toggle it when omitted
    Status {
        id: i64,
        status: Option<String>,
    },
    /// Write active subscribers to a CSV file
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ContentAction {
    List,
    /// Replace a text value
    Set {
        key: String,
        value: String,
        /// Create the entry instead of replacing it
        #[arg(long)]
        create: bool,
    },
    /// Upload an image for an image key
    Upload {
        key: String,
        file: PathBuf,
    },
    Delete {
        key: String,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    Set {
        key: String,
        value: String,
    },
}

/// Prints notices on stderr
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = ClientConfig::from_env().context("Invalid configuration")?;

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("chezflora_admin={}", config.logging.level).into());
    tracing_subscriber::registry()
        .with(filter)
        .with(
            cli.json_logs
                .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        )
        .with(
            (!cli.json_logs).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        )
        .init();

    let session = Session::restore(config.session.file.clone()).await?;
    let client = RestClient::new(&config.api, session)?;
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    match cli.command {
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            print_banner();
            println!("Connecté en tant que {} ({})", user.name, user.role);
        }
        Command::Logout => {
            client.logout().await?;
            println!("Déconnecté");
        }
        Command::Whoami => match client.session().current_user().await {
            Some(user) => println!("{} <{}> ({})", user.name, user.email, user.role),
            None => bail!("Aucune session active"),
        },
        Command::Admins { action } => {
            run_users(&client, UserScope::Admins, ScreenKind::Admins, action, notifier).await?
        }
        Command::Clients { action } => {
            run_users(&client, UserScope::Clients, ScreenKind::Clients, action, notifier).await?
        }
        Command::Comments { action } => run_comments(&client, action, notifier).await?,
        Command::Newsletter { action } => {
            run_newsletter(&client, &config, action, notifier).await?
        }
        Command::Content { action } => run_content(&client, action, notifier).await?,
        Command::Settings { action } => run_settings(&client, action, notifier).await?,
    }

    Ok(())
}

/// Cancel the screen's in-flight call on Ctrl-C
fn cancel_on_interrupt(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

fn succeeded(ok: bool) -> anyhow::Result<()> {
    if ok {
        Ok(())
    } else {
        bail!("La commande a échoué")
    }
}

async fn loaded<A: ListApi>(
    api: A,
    screen: ScreenKind,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<ListController<A>> {
    let mut controller = ListController::new(api, screen, notifier);
    cancel_on_interrupt(controller.cancel_handle());
    succeeded(controller.load().await)?;
    Ok(controller)
}

async fn run_users(
    client: &RestClient,
    scope: UserScope,
    screen: ScreenKind,
    action: UserAction,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<()> {
    let mut controller = loaded(client.users(scope), screen, notifier).await?;

    match action {
        UserAction::List => print_users(controller.records()),
        UserAction::Create {
            name,
            email,
            password,
            role,
        } => {
            let mut draft = NewUser::new(name, email, role.parse::<Role>()?);
            if let Some(password) = password {
                draft = draft.with_password(password);
            }
            succeeded(controller.create(draft).await)?;
            print_users(controller.records());
        }
        UserAction::Update {
            id,
            name,
            email,
            password,
            role,
        } => {
            let patch = UserUpdate {
                name,
                email,
                password,
                role: role.map(|r| r.parse::<Role>()).transpose()?,
            };
            if patch.is_empty() {
                bail!("Aucun champ à modifier");
            }
            succeeded(controller.update(&id, patch).await)?;
        }
        UserAction::Delete { id } => succeeded(controller.delete(&id).await)?,
        UserAction::Status { id, status } => {
            succeeded(controller.set_status_str(&id, &status).await)?
        }
    }

    Ok(())
}

async fn run_comments(
    client: &RestClient,
    action: CommentAction,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<()> {
    let mut controller = loaded(client.comments(), ScreenKind::Comments, notifier).await?;

    match action {
        CommentAction::List => print_comments(controller.records()),
        CommentAction::Delete { id } => succeeded(controller.delete(&id).await)?,
    }

    Ok(())
}

async fn run_newsletter(
    client: &RestClient,
    config: &ClientConfig,
    action: NewsletterAction,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<()> {
    let mut controller = loaded(client.newsletter(), ScreenKind::Newsletter, notifier).await?;

    match action {
        NewsletterAction::List => print_subscribers(controller.records()),
        NewsletterAction::Delete { id } => succeeded(controller.delete(&id).await)?,
        NewsletterAction::Status { id, status } => {
            let ok = match status {
                Some(raw) => controller.set_status_str(&id, &raw).await,
                None => {
                    let Some(current) = controller.get(&id).map(|s| s.status) else {
                        bail!("Abonné {} introuvable", id);
                    };
                    controller.set_status(&id, current.toggled()).await
                }
            };
            succeeded(ok)?;
        }
        NewsletterAction::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.export.directory.clone());
            let path = export::write_subscribers_csv(&dir, controller.records()).await?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

async fn run_content(
    client: &RestClient,
    action: ContentAction,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<()> {
    let mut controller = ContentController::new(client.content(), notifier);
    cancel_on_interrupt(controller.list().cancel_handle());
    succeeded(controller.load().await)?;

    match action {
        ContentAction::List => print_content(controller.entries()),
        ContentAction::Set { key, value, create } => {
            let ok = if create {
                controller.create(NewContent { key, value }).await
            } else {
                controller.update_text(&key, value).await
            };
            succeeded(ok)?;
        }
        ContentAction::Upload { key, file } => {
            let upload = FileUpload::from_path(&file).await?;
            controller.stage_upload(&key, upload)?;
            succeeded(controller.commit_upload(&key).await)?;
        }
        ContentAction::Delete { key } => succeeded(controller.delete(&key).await)?,
    }

    Ok(())
}

async fn run_settings(
    client: &RestClient,
    action: SettingsAction,
    notifier: Arc<dyn Notifier>,
) -> anyhow::Result<()> {
    let mut controller = SettingsController::new(client.settings(), notifier);
    cancel_on_interrupt(controller.cancel_handle());
    succeeded(controller.load().await)?;

    match action {
        SettingsAction::Show => {
            for (key, value) in controller.settings().iter() {
                println!("{:<28} {}", key, value);
            }
        }
        SettingsAction::Set { key, value } => {
            controller.set(&key, value);
            if !controller.is_dirty() {
                println!("Aucune modification");
                return Ok(());
            }
            succeeded(controller.save().await)?;
        }
    }

    Ok(())
}

fn print_users(users: &[User]) {
    println!("{:<6} {:<24} {:<32} {:<11} {}", "ID", "NOM", "EMAIL", "RÔLE", "STATUT");
    for user in users {
        println!(
            "{:<6} {:<24} {:<32} {:<11} {}",
            user.id, user.name, user.email, user.role, user.status
        );
    }
}

fn print_comments(comments: &[Comment]) {
    println!("{:<6} {:<8} {:<8} {:<6} {}", "ID", "ARTICLE", "AUTEUR", "LIKES", "COMMENTAIRE");
    for comment in comments {
        println!(
            "{:<6} {:<8} {:<8} {:<6} {}",
            comment.id,
            comment.post_id,
            comment.user_id,
            comment.likes,
            comment.excerpt(60)
        );
    }
}

fn print_subscribers(subscribers: &[Subscriber]) {
    println!("{:<6} {:<32} {:<13} {}", "ID", "EMAIL", "STATUT", "INSCRIT LE");
    for sub in subscribers {
        println!(
            "{:<6} {:<32} {:<13} {}",
            sub.id,
            sub.email,
            sub.status,
            sub.created_at.format("%d/%m/%Y")
        );
    }
}

fn print_content(entries: &[ContentEntry]) {
    for entry in entries {
        let marker = if entry.is_image() { "[image]" } else { "" };
        println!("{:<28} {:<8} {}", entry.key, marker, entry.value);
    }
}

fn print_banner() {
    println!(
        r#"
   ________                ________
  / ____/ /_  ___  ____   / ____/ /___  _________ _
 / /   / __ \/ _ \/_  /  / /_  / / __ \/ ___/ __ `/
/ /___/ / / /  __/ / /_ / __/ / / /_/ / /  / /_/ /
\____/_/ /_/\___/ /___//_/   /_/\____/_/   \__,_/

        Administration v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
