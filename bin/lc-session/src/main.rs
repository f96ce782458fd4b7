//! Lectern session tool
//!
//! Operates on the same client storage the portal uses, so a session can be
//! created, inspected, and run through the guard from a terminal.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use lc_access::{
    landing_path, CheckMode, ClientStorage, FileStorage, GuardDecision, MemoryStorage, PermissionChecker,
    RouteGuard, RouteTable, SessionKeys, SessionManager, User,
};
use lc_config::{AppConfig, ConfigLoader, StorageKind};

#[derive(Parser)]
#[command(name = "lc-session", about = "Inspect and drive the Lectern client session")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "LECTERN_CONFIG")]
    config: Option<PathBuf>,

    /// Override the session data directory
    #[arg(long, env = "LECTERN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store a token and user record.
    Login {
        #[arg(long)]
        token: String,

        /// User record as JSON, e.g. '{"id":1,"email":"a@b.c","role":"Teacher"}'
        #[arg(long)]
        user: String,
    },

    /// Remove the stored session.
    Logout,

    /// Show the current user, role, and permissions.
    Whoami,

    /// Check permissions for the current user.
    Can {
        /// Permission names
        #[arg(required = true)]
        permissions: Vec<String>,

        /// Require every permission instead of any
        #[arg(long)]
        all: bool,
    },

    /// Run the route guard for a portal path.
    Visit { path: String },

    /// List the portal's views and the roles they admit.
    Routes,
}

fn main() -> ExitCode {
    lc_common::logging::init_cli_logging("lc-session");
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };
    let config = loader.load().context("loading configuration")?;
    let sessions = open_sessions(&config, cli.data_dir);
    let guard = RouteGuard::new(config.guard.login_path.clone(), config.guard.home_path.clone());

    match cli.command {
        Command::Login { token, user } => {
            let user: User = serde_json::from_str(&user).context("parsing --user")?;
            let session = sessions.login(&token, &user)?;
            println!("Signed in as {}", session.user.greeting_name());
            println!("Landing page: {}", landing_path(&session, guard.home_path()));
        }
        Command::Logout => {
            sessions.logout()?;
            println!("Signed out");
        }
        Command::Whoami => {
            let Some(session) = sessions.current() else {
                println!("Not signed in");
                return Ok(ExitCode::FAILURE);
            };
            let checker = PermissionChecker::for_session(Some(&session));
            println!("User:  {} <{}>", session.user.greeting_name(), session.user.email);
            match checker.role() {
                Some(role) => println!("Role:  {} ({})", role.label(), role),
                None => println!("Role:  unrecognized ({})", session.raw_role().unwrap_or("none")),
            }
            let permissions: Vec<&str> = checker.permissions().iter().map(|p| p.as_str()).collect();
            println!("Permissions: {}", permissions.join(", "));
        }
        Command::Can { permissions, all } => {
            let mode = if all { CheckMode::All } else { CheckMode::Any };
            let allowed = PermissionChecker::from_manager(&sessions).check(permissions, mode);
            println!("{}", if allowed { "allowed" } else { "denied" });
            return Ok(if allowed { ExitCode::SUCCESS } else { ExitCode::FAILURE });
        }
        Command::Visit { path } => {
            let table = RouteTable::portal();
            let Some(route) = table.find(&path) else {
                anyhow::bail!("no portal view at {}", path);
            };
            match guard.check(&sessions, &route.allowed) {
                GuardDecision::Render(session) => {
                    println!("render {} for {}", route.title, session.user.greeting_name());
                }
                GuardDecision::Redirect { to, reason } => {
                    println!("redirect to {} ({:?})", to, reason);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Routes => {
            for route in RouteTable::portal().routes() {
                let roles = if route.allowed.is_restricted() {
                    route.allowed.roles().iter().map(|r| r.as_str()).collect::<Vec<_>>().join(", ")
                } else {
                    "any signed-in user".to_string()
                };
                println!("{:<22} {:<20} {}", route.path, route.title, roles);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open_sessions(config: &AppConfig, data_dir: Option<PathBuf>) -> SessionManager<Arc<dyn ClientStorage>> {
    let keys = SessionKeys {
        token: config.session.token_key.clone(),
        user: config.session.user_key.clone(),
    };

    let storage: Arc<dyn ClientStorage> = match config.session.storage {
        StorageKind::File => {
            let dir = data_dir.unwrap_or_else(|| PathBuf::from(&config.session.data_dir));
            let storage = FileStorage::in_dir(&dir);
            debug!(path = %storage.path().display(), "Using file session storage");
            Arc::new(storage)
        }
        StorageKind::Memory => {
            warn!("Memory session storage does not outlive this process; set session.storage = \"file\"");
            Arc::new(MemoryStorage::new())
        }
    };

    SessionManager::with_keys(storage, keys)
}
