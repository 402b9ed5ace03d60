//! `trackdesk`: operator CLI for the parcel tracking backend.
//!
//! Public lookup, client self-service, the warehouse scanner workflow, and
//! admin tooling, all through one authenticated gateway.

mod commands;
mod display;
mod prompt;

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trackdesk_client::ApiError;
use trackdesk_scan::{RemovalPolicy, ScanError};

use commands::{App, Overrides};

const SESSION_EXPIRED_EXIT: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "trackdesk", version, about = "Parcel tracking portal CLI")]
struct Cli {
    /// Backend base URL (overrides config and TRACKDESK_URL).
    #[arg(long, global = true)]
    url: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Debug logging on stderr. RUST_LOG takes precedence.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Sign in and store the session.
    Login {
        /// Account email; prompted when omitted.
        email: Option<String>,
    },

    /// Forget the stored session.
    Logout,

    /// Show the signed-in account.
    Whoami,

    /// Create a client account.
    Register {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        whatsapp: String,
        #[arg(long)]
        branch: String,
        /// Preferred personal code; assigned by the backend when omitted.
        #[arg(long)]
        code: Option<String>,
    },

    /// Show or edit the local configuration.
    Config {
        /// Persist a new backend URL.
        #[arg(long)]
        set_url: Option<String>,
        /// Persist a new request timeout in seconds.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        set_timeout: Option<u64>,
    },

    /// Change the signed-in account's password.
    ChangePassword,

    /// Look up a track and its status history. Works without signing in.
    Search { track_number: String },

    /// Bind a track to a personal code (your own by default).
    Assign {
        track_number: String,
        #[arg(long)]
        code: Option<String>,
    },

    /// Hide a track from your active list.
    Archive { track_number: String },

    /// List your tracks.
    Mine {
        #[arg(long)]
        archived: bool,
    },

    /// Set a track's status (admin).
    Status {
        track_number: String,
        /// registered, left-origin, transit, almaty, astana, delivered, or a full label.
        status: String,
    },

    /// Permanently delete a track (admin).
    Delete { track_number: String },

    /// Interactive scanner session for bulk delivery and deletion (admin).
    Scan {
        /// Keep every attempted item in the batch when a delivery is only
        /// partly confirmed and the backend does not say which ones failed.
        #[arg(long)]
        keep_unconfirmed: bool,
    },

    /// Shipment volume by departure date (admin).
    Calendar {
        /// Show the parcels for one date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Set a status on every track that departed on a date (admin).
    BatchStatus { date: NaiveDate, status: String },

    /// Upload a list of tracking numbers (.xlsx, .csv, or one per line) (admin).
    Upload {
        file: PathBuf,
        #[arg(long)]
        date: NaiveDate,
        #[arg(long, default_value = "left-origin")]
        status: String,
    },

    /// User management (admin).
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand, Debug)]
enum UsersAction {
    /// List every account.
    List,
    /// Create an account; the password is prompted.
    Add {
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        whatsapp: String,
        #[arg(long)]
        branch: String,
        #[arg(long)]
        code: Option<String>,
        #[arg(long)]
        admin: bool,
    },
    /// Delete an account, by email or personal code.
    Delete { user: String },
    /// Set a new password, by email or personal code.
    ResetPassword { user: String },
    /// Have the backend generate a new password, by email or personal code.
    GeneratePassword { user: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if needs_login(&err) => {
            eprintln!("session expired, run `trackdesk login`");
            ExitCode::from(SESSION_EXPIRED_EXIT)
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Whether any error in the chain means the session is gone.
fn needs_login(err: &anyhow::Error) -> bool {
    err.chain().any(|e| {
        e.downcast_ref::<ApiError>().is_some_and(ApiError::requires_login)
            || e.downcast_ref::<ScanError>().is_some_and(ScanError::requires_login)
    })
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let app = App::open(&Overrides {
        url: cli.url,
        timeout_secs: cli.timeout,
    })?;

    match cli.command {
        Commands::Login { email } => commands::session::login(&app, email).await?,
        Commands::Logout => commands::session::logout(&app)?,
        Commands::Whoami => commands::session::whoami(&app).await?,
        Commands::Register {
            email,
            name,
            whatsapp,
            branch,
            code,
        } => {
            commands::session::register(
                &app,
                commands::session::RegisterArgs {
                    email,
                    name,
                    whatsapp,
                    branch,
                    code,
                },
            )
            .await?
        }
        Commands::Config {
            set_url,
            set_timeout,
        } => commands::session::config(&app, set_url, set_timeout)?,
        Commands::ChangePassword => commands::session::change_password(&app).await?,

        Commands::Search { track_number } => commands::tracks::search(&app, &track_number).await?,
        Commands::Assign { track_number, code } => {
            commands::tracks::assign(&app, &track_number, code).await?
        }
        Commands::Archive { track_number } => {
            commands::tracks::archive(&app, &track_number).await?
        }
        Commands::Mine { archived } => commands::tracks::mine(&app, archived).await?,
        Commands::Status {
            track_number,
            status,
        } => commands::tracks::set_status(&app, &track_number, &status).await?,
        Commands::Delete { track_number } => commands::tracks::delete(&app, &track_number).await?,

        Commands::Scan { keep_unconfirmed } => {
            app.admin()?;
            let policy = if keep_unconfirmed {
                RemovalPolicy::RemoveNone
            } else {
                RemovalPolicy::RemoveAttempted
            };
            commands::scan::run(&app, policy).await?
        }

        Commands::Calendar { date } => commands::admin::calendar(&app, date).await?,
        Commands::BatchStatus { date, status } => {
            commands::admin::batch_status(&app, date, &status).await?
        }
        Commands::Upload { file, date, status } => {
            commands::admin::upload(&app, &file, date, &status).await?
        }
        Commands::Users { action } => match action {
            UsersAction::List => commands::admin::list_users(&app).await?,
            UsersAction::Add {
                email,
                name,
                whatsapp,
                branch,
                code,
                admin,
            } => {
                commands::admin::add_user(
                    &app,
                    commands::admin::NewUserArgs {
                        name,
                        email,
                        whatsapp,
                        branch,
                        code,
                        admin,
                    },
                )
                .await?
            }
            UsersAction::Delete { user } => commands::admin::delete_user(&app, &user).await?,
            UsersAction::ResetPassword { user } => {
                commands::admin::reset_password(&app, &user).await?
            }
            UsersAction::GeneratePassword { user } => {
                commands::admin::generate_password(&app, &user).await?
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_scan_and_dates() {
        let cli = Cli::try_parse_from(["trackdesk", "--url", "http://b:9", "scan"]).unwrap();
        assert_eq!(cli.url.as_deref(), Some("http://b:9"));
        assert!(matches!(cli.command, Commands::Scan { keep_unconfirmed: false }));

        let cli = Cli::try_parse_from(["trackdesk", "batch-status", "2025-03-01", "almaty"]).unwrap();
        match cli.command {
            Commands::BatchStatus { date, status } => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
                assert_eq!(status, "almaty");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(Cli::try_parse_from(["trackdesk", "calendar", "--date", "March"]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["trackdesk", "--timeout", "0", "whoami"]).is_err());
        assert!(Cli::try_parse_from(["trackdesk", "config", "--set-timeout", "0"]).is_err());

        let cli = Cli::try_parse_from(["trackdesk", "config", "--set-timeout", "15"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                set_timeout: Some(15),
                ..
            }
        ));
    }

    #[test]
    fn expired_session_is_detected_through_context() {
        let err = anyhow::Error::from(ApiError::AuthExpired {
            status: 401,
            message: "x".into(),
        })
        .context("listing users");
        assert!(needs_login(&err));

        let err = anyhow::Error::from(ScanError::AuthExpired(ApiError::NotAuthenticated));
        assert!(needs_login(&err));

        let err = anyhow::Error::from(ApiError::Server {
            status: 500,
            message: "boom".into(),
        });
        assert!(!needs_login(&err));
    }
}
