//! zoom-events: log in, link Zoom and create events with meeting links.

use clap::{Parser, Subcommand};
use log::{error, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};

use zoom_events::utils::{format_duration, format_start, logging};
use zoom_events::{AppConfig, AppError, AppResult, AppState, EventDraft, EventRecord, DEFAULT_DURATION_MINUTES};

const PASSWORD_ENV: &str = "ZOOM_EVENTS_PASSWORD";

#[derive(Parser)]
#[command(name = "zoom-events")]
#[command(about = "Create events with Zoom meetings through the integration backend")]
struct Cli {
    /// Database file (overrides ZOOM_EVENTS_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and remember the session. The password is taken from
    /// ZOOM_EVENTS_PASSWORD, otherwise from the first line of stdin
    Login {
        #[arg(long)]
        email: String,
    },

    /// Forget the saved session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Check whether a Zoom account is linked
    Status,

    /// Start linking a Zoom account; prints the URL to open
    Connect {
        #[arg(long, default_value = "demo-user")]
        user_id: String,
    },

    /// Finish linking with the state the provider sent back
    Resume {
        #[arg(long)]
        state: String,
    },

    /// Create an event and its Zoom meeting
    Create {
        #[arg(long)]
        title: String,

        /// YYYY-MM-DD
        #[arg(long)]
        date: String,

        /// HH:MM
        #[arg(long)]
        time: String,

        /// Minutes
        #[arg(long, default_value_t = DEFAULT_DURATION_MINUTES)]
        duration: u32,

        #[arg(long)]
        description: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = logging::init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.requires_user_action() {
                warn!("{}", e);
            } else {
                error!("{}", e);
            }
            eprintln!("Error: {}", e.to_safe_string());
            if let Some(hint) = hint_for(&e) {
                eprintln!("{}", hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = cli.db {
        config.storage_path = path;
    }

    let app = AppState::initialize(config).await?;

    match cli.command {
        Command::Login { email } => {
            let password = read_password().await?;
            let session = app.session.login(&email, &password).await?;
            println!("Logged in as {}", session.first_name);
        }
        Command::Logout => {
            app.logout().await?;
            println!("Logged out");
        }
        Command::Whoami => match app.session.current().await {
            Some(session) => println!("{}", session.first_name),
            None => println!("Not logged in"),
        },
        Command::Status => {
            let snapshot = app.connection.refresh().await;
            match (&snapshot.status, &snapshot.error) {
                (_, Some(error)) => println!("Error: {}", error),
                (Some(status), None) => {
                    println!("Connected to Zoom");
                    println!("  Name:         {}", status.display_name());
                    println!("  Email:        {}", status.display_email());
                    println!("  Account type: {}", status.display_account_type());
                }
                (None, None) => println!("Not connected to Zoom"),
            }
        }
        Command::Connect { user_id } => {
            let redirect = app.connection.initiate_connect(&user_id).await?;
            println!("Open this URL to authorize Zoom:");
            println!("{}", redirect.url);
            println!("Then run: zoom-events resume --state {}", redirect.state);
        }
        Command::Resume { state } => {
            let snapshot = app.connection.resume_connect(&state).await?;
            if snapshot.is_connected() {
                println!("Zoom account linked");
            } else {
                println!(
                    "Zoom account not linked{}",
                    snapshot.error.map(|e| format!(": {}", e)).unwrap_or_default()
                );
            }
        }
        Command::Create {
            title,
            date,
            time,
            duration,
            description,
        } => {
            app.connection.refresh().await;
            let draft = EventDraft {
                title,
                start_date: date,
                start_time: time,
                duration_minutes: duration,
                description,
            };
            match app.events.submit(draft).await {
                Ok(record) => print_record(&record),
                Err(AppError::Validation(errors)) => {
                    for (field, message) in errors.iter() {
                        println!("{}: {}", field.as_str(), message);
                    }
                    return Err(AppError::Validation(errors));
                }
                Err(e) => return Err(e),
            }
        }
    }

    Ok(())
}

/// Password from the environment, else one line of stdin, so it never
/// shows up in shell history or the process list.
async fn read_password() -> AppResult<String> {
    if let Some(password) = std::env::var(PASSWORD_ENV).ok().filter(|p| !p.is_empty()) {
        return Ok(password);
    }

    eprint!("Password: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| AppError::auth(format!("Could not read password: {}", e)))?;

    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(AppError::auth(format!(
            "No password given; set {} or pipe it on stdin",
            PASSWORD_ENV
        )));
    }
    Ok(password)
}

/// Next step for errors the user has to resolve before trying again.
fn hint_for(error: &AppError) -> Option<&'static str> {
    if !error.requires_user_action() {
        return None;
    }
    Some(match error {
        AppError::NotAuthenticated | AppError::Auth(_) => "Log in with: zoom-events login --email <email>",
        AppError::NotConnected => "Link Zoom with: zoom-events connect",
        _ => "Start linking again with: zoom-events connect",
    })
}

fn print_record(record: &EventRecord) {
    println!("{} [{}]", record.title, record.status.as_str());
    println!("  Starts:   {}", format_start(&record.start_date, &record.start_time));
    println!("  Duration: {}", format_duration(record.duration_minutes));
    if let Some(description) = &record.description {
        println!("  {}", description);
    }
    if let Some(meeting_id) = &record.meeting_id {
        println!("  Meeting:  {}", meeting_id);
    }
    if let Some(join_url) = &record.join_url {
        println!("  Join:     {}", join_url);
    }
    if let Some(start_url) = &record.start_url {
        println!("  Host:     {}", start_url);
    }
    if let Some(error) = &record.error {
        println!("  Error:    {}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_login_takes_no_password_argument() {
        let cli = Cli::try_parse_from(["zoom-events", "login", "--email", "ana@example.com"]).unwrap();
        assert!(matches!(cli.command, Command::Login { email } if email == "ana@example.com"));

        let with_password =
            Cli::try_parse_from(["zoom-events", "login", "--email", "ana@example.com", "--password", "secret"]);
        assert!(with_password.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_password_read_from_environment() {
        std::env::set_var(PASSWORD_ENV, "secret");
        let password = read_password().await;
        std::env::remove_var(PASSWORD_ENV);
        assert_eq!(password.unwrap(), "secret");
    }

    #[test]
    fn test_hints_only_for_user_actions() {
        assert!(hint_for(&AppError::NotConnected).unwrap().contains("connect"));
        assert!(hint_for(&AppError::NotAuthenticated).unwrap().contains("login"));
        assert!(hint_for(&AppError::SubmissionInFlight).is_none());
    }
}
