//! Command-line front end for the attendance backend.
//!
//! Each subcommand maps onto one screen routine or facade operation of
//! `attendance-core`.

mod render;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use attendance_core::forms::{AttendanceForm, FormError, UserForm};
use attendance_core::screens::{
    filter_users, load_attendance, DashboardScreen, ScreenState,
};
use attendance_core::{
    AttendanceApi, AttendanceQuery, AttendanceStatus, ClientConfig, EntityId, NewAttendance,
    QueryParams, ReqwestTransport, UserUpdate,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// attendance: manage users and attendance records
#[derive(Parser)]
#[command(name = "attendance")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Backend base URL (overrides ATTENDANCE_API_BASE and friends)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check backend health
    Health,

    /// Show user and attendance totals
    Dashboard,

    /// Manage users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Browse and log attendance
    Attendance {
        #[command(subcommand)]
        command: AttendanceCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// List users
    List {
        /// Case-insensitive search on name or email
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Show a single user
    Show { id: EntityId },

    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },

    /// Update a user's name or email
    Update {
        id: EntityId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// Delete a user
    Delete { id: EntityId },
}

#[derive(Subcommand)]
enum AttendanceCommands {
    /// List records, optionally filtered
    List {
        #[arg(short, long)]
        user_id: Option<EntityId>,
        /// Exact date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        #[arg(long)]
        start_date: Option<String>,
        #[arg(long)]
        end_date: Option<String>,
    },

    /// Show a single record
    Show { id: EntityId },

    /// Log a new record
    Log {
        #[arg(short, long)]
        user_id: Option<EntityId>,

        #[arg(short, long, default_value = "present", value_parser = ["present", "absent", "late"])]
        status: String,

        /// RFC 3339 or local `YYYY-MM-DDTHH:MM` (default: now)
        #[arg(short, long, conflicts_with = "date")]
        timestamp: Option<String>,

        /// Date only (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long, default_value = "")]
        notes: String,
    },
}

fn form_errors(errors: Vec<FormError>) -> anyhow::Error {
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    anyhow::anyhow!(messages.join(" "))
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(base_url) = &cli.base_url {
        config = ClientConfig {
            base_url: base_url.trim_end_matches('/').to_string(),
            ..config
        };
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    tracing::debug!(base_url = %config.base_url, "using backend");
    let client = reqwest::Client::builder()
        .user_agent(concat!("attendance-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;
    let api = AttendanceApi::with_transport(config, Arc::new(ReqwestTransport::with_client(client)));

    match cli.command {
        Commands::Health => {
            let health = api.health().await;
            if cli.json {
                render::json(&health)?;
            } else {
                println!("{}: {health}", api.base_url());
            }
        }

        Commands::Dashboard => {
            let screen = DashboardScreen::new();
            screen.refresh(&api).await;
            match screen.state().await {
                ScreenState::Ready(data) if cli.json => render::json(&data)?,
                ScreenState::Ready(data) => render::dashboard(&data),
                ScreenState::Failed(message) => bail!("failed to load dashboard: {message}"),
                ScreenState::Loading => bail!("dashboard did not finish loading"),
            }
        }

        Commands::Users { command } => run_users(&api, command, cli.json).await?,
        Commands::Attendance { command } => run_attendance(&api, command, cli.json).await?,
    }

    Ok(())
}

async fn run_users(api: &AttendanceApi, command: UserCommands, json: bool) -> Result<()> {
    match command {
        UserCommands::List { search } => {
            let users = api
                .get_users(QueryParams::new())
                .await
                .context("failed to load users")?;
            let shown: Vec<_> = filter_users(&users, &search).into_iter().cloned().collect();
            if json {
                render::json(&shown)?;
            } else {
                render::users(&shown);
            }
        }
        UserCommands::Show { id } => {
            let user = api.get_user(&id).await.context("failed to load user")?;
            if json {
                render::json(&user)?;
            } else {
                render::users(std::slice::from_ref(&user));
            }
        }
        UserCommands::Create { name, email } => {
            let input = UserForm::new(&name, &email).validate().map_err(form_errors)?;
            match api.create_user(&input).await.context("failed to create user")? {
                Some(user) => println!("created user {}", user.id),
                None => println!("created user {}", input.name),
            }
        }
        UserCommands::Update { id, name, email } => {
            api.update_user(&id, &UserUpdate { name, email })
                .await
                .context("failed to update user")?;
            println!("updated user {id}");
        }
        UserCommands::Delete { id } => {
            api.delete_user(&id).await.context("failed to delete user")?;
            println!("deleted user {id}");
        }
    }
    Ok(())
}

async fn run_attendance(api: &AttendanceApi, command: AttendanceCommands, json: bool) -> Result<()> {
    match command {
        AttendanceCommands::List {
            user_id,
            date,
            start_date,
            end_date,
        } => {
            let filter = AttendanceQuery {
                user_id,
                date,
                start_date,
                end_date,
            };
            let data = load_attendance(api, &filter)
                .await
                .context("failed to load attendance")?;
            if json {
                render::json(&data.records)?;
            } else {
                render::attendance(&data.records, &data.users);
            }
        }
        AttendanceCommands::Show { id } => {
            let record = api
                .get_attendance_by_id(&id)
                .await
                .context("failed to load attendance record")?;
            if json {
                render::json(&record)?;
            } else {
                render::attendance(std::slice::from_ref(&record), &[]);
            }
        }
        AttendanceCommands::Log {
            user_id,
            status,
            timestamp,
            date,
            notes,
        } => {
            let input = match date {
                Some(date) => {
                    let Some(user_id) = user_id else {
                        return Err(form_errors(vec![FormError::UserRequired]));
                    };
                    let mut input = NewAttendance::new(user_id).status(&status).date(&date);
                    input.notes = Some(notes);
                    input
                }
                None => {
                    let mut form = AttendanceForm {
                        user_id,
                        status: AttendanceStatus::from(status.as_str()),
                        notes,
                        ..AttendanceForm::default()
                    };
                    if let Some(ts) = timestamp {
                        form.timestamp = ts;
                    }
                    form.validate().map_err(form_errors)?
                }
            };
            let user_id = input.user_id.clone();
            let record = api
                .create_attendance(input)
                .await
                .context("failed to log attendance")?;
            match record {
                Some(record) => println!(
                    "logged {} for user {} on {}",
                    record.status,
                    record.user_id,
                    record.date.as_deref().unwrap_or("-")
                ),
                None => println!("logged attendance for user {user_id}"),
            }
        }
    }
    Ok(())
}
