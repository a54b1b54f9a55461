//! bbb-meetings - terminal client for the site meetings tool
//!
//! Lists, schedules, joins and ends BigBlueButton meetings of a site and
//! manages their recordings and permissions through the tool's REST
//! endpoints.

mod api;
mod availability;
mod config;
mod form;
mod models;
mod perms;
mod refresh;
mod session;
mod views;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::recordings::RecordingAction;
use config::Config;
use form::FormEdits;
use views::commands::{self, WatchTarget};

#[derive(Parser)]
#[command(name = "bbb-meetings")]
#[command(about = "Terminal client for the site meetings (BigBlueButton) tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current user, permissions and tool settings
    Settings,

    /// List the site's meetings with their live status
    Meetings {
        /// Only show meetings whose name, owner or id contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },

    /// Show one meeting in detail
    Show {
        meeting_id: String,

        /// Group session to inspect
        #[arg(short, long)]
        group: Option<String>,
    },

    /// Keep a view on screen, refreshing it periodically
    Watch {
        /// Meeting to watch; the meeting list when omitted
        meeting_id: Option<String>,

        #[arg(short, long)]
        group: Option<String>,

        /// Watch recordings instead of meetings
        #[arg(short, long)]
        recordings: bool,
    },

    /// Schedule a new meeting
    Create(MeetingArgs),

    /// Change an existing meeting
    Edit {
        meeting_id: String,

        #[command(flatten)]
        args: MeetingArgs,
    },

    /// Delete a meeting
    Delete { meeting_id: String },

    /// End a running meeting
    End {
        meeting_id: String,

        #[arg(short, long)]
        group: Option<String>,

        /// End every session of the meeting, group sessions included
        #[arg(long)]
        all: bool,
    },

    /// Print the join link of a meeting
    Join {
        meeting_id: String,

        #[arg(short, long)]
        group: Option<String>,

        /// Keep watching the meeting after joining
        #[arg(short, long)]
        watch: bool,
    },

    /// List recordings of the site or of one meeting
    Recordings {
        #[arg(short, long)]
        meeting: Option<String>,

        #[arg(short, long)]
        group: Option<String>,
    },

    /// Change a recording
    Recording {
        #[command(subcommand)]
        action: RecordingCommand,
    },

    /// Show site role permissions, or change them with --set
    Perms {
        /// Change as role:token=true|false (repeatable)
        #[arg(long)]
        set: Vec<String>,
    },

    /// Show or change local configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum RecordingCommand {
    Publish { meeting_id: String, record_id: String },
    Unpublish { meeting_id: String, record_id: String },
    Protect { meeting_id: String, record_id: String },
    Unprotect { meeting_id: String, record_id: String },
    Delete { meeting_id: String, record_id: String },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective configuration
    Show,
    /// Persist one key (base_url, site_id, session_cookie, meetings_refresh_ms,
    /// recordings_refresh_ms, timeout_secs); an empty value unsets it
    Set { key: String, value: String },
}

/// Meeting fields. Dates are `YYYY-MM-DD HH:MM` in the server timezone.
#[derive(Args)]
struct MeetingArgs {
    #[arg(short, long)]
    name: Option<String>,

    /// Welcome message shown in the session
    #[arg(short, long)]
    description: Option<String>,

    #[arg(long)]
    start: Option<String>,

    #[arg(long)]
    end: Option<String>,

    /// Remove the start date
    #[arg(long, conflicts_with = "start")]
    no_start: bool,

    /// Remove the end date
    #[arg(long, conflicts_with = "end")]
    no_end: bool,

    /// all:<role>, user:<id>:<role>, group:<id>:<role> or role:<id>:<role>
    /// where <role> is attendee or moderator (repeatable)
    #[arg(short, long = "participant")]
    participants: Vec<String>,

    #[arg(long)]
    recording: Option<bool>,

    /// Maximum recording length in minutes (0 for none)
    #[arg(long)]
    recording_duration: Option<i64>,

    #[arg(long)]
    wait_for_moderator: Option<bool>,

    #[arg(long)]
    multiple_sessions: Option<bool>,

    #[arg(long)]
    group_sessions: Option<bool>,

    /// Add the meeting to the site calendar
    #[arg(long)]
    add_to_calendar: bool,

    /// Email the participants
    #[arg(long)]
    notify: bool,

    /// URL of a presentation to preload
    #[arg(long)]
    presentation: Option<String>,
}

impl From<MeetingArgs> for FormEdits {
    fn from(args: MeetingArgs) -> Self {
        Self {
            name: args.name,
            description: args.description,
            start: args.start,
            end: args.end,
            clear_start: args.no_start,
            clear_end: args.no_end,
            participants: args.participants,
            recording: args.recording,
            recording_duration: args.recording_duration,
            wait_for_moderator: args.wait_for_moderator,
            multiple_sessions_allowed: args.multiple_sessions,
            group_sessions: args.group_sessions,
            add_to_calendar: args.add_to_calendar,
            notify_participants: args.notify,
            presentation: args.presentation,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config = Config::load()?;

    match cli.command {
        Commands::Settings => {
            commands::settings(&config).await?;
        }
        Commands::Meetings { filter } => {
            commands::meetings(&config, filter).await?;
        }
        Commands::Show { meeting_id, group } => {
            commands::show(&config, &meeting_id, group).await?;
        }
        Commands::Watch {
            meeting_id,
            group,
            recordings,
        } => {
            let target = match (recordings, meeting_id) {
                (true, meeting_id) => WatchTarget::Recordings {
                    meeting_id,
                    group_id: group,
                },
                (false, Some(id)) => WatchTarget::Meeting { id, group_id: group },
                (false, None) => WatchTarget::Meetings,
            };
            commands::watch(&config, target).await?;
        }
        Commands::Create(args) => {
            tracing::info!("Creating meeting...");
            commands::create(&config, args.into()).await?;
        }
        Commands::Edit { meeting_id, args } => {
            commands::edit(&config, &meeting_id, args.into()).await?;
        }
        Commands::Delete { meeting_id } => {
            commands::delete(&config, &meeting_id).await?;
        }
        Commands::End {
            meeting_id,
            group,
            all,
        } => {
            tracing::info!("Ending meeting {}...", meeting_id);
            commands::end(&config, &meeting_id, group, all).await?;
        }
        Commands::Join {
            meeting_id,
            group,
            watch,
        } => {
            commands::join(&config, &meeting_id, group, watch).await?;
        }
        Commands::Recordings { meeting, group } => {
            commands::recordings(&config, meeting, group).await?;
        }
        Commands::Recording { action } => {
            let (action, meeting_id, record_id) = match action {
                RecordingCommand::Publish { meeting_id, record_id } => {
                    (RecordingAction::Publish, meeting_id, record_id)
                }
                RecordingCommand::Unpublish { meeting_id, record_id } => {
                    (RecordingAction::Unpublish, meeting_id, record_id)
                }
                RecordingCommand::Protect { meeting_id, record_id } => {
                    (RecordingAction::Protect, meeting_id, record_id)
                }
                RecordingCommand::Unprotect { meeting_id, record_id } => {
                    (RecordingAction::Unprotect, meeting_id, record_id)
                }
                RecordingCommand::Delete { meeting_id, record_id } => {
                    (RecordingAction::Delete, meeting_id, record_id)
                }
            };
            commands::recording_action(&config, action, &meeting_id, &record_id).await?;
        }
        Commands::Perms { set } => {
            commands::perms(&config, set).await?;
        }
        Commands::Config { action } => match action {
            ConfigCommand::Show => commands::config_show(&config)?,
            ConfigCommand::Set { key, value } => commands::config_set(&key, &value)?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_create() {
        let cli = Cli::try_parse_from([
            "bbb-meetings",
            "create",
            "--name",
            "Sync",
            "-p",
            "all:attendee",
            "-p",
            "user:u1:moderator",
            "--recording",
            "true",
            "--start",
            "2024-03-01 10:00",
        ])
        .unwrap();
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        let edits: FormEdits = args.into();
        assert_eq!(edits.name.as_deref(), Some("Sync"));
        assert_eq!(edits.participants.len(), 2);
        assert_eq!(edits.recording, Some(true));
        assert_eq!(edits.start.as_deref(), Some("2024-03-01 10:00"));
    }

    #[test]
    fn test_cli_rejects_conflicting_dates() {
        let parsed = Cli::try_parse_from(["bbb-meetings", "edit", "m1", "--start", "x", "--no-start"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_perms_set() {
        let cli = Cli::try_parse_from([
            "bbb-meetings",
            "perms",
            "--set",
            "maintain:bbb.admin=true",
            "--set",
            "access:bbb.create=false",
        ])
        .unwrap();
        match cli.command {
            Commands::Perms { set } => assert_eq!(set.len(), 2),
            _ => panic!("expected perms"),
        }
    }
}
