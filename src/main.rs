//! notevault command line.
//!
//! A thin front end over the library: every command maps onto one
//! session or workspace operation and prints the resulting view.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use notevault::models::{note_segments, NoteSegment, TimelineItem};
use notevault::services::{Workspace, WorkspaceEvent};
use notevault::{api::UploadFile, config, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "notevault", version, about = "Notes and files workspace client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session credentials
    Login { email: String, password: String },
    /// Create an account and log in
    Register { email: String, password: String },
    /// End this session
    Logout,
    /// End every session of this user
    LogoutAll,
    /// Show the logged-in user
    Whoami,
    /// Change the password (ends all sessions)
    Passwd { current: String, new: String },
    /// List a location
    Ls {
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Create a folder
    Mkdir {
        name: String,
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Delete a folder and everything in it
    Rmdir {
        id: i64,
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Add a note
    Note {
        content: String,
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Replace a note's content
    EditNote {
        id: i64,
        content: String,
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Delete a note
    RmNote {
        id: i64,
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Upload a file
    Upload {
        path: PathBuf,
        #[arg(long)]
        folder: Option<i64>,
    },
    /// Download a file into a directory
    Download {
        id: i64,
        #[arg(long)]
        folder: Option<i64>,
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Delete a file
    RmFile {
        id: i64,
        #[arg(long)]
        folder: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = config::init();
    let state = AppState::new(config)?;
    tracing::debug!(api = %config.api.base_url, "Configured");

    match cli.command {
        Commands::Login { email, password } => {
            let auth = state.session.login(&email, &password).await?;
            let expires_at = auth.expires_at(Utc::now());
            println!(
                "Logged in as {} (access token valid until {})",
                auth.user.email,
                expires_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        Commands::Register { email, password } => {
            let auth = state.session.register(&email, &password).await?;
            println!("Registered {}", auth.user.email);
        }
        Commands::Logout => {
            state.session.logout().await?;
            println!("Logged out");
        }
        Commands::LogoutAll => {
            let response = state.session.logout_all().await?;
            println!("{}", response.message);
        }
        Commands::Whoami => match state.session.restore().await? {
            Some(user) => println!("{} (id {})", user.email, user.id),
            None => println!("Not logged in"),
        },
        Commands::Passwd { current, new } => {
            let response = state.session.change_password(&current, &new).await?;
            println!("{}", response.message);
        }
        Commands::Ls { folder } => {
            let ws = open(&state, folder).await?;
            print_view(&ws);
        }
        Commands::Mkdir { name, folder } => {
            run(&state, folder, WorkspaceEvent::CreateFolder(name)).await?;
        }
        Commands::Rmdir { id, folder } => {
            run(&state, folder, WorkspaceEvent::DeleteFolder(id)).await?;
        }
        Commands::Note { content, folder } => {
            run(&state, folder, WorkspaceEvent::CreateNote(content)).await?;
        }
        Commands::EditNote {
            id,
            content,
            folder,
        } => {
            let event = WorkspaceEvent::UpdateNote {
                note_id: id,
                content,
            };
            run(&state, folder, event).await?;
        }
        Commands::RmNote { id, folder } => {
            run(&state, folder, WorkspaceEvent::DeleteNote(id)).await?;
        }
        Commands::Upload { path, folder } => {
            let file = UploadFile::from_path(&path).await?;
            run(&state, folder, WorkspaceEvent::UploadFile(file)).await?;
        }
        Commands::Download { id, folder, out } => {
            let mut ws = open(&state, folder).await?;
            let file = ws.download_file(id).await?;
            let path = file.save_to(&out).await?;
            println!("Saved {}", path.display());
        }
        Commands::RmFile { id, folder } => {
            run(&state, folder, WorkspaceEvent::DeleteFile(id)).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "notevault=warn".into());

    let registry = tracing_subscriber::registry().with(filter);
    if std::env::var("LOG_FORMAT").as_deref() == Ok("json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load the root, or a folder when given.
async fn open(state: &AppState, folder: Option<i64>) -> anyhow::Result<Workspace> {
    let mut ws = state.workspace();
    let event = match folder {
        Some(id) => WorkspaceEvent::NavigateInto {
            folder_id: id,
            name: format!("#{}", id),
        },
        None => WorkspaceEvent::Open,
    };
    ws.handle(event)
        .await
        .context("Failed to load workspace")?;
    Ok(ws)
}

async fn run(state: &AppState, folder: Option<i64>, event: WorkspaceEvent) -> anyhow::Result<()> {
    let mut ws = open(state, folder).await?;
    ws.handle(event).await?;
    print_view(&ws);
    Ok(())
}

fn print_view(ws: &Workspace) {
    let trail: Vec<&str> = ws
        .breadcrumbs()
        .items()
        .iter()
        .map(|crumb| crumb.name.as_str())
        .collect();
    println!("{}", trail.join(" / "));

    for folder in ws.folders() {
        println!("  [{}] {}/", folder.id, folder.name);
    }

    for item in ws.timeline() {
        let time = item.created_at().format("%Y-%m-%d %H:%M");
        match item {
            TimelineItem::Note(note) => {
                let text: String = note_segments(&note.content)
                    .iter()
                    .map(|segment| match segment {
                        NoteSegment::Text(text) => text.to_string(),
                        NoteSegment::Link(url) => format!("<{}>", url),
                    })
                    .collect();
                println!("  {}  note {}: {}", time, note.id, text);
            }
            TimelineItem::File(file) => {
                println!(
                    "  {}  file {}: {} ({} bytes, {})",
                    time, file.id, file.name, file.size_bytes, file.mime_type
                );
            }
        }
    }

    if ws.folders().is_empty() && ws.timeline().is_empty() {
        println!("  (empty)");
    }
}
