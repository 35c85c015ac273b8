//! CLI host for the agent workspaces.
//!
//! Drives one workspace per `run` invocation: open, apply config, invoke
//! the stages in order, then print the run log (newest first) and the
//! resulting artifacts. Account subcommands talk to the REST backend and
//! manage the persisted session.

use agent_workspace::api::ApiClient;
use agent_workspace::export::{ExportSink, TableFileExporter};
use agent_workspace::runtime::InProcessRuntime;
use agent_workspace::session::{self, Session};
use agent_workspace_sdk::{
    log_error, log_info, log_success, log_warning, AgentRuntime, Severity, StageSchema,
    WorkspaceHandle, WorkspaceStatus,
};
use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "agent-workspace")]
#[command(about = "Teaching-assistant agent workspaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the available agents
    List,

    /// Print one agent's metadata, config schema and stages
    Describe {
        /// Agent identifier, e.g. "topic" or "code-review"
        agent: String,
    },

    /// Open a workspace, run its stages in order, print the results
    Run {
        /// Agent identifier, e.g. "topic" or "code-review"
        agent: String,

        /// Config fields as NAME=VALUE pairs
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Write the week plan artifact to this file after the run
        #[arg(long, value_name = "PATH")]
        export: Option<PathBuf>,

        /// Optional logo referenced from the exported document
        #[arg(long, value_name = "PATH")]
        logo: Option<PathBuf>,
    },

    /// Create an account against the backend and persist the session
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Sign in against the account backend and persist the session
    Signin {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Clear the persisted session
    Signout,

    /// Show the signed-in user
    Whoami,

    /// Rename the signed-in user
    Rename {
        #[arg(long)]
        name: String,
    },

    /// List registered users from the backend
    Users,

    /// Show one registered user
    User {
        /// User identifier
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let session = session::load_session();

    match cli.command {
        Commands::List => cmd_list(&session),
        Commands::Describe { agent } => cmd_describe(&session, &agent),
        Commands::Run {
            agent,
            set,
            export,
            logo,
        } => cmd_run(&session, &agent, set, export, logo).await,
        Commands::Signup {
            name,
            email,
            password,
        } => cmd_signup(&name, &email, &password).await,
        Commands::Signin { email, password } => cmd_signin(&email, &password).await,
        Commands::Signout => cmd_signout(),
        Commands::Whoami => cmd_whoami(&session),
        Commands::Rename { name } => cmd_rename(&session, &name).await,
        Commands::Users => cmd_users().await,
        Commands::User { id } => cmd_user(&id).await,
    }
}

fn to_anyhow(err: Box<dyn std::error::Error + Send + Sync>) -> anyhow::Error {
    anyhow!(err.to_string())
}

fn cmd_list(session: &Session) -> Result<()> {
    let runtime = InProcessRuntime::new(session);
    for agent in runtime.list_agents().map_err(to_anyhow)? {
        println!("{:<12} {}", agent.metadata.id, agent.metadata.name);
        println!("{:<12} {}", "", agent.metadata.description);
    }
    Ok(())
}

fn cmd_describe(session: &Session, agent_id: &str) -> Result<()> {
    let runtime = InProcessRuntime::new(session);
    let Ok(meta) = runtime.get_agent_metadata(agent_id) else {
        log_warning!(
            "Unknown agent '{}'. Choose one of the workspaces below.",
            agent_id
        );
        return cmd_list(session);
    };

    println!("{}", serde_json::to_string_pretty(&meta)?);
    for stage in runtime.list_stages(agent_id).map_err(to_anyhow)? {
        println!("stage {}: {} ({})", stage.index, stage.name, stage.description);
    }
    Ok(())
}

async fn cmd_run(
    session: &Session,
    agent_id: &str,
    sets: Vec<String>,
    export: Option<PathBuf>,
    logo: Option<PathBuf>,
) -> Result<()> {
    let runtime = InProcessRuntime::new(session);

    if runtime.get_agent_metadata(agent_id).is_err() {
        log_warning!(
            "Unknown agent '{}'. Choose one of the workspaces below.",
            agent_id
        );
        return cmd_list(session);
    }

    let stages = runtime.list_stages(agent_id).map_err(to_anyhow)?;
    let handle = runtime.open_workspace(agent_id).map_err(to_anyhow)?;

    for pair in &sets {
        let Some((name, value)) = pair.split_once('=') else {
            bail!("--set expects NAME=VALUE, got '{pair}'");
        };
        runtime
            .set_param(handle.id(), name, value)
            .map_err(to_anyhow)?;
    }

    for stage in &stages {
        log_info!("Running stage '{}'...", stage.name);
        match runtime.invoke_stage(handle.id(), stage.index).await {
            Ok(completion) => match completion.wait().await {
                Some(WorkspaceStatus::Error { message, .. }) => {
                    log_error!("Stage '{}' failed: {}", stage.name, message);
                    break;
                }
                Some(_) => {}
                None => {
                    log_warning!("Workspace went away before '{}' finished", stage.name);
                    break;
                }
            },
            Err(err) => {
                log_warning!("{}", err);
                break;
            }
        }
    }

    println!();
    for entry in runtime
        .get_run_log(handle.id(), None)
        .await
        .map_err(to_anyhow)?
    {
        match entry.severity {
            Severity::Info => {
                log_info!(entry.message);
            }
            Severity::Success => {
                log_success!(entry.message);
            }
            Severity::Warning => {
                log_warning!(entry.message);
            }
            Severity::Error => {
                log_error!(entry.message);
            }
        }
    }

    for stage in &stages {
        if let Some(artifact) = runtime
            .get_artifact(handle.id(), stage.index)
            .await
            .map_err(to_anyhow)?
        {
            println!("\n[{}]", stage.name);
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
    }

    if let Some(path) = export {
        export_week_plan(&runtime, &handle, &stages, path, logo).await?;
    }

    runtime
        .close_workspace(handle.id())
        .await
        .map_err(to_anyhow)?;
    Ok(())
}

/// Hand the week plan artifact to the export sink, if the run produced one
async fn export_week_plan(
    runtime: &InProcessRuntime,
    handle: &WorkspaceHandle,
    stages: &[StageSchema],
    path: PathBuf,
    logo: Option<PathBuf>,
) -> Result<()> {
    let mut plan = None;
    for stage in stages {
        if let Some(artifact) = runtime
            .get_artifact(handle.id(), stage.index)
            .await
            .map_err(to_anyhow)?
        {
            if let Some(found) = artifact.as_week_plan() {
                plan = Some(found.clone());
                break;
            }
        }
    }

    let Some(plan) = plan else {
        log_warning!("No week plan artifact to export");
        return Ok(());
    };

    let exporter = TableFileExporter { output_path: path };
    match exporter.export(&plan, logo.as_deref()) {
        Ok(written) => {
            log_success!("Exported week plan to {}", written.display());
        }
        Err(err) => {
            // Auxiliary failure: the workspace keeps its artifacts
            runtime
                .record_warning(handle.id(), &format!("Export failed: {err}"))
                .await
                .map_err(to_anyhow)?;
            log_warning!("Export failed: {}", err);
        }
    }
    Ok(())
}

async fn cmd_signup(name: &str, email: &str, password: &str) -> Result<()> {
    let client = ApiClient::from_env();
    let response = client.sign_up(name, email, password).await?;
    session::save_session(&response.user)?;
    log_success!("{}", response.message);
    Ok(())
}

async fn cmd_signin(email: &str, password: &str) -> Result<()> {
    let client = ApiClient::from_env();
    let response = client.sign_in(email, password).await?;
    session::save_session(&response.user)?;
    log_success!("Signed in as {}", response.user.full_name);
    Ok(())
}

fn cmd_signout() -> Result<()> {
    session::clear_session()?;
    log_info!("Signed out");
    Ok(())
}

fn cmd_whoami(session: &Session) -> Result<()> {
    match session.user() {
        Some(user) => println!("{} <{}>", user.full_name, user.email),
        None => {
            log_info!("Not signed in");
        }
    }
    Ok(())
}

async fn cmd_rename(session: &Session, name: &str) -> Result<()> {
    let Some(user) = session.user() else {
        bail!("Sign in before renaming your account");
    };
    let client = ApiClient::from_env();
    let response = client.update_user(&user.id, name).await?;
    session::save_session(&response.user)?;
    log_success!("Renamed to {}", response.user.full_name);
    Ok(())
}

async fn cmd_users() -> Result<()> {
    let client = ApiClient::from_env();
    for user in client.fetch_users().await? {
        println!("{:<36} {:<24} {}", user.id, user.full_name, user.email);
    }
    Ok(())
}

async fn cmd_user(id: &str) -> Result<()> {
    let client = ApiClient::from_env();
    let user = client.fetch_user(id).await?;
    println!("{} <{}>", user.full_name, user.email);
    println!("id:         {}", user.id);
    println!("created at: {}", user.created_at);
    Ok(())
}
