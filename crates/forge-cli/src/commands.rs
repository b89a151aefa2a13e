use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use indicatif::MultiProgress;
use tracing::debug;

use forge_client::ConsoleClient;
use forge_core::config::ConsoleConfig;
use forge_core::mac::MacAddr;

use crate::display::{FileRow, MachineRow, VersionRow};
use crate::logging::{self, LogFormat};
use crate::output::{self, OutputFormat};
use crate::ui;

#[derive(Parser)]
#[command(
    name = "forgectl",
    version,
    about = "Administration console for the Blacksmith bare-metal provisioning service"
)]
struct Cli {
    /// Output format: table, json, yaml
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: String,

    /// Service endpoint (overrides FORGECTL_ENDPOINT)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Emit structured JSON logs instead of human-readable ones
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and manage provisioned machines
    Machine {
        #[command(subcommand)]
        action: MachineCmd,
    },

    /// Manage cluster-wide configuration variables
    Var {
        #[command(subcommand)]
        action: VarCmd,
    },

    /// Manage uploaded workspace files
    File {
        #[command(subcommand)]
        action: FileCmd,
    },

    /// Show service version and uptime
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum MachineCmd {
    /// List all machines known to the service
    List,
    /// Show the variables set on one machine
    Show {
        /// Machine MAC address
        mac: String,
    },
    /// Delete a machine and everything associated with it
    Delete {
        /// Machine MAC address
        mac: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Set a machine-scoped variable (last write wins)
    Set {
        /// Machine MAC address
        mac: String,
        name: String,
        value: String,
    },
    /// Remove a machine-scoped variable
    Unset {
        /// Machine MAC address
        mac: String,
        name: String,
    },
}

#[derive(Subcommand)]
enum VarCmd {
    /// List cluster variables
    List,
    /// Set a cluster variable (last write wins)
    Set { name: String, value: String },
    /// Remove a cluster variable
    Unset { name: String },
}

#[derive(Subcommand)]
enum FileCmd {
    /// List uploaded files
    List,
    /// Upload files to the service workspace; multiple files are sent concurrently
    Upload {
        /// Paths of the files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Delete an uploaded file by name
    Delete { name: String },
}

/// CLI entry point.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(LogFormat::from_flag(cli.log_json));

    let format = OutputFormat::from_str_arg(&cli.output);
    let mut config = ConsoleConfig::from_env();
    if let Some(endpoint) = &cli.endpoint {
        config = config.with_endpoint(endpoint);
    }
    debug!(
        endpoint = %config.endpoint,
        timeout_secs = config.timeout_secs,
        "resolved connection settings"
    );

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "forgectl", &mut std::io::stdout());
        return Ok(());
    }

    let client = ConsoleClient::new(&config)?;

    match cli.command {
        Commands::Machine { action } => match action {
            MachineCmd::List => machine_list(&client, format),
            MachineCmd::Show { mac } => machine_show(&client, &mac, format),
            MachineCmd::Delete { mac, yes } => machine_delete(&client, &mac, yes, format),
            MachineCmd::Set { mac, name, value } => {
                machine_set(&client, &mac, &name, &value, format)
            }
            MachineCmd::Unset { mac, name } => machine_unset(&client, &mac, &name, format),
        },
        Commands::Var { action } => match action {
            VarCmd::List => var_list(&client, format),
            VarCmd::Set { name, value } => var_set(&client, &name, &value, format),
            VarCmd::Unset { name } => var_unset(&client, &name, format),
        },
        Commands::File { action } => match action {
            FileCmd::List => file_list(&client, format),
            FileCmd::Upload { paths } => file_upload(&client, paths, format),
            FileCmd::Delete { name } => file_delete(&client, &name, format),
        },
        Commands::Version => version_info(&client, format),
        Commands::Completions { .. } => unreachable!("handled above"),
    }
}

/// Run one async client operation on a fresh runtime.
fn run_op<T>(f: impl Future<Output = forge_client::Result<T>>) -> Result<T> {
    let runtime = build_runtime()?;
    Ok(runtime.block_on(f)?)
}

fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .with_context(|| "Failed to create tokio runtime")
}

fn parse_mac(s: &str) -> Result<MacAddr> {
    Ok(s.parse::<MacAddr>()?)
}

fn now_epoch() -> i64 {
    chrono::Utc::now().timestamp()
}

// ---------------------------------------------------------------------------
// machine
// ---------------------------------------------------------------------------

fn machine_list(client: &ConsoleClient, format: OutputFormat) -> Result<()> {
    let machines = run_op(client.machines())?;
    let now = now_epoch();
    let rows: Vec<MachineRow> = machines
        .iter()
        .map(|m| MachineRow::from_machine(m, now))
        .collect();
    output::render_list(&rows, format);
    Ok(())
}

fn machine_show(client: &ConsoleClient, mac: &str, format: OutputFormat) -> Result<()> {
    let mac = parse_mac(mac)?;
    let variables = run_op(client.machine_variables(&mac))?;
    output::render_variables(&variables, format);
    Ok(())
}

fn machine_delete(client: &ConsoleClient, mac: &str, yes: bool, format: OutputFormat) -> Result<()> {
    let mac = parse_mac(mac)?;
    if !yes
        && !ui::confirm(&format!(
            "Remove machine {}? This action is not easily undoable.",
            mac
        ))
    {
        ui::info("Aborted");
        return Ok(());
    }

    run_op(client.delete_machine(&mac))?;
    ui::success(&format!("Deleted machine {}", mac));
    machine_list(client, format)
}

fn machine_set(
    client: &ConsoleClient,
    mac: &str,
    name: &str,
    value: &str,
    format: OutputFormat,
) -> Result<()> {
    let mac = parse_mac(mac)?;
    run_op(client.set_machine_variable(&mac, name, value))?;
    // Re-fetch rather than trusting the mutation's own response.
    let variables = run_op(client.machine_variables(&mac))?;
    output::render_variables(&variables, format);
    Ok(())
}

fn machine_unset(client: &ConsoleClient, mac: &str, name: &str, format: OutputFormat) -> Result<()> {
    let mac = parse_mac(mac)?;
    run_op(client.delete_machine_variable(&mac, name))?;
    let variables = run_op(client.machine_variables(&mac))?;
    output::render_variables(&variables, format);
    Ok(())
}

// ---------------------------------------------------------------------------
// var
// ---------------------------------------------------------------------------

fn var_list(client: &ConsoleClient, format: OutputFormat) -> Result<()> {
    let variables = run_op(client.variables())?;
    output::render_variables(&variables, format);
    Ok(())
}

fn var_set(client: &ConsoleClient, name: &str, value: &str, format: OutputFormat) -> Result<()> {
    run_op(client.set_variable(name, value))?;
    var_list(client, format)
}

fn var_unset(client: &ConsoleClient, name: &str, format: OutputFormat) -> Result<()> {
    run_op(client.delete_variable(name))?;
    var_list(client, format)
}

// ---------------------------------------------------------------------------
// file
// ---------------------------------------------------------------------------

fn file_list(client: &ConsoleClient, format: OutputFormat) -> Result<()> {
    let files = run_op(client.files())?;
    let now = now_epoch();
    let rows: Vec<FileRow> = files.iter().map(|f| FileRow::from_file(f, now)).collect();
    output::render_list(&rows, format);
    Ok(())
}

fn file_upload(client: &ConsoleClient, paths: Vec<PathBuf>, format: OutputFormat) -> Result<()> {
    debug!(files = paths.len(), "starting uploads");
    let multi = MultiProgress::new();
    let mut bars = HashMap::new();
    for path in &paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        bars.insert(path.clone(), ui::upload_bar(&multi, &name));
    }
    let bars = Arc::new(bars);
    let observer_bars = Arc::clone(&bars);

    let runtime = build_runtime()?;
    let results = runtime.block_on(client.upload_many(paths, move |path, progress| {
        if let Some(pb) = observer_bars.get(path) {
            pb.set_position(progress.percent as u64);
            match progress.status {
                Some(label) => pb.set_message(label),
                None => pb.finish_with_message(""),
            }
        }
    }));

    let mut failed = 0usize;
    for (path, result) in &results {
        match result {
            Ok(()) => ui::success(&format!("Uploaded {}", path.display())),
            Err(e) => {
                if let Some(pb) = bars.get(path) {
                    pb.abandon_with_message("failed");
                }
                ui::error(&format!("{}: {}", path.display(), e));
                failed += 1;
            }
        }
    }

    let files = runtime.block_on(client.files())?;
    let now = now_epoch();
    let rows: Vec<FileRow> = files.iter().map(|f| FileRow::from_file(f, now)).collect();
    output::render_list(&rows, format);

    if failed > 0 {
        anyhow::bail!("{} of {} uploads failed", failed, results.len());
    }
    Ok(())
}

fn file_delete(client: &ConsoleClient, name: &str, format: OutputFormat) -> Result<()> {
    run_op(client.delete_file(name))?;
    ui::success(&format!("Deleted {}", name));
    file_list(client, format)
}

// ---------------------------------------------------------------------------
// version
// ---------------------------------------------------------------------------

fn version_info(client: &ConsoleClient, format: OutputFormat) -> Result<()> {
    let info = run_op(client.version())?;
    output::render_one(&VersionRow::from_info(&info, now_epoch()), format);
    Ok(())
}
