use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use impugna_engine::{FileCandidate, FileUploader, UploadProfile, impugnacion_step_configs};
use impugna_tui::{SessionOutcome, TuiOptions};
use impugna_types::{StepConfig, TramiteKind};
use impugna_util::{UserPreferences, default_log_path, expand_tilde, format_file_size};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Exit status for a session interrupted with Ctrl+C.
const INTERRUPTED_EXIT: u8 = 130;

#[derive(Debug, Parser)]
#[command(name = "impugna", version, about = "Registro de impugnaciones ante el INE")]
struct Cli {
    /// Procedure to file: registro, ampliacion or coadyuvante.
    #[arg(long, default_value = "registro")]
    tipo: TramiteKind,

    /// Case file number for amendments and third-party filings.
    #[arg(long)]
    expediente: Option<String>,

    /// Route to open, e.g. /registro-impugnacion/autoridad?tipo=registro.
    #[arg(long)]
    route: Option<String>,

    /// Palette id or alias (dracula, nord, ansi256).
    #[arg(long)]
    theme: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the wizard's step catalog.
    Steps {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Validate a local file the way the wizard's uploader would.
    CheckFile {
        path: String,
        #[arg(long, default_value = "evidencia")]
        profile: UploadProfile,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Yaml,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Some(Command::Steps { format }) => {
            init_tracing(LogTarget::Stderr);
            println!("{}", render_steps(&impugnacion_step_configs(), format)?);
            Ok(ExitCode::SUCCESS)
        }
        Some(Command::CheckFile { path, profile }) => {
            init_tracing(LogTarget::Stderr);
            let accepted = check_file(&expand_tilde(&path), profile)?;
            Ok(if accepted { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        None => {
            init_tracing(LogTarget::File(default_log_path()));
            let options = TuiOptions {
                tramite: cli.tipo,
                expediente: cli.expediente,
                initial_route: cli.route,
                theme: cli.theme,
            };
            run_wizard(options).await
        }
    }
}

enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// `RUST_LOG` filter, `info` by default. The TUI logs to a file so the
/// alternate screen stays clean; when the file cannot be opened, logs are
/// dropped.
fn init_tracing(target: LogTarget) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let _ = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File(path) => match open_log_file(&path) {
            Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
            Err(_) => builder.with_writer(std::io::sink).try_init(),
        },
    };
}

fn open_log_file(path: &Path) -> std::io::Result<fs::File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

async fn run_wizard(options: TuiOptions) -> Result<ExitCode> {
    let preferences = UserPreferences::new().unwrap_or_else(|error| {
        warn!(%error, "preferences unavailable, using an in-memory store");
        UserPreferences::ephemeral()
    });
    info!(tramite = %options.tramite, route = ?options.initial_route, "starting wizard");
    match impugna_tui::run(options, preferences).await? {
        SessionOutcome::Submitted(data) => {
            let json = serde_json::to_string_pretty(&data).context("failed to serialize the collected data")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Abandoned => {
            eprintln!("Registro cancelado.");
            Ok(ExitCode::SUCCESS)
        }
        SessionOutcome::Interrupted => Ok(ExitCode::from(INTERRUPTED_EXIT)),
    }
}

/// Prints the verdict for `path`. Returns whether the file was accepted.
fn check_file(path: &Path, profile: UploadProfile) -> Result<bool> {
    let candidate =
        FileCandidate::inspect_path(path).with_context(|| format!("failed to read {}", path.display()))?;
    let uploader = FileUploader::new(profile.config());
    match uploader.validate(&candidate) {
        Ok(()) => {
            println!(
                "{} ({}) es válido para {}",
                candidate.nombre,
                format_file_size(candidate.tamano),
                profile
            );
            Ok(true)
        }
        Err(rejection) => {
            info!(file = %candidate.nombre, %profile, "file rejected");
            eprintln!("{}: {rejection}", candidate.nombre);
            Ok(false)
        }
    }
}

fn render_steps(configs: &[StepConfig], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(configs).context("failed to serialize steps"),
        OutputFormat::Yaml => serde_yaml::to_string(configs).context("failed to serialize steps"),
        OutputFormat::Table => {
            let id_width = configs.iter().map(|config| config.id.len()).max().unwrap_or(2).max(2);
            let label_width = configs.iter().map(|config| config.label.chars().count()).max().unwrap_or(5).max(5);
            let mut out = format!("#  {:<id_width$}  {:<label_width$}  REQ  DESCRIPTION\n", "ID", "LABEL");
            for (index, config) in configs.iter().enumerate() {
                let required = if config.required { "sí" } else { "no" };
                let label_pad = label_width - config.label.chars().count();
                out.push_str(&format!(
                    "{index}  {:<id_width$}  {}{}  {required:<3}  {}\n",
                    config.id,
                    config.label,
                    " ".repeat(label_pad),
                    config.description
                ));
            }
            Ok(out.trim_end().to_string())
        }
    }
}
