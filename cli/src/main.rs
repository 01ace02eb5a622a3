use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use portal::api::{JobStatus, PaymentStatus};
use portal::branding::HeadDocument;
use portal::navigation::HistoryNavigator;
use portal::storage::{FileStorage, MemoryStorage, StorageError};
use portal::{ClientConfig, ClientError, Portal, SessionContext};
use segments::{Segment, SegmentError, ValidationError};
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("segment document: {0}")]
    Segment(#[from] SegmentError),
    #[error("invalid segment: {0}")]
    Invalid(#[from] ValidationError),
    #[error("session state: {0}")]
    Storage(#[from] StorageError),
    #[error("{path}: {source}")]
    File { path: PathBuf, source: std::io::Error },
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("screenshot service returned {status}: {message}")]
    Screenshot { status: u16, message: String },
    #[error("segment has no id; pass --id")]
    MissingSegmentId,
    #[error("export {id} failed: {reason}")]
    ExportFailed { id: String, reason: String },
    #[error("payment {0} failed")]
    PaymentFailed(String),
}

#[derive(Parser, Debug)]
#[command(name = "portalctl", about = "Email portal API and screenshot service CLI")]
struct Cli {
    #[arg(long, env = "PORTAL_BASE_URL", default_value = "http://127.0.0.1:8080")]
    base_url: String,

    #[arg(long, env = "PORTAL_STATE_FILE", default_value = ".portal-session.json")]
    state_file: PathBuf,

    /// Act as this account for this invocation only.
    #[arg(long, env = "PORTAL_IMPERSONATE")]
    impersonate: Option<String>,

    #[arg(long, env = "SCREENSHOT_URL", default_value = "http://127.0.0.1:3000")]
    screenshot_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login(LoginArgs),
    Logout,
    Whoami,
    Segment(SegmentCommand),
    Export(ExportCommand),
    Payment(PaymentCommand),
    Branding(BrandingCommand),
    Screenshot(ScreenshotArgs),
    /// Check the screenshot service health endpoint.
    Ping,
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long, env = "PORTAL_USERNAME")]
    username: String,
    #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
    password: String,
}

#[derive(Args, Debug)]
struct SegmentCommand {
    #[command(subcommand)]
    command: SegmentSubcommand,
}

#[derive(Subcommand, Debug)]
enum SegmentSubcommand {
    /// Check a segment document offline; exit status reflects validity.
    Validate { file: PathBuf },
    List,
    Get { id: String },
    Create { file: PathBuf },
    Update {
        file: PathBuf,
        #[arg(long)]
        id: Option<String>,
    },
    Delete { id: String },
}

#[derive(Args, Debug)]
struct ExportCommand {
    #[command(subcommand)]
    command: ExportSubcommand,
}

#[derive(Subcommand, Debug)]
enum ExportSubcommand {
    Create {
        #[arg(long = "list")]
        list_id: String,
        /// Poll until the export finishes.
        #[arg(long, default_value_t = false)]
        wait: bool,
    },
    Get { id: String },
}

#[derive(Args, Debug)]
struct PaymentCommand {
    #[command(subcommand)]
    command: PaymentSubcommand,
}

#[derive(Subcommand, Debug)]
enum PaymentSubcommand {
    Get { id: String },
    /// Poll until the payment settles (30 attempts, 5 s apart).
    Wait { id: String },
}

#[derive(Args, Debug)]
struct BrandingCommand {
    #[command(subcommand)]
    command: BrandingSubcommand,
}

#[derive(Subcommand, Debug)]
enum BrandingSubcommand {
    Show,
}

#[derive(Args, Debug)]
struct ScreenshotArgs {
    #[arg(long)]
    url: String,
    #[arg(long)]
    out: PathBuf,
    #[arg(long, default_value_t = false)]
    mobile: bool,
    #[arg(long)]
    width: Option<u32>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let message = match &e {
                CliError::Client(client) => client.notice(),
                other => other.to_string(),
            };
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli { base_url, state_file, impersonate, screenshot_url, command } = cli;
    let portal = || open_portal(&base_url, &state_file, impersonate.as_deref());
    match command {
        Command::Login(args) => {
            let branding = portal()?.login(&args.username, &args.password).await?;
            println!("logged in as {}", args.username);
            if let Some(css) = branding.stylesheet() {
                println!("tenant stylesheet: {} bytes", css.len());
            }
            Ok(())
        }
        Command::Logout => {
            portal()?.logout()?;
            println!("logged out");
            Ok(())
        }
        Command::Whoami => {
            println!("{}", whoami_line(portal()?.session()));
            Ok(())
        }
        Command::Segment(segment) => run_segment(portal, segment.command).await,
        Command::Export(export) => run_export(&portal()?, export.command).await,
        Command::Payment(payment) => run_payment(&portal()?, payment.command).await,
        Command::Branding(BrandingCommand { command: BrandingSubcommand::Show }) => {
            let branding = portal()?.branding().apply().await;
            print_json(&serde_json::to_value(branding)?)
        }
        Command::Screenshot(args) => run_screenshot(&screenshot_url, &args).await,
        Command::Ping => run_ping(&screenshot_url).await,
    }
}

/// Durable identity lives in the state file; impersonation only lasts for
/// this process.
fn open_portal(base_url: &str, state_file: &Path, impersonate: Option<&str>) -> Result<Portal, CliError> {
    let durable = Arc::new(FileStorage::open(state_file)?);
    let session = Arc::new(SessionContext::new(durable, Arc::new(MemoryStorage::new())));
    if let Some(account) = impersonate {
        session.impersonate(account)?;
    }
    let config = ClientConfig::from_env().with_base_url(base_url);
    Ok(Portal::new(
        &config,
        session,
        Arc::new(HeadDocument::new()),
        Arc::new(HistoryNavigator::new()),
    )?)
}

/// `validate` runs offline; every other subcommand opens the portal first.
async fn run_segment<F>(portal: F, command: SegmentSubcommand) -> Result<(), CliError>
where
    F: Fn() -> Result<Portal, CliError>,
{
    let segments = || portal().map(|portal| portal.segments());
    match command {
        SegmentSubcommand::Validate { file } => {
            let segment = validate_file(&file)?;
            println!("valid: {segment}");
            Ok(())
        }
        SegmentSubcommand::List => {
            for segment in segments()?.list().await? {
                println!("{}\t{}", segment.id.as_deref().unwrap_or("-"), segment);
            }
            Ok(())
        }
        SegmentSubcommand::Get { id } => print_json(&serde_json::to_value(segments()?.get(&id).await?)?),
        SegmentSubcommand::Create { file } => {
            let segment = read_segment(&file)?;
            print_json(&serde_json::to_value(segments()?.create(&segment).await?)?)
        }
        SegmentSubcommand::Update { file, id } => {
            let segment = with_id(read_segment(&file)?, id)?;
            print_json(&serde_json::to_value(segments()?.update(&segment).await?)?)
        }
        SegmentSubcommand::Delete { id } => {
            segments()?.delete(&id).await?;
            println!("deleted {id}");
            Ok(())
        }
    }
}

async fn run_export(portal: &Portal, command: ExportSubcommand) -> Result<(), CliError> {
    let exports = portal.exports();
    match command {
        ExportSubcommand::Create { list_id, wait } => {
            let export = exports.create(&list_id).await?;
            if !wait {
                return print_json(&serde_json::to_value(export)?);
            }
            eprintln!("export {} started; waiting...", export.id);
            let export = exports.wait(&export.id).await?;
            if export.status == JobStatus::Error {
                return Err(CliError::ExportFailed {
                    id: export.id,
                    reason: export.error.unwrap_or_else(|| "unknown error".to_owned()),
                });
            }
            print_json(&serde_json::to_value(export)?)
        }
        ExportSubcommand::Get { id } => print_json(&serde_json::to_value(exports.get(&id).await?)?),
    }
}

async fn run_payment(portal: &Portal, command: PaymentSubcommand) -> Result<(), CliError> {
    let billing = portal.billing();
    match command {
        PaymentSubcommand::Get { id } => print_json(&serde_json::to_value(billing.payment(&id).await?)?),
        PaymentSubcommand::Wait { id } => {
            let payment = billing.wait(&id).await?;
            if payment.status == PaymentStatus::Failed {
                return Err(CliError::PaymentFailed(payment.id));
            }
            print_json(&serde_json::to_value(payment)?)
        }
    }
}

async fn run_screenshot(service_url: &str, args: &ScreenshotArgs) -> Result<(), CliError> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(120)).build()?;
    let response = client
        .post(service_root(service_url))
        .json(&screenshot_body(args))
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CliError::Screenshot { status: status.as_u16(), message });
    }
    let png = response.bytes().await?;
    tokio::fs::write(&args.out, &png)
        .await
        .map_err(|source| CliError::File { path: args.out.clone(), source })?;
    println!("wrote {} bytes to {}", png.len(), args.out.display());
    Ok(())
}

async fn run_ping(service_url: &str) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(health_url(service_url)).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::Screenshot { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

// =============================================================================
// HELPERS
// =============================================================================

fn read_segment(path: &Path) -> Result<Segment, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::File { path: path.to_owned(), source })?;
    Ok(Segment::from_json(&text)?)
}

fn validate_file(path: &Path) -> Result<Segment, CliError> {
    let segment = read_segment(path)?;
    segments::validate(&segment)?;
    if let Some(subset) = &segment.subset {
        subset.check()?;
    }
    Ok(segment)
}

/// Apply an explicit `--id`, or require one in the document.
fn with_id(mut segment: Segment, id: Option<String>) -> Result<Segment, CliError> {
    if let Some(id) = id {
        segment.id = Some(id);
    }
    if segment.id.as_deref().is_none_or(str::is_empty) {
        return Err(CliError::MissingSegmentId);
    }
    Ok(segment)
}

fn whoami_line(session: &SessionContext) -> String {
    match session.credentials() {
        None => "not logged in".to_owned(),
        Some(credentials) => match credentials.impersonate {
            Some(account) => format!("{} (impersonating {account})", credentials.uid),
            None => credentials.uid,
        },
    }
}

fn screenshot_body(args: &ScreenshotArgs) -> Value {
    let mut body = json!({ "url": args.url, "mobile": args.mobile });
    if let Some(width) = args.width {
        body["width"] = json!(width);
    }
    body
}

fn service_root(service_url: &str) -> String {
    format!("{}/", service_url.trim_end_matches('/'))
}

fn health_url(service_url: &str) -> String {
    format!("{}/healthz", service_url.trim_end_matches('/'))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
