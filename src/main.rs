use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use tracing::{error, info};

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::RulesLoader;
use payroll_engine::logging::init_logger;
use payroll_engine::models::{AttendanceSheet, CorrectionTicket, TicketPayload, write_payroll_csv};
use payroll_engine::pipeline::{BatchSession, BatchStatus};

const DEFAULT_BIND: &str = "127.0.0.1:3000";
const DEFAULT_SESSION_TTL_MINUTES: u64 = 24 * 60;
const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Attendance reconciliation and payroll engine.
#[derive(Debug, Parser)]
#[command(name = "payroll-engine", version, about)]
struct Cli {
    /// Configuration directory holding rules.yaml and holidays.yaml
    #[arg(short, long, default_value = "config/default", global = true)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (the default)
    Serve {
        /// Address to listen on
        #[arg(short, long, default_value = DEFAULT_BIND)]
        bind: String,

        /// Minutes a batch may sit untouched before it is discarded
        #[arg(long, default_value_t = DEFAULT_SESSION_TTL_MINUTES)]
        session_ttl_minutes: u64,
    },
    /// Compute payroll for a CSV sheet that needs no operator review
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Attendance sheet in CSV
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the payroll CSV; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Hourly rate; the configured default when omitted
    #[arg(short, long)]
    rate: Option<Decimal>,

    /// Extra holiday date (YYYY-MM-DD), may be repeated
    #[arg(long = "holiday")]
    holidays: Vec<NaiveDate>,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let loader = match RulesLoader::load(&cli.config) {
        Ok(loader) => loader,
        Err(err) => {
            error!(error = %err, "Failed to load configuration");
            eprintln!("❌ {}", err);
            return Ok(ExitCode::FAILURE);
        }
    };

    let command = cli.command.unwrap_or(Command::Serve {
        bind: DEFAULT_BIND.to_string(),
        session_ttl_minutes: DEFAULT_SESSION_TTL_MINUTES,
    });

    match command {
        Command::Serve {
            bind,
            session_ttl_minutes,
        } => {
            let ttl = Duration::from_secs(session_ttl_minutes.saturating_mul(60));
            let state = AppState::with_session_ttl(loader, ttl);

            let sweeper = state.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(EVICTION_INTERVAL);
                loop {
                    interval.tick().await;
                    sweeper.sessions().evict_idle();
                }
            });

            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!(bind = %bind, session_ttl_minutes, "Payroll engine listening");
            axum::serve(listener, create_router(state)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Run(args) => run_batch(&loader, args),
    }
}

/// Runs one sheet end to end. Exits with status 2 when review is needed.
fn run_batch(loader: &RulesLoader, args: RunArgs) -> Result<ExitCode, Box<dyn Error>> {
    let sheet = AttendanceSheet::from_csv_reader(File::open(&args.input)?)?;
    let rate = args.rate.unwrap_or(loader.rules().default_hourly_rate);
    let mut holidays = loader.holidays().clone();
    holidays.extend(args.holidays);

    let mut session = BatchSession::start(&sheet, rate, holidays)?;
    for failure in &session.ingestion_failures {
        eprintln!("line {}: {}", failure.line(), failure.message);
    }

    match session.advance(loader.rules()) {
        BatchStatus::Pending { stage, tickets } => {
            eprintln!(
                "{} punch(es) need review before payroll can run ({:?}):",
                tickets.len(),
                stage
            );
            for ticket in &tickets {
                eprintln!(
                    "  {} {} {}: {}",
                    ticket.punch,
                    ticket.employee,
                    ticket.date,
                    describe(ticket)
                );
            }
            Ok(ExitCode::from(2))
        }
        BatchStatus::Completed { report } => {
            match &args.output {
                Some(path) => write_payroll_csv(File::create(path)?, &report.rows)?,
                None => write_payroll_csv(std::io::stdout().lock(), &report.rows)?,
            }
            for failure in &report.failures {
                eprintln!("line {}: {}", failure.line(), failure.message);
            }
            info!(
                rows = report.rows.len(),
                total_pay = %report.totals.total_pay,
                "Payroll written"
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn describe(ticket: &CorrectionTicket) -> String {
    match &ticket.payload {
        TicketPayload::Incomplete(payload) => format!(
            "{} missing, recorded time {}",
            payload.missing_field, payload.known_time
        ),
        TicketPayload::Ambiguous(payload) => payload.reason.clone(),
    }
}
