// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use std::time::Duration;
use tokio::select;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tower::BoxError;
use tracing::metadata::LevelFilter;
use tracing::{error, info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use probewatch::bounded_channel::bounded;
use probewatch::init::args::MonitorRun;
use probewatch::init::wait;
use probewatch::receivers::siglog::event::ProbeEvent;
use probewatch::receivers::siglog::receiver::SigLogReceiver;

const SENDING_QUEUE_SIZE: usize = 1_000;

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Run monitor
    Start(Box<MonitorRun>),

    /// Return version
    Version,
}

#[derive(Debug, Parser)]
#[command(name = "probewatch")]
#[command(bin_name = "probewatch")]
#[command(version, about, long_about = None)]
#[command(subcommand_required = true)]
struct Arguments {
    #[arg(
        value_enum,
        long,
        global = true,
        env = "PROBEWATCH_LOG_FORMAT",
        default_value = "text"
    )]
    /// Log format
    log_format: LogFormatArg,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, ValueEnum)]
pub enum LogFormatArg {
    Text,
    Json,
}

fn main() -> ExitCode {
    let opt = Arguments::parse();

    match opt.command {
        Some(Commands::Version) => {
            println!("{}", env!("CARGO_PKG_VERSION"))
        }
        Some(Commands::Start(run)) => {
            let _guard = match setup_logging(&opt.log_format) {
                Ok(guard) => guard,
                Err(e) => {
                    eprintln!("ERROR: failed to setup logging: {}", e);
                    return ExitCode::from(1);
                }
            };

            match run_monitor(run) {
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "Failed to run monitor.");
                    return ExitCode::from(1);
                }
            }
        }
        _ => {
            // it shouldn't be possible to get here since we mark a subcommand as
            // required
            error!("Must specify a command");
            return ExitCode::from(2);
        }
    }

    ExitCode::SUCCESS
}

#[tokio::main]
async fn run_monitor(run: Box<MonitorRun>) -> Result<(), BoxError> {
    let mut task_set: JoinSet<Result<(), BoxError>> = JoinSet::new();
    let cancel_token = CancellationToken::new();

    let (events_tx, events_rx) = bounded::<ProbeEvent>(SENDING_QUEUE_SIZE);

    let receiver = SigLogReceiver::new(run.siglog_receiver.build_config(), events_tx)?;
    receiver.start(&mut task_set, &cancel_token);

    run.events_exporter
        .build_exporter(events_rx)
        .start(&mut task_set, &cancel_token);

    loop {
        select! {
            _ = signal_wait() => {
                info!("Shutdown signal received.");
                cancel_token.cancel();
                break;
            },
            e = wait::wait_for_any_task(&mut task_set) => {
                match e {
                    Ok(()) => warn!("Unexpected early exit of monitor task."),
                    Err(e) => return Err(e),
                }
                break;
            },
        }
    }

    // Wait for tasks to complete; shutdown paths inside the tasks enforce
    // lower timeouts.
    wait::wait_for_tasks_with_timeout(&mut task_set, Duration::from_secs(10)).await?;

    Ok(())
}

type LoggerGuard = tracing_appender::non_blocking::WorkerGuard;

fn setup_logging(log_format: &LogFormatArg) -> Result<LoggerGuard, BoxError> {
    LogTracer::init().expect("Unable to setup log tracer!");

    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stdout());

    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env()?;

    if *log_format == LogFormatArg::Json {
        let app_name = format!("{}-{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);

        let subscriber = Registry::default()
            .with(filter)
            .with(JsonStorageLayer)
            .with(bunyan_formatting_layer);
        tracing::subscriber::set_global_default(subscriber).unwrap();
    } else {
        use std::io;
        use std::io::IsTerminal;

        // Skip color codes when not in a terminal
        let use_ansi = io::stdout().is_terminal();

        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_target(false)
            .with_level(true)
            .with_ansi(use_ansi)
            .compact();

        let subscriber = Registry::default().with(filter).with(file_layer);
        tracing::subscriber::set_global_default(subscriber).unwrap();
    }
    Ok(guard)
}

async fn signal_wait() {
    let mut sig_term = sig(SignalKind::terminate());
    let mut sig_int = sig(SignalKind::interrupt());

    select! {
        _ = sig_term.recv() => {},
        _ = sig_int.recv() => {},
    }
}

fn sig(kind: SignalKind) -> tokio::signal::unix::Signal {
    signal(kind).unwrap()
}
