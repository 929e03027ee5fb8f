use std::ffi::OsString;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use onvif_api::SoapClient;
use onvif_events::{
    connect, logging, logging::LoggingError, JsonLinesSink, LogSink, PollerError, ShutdownSignal,
    SubscriptionPoller,
};
use tracing::debug;

mod cli;

use cli::{Cli, Command, Settings};

/// How a run ended, as seen by the shell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

fn main() -> ExitCode {
    let sink = JsonLinesSink::stdout();

    let shutdown = ShutdownSignal::new();
    let handler = shutdown.clone();
    if let Err(e) = ctrlc::set_handler(move || handler.trigger()) {
        sink.error(&format!("Fatal error: Failed to install interrupt handler: {}", e), None);
        return ExitCode::FAILURE;
    }

    execute(std::env::args_os(), &sink, &shutdown, |key| std::env::var(key).ok()).into()
}

/// Parse the command line, run it, and map the result to an exit status
///
/// Every fatal failure produces exactly one `Fatal error: ...` record,
/// except a failed renewal, which the poller has already reported. A
/// failure that happens after `shutdown` was triggered is an interrupted
/// run and ends successfully without a record.
fn execute<I, T, L, F>(args: I, sink: &L, shutdown: &ShutdownSignal, env: F) -> Outcome
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    L: LogSink + ?Sized,
    F: Fn(&str) -> Option<String>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            // Help and version are not failures
            let _ = e.print();
            return Outcome::Success;
        }
        Err(e) => {
            sink.error(&format!("Fatal error: {}", usage_error(&e)), None);
            return Outcome::Failure;
        }
    };

    match run(cli, sink, shutdown, env) {
        Ok(()) => Outcome::Success,
        Err(e) if shutdown.is_triggered() => {
            debug!("run interrupted: {:#}", e);
            Outcome::Success
        }
        Err(e) => {
            if !already_reported(&e) {
                sink.error(&format!("Fatal error: {:#}", e), None);
            }
            Outcome::Failure
        }
    }
}

/// Connect, subscribe and poll until interrupted
fn run<L, F>(cli: Cli, sink: &L, shutdown: &ShutdownSignal, env: F) -> Result<()>
where
    L: LogSink + ?Sized,
    F: Fn(&str) -> Option<String>,
{
    let Command::Subscribe { config, options } = cli.command;
    let settings = Settings::resolve(&config, options, env)?;

    let level = settings.log_level.as_deref();
    match logging::init_logging_with_filter(logging::mode_for_level(level), level) {
        // A subscriber installed earlier keeps receiving diagnostics
        Ok(()) | Err(LoggingError::TracingInit(_)) => {}
        Err(e) => return Err(e).context("Failed to initialize diagnostics"),
    }
    debug!(?settings, "resolved settings");

    if shutdown.is_triggered() {
        return Ok(());
    }

    let session = connect(&settings.credentials, SoapClient::new(), sink)
        .context("Failed to connect to device")?;

    let mut poller =
        SubscriptionPoller::new(session, sink, settings.poller).with_shutdown(shutdown.clone());
    poller.run()?;

    Ok(())
}

/// A failed renewal is logged by the poller itself
fn already_reported(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<PollerError>(), Some(PollerError::Renewal(_)))
}

/// First line of a clap error without its `error:` prefix
fn usage_error(error: &clap::Error) -> String {
    let rendered = error.to_string();
    let line = rendered.lines().next().unwrap_or_default().trim();
    line.strip_prefix("error:").unwrap_or(line).trim().to_string()
}
