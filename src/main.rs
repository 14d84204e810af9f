#![allow(clippy::missing_errors_doc)] // Internal functions don't need # Errors docs
#![allow(clippy::module_name_repetitions)] // e.g., NotificationObject in notification module is fine
#![allow(clippy::must_use_candidate)] // Not all getters need #[must_use]

//! Herald - desktop notification agent
//!
//! One binary, three triggers, one reply. A notification request arrives as
//! command-line flags, a custom-scheme deep link or a push payload, is
//! normalized into one validated object, presented, and answered with a
//! single JSON reply on stdout plus a matching process exit code.
//!
//! Usage:
//!   herald --type popup --title "Hello"      # CLI trigger
//!   herald url "herald://shownotification?type=popup&title=Hello&token=..."
//!   echo '{"type":"banner","title":"Hi"}' | herald push

mod cli;
mod config;
mod deeplink;
mod dispatch;
mod errors;
mod event;
mod notification;
mod notify;
mod progress;
mod reply;
mod router;
mod token;

use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::Result;
use std::io::BufRead;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use config::HeraldConfig;
use errors::CliError;
use event::Event;
use notify::DesktopPresenter;
use reply::ExitReason;
use router::TriggerRouter;

/// Get the log directory path
fn get_log_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(
        || PathBuf::from("/tmp/herald/logs"),
        |dirs| dirs.cache_dir().join("herald").join("logs"),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        cli::print_completions(*shell);
        return Ok(());
    }

    color_eyre::install()?;

    // Logs go to file only: stdout is the reply channel and must carry
    // nothing but the final JSON payload.
    let log_dir = get_log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "herald.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let log_filter = format!("herald={}", cli.log_level);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&log_filter))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(non_blocking),
        )
        .init();

    tracing::info!("Starting herald v{}", env!("CARGO_PKG_VERSION"));

    let config = cli
        .config
        .clone()
        .map_or_else(HeraldConfig::load, HeraldConfig::load_from_path);

    let exit = run(cli, config).await;
    tracing::info!(code = exit.code(), "Herald will terminate");
    std::process::exit(exit.code());
}

/// Wire the router, fire the requested trigger and dispatch to a reply
async fn run(cli: Cli, config: HeraldConfig) -> ExitReason {
    let (tx, mut rx) = mpsc::channel(config::EVENT_CHANNEL_CAPACITY);
    let cancel = CancellationToken::new();

    // One-time setup: start the interactive stdin listener. Runs inside the
    // router's configure latch, so racing triggers start it exactly once.
    let listener_tx = tx.clone();
    let listener_cancel = cancel.clone();
    let router = TriggerRouter::new(
        &config,
        tx.clone(),
        Box::new(move || {
            let tx = listener_tx.clone();
            let cancel = listener_cancel.clone();
            tokio::spawn(async move {
                event::listen_stdin(tx, cancel).await;
            });
        }),
    );

    // SIGINT maps to a dedicated exit reason
    let sigint_tx = tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = sigint_tx.send(Event::Interrupt).await;
        }
    });

    let triggered = match &cli.command {
        Some(Commands::Url { url }) => router.trigger_url(url),
        Some(Commands::Push { payload }) => match read_push_payload(payload.as_deref()) {
            Ok(payload) => router.trigger_push(&payload),
            Err(e) => Err(e),
        },
        Some(Commands::Completions { .. }) => unreachable!("handled before setup"),
        None => {
            if cli.notification.is_empty() {
                tracing::error!("No notification arguments supplied");
                Err(CliError::InvalidArgumentsSyntax.into())
            } else {
                router.trigger_cli(&cli.notification.to_params())
            }
        }
    };

    if let Err(e) = triggered {
        // The failed trigger was the sole reason to run: exit with its reason
        tracing::error!(error = %e, "Trigger failed, no UI will be shown");
        return e.exit_reason();
    }

    let presenter = DesktopPresenter::new(config.presentation.clone());
    loop {
        match rx.recv().await {
            Some(Event::ShowNotification(object)) => {
                let exit = dispatch::run(&object, &presenter, &mut rx, &config.presentation).await;
                cancel.cancel();
                return exit;
            }
            Some(Event::Interrupt) => return ExitReason::ReceivedSigInt,
            // Stray stdin lines before a surface exists
            Some(_) => {}
            None => return ExitReason::UntimelyExit,
        }
    }
}

/// Take the push payload from the argument or the first line of stdin
///
/// Must run before the interactive stdin listener starts, which the router
/// guarantees: the listener is spawned by the configure latch inside
/// `trigger_push`.
fn read_push_payload(inline: Option<&str>) -> errors::Result<String> {
    if let Some(payload) = inline {
        return Ok(payload.to_string());
    }
    let mut line = String::new();
    match std::io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => {
            tracing::error!("No push payload on stdin");
            Err(CliError::InvalidArgumentsSyntax.into())
        }
        Ok(_) => Ok(line),
    }
}
