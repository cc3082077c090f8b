//! input-humanizer - Humanized Input Dry Run
//!
//! Entry point for the command-line binary. Performs one humanized action
//! against an in-memory device and prints the timed event trace.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use input_humanizer::config::HumanizerConfig;
use input_humanizer::input::{
    recovery_action, KeyCode, MouseButton, Point, RecordingBackend, RecoveryAction,
};
use input_humanizer::{InputHumanizer, InputSession};

/// Command-line arguments for input-humanizer
#[derive(Parser, Debug)]
#[command(name = "input-humanizer")]
#[command(version, about = "Humanized mouse and keyboard input (dry run)", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "INPUT_HUMANIZER_CONFIG")]
    pub config: Option<String>,

    /// Owner identity used for the input lock
    #[arg(short, long, default_value = "cli")]
    pub owner: String,

    /// How long to wait for the input lock (ms)
    #[arg(long, default_value_t = 1000)]
    pub wait_ms: u64,

    /// Cursor start position
    #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
    pub from: Option<Vec<f64>>,

    /// Seed for reproducible delays and paths
    #[arg(long)]
    pub seed: Option<u64>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long, default_value = "pretty")]
    pub log_format: String,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<String>,

    /// Action to perform
    #[command(subcommand)]
    pub command: Command,
}

/// Humanized actions
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move the cursor to X Y
    Move {
        /// Target X
        #[arg(allow_negative_numbers = true)]
        x: f64,
        /// Target Y
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Click a mouse button
    Click {
        /// Button (left|right|middle|extra1|extra2)
        #[arg(long, default_value = "left")]
        button: MouseButton,
        /// Move here before clicking
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        at: Option<Vec<f64>>,
    },

    /// Turn the scroll wheel
    Scroll {
        /// Scroll backward instead of forward
        #[arg(long)]
        backward: bool,
        /// Wheel detents
        #[arg(long, default_value_t = 1)]
        clicks: u32,
        /// Move here before scrolling
        #[arg(long, num_args = 2, value_names = ["X", "Y"], allow_negative_numbers = true)]
        at: Option<Vec<f64>>,
    },

    /// Press and release a key
    Tap {
        /// Key name or evdev code
        key: KeyCode,
        /// Release without honouring the hold time
        #[arg(long)]
        immediate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = init_logging(&args)?;

    info!("════════════════════════════════════════════════════════");
    info!("  input-humanizer v{}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {} {}", env!("BUILD_DATE"), env!("BUILD_TIME"));
    info!("  Commit: {}", env!("GIT_HASH"));
    info!("  Profile: {}", if cfg!(debug_assertions) { "debug" } else { "release" });
    info!("════════════════════════════════════════════════════════");

    let config = match &args.config {
        Some(path) => HumanizerConfig::load(path).unwrap_or_else(|e| {
            warn!("Failed to load config: {:#}, using defaults", e);
            HumanizerConfig::default()
        }),
        None => HumanizerConfig::default(),
    };
    debug!("Config: {:?}", config);

    let start = args.from.as_deref().map(to_point).unwrap_or_default();
    let backend = Arc::new(RecordingBackend::with_position(start));
    let humanizer = InputHumanizer::new(backend.clone(), config)?;

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling in-flight action");
                cancel.cancel();
            }
        });
    }

    let outcome = run(&humanizer, &args, &cancel).await;

    println!("{}", serde_json::to_string_pretty(&backend.events())?);

    if let Err(e) = outcome {
        eprintln!("{}", input_humanizer::utils::format_user_error(&e));
        return Err(e);
    }

    info!("Final cursor position {}", backend.position());
    Ok(())
}

async fn run(humanizer: &InputHumanizer, args: &Args, cancel: &CancellationToken) -> Result<()> {
    let manager = humanizer.manager();
    if !manager.config().enabled {
        anyhow::bail!("input humanizer is disabled in the config (enabled = false)");
    }

    let wait = Duration::from_millis(args.wait_ms);
    let mut session = manager.acquire(args.owner.as_str(), wait, cancel).await?;
    if let Some(seed) = args.seed {
        session.reseed(seed);
    }

    let result = perform(&mut session, &args.command, cancel).await;
    if let Err(err) = &result {
        if recovery_action(err) == RecoveryAction::ReleaseHeldKeys {
            // The cancel token already fired; the compensating key-up must not wait on it
            for key in session.held_keys() {
                warn!("Releasing {} left down by the interrupted action", key);
                session.key_up(key, true, &CancellationToken::new()).await.ok();
            }
        }
    }
    session.release();
    Ok(result?)
}

async fn perform(
    session: &mut InputSession,
    command: &Command,
    cancel: &CancellationToken,
) -> input_humanizer::input::Result<()> {
    match command {
        Command::Move { x, y } => session.move_mouse(Point::new(*x, *y), cancel).await?,
        Command::Click { button, at } => {
            let at = at.as_deref().map(to_point);
            session.click(*button, at, cancel).await?
        }
        Command::Scroll {
            backward,
            clicks,
            at,
        } => {
            let at = at.as_deref().map(to_point);
            session
                .vertical_scroll(!*backward, *clicks, at, cancel)
                .await?
        }
        Command::Tap { key, immediate } => {
            session.key_down(*key, cancel).await?;
            session.key_up(*key, *immediate, cancel).await?
        }
    }
    Ok(())
}

// clap enforces exactly two values
fn to_point(values: &[f64]) -> Point {
    Point::new(values[0], values[1])
}

fn init_logging(args: &Args) -> Result<Option<WorkerGuard>> {
    use std::fs::File;

    let log_level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "input_humanizer={level},warn",
            level = log_level
        ))
    });

    // Stdout carries the event timeline, so logs go to stderr
    if let Some(log_file_path) = &args.log_file {
        let file = File::create(log_file_path)?;
        let (file_writer, guard) = tracing_appender::non_blocking(file);

        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file_writer)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file_writer)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file_writer)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path);
        Ok(Some(guard))
    } else {
        match args.log_format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
        }
        Ok(None)
    }
}
