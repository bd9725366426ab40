use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trivia_dash::client::{TriviaApi, TriviaClient};
use trivia_dash::config::AppConfig;
use trivia_dash::normalize::{normalize_matches, normalize_overview, normalize_questions};
use trivia_dash::parse_duration;
use trivia_dash::poll::{Dashboard, PanelState, RefreshReason};
use trivia_dash::poll::{MSG_MATCHES, MSG_OVERVIEW, MSG_QUESTIONS};
use trivia_dash::view;

#[derive(Parser)]
#[command(name = "trivia-dash")]
#[command(about = "Terminal dashboard for a remote trivia backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Override the backend base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll and render the full dashboard continuously
    Watch {
        /// Poll interval (e.g., "15s", "1m"); overrides the config
        #[arg(long)]
        interval: Option<String>,

        /// Render one cycle and exit
        #[arg(long)]
        once: bool,
    },

    /// Fetch and render the overview panel once
    Overview,

    /// Fetch and render the active matches panel once
    Matches,

    /// Fetch and render the questions feed once
    Questions {
        /// Maximum questions to fetch
        #[arg(long)]
        limit: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting trivia-dash v{}", env!("CARGO_PKG_VERSION"));

    let mut config = AppConfig::load_or_default(&cli.config)?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    config.validate()?;

    let client = TriviaClient::new(&config.base_url, &config.client)?;
    let api: Arc<dyn TriviaApi> = Arc::new(client);

    match cli.command {
        Commands::Watch { interval, once } => {
            let mut poll = config.poll.clone();
            if let Some(raw) = interval.as_deref() {
                let parsed = parse_duration(raw)
                    .ok_or_else(|| anyhow::anyhow!("Invalid --interval (expected e.g. \"15s\"): {}", raw))?;
                poll.interval_secs = parsed.as_secs().max(1);
            }

            let mut dashboard = Dashboard::new(api, poll);
            if once {
                dashboard.refresh(RefreshReason::Manual).await;
                print!("{}", view::render_dashboard(&dashboard));
                return Ok(());
            }
            watch_loop(dashboard).await
        }

        Commands::Overview => {
            let mut panel = PanelState::new();
            panel.apply(
                1,
                api.fetch_overview().await.map(normalize_overview),
                MSG_OVERVIEW,
            );
            print!("{}", view::render_overview(&panel));
            Ok(())
        }

        Commands::Matches => {
            let buckets = config.poll.match_buckets;
            let mut panel = PanelState::new();
            panel.apply(
                1,
                api.fetch_active_matches()
                    .await
                    .map(|raw| normalize_matches(raw, chrono::Utc::now(), buckets)),
                MSG_MATCHES,
            );
            print!("{}", view::render_matches(&panel));
            Ok(())
        }

        Commands::Questions { limit } => {
            let limit = limit.or(Some(config.poll.question_limit));
            let mut panel = PanelState::new();
            panel.apply(
                1,
                api.fetch_questions(limit).await.map(normalize_questions),
                MSG_QUESTIONS,
            );
            print!("{}", view::render_questions(&panel));
            Ok(())
        }
    }
}

/// Continuous dashboard loop. Cycles run on the interval timer, on Enter
/// (manual refresh), and on the terminal's window-change signal (the
/// closest analogue of a browser tab regaining visibility). Ctrl-c exits;
/// an in-flight request is left to finish and its result discarded.
async fn watch_loop(mut dashboard: Dashboard) -> Result<()> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    // Manual refresh: any line on stdin.
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(_)) = lines.next_line().await {
                if tx.send(RefreshReason::Manual).is_err() {
                    break;
                }
            }
        });
    }

    #[cfg(unix)]
    {
        let tx = tx.clone();
        tokio::spawn(async move {
            use tokio::signal::unix::{signal, SignalKind};
            let Ok(mut winch) = signal(SignalKind::window_change()) else {
                return;
            };
            while winch.recv().await.is_some() {
                if tx.send(RefreshReason::Resume).is_err() {
                    break;
                }
            }
        });
    }

    let mut ticker = tokio::time::interval(dashboard.interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        // The first tick fires immediately, covering the initial load.
        let reason = tokio::select! {
            _ = ticker.tick() => RefreshReason::Interval,
            Some(reason) = rx.recv() => reason,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                return Ok(());
            }
        };

        if dashboard.refresh(reason).await {
            redraw(&dashboard);
        }
    }
}

/// Clear the screen, home the cursor, and print the current dashboard.
fn redraw(dashboard: &Dashboard) {
    print!("\x1b[2J\x1b[H{}", view::render_dashboard(dashboard));
    let _ = std::io::stdout().flush();
}
