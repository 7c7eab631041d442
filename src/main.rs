use std::env;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coinflip::cli::{self, Command};
use coinflip::collector::collect_total;
use coinflip::console::Console;
use coinflip::progress::{Progress, ProgressReporter};
use coinflip::{AppConfig, Engine, RunReport, Runtime};

const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

fn init_tracing() {
    let use_json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "coinflip=info".into());

    if use_json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}

fn main() {
    init_tracing();

    let mut config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let command = match cli::parse_args(env::args().skip(1), &mut config) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    let total_arg = match command {
        Command::Help => {
            println!("{}", cli::USAGE);
            return;
        }
        Command::Run { total } => total,
    };

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        worker_count = config.engine.worker_count,
        batch_size = config.engine.batch_size,
        aggregation = ?config.engine.aggregation,
        runtime = ?config.runtime,
        "Configuration loaded"
    );

    let mut console = Console::stdio(config.pause, config.color);
    // no-op without color support
    let _ = console.clear_screen();

    match run(&config, &mut console, total_arg) {
        Ok(Some(report)) => {
            if let Err(e) = console.write(&format!("\n{}", report.render(config.color))) {
                tracing::warn!(error = %e, "Failed to write report");
            }
            console.exit(None, 0)
        }
        Ok(None) => console.exit(None, 0),
        Err(e) => {
            tracing::error!(error = %e, "Run failed");
            let _ = console.write_error(&format!("{:#}", e));
            console.exit(None, 1)
        }
    }
}

/// `Ok(None)` when the user asked for zero samples.
fn run<R, W>(
    config: &AppConfig,
    console: &mut Console<R, W>,
    total_arg: Option<u64>,
) -> Result<Option<RunReport>>
where
    R: io::BufRead,
    W: io::Write,
{
    let total = match total_arg {
        Some(total) => total,
        None => collect_total(console, config.engine.unit())?,
    };

    if total == 0 {
        return Ok(None);
    }
    console.write("\n")?;

    let mut engine = Engine::new(config.engine.clone())?;
    let reporter = if config.engine.progress {
        let progress = Arc::new(Progress::new());
        engine = engine.with_progress(Arc::clone(&progress));
        Some(ProgressReporter::spawn(progress, total, PROGRESS_INTERVAL, io::stdout()))
    } else {
        None
    };

    let report = match config.runtime {
        Runtime::Threads => engine.run(total)?,
        Runtime::Tokio => engine.runtime()?.block_on(engine.run_async(total))?,
    };

    if let Some(reporter) = reporter {
        reporter.finish();
        console.write("\n")?;
    }

    Ok(Some(report))
}
