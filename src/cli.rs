use crate::collector::parse_total;
use crate::config::{Aggregation, AppConfig, Runtime};
use crate::error::{EngineError, Result};

pub const USAGE: &str = "\
Usage: coinflip [TOTAL] [options]
  TOTAL            sample count, a multiple of workers x batch size (prompted if omitted)
  --workers N      worker threads (default 32)
  --batch N        batch size (default 5000)
  --locked         combine results under a mutex instead of atomic adds
  --async          run workers on the tokio blocking pool
  --progress       print per-batch progress while running
  --no-pause       do not wait for Enter before exiting
  --no-color       disable ANSI colors
  -h, --help       show this message";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run with the validated total from the command line, if one was given.
    Run { total: Option<u64> },
    Help,
}

/// Apply command-line flags on top of `config`; flags win over environment.
pub fn parse_args<I>(args: I, config: &mut AppConfig) -> Result<Command>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut total = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "--workers" => config.engine.worker_count = flag_value(&mut args, "--workers")?,
            "--batch" => config.engine.batch_size = flag_value(&mut args, "--batch")?,
            "--locked" => config.engine.aggregation = Aggregation::Locked,
            "--async" => config.runtime = Runtime::Tokio,
            "--progress" => config.engine.progress = true,
            "--no-pause" => config.pause = false,
            "--no-color" => config.color = false,
            flag if flag.starts_with('-') => {
                return Err(EngineError::InvalidConfig(format!("unknown option '{}'", flag)))
            }
            _ if total.is_some() => {
                return Err(EngineError::InvalidConfig(format!(
                    "unexpected argument '{}'",
                    arg
                )))
            }
            _ => total = Some(arg),
        }
    }

    config.engine.validate()?;

    let unit = config.engine.unit();
    let total = total
        .map(|raw| {
            parse_total(&raw, unit)
                .map_err(|e| EngineError::InvalidConfig(format!("TOTAL '{}': {}", raw, e)))
        })
        .transpose()?;

    Ok(Command::Run { total })
}

fn flag_value<I, T>(args: &mut I, flag: &str) -> Result<T>
where
    I: Iterator<Item = String>,
    T: std::str::FromStr,
{
    let raw = args
        .next()
        .ok_or_else(|| EngineError::InvalidConfig(format!("{} requires a value", flag)))?;
    raw.parse().map_err(|_| {
        EngineError::InvalidConfig(format!("{} expects a number, got '{}'", flag, raw))
    })
}
