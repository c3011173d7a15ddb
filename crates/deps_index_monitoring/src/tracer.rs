//! This module configures `tracing_subscriber` to write to a log file and optionally standard output.
use std::collections::HashSet;

use anyhow::anyhow;
use serde::Deserialize;
use serde::Serialize;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

use crate::from_env::optional_var;
use crate::from_env::FromEnvError;

pub const TRACING_MODE_VAR: &str = "DEPS_INDEX_TRACING_MODE";

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "mode")]
pub enum TracerMode {
  /// Output the tracer logs to stdout
  Stdout,
}

impl TracerMode {
  /// Parses a comma separated list such as `stdout,file`
  ///
  /// `file` is accepted but adds nothing since the log file is always written.
  pub fn parse_list(value: &str) -> Result<Vec<Self>, FromEnvError> {
    let mut tracer_modes = vec![];
    let mut used_modes = HashSet::new();

    for mode in value.split(',').map(|s| s.trim()) {
      match mode {
        "stdout" => {
          if used_modes.insert("stdout") {
            tracer_modes.push(Self::Stdout);
          }
        }
        "file" => {}
        value => {
          return Err(FromEnvError::InvalidKey(
            String::from(TRACING_MODE_VAR),
            anyhow!("Invalid value: {}", value),
          ))
        }
      }
    }

    Ok(tracer_modes)
  }

  pub fn from_env() -> Result<Vec<Self>, FromEnvError> {
    let Some(mode) = optional_var(TRACING_MODE_VAR) else {
      return Ok(vec![]);
    };

    Self::parse_list(&mode)
  }
}

pub struct Tracer {
  #[allow(unused)]
  worker_guards: Vec<WorkerGuard>,
}

impl Tracer {
  pub fn new(options: &[TracerMode]) -> anyhow::Result<Self> {
    let mut worker_guards = vec![];

    // Always write to the log file
    let directory = std::env::temp_dir().join("deps_index_trace");
    let file_appender = tracing_appender::rolling::Builder::new()
      .rotation(tracing_appender::rolling::Rotation::HOURLY)
      .max_log_files(4)
      .filename_prefix("deps-index-tracing")
      .build(&directory)
      .map_err(|err| anyhow!(err))?;
    let (non_blocking, worker_guard) = tracing_appender::non_blocking(file_appender);

    let layer = tracing_subscriber::fmt::layer()
      .with_writer(non_blocking)
      .with_span_events(FmtSpan::CLOSE)
      .with_filter(EnvFilter::from_default_env());

    worker_guards.push(worker_guard);

    let stdout_layer = if options.contains(&TracerMode::Stdout) {
      let (non_blocking, worker_guard) = tracing_appender::non_blocking(std::io::stdout());
      let stdout_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(EnvFilter::from_default_env());

      worker_guards.push(worker_guard);

      Some(stdout_layer)
    } else {
      None
    };

    let subscriber = Registry::default().with(layer).with(stdout_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(Self { worker_guards })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  static TEST_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

  #[test]
  fn no_modes_when_the_variable_is_unset() {
    let _guard = TEST_LOCK.lock();
    std::env::remove_var(TRACING_MODE_VAR);

    assert!(TracerMode::from_env().unwrap().is_empty());
  }

  #[test]
  fn reads_stdout_from_the_environment() {
    let _guard = TEST_LOCK.lock();
    std::env::set_var(TRACING_MODE_VAR, "stdout");

    let options = TracerMode::from_env();
    std::env::remove_var(TRACING_MODE_VAR);

    assert_eq!(options.unwrap(), vec![TracerMode::Stdout]);
  }

  #[test]
  fn duplicates_collapse_and_file_is_implied() {
    assert_eq!(
      TracerMode::parse_list("stdout, file,stdout").unwrap(),
      vec![TracerMode::Stdout]
    );
    assert!(TracerMode::parse_list("file").unwrap().is_empty());
  }

  #[test]
  fn unknown_modes_are_rejected() {
    let error = TracerMode::parse_list("stdout,chrome").unwrap_err();

    assert_eq!(
      error.to_string(),
      "Invalid value for DEPS_INDEX_TRACING_MODE: Invalid value: chrome"
    );
  }
}
