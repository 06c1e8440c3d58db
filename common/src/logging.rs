// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Logger construction shared by the command-line tools.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;
use slog::Drain;

/// How log records should be rendered.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Unstructured, human-readable lines.
    #[default]
    Human,
    /// Bunyan-style JSON records.
    Json,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid log format '{0}', expected 'human' or 'json'")]
pub struct InvalidLogFormat(String);

impl FromStr for LogFormat {
    type Err = InvalidLogFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            _ => Err(InvalidLogFormat(s.to_string())),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Human => write!(f, "human"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

fn log_writer(log_file: Option<&str>) -> anyhow::Result<Box<dyn Write + Send>> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {path}"))?;
            Ok(Box::new(file))
        }
        // stdout carries the tool's actual output
        None => Ok(Box::new(std::io::stderr())),
    }
}

fn finish<D>(name: &'static str, drain: D, level: slog::Level) -> slog::Logger
where
    D: Drain<Ok = (), Err = slog::Never> + Send + 'static,
{
    let drain = slog::LevelFilter::new(drain, level).fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    slog::Logger::root(drain, slog::o!("component" => name))
}

/// Build the root logger for a tool.
///
/// Records go to `log_file` when one is given and to stderr otherwise.
/// Anything below `level` is dropped. The returned logger owns an async
/// drain; pending records are flushed once the last clone is dropped.
pub fn init(
    name: &'static str,
    log_file: Option<&str>,
    log_format: LogFormat,
    level: slog::Level,
) -> anyhow::Result<slog::Logger> {
    let writer = log_writer(log_file)?;
    let log = match log_format {
        LogFormat::Human => {
            let decorator = slog_term::PlainDecorator::new(writer);
            let drain = slog_term::FullFormat::new(decorator).build().fuse();
            finish(name, drain, level)
        }
        LogFormat::Json => {
            let drain = slog_bunyan::with_name(name, writer).build().fuse();
            finish(name, drain, level)
        }
    };
    Ok(log)
}
