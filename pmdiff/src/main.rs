// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! `pmdiff` reports how the versioned configs of a platform's PmUnits differ
//! from their default configs.

use std::io::stdout;
use std::io::Write;
use std::process::ExitCode;

use anyhow::Context;
use camino::Utf8PathBuf;
use slog::debug;
use structopt::clap::ArgGroup;
use structopt::clap::ErrorKind;
use structopt::StructOpt;

use common::logging::LogFormat;
use config_differ::ConfigDiffer;
use platform_config::ConfigResolver;
use platform_config::PlatformConfig;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "pmdiff",
    about = "compares default and versioned PmUnit configs of a platform",
    group = ArgGroup::with_name("source").required(true)
)]
struct Opt {
    #[structopt(
        long = "platform_name",
        help = "name of the platform whose config should be compared",
        group = "source"
    )]
    platform_name: Option<String>,

    #[structopt(
        long = "config_file",
        help = "path to a platform config to compare",
        group = "source"
    )]
    config_file: Option<Utf8PathBuf>,

    #[structopt(
        long = "pmunit_name",
        help = "only compare the configs of the named PmUnit"
    )]
    pmunit_name: Option<String>,

    #[structopt(
        long = "config_dir",
        help = "directory holding <platform>.json configs",
        env = "PMDIFF_CONFIG_DIR",
        default_value = "/usr/share/platform_manager/configs"
    )]
    config_dir: Utf8PathBuf,

    #[structopt(long, help = "validate the config before comparing")]
    validate: bool,

    #[structopt(long, help = "print per-PmUnit counts after the report")]
    summary: bool,

    #[structopt(
        long = "log_format",
        help = "format logs for 'human' or 'json' consumption",
        default_value = "human"
    )]
    log_format: LogFormat,

    #[structopt(
        long = "log_file",
        help = "send log data to the named file rather than stderr"
    )]
    log_file: Option<String>,

    #[structopt(short, long, help = "include debug messages in the log")]
    verbose: bool,
}

fn load_config(opts: &Opt, log: &slog::Logger) -> anyhow::Result<PlatformConfig> {
    if let Some(path) = &opts.config_file {
        debug!(log, "loading config file"; "path" => %path);
        return platform_config::load_config_file(path)
            .with_context(|| format!("failed to load {path}"));
    }
    let name = opts
        .platform_name
        .as_deref()
        .context("no platform name given")?;
    ConfigResolver::new(opts.config_dir.clone(), log)
        .load(name)
        .with_context(|| format!("failed to load config for {name}"))
}

fn run(opts: Opt) -> anyhow::Result<()> {
    let level = if opts.verbose {
        slog::Level::Debug
    } else {
        slog::Level::Info
    };
    let log = common::logging::init(
        "pmdiff",
        opts.log_file.as_deref(),
        opts.log_format,
        level,
    )?;

    let config = load_config(&opts, &log)?;
    if opts.validate {
        platform_config::validate::validate(&log, &config)
            .context("config failed validation")?;
    }

    let mut differ = ConfigDiffer::new(&log);
    match &opts.pmunit_name {
        Some(name) => differ.compare_unit(&config, name),
        None => differ.compare_all_units(&config),
    }

    differ.print_report().context("failed to write report")?;
    if opts.summary {
        let mut out = stdout().lock();
        writeln!(out)?;
        differ
            .write_summary(&mut out)
            .context("failed to write summary")?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let opts = match Opt::from_iter_safe(std::env::args_os()) {
        Ok(opts) => opts,
        Err(e)
            if matches!(
                e.kind,
                ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed
            ) =>
        {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e.message);
            return ExitCode::from(1);
        }
    };

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
