// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Data model and loaders for platform manager configuration.
//!
//! A platform config describes, per PmUnit, the devices the platform manager
//! should bring up. PmUnits may carry alternate configs keyed by the product
//! sub-version read from their IDPROM; those are what `config-differ`
//! compares against the default.

pub mod bsp;
mod config;
mod i2c;
mod load;
pub mod validate;

pub use config::*;
pub use i2c::I2cAddr;
pub use load::load_config_file;
pub use load::ConfigResolver;

use camino::Utf8PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {err}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        err: std::io::Error,
    },
    #[error("failed to parse {source_name}: {err}")]
    Parse {
        source_name: String,
        #[source]
        err: serde_json::Error,
    },
    #[error("no config found for platform {name} at {path}")]
    UnknownPlatform { name: String, path: Utf8PathBuf },
    #[error("config at {path} is for platform {found}, not {expected}")]
    PlatformMismatch {
        expected: String,
        found: String,
        path: Utf8PathBuf,
    },
    #[error("invalid I2C address \"{0}\"")]
    InvalidI2cAddr(String),
    #[error("no mapping for transceiver {0}")]
    UnknownTransceiver(i32),
    #[error("invalid config: {0}")]
    Invalid(String),
}
