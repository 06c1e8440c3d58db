// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Locating and reading platform configs.

use camino::Utf8Path;
use camino::Utf8PathBuf;
use slog::debug;
use slog::o;

use crate::Error;
use crate::PlatformConfig;
use crate::Result;

fn read(path: &Utf8Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|err| Error::Io {
        path: path.to_path_buf(),
        err,
    })
}

/// Read and parse the config stored at `path`.
pub fn load_config_file(path: &Utf8Path) -> Result<PlatformConfig> {
    PlatformConfig::from_json_named(&read(path)?, path.as_str())
}

/// Maps platform names onto the configs stored in a directory.
///
/// The config for platform `MERU800BIA` lives at
/// `<config_dir>/meru800bia.json`.
#[derive(Debug)]
pub struct ConfigResolver {
    config_dir: Utf8PathBuf,
    log: slog::Logger,
}

impl ConfigResolver {
    pub fn new(config_dir: impl Into<Utf8PathBuf>, log: &slog::Logger) -> Self {
        let config_dir = config_dir.into();
        let log = log.new(o!("config_dir" => config_dir.to_string()));
        Self { config_dir, log }
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Return the path at which the config for `platform_name` is expected.
    pub fn path_for(&self, platform_name: &str) -> Utf8PathBuf {
        self.config_dir
            .join(format!("{}.json", platform_name.to_ascii_lowercase()))
    }

    /// Load the config for `platform_name`.
    ///
    /// The config's own platform name must match the one requested, ignoring
    /// case.
    pub fn load(&self, platform_name: &str) -> Result<PlatformConfig> {
        let path = self.path_for(platform_name);
        debug!(self.log, "resolving platform config";
            "platform" => platform_name,
            "path" => %path);
        if !path.is_file() {
            return Err(Error::UnknownPlatform {
                name: platform_name.to_string(),
                path,
            });
        }
        let config = load_config_file(&path)?;
        if !config.platform_name.eq_ignore_ascii_case(platform_name) {
            return Err(Error::PlatformMismatch {
                expected: platform_name.to_string(),
                found: config.platform_name,
                path,
            });
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::Drain;

    fn test_log() -> slog::Logger {
        let dec =
            slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
        let drain = slog_term::FullFormat::new(dec).build().fuse();
        slog::Logger::root(drain, slog::o!())
    }

    fn data_dir() -> Utf8PathBuf {
        Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data")
    }

    #[test]
    fn test_load_config_file() {
        let config =
            load_config_file(&data_dir().join("sample.json")).unwrap();
        assert_eq!(config.platform_name, "SAMPLE");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_config_file(&data_dir().join("nope.json")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_resolver_path() {
        let resolver = ConfigResolver::new("/etc/configs", &test_log());
        assert_eq!(
            resolver.path_for("MERU800BIA"),
            Utf8PathBuf::from("/etc/configs/meru800bia.json")
        );
    }

    #[test]
    fn test_resolver_load() {
        let resolver = ConfigResolver::new(data_dir(), &test_log());
        let config = resolver.load("SAMPLE").unwrap();
        assert_eq!(config.platform_name, "SAMPLE");
    }

    #[test]
    fn test_resolver_unknown_platform() {
        let resolver = ConfigResolver::new(data_dir(), &test_log());
        let err = resolver.load("MONTBLANC").unwrap_err();
        assert!(matches!(err, Error::UnknownPlatform { .. }));
    }

    #[test]
    fn test_resolver_platform_mismatch() {
        let resolver = ConfigResolver::new(data_dir(), &test_log());
        let err = resolver.load("MISNAMED").unwrap_err();
        match err {
            Error::PlatformMismatch { expected, found, .. } => {
                assert_eq!(expected, "MISNAMED");
                assert_eq!(found, "SAMPLE");
            }
            e => panic!("unexpected error {e}"),
        }
    }
}
