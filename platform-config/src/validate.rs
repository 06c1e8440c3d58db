// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Structural checks over a [`PlatformConfig`].
//!
//! These cover the parts of a config the tooling in this workspace relies
//! on. Each check returns the first problem found.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use slog::error;
use slog::info;

use crate::Error;
use crate::I2cAddr;
use crate::I2cDeviceConfig;
use crate::PlatformConfig;
use crate::PmUnitConfig;
use crate::Result;
use crate::SlotTypeConfig;

fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(Error::Invalid(msg.into()))
}

fn within(prefix: impl std::fmt::Display) -> impl FnOnce(Error) -> Error {
    move |e| match e {
        Error::Invalid(msg) => Error::Invalid(format!("{prefix}: {msg}")),
        e => e,
    }
}

// Outgoing slots are named `<SlotType>@<N>`.
fn slot_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Z0-9_]+_SLOT)@(\d+)$").unwrap())
}

// Symlinks live in one of the predefined directories under /run/devmap.
const SYMLINK_DIRS: &[&str] = &[
    "eeproms",
    "sensors",
    "cplds",
    "fpgas",
    "inforoms",
    "i2c-busses",
    "gpiochips",
    "xcvrs",
    "flashes",
    "watchdogs",
];

fn symlink_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^/run/devmap/([a-z0-9-]+)/.+$").unwrap())
}

// `<SlotPath>[<DeviceName>]`, where the slot path is `/` or a chain of
// `/<SlotName>` hops from the root.
fn device_path_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(/|(?:/(?:[A-Z]+_)+SLOT@\d+)+/?)\[([^\]]+)\]$").unwrap()
    })
}

fn rpm_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z]+_bsp_kmods$").unwrap())
}

fn rpm_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+-[0-9]+$").unwrap()
    })
}

/// Return the SlotType embedded in a slot name, if it is well formed.
pub fn extract_slot_type(slot_name: &str) -> Option<&str> {
    slot_name_regex()
        .captures(slot_name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn validate_i2c_device_config(device: &I2cDeviceConfig) -> Result<()> {
    let name = &device.pm_unit_scoped_name;
    if name.is_empty() {
        return invalid("PmUnitScopedName must be a non-empty string");
    }
    if name.chars().any(|c| c.is_ascii_lowercase()) {
        return invalid(format!(
            "PmUnitScopedName must be in uppercase; {name} contains lowercase characters"
        ));
    }
    if let Err(e) = device.address.parse::<I2cAddr>() {
        return invalid(format!("{name}: {e}"));
    }
    Ok(())
}

pub fn validate_slot_type_config(config: &SlotTypeConfig) -> Result<()> {
    match &config.idprom_config {
        None if config.pm_unit_name.is_none() => {
            invalid("SlotTypeConfig must have either IDPROM or PmUnit name")
        }
        None => Ok(()),
        Some(idprom) => match idprom.address.parse::<I2cAddr>() {
            Ok(_) => Ok(()),
            Err(e) => invalid(format!("IDPROM has invalid address: {e}")),
        },
    }
}

/// Check a `symbolicLinkToDevicePath` entry.
///
/// Only the syntax of the device path is checked, not whether the slot path
/// resolves to a PmUnit holding the named device.
pub fn validate_symlink(symlink: &str, device_path: &str) -> Result<()> {
    let Some(caps) = symlink_regex().captures(symlink) else {
        return invalid(format!("{symlink} is an invalid symlink"));
    };
    let dir = &caps[1];
    if !SYMLINK_DIRS.iter().any(|d| *d == dir) {
        return invalid(format!(
            "{dir} in {symlink} is not a predefined symlink directory"
        ));
    }
    if !device_path_regex().is_match(device_path) {
        return invalid(format!(
            "Invalid device path {device_path} for {symlink}"
        ));
    }
    Ok(())
}

pub fn validate_bsp_kmods_rpm(name: &str, version: &str) -> Result<()> {
    if name.is_empty() {
        return invalid("BspKmodsRpmName cannot be empty");
    }
    if !rpm_name_regex().is_match(name) {
        return invalid(format!("Invalid BspKmodsRpmName: {name}"));
    }
    if version.is_empty() {
        return invalid("BspKmodsRpmVersion cannot be empty");
    }
    if !rpm_version_regex().is_match(version) {
        return invalid(format!("Invalid BspKmodsRpmVersion: {version}"));
    }
    Ok(())
}

pub fn validate_pm_unit_config(
    slot_type_configs: &BTreeMap<String, SlotTypeConfig>,
    config: &PmUnitConfig,
) -> Result<()> {
    if !slot_type_configs.contains_key(&config.plugged_in_slot_type) {
        return invalid(format!(
            "Plugged-into Slot {} which has a missing SlotTypeConfig definition",
            config.plugged_in_slot_type
        ));
    }

    let mut names = BTreeSet::new();
    for device in &config.i2c_device_configs {
        validate_i2c_device_config(device)?;
        if !names.insert(device.pm_unit_scoped_name.as_str()) {
            return invalid(format!(
                "Duplicate pmUnitScopedName: {}",
                device.pm_unit_scoped_name
            ));
        }
    }

    for (slot_name, slot_config) in &config.outgoing_slot_configs {
        let Some(slot_type) = extract_slot_type(slot_name) else {
            return invalid(format!(
                "Invalid SlotName format {slot_name}. Must follow <SlotType>@<Num>"
            ));
        };
        if slot_type != slot_config.slot_type {
            return invalid(format!(
                "SlotName must contain the SlotType {} instead contains {slot_type}",
                slot_config.slot_type
            ));
        }
    }
    Ok(())
}

fn check(config: &PlatformConfig) -> Result<()> {
    if config.platform_name.is_empty() {
        return invalid("Platform name cannot be empty");
    }
    if config.root_slot_type.is_empty() {
        return invalid("Platform rootSlotType cannot be empty");
    }
    if !config.slot_type_configs.contains_key(&config.root_slot_type) {
        return invalid(format!(
            "Invalid rootSlotType {}. Not found in slotTypeConfigs",
            config.root_slot_type
        ));
    }

    for (name, slot_type_config) in &config.slot_type_configs {
        validate_slot_type_config(slot_type_config)
            .map_err(within(format!("SlotType {name}")))?;
    }

    for (name, pm_unit_config) in &config.pm_unit_configs {
        validate_pm_unit_config(&config.slot_type_configs, pm_unit_config)
            .map_err(within(format!("PmUnit {name}")))?;
    }

    for (name, versions) in &config.versioned_pm_unit_configs {
        if versions.is_empty() {
            return invalid(format!(
                "VersionedPmUnitConfigs for {name} must not be empty"
            ));
        }
        let mut seen = BTreeSet::new();
        for version in versions {
            if version.product_sub_version < 0 {
                return invalid(format!(
                    "One of PmUnit {name}'s VersionedPmUnitConfig has a negative ProductSubVersion"
                ));
            }
            if !seen.insert(version.product_sub_version) {
                return invalid(format!(
                    "PmUnit {name} has more than one VersionedPmUnitConfig for ProductSubVersion {}",
                    version.product_sub_version
                ));
            }
            validate_pm_unit_config(
                &config.slot_type_configs,
                &version.pm_unit_config,
            )
            .map_err(within(format!(
                "PmUnit {name} {}",
                PlatformConfig::versioned_label(version.product_sub_version)
            )))?;
        }
    }

    for (symlink, device_path) in &config.symbolic_link_to_device_path {
        validate_symlink(symlink, device_path)?;
    }

    validate_bsp_kmods_rpm(
        &config.bsp_kmods_rpm_name,
        &config.bsp_kmods_rpm_version,
    )
}

/// Check `config`, logging the outcome.
pub fn validate(log: &slog::Logger, config: &PlatformConfig) -> Result<()> {
    info!(log, "validating config"; "platform" => &config.platform_name);
    check(config).map_err(|e| {
        error!(log, "config is invalid: {e}");
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SlotConfig;
    use crate::VersionedPmUnitConfig;
    use slog::Drain;

    fn test_log() -> slog::Logger {
        let dec =
            slog_term::PlainSyncDecorator::new(slog_term::TestStdoutWriter);
        let drain = slog_term::FullFormat::new(dec).build().fuse();
        slog::Logger::root(drain, slog::o!())
    }

    fn sample() -> PlatformConfig {
        PlatformConfig::from_json(include_str!("../tests/data/sample.json"))
            .unwrap()
    }

    fn device(name: &str, address: &str) -> I2cDeviceConfig {
        I2cDeviceConfig {
            pm_unit_scoped_name: name.to_string(),
            address: address.to_string(),
            ..Default::default()
        }
    }

    fn expect_invalid(result: Result<()>, needle: &str) {
        match result {
            Err(Error::Invalid(msg)) => {
                assert!(msg.contains(needle), "'{msg}' lacks '{needle}'")
            }
            other => panic!("expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn test_sample_is_valid() {
        validate(&test_log(), &sample()).unwrap();
    }

    #[test]
    fn test_extract_slot_type() {
        assert_eq!(extract_slot_type("SMB_SLOT@0"), Some("SMB_SLOT"));
        assert_eq!(extract_slot_type("PIM_SLOT@12"), Some("PIM_SLOT"));
        assert_eq!(extract_slot_type("SMB_SLOT"), None);
        assert_eq!(extract_slot_type("SMB@0"), None);
    }

    #[test]
    fn test_i2c_device_checks() {
        validate_i2c_device_config(&device("SCM_CPLD", "0x35")).unwrap();
        expect_invalid(
            validate_i2c_device_config(&device("", "0x35")),
            "non-empty",
        );
        expect_invalid(
            validate_i2c_device_config(&device("scm_cpld", "0x35")),
            "uppercase",
        );
        expect_invalid(
            validate_i2c_device_config(&device("SCM_CPLD", "35")),
            "invalid I2C address",
        );
    }

    #[test]
    fn test_duplicate_scoped_name() {
        let mut config = sample();
        let scm = config.pm_unit_configs.get_mut("SCM").unwrap();
        scm.i2c_device_configs.push(device("SCM_CPLD", "0x36"));
        expect_invalid(check(&config), "Duplicate pmUnitScopedName: SCM_CPLD");
    }

    #[test]
    fn test_missing_slot_type() {
        let mut config = sample();
        let smb = config.pm_unit_configs.get_mut("SMB").unwrap();
        smb.plugged_in_slot_type = "PIM_SLOT".to_string();
        expect_invalid(check(&config), "PmUnit SMB: Plugged-into");
    }

    #[test]
    fn test_outgoing_slot_mismatch() {
        let mut config = sample();
        let scm = config.pm_unit_configs.get_mut("SCM").unwrap();
        scm.outgoing_slot_configs.insert(
            "FAN_SLOT@1".to_string(),
            SlotConfig {
                slot_type: "SMB_SLOT".to_string(),
                outgoing_i2c_bus_names: vec![],
            },
        );
        expect_invalid(check(&config), "SlotName must contain the SlotType");
    }

    #[test]
    fn test_root_slot_type() {
        let mut config = sample();
        config.root_slot_type = "CHASSIS_SLOT".to_string();
        expect_invalid(check(&config), "Invalid rootSlotType CHASSIS_SLOT");
        config.root_slot_type.clear();
        expect_invalid(check(&config), "rootSlotType cannot be empty");
    }

    #[test]
    fn test_versioned_configs() {
        let mut config = sample();
        config
            .versioned_pm_unit_configs
            .insert("SMB".to_string(), Vec::new());
        expect_invalid(check(&config), "for SMB must not be empty");

        let mut config = sample();
        config
            .versioned_pm_unit_configs
            .get_mut("SCM")
            .unwrap()
            .push(VersionedPmUnitConfig {
                product_sub_version: -1,
                pm_unit_config: config.pm_unit_configs["SCM"].clone(),
            });
        expect_invalid(check(&config), "negative ProductSubVersion");
    }

    #[test]
    fn test_versioned_device_error_names_version() {
        let mut config = sample();
        let versions = config.versioned_pm_unit_configs.get_mut("SCM").unwrap();
        versions[0]
            .pm_unit_config
            .i2c_device_configs
            .push(device("SCM_NEW", "0x90"));
        expect_invalid(check(&config), "PmUnit SCM productSubVersion=2");
    }

    #[test]
    fn test_slot_type_configs() {
        let mut config = sample();
        let smb = config.slot_type_configs.get_mut("SMB_SLOT").unwrap();
        smb.idprom_config.as_mut().unwrap().address = "0x500".to_string();
        expect_invalid(
            check(&config),
            "SlotType SMB_SLOT: IDPROM has invalid address",
        );

        let mut config = sample();
        let fan = config.slot_type_configs.get_mut("FAN_SLOT").unwrap();
        fan.pm_unit_name = None;
        expect_invalid(check(&config), "either IDPROM or PmUnit name");
    }

    #[test]
    fn test_symlinks() {
        validate_symlink("/run/devmap/eeproms/SCM_EEPROM", "/[SCM_EEPROM]")
            .unwrap();
        validate_symlink(
            "/run/devmap/sensors/SMB_LM75",
            "/SMB_SLOT@0/[SMB_LM75]",
        )
        .unwrap();
        expect_invalid(
            validate_symlink("/var/run/eeproms/SCM_EEPROM", "/[SCM_EEPROM]"),
            "invalid symlink",
        );
        expect_invalid(
            validate_symlink("/run/devmap/disks/SCM_EEPROM", "/[SCM_EEPROM]"),
            "disks in /run/devmap/disks/SCM_EEPROM is not a predefined",
        );
        expect_invalid(
            validate_symlink("/run/devmap/eeproms/SCM_EEPROM", "SCM_EEPROM"),
            "Invalid device path",
        );

        let mut config = sample();
        config.symbolic_link_to_device_path.insert(
            "/run/devmap/gpios/SCM_GPIO".to_string(),
            "/[SCM_GPIO]".to_string(),
        );
        expect_invalid(check(&config), "gpios");
    }

    #[test]
    fn test_bsp_kmods_rpm() {
        validate_bsp_kmods_rpm("sample_bsp_kmods", "1.0.0-1").unwrap();
        expect_invalid(
            validate_bsp_kmods_rpm("", "1.0.0-1"),
            "cannot be empty",
        );
        expect_invalid(
            validate_bsp_kmods_rpm("Sample-kmods", "1.0.0-1"),
            "Invalid BspKmodsRpmName: Sample-kmods",
        );
        expect_invalid(
            validate_bsp_kmods_rpm("sample_bsp_kmods", "1.0"),
            "Invalid BspKmodsRpmVersion: 1.0",
        );

        let mut config = sample();
        config.bsp_kmods_rpm_name = "montblanc".to_string();
        expect_invalid(check(&config), "Invalid BspKmodsRpmName");
    }

    #[test]
    fn test_duplicate_product_sub_version() {
        let mut config = sample();
        let scm = config.pm_unit_configs["SCM"].clone();
        let versions = config.versioned_pm_unit_configs.get_mut("SCM").unwrap();
        let sub_version = versions[0].product_sub_version;
        versions.push(VersionedPmUnitConfig {
            product_sub_version: sub_version,
            pm_unit_config: scm,
        });
        expect_invalid(
            check(&config),
            "PmUnit SCM has more than one VersionedPmUnitConfig",
        );
    }
}
