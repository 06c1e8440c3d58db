// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Serde models of the platform manager config.
//!
//! Only the sections the tooling reads are modeled. Production configs carry
//! many more (PCI devices, embedded sensors, ...); unknown keys are ignored
//! and absent keys take their defaults.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// The configuration of a whole platform.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformConfig {
    pub platform_name: String,
    pub root_slot_type: String,
    pub root_pm_unit_name: String,
    pub slot_type_configs: BTreeMap<String, SlotTypeConfig>,
    /// Default config of each PmUnit, keyed by PmUnit name.
    pub pm_unit_configs: BTreeMap<String, PmUnitConfig>,
    /// Alternate configs of a PmUnit, one per product sub-version.
    pub versioned_pm_unit_configs: BTreeMap<String, Vec<VersionedPmUnitConfig>>,
    pub symbolic_link_to_device_path: BTreeMap<String, String>,
    pub bsp_kmods_rpm_name: String,
    pub bsp_kmods_rpm_version: String,
}

impl PlatformConfig {
    /// Parse a config from its JSON encoding.
    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_json_named(text, "platform config")
    }

    /// Parse a config, naming `source_name` in any error.
    pub fn from_json_named(text: &str, source_name: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::Parse {
            source_name: source_name.to_string(),
            err,
        })
    }

    /// The label identifying a versioned config of a PmUnit.
    pub fn versioned_label(product_sub_version: i32) -> String {
        format!("productSubVersion={product_sub_version}")
    }

    /// Return the names of PmUnits having both a default config and at least
    /// one versioned config.
    pub fn versioned_pm_unit_names(&self) -> impl Iterator<Item = &str> {
        self.pm_unit_configs.keys().map(String::as_str).filter(|name| {
            self.versioned_pm_unit_configs
                .get(*name)
                .is_some_and(|versions| !versions.is_empty())
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotTypeConfig {
    pub num_outgoing_i2c_buses: Option<i32>,
    pub pm_unit_name: Option<String>,
    pub idprom_config: Option<IdpromConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdpromConfig {
    pub bus_name: String,
    pub address: String,
    pub kernel_device_name: String,
    pub offset: Option<i32>,
}

/// The config of one PmUnit.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PmUnitConfig {
    pub plugged_in_slot_type: String,
    pub i2c_device_configs: Vec<I2cDeviceConfig>,
    pub outgoing_slot_configs: BTreeMap<String, SlotConfig>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SlotConfig {
    pub slot_type: String,
    pub outgoing_i2c_bus_names: Vec<String>,
}

/// A PmUnit config that applies only to one product sub-version.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionedPmUnitConfig {
    pub pm_unit_config: PmUnitConfig,
    pub product_sub_version: i32,
}

/// An I2C device the platform manager instantiates on a PmUnit.
///
/// `pm_unit_scoped_name` is unique within the owning PmUnit's device list.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I2cDeviceConfig {
    pub bus_name: String,
    pub address: String,
    pub kernel_device_name: String,
    pub pm_unit_scoped_name: String,
    pub num_outgoing_channels: Option<i32>,
    pub is_gpio_chip: bool,
    pub is_watchdog: bool,
    pub has_bmc_mac_address: bool,
    pub init_reg_settings: Option<Vec<I2cRegData>>,
    pub is_eeprom: bool,
    pub has_cpu_mac_address: bool,
    pub has_switch_asic_mac_address: bool,
    pub has_reserved_mac_address: bool,
}

/// A register write issued before the device's driver is bound.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct I2cRegData {
    pub reg_offset: i32,
    pub io_buf: Vec<u8>,
}
