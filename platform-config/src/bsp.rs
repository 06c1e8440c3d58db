// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! BSP platform mappings: where each transceiver's control pins and I2C bus
//! live, grouped by PIM.
//!
//! Every platform shares the same shape of mapping; only the data differs.
//! A mapping is loaded from its JSON encoding, from a file or a string
//! embedded by the caller, and indexed once so that lookups by transceiver
//! ID do not scan the PIMs.

use std::collections::BTreeMap;

use camino::Utf8Path;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BspPlatformMapping {
    pub pim_mapping: BTreeMap<i32, BspPimMapping>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BspPimMapping {
    #[serde(rename = "pimID")]
    pub pim_id: i32,
    pub tcvr_mapping: BTreeMap<i32, BspTransceiverMapping>,
    pub phy_mapping: BTreeMap<i32, serde_json::Value>,
    #[serde(rename = "phyIOControllers")]
    pub phy_io_controllers: BTreeMap<i32, serde_json::Value>,
    pub led_mapping: BTreeMap<i32, LedMapping>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BspTransceiverMapping {
    pub tcvr_id: i32,
    pub access_control: TransceiverAccessControl,
    pub io: TransceiverIoControl,
    pub tcvr_lane_to_led_id: BTreeMap<i32, i32>,
}

/// How a transceiver's reset and presence pins are reached.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransceiverAccessControl {
    pub controller_id: String,
    #[serde(rename = "type")]
    pub control_type: i32,
    pub reset: Option<ResetAndPresenceAccess>,
    pub presence: Option<ResetAndPresenceAccess>,
    pub gpio_chip: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResetAndPresenceAccess {
    pub sysfs_path: String,
    pub mask: u32,
    pub gpio_offset: i32,
}

/// The I2C bus over which a transceiver's management interface is read.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransceiverIoControl {
    pub controller_id: String,
    #[serde(rename = "type")]
    pub control_type: i32,
    pub device_path: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LedMapping {
    pub id: i32,
    pub blue_path: String,
    pub yellow_path: String,
    pub transceiver_id: Option<i32>,
}

/// An indexed [`BspPlatformMapping`].
#[derive(Clone, Debug)]
pub struct BspMapping {
    mapping: BspPlatformMapping,
    tcvr_to_pim: BTreeMap<i32, i32>,
}

impl BspMapping {
    pub fn new(mapping: BspPlatformMapping) -> Result<Self> {
        let mut tcvr_to_pim = BTreeMap::new();
        for (pim_key, pim) in &mapping.pim_mapping {
            if *pim_key != pim.pim_id {
                return Err(Error::Invalid(format!(
                    "PIM keyed as {pim_key} has pimID {}",
                    pim.pim_id
                )));
            }
            for (tcvr_key, tcvr) in &pim.tcvr_mapping {
                if *tcvr_key != tcvr.tcvr_id {
                    return Err(Error::Invalid(format!(
                        "transceiver keyed as {tcvr_key} in PIM {pim_key} \
                        has tcvrId {}",
                        tcvr.tcvr_id
                    )));
                }
                if let Some(other) = tcvr_to_pim.insert(*tcvr_key, *pim_key) {
                    return Err(Error::Invalid(format!(
                        "transceiver {tcvr_key} is mapped by PIMs {other} \
                        and {pim_key}"
                    )));
                }
            }
        }
        Ok(Self {
            mapping,
            tcvr_to_pim,
        })
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Self::from_json_named(text, "BSP platform mapping")
    }

    /// Parse a mapping, naming `source_name` in any error.
    pub fn from_json_named(text: &str, source_name: &str) -> Result<Self> {
        let mapping = serde_json::from_str(text).map_err(|err| Error::Parse {
            source_name: source_name.to_string(),
            err,
        })?;
        Self::new(mapping)
    }

    pub fn load(path: &Utf8Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| Error::Io {
            path: path.to_path_buf(),
            err,
        })?;
        Self::from_json_named(&text, path.as_str())
    }

    pub fn mapping(&self) -> &BspPlatformMapping {
        &self.mapping
    }

    pub fn pim_id_from_tcvr_id(&self, tcvr_id: i32) -> Result<i32> {
        self.tcvr_to_pim
            .get(&tcvr_id)
            .copied()
            .ok_or(Error::UnknownTransceiver(tcvr_id))
    }

    pub fn tcvr_mapping(&self, tcvr_id: i32) -> Result<&BspTransceiverMapping> {
        let pim_id = self.pim_id_from_tcvr_id(tcvr_id)?;
        self.mapping
            .pim_mapping
            .get(&pim_id)
            .and_then(|pim| pim.tcvr_mapping.get(&tcvr_id))
            .ok_or(Error::UnknownTransceiver(tcvr_id))
    }

    pub fn num_pims(&self) -> usize {
        self.mapping.pim_mapping.len()
    }

    pub fn num_transceivers(&self) -> usize {
        self.tcvr_to_pim.len()
    }

    pub fn pim_ids(&self) -> impl Iterator<Item = i32> + '_ {
        self.mapping.pim_mapping.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPPING: &str = include_str!("../tests/data/bsp_mapping.json");

    #[test]
    fn test_sizes() {
        let mapping = BspMapping::from_json(MAPPING).unwrap();
        assert_eq!(mapping.num_pims(), 2);
        assert_eq!(mapping.num_transceivers(), 3);
        assert_eq!(mapping.pim_ids().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_lookups() {
        let mapping = BspMapping::from_json(MAPPING).unwrap();
        assert_eq!(mapping.pim_id_from_tcvr_id(1).unwrap(), 1);
        assert_eq!(mapping.pim_id_from_tcvr_id(17).unwrap(), 2);

        let tcvr = mapping.tcvr_mapping(2).unwrap();
        assert_eq!(tcvr.tcvr_id, 2);
        assert_eq!(tcvr.io.device_path, "/run/devmap/i2c-busses/XCVR_2");
        let reset = tcvr.access_control.reset.as_ref().unwrap();
        assert_eq!(reset.sysfs_path, "/run/devmap/xcvrs/xcvr_ctrl_2/xcvr_reset_2");
        assert_eq!(reset.mask, 1);
        assert_eq!(tcvr.tcvr_lane_to_led_id.get(&1), Some(&3));

        let pim = &mapping.mapping().pim_mapping[&2];
        assert_eq!(pim.led_mapping[&5].transceiver_id, Some(17));
    }

    #[test]
    fn test_unknown_transceiver() {
        let mapping = BspMapping::from_json(MAPPING).unwrap();
        assert!(matches!(
            mapping.pim_id_from_tcvr_id(99),
            Err(Error::UnknownTransceiver(99))
        ));
        assert!(mapping.tcvr_mapping(0).is_err());
    }

    #[test]
    fn test_duplicate_transceiver() {
        let err = BspMapping::from_json(
            r#"{"pimMapping": {
                "1": {"pimID": 1, "tcvrMapping": {"4": {"tcvrId": 4}}},
                "2": {"pimID": 2, "tcvrMapping": {"4": {"tcvrId": 4}}}
            }}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("mapped by PIMs 1 and 2"));
    }

    #[test]
    fn test_mismatched_ids() {
        assert!(BspMapping::from_json(
            r#"{"pimMapping": {"1": {"pimID": 3}}}"#
        )
        .is_err());
        assert!(BspMapping::from_json(
            r#"{"pimMapping": {"1": {"pimID": 1, "tcvrMapping": {"4": {"tcvrId": 5}}}}}"#
        )
        .is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/data/bsp_mapping.json");
        let mapping = BspMapping::load(&path).unwrap();
        assert_eq!(mapping.num_transceivers(), 3);
    }

    #[test]
    fn test_parse_error_names_source() {
        match BspMapping::from_json("{") {
            Err(Error::Parse { source_name, .. }) => {
                assert_eq!(source_name, "BSP platform mapping")
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
        match BspMapping::from_json_named(r#"{"pimMapping": 3}"#, "sku.json") {
            Err(Error::Parse { source_name, .. }) => {
                assert_eq!(source_name, "sku.json")
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }
}
