// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::io::Write;

use platform_config::PlatformConfig;
use platform_config::PmUnitConfig;
use slog::debug;
use slog::error;
use slog::info;
use slog::o;

use crate::record::Diffable;
use crate::report;

/// The compared fields of a record with their rendered values, as returned
/// by [`Diffable::field_values`].
pub type RecordFields = Vec<(&'static str, String)>;

/// How a record differs between the two compared configs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DiffKind {
    /// Present only in the second config, carrying that record's fields.
    Added { fields: RecordFields },
    /// Present only in the first config, carrying that record's fields.
    Removed { fields: RecordFields },
    /// Present in both, with `field` rendered differently.
    Modified {
        field: String,
        old_value: String,
        new_value: String,
    },
}

/// One difference found while comparing a PmUnit's configs.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Difference {
    pub pm_unit_name: String,
    pub version_label: String,
    pub record_name: String,
    pub kind: DiffKind,
}

/// Counts of changed records for one compared pair of configs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DiffSummary {
    pub pm_unit_name: String,
    pub version_label: String,
    pub added: usize,
    pub removed: usize,
    /// Records with at least one modified field.
    pub modified: usize,
}

/// Compares PmUnit configs and accumulates the differences found.
///
/// Each `compare_*` call appends to the same buffer, so one differ can cover
/// every PmUnit of a platform before the report is printed.
pub struct ConfigDiffer {
    log: slog::Logger,
    differences: Vec<Difference>,
}

impl ConfigDiffer {
    pub fn new(log: &slog::Logger) -> Self {
        Self {
            log: log.new(o!("unit" => "config_differ")),
            differences: Vec::new(),
        }
    }

    /// Compare two record sets, matching records by scoped name.
    ///
    /// Records only in `set_a` are reported as removed, records only in
    /// `set_b` as added, and records in both produce one modification per
    /// differing field. Scoped names are assumed unique within each set; if
    /// they are not, the last record with a given name wins.
    pub fn compare_record_sets<R: Diffable>(
        &mut self,
        set_a: &[R],
        set_b: &[R],
        pm_unit_name: &str,
        version_label: &str,
    ) {
        let map_a: BTreeMap<&str, &R> =
            set_a.iter().map(|r| (r.scoped_name(), r)).collect();
        let map_b: BTreeMap<&str, &R> =
            set_b.iter().map(|r| (r.scoped_name(), r)).collect();
        let names: BTreeSet<&str> =
            map_a.keys().chain(map_b.keys()).copied().collect();

        let difference = |record_name: &str, kind| Difference {
            pm_unit_name: pm_unit_name.to_string(),
            version_label: version_label.to_string(),
            record_name: record_name.to_string(),
            kind,
        };

        for name in names {
            match (map_a.get(name), map_b.get(name)) {
                (Some(a), None) => self.differences.push(difference(
                    name,
                    DiffKind::Removed {
                        fields: a.field_values(),
                    },
                )),
                (None, Some(b)) => self.differences.push(difference(
                    name,
                    DiffKind::Added {
                        fields: b.field_values(),
                    },
                )),
                (Some(a), Some(b)) => {
                    let old = a.field_values();
                    let new = b.field_values();
                    for ((field, old_value), (_, new_value)) in
                        old.into_iter().zip(new)
                    {
                        if old_value != new_value {
                            self.differences.push(difference(
                                name,
                                DiffKind::Modified {
                                    field: field.to_string(),
                                    old_value,
                                    new_value,
                                },
                            ));
                        }
                    }
                }
                (None, None) => {
                    error!(self.log, "record vanished during comparison";
                        "kind" => R::KIND,
                        "record" => name,
                        "pm_unit" => pm_unit_name,
                        "version" => version_label);
                }
            }
        }
    }

    /// Compare the device records of two configs of the same PmUnit.
    ///
    /// Only the I2C device list is compared. The remaining sections of a
    /// versioned config are held identical to the default by validation.
    pub fn compare_configs(
        &mut self,
        config_a: &PmUnitConfig,
        config_b: &PmUnitConfig,
        pm_unit_name: &str,
        version_label: &str,
    ) {
        debug!(self.log, "comparing configs";
            "pm_unit" => pm_unit_name,
            "version" => version_label);
        self.compare_record_sets(
            &config_a.i2c_device_configs,
            &config_b.i2c_device_configs,
            pm_unit_name,
            version_label,
        );
    }

    /// Compare the default config of every PmUnit against each of its
    /// versioned configs.
    pub fn compare_all_units(&mut self, platform_config: &PlatformConfig) {
        let names: Vec<&str> =
            platform_config.versioned_pm_unit_names().collect();
        info!(self.log, "comparing versioned configs";
            "platform" => &platform_config.platform_name,
            "pm_units" => names.len());
        for name in names {
            self.compare_unit(platform_config, name);
        }
    }

    /// Compare the default config of one PmUnit against each of its
    /// versioned configs.
    ///
    /// A PmUnit lacking either a default or a versioned config is skipped.
    pub fn compare_unit(
        &mut self,
        platform_config: &PlatformConfig,
        pm_unit_name: &str,
    ) {
        let Some(default) = platform_config.pm_unit_configs.get(pm_unit_name)
        else {
            info!(self.log, "no default config for PmUnit";
                "pm_unit" => pm_unit_name);
            return;
        };
        let versions = match platform_config
            .versioned_pm_unit_configs
            .get(pm_unit_name)
        {
            Some(versions) if !versions.is_empty() => versions,
            _ => {
                info!(self.log, "no versioned configs for PmUnit";
                    "pm_unit" => pm_unit_name);
                return;
            }
        };
        for version in versions {
            let label =
                PlatformConfig::versioned_label(version.product_sub_version);
            self.compare_configs(
                default,
                &version.pm_unit_config,
                pm_unit_name,
                &label,
            );
        }
    }

    /// All differences found so far, in the order they were found.
    pub fn differences(&self) -> &[Difference] {
        &self.differences
    }

    pub fn into_differences(self) -> Vec<Difference> {
        self.differences
    }

    /// Return per-comparison counts, in the order comparisons were made.
    pub fn summary(&self) -> Vec<DiffSummary> {
        let mut summaries: Vec<DiffSummary> = Vec::new();
        let mut modified: BTreeSet<(&str, &str, &str)> = BTreeSet::new();
        for diff in &self.differences {
            let idx = match summaries.iter().position(|s| {
                s.pm_unit_name == diff.pm_unit_name
                    && s.version_label == diff.version_label
            }) {
                Some(idx) => idx,
                None => {
                    summaries.push(DiffSummary {
                        pm_unit_name: diff.pm_unit_name.clone(),
                        version_label: diff.version_label.clone(),
                        ..Default::default()
                    });
                    summaries.len() - 1
                }
            };
            let summary = &mut summaries[idx];
            match diff.kind {
                DiffKind::Added { .. } => summary.added += 1,
                DiffKind::Removed { .. } => summary.removed += 1,
                DiffKind::Modified { .. } => {
                    if modified.insert((
                        diff.pm_unit_name.as_str(),
                        diff.version_label.as_str(),
                        diff.record_name.as_str(),
                    )) {
                        summary.modified += 1;
                    }
                }
            }
        }
        summaries
    }

    /// Render the grouped report to `w`.
    pub fn write_report<W: Write>(&self, w: &mut W) -> io::Result<()> {
        report::write_report(w, &self.differences)
    }

    /// Render the grouped report to stdout.
    pub fn print_report(&self) -> io::Result<()> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_report(&mut out)?;
        out.flush()
    }

    /// Render the per-comparison counts to `w` as a table.
    pub fn write_summary<W: Write>(&self, w: &mut W) -> io::Result<()> {
        report::write_summary(w, &self.summary())
    }
}
