// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Text rendering of differences.

use std::collections::BTreeMap;
use std::io;
use std::io::Write;

use colored::Colorize;
use tabwriter::TabWriter;

use crate::differ::DiffKind;
use crate::differ::DiffSummary;
use crate::differ::Difference;

type RecordGroups<'a> = BTreeMap<&'a str, Vec<&'a DiffKind>>;

// Groups keep the order in which their first difference was found; records
// within a group are sorted by name.
fn group(differences: &[Difference]) -> Vec<((&str, &str), RecordGroups<'_>)> {
    let mut groups: Vec<((&str, &str), RecordGroups<'_>)> = Vec::new();
    for diff in differences {
        let key = (diff.pm_unit_name.as_str(), diff.version_label.as_str());
        let idx = match groups.iter().position(|(k, _)| *k == key) {
            Some(idx) => idx,
            None => {
                groups.push((key, BTreeMap::new()));
                groups.len() - 1
            }
        };
        groups[idx]
            .1
            .entry(diff.record_name.as_str())
            .or_default()
            .push(&diff.kind);
    }
    groups
}

fn describe(kind: &DiffKind) -> String {
    match kind {
        DiffKind::Added { .. } => String::from("(added)"),
        DiffKind::Removed { .. } => String::from("(removed)"),
        DiffKind::Modified {
            field,
            old_value,
            new_value,
        } => format!("{field} ({old_value} → {new_value})"),
    }
}

pub(crate) fn write_report<W: Write>(
    w: &mut W,
    differences: &[Difference],
) -> io::Result<()> {
    if differences.is_empty() {
        return writeln!(w, "No differences found.");
    }
    for (i, ((pm_unit, version), records)) in
        group(differences).into_iter().enumerate()
    {
        if i > 0 {
            writeln!(w)?;
        }
        writeln!(w, "PmUnit {pm_unit} (default vs {version}):")?;
        for (record, kinds) in records {
            let changes: Vec<String> =
                kinds.into_iter().map(describe).collect();
            writeln!(w, "  {record}: {}", changes.join(", "))?;
        }
    }
    Ok(())
}

pub(crate) fn write_summary<W: Write>(
    w: &mut W,
    summaries: &[DiffSummary],
) -> io::Result<()> {
    let mut tw = TabWriter::new(w);
    writeln!(
        tw,
        "{}\t{}\t{}\t{}\t{}",
        "PMUNIT".underline(),
        "VERSION".underline(),
        "ADDED".underline(),
        "REMOVED".underline(),
        "MODIFIED".underline(),
    )?;
    for s in summaries {
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}",
            s.pm_unit_name, s.version_label, s.added, s.removed, s.modified
        )?;
    }
    tw.flush()
}
