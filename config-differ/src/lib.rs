// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

//! Field-level comparison of PmUnit configs.
//!
//! A PmUnit may carry versioned configs alongside its default one. The
//! [`ConfigDiffer`] matches the device records of two configs by their
//! scoped name and reports which records were added, removed, or changed,
//! and for changed records, which fields changed and how.

mod differ;
mod record;
mod report;

pub use differ::ConfigDiffer;
pub use differ::DiffKind;
pub use differ::DiffSummary;
pub use differ::Difference;
pub use differ::RecordFields;
pub use record::DiffValue;
pub use record::Diffable;
