// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

use platform_config::I2cDeviceConfig;
use serde::Serialize;

/// A config record that can be matched by name and compared field by field.
pub trait Diffable {
    /// Human-readable name of the record type.
    const KIND: &'static str;

    /// The name identifying this record within its PmUnit.
    fn scoped_name(&self) -> &str;

    /// The compared fields, in declaration order, with their rendered values.
    ///
    /// The identity field is not included.
    fn field_values(&self) -> Vec<(&'static str, String)>;
}

/// Rendering of a field value for comparison and display.
pub trait DiffValue {
    fn diff_string(&self) -> String;
}

impl DiffValue for String {
    fn diff_string(&self) -> String {
        self.clone()
    }
}

impl DiffValue for bool {
    fn diff_string(&self) -> String {
        self.to_string()
    }
}

macro_rules! display_diff_value {
    ($($ty:ty),*) => {
        $(
            impl DiffValue for $ty {
                fn diff_string(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

display_diff_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: DiffValue> DiffValue for Option<T> {
    fn diff_string(&self) -> String {
        match self {
            Some(value) => value.diff_string(),
            None => String::from("unset"),
        }
    }
}

// Lists are compared as a whole, not element by element.
impl<T: Serialize> DiffValue for Vec<T> {
    fn diff_string(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|e| format!("<unserializable: {e}>"))
    }
}

/// Implement [`Diffable`] for a record type from its identity field and the
/// list of compared fields.
///
/// ```ignore
/// diffable!(I2cDeviceConfig,
///     kind = "I2cDeviceConfig",
///     identity = pm_unit_scoped_name,
///     fields {
///         bus_name => "busName",
///         address => "address",
///     }
/// );
/// ```
#[macro_export]
macro_rules! diffable {
    (
        $ty:ty,
        kind = $kind:literal,
        identity = $identity:ident,
        fields { $($field:ident => $name:literal),* $(,)? }
    ) => {
        impl $crate::Diffable for $ty {
            const KIND: &'static str = $kind;

            fn scoped_name(&self) -> &str {
                &self.$identity
            }

            fn field_values(&self) -> Vec<(&'static str, String)> {
                use $crate::DiffValue;
                vec![$(($name, self.$field.diff_string())),*]
            }
        }
    };
}

diffable!(I2cDeviceConfig,
    kind = "I2cDeviceConfig",
    identity = pm_unit_scoped_name,
    fields {
        bus_name => "busName",
        address => "address",
        kernel_device_name => "kernelDeviceName",
        num_outgoing_channels => "numOutgoingChannels",
        is_gpio_chip => "isGpioChip",
        is_watchdog => "isWatchdog",
        has_bmc_mac_address => "hasBmcMacAddress",
        init_reg_settings => "initRegSettings",
        is_eeprom => "isEeprom",
        has_cpu_mac_address => "hasCpuMacAddress",
        has_switch_asic_mac_address => "hasSwitchAsicMacAddress",
        has_reserved_mac_address => "hasReservedMacAddress",
    }
);
