// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/
//
// Copyright 2026 Oxide Computer Company

use std::fmt;
use std::str::FromStr;

use crate::Error;

/// A 7-bit I2C device address, written in configs as `0x50`.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct I2cAddr(u8);

impl I2cAddr {
    pub const MAX: u8 = 0x7f;

    pub fn new(addr: u8) -> Option<Self> {
        (addr <= Self::MAX).then_some(Self(addr))
    }

    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl FromStr for I2cAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let invalid = || Error::InvalidI2cAddr(s.to_string());
        let digits = s.strip_prefix("0x").ok_or_else(invalid)?;
        if digits.is_empty() || digits.len() > 2 {
            return Err(invalid());
        }
        let addr = u8::from_str_radix(digits, 16).map_err(|_| invalid())?;
        Self::new(addr).ok_or_else(invalid)
    }
}

impl fmt::Display for I2cAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

impl fmt::Debug for I2cAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "I2cAddr({self})")
    }
}
