// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan speed type for fan and air purifier control.

use std::fmt;

use crate::error::ValueError;

/// Fan speed level (1-3).
///
/// # Examples
///
/// ```
/// use homectl::types::FanSpeed;
///
/// let s = FanSpeed::new(2).unwrap();
/// assert_eq!(s.value(), 2);
///
/// // Cycling advances one level and wraps from the top back to 1
/// assert_eq!(FanSpeed::new(3).unwrap().cycled().value(), 1);
///
/// assert!(FanSpeed::new(4).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FanSpeed(u8);

impl FanSpeed {
    /// Lowest speed.
    pub const MIN: Self = Self(1);

    /// Highest speed.
    pub const MAX: Self = Self(3);

    /// Creates a new fan speed.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside 1-3.
    pub fn new(value: u8) -> Result<Self, ValueError> {
        if value < Self::MIN.0 || value > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: u16::from(Self::MIN.0),
                max: u16::from(Self::MAX.0),
                actual: u16::from(value),
            });
        }
        Ok(Self(value))
    }

    /// Creates a fan speed, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u8) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Returns the speed level.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the next speed level, wrapping from the maximum to the
    /// minimum.
    #[must_use]
    pub const fn cycled(&self) -> Self {
        if self.0 >= Self::MAX.0 {
            Self::MIN
        } else {
            Self(self.0 + 1)
        }
    }
}

impl fmt::Display for FanSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u8> for FanSpeed {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_range() {
        for v in 1..=3 {
            assert_eq!(FanSpeed::new(v).unwrap().value(), v);
        }
    }

    #[test]
    fn out_of_range() {
        assert!(FanSpeed::new(0).is_err());
        assert!(FanSpeed::new(4).is_err());
    }

    #[test]
    fn cycle_advances_and_wraps() {
        assert_eq!(FanSpeed::new(1).unwrap().cycled().value(), 2);
        assert_eq!(FanSpeed::new(2).unwrap().cycled().value(), 3);
        assert_eq!(FanSpeed::new(3).unwrap().cycled().value(), 1);
    }
}
