// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness type for bulb control.

use std::fmt;

use crate::error::ValueError;

/// Bulb brightness as a percentage (1-100).
///
/// The bulb platform treats 0 as "off" rather than a brightness, so the
/// valid range starts at 1.
///
/// # Examples
///
/// ```
/// use homectl::types::Brightness;
///
/// let b = Brightness::new(75).unwrap();
/// assert_eq!(b.value(), 75);
///
/// // Relative nudges move by one interval step, clamped at the bounds
/// assert_eq!(Brightness::new(90).unwrap().stepped_up().value(), 100);
///
/// assert!(Brightness::new(0).is_err());
/// assert!(Brightness::new(101).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Brightness(u8);

impl Brightness {
    /// Minimum brightness (1%).
    pub const MIN: Self = Self(1);

    /// Maximum brightness (100%).
    pub const MAX: Self = Self(100);

    /// One relative adjustment step: a fifth of the range.
    pub const STEP: u8 = (Self::MAX.0 - Self::MIN.0) / 5;

    /// Creates a new brightness value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside 1-100.
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

    /// Creates a brightness value, clamping to the valid range.
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

    /// Returns the brightness percentage.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the value one step brighter, clamped at the maximum.
    #[must_use]
    pub const fn stepped_up(&self) -> Self {
        Self::clamped(self.0.saturating_add(Self::STEP))
    }

    /// Returns the value one step dimmer, clamped at the minimum.
    #[must_use]
    pub const fn stepped_down(&self) -> Self {
        Self::clamped(self.0.saturating_sub(Self::STEP))
    }
}

impl fmt::Display for Brightness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl TryFrom<u8> for Brightness {
    type Error = ValueError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
