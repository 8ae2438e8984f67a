// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color temperature type for bulb control.

use std::fmt;

use crate::error::ValueError;

/// Bulb color temperature in Kelvin (2700-6500).
///
/// 2700 K is the warmest white the platform's bulbs support, 6500 K the
/// coolest.
///
/// # Examples
///
/// ```
/// use homectl::types::ColorTemperature;
///
/// let warm = ColorTemperature::new(3000).unwrap();
/// assert_eq!(warm.value(), 3000);
///
/// assert!(ColorTemperature::new(1800).is_err());
/// assert!(ColorTemperature::new(7000).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    /// Warmest supported temperature (2700 K).
    pub const MIN: Self = Self(2700);

    /// Coolest supported temperature (6500 K).
    pub const MAX: Self = Self(6500);

    /// One relative adjustment step: a fifth of the range.
    pub const STEP: u16 = (Self::MAX.0 - Self::MIN.0) / 5;

    /// Creates a new color temperature.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the value is outside 2700-6500.
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if value < Self::MIN.0 || value > Self::MAX.0 {
            return Err(ValueError::OutOfRange {
                min: Self::MIN.0,
                max: Self::MAX.0,
                actual: value,
            });
        }
        Ok(Self(value))
    }

    /// Creates a color temperature, clamping to the valid range.
    #[must_use]
    pub const fn clamped(value: u16) -> Self {
        if value < Self::MIN.0 {
            Self::MIN
        } else if value > Self::MAX.0 {
            Self::MAX
        } else {
            Self(value)
        }
    }

    /// Returns the temperature in Kelvin.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns the value one step cooler, clamped at the maximum.
    #[must_use]
    pub const fn stepped_up(&self) -> Self {
        Self::clamped(self.0.saturating_add(Self::STEP))
    }

    /// Returns the value one step warmer, clamped at the minimum.
    #[must_use]
    pub const fn stepped_down(&self) -> Self {
        Self::clamped(self.0.saturating_sub(Self::STEP))
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.0)
    }
}

impl TryFrom<u16> for ColorTemperature {
    type Error = ValueError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_bounds() {
        assert_eq!(ColorTemperature::new(2700).unwrap().value(), 2700);
        assert_eq!(ColorTemperature::new(6500).unwrap().value(), 6500);
    }

    #[test]
    fn out_of_range() {
        assert!(ColorTemperature::new(2699).is_err());
        assert!(ColorTemperature::new(6501).is_err());
    }

    #[test]
    fn step_is_fifth_of_range() {
        assert_eq!(ColorTemperature::STEP, 760);
    }

    #[test]
    fn stepping_clamps_at_bounds() {
        assert_eq!(
            ColorTemperature::new(6000).unwrap().stepped_up(),
            ColorTemperature::MAX
        );
        assert_eq!(
            ColorTemperature::new(3000).unwrap().stepped_down(),
            ColorTemperature::MIN
        );
    }

    #[test]
    fn step_up_then_down_round_trips() {
        let start = ColorTemperature::new(4000).unwrap();
        assert_eq!(start.stepped_up().stepped_down(), start);
    }

    #[test]
    fn display() {
        assert_eq!(ColorTemperature::new(3000).unwrap().to_string(), "3000K");
    }
}
