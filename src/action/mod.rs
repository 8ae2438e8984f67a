// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Action vocabulary, alias resolution, and validated commands.
//!
//! User input arrives as loose tokens (`"bright"`, `"+"`, `"warm"`).
//! This module normalizes aliases into canonical tokens, and validation
//! (see [`validate`]) turns the tokens into a typed [`Command`] that the
//! dispatcher can execute without re-checking anything.

mod validate;

pub use validate::validate;

use std::fmt;
use std::str::FromStr;

use crate::registry::DeviceKind;
use crate::types::{Brightness, ColorTemperature, FanSpeed};

/// The canonical device actions, after alias resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalAction {
    /// Turn the device on.
    On,
    /// Turn the device off.
    Off,
    /// Invert the device's current power state.
    Toggle,
    /// Fetch and print a snapshot of the device.
    Get,
    /// Set bulb brightness.
    SetBrightness,
    /// Set bulb color temperature.
    SetColorTemperature,
    /// Set fan speed.
    SetFanSpeed,
}

impl CanonicalAction {
    /// The CLI token for this action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Toggle => "toggle",
            Self::Get => "get",
            Self::SetBrightness => "bright",
            Self::SetColorTemperature => "temp",
            Self::SetFanSpeed => "speed",
        }
    }

    /// Whether this action is permitted for the given device kind.
    ///
    /// Plugs support power actions only; bulbs add brightness and color
    /// temperature; fans add speed.
    #[must_use]
    pub const fn is_allowed_for(self, kind: DeviceKind) -> bool {
        match self {
            Self::On | Self::Off | Self::Toggle | Self::Get => true,
            Self::SetBrightness | Self::SetColorTemperature => matches!(kind, DeviceKind::Bulb),
            Self::SetFanSpeed => matches!(kind, DeviceKind::Fan),
        }
    }
}

impl fmt::Display for CanonicalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CanonicalAction {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            "toggle" => Ok(Self::Toggle),
            "get" => Ok(Self::Get),
            "bright" => Ok(Self::SetBrightness),
            "temp" => Ok(Self::SetColorTemperature),
            "speed" => Ok(Self::SetFanSpeed),
            _ => Err(()),
        }
    }
}

/// Expands action aliases into canonical (action, value) token pairs.
///
/// Some aliases carry a fixed value (`warm` is `temp` at 3000 K, the
/// bare digits `1`-`3` are fan speeds); those replace any user-supplied
/// value. Unknown tokens pass through unchanged so canonical names can
/// be typed directly; invalid ones are caught later by validation.
///
/// # Examples
///
/// ```
/// use homectl::action::resolve_alias;
///
/// assert_eq!(resolve_alias("n", None), ("on".to_string(), None));
/// assert_eq!(
///     resolve_alias("warm", None),
///     ("temp".to_string(), Some("3000".to_string()))
/// );
/// ```
#[must_use]
pub fn resolve_alias(action: &str, value: Option<&str>) -> (String, Option<String>) {
    let expanded = match action {
        "n" => "on",
        "f" => "off",
        "b" | "brightness" => "bright",
        "t" | "temperature" => "temp",
        "warm" => "temp|3000",
        "cool" => "temp|6500",
        "1" => "speed|1",
        "2" => "speed|2",
        "3" => "speed|3",
        other => other,
    };

    match expanded.split_once('|') {
        Some((action, fixed)) => (action.to_string(), Some(fixed.to_string())),
        None => (expanded.to_string(), value.map(ToString::to_string)),
    }
}

/// A brightness target: absolute, or one step in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessSetting {
    /// Set to this exact value.
    Absolute(Brightness),
    /// One step brighter, clamped at the maximum.
    Up,
    /// One step dimmer, clamped at the minimum.
    Down,
}

impl BrightnessSetting {
    /// Resolves the setting against the current brightness.
    #[must_use]
    pub fn resolve(&self, current: Brightness) -> Brightness {
        match self {
            Self::Absolute(value) => *value,
            Self::Up => current.stepped_up(),
            Self::Down => current.stepped_down(),
        }
    }
}

/// A color temperature target: absolute, or one step in either direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureSetting {
    /// Set to this exact value.
    Absolute(ColorTemperature),
    /// One step cooler, clamped at the maximum.
    Up,
    /// One step warmer, clamped at the minimum.
    Down,
}

impl TemperatureSetting {
    /// Resolves the setting against the current color temperature.
    #[must_use]
    pub fn resolve(&self, current: ColorTemperature) -> ColorTemperature {
        match self {
            Self::Absolute(value) => *value,
            Self::Up => current.stepped_up(),
            Self::Down => current.stepped_down(),
        }
    }
}

/// A fan speed target: absolute, or advance-and-wrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedSetting {
    /// Set to this exact level.
    Absolute(FanSpeed),
    /// Advance to the next level, wrapping from the top back to 1.
    Cycle,
}

impl SpeedSetting {
    /// Resolves the setting against the current fan level.
    #[must_use]
    pub fn resolve(&self, current: FanSpeed) -> FanSpeed {
        match self {
            Self::Absolute(value) => *value,
            Self::Cycle => current.cycled(),
        }
    }
}

/// A fully validated command, ready to dispatch to every device in the
/// batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Turn on.
    On,
    /// Turn off.
    Off,
    /// Invert the current power state.
    Toggle,
    /// Fetch and print a snapshot.
    Get,
    /// Set bulb brightness.
    SetBrightness(BrightnessSetting),
    /// Set bulb color temperature.
    SetColorTemperature(TemperatureSetting),
    /// Set fan speed.
    SetFanSpeed(SpeedSetting),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_aliases_expand() {
        assert_eq!(resolve_alias("n", None).0, "on");
        assert_eq!(resolve_alias("f", None).0, "off");
        assert_eq!(resolve_alias("b", None).0, "bright");
        assert_eq!(resolve_alias("brightness", None).0, "bright");
        assert_eq!(resolve_alias("t", None).0, "temp");
        assert_eq!(resolve_alias("temperature", None).0, "temp");
    }

    #[test]
    fn combined_aliases_carry_values() {
        assert_eq!(
            resolve_alias("warm", None),
            ("temp".to_string(), Some("3000".to_string()))
        );
        assert_eq!(
            resolve_alias("cool", None),
            ("temp".to_string(), Some("6500".to_string()))
        );
        for speed in ["1", "2", "3"] {
            assert_eq!(
                resolve_alias(speed, None),
                ("speed".to_string(), Some(speed.to_string()))
            );
        }
    }

    #[test]
    fn combined_alias_overrides_supplied_value() {
        assert_eq!(
            resolve_alias("warm", Some("5000")),
            ("temp".to_string(), Some("3000".to_string()))
        );
    }

    #[test]
    fn unknown_tokens_pass_through() {
        assert_eq!(
            resolve_alias("frobnicate", Some("9")),
            ("frobnicate".to_string(), Some("9".to_string()))
        );
    }

    #[test]
    fn canonical_tokens_pass_through() {
        assert_eq!(resolve_alias("on", None).0, "on");
        assert_eq!(
            resolve_alias("bright", Some("+")),
            ("bright".to_string(), Some("+".to_string()))
        );
    }

    #[test]
    fn allowed_action_matrix() {
        use CanonicalAction::{Get, Off, On, SetBrightness, SetColorTemperature, SetFanSpeed, Toggle};
        use DeviceKind::{Bulb, Fan, Plug};

        for kind in [Plug, Bulb, Fan] {
            for action in [On, Off, Toggle, Get] {
                assert!(action.is_allowed_for(kind));
            }
        }
        assert!(SetBrightness.is_allowed_for(Bulb));
        assert!(!SetBrightness.is_allowed_for(Plug));
        assert!(!SetBrightness.is_allowed_for(Fan));
        assert!(SetColorTemperature.is_allowed_for(Bulb));
        assert!(!SetColorTemperature.is_allowed_for(Plug));
        assert!(SetFanSpeed.is_allowed_for(Fan));
        assert!(!SetFanSpeed.is_allowed_for(Bulb));
    }

    #[test]
    fn settings_resolve_against_current_state() {
        let b = Brightness::new(50).unwrap();
        assert_eq!(BrightnessSetting::Up.resolve(b).value(), 69);
        assert_eq!(BrightnessSetting::Down.resolve(b).value(), 31);
        assert_eq!(
            BrightnessSetting::Absolute(Brightness::new(25).unwrap())
                .resolve(b)
                .value(),
            25
        );

        let s = FanSpeed::new(3).unwrap();
        assert_eq!(SpeedSetting::Cycle.resolve(s).value(), 1);
    }
}
