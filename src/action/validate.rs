// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batch validation of an action against a list of devices.

use crate::action::{
    BrightnessSetting, CanonicalAction, Command, SpeedSetting, TemperatureSetting,
};
use crate::error::ValidationError;
use crate::registry::DeviceDescriptor;
use crate::types::{Brightness, ColorTemperature, FanSpeed};

/// Validates an action and optional value against every device in the
/// batch and produces the typed [`Command`] to dispatch.
///
/// Devices are checked in order and the first failure rejects the whole
/// batch; an action is never partially applied to a valid subset.
/// Actions without a value requirement (`on`, `off`, `toggle`, `get`)
/// ignore any extra value.
///
/// # Errors
///
/// Returns a [`ValidationError`] naming the offending action or value.
/// No network call is made before validation succeeds.
pub fn validate(
    devices: &[DeviceDescriptor],
    action: Option<&str>,
    value: Option<&str>,
) -> Result<Command, ValidationError> {
    let token = action.ok_or(ValidationError::MissingAction)?;

    let Ok(action) = token.parse::<CanonicalAction>() else {
        return Err(ValidationError::InvalidAction {
            action: token.to_string(),
            device: devices.first().map_or_else(String::new, |d| d.name.clone()),
        });
    };

    for device in devices {
        if !action.is_allowed_for(device.kind) {
            return Err(ValidationError::InvalidAction {
                action: token.to_string(),
                device: device.name.clone(),
            });
        }
    }

    match action {
        CanonicalAction::On => Ok(Command::On),
        CanonicalAction::Off => Ok(Command::Off),
        CanonicalAction::Toggle => Ok(Command::Toggle),
        CanonicalAction::Get => Ok(Command::Get),
        CanonicalAction::SetBrightness => {
            Ok(Command::SetBrightness(parse_brightness(value)?))
        }
        CanonicalAction::SetColorTemperature => {
            Ok(Command::SetColorTemperature(parse_temperature(value)?))
        }
        CanonicalAction::SetFanSpeed => Ok(Command::SetFanSpeed(parse_speed(value)?)),
    }
}

fn parse_brightness(value: Option<&str>) -> Result<BrightnessSetting, ValidationError> {
    let value = value.ok_or(ValidationError::MissingValue)?;
    match value {
        "+" => Ok(BrightnessSetting::Up),
        "-" => Ok(BrightnessSetting::Down),
        other => other
            .parse::<u8>()
            .ok()
            .and_then(|n| Brightness::new(n).ok())
            .map(BrightnessSetting::Absolute)
            .ok_or(ValidationError::InvalidValue {
                value: other.to_string(),
                property: "brightness",
            }),
    }
}

fn parse_temperature(value: Option<&str>) -> Result<TemperatureSetting, ValidationError> {
    let value = value.ok_or(ValidationError::MissingValue)?;
    match value {
        "+" => Ok(TemperatureSetting::Up),
        "-" => Ok(TemperatureSetting::Down),
        other => other
            .parse::<u16>()
            .ok()
            .and_then(|n| ColorTemperature::new(n).ok())
            .map(TemperatureSetting::Absolute)
            .ok_or(ValidationError::InvalidValue {
                value: other.to_string(),
                property: "color temperature",
            }),
    }
}

fn parse_speed(value: Option<&str>) -> Result<SpeedSetting, ValidationError> {
    let value = value.ok_or(ValidationError::MissingValue)?;
    match value {
        "cycle" => Ok(SpeedSetting::Cycle),
        other => other
            .parse::<u8>()
            .ok()
            .and_then(|n| FanSpeed::new(n).ok())
            .map(SpeedSetting::Absolute)
            .ok_or(ValidationError::InvalidValue {
                value: other.to_string(),
                property: "fan speed",
            }),
    }
}
