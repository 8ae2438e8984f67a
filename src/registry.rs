// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device registry backed by environment variables.
//!
//! Each logical device is described by one environment variable named
//! `HA_DEVICE_<NAME>` whose value is a pipe-delimited triple of API
//! family, device kind, and platform device id, for example:
//!
//! ```text
//! HA_DEVICE_FAN="breeze|fan|cid-0123456"
//! HA_DEVICE_LITETOP="lumen|bulb|AABBCCDDEEFF"
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::RegistryError;

/// Prefix for device registry environment variables.
pub const DEVICE_VAR_PREFIX: &str = "HA_DEVICE_";

/// One vendor's device-control cloud platform.
///
/// Each family has its own credentials and its own client handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFamily {
    /// The smart bulb/plug platform.
    Lumen,
    /// The fan/air purifier platform.
    Breeze,
}

impl ApiFamily {
    /// The registry token for this family.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Lumen => "lumen",
            Self::Breeze => "breeze",
        }
    }
}

impl fmt::Display for ApiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiFamily {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lumen" => Ok(Self::Lumen),
            "breeze" => Ok(Self::Breeze),
            other => Err(RegistryError::UnknownFamily {
                family: other.to_string(),
            }),
        }
    }
}

/// The kind of a device, which determines its allowed action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// A smart plug.
    Plug,
    /// A smart bulb.
    Bulb,
    /// A fan or air purifier.
    Fan,
}

impl DeviceKind {
    /// The registry token for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plug => "plug",
            Self::Bulb => "bulb",
            Self::Fan => "fan",
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plug" => Ok(Self::Plug),
            "bulb" => Ok(Self::Bulb),
            "fan" => Ok(Self::Fan),
            other => Err(RegistryError::UnknownKind {
                kind: other.to_string(),
            }),
        }
    }
}

/// A resolved device: logical name plus the platform coordinates needed
/// to control it. Immutable once created, scoped to one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Lowercase logical name, as typed by the user.
    pub name: String,
    /// The cloud platform that controls this device.
    pub family: ApiFamily,
    /// The device kind.
    pub kind: DeviceKind,
    /// Platform-specific device id (MAC-like for bulbs/plugs, CID for fans).
    pub external_id: String,
}

impl DeviceDescriptor {
    fn parse(name: &str, entry: &str) -> Result<Self, RegistryError> {
        let mut parts = entry.split('|');
        let (Some(family), Some(kind), Some(id)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(RegistryError::MalformedEntry {
                name: name.to_string(),
                value: entry.to_string(),
            });
        };
        Ok(Self {
            name: name.to_string(),
            family: family.parse()?,
            kind: kind.parse()?,
            external_id: id.to_string(),
        })
    }
}

/// Resolves a comma-separated list of logical device names into
/// descriptors.
///
/// Names are case-insensitive: they are lowercased on input and
/// uppercased to form the environment variable name. Empty segments
/// from stray commas are skipped. Resolution is all-or-nothing; a
/// single missing or malformed entry fails the whole batch so a
/// partial device list is never dispatched.
///
/// `lookup` abstracts the environment so tests can inject a fixed map;
/// production callers pass `|key| std::env::var(key).ok()`.
///
/// # Errors
///
/// Returns `RegistryError` naming the first device that failed to
/// resolve.
pub fn resolve_devices<F>(names: &str, lookup: F) -> Result<Vec<DeviceDescriptor>, RegistryError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut devices = Vec::new();
    for raw in names.split(',') {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        let variable = format!("{DEVICE_VAR_PREFIX}{}", name.to_uppercase());
        let Some(entry) = lookup(&variable) else {
            return Err(RegistryError::UndefinedDevice { name, variable });
        };
        devices.push(DeviceDescriptor::parse(&name, &entry)?);
    }
    if devices.is_empty() {
        return Err(RegistryError::NoDevices);
    }
    Ok(devices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_env(key: &str) -> Option<String> {
        match key {
            "HA_DEVICE_FAN" => Some("breeze|fan|cid-42".to_string()),
            "HA_DEVICE_LITETOP" => Some("lumen|bulb|AABBCCDDEEFF".to_string()),
            "HA_DEVICE_HEATER" => Some("lumen|plug|112233445566".to_string()),
            "HA_DEVICE_BROKEN" => Some("lumen|bulb".to_string()),
            "HA_DEVICE_ALIEN" => Some("zigbee|bulb|00".to_string()),
            _ => None,
        }
    }

    #[test]
    fn resolves_single_device() {
        let devices = resolve_devices("litetop", fake_env).unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "litetop");
        assert_eq!(devices[0].family, ApiFamily::Lumen);
        assert_eq!(devices[0].kind, DeviceKind::Bulb);
        assert_eq!(devices[0].external_id, "AABBCCDDEEFF");
    }

    #[test]
    fn resolves_comma_separated_list_in_order() {
        let devices = resolve_devices("fan,heater", fake_env).unwrap();
        assert_eq!(devices[0].kind, DeviceKind::Fan);
        assert_eq!(devices[1].kind, DeviceKind::Plug);
    }

    #[test]
    fn names_are_case_insensitive() {
        let devices = resolve_devices("LiteTop", fake_env).unwrap();
        assert_eq!(devices[0].name, "litetop");
    }

    #[test]
    fn missing_device_fails_whole_batch() {
        let err = resolve_devices("litetop,ghost", fake_env).unwrap_err();
        assert_eq!(
            err,
            RegistryError::UndefinedDevice {
                name: "ghost".to_string(),
                variable: "HA_DEVICE_GHOST".to_string(),
            }
        );
    }

    #[test]
    fn malformed_entry_is_rejected() {
        let err = resolve_devices("broken", fake_env).unwrap_err();
        assert!(matches!(err, RegistryError::MalformedEntry { .. }));
    }

    #[test]
    fn unknown_family_is_rejected() {
        let err = resolve_devices("alien", fake_env).unwrap_err();
        assert!(matches!(err, RegistryError::UnknownFamily { .. }));
    }

    #[test]
    fn empty_names_rejected() {
        assert_eq!(
            resolve_devices("", fake_env).unwrap_err(),
            RegistryError::NoDevices
        );
        assert_eq!(
            resolve_devices(",,", fake_env).unwrap_err(),
            RegistryError::NoDevices
        );
    }

    #[test]
    fn stray_commas_are_skipped() {
        let devices = resolve_devices("fan,,heater,", fake_env).unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(devices[0].name, "fan");
        assert_eq!(devices[1].name, "heater");
    }
}
