// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vendor cloud platform clients.
//!
//! Two platforms are supported: Lumen (smart bulbs and plugs) and
//! Breeze (fans and air purifiers). Both speak JSON over HTTPS through
//! [`reqwest`] against a configurable base URL, so the integration tests
//! can point them at a local mock server.
//!
//! Expired sessions are reported as the structured
//! [`PlatformError::ExpiredCredential`](crate::error::PlatformError::ExpiredCredential)
//! variant, decided here from the vendor's error code. Callers never
//! have to inspect error messages.

mod breeze;
mod cache;
mod lumen;

pub use breeze::{BreezeClient, BreezeSession};
pub use cache::{CacheConfig, ClientCache};
pub use lumen::{LumenClient, LumenSession};

use std::fmt;

use crate::error::PlatformError;
use crate::registry::{ApiFamily, DeviceKind};
use crate::types::{Brightness, ColorTemperature, FanSpeed};

/// Environment variable holding the account email, shared by both
/// platforms.
pub const EMAIL_VAR: &str = "HA_EMAIL";

/// Environment variable holding the Lumen account password.
pub const LUMEN_PASSWORD_VAR: &str = "HA_LUMEN_PASSWORD";

/// Environment variable holding the Breeze account password.
pub const BREEZE_PASSWORD_VAR: &str = "HA_BREEZE_PASSWORD";

/// Login credentials for one platform family.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Reads the credentials for a family from the environment.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::MissingCredential` naming the variable
    /// that is unset.
    pub fn from_env(family: ApiFamily) -> Result<Self, PlatformError> {
        let password_var = match family {
            ApiFamily::Lumen => LUMEN_PASSWORD_VAR,
            ApiFamily::Breeze => BREEZE_PASSWORD_VAR,
        };
        let email =
            std::env::var(EMAIL_VAR).map_err(|_| PlatformError::MissingCredential(EMAIL_VAR))?;
        let password = std::env::var(password_var)
            .map_err(|_| PlatformError::MissingCredential(password_var))?;
        Ok(Self { email, password })
    }
}

/// Whether a bulb is a plain white bulb or a color-capable one.
///
/// The distinction matters for dispatch: a plain bulb accepts a color
/// temperature change while off, a color bulb would be forced on by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulbClass {
    /// Non-color white bulb.
    Plain,
    /// Color-capable bulb.
    Color,
}

/// Normalized live state of a device, fetched before every dispatch.
///
/// Relative adjustments and toggle need the current values, so the
/// dispatcher always works from a fresh snapshot rather than a cached
/// device object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSnapshot {
    /// Platform device id.
    pub external_id: String,
    /// Display name as configured on the platform.
    pub nickname: String,
    /// Hardware model string.
    pub model: String,
    /// Device kind.
    pub kind: DeviceKind,
    /// Whether the platform currently sees the device.
    pub is_online: bool,
    /// Current power state.
    pub is_on: bool,
    /// Bulb class, present for bulbs only.
    pub bulb_class: Option<BulbClass>,
    /// Current brightness, present for bulbs only.
    pub brightness: Option<Brightness>,
    /// Current color temperature, present for bulbs only.
    pub color_temperature: Option<ColorTemperature>,
    /// Current fan level, present for fans only.
    pub fan_level: Option<FanSpeed>,
}

impl fmt::Display for DeviceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} model={} online={} power={}",
            self.nickname,
            self.external_id,
            self.kind,
            self.model,
            self.is_online,
            if self.is_on { "on" } else { "off" },
        )?;
        if let Some(brightness) = self.brightness {
            write!(f, " brightness={brightness}")?;
        }
        if let Some(temperature) = self.color_temperature {
            write!(f, " temp={temperature}")?;
        }
        if let Some(level) = self.fan_level {
            write!(f, " speed={level}")?;
        }
        Ok(())
    }
}

/// Operations every platform client offers.
///
/// Operations a platform genuinely lacks (fan speed on Lumen,
/// brightness on Breeze) return
/// [`PlatformError::UnsupportedOperation`]; batch validation keeps
/// those paths unreachable in normal use.
#[allow(async_fn_in_trait)]
pub trait PlatformClient {
    /// Fetches the live state of a device by its platform id.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the request fails or the device is
    /// unknown.
    async fn device_info(&self, external_id: &str) -> Result<DeviceSnapshot, PlatformError>;

    /// Turns the device on.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the command fails.
    async fn turn_on(&self, device: &DeviceSnapshot) -> Result<(), PlatformError>;

    /// Turns the device off.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the command fails.
    async fn turn_off(&self, device: &DeviceSnapshot) -> Result<(), PlatformError>;

    /// Sets bulb brightness.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the command fails.
    async fn set_brightness(
        &self,
        device: &DeviceSnapshot,
        value: Brightness,
    ) -> Result<(), PlatformError>;

    /// Sets bulb color temperature.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the command fails.
    async fn set_color_temperature(
        &self,
        device: &DeviceSnapshot,
        value: ColorTemperature,
    ) -> Result<(), PlatformError>;

    /// Sets fan speed. Never changes the power state.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the command fails.
    async fn set_fan_speed(
        &self,
        device: &DeviceSnapshot,
        value: FanSpeed,
    ) -> Result<(), PlatformError>;
}

/// An authenticated client for either platform family.
///
/// The client cache hands these out as shared handles; every worker of
/// the same family reads the same one.
#[derive(Debug)]
pub enum Client {
    /// Lumen (bulb/plug) client.
    Lumen(LumenClient),
    /// Breeze (fan) client.
    Breeze(BreezeClient),
}

impl Client {
    /// The family this client belongs to.
    #[must_use]
    pub const fn family(&self) -> ApiFamily {
        match self {
            Self::Lumen(_) => ApiFamily::Lumen,
            Self::Breeze(_) => ApiFamily::Breeze,
        }
    }
}

impl PlatformClient for Client {
    async fn device_info(&self, external_id: &str) -> Result<DeviceSnapshot, PlatformError> {
        match self {
            Self::Lumen(client) => client.device_info(external_id).await,
            Self::Breeze(client) => client.device_info(external_id).await,
        }
    }

    async fn turn_on(&self, device: &DeviceSnapshot) -> Result<(), PlatformError> {
        match self {
            Self::Lumen(client) => client.turn_on(device).await,
            Self::Breeze(client) => client.turn_on(device).await,
        }
    }

    async fn turn_off(&self, device: &DeviceSnapshot) -> Result<(), PlatformError> {
        match self {
            Self::Lumen(client) => client.turn_off(device).await,
            Self::Breeze(client) => client.turn_off(device).await,
        }
    }

    async fn set_brightness(
        &self,
        device: &DeviceSnapshot,
        value: Brightness,
    ) -> Result<(), PlatformError> {
        match self {
            Self::Lumen(client) => client.set_brightness(device, value).await,
            Self::Breeze(client) => client.set_brightness(device, value).await,
        }
    }

    async fn set_color_temperature(
        &self,
        device: &DeviceSnapshot,
        value: ColorTemperature,
    ) -> Result<(), PlatformError> {
        match self {
            Self::Lumen(client) => client.set_color_temperature(device, value).await,
            Self::Breeze(client) => client.set_color_temperature(device, value).await,
        }
    }

    async fn set_fan_speed(
        &self,
        device: &DeviceSnapshot,
        value: FanSpeed,
    ) -> Result<(), PlatformError> {
        match self {
            Self::Lumen(client) => client.set_fan_speed(device, value).await,
            Self::Breeze(client) => client.set_fan_speed(device, value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_display_includes_kind_fields() {
        let snapshot = DeviceSnapshot {
            external_id: "AABBCCDDEEFF".to_string(),
            nickname: "Desk lamp".to_string(),
            model: "LMN-A19".to_string(),
            kind: DeviceKind::Bulb,
            is_online: true,
            is_on: true,
            bulb_class: Some(BulbClass::Plain),
            brightness: Some(Brightness::new(75).unwrap()),
            color_temperature: Some(ColorTemperature::new(3000).unwrap()),
            fan_level: None,
        };
        let text = snapshot.to_string();
        assert!(text.contains("Desk lamp"));
        assert!(text.contains("power=on"));
        assert!(text.contains("brightness=75%"));
        assert!(text.contains("temp=3000K"));
        assert!(!text.contains("speed="));
    }
}
