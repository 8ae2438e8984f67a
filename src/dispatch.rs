// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Executes one validated command against one device.
//!
//! Dispatch always begins by fetching the device's live state: toggle
//! and the relative `+`/`-` adjustments need the current values, and
//! caching device objects across invocations proved worthless for
//! exactly that reason.

use tracing::{debug, info};

use crate::action::Command;
use crate::error::PlatformError;
use crate::platform::{BulbClass, DeviceSnapshot, PlatformClient};
use crate::registry::DeviceDescriptor;
use crate::types::{Brightness, ColorTemperature, FanSpeed};

/// Runs `command` against `device` through `client`.
///
/// Returns the fetched snapshot for `get`, `None` for every other
/// command.
///
/// Kind-specific behavior:
/// - `toggle` inverts the power state read from the snapshot.
/// - A plain (non-color) bulb that is off is turned on before a
///   brightness set, because brightness alone does not wake it.
/// - A color bulb that is off silently skips a color temperature set;
///   sending it would force the bulb on. A plain bulb accepts it off.
/// - Fan speed changes never turn the fan on; `cycle` advances one
///   level, wrapping from the top.
///
/// # Errors
///
/// Returns `PlatformError` from the state fetch or the command itself.
/// `ExpiredCredential` is recoverable by the caller; everything else is
/// terminal for this device.
pub async fn dispatch<C: PlatformClient>(
    client: &C,
    device: &DeviceDescriptor,
    command: Command,
) -> Result<Option<DeviceSnapshot>, PlatformError> {
    debug!(device = %device.name, ?command, "dispatching");
    let snapshot = client.device_info(&device.external_id).await?;

    match command {
        Command::On => client.turn_on(&snapshot).await?,
        Command::Off => client.turn_off(&snapshot).await?,
        Command::Toggle => {
            if snapshot.is_on {
                client.turn_off(&snapshot).await?;
            } else {
                client.turn_on(&snapshot).await?;
            }
        }
        Command::Get => return Ok(Some(snapshot)),
        Command::SetBrightness(setting) => {
            if snapshot.bulb_class == Some(BulbClass::Plain) && !snapshot.is_on {
                client.turn_on(&snapshot).await?;
            }
            // Bulbs always report a brightness; the floor only matters
            // if the platform omitted it.
            let current = snapshot.brightness.unwrap_or(Brightness::MIN);
            let target = setting.resolve(current);
            info!(device = %device.name, %current, %target, "setting brightness");
            client.set_brightness(&snapshot, target).await?;
        }
        Command::SetColorTemperature(setting) => {
            if snapshot.bulb_class == Some(BulbClass::Color) && !snapshot.is_on {
                info!(
                    device = %device.name,
                    "color bulb is off, skipping color temperature change"
                );
                return Ok(None);
            }
            let current = snapshot.color_temperature.unwrap_or(ColorTemperature::MIN);
            let target = setting.resolve(current);
            info!(device = %device.name, %current, %target, "setting color temperature");
            client.set_color_temperature(&snapshot, target).await?;
        }
        Command::SetFanSpeed(setting) => {
            let current = snapshot.fan_level.unwrap_or(FanSpeed::MIN);
            let target = setting.resolve(current);
            info!(device = %device.name, %current, %target, "setting fan speed");
            client.set_fan_speed(&snapshot, target).await?;
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{BrightnessSetting, SpeedSetting, TemperatureSetting};
    use crate::registry::{ApiFamily, DeviceKind};
    use std::sync::Mutex;

    /// Records every platform call so tests can assert exact command
    /// sequences without a server.
    struct RecordingClient {
        snapshot: DeviceSnapshot,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingClient {
        fn new(snapshot: DeviceSnapshot) -> Self {
            Self {
                snapshot,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl PlatformClient for RecordingClient {
        async fn device_info(&self, _external_id: &str) -> Result<DeviceSnapshot, PlatformError> {
            self.record("info".to_string());
            Ok(self.snapshot.clone())
        }

        async fn turn_on(&self, _device: &DeviceSnapshot) -> Result<(), PlatformError> {
            self.record("on".to_string());
            Ok(())
        }

        async fn turn_off(&self, _device: &DeviceSnapshot) -> Result<(), PlatformError> {
            self.record("off".to_string());
            Ok(())
        }

        async fn set_brightness(
            &self,
            _device: &DeviceSnapshot,
            value: Brightness,
        ) -> Result<(), PlatformError> {
            self.record(format!("brightness={}", value.value()));
            Ok(())
        }

        async fn set_color_temperature(
            &self,
            _device: &DeviceSnapshot,
            value: ColorTemperature,
        ) -> Result<(), PlatformError> {
            self.record(format!("temp={}", value.value()));
            Ok(())
        }

        async fn set_fan_speed(
            &self,
            _device: &DeviceSnapshot,
            value: FanSpeed,
        ) -> Result<(), PlatformError> {
            self.record(format!("speed={}", value.value()));
            Ok(())
        }
    }

    fn bulb(class: BulbClass, is_on: bool, brightness: u8, temp: u16) -> DeviceSnapshot {
        DeviceSnapshot {
            external_id: "AABBCCDDEEFF".to_string(),
            nickname: "bulb1".to_string(),
            model: "LMN-A19".to_string(),
            kind: DeviceKind::Bulb,
            is_online: true,
            is_on,
            bulb_class: Some(class),
            brightness: Some(Brightness::new(brightness).unwrap()),
            color_temperature: Some(ColorTemperature::new(temp).unwrap()),
            fan_level: None,
        }
    }

    fn fan(is_on: bool, level: u8) -> DeviceSnapshot {
        DeviceSnapshot {
            external_id: "cid-42".to_string(),
            nickname: "fan1".to_string(),
            model: "BRZ-200S".to_string(),
            kind: DeviceKind::Fan,
            is_online: true,
            is_on,
            bulb_class: None,
            brightness: None,
            color_temperature: None,
            fan_level: Some(FanSpeed::new(level).unwrap()),
        }
    }

    fn descriptor(name: &str, family: ApiFamily, kind: DeviceKind) -> DeviceDescriptor {
        DeviceDescriptor {
            name: name.to_string(),
            family,
            kind,
            external_id: format!("id-{name}"),
        }
    }

    fn bulb_descriptor() -> DeviceDescriptor {
        descriptor("bulb1", ApiFamily::Lumen, DeviceKind::Bulb)
    }

    fn fan_descriptor() -> DeviceDescriptor {
        descriptor("fan1", ApiFamily::Breeze, DeviceKind::Fan)
    }

    #[tokio::test]
    async fn toggle_inverts_fetched_state() {
        let client = RecordingClient::new(bulb(BulbClass::Plain, true, 50, 3000));
        dispatch(&client, &bulb_descriptor(), Command::Toggle)
            .await
            .unwrap();
        assert_eq!(client.calls(), ["info", "off"]);

        let client = RecordingClient::new(bulb(BulbClass::Plain, false, 50, 3000));
        dispatch(&client, &bulb_descriptor(), Command::Toggle)
            .await
            .unwrap();
        assert_eq!(client.calls(), ["info", "on"]);
    }

    #[tokio::test]
    async fn get_returns_snapshot_without_commands() {
        let client = RecordingClient::new(fan(true, 2));
        let snapshot = dispatch(&client, &fan_descriptor(), Command::Get)
            .await
            .unwrap();
        assert!(snapshot.is_some());
        assert_eq!(client.calls(), ["info"]);
    }

    #[tokio::test]
    async fn relative_brightness_clamps_at_max() {
        // Current 90, step 19: clamps to 100.
        let client = RecordingClient::new(bulb(BulbClass::Plain, true, 90, 3000));
        dispatch(
            &client,
            &bulb_descriptor(),
            Command::SetBrightness(BrightnessSetting::Up),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "brightness=100"]);
    }

    #[tokio::test]
    async fn brightness_wakes_plain_bulb_that_is_off() {
        let client = RecordingClient::new(bulb(BulbClass::Plain, false, 40, 3000));
        dispatch(
            &client,
            &bulb_descriptor(),
            Command::SetBrightness(BrightnessSetting::Absolute(Brightness::new(25).unwrap())),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "on", "brightness=25"]);
    }

    #[tokio::test]
    async fn brightness_does_not_wake_color_bulb() {
        let client = RecordingClient::new(bulb(BulbClass::Color, false, 40, 3000));
        dispatch(
            &client,
            &bulb_descriptor(),
            Command::SetBrightness(BrightnessSetting::Absolute(Brightness::new(25).unwrap())),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "brightness=25"]);
    }

    #[tokio::test]
    async fn color_temperature_skipped_on_off_color_bulb() {
        let client = RecordingClient::new(bulb(BulbClass::Color, false, 40, 3000));
        dispatch(
            &client,
            &bulb_descriptor(),
            Command::SetColorTemperature(TemperatureSetting::Absolute(
                ColorTemperature::new(3800).unwrap(),
            )),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info"]);
    }

    #[tokio::test]
    async fn color_temperature_applies_to_off_plain_bulb() {
        let client = RecordingClient::new(bulb(BulbClass::Plain, false, 40, 3000));
        dispatch(
            &client,
            &bulb_descriptor(),
            Command::SetColorTemperature(TemperatureSetting::Absolute(
                ColorTemperature::new(3800).unwrap(),
            )),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "temp=3800"]);
    }

    #[tokio::test]
    async fn relative_temperature_steps_from_current() {
        let client = RecordingClient::new(bulb(BulbClass::Plain, true, 40, 3000));
        dispatch(
            &client,
            &bulb_descriptor(),
            Command::SetColorTemperature(TemperatureSetting::Up),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "temp=3760"]);
    }

    #[tokio::test]
    async fn fan_cycle_wraps_without_turning_on() {
        let client = RecordingClient::new(fan(false, 3));
        dispatch(
            &client,
            &fan_descriptor(),
            Command::SetFanSpeed(SpeedSetting::Cycle),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "speed=1"]);
    }

    #[tokio::test]
    async fn absolute_fan_speed_sets_directly() {
        let client = RecordingClient::new(fan(true, 1));
        dispatch(
            &client,
            &fan_descriptor(),
            Command::SetFanSpeed(SpeedSetting::Absolute(FanSpeed::new(3).unwrap())),
        )
        .await
        .unwrap();
        assert_eq!(client.calls(), ["info", "speed=3"]);
    }
}
