// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the Breeze cloud platform (fans and air purifiers).
//!
//! Breeze responses carry a `{code, msg, result}` envelope with code 0
//! for success. Code -11012 means the session token has expired and is
//! surfaced as [`PlatformError::ExpiredCredential`].

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlatformError;
use crate::platform::{Credentials, DeviceSnapshot, PlatformClient};
use crate::registry::DeviceKind;
use crate::types::{Brightness, ColorTemperature, FanSpeed};

/// Default base URL of the Breeze cloud API.
pub const DEFAULT_BASE_URL: &str = "https://api.breeze-air.com";

const CODE_OK: i64 = 0;
const CODE_TOKEN_EXPIRED: i64 = -11012;
const CODE_DEVICE_NOT_FOUND: i64 = -11201;

/// Persistable Breeze session: token plus account id, both required on
/// every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreezeSession {
    /// Session token.
    pub token: String,
    /// Account identifier issued at login.
    pub account_id: String,
}

/// Authenticated client for the Breeze platform.
#[derive(Debug)]
pub struct BreezeClient {
    http: reqwest::Client,
    base_url: String,
    session: BreezeSession,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: String,
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct DeviceResult {
    cid: String,
    device_name: String,
    model: String,
    connection_status: String,
    device_status: String,
    fan_level: Option<u8>,
}

impl BreezeClient {
    /// Logs in with the given credentials and returns a fresh client.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::AuthenticationFailed` if the platform
    /// rejects the credentials, or an HTTP error if the request fails.
    pub async fn login(base_url: &str, credentials: &Credentials) -> Result<Self, PlatformError> {
        debug!(base_url, "logging in to breeze");
        let http = reqwest::Client::new();
        let response = http
            .post(format!("{base_url}/v1/login"))
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        let envelope: Envelope<LoginResult> = response.json().await?;
        if envelope.code != CODE_OK {
            return Err(PlatformError::AuthenticationFailed(envelope.msg));
        }
        let result = envelope
            .result
            .ok_or_else(|| PlatformError::AuthenticationFailed("empty login response".into()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            session: BreezeSession {
                token: result.token,
                account_id: result.account_id,
            },
        })
    }

    /// Rebuilds a client from a persisted session without logging in.
    #[must_use]
    pub fn from_session(base_url: &str, session: BreezeSession) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            session,
        }
    }

    /// Returns the session for persistence.
    #[must_use]
    pub fn session(&self) -> &BreezeSession {
        &self.session
    }

    async fn put_command(&self, path: &str, body: serde_json::Value) -> Result<(), PlatformError> {
        let response = self
            .http
            .put(format!("{}{path}", self.base_url))
            .header("tk", &self.session.token)
            .header("accountId", &self.session.account_id)
            .json(&body)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlatformError::ExpiredCredential);
        }
        let envelope: Envelope<serde_json::Value> = response.json().await?;
        Self::check(envelope.code, envelope.msg)
    }

    fn check(code: i64, msg: String) -> Result<(), PlatformError> {
        match code {
            CODE_OK => Ok(()),
            CODE_TOKEN_EXPIRED => Err(PlatformError::ExpiredCredential),
            code => Err(PlatformError::Api { code, message: msg }),
        }
    }
}

impl PlatformClient for BreezeClient {
    async fn device_info(&self, external_id: &str) -> Result<DeviceSnapshot, PlatformError> {
        debug!(external_id, "fetching breeze device info");
        let response = self
            .http
            .get(format!("{}/v1/devices/{external_id}", self.base_url))
            .header("tk", &self.session.token)
            .header("accountId", &self.session.account_id)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlatformError::ExpiredCredential);
        }

        let envelope: Envelope<DeviceResult> = response.json().await?;
        if envelope.code == CODE_DEVICE_NOT_FOUND {
            return Err(PlatformError::DeviceNotFound(external_id.to_string()));
        }
        Self::check(envelope.code, envelope.msg)?;
        let result = envelope
            .result
            .ok_or_else(|| PlatformError::DeviceNotFound(external_id.to_string()))?;

        Ok(DeviceSnapshot {
            external_id: result.cid,
            nickname: result.device_name,
            model: result.model,
            kind: DeviceKind::Fan,
            is_online: result.connection_status == "online",
            is_on: result.device_status == "on",
            bulb_class: None,
            brightness: None,
            color_temperature: None,
            fan_level: result.fan_level.map(FanSpeed::clamped),
        })
    }

    async fn turn_on(&self, device: &DeviceSnapshot) -> Result<(), PlatformError> {
        self.put_command(
            &format!("/v1/devices/{}/status", device.external_id),
            serde_json::json!({ "status": "on" }),
        )
        .await
    }

    async fn turn_off(&self, device: &DeviceSnapshot) -> Result<(), PlatformError> {
        self.put_command(
            &format!("/v1/devices/{}/status", device.external_id),
            serde_json::json!({ "status": "off" }),
        )
        .await
    }

    async fn set_brightness(
        &self,
        _device: &DeviceSnapshot,
        _value: Brightness,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::UnsupportedOperation {
            family: "breeze",
            operation: "brightness",
        })
    }

    async fn set_color_temperature(
        &self,
        _device: &DeviceSnapshot,
        _value: ColorTemperature,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::UnsupportedOperation {
            family: "breeze",
            operation: "color temperature",
        })
    }

    async fn set_fan_speed(
        &self,
        device: &DeviceSnapshot,
        value: FanSpeed,
    ) -> Result<(), PlatformError> {
        // Changing the speed deliberately leaves the power state alone.
        self.put_command(
            &format!("/v1/devices/{}/fan-speed", device.external_id),
            serde_json::json!({ "level": value.value() }),
        )
        .await
    }
}
