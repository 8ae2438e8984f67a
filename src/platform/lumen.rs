// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client for the Lumen cloud platform (smart bulbs and plugs).
//!
//! The Lumen API wraps every response in a `{code, msg, data}` envelope.
//! Code 1 is success; code 2001 means the access token has expired and
//! is surfaced as [`PlatformError::ExpiredCredential`] so the retry
//! layer can recover.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlatformError;
use crate::platform::{BulbClass, Credentials, DeviceSnapshot, PlatformClient};
use crate::registry::DeviceKind;
use crate::types::{Brightness, ColorTemperature, FanSpeed};

/// Default base URL of the Lumen cloud API.
pub const DEFAULT_BASE_URL: &str = "https://api.lumen-home.com";

const CODE_OK: i64 = 1;
const CODE_TOKEN_EXPIRED: i64 = 2001;
const CODE_DEVICE_NOT_FOUND: i64 = 3001;

/// Persistable Lumen session: the bearer token obtained at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LumenSession {
    /// Bearer token for authenticated requests.
    pub access_token: String,
}

/// Authenticated client for the Lumen platform.
#[derive(Debug)]
pub struct LumenClient {
    http: reqwest::Client,
    base_url: String,
    session: LumenSession,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    msg: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    access_token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireKind {
    Plug,
    Bulb,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum WireClass {
    Plain,
    Color,
}

#[derive(Debug, Deserialize)]
struct DeviceData {
    mac: String,
    nickname: String,
    model: String,
    kind: WireKind,
    is_online: bool,
    is_on: bool,
    class: Option<WireClass>,
    brightness: Option<u8>,
    color_temp: Option<u16>,
}

impl LumenClient {
    /// Logs in with the given credentials and returns a fresh client.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::AuthenticationFailed` if the platform
    /// rejects the credentials, or an HTTP error if the request fails.
    pub async fn login(base_url: &str, credentials: &Credentials) -> Result<Self, PlatformError> {
        debug!(base_url, "logging in to lumen");
        let http = reqwest::Client::new();
        let response = http
            .post(format!("{base_url}/v1/user/login"))
            .json(&serde_json::json!({
                "email": credentials.email,
                "password": credentials.password,
            }))
            .send()
            .await?;

        let envelope: Envelope<LoginData> = response.json().await?;
        if envelope.code != CODE_OK {
            return Err(PlatformError::AuthenticationFailed(envelope.msg));
        }
        let data = envelope
            .data
            .ok_or_else(|| PlatformError::AuthenticationFailed("empty login response".into()))?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            session: LumenSession {
                access_token: data.access_token,
            },
        })
    }

    /// Rebuilds a client from a persisted session without logging in.
    ///
    /// The session is treated as valid until a request reports it
    /// expired.
    #[must_use]
    pub fn from_session(base_url: &str, session: LumenSession) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.to_string(),
            session,
        }
    }

    /// Returns the session for persistence.
    #[must_use]
    pub fn session(&self) -> &LumenSession {
        &self.session
    }

    async fn post_command(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(), PlatformError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(&self.session.access_token)
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

impl PlatformClient for LumenClient {
    async fn device_info(&self, external_id: &str) -> Result<DeviceSnapshot, PlatformError> {
        debug!(external_id, "fetching lumen device info");
        let response = self
            .http
            .get(format!("{}/v1/devices/{external_id}", self.base_url))
            .bearer_auth(&self.session.access_token)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(PlatformError::ExpiredCredential);
        }

        let envelope: Envelope<DeviceData> = response.json().await?;
        if envelope.code == CODE_DEVICE_NOT_FOUND {
            return Err(PlatformError::DeviceNotFound(external_id.to_string()));
        }
        Self::check(envelope.code, envelope.msg)?;
        let data = envelope
            .data
            .ok_or_else(|| PlatformError::DeviceNotFound(external_id.to_string()))?;

        Ok(DeviceSnapshot {
            external_id: data.mac,
            nickname: data.nickname,
            model: data.model,
            kind: match data.kind {
                WireKind::Plug => DeviceKind::Plug,
                WireKind::Bulb => DeviceKind::Bulb,
            },
            is_online: data.is_online,
            is_on: data.is_on,
            bulb_class: data.class.map(|class| match class {
                WireClass::Plain => BulbClass::Plain,
                WireClass::Color => BulbClass::Color,
            }),
            brightness: data.brightness.map(Brightness::clamped),
            color_temperature: data.color_temp.map(ColorTemperature::clamped),
            fan_level: None,
        })
    }

    async fn turn_on(&self, device: &DeviceSnapshot) -> Result<(), PlatformError> {
        self.post_command(
            &format!("/v1/devices/{}/power", device.external_id),
            serde_json::json!({ "state": "on", "model": device.model }),
        )
        .await
    }

    async fn turn_off(&self, device: &DeviceSnapshot) -> Result<(), PlatformError> {
        self.post_command(
            &format!("/v1/devices/{}/power", device.external_id),
            serde_json::json!({ "state": "off", "model": device.model }),
        )
        .await
    }

    async fn set_brightness(
        &self,
        device: &DeviceSnapshot,
        value: Brightness,
    ) -> Result<(), PlatformError> {
        self.post_command(
            &format!("/v1/devices/{}/brightness", device.external_id),
            serde_json::json!({ "value": value.value(), "model": device.model }),
        )
        .await
    }

    async fn set_color_temperature(
        &self,
        device: &DeviceSnapshot,
        value: ColorTemperature,
    ) -> Result<(), PlatformError> {
        self.post_command(
            &format!("/v1/devices/{}/color-temperature", device.external_id),
            serde_json::json!({ "value": value.value(), "model": device.model }),
        )
        .await
    }

    async fn set_fan_speed(
        &self,
        _device: &DeviceSnapshot,
        _value: FanSpeed,
    ) -> Result<(), PlatformError> {
        Err(PlatformError::UnsupportedOperation {
            family: "lumen",
            operation: "fan speed",
        })
    }
}
