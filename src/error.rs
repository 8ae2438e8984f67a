// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for `homectl`.
//!
//! This module provides the error hierarchy for the crate: value
//! validation, device-registry resolution, command validation, and
//! platform (vendor cloud) failures.

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while resolving device names.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// The requested action or action value is invalid for a device.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Error occurred while talking to a vendor platform.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),

    /// Error occurred while fetching or caching solar times.
    #[error("solar lookup error: {0}")]
    Solar(#[from] SolarError),

    /// A per-device worker task failed to complete.
    #[error("device task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Errors related to value validation and constraints.
///
/// These errors occur when attempting to create constrained types
/// with invalid values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u16,
        /// Maximum allowed value.
        max: u16,
        /// The actual value that was provided.
        actual: u16,
    },
}

/// Errors related to resolving logical device names against the
/// environment-backed registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A named device has no registry entry.
    #[error("device {name} isn't defined - set environment variable {variable}")]
    UndefinedDevice {
        /// The logical device name that failed to resolve.
        name: String,
        /// The environment variable that was expected to hold it.
        variable: String,
    },

    /// A registry entry does not have the `family|kind|id` shape.
    #[error("registry entry for {name} is malformed: {value:?}")]
    MalformedEntry {
        /// The logical device name.
        name: String,
        /// The raw registry value.
        value: String,
    },

    /// An unknown API family token in a registry entry.
    #[error("{family} is not a known API family")]
    UnknownFamily {
        /// The offending family token.
        family: String,
    },

    /// An unknown device kind token in a registry entry.
    #[error("{kind} is not a known device kind")]
    UnknownKind {
        /// The offending kind token.
        kind: String,
    },

    /// No device names were supplied at all.
    #[error("device-names is a required field")]
    NoDevices,
}

/// Errors produced by batch validation of an action against a device list.
///
/// Validation happens before any network call; a single failure rejects
/// the whole batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No action was supplied.
    #[error("action is a required field")]
    MissingAction,

    /// The action token is not known or not permitted for the device kind.
    #[error("{action} is not a valid action for {device}")]
    InvalidAction {
        /// The offending action token.
        action: String,
        /// The device that rejected it.
        device: String,
    },

    /// The action requires a value but none was given.
    #[error("action-value is a required field")]
    MissingValue,

    /// The action value fails the type/range/token rules.
    #[error("{value} is not a valid {property} value")]
    InvalidValue {
        /// The offending value token.
        value: String,
        /// Human name of the property being set.
        property: &'static str,
    },
}

/// Errors related to vendor platform communication.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform rejected the credentials at login.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session or access token has expired.
    ///
    /// This is the one recoverable failure: the caller may recreate the
    /// client and retry.
    #[error("access token has expired")]
    ExpiredCredential,

    /// The platform reported an API-level error.
    #[error("platform API error {code}: {message}")]
    Api {
        /// Vendor error code.
        code: i64,
        /// Vendor error message.
        message: String,
    },

    /// The platform does not know the requested device id.
    #[error("device {0} not found on the platform")]
    DeviceNotFound(String),

    /// The platform has no such operation (e.g. fan speed on the bulb
    /// platform). Validation prevents this in normal use.
    #[error("the {family} platform does not support {operation}")]
    UnsupportedOperation {
        /// The platform family token.
        family: &'static str,
        /// Human name of the operation.
        operation: &'static str,
    },

    /// Credentials are missing from the environment.
    #[error("missing credential: set environment variable {0}")]
    MissingCredential(&'static str),

    /// Reading or writing the persisted session blob failed.
    #[error("session store error: {0}")]
    SessionStore(#[from] std::io::Error),

    /// The persisted session blob could not be decoded.
    #[error("session decode error: {0}")]
    SessionDecode(#[from] serde_json::Error),
}

/// Errors related to the sunrise/sunset lookup used by circadian
/// lighting.
#[derive(Debug, Error)]
pub enum SolarError {
    /// HTTP request to the solar times service failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading or writing the on-disk solar cache failed.
    #[error("solar cache error: {0}")]
    Cache(#[from] std::io::Error),

    /// The cached or fetched payload could not be decoded.
    #[error("solar decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// A timestamp in the service response could not be parsed.
    #[error("bad timestamp in solar response: {0}")]
    BadTimestamp(#[from] chrono::ParseError),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
