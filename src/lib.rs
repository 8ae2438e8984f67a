// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `homectl` - control smart home devices across two cloud platforms.
//!
//! This crate drives smart plugs, bulbs, and fans from the command line.
//! Devices are declared through environment variables, actions fan out
//! concurrently to every named device, and authenticated platform
//! sessions are cached on disk so repeated invocations stay fast.
//!
//! # Supported Features
//!
//! - **Power control**: on, off, toggle for plugs, bulbs, and fans
//! - **Bulb control**: brightness and color temperature, absolute or
//!   relative (`+`/`-` one interval step)
//! - **Fan control**: speed levels 1-3, or `cycle` to advance with wrap
//! - **Diagnostics**: `get` prints a normalized device snapshot
//! - **Circadian lighting**: a companion command that follows the sun
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use homectl::action::{resolve_alias, validate};
//! use homectl::executor::execute;
//! use homectl::platform::{CacheConfig, ClientCache};
//! use homectl::registry::resolve_devices;
//!
//! #[tokio::main]
//! async fn main() -> homectl::Result<()> {
//!     // "warm" expands to setting color temperature 3000 K.
//!     let (action, value) = resolve_alias("warm", None);
//!
//!     let devices = resolve_devices("litetop,litebottom", |key| std::env::var(key).ok())?;
//!     let command = validate(&devices, Some(action.as_str()), value.as_deref())?;
//!
//!     let cache = Arc::new(ClientCache::new(CacheConfig::new("/var/lib/homectl")));
//!     for report in execute(&cache, &devices, command).await {
//!         if let Err(err) = report.outcome {
//!             eprintln!("{}: {err}", report.device);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod circadian;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod platform;
pub mod registry;
pub mod types;

pub use action::{Command, resolve_alias, validate};
pub use error::{
    Error, PlatformError, RegistryError, Result, SolarError, ValidationError, ValueError,
};
pub use executor::{DispatchReport, execute};
pub use platform::{CacheConfig, Client, ClientCache, DeviceSnapshot, PlatformClient};
pub use registry::{ApiFamily, DeviceDescriptor, DeviceKind, resolve_devices};
pub use types::{Brightness, ColorTemperature, FanSpeed};
