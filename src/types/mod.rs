// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Constrained value types for device properties.
//!
//! Each type enforces its platform range at construction, so a value that
//! exists is always legal to send. Relative `+`/`-` nudges move by one
//! interval step (one fifth of the range) and clamp at the bounds.

mod brightness;
mod color_temperature;
mod fan_speed;

pub use brightness::Brightness;
pub use color_temperature::ColorTemperature;
pub use fan_speed::FanSpeed;
