// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Concurrent fan-out of one command to many devices.
//!
//! One task per device, joined before returning: the process must not
//! exit while a device command is still in flight. Devices are fully
//! independent; a failure on one never cancels its siblings, so a batch
//! can partially succeed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::warn;

use crate::action::Command;
use crate::dispatch::dispatch;
use crate::error::{Error, PlatformError, Result};
use crate::platform::{ClientCache, DeviceSnapshot};
use crate::registry::DeviceDescriptor;

/// Attempt budget per device, including the first try.
pub const MAX_ATTEMPTS: u32 = 3;

/// The outcome of one device's dispatch, success or failure.
#[derive(Debug)]
pub struct DispatchReport {
    /// Logical device name.
    pub device: String,
    /// The result: a snapshot for `get`, `None` for other successful
    /// commands, or the error that ended this device's attempts.
    pub outcome: Result<Option<DeviceSnapshot>>,
}

impl DispatchReport {
    /// Whether this device's command succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Dispatches `command` to every device concurrently and waits for all
/// of them.
///
/// Each task runs the retry-wrapped dispatcher. Every device produces
/// exactly one report, in completion order.
pub async fn execute(
    cache: &Arc<ClientCache>,
    devices: &[DeviceDescriptor],
    command: Command,
) -> Vec<DispatchReport> {
    let mut tasks = JoinSet::new();
    let mut names = HashMap::new();

    for device in devices.iter().cloned() {
        let cache = Arc::clone(cache);
        let name = device.name.clone();
        let handle = tasks.spawn(async move {
            let outcome = run_with_recovery(&cache, &device, command).await;
            DispatchReport {
                device: device.name,
                outcome,
            }
        });
        names.insert(handle.id(), name);
    }

    let mut reports = Vec::with_capacity(devices.len());
    while let Some(joined) = tasks.join_next_with_id().await {
        match joined {
            Ok((_, report)) => reports.push(report),
            Err(err) => {
                // A panicked worker still gets a report so the caller
                // sees every device's outcome.
                let device = names
                    .get(&err.id())
                    .cloned()
                    .unwrap_or_else(|| "unknown".to_string());
                reports.push(DispatchReport {
                    device,
                    outcome: Err(Error::Task(err)),
                });
            }
        }
    }
    reports
}

/// Wraps one device's dispatch in a bounded retry loop.
///
/// Only an expired credential is retried: the family client is
/// discarded and recreated through the cache, which serializes
/// concurrent recreation. Any other error aborts immediately, and
/// exhaustion surfaces the final expiry error.
async fn run_with_recovery(
    cache: &ClientCache,
    device: &DeviceDescriptor,
    command: Command,
) -> Result<Option<DeviceSnapshot>> {
    let mut client = cache.get(device.family).await?;
    let mut attempt = 1;
    loop {
        match dispatch(client.as_ref(), device, command).await {
            Ok(outcome) => return Ok(outcome),
            Err(PlatformError::ExpiredCredential) if attempt < MAX_ATTEMPTS => {
                warn!(
                    device = %device.name,
                    attempt,
                    "credential expired, recreating client and retrying"
                );
                client = cache.recreate(device.family, &client).await?;
                attempt += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
}
