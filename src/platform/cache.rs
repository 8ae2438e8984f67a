// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Process-wide cache of authenticated platform clients.
//!
//! Logging in is by far the slowest part of an invocation, so sessions
//! are persisted to disk and reused across runs: the first `get` for a
//! family loads the persisted session if one exists (optimistically,
//! with no liveness probe), otherwise it performs a fresh login and
//! persists the result. Within a process each family logs in at most
//! once no matter how many devices use it.
//!
//! The session files are a cache, not a source of truth; deleting them
//! simply forces re-authentication. Each authentication attempt is
//! appended to `auth.log` with its duration and outcome.

use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::PlatformError;
use crate::platform::{BreezeClient, Client, Credentials, LumenClient, breeze, lumen};
use crate::registry::ApiFamily;

/// File name of the persisted Lumen session.
const LUMEN_SESSION_FILE: &str = "lumen_session.json";

/// File name of the persisted Breeze session.
const BREEZE_SESSION_FILE: &str = "breeze_session.json";

/// File name of the append-only authentication timing log.
const AUTH_LOG_FILE: &str = "auth.log";

/// Configuration for the client cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    state_dir: PathBuf,
    lumen_base_url: String,
    breeze_base_url: String,
    lumen_credentials: Option<Credentials>,
    breeze_credentials: Option<Credentials>,
}

impl CacheConfig {
    /// Creates a configuration with default base URLs.
    ///
    /// Credentials are read from the environment at login time unless
    /// overridden with [`CacheConfig::with_credentials`].
    #[must_use]
    pub fn new(state_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_dir: state_dir.into(),
            lumen_base_url: lumen::DEFAULT_BASE_URL.to_string(),
            breeze_base_url: breeze::DEFAULT_BASE_URL.to_string(),
            lumen_credentials: None,
            breeze_credentials: None,
        }
    }

    /// Overrides the Lumen API base URL.
    #[must_use]
    pub fn with_lumen_base_url(mut self, url: impl Into<String>) -> Self {
        self.lumen_base_url = url.into();
        self
    }

    /// Overrides the Breeze API base URL.
    #[must_use]
    pub fn with_breeze_base_url(mut self, url: impl Into<String>) -> Self {
        self.breeze_base_url = url.into();
        self
    }

    /// Supplies credentials for a family instead of reading the
    /// environment.
    #[must_use]
    pub fn with_credentials(mut self, family: ApiFamily, credentials: Credentials) -> Self {
        match family {
            ApiFamily::Lumen => self.lumen_credentials = Some(credentials),
            ApiFamily::Breeze => self.breeze_credentials = Some(credentials),
        }
        self
    }

    /// The directory holding session files and the auth log.
    #[must_use]
    pub fn state_dir(&self) -> &Path {
        &self.state_dir
    }
}

/// Outcome of one authentication attempt, recorded in the auth log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthOutcome {
    /// A persisted session was read from disk.
    Read,
    /// No usable session existed; a fresh login was performed.
    Created,
    /// An expired session was discarded and replaced by a fresh login.
    Expired,
}

impl AuthOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::Created => "CREATED",
            Self::Expired => "EXPIRED",
        }
    }
}

/// Per-family cache of authenticated clients.
///
/// The cache is the only shared mutable state in a run. Each family has
/// its own async mutex guarding its slot, so concurrent workers of an
/// expired family cannot race to recreate the client twice: the loser
/// of the race observes the winner's fresh handle and reuses it.
#[derive(Debug)]
pub struct ClientCache {
    config: CacheConfig,
    lumen: Mutex<Option<Arc<Client>>>,
    breeze: Mutex<Option<Arc<Client>>>,
}

impl ClientCache {
    /// Creates an empty cache; no login happens until first use.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            lumen: Mutex::new(None),
            breeze: Mutex::new(None),
        }
    }

    fn slot(&self, family: ApiFamily) -> &Mutex<Option<Arc<Client>>> {
        match family {
            ApiFamily::Lumen => &self.lumen,
            ApiFamily::Breeze => &self.breeze,
        }
    }

    fn session_path(&self, family: ApiFamily) -> PathBuf {
        let file = match family {
            ApiFamily::Lumen => LUMEN_SESSION_FILE,
            ApiFamily::Breeze => BREEZE_SESSION_FILE,
        };
        self.config.state_dir.join(file)
    }

    /// Returns the client for a family, creating it on first use.
    ///
    /// Order of preference: the in-memory handle, then a session
    /// persisted by an earlier run, then a fresh login.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if a fresh login is needed and fails.
    pub async fn get(&self, family: ApiFamily) -> Result<Arc<Client>, PlatformError> {
        let mut slot = self.slot(family).lock().await;
        if let Some(client) = slot.as_ref() {
            return Ok(Arc::clone(client));
        }

        let started = Instant::now();
        let (client, outcome) = match self.load_session(family) {
            Some(client) => (client, AuthOutcome::Read),
            None => {
                let client = self.login(family).await?;
                self.persist_session(&client)?;
                (client, AuthOutcome::Created)
            }
        };
        self.append_auth_log(Local::now(), started.elapsed(), outcome);
        info!(family = %family, outcome = outcome.as_str(), "client ready");

        let client = Arc::new(client);
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Replaces an expired client with a freshly logged-in one.
    ///
    /// `stale` is the handle the caller observed the expiry on. If the
    /// slot already holds a different handle, another worker recreated
    /// the client first and that handle is returned without logging in
    /// again.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError` if the fresh login fails.
    pub async fn recreate(
        &self,
        family: ApiFamily,
        stale: &Arc<Client>,
    ) -> Result<Arc<Client>, PlatformError> {
        let mut slot = self.slot(family).lock().await;
        if let Some(current) = slot.as_ref() {
            if !Arc::ptr_eq(current, stale) {
                debug!(family = %family, "client already recreated by a sibling worker");
                return Ok(Arc::clone(current));
            }
        }

        let started = Instant::now();
        let client = self.login(family).await?;
        self.persist_session(&client)?;
        self.append_auth_log(Local::now(), started.elapsed(), AuthOutcome::Expired);
        info!(family = %family, "expired client recreated");

        let client = Arc::new(client);
        *slot = Some(Arc::clone(&client));
        Ok(client)
    }

    fn load_session(&self, family: ApiFamily) -> Option<Client> {
        let path = self.session_path(family);
        let raw = fs::read_to_string(&path).ok()?;
        let client = match family {
            ApiFamily::Lumen => {
                let session = serde_json::from_str(&raw)
                    .inspect_err(|err| warn!(?path, %err, "ignoring undecodable session file"))
                    .ok()?;
                Client::Lumen(LumenClient::from_session(&self.config.lumen_base_url, session))
            }
            ApiFamily::Breeze => {
                let session = serde_json::from_str(&raw)
                    .inspect_err(|err| warn!(?path, %err, "ignoring undecodable session file"))
                    .ok()?;
                Client::Breeze(BreezeClient::from_session(
                    &self.config.breeze_base_url,
                    session,
                ))
            }
        };
        debug!(family = %family, ?path, "loaded persisted session");
        Some(client)
    }

    async fn login(&self, family: ApiFamily) -> Result<Client, PlatformError> {
        match family {
            ApiFamily::Lumen => {
                let credentials = match &self.config.lumen_credentials {
                    Some(credentials) => credentials.clone(),
                    None => Credentials::from_env(family)?,
                };
                let client = LumenClient::login(&self.config.lumen_base_url, &credentials).await?;
                Ok(Client::Lumen(client))
            }
            ApiFamily::Breeze => {
                let credentials = match &self.config.breeze_credentials {
                    Some(credentials) => credentials.clone(),
                    None => Credentials::from_env(family)?,
                };
                let client =
                    BreezeClient::login(&self.config.breeze_base_url, &credentials).await?;
                Ok(Client::Breeze(client))
            }
        }
    }

    fn persist_session(&self, client: &Client) -> Result<(), PlatformError> {
        fs::create_dir_all(&self.config.state_dir)?;
        let path = self.session_path(client.family());
        let blob = match client {
            Client::Lumen(client) => serde_json::to_string_pretty(client.session())?,
            Client::Breeze(client) => serde_json::to_string_pretty(client.session())?,
        };
        fs::write(&path, blob)?;
        debug!(?path, "persisted session");
        Ok(())
    }

    /// Appends one line to the auth timing log. Best effort: a logging
    /// failure never fails the operation that triggered it.
    fn append_auth_log(&self, now: DateTime<Local>, elapsed: Duration, outcome: AuthOutcome) {
        let line = format_log_line(now, elapsed, outcome);
        let result = fs::create_dir_all(&self.config.state_dir).and_then(|()| {
            fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.config.state_dir.join(AUTH_LOG_FILE))
                .and_then(|mut file| file.write_all(line.as_bytes()))
        });
        if let Err(err) = result {
            warn!(%err, "failed to append to auth log");
        }
    }
}

fn format_log_line(now: DateTime<Local>, elapsed: Duration, outcome: AuthOutcome) -> String {
    format!(
        "{}- {:.3} sec- {}\n",
        now.format("%m/%d/%Y %H:%M:%S"),
        elapsed.as_secs_f64(),
        outcome.as_str()
    )
}
