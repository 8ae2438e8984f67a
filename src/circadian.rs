// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Circadian lighting: a color temperature that follows the sun.
//!
//! The day is split into four phases by sunrise, solar noon, and sunset
//! (civil twilight end is used as "sunset"; it lands about half an hour
//! later and fades the evening more gently):
//!
//! - before sunrise: a moderate 4000 K morning start
//! - sunrise to solar noon: linear ramp up to 6500 K
//! - solar noon to sunset: linear descent down to 2700 K
//! - after sunset: 2700 K
//!
//! Solar times come from the sunrise-sunset.org API and are cached on
//! disk for a day, so the usual cron-driven invocation hits the network
//! once per morning.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SolarError;
use crate::types::ColorTemperature;

/// Default base URL of the solar times service.
pub const DEFAULT_BASE_URL: &str = "https://api.sunrise-sunset.org";

/// Color temperature used before sunrise, in Kelvin.
///
/// Deliberately warmer than full daylight so pre-dawn hours are not
/// harsh, but cooler than the evening floor.
pub const MORNING_START_K: u16 = 4000;

/// The three solar instants that shape the day's temperature curve.
///
/// `sunset` actually holds civil twilight end, see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarTimes {
    /// Sunrise.
    pub sunrise: DateTime<Utc>,
    /// Solar noon.
    pub solar_noon: DateTime<Utc>,
    /// End of civil twilight, used as the effective sunset.
    pub sunset: DateTime<Utc>,
}

/// Computes the color temperature for a moment in the day.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use homectl::circadian::{SolarTimes, day_phase_temperature};
///
/// let times = SolarTimes {
///     sunrise: Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap(),
///     solar_noon: Utc.with_ymd_and_hms(2026, 6, 1, 17, 0, 0).unwrap(),
///     sunset: Utc.with_ymd_and_hms(2026, 6, 1, 23, 0, 0).unwrap(),
/// };
/// let before_dawn = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
/// assert_eq!(day_phase_temperature(before_dawn, &times).value(), 4000);
/// ```
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn day_phase_temperature(now: DateTime<Utc>, times: &SolarTimes) -> ColorTemperature {
    let max = f64::from(ColorTemperature::MAX.value());
    let min = f64::from(ColorTemperature::MIN.value());
    let morning_start = f64::from(MORNING_START_K);

    let kelvin = if now < times.sunrise {
        morning_start
    } else if now < times.solar_noon {
        let frac = fraction_elapsed(times.sunrise, times.solar_noon, now);
        morning_start + ((max - morning_start) * frac).round()
    } else if now < times.sunset {
        let frac = fraction_elapsed(times.solar_noon, times.sunset, now);
        max - ((max - min) * frac).round()
    } else {
        min
    };

    // The arithmetic above stays within [min, max]; clamping also
    // absorbs the cast.
    ColorTemperature::clamped(kelvin as u16)
}

fn fraction_elapsed(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let duration = (end - start).num_seconds();
    if duration <= 0 {
        return 1.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let frac = (now - start).num_seconds() as f64 / duration as f64;
    frac.clamp(0.0, 1.0)
}

#[derive(Debug, Deserialize)]
struct SolarResponse {
    results: SolarResults,
}

#[derive(Debug, Deserialize)]
struct SolarResults {
    sunrise: String,
    solar_noon: String,
    civil_twilight_end: String,
}

/// HTTP client for the solar times service.
#[derive(Debug, Clone)]
pub struct SolarClient {
    http: reqwest::Client,
    base_url: String,
}

impl SolarClient {
    /// Creates a client against the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Fetches solar times for a location and date.
    ///
    /// # Errors
    ///
    /// Returns `SolarError` if the request fails or the response cannot
    /// be decoded.
    pub async fn fetch(
        &self,
        latitude: f64,
        longitude: f64,
        date: NaiveDate,
    ) -> Result<SolarTimes, SolarError> {
        info!(latitude, longitude, %date, "fetching solar times");
        let response: SolarResponse = self
            .http
            .get(format!("{}/json", self.base_url))
            .query(&[
                ("lat", latitude.to_string()),
                ("lng", longitude.to_string()),
                ("formatted", "0".to_string()),
                ("date", date.to_string()),
            ])
            .send()
            .await?
            .json()
            .await?;

        Ok(SolarTimes {
            sunrise: parse_instant(&response.results.sunrise)?,
            solar_noon: parse_instant(&response.results.solar_noon)?,
            sunset: parse_instant(&response.results.civil_twilight_end)?,
        })
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, SolarError> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

/// Returns the solar times for `now`'s date, consulting the disk cache
/// first.
///
/// The cache is reused as long as its sunrise is not older than today's
/// local midnight; the first run of a new day refetches and rewrites
/// it. A missing or undecodable cache file just means a fetch.
///
/// # Errors
///
/// Returns `SolarError` if a fetch is needed and fails, or if the fresh
/// result cannot be written back.
pub async fn solar_times(
    client: &SolarClient,
    cache_path: &Path,
    latitude: f64,
    longitude: f64,
    now: DateTime<Local>,
) -> Result<SolarTimes, SolarError> {
    let midnight = now
        .with_time(NaiveTime::MIN)
        .single()
        .unwrap_or(now);

    if let Some(cached) = load_cache(cache_path) {
        if cached.sunrise.with_timezone(&Local) >= midnight {
            debug!(?cache_path, "using cached solar times");
            return Ok(cached);
        }
    }

    let times = client.fetch(latitude, longitude, now.date_naive()).await?;
    if let Some(parent) = cache_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(cache_path, serde_json::to_string_pretty(&times)?)?;
    Ok(times)
}

fn load_cache(path: &Path) -> Option<SolarTimes> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn times() -> SolarTimes {
        SolarTimes {
            sunrise: Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap(),
            solar_noon: Utc.with_ymd_and_hms(2026, 6, 1, 17, 0, 0).unwrap(),
            sunset: Utc.with_ymd_and_hms(2026, 6, 1, 23, 0, 0).unwrap(),
        }
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn before_sunrise_uses_morning_start() {
        assert_eq!(day_phase_temperature(at(5, 0), &times()).value(), 4000);
    }

    #[test]
    fn morning_ramps_up_linearly() {
        // Halfway between sunrise and solar noon: 4000 + 2500/2.
        assert_eq!(day_phase_temperature(at(13, 30), &times()).value(), 5250);
    }

    #[test]
    fn at_sunrise_starts_at_morning_start() {
        assert_eq!(day_phase_temperature(at(10, 0), &times()).value(), 4000);
    }

    #[test]
    fn afternoon_descends_linearly() {
        // Halfway between solar noon and sunset: 6500 - 3800/2.
        assert_eq!(day_phase_temperature(at(20, 0), &times()).value(), 4600);
    }

    #[test]
    fn after_sunset_holds_warm_floor() {
        assert_eq!(day_phase_temperature(at(23, 30), &times()).value(), 2700);
    }

    #[test]
    fn degenerate_phase_saturates() {
        let degenerate = SolarTimes {
            sunrise: at(10, 0),
            solar_noon: at(10, 0),
            sunset: at(10, 0),
        };
        // now == all three instants: falls through to the warm floor.
        assert_eq!(day_phase_temperature(at(10, 0), &degenerate).value(), 2700);
    }

    #[test]
    fn output_always_in_bulb_range() {
        let times = times();
        for hour in 0..24 {
            let value = day_phase_temperature(at(hour, 17), &times).value();
            assert!((2700..=6500).contains(&value));
        }
    }
}
