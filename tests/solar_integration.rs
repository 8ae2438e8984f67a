// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the solar times lookup and its disk cache.

use chrono::{Datelike, Duration, Local, NaiveTime, TimeZone, Utc};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use homectl::circadian::{SolarClient, solar_times};

fn solar_body(sunrise: &str, noon: &str, twilight_end: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "results": {
            "sunrise": sunrise,
            "solar_noon": noon,
            "sunset": "ignored",
            "civil_twilight_end": twilight_end,
        }
    })
}

#[tokio::test]
async fn fetches_and_parses_solar_times() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/json"))
        .and(query_param("lat", "40.33"))
        .and(query_param("lng", "-80.33"))
        .and(query_param("formatted", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(solar_body(
            "2026-06-01T10:00:00+00:00",
            "2026-06-01T17:00:00+00:00",
            "2026-06-01T23:30:00+00:00",
        )))
        .mount(&server)
        .await;

    let client = SolarClient::new(server.uri());
    let times = client
        .fetch(40.33, -80.33, chrono::NaiveDate::from_ymd_opt(2026, 6, 1).unwrap())
        .await
        .unwrap();

    assert_eq!(
        times.sunrise,
        Utc.with_ymd_and_hms(2026, 6, 1, 10, 0, 0).unwrap()
    );
    assert_eq!(
        times.solar_noon,
        Utc.with_ymd_and_hms(2026, 6, 1, 17, 0, 0).unwrap()
    );
    // Civil twilight end is used as the effective sunset.
    assert_eq!(
        times.sunset,
        Utc.with_ymd_and_hms(2026, 6, 1, 23, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn same_day_lookups_hit_the_cache() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    let cache_path = state.path().join("solar_times.json");

    // Sunrise a little after local midnight today, so the cached entry
    // stays fresh for the rest of the test.
    let now = Local::now();
    let sunrise = now
        .with_time(NaiveTime::from_hms_opt(6, 0, 0).unwrap())
        .single()
        .unwrap();
    let noon = sunrise + Duration::hours(6);
    let twilight = sunrise + Duration::hours(14);

    Mock::given(method("GET"))
        .and(path("/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(solar_body(
            &sunrise.to_rfc3339(),
            &noon.to_rfc3339(),
            &twilight.to_rfc3339(),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = SolarClient::new(server.uri());
    let first = solar_times(&client, &cache_path, 40.33, -80.33, now)
        .await
        .unwrap();
    assert!(cache_path.exists());

    // Second lookup the same day: served from disk, no second request.
    let second = solar_times(&client, &cache_path, 40.33, -80.33, now)
        .await
        .unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn stale_cache_triggers_refetch() {
    let server = MockServer::start().await;
    let state = tempfile::tempdir().unwrap();
    let cache_path = state.path().join("solar_times.json");

    let now = Local::now();
    let yesterday_sunrise = now - Duration::days(1);
    let stale = serde_json::json!({
        "sunrise": yesterday_sunrise.with_timezone(&Utc),
        "solar_noon": yesterday_sunrise.with_timezone(&Utc),
        "sunset": yesterday_sunrise.with_timezone(&Utc),
    });
    std::fs::write(&cache_path, serde_json::to_string(&stale).unwrap()).unwrap();

    let fresh_sunrise = now
        .with_time(NaiveTime::from_hms_opt(6, 0, 0).unwrap())
        .single()
        .unwrap();
    Mock::given(method("GET"))
        .and(path("/json"))
        .and(query_param("date", format!(
            "{:04}-{:02}-{:02}",
            now.year(),
            now.month(),
            now.day()
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(solar_body(
            &fresh_sunrise.to_rfc3339(),
            &(fresh_sunrise + Duration::hours(6)).to_rfc3339(),
            &(fresh_sunrise + Duration::hours(14)).to_rfc3339(),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = SolarClient::new(server.uri());
    let times = solar_times(&client, &cache_path, 40.33, -80.33, now)
        .await
        .unwrap();
    assert_eq!(times.sunrise, fresh_sunrise.with_timezone(&Utc));
}
