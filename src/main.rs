// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `homectl` command-line interface.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use chrono::{DateTime, Local, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use homectl::action::{resolve_alias, validate};
use homectl::circadian::{self, SolarClient};
use homectl::executor::execute;
use homectl::platform::{CacheConfig, ClientCache};
use homectl::registry::resolve_devices;

/// Detailed usage printed after validation failures and under
/// `homectl run --help`.
const RUN_HELP: &str = "\
Device names come from environment variables:
    HA_DEVICE_<NAME>=\"<family>|<kind>|<device-id>\"
  e.g.
    HA_DEVICE_FAN=\"breeze|fan|cid-0123456\"
    HA_DEVICE_LITETOP=\"lumen|bulb|AABBCCDDEEFF\"

Actions per device kind:
  plugs:  on|off|toggle|get
  bulbs:  on|off|toggle|get|bright|temp
            'bright' takes 1-100, or +|- to nudge one step
            'temp' takes 2700-6500, or +|- to nudge one step
  fans:   on|off|toggle|get|speed
            'speed' takes 1-3, or 'cycle' to advance with wrap
            setting the speed does NOT turn the fan on

Aliases:
  n              =>  on
  f              =>  off
  b/brightness   =>  bright
  t/temperature  =>  temp
  warm           =>  temp 3000
  cool           =>  temp 6500
  1|2|3          =>  speed 1|2|3

Examples:
  homectl run fan on
  homectl run fan,ac off
  homectl run litetop bright 25
  homectl run litetop bright +
  homectl run litetop,litebottom temp 3800
  homectl run ac speed cycle
";

#[derive(Parser, Debug)]
#[command(name = "homectl", version, about = "Control smart plugs, bulbs, and fans")]
struct Cli {
    /// Directory for cached sessions and logs (default: beside the executable).
    #[arg(long, global = true, env = "HA_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Override the Lumen API base URL.
    #[arg(long, global = true, env = "HA_LUMEN_URL", hide = true)]
    lumen_url: Option<String>,

    /// Override the Breeze API base URL.
    #[arg(long, global = true, env = "HA_BREEZE_URL", hide = true)]
    breeze_url: Option<String>,

    /// Override the solar times API base URL.
    #[arg(long, global = true, env = "HA_SOLAR_URL", hide = true)]
    solar_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run an action against one or more devices.
    #[command(after_help = RUN_HELP)]
    Run {
        /// Comma-separated logical device names, e.g. "fan,ac,litetop".
        device_names: String,
        /// Action or alias: on, off, toggle, get, bright, temp, speed, warm, ...
        action: Option<String>,
        /// Action value: a number, "+", "-", or "cycle".
        action_value: Option<String>,
    },
    /// Set bulbs to a color temperature that follows the sun.
    Circadian {
        /// Latitude of the location.
        latitude: f64,
        /// Longitude of the location.
        longitude: f64,
        /// Comma-separated logical bulb names.
        device_names: String,
        /// Compute for this RFC 3339 time instead of now (testing aid).
        #[arg(long)]
        at: Option<DateTime<Local>>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("homectl=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let state_dir = cli.state_dir.clone().unwrap_or_else(default_state_dir);
    let mut config = CacheConfig::new(&state_dir);
    if let Some(url) = &cli.lumen_url {
        config = config.with_lumen_base_url(url);
    }
    if let Some(url) = &cli.breeze_url {
        config = config.with_breeze_base_url(url);
    }
    let cache = Arc::new(ClientCache::new(config));

    match cli.command {
        Commands::Run {
            device_names,
            action,
            action_value,
        } => {
            run_action(
                &cache,
                &device_names,
                action.as_deref(),
                action_value.as_deref(),
            )
            .await
        }
        Commands::Circadian {
            latitude,
            longitude,
            device_names,
            at,
        } => {
            let now = at.unwrap_or_else(Local::now);
            let solar = SolarClient::new(
                cli.solar_url
                    .unwrap_or_else(|| circadian::DEFAULT_BASE_URL.to_string()),
            );
            let cache_path = state_dir.join("solar_times.json");
            let times =
                match circadian::solar_times(&solar, &cache_path, latitude, longitude, now).await {
                    Ok(times) => times,
                    Err(err) => {
                        eprintln!("{err}");
                        return ExitCode::FAILURE;
                    }
                };

            let temperature =
                circadian::day_phase_temperature(now.with_timezone(&Utc), &times);
            println!("circadian temperature: {temperature}");
            run_action(
                &cache,
                &device_names,
                Some("temp"),
                Some(&temperature.value().to_string()),
            )
            .await
        }
    }
}

/// Resolves, validates, and fans out one action. Prints per-device
/// results and turns them into an exit code.
async fn run_action(
    cache: &Arc<ClientCache>,
    device_names: &str,
    action: Option<&str>,
    action_value: Option<&str>,
) -> ExitCode {
    let (action, action_value) = match action {
        Some(action) => {
            let (action, value) = resolve_alias(action, action_value);
            (Some(action), value)
        }
        None => (None, None),
    };

    let devices = match resolve_devices(device_names, |key| std::env::var(key).ok()) {
        Ok(devices) => devices,
        Err(err) => {
            eprintln!("{err}\n");
            eprint!("{RUN_HELP}");
            return ExitCode::FAILURE;
        }
    };

    let command = match validate(&devices, action.as_deref(), action_value.as_deref()) {
        Ok(command) => command,
        Err(err) => {
            eprintln!("{err}\n");
            eprint!("{RUN_HELP}");
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    for report in execute(cache, &devices, command).await {
        match report.outcome {
            Ok(Some(snapshot)) => println!("{}: {snapshot}", report.device),
            Ok(None) => {}
            Err(err) => {
                eprintln!("{}: {err}", report.device);
                failed = true;
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn default_state_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
