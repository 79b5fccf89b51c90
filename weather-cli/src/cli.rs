use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use tracing::{debug, info};
use weather_core::{
    Config, DisplayModel, LocationQuery, Unit, WeatherClient, WeatherError, WeatherResult,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a place or coordinates")]
pub struct Cli {
    /// Print debug logs to stderr (RUST_LOG takes precedence).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the API key, endpoint and default unit interactively.
    Configure,

    /// Show current weather for a place name or coordinates.
    Show {
        /// Place name (e.g. "London", "São Paulo") or "lat,lon".
        #[arg(required_unless_present = "lat", conflicts_with_all = ["lat", "lon"])]
        query: Option<String>,

        /// Latitude in degrees, used together with --lon.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude in degrees, used together with --lat.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Temperature unit: c/celsius or f/fahrenheit. Defaults to the configured unit.
        #[arg(short, long, value_parser = parse_unit)]
        unit: Option<Unit>,
    },

    /// Print where the configuration file lives.
    ConfigPath,
}

fn parse_unit(value: &str) -> Result<Unit, String> {
    value.parse().map_err(|e: anyhow::Error| e.to_string())
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { query, lat, lon, unit } => show(query, lat.zip(lon), unit).await,
            Command::ConfigPath => {
                println!("{}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let help = if config.api_key.is_some() {
        "Leave empty to keep the current key"
    } else {
        "Get a free key at https://www.weatherapi.com/"
    };
    let api_key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_help_message(help)
        .prompt()?;
    if !api_key.trim().is_empty() {
        config.set_api_key(&api_key);
    }

    let base_url = Text::new("API base URL:").with_default(&config.base_url).prompt()?;
    config.base_url = base_url.trim().to_string();

    let units = Unit::all().to_vec();
    let cursor = units.iter().position(|u| *u == config.default_unit).unwrap_or(0);
    config.default_unit =
        Select::new("Default temperature unit:", units).with_starting_cursor(cursor).prompt()?;

    if config.api_key.is_some() {
        config.client_settings().context("Configuration was not saved")?;
    }

    let path = config.save()?;
    info!(path = %path.display(), "configuration saved");
    println!("Saved configuration to {}", path.display());

    Ok(())
}

async fn show(query: Option<String>, coords: Option<(f64, f64)>, unit: Option<Unit>) -> Result<()> {
    let query = match (query, coords) {
        (_, Some((lat, lon))) => LocationQuery::from_coordinates(lat, lon)?,
        (Some(text), None) => LocationQuery::new(text)?,
        (None, None) => bail!("Provide a location, or both --lat and --lon."),
    };

    let mut config = Config::load()?;
    config.apply_env();

    let settings = config.client_settings()?;
    let unit = unit.unwrap_or(config.default_unit);

    debug!(%query, %unit, base_url = %settings.base_url, "looking up current weather");

    let client = WeatherClient::new(settings);
    let interrupted = async {
        // If the handler can't be installed, just never cancel.
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    let result = match client.fetch_weather_until(query.as_str(), interrupted).await {
        Ok(result) => result,
        Err(WeatherError::Cancelled) => bail!("Interrupted."),
        Err(err) => {
            return Err(err).with_context(|| format!("Could not get weather for '{query}'"));
        }
    };

    debug!(code = result.condition_code, temp_c = result.temperature_c, "weather received");

    let display = DisplayModel::new(&result, unit);
    print!("{}", render_report(&display, &result));

    Ok(())
}

/// Human-readable block for one lookup.
fn render_report(display: &DisplayModel, result: &WeatherResult) -> String {
    let mut out = format!(
        "{}\n  {}  {}  [{}]\n",
        display.location_name, display.temperature_text, result.condition_text, display.icon_key
    );

    if let Some(updated) = result.last_updated {
        let local = updated.with_timezone(&Local);
        out.push_str(&format!("  Updated {}\n", local.format("%Y-%m-%d %H:%M")));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("weather").chain(args.iter().copied()))
    }

    fn sample_result() -> WeatherResult {
        WeatherResult {
            location_name: "London".into(),
            temperature_c: 18.0,
            condition_code: 1003,
            condition_text: "Partly cloudy".into(),
            last_updated: None,
        }
    }

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_with_place_and_unit() {
        let cli = parse(&["show", "New York", "--unit", "F"]).unwrap();

        match cli.command {
            Command::Show { query, lat, lon, unit } => {
                assert_eq!(query.as_deref(), Some("New York"));
                assert_eq!((lat, lon), (None, None));
                assert_eq!(unit, Some(Unit::Fahrenheit));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_with_negative_coordinates() {
        let cli = parse(&["show", "--lat", "-33.87", "--lon", "151.21"]).unwrap();

        match cli.command {
            Command::Show { query, lat, lon, unit } => {
                assert_eq!(query, None);
                assert_eq!(lat.zip(lon), Some((-33.87, 151.21)));
                assert_eq!(unit, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_rejects_half_a_coordinate_pair() {
        assert!(parse(&["show", "--lat", "10"]).is_err());
    }

    #[test]
    fn show_rejects_place_and_coordinates_together() {
        assert!(parse(&["show", "Paris", "--lat", "1", "--lon", "2"]).is_err());
    }

    #[test]
    fn show_requires_a_location() {
        assert!(parse(&["show"]).is_err());
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let err = parse(&["show", "Oslo", "-u", "kelvin"]).unwrap_err();
        assert!(err.to_string().contains("Unknown unit"));
    }

    #[test]
    fn verbose_is_global() {
        assert!(parse(&["show", "Oslo", "-v"]).unwrap().verbose);
        assert!(parse(&["-v", "config-path"]).unwrap().verbose);
    }

    #[test]
    fn report_lists_temperature_condition_and_icon() {
        let result = sample_result();
        let display = DisplayModel::new(&result, Unit::Celsius);

        assert_eq!(
            render_report(&display, &result),
            "London\n  18.0°C  Partly cloudy  [partly-cloudy]\n"
        );
    }

    #[test]
    fn report_includes_update_time_when_known() {
        let result = WeatherResult {
            last_updated: chrono::DateTime::from_timestamp(1_730_899_800, 0),
            ..sample_result()
        };
        let display = DisplayModel::new(&result, Unit::Fahrenheit);

        let report = render_report(&display, &result);
        assert!(report.contains("64.4°F"));
        assert!(report.contains("  Updated "));
    }
}
