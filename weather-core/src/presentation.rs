//! Display-ready values derived from a [`WeatherResult`].

use serde::Serialize;

use crate::model::{Unit, WeatherResult};

/// Icon shown for a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConditionIcon {
    Clear,
    PartlyCloudy,
    Cloudy,
    Overcast,
    /// Used for every code without a dedicated icon.
    RainFallback,
}

impl ConditionIcon {
    pub fn from_code(code: u32) -> Self {
        match code {
            1000 => ConditionIcon::Clear,
            1003 => ConditionIcon::PartlyCloudy,
            1006 => ConditionIcon::Cloudy,
            1009 => ConditionIcon::Overcast,
            _ => ConditionIcon::RainFallback,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionIcon::Clear => "clear",
            ConditionIcon::PartlyCloudy => "partly-cloudy",
            ConditionIcon::Cloudy => "cloudy",
            ConditionIcon::Overcast => "overcast",
            ConditionIcon::RainFallback => "rain-fallback",
        }
    }
}

/// What a screen needs to render one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayModel {
    pub location_name: String,
    pub temperature_text: String,
    pub icon_key: String,
}

impl DisplayModel {
    pub fn new(result: &WeatherResult, unit: Unit) -> Self {
        Self {
            location_name: result.location_name.clone(),
            temperature_text: format_temperature(result.temperature_c, unit),
            icon_key: icon_key_for_condition(result.condition_code).to_owned(),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// `18.04, Celsius` -> `"18.0°C"`.
pub fn format_temperature(celsius: f64, unit: Unit) -> String {
    let value = match unit {
        Unit::Celsius => celsius,
        Unit::Fahrenheit => celsius_to_fahrenheit(celsius),
    };

    format!("{value:.1}{}", unit.symbol())
}

pub fn icon_key_for_condition(code: u32) -> &'static str {
    ConditionIcon::from_code(code).as_str()
}
