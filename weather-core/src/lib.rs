//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Request URL construction for the current-conditions endpoint
//! - An HTTP client over a substitutable transport, with a typed error taxonomy
//! - Decoding of provider responses and display-ready formatting
//! - Configuration & credentials handling
//!
//! It is used by `weather-cli`, but any front end (a GUI, a bot) can drive it:
//! pass a place name or `"lat,lon"` plus a [`Unit`] and get a [`DisplayModel`].

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod model;
pub mod presentation;
pub mod query;
pub mod sequence;

pub use client::{ClientSettings, HttpTransport, Transport, TransportResponse, WeatherClient};
pub use config::Config;
pub use decode::decode;
pub use error::{DecodeError, QueryError, TransportError, WeatherError};
pub use model::{Unit, WeatherResult};
pub use presentation::{ConditionIcon, DisplayModel, format_temperature, icon_key_for_condition};
pub use query::{LocationQuery, build_request_url};
pub use sequence::{RequestSequencer, Ticket};
