//! Weather data access for the skybar agent.
//!
//! Provides forecast data via the Open-Meteo API, reverse geocoding via
//! Nominatim, and the movement gate applied to incoming location updates.

pub mod geocode;
pub mod location;
pub mod provider;
pub mod types;

pub use geocode::{NominatimGeocoder, ReverseGeocoder};
pub use location::LocationFilter;
pub use provider::{OpenMeteoProvider, WeatherSource};
pub use types::*;
