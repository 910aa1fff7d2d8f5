//! Departure board DTOs.
//!
//! These types map directly to the JSON returned by the departures API.
//! They use `Option` liberally because the API omits fields rather than
//! sending null values in many cases. The same types are returned from the
//! HTTP layer, so they serialize with the upstream field names.

use serde::{Deserialize, Deserializer, Serialize};

/// Response from `GET /departures/{origin}/to/{destination}`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartureBoard {
    /// Human-readable name of the board station (the queried origin).
    pub location_name: Option<String>,

    /// CRS code of the board station.
    pub crs: Option<String>,

    /// Human-readable name of the filter station (the queried destination).
    pub filter_location_name: Option<String>,

    /// CRS code of the filter station.
    #[serde(rename = "filtercrs")]
    pub filter_crs: Option<String>,

    /// Train services on the board. Absent when nothing is running.
    #[serde(default)]
    pub train_services: Option<Vec<ServiceEntry>>,
}

impl DepartureBoard {
    /// The services on this board, treating an absent list as empty.
    pub fn services(&self) -> &[ServiceEntry] {
        self.train_services.as_deref().unwrap_or_default()
    }
}

/// A service on the departure board.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceEntry {
    /// Scheduled time of departure, "HH:MM".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub std: String,

    /// Estimated time of departure.
    /// May be "On time", "Delayed", "Cancelled", or a time like "10:15".
    #[serde(default, deserialize_with = "null_as_empty")]
    pub etd: String,

    /// Platform number/letter.
    pub platform: Option<String>,

    /// Train operating company name.
    pub operator: Option<String>,

    /// Train operating company ATOC code.
    pub operator_code: Option<String>,

    /// Origin station(s).
    pub origin: Option<Vec<Location>>,

    /// Destination station(s).
    pub destination: Option<Vec<Location>>,

    /// Train length in coaches.
    pub length: Option<i32>,
}

/// Origin or destination location.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Human-readable station name.
    pub location_name: Option<String>,

    /// CRS code.
    pub crs: Option<String>,

    /// "via" text (e.g., "via Bristol Parkway").
    pub via: Option<String>,
}

/// Read a string that the API may send as `null`.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
