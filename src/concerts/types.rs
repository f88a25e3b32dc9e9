//! Normalized concert types returned to clients.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source used when an identifier carries no `source:` prefix.
pub const DEFAULT_EVENT_SOURCE: &str = "jambase";

/// A latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A concert normalized from an upstream event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    /// Upstream identifier, e.g. "jambase:11070750".
    pub id: String,
    pub headliner: Headliner,
    /// Names of supporting acts in upstream order.
    pub openers: Vec<String>,
    pub venue: Venue,
    /// Non-negative numeric string, or empty when no price is known.
    pub cost: String,
    pub date_time: String,
    /// Empty when the event lists no offers.
    pub ticket_url: String,
    pub event_status: String,
    pub event_source: String,
}

impl Concert {
    /// Numeric cost, if the event has one.
    pub fn price(&self) -> Option<f64> {
        if self.cost.is_empty() {
            return None;
        }
        self.cost.parse::<f64>().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Headliner {
    pub name: String,
    pub band_image_url: String,
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub name: String,
    pub venue_image_url: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    /// Travel distance from the search origin; null when no origin was given.
    pub distance: Option<f64>,
}

impl Venue {
    /// Destination string understood by the distance matrix.
    pub fn destination(&self) -> String {
        format!(
            "{}, {}, {} {}",
            self.street_address, self.city, self.state, self.zip_code
        )
    }
}

/// A source-qualified event identifier such as `jambase:11070750`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventId {
    pub source: String,
    pub value: String,
}

/// Error returned for identifiers that cannot name an event.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event identifier '{0}'")]
pub struct InvalidEventId(pub String);

impl FromStr for EventId {
    type Err = InvalidEventId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (source, value) = match trimmed.split_once(':') {
            Some((source, value)) => (source, value),
            None => (DEFAULT_EVENT_SOURCE, trimmed),
        };

        let valid = |part: &str| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        };
        if !valid(source) || !valid(value) {
            return Err(InvalidEventId(s.to_string()));
        }

        Ok(Self {
            source: source.to_ascii_lowercase(),
            value: value.to_string(),
        })
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.value)
    }
}
