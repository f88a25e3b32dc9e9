//! Raw event → `Concert` normalization.
//!
//! # Rules
//! - Headliner is the first performer; openers are the rest, by name
//! - State is the address region's alternate name ("CO")
//! - Cost and ticket URL come from the first offer, empty when absent
//! - Event source is the identifier prefix ("jambase" from "jambase:123")
//! - Distance is looked up only when an origin is supplied
//!
//! Missing optional pieces default to empty values. An event without
//! performers or without a location cannot be presented and is rejected.

use crate::concerts::raw::RawEvent;
use crate::concerts::types::{Concert, Coordinates, Headliner, Venue, DEFAULT_EVENT_SOURCE};
use crate::upstream::{DistanceProvider, UpstreamError};

/// Normalize a raw event, attaching a precomputed distance.
pub fn normalize(raw: &RawEvent, distance: Option<f64>) -> Result<Concert, UpstreamError> {
    let (headliner, openers) = raw.performer.split_first().ok_or_else(|| malformed(raw, "no performers"))?;
    let location = raw.location.as_ref().ok_or_else(|| malformed(raw, "no location"))?;

    let address = location.address.clone().unwrap_or_default();
    let state = address
        .address_region
        .as_ref()
        .map(|region| region.alternate_name.clone())
        .unwrap_or_default();

    let first_offer = raw.offers.first();
    let cost = first_offer
        .and_then(|offer| offer.price_specification.as_ref())
        .and_then(|spec| spec.price.as_ref())
        .map(|price| normalize_cost(&price.as_text()))
        .unwrap_or_default();
    let ticket_url = first_offer
        .and_then(|offer| offer.url.clone())
        .unwrap_or_default();

    Ok(Concert {
        id: raw.identifier.clone(),
        headliner: Headliner {
            name: headliner.name.clone(),
            band_image_url: headliner.image.clone().unwrap_or_default(),
            genres: headliner.genre.clone(),
        },
        openers: openers.iter().map(|o| o.name.clone()).collect(),
        venue: Venue {
            name: location.name.clone(),
            venue_image_url: location.image.clone().unwrap_or_default(),
            street_address: address.street_address,
            city: address.address_locality,
            state,
            zip_code: address.postal_code,
            distance,
        },
        cost,
        date_time: raw.start_date.clone(),
        ticket_url,
        event_status: raw.event_status.clone(),
        event_source: event_source(&raw.identifier),
    })
}

/// Normalize a raw event, looking up the venue distance from `origin` if given.
pub async fn normalize_with_distance(
    raw: &RawEvent,
    origin: Option<Coordinates>,
    distances: &dyn DistanceProvider,
) -> Result<Concert, UpstreamError> {
    let mut concert = normalize(raw, None)?;
    if let Some(origin) = origin {
        let miles = distances.distance(origin, &concert.venue.destination()).await?;
        concert.venue.distance = Some(miles);
    }
    Ok(concert)
}

/// Keep a price only when it reads as a non-negative number.
fn normalize_cost(text: &str) -> String {
    match text.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => text.to_string(),
        _ => String::new(),
    }
}

fn event_source(identifier: &str) -> String {
    match identifier.split_once(':') {
        Some((source, _)) if !source.is_empty() => source.to_string(),
        _ => DEFAULT_EVENT_SOURCE.to_string(),
    }
}

fn malformed(raw: &RawEvent, reason: &'static str) -> UpstreamError {
    UpstreamError::MalformedEvent {
        id: raw.identifier.clone(),
        reason,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::concerts::raw::RawPrice;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    pub(crate) fn sample_raw_json() -> serde_json::Value {
        json!({
            "@type": "Concert",
            "name": "Ben Rector at Boettcher Concert Hall",
            "identifier": "jambase:11070750",
            "eventStatus": "scheduled",
            "startDate": "2024-02-01T19:30:00",
            "location": {
                "name": "Boettcher Concert Hall",
                "image": "",
                "address": {
                    "streetAddress": "1400 Curtis Street",
                    "addressLocality": "Denver",
                    "postalCode": "80202",
                    "addressRegion": { "name": "Colorado", "alternateName": "CO" }
                }
            },
            "offers": [
                {
                    "url": "https://coloradosymphony.org/?utm_source=jambase",
                    "priceSpecification": {}
                },
                {
                    "url": "https://seatgeek.com/ben-rector-tickets",
                    "priceSpecification": { "price": "80.00" }
                }
            ],
            "performer": [
                {
                    "name": "Ben Rector",
                    "image": "https://www.jambase.com/ben-rector.png",
                    "genre": ["folk", "indie", "pop", "rock"]
                },
                { "name": "Cody Fry", "image": "https://www.jambase.com/cody-fry.png", "genre": ["folk"] }
            ]
        })
    }

    pub(crate) fn sample_raw() -> RawEvent {
        serde_json::from_value(sample_raw_json()).unwrap()
    }

    pub(crate) fn sample_concert() -> Concert {
        normalize(&sample_raw(), None).unwrap()
    }

    struct RecordingDistance {
        miles: f64,
        destinations: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DistanceProvider for RecordingDistance {
        async fn distance(&self, _origin: Coordinates, destination: &str) -> Result<f64, UpstreamError> {
            self.destinations.lock().unwrap().push(destination.to_string());
            Ok(self.miles)
        }
    }

    #[test]
    fn test_formats_data() {
        let concert = normalize(&sample_raw(), Some(9.8)).unwrap();

        assert_eq!(concert.id, "jambase:11070750");
        assert_eq!(concert.headliner.name, "Ben Rector");
        assert_eq!(concert.headliner.band_image_url, "https://www.jambase.com/ben-rector.png");
        assert_eq!(concert.headliner.genres, vec!["folk", "indie", "pop", "rock"]);
        assert_eq!(concert.openers, vec!["Cody Fry"]);
        assert_eq!(concert.venue.name, "Boettcher Concert Hall");
        assert_eq!(concert.venue.venue_image_url, "");
        assert_eq!(concert.venue.street_address, "1400 Curtis Street");
        assert_eq!(concert.venue.city, "Denver");
        assert_eq!(concert.venue.state, "CO");
        assert_eq!(concert.venue.zip_code, "80202");
        assert_eq!(concert.venue.distance, Some(9.8));
        assert_eq!(concert.cost, "");
        assert_eq!(concert.date_time, "2024-02-01T19:30:00");
        assert_eq!(concert.ticket_url, "https://coloradosymphony.org/?utm_source=jambase");
        assert_eq!(concert.event_status, "scheduled");
        assert_eq!(concert.event_source, "jambase");
    }

    #[test]
    fn test_normalization_is_deterministic() {
        let raw = sample_raw();
        assert_eq!(normalize(&raw, Some(3.0)).unwrap(), normalize(&raw, Some(3.0)).unwrap());
    }

    #[test]
    fn test_missing_offers_and_images_default_to_empty() {
        let mut raw = sample_raw();
        raw.offers.clear();
        raw.performer[0].image = None;
        raw.location.as_mut().unwrap().address = None;

        let concert = normalize(&raw, None).unwrap();
        assert_eq!(concert.cost, "");
        assert_eq!(concert.ticket_url, "");
        assert_eq!(concert.headliner.band_image_url, "");
        assert_eq!(concert.venue.state, "");
        assert_eq!(concert.venue.distance, None);
    }

    #[test]
    fn test_cost_taken_from_first_offer_only() {
        let mut raw = sample_raw();
        raw.offers.swap(0, 1);
        assert_eq!(normalize(&raw, None).unwrap().cost, "80.00");
    }

    #[test]
    fn test_non_numeric_cost_becomes_empty() {
        let mut raw = sample_raw();
        for bad in ["free-ish", "-5", "NaN"] {
            raw.offers[0].price_specification.as_mut().unwrap().price = Some(RawPrice::Text(bad.into()));
            assert_eq!(normalize(&raw, None).unwrap().cost, "", "price {bad:?}");
        }
    }

    #[test]
    fn test_missing_core_data_is_rejected() {
        let mut no_performers = sample_raw();
        no_performers.performer.clear();
        assert!(matches!(
            normalize(&no_performers, None),
            Err(UpstreamError::MalformedEvent { reason: "no performers", .. })
        ));

        let mut no_location = sample_raw();
        no_location.location = None;
        assert!(matches!(
            normalize(&no_location, None),
            Err(UpstreamError::MalformedEvent { reason: "no location", .. })
        ));
    }

    #[test]
    fn test_unprefixed_identifier_defaults_source() {
        let mut raw = sample_raw();
        raw.identifier = "11070750".into();
        assert_eq!(normalize(&raw, None).unwrap().event_source, "jambase");
    }

    #[tokio::test]
    async fn test_distance_only_with_origin() {
        let distances = RecordingDistance {
            miles: 12.4,
            destinations: Mutex::new(Vec::new()),
        };
        let raw = sample_raw();

        let without = normalize_with_distance(&raw, None, &distances).await.unwrap();
        assert_eq!(without.venue.distance, None);
        assert!(distances.destinations.lock().unwrap().is_empty());

        let origin = Coordinates::new(39.644843, -104.968091);
        let with = normalize_with_distance(&raw, Some(origin), &distances).await.unwrap();
        assert_eq!(with.venue.distance, Some(12.4));
        assert_eq!(
            distances.destinations.lock().unwrap().as_slice(),
            ["1400 Curtis Street, Denver, CO 80202"]
        );
    }
}
