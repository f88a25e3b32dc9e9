//! Raw JamBase event records.
//!
//! Only the fields the normalizer reads are modelled. Everything optional
//! upstream is optional here, so a sparse record still decodes and the
//! normalizer decides what is fatal. JamBase sends `null` as freely as it
//! omits a field; both decode to the empty value.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` the same way as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEvent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub identifier: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offers: Vec<RawOffer>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub performer: Vec<RawPerformer>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPerformer {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub address: Option<RawAddress>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAddress {
    #[serde(default, deserialize_with = "null_as_default")]
    pub street_address: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub address_locality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub postal_code: String,
    #[serde(default)]
    pub address_region: Option<RawRegion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRegion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub alternate_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOffer {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub price_specification: Option<RawPriceSpecification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPriceSpecification {
    #[serde(default)]
    pub price: Option<RawPrice>,
}

/// JamBase sends prices as strings ("22.00") but numbers also appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Text(String),
    Number(f64),
}

impl RawPrice {
    pub fn as_text(&self) -> String {
        match self {
            RawPrice::Text(s) => s.trim().to_string(),
            RawPrice::Number(n) => n.to_string(),
        }
    }
}
