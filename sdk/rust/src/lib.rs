//! Typed client for the random-rhythms API.

mod client;

pub use client::{
    ApiErrorBody, Concert, ConcertSearch, Headliner, RhythmsClient, SdkError, Signup, Venue,
};
