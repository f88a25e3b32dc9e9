use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    pub id: String,
    pub headliner: Headliner,
    pub openers: Vec<String>,
    pub venue: Venue,
    pub cost: String,
    pub date_time: String,
    pub ticket_url: String,
    pub event_status: String,
    pub event_source: String,
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
    pub distance: Option<f64>,
}

/// Registration details.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub signup_code: String,
}

/// Filters for listing and random selection. Dates are `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcertSearch {
    pub date_from: String,
    pub date_to: String,
    pub zip_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo_radius: Option<u32>,
}

/// `{"error": {"message", "status"}}` as sent by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub status: u16,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    #[error("no token; call register or login first")]
    NotAuthenticated,
}

impl SdkError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SdkError::Api { status, .. } => Some(*status),
            SdkError::Transport(e) => e.status(),
            SdkError::NotAuthenticated => None,
        }
    }
}

#[derive(Deserialize)]
struct TokenBody {
    token: String,
}

#[derive(Deserialize)]
struct ConcertsBody {
    concerts: Vec<Concert>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RandomBody {
    random_concert: Option<Concert>,
}

#[derive(Deserialize)]
struct ConcertBody {
    concert: Concert,
}

pub struct RhythmsClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl RhythmsClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Use an existing bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Register and keep the returned token.
    pub async fn register(&mut self, signup: &Signup) -> Result<String, SdkError> {
        let req = self.client.post(format!("{}/auth/register", self.base_url)).json(signup);
        let body: TokenBody = send(req).await?;
        self.token = Some(body.token.clone());
        Ok(body.token)
    }

    /// Log in and keep the returned token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, SdkError> {
        let req = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&serde_json::json!({ "email": email, "password": password }));
        let body: TokenBody = send(req).await?;
        self.token = Some(body.token.clone());
        Ok(body.token)
    }

    /// Concerts matching the search.
    pub async fn concerts(&self, search: &ConcertSearch) -> Result<Vec<Concert>, SdkError> {
        let req = self.authed_get("/concerts")?.query(search);
        let body: ConcertsBody = send(req).await?;
        Ok(body.concerts)
    }

    /// One random concert, `None` when nothing matches.
    pub async fn random_concert(
        &self,
        search: &ConcertSearch,
        max_price: Option<f64>,
    ) -> Result<Option<Concert>, SdkError> {
        let mut req = self.authed_get("/concerts/random")?.query(search);
        if let Some(price) = max_price {
            req = req.query(&[("price", price)]);
        }
        let body: RandomBody = send(req).await?;
        Ok(body.random_concert)
    }

    /// A concert by id, with distance from `zip_code` when given.
    pub async fn concert(&self, id: &str, zip_code: Option<&str>) -> Result<Concert, SdkError> {
        let mut req = self.authed_get(&format!("/concerts/{}", id))?;
        if let Some(zip) = zip_code {
            req = req.query(&[("zipCode", zip)]);
        }
        let body: ConcertBody = send(req).await?;
        Ok(body.concert)
    }

    /// Raw GET with the current token, for status-level assertions.
    pub async fn get_raw(&self, path: &str) -> Result<reqwest::Response, SdkError> {
        let mut req = self.client.get(format!("{}{}", self.base_url, path));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        Ok(req.send().await?)
    }

    fn authed_get(&self, path: &str) -> Result<RequestBuilder, SdkError> {
        let token = self.token.as_ref().ok_or(SdkError::NotAuthenticated)?;
        Ok(self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(token))
    }
}

async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, SdkError> {
    let resp = req.send().await?;
    let status = resp.status();

    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        return Err(SdkError::Api { status, message });
    }

    Ok(resp.json::<T>().await?)
}
