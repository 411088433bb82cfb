//! Thin typed client for the NutriYess REST API
//!
//! The session store never talks to the network. The commands do, through
//! this client, and hand the store whatever the API returned. The bearer
//! token is attached here to every request when one is available.

pub mod catalog;
pub mod consultations;
pub mod patients;

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::model::{AuthToken, Subscription, UserProfile};

#[derive(Debug, Error)]
pub enum Error {
    /// The API answered with a failure status; `detail` is the backend's
    /// error message
    #[error("API request failed ({status}): {detail}")]
    Api { status: StatusCode, detail: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Error body shape the backend uses for every failure
#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

/// `{"message": ...}` acknowledgement returned by deletes, seeds and other
/// fire-and-forget endpoints
#[derive(Debug, Deserialize)]
pub struct StatusMessage {
    #[serde(default)]
    pub message: String,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<AuthToken>,
}

impl ApiClient {
    pub fn new(config: &config::Api, token: Option<AuthToken>) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            token,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let req = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => req.bearer_auth(token.as_str()),
            None => req,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, req: reqwest::RequestBuilder) -> Result<T, Error> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            Ok(resp.json().await?)
        } else {
            let detail = resp
                .json::<ErrorDetail>()
                .await
                .map(|body| body.detail)
                .unwrap_or_else(|_| "no detail provided".to_owned());
            Err(Error::Api { status, detail })
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.execute(self.request(Method::GET, path)).await
    }

    pub(crate) async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, Error> {
        self.execute(self.request(Method::GET, path).query(query))
            .await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::POST, path).json(body))
            .await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.execute(self.request(Method::POST, path)).await
    }

    pub(crate) async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, Error>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(self.request(Method::PUT, path).json(body))
            .await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<StatusMessage, Error> {
        self.execute(self.request(Method::DELETE, path)).await
    }
}

/// Sign-in form
#[derive(Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration form; optional professional metadata is omitted from the
/// payload when unset
#[derive(Debug, Serialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinic_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Payload returned by both login and registration
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserProfile,
    pub subscription_info: Subscription,
}

/// Receipt for a plan upgrade
#[derive(Debug, Deserialize)]
pub struct UpgradeReceipt {
    pub message: String,
    pub new_plan: String,
    #[serde(default)]
    pub expires_at: Option<chrono::NaiveDateTime>,
}

impl ApiClient {
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, Error> {
        self.post("/auth/login", credentials).await
    }

    pub async fn register(&self, registration: &Registration) -> Result<TokenResponse, Error> {
        self.post("/auth/register", registration).await
    }

    pub async fn me(&self) -> Result<UserProfile, Error> {
        self.get("/auth/me").await
    }

    /// Fresh subscription snapshot for the signed-in account
    pub async fn subscription_status(&self) -> Result<Subscription, Error> {
        self.get("/auth/subscription-status").await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> Result<StatusMessage, Error> {
        self.post(
            "/auth/change-password",
            &serde_json::json!({ "current_password": current, "new_password": new }),
        )
        .await
    }

    /// Plan is passed as a query parameter, matching the backend signature
    pub async fn upgrade_subscription(&self, plan: &str) -> Result<UpgradeReceipt, Error> {
        self.execute(
            self.request(Method::POST, "/auth/upgrade-subscription")
                .query(&[("plan", plan)]),
        )
        .await
    }
}
