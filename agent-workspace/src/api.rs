//! REST client for the account and user-listing endpoints.
//!
//! Every endpoint returns a JSON envelope (`{"user": ...}` or
//! `{"users": [...]}`); failures carry a non-2xx status with a
//! `{"detail": "..."}` body. No agent workspace depends on these calls.

use anyhow::{bail, Result};
use serde::Deserialize;

use crate::session::User;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Envelope returned by the auth and update endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    user: User,
}

#[derive(Debug, Deserialize)]
struct UsersEnvelope {
    users: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    /// Base URL from `AICADEMY_API_URL`, falling back to the local backend
    pub fn from_env() -> Self {
        Self::new(std::env::var("AICADEMY_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()))
    }

    pub async fn sign_up(
        &self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse> {
        let res = self
            .http
            .post(format!("{}/auth/signup", self.base_url))
            .json(&serde_json::json!({
                "full_name": full_name,
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        if !res.status().is_success() {
            bail!(parse_error(res).await);
        }
        Ok(res.json().await?)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let res = self
            .http
            .post(format!("{}/auth/signin", self.base_url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;
        if !res.status().is_success() {
            bail!(parse_error(res).await);
        }
        Ok(res.json().await?)
    }

    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let res = self
            .http
            .get(format!("{}/users", self.base_url))
            .send()
            .await?;
        if !res.status().is_success() {
            bail!(parse_error(res).await);
        }
        Ok(res.json::<UsersEnvelope>().await?.users)
    }

    pub async fn fetch_user(&self, user_id: &str) -> Result<User> {
        let res = self
            .http
            .get(format!("{}/users/{}", self.base_url, user_id))
            .send()
            .await?;
        if !res.status().is_success() {
            bail!(parse_error(res).await);
        }
        Ok(res.json::<UserEnvelope>().await?.user)
    }

    pub async fn update_user(&self, user_id: &str, full_name: &str) -> Result<AuthResponse> {
        let res = self
            .http
            .patch(format!("{}/users/{}", self.base_url, user_id))
            .json(&serde_json::json!({ "full_name": full_name }))
            .send()
            .await?;
        if !res.status().is_success() {
            bail!(parse_error(res).await);
        }
        Ok(res.json().await?)
    }
}

async fn parse_error(res: reqwest::Response) -> String {
    match res.json::<ErrorBody>().await {
        Ok(body) => body.detail.unwrap_or_else(|| "Request failed.".to_string()),
        Err(_) => "Request failed.".to_string(),
    }
}
