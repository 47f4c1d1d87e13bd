//! HTTP client for the KeyStorm API.

use anyhow::Result;
use reqwest::{Client, Response};
use shared::api::{
    GenerateLessonsPayload, LessonsResponse, MeResponse, RequestCodePayload, VerifyCodePayload,
    VerifyCodeResponse,
};
use shared::lesson::Lesson;

pub struct Api {
    pub http: Client,
    pub base_url: String,
}

impl Api {
    pub fn new(base_url: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
        }
    }

    /// Requests a login code be sent to the given email.
    pub async fn request_code(&self, payload: RequestCodePayload) -> Result<()> {
        let _ = Self::check_response(
            self.http
                .post(format!("{}/auth/code", self.base_url))
                .json(&payload)
                .send()
                .await?,
        )
        .await?;

        Ok(())
    }

    /// Verifies an email with the code and returns a session token.
    pub async fn verify_code(&self, payload: VerifyCodePayload) -> Result<VerifyCodeResponse> {
        let response = Self::check_response(
            self.http
                .post(format!("{}/auth/verify", self.base_url))
                .json(&payload)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Gets the authenticated user's identity.
    pub async fn get_me(&self, token: String) -> Result<MeResponse> {
        let response = Self::check_response(
            self.http
                .get(format!("{}/auth/me", self.base_url))
                .bearer_auth(token)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Ends the server-side session for this token.
    pub async fn logout(&self, token: String) -> Result<()> {
        Self::check_response(
            self.http
                .post(format!("{}/auth/logout", self.base_url))
                .bearer_auth(token)
                .send()
                .await?,
        )
        .await?;

        Ok(())
    }

    /// Fetches the bundled default lessons.
    pub async fn get_lessons(&self) -> Result<Vec<Lesson>> {
        let response = Self::check_response(
            self.http
                .get(format!("{}/lessons", self.base_url))
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    /// Generates themed lessons (authenticated).
    pub async fn generate_lessons(
        &self,
        token: String,
        payload: GenerateLessonsPayload,
    ) -> Result<LessonsResponse> {
        let response = Self::check_response(
            self.http
                .post(format!("{}/lessons/generate", self.base_url))
                .bearer_auth(token)
                .json(&payload)
                .send()
                .await?,
        )
        .await?;

        Ok(response.json().await?)
    }

    async fn check_response(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Try to extract error message from JSON response
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|json| {
                    json.get("error")
                        .or_else(|| json.get("message"))
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string())
                })
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status
                            .canonical_reason()
                            .unwrap_or("Request failed")
                            .to_string()
                    } else {
                        body
                    }
                });

            anyhow::bail!("{}", message);
        }

        Ok(response)
    }
}
