use serde_json::json;
use tracing::{debug, error};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("email provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Outbound email via a Mailtrap-style JSON send API. One best-effort HTTP
/// call per message; a non-success response is fatal for the request.
pub struct EmailClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl EmailClient {
    pub fn new(api_url: String, api_key: String, from_email: String, from_name: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            from_email,
            from_name,
        }
    }

    /// None when the provider is not configured; the server then logs and
    /// skips sign-up emails instead of failing registration.
    pub fn from_env() -> Option<Self> {
        let api_url = std::env::var("MAILTRAP_API_URL").ok()?;
        let api_key = std::env::var("MAILTRAP_API_KEY").ok()?;
        let from_email =
            std::env::var("MAILTRAP_FROM_EMAIL").unwrap_or_else(|_| "hello@ripple.local".into());
        let from_name = std::env::var("MAILTRAP_FROM_NAME").unwrap_or_else(|_| "Ripple".into());
        Some(Self::new(api_url, api_key, from_email, from_name))
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        debug!(to, subject, "sending email");

        let payload = json!({
            "from": { "email": self.from_email, "name": self.from_name },
            "to": [{ "email": to }],
            "subject": subject,
            "text": body,
            "category": "Account",
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body, "email provider error");
            return Err(EmailError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        debug!(to, "email sent");
        Ok(())
    }

    pub async fn send_registration_email(
        &self,
        email: &str,
        confirmation_url: &str,
    ) -> Result<(), EmailError> {
        self.send(
            email,
            "Successfully signed up",
            &format!(
                "Hi {email}! You have successfully signed up to Ripple. \
                 Please confirm your email by clicking on the following link: {confirmation_url}"
            ),
        )
        .await
    }
}
