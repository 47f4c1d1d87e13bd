//! Email sending abstraction.
//!
//! Uses Resend in production, SMTP (lettre) in development. When neither is
//! configured the code is written to the server log instead, so the login
//! flow stays usable on a bare laptop.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    Message, SmtpTransport, Transport,
    message::{Mailbox, header::ContentType},
};
use resend_rs::types::CreateEmailBaseOptions;

const FROM: &str = "KeyStorm <noreply@mail.keystorm.dev>";
const SUBJECT: &str = "Your KeyStorm login code";

fn body(code: &str) -> String {
    format!(
        "Your login code is: {}\n\nThis code expires in 15 minutes.",
        code
    )
}

/// Login-code delivery.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_login_code(&self, to: &str, code: &str) -> Result<()>;
}

/// Email sender selected from configuration.
pub enum Mailer {
    /// Resend API sender (for production)
    Resend(ResendMailer),
    /// SMTP-based sender using lettre (for development)
    Smtp(SmtpMailer),
    /// No provider configured: log the code instead of delivering it.
    Log,
}

impl Mailer {
    /// Picks Resend if an API key is provided, then SMTP, then the log-only
    /// sender.
    pub fn from_config(resend_api_key: Option<String>, smtp_url: Option<String>) -> Result<Self> {
        if let Some(api_key) = resend_api_key.filter(|k| !k.is_empty()) {
            Ok(Self::Resend(ResendMailer::new(api_key)))
        } else if let Some(url) = smtp_url.filter(|u| !u.is_empty()) {
            Ok(Self::Smtp(SmtpMailer::new(&url)?))
        } else {
            tracing::warn!("no email provider configured; login codes will be logged");
            Ok(Self::Log)
        }
    }
}

#[async_trait]
impl EmailSender for Mailer {
    async fn send_login_code(&self, to: &str, code: &str) -> Result<()> {
        match self {
            Self::Resend(sender) => sender.send_login_code(to, code).await,
            Self::Smtp(sender) => sender.send_login_code(to, code),
            Self::Log => {
                tracing::info!(email = %to, code = %code, "development-mode login code");
                Ok(())
            }
        }
    }
}

/// Resend API sender.
pub struct ResendMailer {
    client: resend_rs::Resend,
}

impl ResendMailer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: resend_rs::Resend::new(&api_key),
        }
    }

    async fn send_login_code(&self, to: &str, code: &str) -> Result<()> {
        let email =
            CreateEmailBaseOptions::new(FROM, [to], SUBJECT).with_text(&body(code));

        self.client.emails.send(email).await?;

        Ok(())
    }
}

/// SMTP sender using lettre.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(smtp_url: &str) -> Result<Self> {
        let transport = SmtpTransport::from_url(smtp_url)?.build();

        Ok(Self { transport })
    }

    fn send_login_code(&self, to: &str, code: &str) -> Result<()> {
        let email = Message::builder()
            .from(Mailbox::new(
                Some("KeyStorm".to_owned()),
                "noreply@mail.keystorm.dev".parse()?,
            ))
            .to(Mailbox::new(None, to.parse()?))
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(body(code))?;

        self.transport.send(&email)?;

        Ok(())
    }
}
