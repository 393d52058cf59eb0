//! Email service module for server error notifications
//!
//! When SMTP and a recipient are configured, every 5xx response triggers a
//! plain-text report with the request method, URL, error message and the
//! stack of the handler that reported the failure.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::config::SmtpConfig;

/// Email service errors
#[derive(Debug, Error)]
pub enum EmailError {
    #[error("SMTP transport error: {0}")]
    SmtpError(String),

    #[error("Failed to build email: {0}")]
    BuildError(String),

    #[error("Email service not configured")]
    NotConfigured,
}

/// What went wrong while serving one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub method: String,
    pub url: String,
    pub message: String,
    /// Backtrace taken when the handler reports the error, not where the
    /// upstream call failed
    pub trace: String,
}

impl ErrorReport {
    pub fn subject(&self) -> String {
        format!("[media-scraper] {} {} failed", self.method, self.url)
    }

    pub fn body(&self) -> String {
        format!(
            "Request: {} {}\n\nError: {}\n\nTrace:\n{}\n",
            self.method, self.url, self.message, self.trace
        )
    }
}

/// Sends error notifications to a single recipient
#[derive(Clone)]
pub struct EmailService {
    config: SmtpConfig,
    recipient: String,
}

impl EmailService {
    /// Create a new email service
    pub fn new(config: SmtpConfig, recipient: String) -> Self {
        Self { config, recipient }
    }

    /// Build a service only when both SMTP and a recipient are configured
    pub fn from_parts(
        config: Option<SmtpConfig>,
        recipient: Option<String>,
    ) -> Result<Self, EmailError> {
        match (config, recipient) {
            (Some(config), Some(recipient)) => Ok(Self::new(config, recipient)),
            _ => Err(EmailError::NotConfigured),
        }
    }

    /// Build SMTP transport
    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let creds = Credentials::new(self.config.username.clone(), self.config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.host)
            .map_err(|e| EmailError::SmtpError(e.to_string()))?
            .credentials(creds)
            .port(self.config.port)
            .build();

        Ok(transport)
    }

    fn build_message(&self, report: &ErrorReport) -> Result<Message, EmailError> {
        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        Message::builder()
            .from(from.parse().map_err(|e| EmailError::BuildError(format!("{}", e)))?)
            .to(self
                .recipient
                .parse()
                .map_err(|e| EmailError::BuildError(format!("{}", e)))?)
            .subject(report.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(report.body())
            .map_err(|e| EmailError::BuildError(e.to_string()))
    }

    /// Send an error notification
    pub async fn send_error_notification(&self, report: &ErrorReport) -> Result<(), EmailError> {
        let email = self.build_message(report)?;

        let transport = self.build_transport()?;
        transport
            .send(email)
            .await
            .map_err(|e| EmailError::SmtpError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smtp() -> SmtpConfig {
        SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "user".to_string(),
            password: "secret".to_string(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Media Scraper".to_string(),
        }
    }

    fn report() -> ErrorReport {
        ErrorReport {
            method: "GET".to_string(),
            url: "/anime/info?id=naruto".to_string(),
            message: "Server returned status 502".to_string(),
            trace: "0: media_scraper::routes::anime_info".to_string(),
        }
    }

    #[test]
    fn test_email_error_display() {
        let err = EmailError::NotConfigured;
        assert_eq!(err.to_string(), "Email service not configured");

        let err = EmailError::SmtpError("connection failed".to_string());
        assert_eq!(err.to_string(), "SMTP transport error: connection failed");
    }

    #[test]
    fn test_from_parts_requires_both() {
        assert!(EmailService::from_parts(Some(smtp()), Some("ops@example.com".into())).is_ok());
        assert!(matches!(
            EmailService::from_parts(Some(smtp()), None),
            Err(EmailError::NotConfigured)
        ));
        assert!(matches!(
            EmailService::from_parts(None, Some("ops@example.com".into())),
            Err(EmailError::NotConfigured)
        ));
    }

    #[test]
    fn test_report_contents() {
        let report = report();
        assert_eq!(report.subject(), "[media-scraper] GET /anime/info?id=naruto failed");
        let body = report.body();
        assert!(body.contains("Server returned status 502"));
        assert!(body.contains("media_scraper::routes::anime_info"));
    }

    #[test]
    fn test_build_message() {
        let service = EmailService::new(smtp(), "ops@example.com".to_string());
        assert!(service.build_message(&report()).is_ok());

        let service = EmailService::new(smtp(), "not an address".to_string());
        assert!(matches!(
            service.build_message(&report()),
            Err(EmailError::BuildError(_))
        ));
    }
}
