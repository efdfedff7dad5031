//! Email service for delivering analysis reports via SMTP.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use malscan_core::{EmailStatus, SmtpConfig};
use std::path::Path;

const SUBJECT: &str = "Your Malware Analysis Report is Ready";
const BODY: &str = "Attached is the malware analysis report for your submitted file.";
const NOT_CONFIGURED: &str = "SMTP settings are not configured. Cannot send email.";

/// Sends reports as attachments. Each call opens its own STARTTLS session;
/// failures are reported in the returned [`EmailStatus`], never raised.
#[derive(Clone)]
pub struct EmailService {
    smtp: SmtpConfig,
}

struct Ready<'a> {
    server: &'a str,
    sender: &'a str,
    password: &'a str,
}

impl EmailService {
    pub fn new(smtp: SmtpConfig) -> Self {
        Self { smtp }
    }

    pub fn is_configured(&self) -> bool {
        self.smtp.is_configured()
    }

    fn settings(&self) -> Option<Ready<'_>> {
        Some(Ready {
            server: self.smtp.server.as_deref()?,
            sender: self.smtp.sender.as_deref()?,
            password: self.smtp.password.as_deref()?,
        })
    }

    /// Email `report` to `recipient`.
    pub async fn send_report(&self, report: &Path, recipient: &str) -> EmailStatus {
        let Some(settings) = self.settings() else {
            tracing::error!("{}", NOT_CONFIGURED);
            return EmailStatus::failed(NOT_CONFIGURED);
        };

        match self.deliver(&settings, report, recipient).await {
            Ok(()) => {
                tracing::info!(recipient = %recipient, "Successfully sent email report");
                EmailStatus::sent()
            }
            Err(error) => {
                tracing::error!(recipient = %recipient, error = %error, "Failed to send email report");
                EmailStatus::failed(error)
            }
        }
    }

    async fn deliver(&self, settings: &Ready<'_>, report: &Path, recipient: &str) -> Result<(), String> {
        let to: Mailbox = recipient
            .parse()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;
        let from: Mailbox = settings
            .sender
            .parse()
            .map_err(|e| format!("Invalid EMAIL_SENDER: {}", e))?;

        let attachment_name = report
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("report.pdf")
            .to_string();
        let pdf = tokio::fs::read(report)
            .await
            .map_err(|e| format!("Failed to read report: {}", e))?;
        let pdf_type = ContentType::parse("application/pdf").map_err(|e| e.to_string())?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(SUBJECT)
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(BODY.to_string()))
                    .singlepart(Attachment::new(attachment_name).body(pdf, pdf_type)),
            )
            .map_err(|e| e.to_string())?;

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(settings.server)
            .map_err(|e| e.to_string())?
            .port(self.smtp.port)
            .credentials(Credentials::new(
                settings.sender.to_string(),
                settings.password.to_string(),
            ))
            .build();

        mailer.send(email).await.map_err(|e| e.to_string())?;
        Ok(())
    }
}
