//! Status notification email
//!
//! Notification delivery is best-effort from the transition operation's
//! perspective: a transport failure is logged and never rolls back the
//! committed status change.

use lettre::{
    message::{header::ContentType, Mailbox, Message},
    transport::smtp::authentication::Credentials,
    SmtpTransport, Transport,
};

use crate::config::SmtpConfig;
use crate::error::{NotificationError, Result};
use crate::submission::SubmissionStatus;

/// A status-change notification addressed to the submission owner
#[derive(Debug, Clone)]
pub struct StatusNotification {
    pub to_email: String,
    pub status: SubmissionStatus,
    pub title: String,
    pub submission_id: String,
    pub link: String,
}

impl StatusNotification {
    /// Subject line for the notification
    pub fn subject(&self) -> String {
        format!("Submission update: {}", self.title)
    }

    /// Templated message body for the new status
    pub fn body(&self) -> String {
        let lead = match self.status {
            SubmissionStatus::Published => format!(
                "Congratulations! Your manuscript \"{}\" has been published.",
                self.title
            ),
            SubmissionStatus::Rejected => format!(
                "We are sorry to inform you that your manuscript \"{}\" was not accepted for publication.",
                self.title
            ),
            SubmissionStatus::UnderReview => format!(
                "Your manuscript \"{}\" is now under editorial review.",
                self.title
            ),
            other => format!(
                "The status of your manuscript \"{}\" is now {}.",
                self.title, other
            ),
        };
        format!(
            "{}\n\nSubmission: {}\nDetails: {}\n",
            lead, self.submission_id, self.link
        )
    }
}

/// Delivery channel for status notifications
pub trait Notifier: Send + Sync {
    /// Send a status-change notification
    fn status_changed(&self, notification: &StatusNotification) -> Result<()>;
}

/// SMTP-backed notifier
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from_email: String,
}

impl SmtpNotifier {
    /// Create a notifier from SMTP settings
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let creds = Credentials::new(config.username.clone(), config.password.clone());

        let transport = if config.starttls {
            SmtpTransport::starttls_relay(&config.host)
                .map_err(|e| NotificationError::Smtp(e.to_string()))?
                .credentials(creds)
                .port(config.port)
                .build()
        } else {
            SmtpTransport::relay(&config.host)
                .map_err(|e| NotificationError::Smtp(e.to_string()))?
                .credentials(creds)
                .port(config.port)
                .build()
        };

        Ok(Self {
            transport,
            from_email: config.from_email.clone(),
        })
    }
}

impl Notifier for SmtpNotifier {
    fn status_changed(&self, notification: &StatusNotification) -> Result<()> {
        let from: Mailbox = self
            .from_email
            .parse()
            .map_err(|e: lettre::address::AddressError| NotificationError::Address(e.to_string()))?;
        let to: Mailbox = notification
            .to_email
            .parse()
            .map_err(|e: lettre::address::AddressError| NotificationError::Address(e.to_string()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(notification.subject())
            .header(ContentType::TEXT_PLAIN)
            .body(notification.body())
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;

        self.transport
            .send(&message)
            .map_err(|e| NotificationError::Smtp(e.to_string()))?;

        Ok(())
    }
}

/// Notifier that drops messages, for deployments without SMTP configured
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn status_changed(&self, notification: &StatusNotification) -> Result<()> {
        tracing::debug!(
            submission_id = %notification.submission_id,
            status = %notification.status,
            "no SMTP configured, dropping status notification"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(status: SubmissionStatus) -> StatusNotification {
        StatusNotification {
            to_email: "author@example.com".to_string(),
            status,
            title: "AI in Healthcare".to_string(),
            submission_id: "sub-1".to_string(),
            link: "https://journal.example.com/articles/sub-1".to_string(),
        }
    }

    #[test]
    fn test_published_template() {
        let body = notification(SubmissionStatus::Published).body();
        assert!(body.contains("published"));
        assert!(body.contains("AI in Healthcare"));
        assert!(body.contains("https://journal.example.com/articles/sub-1"));
    }

    #[test]
    fn test_rejected_template() {
        let body = notification(SubmissionStatus::Rejected).body();
        assert!(body.contains("not accepted"));
    }

    #[test]
    fn test_under_review_template() {
        let body = notification(SubmissionStatus::UnderReview).body();
        assert!(body.contains("under editorial review"));
    }

    #[test]
    fn test_generic_template() {
        let body = notification(SubmissionStatus::Submitted).body();
        assert!(body.contains("SUBMITTED"));
    }

    #[test]
    fn test_null_notifier_accepts() {
        let n = NullNotifier;
        assert!(n.status_changed(&notification(SubmissionStatus::Published)).is_ok());
    }
}
