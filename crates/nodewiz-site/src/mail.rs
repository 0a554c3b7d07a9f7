//! Outbound notification mail.
//!
//! Delivery is best effort: callers log a failed send and carry on. There are
//! no retries and no queue.

use std::{future::Future, time::Duration};

use lettre::{
  AsyncSmtpTransport, AsyncTransport as _, Message, Tokio1Executor,
  message::{Mailbox, header::ContentType},
  transport::smtp::authentication::Credentials,
};
use nodewiz_core::contact::ContactSubmission;
use thiserror::Error;

use crate::config::{EmailBackendKind, SiteConfig};

const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum MailError {
  #[error("invalid address {address:?}: {source}")]
  Address {
    address: String,
    #[source]
    source:  lettre::address::AddressError,
  },

  #[error("failed to build message: {0}")]
  Build(#[from] lettre::error::Error),

  #[error("smtp error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),

  #[error("mail transport unavailable: {0}")]
  Unavailable(String),
}

/// A plain-text notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub from:    String,
  pub to:      Vec<String>,
  pub subject: String,
  pub body:    String,
}

impl Notification {
  /// The message sent to the team for every new contact submission.
  pub fn contact_submission(submission: &ContactSubmission, from: &str, to: &str) -> Self {
    Self {
      from:    from.to_owned(),
      to:      vec![to.to_owned()],
      subject: format!("New Contact Form Submission from {}", submission.name),
      body:    format!(
        "New contact form submission:\n\n\
         Name: {}\n\
         Email: {}\n\
         Company: {}\n\
         Message: {}\n",
        submission.name, submission.email, submission.company, submission.message,
      ),
    }
  }
}

/// Something that can deliver a [`Notification`].
pub trait Mailer: Send + Sync {
  fn send(&self, message: &Notification) -> impl Future<Output = Result<(), MailError>> + Send;
}

/// The mailer selected by `EMAIL_BACKEND`.
pub enum MailBackend {
  Console,
  Smtp(AsyncSmtpTransport<Tokio1Executor>),
  Disabled,
}

impl MailBackend {
  pub fn from_config(config: &SiteConfig) -> Result<Self, MailError> {
    Ok(match config.email_backend {
      EmailBackendKind::Console => Self::Console,
      EmailBackendKind::Disabled => Self::Disabled,
      EmailBackendKind::Smtp => {
        let builder = if config.email_use_tls {
          AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.email_host)?
        } else {
          AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.email_host)
        };
        let mut builder = builder.port(config.email_port).timeout(Some(SMTP_TIMEOUT));
        if !config.email_host_user.is_empty() {
          builder = builder.credentials(Credentials::new(
            config.email_host_user.clone(),
            config.email_host_password.clone(),
          ));
        }
        Self::Smtp(builder.build())
      }
    })
  }

  pub fn name(&self) -> &'static str {
    match self {
      Self::Console => "console",
      Self::Smtp(_) => "smtp",
      Self::Disabled => "disabled",
    }
  }
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
  address.parse().map_err(|source| MailError::Address {
    address: address.to_owned(),
    source,
  })
}

fn build_message(n: &Notification) -> Result<Message, MailError> {
  let mut builder = Message::builder()
    .from(mailbox(&n.from)?)
    .subject(n.subject.clone())
    .header(ContentType::TEXT_PLAIN);
  for to in &n.to {
    builder = builder.to(mailbox(to)?);
  }
  Ok(builder.body(n.body.clone())?)
}

impl Mailer for MailBackend {
  async fn send(&self, n: &Notification) -> Result<(), MailError> {
    match self {
      Self::Console => {
        build_message(n)?;
        tracing::info!(
          from = %n.from,
          to = %n.to.join(", "),
          subject = %n.subject,
          "outgoing mail (console backend)\n{}",
          n.body
        );
        Ok(())
      }
      Self::Smtp(transport) => {
        let message = build_message(n)?;
        transport.send(message).await?;
        Ok(())
      }
      Self::Disabled => Ok(()),
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;

  fn submission() -> ContactSubmission {
    ContactSubmission {
      id:           1,
      name:         "Ada".into(),
      email:        "ada@example.com".into(),
      company:      "Analytical".into(),
      message:      "Can we talk?".into(),
      submitted_at: Utc::now(),
    }
  }

  #[test]
  fn contact_notification_contents() {
    let n = Notification::contact_submission(&submission(), "noreply@nodewiz.ai", "contact@nodewiz.ai");
    assert_eq!(n.subject, "New Contact Form Submission from Ada");
    assert_eq!(n.to, vec!["contact@nodewiz.ai"]);
    assert!(n.body.contains("Email: ada@example.com"));
    assert!(n.body.contains("Company: Analytical"));
    assert!(n.body.contains("Message: Can we talk?"));
  }

  #[test]
  fn message_builds_with_valid_addresses() {
    let n = Notification::contact_submission(&submission(), "noreply@nodewiz.ai", "contact@nodewiz.ai");
    assert!(build_message(&n).is_ok());
  }

  #[test]
  fn invalid_sender_is_reported() {
    let n = Notification::contact_submission(&submission(), "not an address", "contact@nodewiz.ai");
    assert!(matches!(build_message(&n), Err(MailError::Address { .. })));
  }

  #[tokio::test]
  async fn console_and_disabled_backends_succeed() {
    let n = Notification::contact_submission(&submission(), "noreply@nodewiz.ai", "contact@nodewiz.ai");
    assert!(MailBackend::Console.send(&n).await.is_ok());
    assert!(MailBackend::Disabled.send(&n).await.is_ok());
  }

  #[test]
  fn backend_selection_follows_config() {
    let mut cfg = SiteConfig::default();
    assert_eq!(MailBackend::from_config(&cfg).unwrap().name(), "console");

    cfg.email_backend = EmailBackendKind::Disabled;
    assert_eq!(MailBackend::from_config(&cfg).unwrap().name(), "disabled");
  }
}
