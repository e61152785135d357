use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::{self, SmtpTransport};
use lettre::{Message, Transport};
use std::time::Duration;
use tracing::warn;

use crate::{ReportError, Result};

const DEFAULT_MAX_RETRIES: u32 = 100;
const DEFAULT_RETRY_PAUSE: Duration = Duration::from_secs(3);

/// Delivers composed messages through one SMTP relay.
///
/// Every delivery failure is treated as transient: the attempt is logged
/// and repeated after a fixed pause, up to `max_retries` retries. When
/// the budget is exhausted a `Delivery` error is returned to the caller.
#[derive(Clone)]
pub struct Mailer {
    relay: String,
    credentials: Option<Credentials>,
    max_retries: u32,
    retry_pause: Duration,
}

impl Mailer {
    pub fn new(relay: impl Into<String>) -> Result<Self> {
        let relay = relay.into();
        if relay.trim().is_empty() {
            return Err(ReportError::Config(
                "mail relay cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            relay,
            credentials: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_pause: DEFAULT_RETRY_PAUSE,
        })
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username.into(), password.into()));
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }

    /// Send `message`, retrying sequentially on any failure.
    pub fn send(&self, message: &Message) -> Result<()> {
        self.send_with(|| self.try_send(message).map_err(|e| e.to_string()))
    }

    /// Retry loop over one delivery attempt.
    fn send_with<F>(&self, mut attempt_fn: F) -> Result<()>
    where
        F: FnMut() -> std::result::Result<(), String>,
    {
        let mut attempt = 0u32;
        loop {
            match attempt_fn() {
                Ok(()) => return Ok(()),
                Err(cause) => {
                    warn!(attempt, relay = %self.relay, %cause, "mail delivery failed");
                    if attempt >= self.max_retries {
                        return Err(ReportError::Delivery(format!(
                            "giving up after {} attempts: {}",
                            attempt + 1,
                            cause
                        )));
                    }
                    attempt += 1;
                    std::thread::sleep(self.retry_pause);
                }
            }
        }
    }

    /// One delivery attempt: plaintext session first, falling back to the
    /// TLS-wrapped transport when the server rejects authentication with
    /// SMTP code 530.
    fn try_send(&self, message: &Message) -> std::result::Result<(), smtp::Error> {
        let mut builder = SmtpTransport::builder_dangerous(self.relay.as_str());
        if let Some(credentials) = &self.credentials {
            builder = builder.credentials(credentials.clone());
        }

        match builder.build().send(message) {
            Ok(_) => Ok(()),
            Err(e) if self.credentials.is_some() && is_auth_method_mismatch(&e) => {
                let mut tls_builder = SmtpTransport::relay(self.relay.as_str())?;
                if let Some(credentials) = &self.credentials {
                    tls_builder = tls_builder.credentials(credentials.clone());
                }
                tls_builder.build().send(message).map(|_| ())
            }
            Err(e) => Err(e),
        }
    }
}

fn is_auth_method_mismatch(error: &smtp::Error) -> bool {
    error
        .status()
        .map_or(false, |code| code.to_string() == "530")
}
