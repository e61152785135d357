//! Mail composition and delivery.
//!
//! [`MailMessage`] assembles a `multipart/related` HTML message with
//! inline cid-tagged images. [`Mailer`] owns the SMTP relay, credentials
//! and the bounded retry policy. [`ReportMail`] layers report niceties on
//! top: template-rendered body, CSS style block and temp-image cleanup.

mod delivery;
mod message;
mod report;

pub use delivery::Mailer;
pub use message::MailMessage;
pub use report::ReportMail;
