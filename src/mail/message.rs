use encoding_rs::{Encoding, GBK, UTF_8};
use indexmap::IndexMap;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, Message, MultiPart, SinglePart};
use std::fs;
use std::path::Path;

use crate::{ReportError, Result};

struct InlineImage {
    data: Vec<u8>,
    mime: &'static str,
}

/// An HTML mail with inline images.
///
/// Subject and body are held as raw bytes and decoded through an ordered
/// list of candidate encodings (default UTF-8 then GBK) when the message
/// is composed. Images are attached inline under a caller-chosen cid tag
/// referenced from the body as `<img src="cid:tag">`; a tag referenced
/// but never registered simply dangles.
pub struct MailMessage {
    from: String,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    subject: Vec<u8>,
    body: Vec<u8>,
    style: Option<String>,
    images: IndexMap<String, InlineImage>,
    encodings: Vec<&'static Encoding>,
}

impl MailMessage {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: Vec::new(),
            body: Vec::new(),
            style: None,
            images: IndexMap::new(),
            encodings: vec![UTF_8, GBK],
        }
    }

    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.to.push(recipient.into());
        self
    }

    pub fn recipients(mut self, recipients: Vec<String>) -> Self {
        self.to = recipients;
        self
    }

    pub fn cc(mut self, recipients: Vec<String>) -> Self {
        self.cc = recipients;
        self
    }

    pub fn bcc(mut self, recipients: Vec<String>) -> Self {
        self.bcc = recipients;
        self
    }

    pub fn subject(mut self, subject: impl Into<Vec<u8>>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.set_body(body);
        self
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// CSS block prepended to the body at composition time.
    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style = Some(style.into());
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    /// Candidate encodings tried in order when decoding subject and body.
    pub fn encodings(mut self, encodings: Vec<&'static Encoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Read an image file and attach it inline under `cid_tag`.
    pub fn add_one_image(&mut self, cid_tag: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        self.images.insert(
            cid_tag.into(),
            InlineImage {
                data,
                mime: mime_for(path),
            },
        );
        Ok(())
    }

    /// Attach several tag → file pairs at once.
    pub fn add_images<I, S, P>(&mut self, images: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: AsRef<Path>,
    {
        for (tag, path) in images {
            self.add_one_image(tag, path)?;
        }
        Ok(())
    }

    /// All addresses the message will be delivered to.
    pub fn all_recipients(&self) -> Vec<&str> {
        self.to
            .iter()
            .chain(self.cc.iter())
            .chain(self.bcc.iter())
            .map(String::as_str)
            .collect()
    }

    /// Build the MIME message: one HTML text part plus one inline image
    /// part per registered tag.
    pub fn compose(&self) -> Result<Message> {
        let subject = decode_text(&self.subject, &self.encodings)?;
        let body = decode_text(&self.body, &self.encodings)?;
        let content = match &self.style {
            Some(style) => format!("{}{}", style, body),
            None => body,
        };

        let mut builder = Message::builder()
            .from(parse_mailbox(&self.from)?)
            .subject(subject);
        for recipient in &self.to {
            builder = builder.to(parse_mailbox(recipient)?);
        }
        for recipient in &self.cc {
            builder = builder.cc(parse_mailbox(recipient)?);
        }
        for recipient in &self.bcc {
            builder = builder.bcc(parse_mailbox(recipient)?);
        }

        let mut related = MultiPart::related().singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(content),
        );
        for (tag, image) in &self.images {
            let content_type = ContentType::parse(image.mime)
                .map_err(|e| ReportError::Config(format!("bad image content type: {}", e)))?;
            related = related.singlepart(
                Attachment::new_inline(tag.clone()).body(image.data.clone(), content_type),
            );
        }

        Ok(builder.multipart(related)?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| ReportError::Config(format!("invalid mail address {}: {}", address, e)))
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Decode bytes with the first candidate encoding that decodes cleanly.
fn decode_text(bytes: &[u8], encodings: &[&'static Encoding]) -> Result<String> {
    for encoding in encodings {
        let (text, _, had_errors) = encoding.decode(bytes);
        if !had_errors {
            return Ok(text.into_owned());
        }
    }
    Err(ReportError::Encoding(format!(
        "content not decodable with any of: {}",
        encodings
            .iter()
            .map(|e| e.name())
            .collect::<Vec<_>>()
            .join(", ")
    )))
}
