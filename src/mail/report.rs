use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::html::{HtmlRenderer, DEFAULT_STYLE};
use crate::mail::{MailMessage, Mailer};
use crate::Result;

/// Report mail: a [`MailMessage`] plus template-driven body generation,
/// a CSS style block and optional cleanup of temporary chart images
/// after a successful send.
pub struct ReportMail {
    message: MailMessage,
    temp_images: Vec<PathBuf>,
    clear_images: bool,
}

impl ReportMail {
    pub fn new(from: impl Into<String>) -> Self {
        Self {
            message: MailMessage::new(from),
            temp_images: Vec::new(),
            clear_images: false,
        }
    }

    pub fn to(mut self, recipient: impl Into<String>) -> Self {
        self.message = self.message.to(recipient);
        self
    }

    pub fn recipients(mut self, recipients: Vec<String>) -> Self {
        self.message = self.message.recipients(recipients);
        self
    }

    pub fn cc(mut self, recipients: Vec<String>) -> Self {
        self.message = self.message.cc(recipients);
        self
    }

    pub fn bcc(mut self, recipients: Vec<String>) -> Self {
        self.message = self.message.bcc(recipients);
        self
    }

    pub fn subject(mut self, subject: impl Into<Vec<u8>>) -> Self {
        self.message = self.message.subject(subject);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.message = self.message.body(body);
        self
    }

    /// Render a template string into the mail body.
    pub fn set_template_body<C: Serialize>(
        &mut self,
        renderer: &HtmlRenderer,
        template: &str,
        ctx: C,
    ) -> Result<()> {
        let body = renderer.render_str(template, ctx)?;
        self.message.set_body(body);
        Ok(())
    }

    /// Use `css` as the style block instead of the built-in default.
    pub fn set_style(&mut self, css: impl Into<String>) {
        self.message.set_style(css);
    }

    /// Load the style block from an external CSS file.
    pub fn set_style_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let css = fs::read_to_string(path)?;
        self.message.set_style(css);
        Ok(())
    }

    /// Attach tag → image file pairs, remembering the files as temporary.
    pub fn add_images<I, S, P>(&mut self, images: I) -> Result<()>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: AsRef<Path>,
    {
        for (tag, path) in images {
            let path = path.as_ref().to_path_buf();
            self.message.add_one_image(tag, &path)?;
            self.temp_images.push(path);
        }
        Ok(())
    }

    pub fn add_one_image(&mut self, cid_tag: impl Into<String>, path: impl AsRef<Path>) -> Result<()> {
        self.message.add_one_image(cid_tag, path)
    }

    /// Delete temporary image files after a successful send.
    pub fn clear_images(&mut self, clear: bool) {
        self.clear_images = clear;
    }

    pub fn message(&self) -> &MailMessage {
        &self.message
    }

    /// Compose and deliver, applying the default style when none was set.
    pub fn send(&mut self, mailer: &Mailer) -> Result<()> {
        if self.message.style().is_none() {
            self.message.set_style(DEFAULT_STYLE);
        }
        let composed = self.message.compose()?;
        mailer.send(&composed)?;

        if self.clear_images {
            for path in self.temp_images.drain(..) {
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "failed to remove temp image");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;
    use tempfile::TempDir;

    #[test]
    fn test_template_body() {
        let renderer = HtmlRenderer::new();
        let mut mail = ReportMail::new("r <r@example.com>")
            .to("k@example.com")
            .subject("s");
        mail.set_template_body(
            &renderer,
            "<h2>{{ name }}</h2>{{ table }}",
            context! { name => "KPI", table => "<table></table>" },
        )
        .unwrap();

        let raw = String::from_utf8(mail.message().compose().unwrap().formatted()).unwrap();
        assert!(raw.contains("<h2>KPI</h2>"));
    }

    #[test]
    fn test_style_file() {
        let dir = TempDir::new().unwrap();
        let css = dir.path().join("style.html");
        fs::write(&css, "<style>td { color: red }</style>").unwrap();

        let mut mail = ReportMail::new("r <r@example.com>")
            .to("k@example.com")
            .subject("s")
            .body("<p>x</p>");
        mail.set_style_file(&css).unwrap();

        let raw = String::from_utf8(mail.message().compose().unwrap().formatted()).unwrap();
        assert!(raw.contains("color: red"));
    }

    #[test]
    fn test_missing_style_file_surfaces_io_error() {
        let mut mail = ReportMail::new("r <r@example.com>");
        let err = mail.set_style_file("/no/such/style.html").unwrap_err();
        assert!(matches!(err, crate::ReportError::Io(_)));
    }

    #[test]
    fn test_tracked_temp_images() {
        let dir = TempDir::new().unwrap();
        let img = dir.path().join("c1.png");
        fs::write(&img, [0x89u8, 0x50]).unwrap();

        let mut mail = ReportMail::new("r <r@example.com>")
            .to("k@example.com")
            .subject("s")
            .body("<p>x</p>");
        mail.add_images([("c1".to_string(), img.clone())]).unwrap();
        mail.clear_images(true);

        // compose works with the image attached; the file is only removed
        // after a successful send, which is not attempted here
        assert!(img.exists());
        let raw = String::from_utf8(mail.message().compose().unwrap().formatted()).unwrap();
        assert!(raw.contains("Content-ID: <c1>"));
    }
}
