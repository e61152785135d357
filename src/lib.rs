pub mod chart;
pub mod db;
pub mod html;
pub mod mail;
pub mod table;

pub use crate::chart::{ChartRenderer, LineChart, StackChart};
pub use crate::db::{QueryExecutor, ResultSet, Value};
pub use crate::html::HtmlRenderer;
pub use crate::mail::{MailMessage, Mailer, ReportMail};
pub use crate::table::{MultiSqlTable, SqlTable};

use thiserror::Error;

/// Main error type for report generation
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Column name conflict: {} already in data set", .0.join(","))]
    ColumnConflict(Vec<String>),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Delivery error: {0}")]
    Delivery(String),
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

impl From<serde_json::Error> for ReportError {
    fn from(err: serde_json::Error) -> Self {
        ReportError::Render(err.to_string())
    }
}

impl From<minijinja::Error> for ReportError {
    fn from(err: minijinja::Error) -> Self {
        ReportError::Template(err.to_string())
    }
}

impl From<lettre::error::Error> for ReportError {
    fn from(err: lettre::error::Error) -> Self {
        ReportError::Config(err.to_string())
    }
}

impl From<lettre::address::AddressError> for ReportError {
    fn from(err: lettre::address::AddressError) -> Self {
        ReportError::Config(format!("invalid mail address: {}", err))
    }
}
