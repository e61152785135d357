//! HTML table generation from query results.
//!
//! [`SqlTable`] renders one query as-is (optionally reordered by a
//! caller-supplied value list). [`MultiSqlTable`] joins several queries
//! on a composite key of their leading columns, like a JOIN done after
//! the fact, with derived columns and per-column display formatting.

mod joined;
mod single;

pub use joined::{MultiSqlTable, Record};
pub use single::SqlTable;
