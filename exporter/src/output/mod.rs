//! Output naming and writing.
//!
//! - [`filename`] - `{placeholder}` templates for export file names
//! - [`csv`] - CSV serialization of a [`crate::records::Table`]

pub mod csv;
pub mod filename;

pub use self::csv::{cell_to_string, write_csv, write_csv_to};
pub use filename::{
    describe, render_filename, FilenameContext, COMPACT_TIMESTAMP_FORMAT, PLACEHOLDERS,
    TIMESTAMP_FORMAT,
};
