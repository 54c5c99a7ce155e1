//! Databases and frames as addressed by the client.
//!
//! These are plain values: constructing one validates its names, and the
//! dispatcher reads them to build request paths and bodies.

use crate::protocol::error::Result;
use crate::validation::{validate_database_name, validate_frame_name, validate_label};

pub const DEFAULT_COLUMN_LABEL: &str = "profileID";
pub const DEFAULT_ROW_LABEL: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseOptions {
    column_label: String,
}

impl DatabaseOptions {
    pub fn with_column_label(column_label: impl Into<String>) -> Result<Self> {
        let column_label = column_label.into();
        validate_label(&column_label)?;
        Ok(Self { column_label })
    }

    pub fn column_label(&self) -> &str {
        &self.column_label
    }
}

impl Default for DatabaseOptions {
    fn default() -> Self {
        Self {
            column_label: DEFAULT_COLUMN_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    row_label: String,
}

impl FrameOptions {
    pub fn with_row_label(row_label: impl Into<String>) -> Result<Self> {
        let row_label = row_label.into();
        validate_label(&row_label)?;
        Ok(Self { row_label })
    }

    pub fn row_label(&self) -> &str {
        &self.row_label
    }
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            row_label: DEFAULT_ROW_LABEL.to_string(),
        }
    }
}

/// A Pilosa database (a named grouping of frames).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Database {
    name: String,
    options: DatabaseOptions,
}

impl Database {
    /// Database with the default `profileID` column label.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::with_options(name, DatabaseOptions::default())
    }

    pub fn with_column_label(name: impl Into<String>, label: impl Into<String>) -> Result<Self> {
        Self::with_options(name, DatabaseOptions::with_column_label(label)?)
    }

    pub fn with_options(name: impl Into<String>, options: DatabaseOptions) -> Result<Self> {
        let name = name.into();
        validate_database_name(&name)?;
        Ok(Self { name, options })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &DatabaseOptions {
        &self.options
    }

    /// Frame in this database with the default `id` row label.
    pub fn frame(&self, name: impl Into<String>) -> Result<Frame> {
        self.frame_with_options(name, FrameOptions::default())
    }

    pub fn frame_with_row_label(
        &self,
        name: impl Into<String>,
        label: impl Into<String>,
    ) -> Result<Frame> {
        self.frame_with_options(name, FrameOptions::with_row_label(label)?)
    }

    pub fn frame_with_options(&self, name: impl Into<String>, options: FrameOptions) -> Result<Frame> {
        let name = name.into();
        validate_frame_name(&name)?;
        Ok(Frame {
            name,
            database: self.clone(),
            options,
        })
    }
}

/// A Pilosa frame: row-indexed attributes inside a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    name: String,
    database: Database,
    options: FrameOptions,
}

impl Frame {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn options(&self) -> &FrameOptions {
        &self.options
    }
}
