use prost::Message;
use serde::{Deserialize, Serialize};

use crate::model::{Database, Frame};
use crate::protocol::wire;

/// Options sent along with a query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Ask the server to return the profiles (column attributes) of the
    /// columns in bitmap results.
    pub profiles: bool,
}

impl QueryOptions {
    pub fn with_profiles(mut self, profiles: bool) -> Self {
        self.profiles = profiles;
        self
    }
}

/// Encodes the `/query` request envelope.
pub fn encode_query_request(db: &str, query: &str, options: &QueryOptions) -> Vec<u8> {
    wire::QueryRequest {
        db: db.to_string(),
        query: query.to_string(),
        slices: Vec::new(),
        profiles: options.profiles,
    }
    .encode_to_vec()
}

/// JSON body of `POST /db` and `DELETE /db`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseRequest {
    pub db: String,
    pub options: DatabaseRequestOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseRequestOptions {
    pub column_label: String,
}

impl From<&Database> for DatabaseRequest {
    fn from(database: &Database) -> Self {
        Self {
            db: database.name().to_string(),
            options: DatabaseRequestOptions {
                column_label: database.options().column_label().to_string(),
            },
        }
    }
}

/// JSON body of `POST /frame` and `DELETE /frame`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameRequest {
    pub db: String,
    pub frame: String,
    pub options: FrameRequestOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameRequestOptions {
    pub row_label: String,
}

impl From<&Frame> for FrameRequest {
    fn from(frame: &Frame) -> Self {
        Self {
            db: frame.database().name().to_string(),
            frame: frame.name().to_string(),
            options: FrameRequestOptions {
                row_label: frame.options().row_label().to_string(),
            },
        }
    }
}
