use serde::{Deserialize, Deserializer, Serialize};

use crate::protocol::error::{PilosaError, Result};

/// Databases and frames known to the server, as returned by `GET /schema`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub dbs: Vec<DatabaseInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub frames: Vec<FrameInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInfo {
    pub name: String,
}

/// The server encodes an empty list as `null`.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Schema {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        serde_json::from_slice(buf)
            .map_err(|e| PilosaError::Decode(format!("invalid schema response: {}", e)))
    }

    pub fn database(&self, name: &str) -> Option<&DatabaseInfo> {
        self.dbs.iter().find(|db| db.name == name)
    }
}

impl DatabaseInfo {
    pub fn frame(&self, name: &str) -> Option<&FrameInfo> {
        self.frames.iter().find(|frame| frame.name == name)
    }
}
