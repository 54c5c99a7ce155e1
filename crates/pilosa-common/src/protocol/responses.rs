use std::collections::BTreeMap;

use prost::Message;
use serde::Serialize;

use crate::protocol::error::{PilosaError, Result};
use crate::protocol::wire;

/// Value of a row or column attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    String(String),
    Int(i64),
    Bool(bool),
    Float(f64),
}

pub type Attributes = BTreeMap<String, AttrValue>;

fn attributes_from_wire(attrs: Vec<wire::Attr>) -> Result<Attributes> {
    attrs
        .into_iter()
        .map(|attr| {
            let value = match attr.r#type {
                wire::ATTR_TYPE_STRING => AttrValue::String(attr.string_value),
                wire::ATTR_TYPE_INT => AttrValue::Int(attr.int_value),
                wire::ATTR_TYPE_BOOL => AttrValue::Bool(attr.bool_value),
                wire::ATTR_TYPE_FLOAT => AttrValue::Float(attr.float_value),
                other => {
                    return Err(PilosaError::Decode(format!(
                        "unknown attribute type {} for key '{}'",
                        other, attr.key
                    )))
                }
            };
            Ok((attr.key, value))
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BitmapResult {
    pub bits: Vec<u64>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountResultItem {
    pub key: u64,
    pub count: u64,
}

/// Result of one call in a query.
///
/// Which fields are populated depends on the call: `Bitmap` and friends fill
/// `bitmap`, `Count` fills `count`, `TopN` fills `count_items`, and
/// `SetBit`/`ClearBit` report `changed`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryResult {
    pub bitmap: BitmapResult,
    pub count_items: Vec<CountResultItem>,
    pub count: u64,
    pub changed: bool,
}

impl TryFrom<wire::QueryResult> for QueryResult {
    type Error = PilosaError;

    fn try_from(result: wire::QueryResult) -> Result<Self> {
        let bitmap = match result.bitmap {
            Some(bitmap) => BitmapResult {
                bits: bitmap.bits,
                attributes: attributes_from_wire(bitmap.attrs)?,
            },
            None => BitmapResult::default(),
        };
        Ok(Self {
            bitmap,
            count_items: result
                .pairs
                .into_iter()
                .map(|pair| CountResultItem {
                    key: pair.key,
                    count: pair.count,
                })
                .collect(),
            count: result.n,
            changed: result.changed,
        })
    }
}

/// Attributes of one column, returned when profiles were requested.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileItem {
    pub id: u64,
    pub attributes: Attributes,
}

impl TryFrom<wire::Profile> for ProfileItem {
    type Error = PilosaError;

    fn try_from(profile: wire::Profile) -> Result<Self> {
        Ok(Self {
            id: profile.id,
            attributes: attributes_from_wire(profile.attrs)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse {
    pub results: Vec<QueryResult>,
    pub profiles: Vec<ProfileItem>,
    pub error_message: String,
    pub success: bool,
}

impl QueryResponse {
    /// Decodes a protobuf `/query` response body.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let response = wire::QueryResponse::decode(buf)?;
        Self::try_from(response)
    }

    /// First result, which is the only one for single-call queries.
    pub fn result(&self) -> Option<&QueryResult> {
        self.results.first()
    }

    pub fn profile(&self) -> Option<&ProfileItem> {
        self.profiles.first()
    }

    /// Turns a server-reported query failure into [`PilosaError::Query`].
    pub fn into_result(self) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(PilosaError::Query(self.error_message))
        }
    }
}

impl TryFrom<wire::QueryResponse> for QueryResponse {
    type Error = PilosaError;

    fn try_from(response: wire::QueryResponse) -> Result<Self> {
        if !response.err.is_empty() {
            return Ok(Self {
                results: Vec::new(),
                profiles: Vec::new(),
                error_message: response.err,
                success: false,
            });
        }

        Ok(Self {
            results: response
                .results
                .into_iter()
                .map(QueryResult::try_from)
                .collect::<Result<_>>()?,
            profiles: response
                .profiles
                .into_iter()
                .map(ProfileItem::try_from)
                .collect::<Result<_>>()?,
            error_message: String::new(),
            success: true,
        })
    }
}
