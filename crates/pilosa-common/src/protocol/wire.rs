//! Protobuf messages exchanged with the `/query` endpoint.
//!
//! Field numbers follow the server's `internal` schema; do not renumber.

#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryRequest {
    #[prost(string, tag = "1")]
    pub db: String,
    #[prost(string, tag = "2")]
    pub query: String,
    #[prost(uint64, repeated, tag = "3")]
    pub slices: Vec<u64>,
    #[prost(bool, tag = "4")]
    pub profiles: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryResponse {
    #[prost(string, tag = "1")]
    pub err: String,
    #[prost(message, repeated, tag = "2")]
    pub results: Vec<QueryResult>,
    #[prost(message, repeated, tag = "3")]
    pub profiles: Vec<Profile>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct QueryResult {
    #[prost(message, optional, tag = "1")]
    pub bitmap: Option<Bitmap>,
    #[prost(uint64, tag = "2")]
    pub n: u64,
    #[prost(message, repeated, tag = "3")]
    pub pairs: Vec<Pair>,
    #[prost(bool, tag = "4")]
    pub changed: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Bitmap {
    #[prost(uint64, repeated, tag = "1")]
    pub bits: Vec<u64>,
    #[prost(message, repeated, tag = "2")]
    pub attrs: Vec<Attr>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Pair {
    #[prost(uint64, tag = "1")]
    pub key: u64,
    #[prost(uint64, tag = "2")]
    pub count: u64,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Profile {
    #[prost(uint64, tag = "1")]
    pub id: u64,
    #[prost(message, repeated, tag = "2")]
    pub attrs: Vec<Attr>,
}

pub const ATTR_TYPE_STRING: u64 = 1;
pub const ATTR_TYPE_INT: u64 = 2;
pub const ATTR_TYPE_BOOL: u64 = 3;
pub const ATTR_TYPE_FLOAT: u64 = 4;

/// A typed attribute; `r#type` selects which value field is meaningful.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Attr {
    #[prost(string, tag = "1")]
    pub key: String,
    #[prost(uint64, tag = "2")]
    pub r#type: u64,
    #[prost(string, tag = "3")]
    pub string_value: String,
    #[prost(int64, tag = "4")]
    pub int_value: i64,
    #[prost(bool, tag = "5")]
    pub bool_value: bool,
    #[prost(double, tag = "6")]
    pub float_value: f64,
}
