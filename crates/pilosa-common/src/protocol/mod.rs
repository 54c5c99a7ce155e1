pub mod error;
pub mod requests;
pub mod responses;
pub mod schema;
pub mod wire;


pub use error::{classify_server_error, ErrorKind, PilosaError, Resource, Result};
pub use requests::{encode_query_request, DatabaseRequest, FrameRequest, QueryOptions};
pub use responses::{
    AttrValue, Attributes, BitmapResult, CountResultItem, ProfileItem, QueryResponse, QueryResult,
};
pub use schema::{DatabaseInfo, FrameInfo, Schema};
