//! Pilosa Common Types
//!
//! Shared protocol definitions for the Pilosa client: the request bodies the
//! server expects, the protobuf and JSON responses it returns, the error
//! taxonomy every client operation reports, and the value types that name
//! servers, databases and frames.
//!
//! # Wire Protocol
//!
//! - **Administrative calls** (`/db`, `/frame`): JSON bodies
//! - **Queries** (`/query`): protobuf in both directions
//! - **Schema** (`/schema`): JSON response
//! - **Duplicate resources**: reported through exact body text, see
//!   [`protocol::classify_server_error`]
//!
//! # Components
//!
//! - [`protocol`] - Errors, request bodies, responses and schema
//! - [`uri`] - Server addresses with defaults
//! - [`model`] - Databases and frames
//! - [`validation`] - Naming rules
//!
//! # Example
//!
//! ```
//! use pilosa_common::{Database, Uri};
//!
//! let uri = Uri::from_address("http://db1:10101").unwrap();
//! let db = Database::new("repository").unwrap();
//! let frame = db.frame("stargazer").unwrap();
//! assert_eq!(frame.database().name(), "repository");
//! assert_eq!(uri.port(), 10101);
//! ```

pub mod model;
pub mod protocol;
pub mod uri;
pub mod validation;

pub use model::{Database, DatabaseOptions, Frame, FrameOptions};
pub use protocol::*;
pub use uri::Uri;
