//! Pilosa Client
//!
//! Dispatches database, frame, query and schema operations to a cluster of
//! Pilosa servers over HTTP.
//!
//! # Components
//!
//! - [`Cluster`]: round-robin registry of server addresses
//! - [`Transport`] / [`HyperTransport`]: one HTTP round trip per call
//! - [`PilosaClient`]: builds requests, selects a host, classifies responses
//! - [`ClientConfig`]: request timeout and response size limit
//!
//! # Concurrency
//!
//! The cluster is the only shared mutable state. It sits behind a single
//! `RwLock`, held only while a host is selected or the host list changes,
//! so a client may be cloned and used from many tasks at once.

pub mod client;
pub mod cluster;
pub mod config;
pub mod transport;

pub use client::PilosaClient;
pub use cluster::Cluster;
pub use config::ClientConfig;
pub use transport::{Codec, HttpRequest, HttpResponse, HyperTransport, Transport};
