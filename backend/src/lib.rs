//! Backend library: a user CRUD application core built around a command
//! pipeline with centralized error handling.
//!
//! Requests are typed commands dispatched through an ordered middleware
//! chain (recovery, tracing, authorization, validation) ending in a
//! terminal handler that talks to the persistence port. Command operations
//! reply with a success/failure envelope; query operations reply with plain
//! values and re-raise faults to the transport layer.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

pub use doc::ApiDoc;
pub use middleware::Trace;
