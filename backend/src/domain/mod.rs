//! Domain core: entities, error vocabulary, envelope, and the command
//! pipeline.
//!
//! The domain stays transport and storage agnostic. Inbound adapters build
//! commands and dispatch them through pipelines; outbound adapters implement
//! the ports declared here.

pub mod commands;
pub mod envelope;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::envelope::Envelope;
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AGE_MAX, AGE_MIN, Age, NICK_NAME_MIN, NickName, User, UserId, UserValidationError, UserView,
};
