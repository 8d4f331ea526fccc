//! Network transport for the vision collaborator.

mod http;

pub use http::{HttpVisionClient, TransportError};
