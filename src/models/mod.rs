//! Typed payloads exchanged with the three upstreams.
//!
//! Each upstream call gets its own response type so a malformed payload
//! surfaces as a named `BridgeError` variant instead of a failed lookup.

pub mod credentials;
pub mod session;
pub mod token;
