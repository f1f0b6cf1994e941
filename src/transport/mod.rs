//! HTTP plumbing around the compositor.
//!
//! The wire format mirrors the service this crate replaces: `POST /stitch` with a JSON body
//! `{"slices": ["<base64>", ...]}`, answered with the PNG bytes as an attachment or with a JSON
//! `{errorKind, message}` object.

/// JSON/base64 request decoding.
pub mod request;
/// Reply construction and status mapping.
pub mod response;
/// Blocking `tiny_http` listener.
pub mod server;
