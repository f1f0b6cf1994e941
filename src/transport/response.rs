use crate::codec::ImageCodec;
use crate::compose::stitch::{Compositor, StitchedImage};
use crate::foundation::error::{ErrorKind, ErrorReport, StitchError};
use crate::transport::request::decode_request;

/// Transport-neutral HTTP reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header value.
    pub content_type: &'static str,
    /// `Content-Disposition` header value, for image attachments.
    pub content_disposition: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
}

impl Reply {
    /// 200 with the stitched image as an attachment.
    pub fn image(img: StitchedImage) -> Self {
        Self {
            status: 200,
            content_type: img.content_type(),
            content_disposition: Some(format!(
                "attachment; filename=\"{}\"",
                img.suggested_filename()
            )),
            body: img.into_bytes(),
        }
    }

    /// Error reply with the status from [`StitchError::http_status`].
    pub fn error(err: &StitchError) -> Self {
        Self::report(err.http_status(), &ErrorReport::from(err))
    }

    /// 404 for unknown paths.
    pub fn not_found(path: &str) -> Self {
        Self::report(
            404,
            &ErrorReport {
                error_kind: ErrorKind::RequestError,
                message: format!("no route for '{path}'"),
            },
        )
    }

    /// 405 for a known path with the wrong method.
    pub fn method_not_allowed(method: &str) -> Self {
        Self::report(
            405,
            &ErrorReport {
                error_kind: ErrorKind::RequestError,
                message: format!("method {method} not allowed, use POST"),
            },
        )
    }

    /// 413 for bodies over the configured limit.
    pub fn payload_too_large(limit: usize) -> Self {
        Self::report(
            413,
            &ErrorReport {
                error_kind: ErrorKind::RequestError,
                message: format!("request body exceeds {limit} bytes"),
            },
        )
    }

    fn report(status: u16, report: &ErrorReport) -> Self {
        let body = serde_json::to_vec(report).unwrap_or_else(|e| {
            tracing::warn!(error = %e, status, "failed to serialize error report");
            Vec::new()
        });
        Self {
            status,
            content_type: "application/json",
            content_disposition: None,
            body,
        }
    }
}

/// Decode a JSON stitch request, run it through `compositor` and build the reply.
pub fn handle_stitch<C: ImageCodec>(compositor: &Compositor<C>, body: &[u8]) -> Reply {
    match decode_request(body).and_then(|buffers| compositor.stitch(buffers)) {
        Ok(img) => Reply::image(img),
        Err(err) => Reply::error(&err),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/transport/response.rs"]
mod tests;
