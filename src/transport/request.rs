use base64::Engine as _;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use crate::foundation::error::{StitchError, StitchResult};

/// Standard alphabet; padding optional on input, always written on output.
const SLICE_B64: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Wire shape of a stitch request: base64-encoded image slices in stacking order.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StitchRequest {
    /// Base64-encoded image bytes, top to bottom.
    pub slices: Vec<String>,
}

impl StitchRequest {
    /// Base64-encode raw image buffers into a request.
    pub fn from_buffers<B: AsRef<[u8]>>(buffers: &[B]) -> Self {
        Self {
            slices: buffers.iter().map(|b| SLICE_B64.encode(b.as_ref())).collect(),
        }
    }

    /// Decode every slice into raw image bytes.
    ///
    /// ASCII whitespace inside a slice is ignored. An empty list, an empty slice or invalid base64
    /// is a [`StitchError::Request`].
    pub fn into_buffers(self) -> StitchResult<Vec<Vec<u8>>> {
        if self.slices.is_empty() {
            return Err(StitchError::request(
                "input must be a non-empty array of image slices (base64 strings)",
            ));
        }
        self.slices
            .iter()
            .enumerate()
            .map(|(i, s)| decode_slice(i, s))
            .collect()
    }
}

/// Parse a JSON request body and decode its slices.
pub fn decode_request(body: &[u8]) -> StitchResult<Vec<Vec<u8>>> {
    let req: StitchRequest = serde_json::from_slice(body)
        .map_err(|e| StitchError::request(format!("malformed request body: {e}")))?;
    req.into_buffers()
}

fn decode_slice(index: usize, slice: &str) -> StitchResult<Vec<u8>> {
    let compact = slice
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect::<Vec<u8>>();
    if compact.is_empty() {
        return Err(StitchError::request(format!("slice {index} is empty")));
    }
    SLICE_B64
        .decode(&compact)
        .map_err(|e| StitchError::request(format!("slice {index} is not valid base64: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/transport/request.rs"]
mod tests;
