use crate::foundation::core::Dimensions;
use crate::foundation::error::{StitchError, StitchResult};

/// One encoded input image plus its probed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    bytes: Vec<u8>,
    size: Dimensions,
}

impl Fragment {
    /// Pair encoded bytes with dimensions already read from their header.
    pub fn new(bytes: Vec<u8>, size: Dimensions) -> Self {
        Self { bytes, size }
    }

    /// Encoded image bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Probed dimensions.
    pub fn size(&self) -> Dimensions {
        self.size
    }
}

/// Ordered, non-empty fragments; order is stacking order from top to bottom.
///
/// Width agreement is not checked here; the compositor validates it so the failure can name the
/// first offending index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentSet {
    fragments: Vec<Fragment>,
}

impl FragmentSet {
    /// Build a set, rejecting an empty list.
    pub fn new(fragments: Vec<Fragment>) -> StitchResult<Self> {
        if fragments.is_empty() {
            return Err(StitchError::request("at least one fragment is required"));
        }
        Ok(Self { fragments })
    }

    /// Fragments in stacking order.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Probed dimensions in stacking order.
    pub fn sizes(&self) -> Vec<Dimensions> {
        self.fragments.iter().map(Fragment::size).collect()
    }

    /// Number of fragments (always >= 1).
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
