use rayon::prelude::*;

use crate::codec::ImageCodec;
use crate::foundation::core::Dimensions;
use crate::foundation::error::{StitchError, StitchResult};
use crate::foundation::threads::Executor;
use crate::fragment::model::{Fragment, FragmentSet};

/// Probe one encoded buffer for its dimensions.
pub fn inspect<C: ImageCodec + ?Sized>(codec: &C, bytes: &[u8]) -> StitchResult<Dimensions> {
    codec.probe(bytes)
}

/// Probe every buffer and pair it with its dimensions, preserving submission order.
///
/// An empty list is rejected before the codec is touched. When several buffers fail, the error of
/// the lowest index is returned, tagged with that index.
pub fn inspect_all<C: ImageCodec + ?Sized>(
    codec: &C,
    buffers: Vec<Vec<u8>>,
    parallel: bool,
) -> StitchResult<FragmentSet> {
    let exec = Executor::new(parallel, None)?;
    inspect_all_with(codec, buffers, &exec)
}

#[tracing::instrument(skip_all, fields(fragments = buffers.len(), parallel = exec.is_parallel()))]
pub(crate) fn inspect_all_with<C: ImageCodec + ?Sized>(
    codec: &C,
    buffers: Vec<Vec<u8>>,
    exec: &Executor,
) -> StitchResult<FragmentSet> {
    if buffers.is_empty() {
        return Err(StitchError::request("at least one fragment is required"));
    }

    let probed: Vec<StitchResult<Dimensions>> = if exec.is_parallel() {
        exec.install(|| {
            buffers
                .par_iter()
                .enumerate()
                .map(|(i, b)| codec.probe(b).map_err(|e| e.at_fragment(i)))
                .collect()
        })
    } else {
        buffers
            .iter()
            .enumerate()
            .map(|(i, b)| codec.probe(b).map_err(|e| e.at_fragment(i)))
            .collect()
    };

    let mut fragments = Vec::with_capacity(buffers.len());
    for (bytes, size) in buffers.into_iter().zip(probed) {
        let size = size?;
        tracing::trace!(index = fragments.len(), %size, "probed fragment");
        fragments.push(Fragment::new(bytes, size));
    }
    FragmentSet::new(fragments)
}

#[cfg(test)]
#[path = "../../tests/unit/fragment/inspect.rs"]
mod tests;
