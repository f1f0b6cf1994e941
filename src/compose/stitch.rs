use rayon::prelude::*;

use crate::codec::png::{PngCodec, PngCompression};
use crate::codec::{ImageCodec, OutputFormat};
use crate::compose::canvas::{Canvas, blit_band};
use crate::compose::layout::{Layout, plan_layout};
use crate::foundation::core::{Dimensions, Placement};
use crate::foundation::error::{StitchError, StitchResult};
use crate::foundation::threads::Executor;
use crate::fragment::inspect::inspect_all_with;
use crate::fragment::model::{Fragment, FragmentSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Threading controls for per-fragment work.
pub struct Threading {
    /// Probe and place fragments in parallel when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count; `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Options for [`Compositor::new`].
pub struct CompositorOpts {
    /// Threading controls.
    pub threading: Threading,
    /// PNG compression effort for the output.
    pub compression: PngCompression,
}

/// Progress of one stitch request.
///
/// `Idle → Validating → Allocating → Placing(0..n) → Encoding → Done`; any non-terminal stage may
/// move to `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    /// Nothing has happened yet.
    Idle,
    /// Checking widths and computing the layout.
    Validating,
    /// Allocating the transparent canvas.
    Allocating,
    /// Placing the fragment with this index.
    Placing {
        /// Fragment index.
        index: usize,
    },
    /// Serializing the canvas.
    Encoding,
    /// Finished successfully.
    Done,
    /// Aborted.
    Failed,
}

impl Stage {
    /// `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `self → next` is a legal transition.
    pub fn can_advance_to(self, next: Stage) -> bool {
        match (self, next) {
            (s, Self::Failed) => !s.is_terminal(),
            (Self::Idle, Self::Validating)
            | (Self::Validating, Self::Allocating)
            | (Self::Allocating, Self::Placing { index: 0 })
            | (Self::Placing { .. }, Self::Encoding)
            | (Self::Encoding, Self::Done) => true,
            (Self::Placing { index: a }, Self::Placing { index: b }) => b == a + 1,
            _ => false,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Validating => f.write_str("validating"),
            Self::Allocating => f.write_str("allocating"),
            Self::Placing { index } => write!(f, "placing({index})"),
            Self::Encoding => f.write_str("encoding"),
            Self::Done => f.write_str("done"),
            Self::Failed => f.write_str("failed"),
        }
    }
}

struct Progress {
    stage: Stage,
}

impl Progress {
    fn new() -> Self {
        Self { stage: Stage::Idle }
    }

    fn advance(&mut self, next: Stage) {
        debug_assert!(
            self.stage.can_advance_to(next),
            "illegal stage transition {} -> {next}",
            self.stage
        );
        tracing::trace!(from = %self.stage, to = %next, "stage");
        self.stage = next;
    }

    fn fail(&mut self, err: StitchError) -> StitchError {
        tracing::warn!(stage = %self.stage, kind = ?err.kind(), error = %err, "stitch failed");
        self.stage = Stage::Failed;
        err
    }
}

/// Encoded result of a successful stitch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StitchedImage {
    size: Dimensions,
    format: OutputFormat,
    bytes: Vec<u8>,
}

impl StitchedImage {
    /// Canvas dimensions.
    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// Output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume and return the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Encoded byte length.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` when the encoder produced no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `Content-Type` of the encoded bytes.
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }

    /// Filename suggested for attachment delivery.
    pub fn suggested_filename(&self) -> &'static str {
        self.format.suggested_filename()
    }
}

/// Stacks fragments vertically onto one canvas and encodes it.
///
/// A compositor holds no per-request state and can serve concurrent requests through `&self`.
#[derive(Debug)]
pub struct Compositor<C: ImageCodec = PngCodec> {
    codec: C,
    exec: Executor,
}

impl Compositor<PngCodec> {
    /// Create a PNG compositor.
    pub fn new(opts: CompositorOpts) -> StitchResult<Self> {
        Self::with_codec(PngCodec::new(opts.compression), &opts.threading)
    }
}

impl<C: ImageCodec> Compositor<C> {
    /// Create a compositor over a custom codec.
    pub fn with_codec(codec: C, threading: &Threading) -> StitchResult<Self> {
        let exec = Executor::new(threading.parallel, threading.threads)?;
        Ok(Self { codec, exec })
    }

    /// Borrow the codec.
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Probe every buffer's dimensions, preserving order.
    pub fn inspect(&self, buffers: Vec<Vec<u8>>) -> StitchResult<FragmentSet> {
        inspect_all_with(&self.codec, buffers, &self.exec)
    }

    /// Inspect then composite raw encoded buffers, in stacking order.
    #[tracing::instrument(skip_all, fields(fragments = buffers.len()))]
    pub fn stitch(&self, buffers: Vec<Vec<u8>>) -> StitchResult<StitchedImage> {
        let set = self.inspect(buffers).map_err(|e| Progress::new().fail(e))?;
        self.composite(&set)
    }

    /// Composite an inspected fragment set.
    ///
    /// All-or-nothing: on any error no image is returned.
    #[tracing::instrument(skip_all, fields(fragments = set.len()))]
    pub fn composite(&self, set: &FragmentSet) -> StitchResult<StitchedImage> {
        let mut progress = Progress::new();
        self.composite_staged(set, &mut progress)
            .map_err(|e| progress.fail(e))
    }

    fn composite_staged(
        &self,
        set: &FragmentSet,
        progress: &mut Progress,
    ) -> StitchResult<StitchedImage> {
        progress.advance(Stage::Validating);
        let layout = plan_layout(&set.sizes())?;

        progress.advance(Stage::Allocating);
        let mut canvas = Canvas::transparent(layout.size())?;

        if self.exec.is_parallel() {
            progress.advance(Stage::Placing { index: 0 });
            self.place_parallel(set, &layout, &mut canvas)?;
        } else {
            for (fragment, &placement) in set.fragments().iter().zip(layout.placements()) {
                progress.advance(Stage::Placing {
                    index: placement.index,
                });
                let rgba8 = self.decode_for(fragment, placement)?;
                canvas.place(placement, &rgba8)?;
            }
        }

        progress.advance(Stage::Encoding);
        let bytes = self.codec.encode_rgba8(canvas.size(), canvas.as_rgba8())?;
        progress.advance(Stage::Done);

        tracing::debug!(
            size = %canvas.size(),
            fragments = set.len(),
            encoded_bytes = bytes.len(),
            "stitched"
        );
        Ok(StitchedImage {
            size: canvas.size(),
            format: self.codec.output_format(),
            bytes,
        })
    }

    fn place_parallel(
        &self,
        set: &FragmentSet,
        layout: &Layout,
        canvas: &mut Canvas,
    ) -> StitchResult<()> {
        let bands = canvas.bands_mut(layout)?;
        let placed: Vec<StitchResult<()>> = self.exec.install(|| {
            bands
                .into_par_iter()
                .zip(set.fragments().par_iter())
                .zip(layout.placements().par_iter())
                .map(|((band, fragment), &placement)| {
                    let rgba8 = self.decode_for(fragment, placement)?;
                    blit_band(band, placement, &rgba8)
                })
                .collect()
        });
        placed.into_iter().collect()
    }

    fn decode_for(&self, fragment: &Fragment, placement: Placement) -> StitchResult<Vec<u8>> {
        if placement.size.height == 0 {
            return Ok(Vec::new());
        }
        let decoded = self
            .codec
            .decode_rgba8(fragment.bytes())
            .map_err(|e| e.at_fragment(placement.index))?;
        if decoded.size != placement.size {
            return Err(StitchError::Decode {
                fragment: Some(placement.index),
                message: format!(
                    "decoded size {} differs from header size {}",
                    decoded.size, placement.size
                ),
            });
        }
        tracing::trace!(index = placement.index, top = placement.top, "placing fragment");
        Ok(decoded.rgba8)
    }
}

/// One-shot stitch with default options.
pub fn stitch_buffers(buffers: Vec<Vec<u8>>) -> StitchResult<StitchedImage> {
    Compositor::new(CompositorOpts::default())?.stitch(buffers)
}

#[cfg(test)]
#[path = "../../tests/unit/compose/stitch.rs"]
mod tests;
