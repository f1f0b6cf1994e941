//! slicestitch reconstructs one image from vertically sliced fragments.
//!
//! Fragments (for example the viewport-sized pieces of a long screenshot) are stacked top to
//! bottom in submission order onto a transparent RGBA canvas and written out as PNG.
//!
//! # Pipeline overview
//!
//! 1. **Inspect**: probe each fragment's header for its dimensions (parallelizable)
//! 2. **Validate**: every fragment must have the width of the first one
//! 3. **Layout**: fold heights into contiguous [`Placement`]s
//! 4. **Place**: decode each fragment and copy it into its band of the [`Canvas`]
//! 5. **Encode**: serialize the canvas to PNG
//!
//! Every step either succeeds or aborts the whole request with a [`StitchError`]; no partial image
//! is ever returned.
//!
//! ```no_run
//! # fn main() -> slicestitch::StitchResult<()> {
//! let top = std::fs::read("top.png").map_err(anyhow::Error::from)?;
//! let bottom = std::fs::read("bottom.png").map_err(anyhow::Error::from)?;
//! let out = slicestitch::stitch_buffers(vec![top, bottom])?;
//! println!("{} ({} bytes)", out.size(), out.len());
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Codec capability and the PNG implementation.
pub mod codec;
/// The canvas compositor.
pub mod compose;
/// Input fragments and the dimension inspector.
pub mod fragment;
/// HTTP transport.
pub mod transport;

pub use crate::codec::png::{PngCodec, PngCompression};
pub use crate::codec::{DecodedImage, ImageCodec, OutputFormat};
pub use crate::compose::canvas::Canvas;
pub use crate::compose::layout::{Layout, plan_layout, validate_widths};
pub use crate::compose::stitch::{
    Compositor, CompositorOpts, Stage, StitchedImage, Threading, stitch_buffers,
};
pub use crate::foundation::core::{Dimensions, Placement};
pub use crate::foundation::error::{ErrorKind, ErrorReport, StitchError, StitchResult};
pub use crate::fragment::inspect::{inspect, inspect_all};
pub use crate::fragment::model::{Fragment, FragmentSet};
pub use crate::transport::request::{StitchRequest, decode_request};
pub use crate::transport::response::{Reply, handle_stitch};
pub use crate::transport::server::{STITCH_ROUTE, ServeOpts, ShutdownHandle, StitchServer};
