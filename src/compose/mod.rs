//! The canvas compositor: width validation, layout, placement and encoding.

/// Transparent RGBA8 canvas.
pub mod canvas;
/// Width validation and the placement fold.
pub mod layout;
/// The staged stitch pipeline.
pub mod stitch;
