use std::path::PathBuf;

use thiserror::Error;

///
/// All errors emitted from the preview module.
///
/// - `Unreachable`: Replaying the steps produced belt lengths that cannot meet at a pen position
///     Parameters:
///     - `index`: The zero-based index of the output element
///     - `left`: The left belt length after the element, in steps
///     - `right`: The right belt length after the element, in steps
/// - `CanvasTooLarge`: The paper size times the scale does not fit in an image
///     Parameters:
///     - `width`: The paper width, in millimetres
///     - `height`: The paper height, in millimetres
///     - `scale`: The requested pixels per millimetre
/// - `Save`: The preview image could not be written
///
#[derive(Error, Debug)]
pub enum PreviewError {
    #[error("Step #{} moves the belts to an impossible position (left:{} right:{}).", .index, .left, .right)]
    Unreachable { index: usize, left: i64, right: i64 },

    #[error("A {}x{}mm preview at scale {} is too large to render.", .width, .height, .scale)]
    CanvasTooLarge { width: u32, height: u32, scale: u32 },

    #[error("Could not save the preview to {}: {}", .path.display(), .source)]
    Save { path: PathBuf, source: image::ImageError },
}
