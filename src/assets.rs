//! Asset boundary: the core never loads anything itself; the host resolves
//! string identifiers to opaque handles carrying only the data layout needs.

use crate::math::Size;

/// Opaque image reference with its intrinsic pixel size. The renderer maps
/// `id` back to a real texture; the core only reads `size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    pub id: u64,
    pub size: Size,
}

/// Host-side asset resolution. A missing asset is a normal state: image
/// controls without a handle measure to zero and skip drawing.
pub trait AssetResolver {
    fn image(&mut self, name: &str) -> Option<ImageHandle>;
}
