use alloc::vec::Vec;

/// Returns the consecutive indexes `from..to` as a fresh `Vec`.
///
/// An inverted or empty interval yields an empty `Vec`.
pub fn range(from: usize, to: usize) -> Vec<usize> {
    let len = to.saturating_sub(from);
    let mut out = Vec::with_capacity(len);
    out.extend(from..from + len);
    out
}
