use alloc::vec::Vec;

/// The computed window for the current scroll position.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowState {
    /// First rendered row (`index_from`).
    pub start_index: usize,
    /// Consecutive row indexes to render, `index_from..index_to`.
    pub visible_indices: Vec<usize>,
    /// Pixel height standing in for the rows above `visible_indices`.
    pub top_spacer_height: f64,
    /// Pixel height standing in for the rows below `visible_indices`.
    pub bottom_spacer_height: f64,
    /// Rows that fit in the viewport plus overscan on both sides.
    pub render_count: usize,
}

impl WindowState {
    /// The state reported before any viewport is attached.
    pub fn initial(row_count: usize) -> Self {
        Self {
            render_count: row_count,
            ..Self::default()
        }
    }

    pub fn index_from(&self) -> usize {
        self.start_index
    }

    /// Exclusive end of `visible_indices`.
    pub fn index_to(&self) -> usize {
        self.visible_indices
            .last()
            .map_or(self.start_index, |&last| last + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.visible_indices.is_empty()
    }
}

/// Payload of a range-change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeChange {
    pub indices: Vec<usize>,
    pub index_from: usize,
    pub index_to: usize, // exclusive
}
