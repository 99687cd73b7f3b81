//! Dense integer position assignment for ordered collections.
//!
//! Every function here is pure: it rearranges a slice/vector in memory and
//! renumbers `position` to match the index (0..n-1). No gap-based or
//! fractional positions are produced, although gaps coming from the server
//! are tolerated as input.

/// Anything with an integer ordering key
pub trait Positioned {
    fn position(&self) -> i64;
    fn set_position(&mut self, position: i64);
}

/// Result of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The item now sits at `index` of its (target) collection
    Moved { index: usize },
    /// Nothing changed; no write is needed
    Unchanged,
}

impl Placement {
    pub fn is_moved(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Set each item's position to its index
pub fn renumber<T: Positioned>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(index as i64);
    }
}

/// Whether positions are exactly `0..len` in order
pub fn is_dense<T: Positioned>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.position() == index as i64)
}

/// Move the item at `from` to `to` within one collection.
///
/// `to` is clamped to the last index. Returns [`Placement::Unchanged`] when
/// `from` is out of range or the clamped target equals `from`; the
/// collection is left untouched in that case.
pub fn reorder<T: Positioned>(items: &mut Vec<T>, from: usize, to: usize) -> Placement {
    if from >= items.len() {
        return Placement::Unchanged;
    }
    let to = to.min(items.len() - 1);
    if from == to {
        return Placement::Unchanged;
    }

    let item = items.remove(from);
    items.insert(to, item);
    renumber(items);
    Placement::Moved { index: to }
}

/// Move the item at `from` in `source` into `target` at `to` (default: end).
///
/// Both collections are renumbered. `to` is clamped to `target.len()`.
pub fn transfer<T: Positioned>(
    source: &mut Vec<T>,
    target: &mut Vec<T>,
    from: usize,
    to: Option<usize>,
) -> Placement {
    if from >= source.len() {
        return Placement::Unchanged;
    }

    let item = source.remove(from);
    renumber(source);

    let to = to.unwrap_or(target.len()).min(target.len());
    target.insert(to, item);
    renumber(target);
    Placement::Moved { index: to }
}
