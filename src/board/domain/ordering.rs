//! Dense renumbering of ordered sequences.
//!
//! Every function here is pure. A sequence is a slice of item identifiers
//! whose slice position *is* the item's order index, so the vector returned
//! by each operation already carries the renumbered `0..n` assignment.
//! Adapters diff that assignment against persisted values with
//! [`changed_orders`] and write only the rows that moved.

use super::{OrderIndex, OrderingError};

/// Inserts `item` at `index`, clamped to `[0, seq.len()]`.
#[must_use]
pub fn insert_at<T: Copy + Eq>(seq: &[T], index: usize, item: T) -> Vec<T> {
    let mut renumbered = Vec::with_capacity(seq.len() + 1);
    renumbered.extend_from_slice(seq);
    let clamped = index.min(renumbered.len());
    renumbered.insert(clamped, item);
    renumbered
}

/// Removes `id`, closing the gap it leaves.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] when `id` is not in `seq`.
pub fn remove_at<T: Copy + Eq>(seq: &[T], id: T) -> Result<Vec<T>, OrderingError> {
    let position = position_of(seq, id)?;
    let mut renumbered = seq.to_vec();
    renumbered.remove(position);
    Ok(renumbered)
}

/// Moves `id` to `new_index` within the same sequence.
///
/// The index is clamped against the sequence without the moved element, so
/// any index at or past the end places the element last. Moving an element
/// to its current index returns the sequence unchanged.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] when `id` is not in `seq`.
pub fn move_within<T: Copy + Eq>(
    seq: &[T],
    id: T,
    new_index: usize,
) -> Result<Vec<T>, OrderingError> {
    let current = position_of(seq, id)?;
    let mut renumbered = seq.to_vec();
    let item = renumbered.remove(current);
    let clamped = new_index.min(renumbered.len());
    renumbered.insert(clamped, item);
    Ok(renumbered)
}

/// Moves `id` out of `source` and into `target` at `new_index`.
///
/// `new_index` is clamped to `[0, target.len()]`. An item belongs to exactly
/// one scope, so a `target` that already contains `id` is the source scope
/// itself; in that case both returned sequences hold the
/// [`move_within`] result.
///
/// # Errors
///
/// Returns [`OrderingError::NotFound`] when `id` is in neither sequence.
pub fn move_across<T: Copy + Eq>(
    source: &[T],
    target: &[T],
    id: T,
    new_index: usize,
) -> Result<(Vec<T>, Vec<T>), OrderingError> {
    if target.contains(&id) {
        let moved = move_within(target, id, new_index)?;
        return Ok((moved.clone(), moved));
    }
    let source_after = remove_at(source, id)?;
    let target_after = insert_at(target, new_index, id);
    Ok((source_after, target_after))
}

/// Returns the `(id, order)` pairs of `renumbered` that differ from `stored`.
///
/// Items absent from `stored` are always reported, which covers an item
/// that has just entered the scope.
///
/// # Errors
///
/// Returns [`OrderingError::CapacityExceeded`] when a position does not fit
/// in an [`OrderIndex`].
pub fn changed_orders<T: Copy + Eq>(
    stored: &[(T, OrderIndex)],
    renumbered: &[T],
) -> Result<Vec<(T, OrderIndex)>, OrderingError> {
    let mut changes = Vec::new();
    for (position, id) in renumbered.iter().copied().enumerate() {
        let order = OrderIndex::from_position(position).ok_or(OrderingError::CapacityExceeded)?;
        let previous = stored
            .iter()
            .find_map(|(stored_id, stored_order)| (*stored_id == id).then_some(*stored_order));
        if previous != Some(order) {
            changes.push((id, order));
        }
    }
    Ok(changes)
}

/// Returns `true` when `orders` is exactly `{0, ..., n-1}` for `n` values.
#[must_use]
pub fn is_contiguous(orders: impl IntoIterator<Item = OrderIndex>) -> bool {
    let mut values: Vec<u32> = orders.into_iter().map(OrderIndex::value).collect();
    values.sort_unstable();
    values
        .iter()
        .enumerate()
        .all(|(position, value)| u32::try_from(position).is_ok_and(|expected| expected == *value))
}

fn position_of<T: Copy + Eq>(seq: &[T], id: T) -> Result<usize, OrderingError> {
    seq.iter()
        .position(|candidate| *candidate == id)
        .ok_or(OrderingError::NotFound)
}
