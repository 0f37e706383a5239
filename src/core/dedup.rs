//! Consecutive-duplicate removal for matched way sequences

/// Drop every element equal to the one right before it.
///
/// Only adjacent repeats collapse: `[1, 1, 2, 1]` becomes `[1, 2, 1]`, since a
/// route may legitimately come back to a way it already used. The first
/// element is always kept and order is preserved.
pub fn dedup_consecutive<T: PartialEq>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut kept: Vec<T> = Vec::new();
    for item in items {
        if kept.last() != Some(&item) {
            kept.push(item);
        }
    }
    kept
}
