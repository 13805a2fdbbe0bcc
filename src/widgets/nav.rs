//! Skip-aware cursor movement over lists where some entries are not
//! navigation targets (menu separators, read-only form fields).

/// An entry that may or may not take the cursor.
pub trait Navigable {
    fn navigable(&self) -> bool;
}

pub fn first<T: Navigable>(items: &[T]) -> Option<usize> {
    items.iter().position(Navigable::navigable)
}

pub fn last<T: Navigable>(items: &[T]) -> Option<usize> {
    items.iter().rposition(Navigable::navigable)
}

/// Nearest target after `current`, or `None` at the end.
pub fn next<T: Navigable>(items: &[T], current: usize) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .skip(current + 1)
        .find(|(_, item)| item.navigable())
        .map(|(i, _)| i)
}

/// Nearest target before `current`, or `None` at the start.
pub fn prev<T: Navigable>(items: &[T], current: usize) -> Option<usize> {
    items[..current.min(items.len())]
        .iter()
        .rposition(Navigable::navigable)
}

/// Move about `step` entries down, stopping at the last target.
pub fn fast_next<T: Navigable>(items: &[T], current: usize, step: usize) -> Option<usize> {
    let last = last(items)?;
    let target = current.saturating_add(step.max(1));
    if target >= last {
        return Some(last);
    }
    items[target..=last]
        .iter()
        .position(Navigable::navigable)
        .map(|i| target + i)
}

/// Move about `step` entries up, stopping at the first target.
pub fn fast_prev<T: Navigable>(items: &[T], current: usize, step: usize) -> Option<usize> {
    let first = first(items)?;
    let target = current.saturating_sub(step.max(1));
    if target <= first {
        return Some(first);
    }
    items[first..=target]
        .iter()
        .rposition(Navigable::navigable)
        .map(|i| first + i)
}

/// Keep `focus` inside a window of `rows` entries starting at `top`,
/// moving the window as little as possible.
pub fn scroll_to(top: usize, focus: usize, rows: usize, len: usize) -> usize {
    let rows = rows.max(1);
    let mut top = top.min(len.saturating_sub(rows));
    if focus < top {
        top = focus;
    } else if focus >= top + rows {
        top = focus + 1 - rows;
    }
    top
}

#[cfg(test)]
mod tests {
    use super::*;

    struct E(bool);

    impl Navigable for E {
        fn navigable(&self) -> bool {
            self.0
        }
    }

    /// separator, a, b, separator, c
    fn items() -> Vec<E> {
        vec![E(false), E(true), E(true), E(false), E(true)]
    }

    #[test]
    fn test_first_and_last_skip_separators() {
        assert_eq!(first(&items()), Some(1));
        assert_eq!(last(&items()), Some(4));
        assert_eq!(first(&[E(false)]), None);
    }

    #[test]
    fn test_next_skips_separator() {
        let items = items();
        assert_eq!(next(&items, 1), Some(2));
        assert_eq!(next(&items, 2), Some(4));
        assert_eq!(next(&items, 4), None);
    }

    #[test]
    fn test_prev_skips_separator() {
        let items = items();
        assert_eq!(prev(&items, 4), Some(2));
        assert_eq!(prev(&items, 1), None);
    }

    #[test]
    fn test_fast_moves_clamp_to_boundary_targets() {
        let items = items();
        assert_eq!(fast_next(&items, 1, 10), Some(4));
        assert_eq!(fast_next(&items, 1, 2), Some(4));
        assert_eq!(fast_next(&items, 1, 1), Some(2));
        assert_eq!(fast_prev(&items, 4, 10), Some(1));
        assert_eq!(fast_prev(&items, 4, 1), Some(2));
    }

    #[test]
    fn test_no_target_never_lands_on_separator() {
        let items = items();
        for cur in 0..items.len() {
            for step in 1..6 {
                for found in [fast_next(&items, cur, step), fast_prev(&items, cur, step)]
                    .into_iter()
                    .flatten()
                {
                    assert!(items[found].navigable());
                }
            }
        }
    }

    #[test]
    fn test_scroll_window_moves_minimally() {
        assert_eq!(scroll_to(0, 3, 5, 20), 0);
        assert_eq!(scroll_to(0, 5, 5, 20), 1);
        assert_eq!(scroll_to(10, 4, 5, 20), 4);
        // a shrunken list pulls the window back
        assert_eq!(scroll_to(18, 19, 5, 20), 15);
    }
}
