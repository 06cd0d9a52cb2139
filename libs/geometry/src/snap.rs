//! Snapping utilities (eg. snap to a grid).

/// Snaps `pos` to the nearest multiple of `grid`.
///
/// Ties round down.
pub const fn snap_to_grid(pos: i64, grid: i64) -> i64 {
    assert!(grid > 0);

    let rem = pos.rem_euclid(grid);
    if rem <= grid / 2 {
        pos - rem
    } else {
        pos + grid - rem
    }
}

/// Rounds `value` to the nearest integer, resolving ties to the even neighbor.
///
/// # Examples
///
/// ```
/// use geometry::snap::round_half_even;
///
/// assert_eq!(round_half_even(0.5), 0);
/// assert_eq!(round_half_even(1.5), 2);
/// assert_eq!(round_half_even(2.5), 2);
/// assert_eq!(round_half_even(-2.5), -2);
/// assert_eq!(round_half_even(2.6), 3);
/// ```
pub fn round_half_even(value: f64) -> i64 {
    value.round_ties_even() as i64
}

/// Converts a continuous `value` to a number of `pitch`-sized grid units,
/// rounding half to even.
pub fn to_grid(value: f64, pitch: f64) -> i64 {
    round_half_even(value / pitch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snap_to_grid_rounds_to_nearest() {
        assert_eq!(snap_to_grid(7, 5), 5);
        assert_eq!(snap_to_grid(8, 5), 10);
        assert_eq!(snap_to_grid(-7, 5), -5);
        assert_eq!(snap_to_grid(-8, 5), -10);
        assert_eq!(snap_to_grid(10, 5), 10);
    }

    #[test]
    fn to_grid_uses_banker_rounding() {
        assert_eq!(to_grid(0.5, 1.), 0);
        assert_eq!(to_grid(3.5, 1.), 4);
        assert_eq!(to_grid(12.0, 0.5), 24);
        assert_eq!(to_grid(-1.25, 0.5), -2);
    }
}
