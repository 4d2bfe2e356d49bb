//! Weighted distribution of leftover cells.

use crate::types::Dimension;

/// Split `total` cells across `weights`, writing one share per weight.
///
/// Each share is `floor(total * weight / sum)`; the last recipient absorbs the
/// rounding remainder so the shares always sum to `total` exactly. A zero
/// weight sum uses a denominator of 1.
pub fn distribute(total: u16, weights: &[f32], out: &mut [u16]) {
    debug_assert_eq!(weights.len(), out.len());
    let Some(last) = out.len().checked_sub(1) else {
        return;
    };

    let sum: f32 = weights.iter().sum();
    let denominator = if sum > 0.0 { sum } else { 1.0 };

    let mut assigned = 0u16;
    for (share, weight) in out[..last].iter_mut().zip(weights) {
        let cells = (f32::from(total) * weight / denominator).floor();
        *share = (cells.max(0.0) as u16).min(total - assigned);
        assigned += *share;
    }
    out[last] = total - assigned;
}

/// Column widths for a table of `total` cells with `gap` cells between
/// columns. Fixed columns are resolved first (clamped to what is left), the
/// remainder goes to the other columns by flex weight (1 when unset).
pub fn split_columns(total: u16, columns: &[(Dimension, f32)], gap: u16) -> Vec<u16> {
    let gaps = gap.saturating_mul(columns.len().saturating_sub(1) as u16);
    let mut remaining = total.saturating_sub(gaps);
    let mut widths = vec![0u16; columns.len()];

    let mut flexible = Vec::new();
    let mut weights = Vec::new();
    for (i, (width, flex)) in columns.iter().enumerate() {
        match width.resolve(total) {
            Some(w) => {
                widths[i] = w.min(remaining);
                remaining -= widths[i];
            }
            None => {
                flexible.push(i);
                weights.push(if *flex > 0.0 { *flex } else { 1.0 });
            }
        }
    }

    let mut shares = vec![0u16; flexible.len()];
    distribute(remaining, &weights, &mut shares);
    for (i, share) in flexible.into_iter().zip(shares) {
        widths[i] = share;
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case(30, &[1.0, 2.0], &[10, 20] ; "one to two")]
    #[test_case(10, &[1.0, 1.0, 1.0], &[3, 3, 4] ; "last absorbs remainder")]
    #[test_case(7, &[0.0, 0.0], &[0, 7] ; "zero weight sum")]
    #[test_case(0, &[1.0, 3.0], &[0, 0] ; "nothing to share")]
    fn test_distribute(total: u16, weights: &[f32], expected: &[u16]) {
        let mut out = vec![0; weights.len()];
        distribute(total, weights, &mut out);
        assert_eq!(out, expected);
    }

    #[test]
    fn test_distribute_empty() {
        let mut out: [u16; 0] = [];
        distribute(10, &[], &mut out);
    }

    #[test]
    fn test_split_columns() {
        let columns = [
            (Dimension::Cells(6), 0.0),
            (Dimension::Auto, 0.0),
            (Dimension::Auto, 3.0),
        ];
        // 30 - 2 gaps = 28; 6 fixed; 22 split 1:3
        assert_eq!(split_columns(30, &columns, 1), vec![6, 5, 17]);
    }

    #[test]
    fn test_split_columns_fixed_overflow_clamps() {
        let columns = [(Dimension::Cells(20), 0.0), (Dimension::Cells(20), 0.0)];
        assert_eq!(split_columns(25, &columns, 1), vec![20, 4]);
    }

    proptest! {
        #[test]
        fn prop_distribute_conserves_total(
            total in 0u16..2000,
            weights in prop::collection::vec(0.0f32..10.0, 1..12),
        ) {
            let mut out = vec![0; weights.len()];
            distribute(total, &weights, &mut out);
            let sum: u32 = out.iter().map(|&s| u32::from(s)).sum();
            prop_assert_eq!(sum, u32::from(total));
        }
    }
}
