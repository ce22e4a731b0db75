use crate::node::FeatureIndex;

/// Reorder rows in place around `threshold` on `feature`.
///
/// Afterwards every row with `value < threshold` sits below the returned
/// index and every other row at or above it. Each row swap is mirrored in
/// `responses`, so a row never loses its label. Returns the number of rows
/// routed left.
pub(crate) fn partition(
    rows: &mut [Vec<f64>],
    responses: &mut [f64],
    feature: FeatureIndex,
    threshold: f64,
) -> usize {
    debug_assert_eq!(rows.len(), responses.len());
    let col = feature.index();

    // [0, left) holds left rows, [right, len) holds right rows.
    let mut left = 0;
    let mut right = rows.len();
    while left < right {
        if rows[left][col] < threshold {
            left += 1;
        } else {
            right -= 1;
            rows.swap(left, right);
            responses.swap(left, right);
        }
    }
    left
}
