//! Utility functions for GLB construction

/// Compute bounding box for positions
///
/// Returns zeroed bounds for an empty slice so accessors never carry
/// infinities into the JSON document.
pub fn compute_bounds(positions: &[[f32; 3]]) -> (Vec<f32>, Vec<f32>) {
    let Some(first) = positions.first() else {
        return (vec![0.0; 3], vec![0.0; 3]);
    };

    let (min, max) = positions.iter().fold((*first, *first), |(mut min, mut max), p| {
        for axis in 0..3 {
            min[axis] = min[axis].min(p[axis]);
            max[axis] = max[axis].max(p[axis]);
        }
        (min, max)
    });
    (min.to_vec(), max.to_vec())
}

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    pad_to_four(buffer, 0);
}

/// Pad with `fill` until the length is a multiple of 4
pub(crate) fn pad_to_four(buffer: &mut Vec<u8>, fill: u8) {
    let padding = (4 - buffer.len() % 4) % 4;
    buffer.resize(buffer.len() + padding, fill);
}
