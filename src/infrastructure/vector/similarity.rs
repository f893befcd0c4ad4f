//! Vector similarity helpers

/// Cosine similarity between two vectors
///
/// Returns `0.0` when either vector has zero magnitude or the lengths
/// differ. The result is clamped to `[-1.0, 1.0]`.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    (dot / (mag_a * mag_b)).clamp(-1.0, 1.0)
}

/// Scale `vector` to unit length in place; zero vectors are left untouched
pub fn l2_normalize(vector: &mut [f32]) {
    // f64 accumulation keeps long vectors accurate
    let magnitude = vector
        .iter()
        .map(|x| f64::from(*x) * f64::from(*x))
        .sum::<f64>()
        .sqrt();

    if magnitude > 1e-12 {
        #[allow(clippy::cast_possible_truncation)]
        let magnitude = magnitude as f32;
        for value in vector.iter_mut() {
            *value /= magnitude;
        }
    }
}
