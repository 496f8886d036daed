pub mod tei;

pub use tei::TeiEmbedder;

/// Scales `v` to unit length. Zero vectors are left alone.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 && norm.is_finite() {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}
