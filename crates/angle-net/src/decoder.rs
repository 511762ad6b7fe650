//! Score decoding

/// Argmax over raw model scores
///
/// The first strictly greatest score wins and the running maximum starts at
/// zero, so a vector with no positive score decodes to `(0, 0.0)`. Scores are
/// used as confidence without softmax.
pub fn decode(scores: &[f32]) -> (usize, f32) {
    let mut max_index = 0;
    let mut max_score = 0.0_f32;

    for (i, &score) in scores.iter().enumerate() {
        if score > max_score {
            max_score = score;
            max_index = i;
        }
    }

    (max_index, max_score)
}
