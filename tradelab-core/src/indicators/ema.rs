//! Exponential moving average.

/// Exponentially weighted mean with `alpha = 2 / (span + 1)`, seeded at the
/// first value. Unlike the windowed indicators there is no NaN warmup; the
/// early outputs are simply dominated by the seed.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() || span == 0 {
        return vec![f64::NAN; values.len()];
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut current = values[0];
    out.push(current);
    for value in &values[1..] {
        current = alpha * value + (1.0 - alpha) * current;
        out.push(current);
    }
    out
}
