//! Relative strength index.

/// RSI over rolling-mean gains and losses.
///
/// Uses simple moving averages of up-moves and down-moves rather than
/// Wilder smoothing; the bundled reversion strategy's thresholds were tuned
/// against this variant. Outputs NaN for the first `period` values. A
/// window with zero average loss reads 100; a perfectly flat window (no
/// gains either) reads NaN.
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 || values.len() <= period {
        return out;
    }

    let n = values.len();
    let mut gains = vec![0.0; n - 1];
    let mut losses = vec![0.0; n - 1];
    for i in 1..n {
        let delta = values[i] - values[i - 1];
        if delta > 0.0 {
            gains[i - 1] = delta;
        } else {
            losses[i - 1] = -delta;
        }
    }

    for i in period..n {
        let window = i - period..i;
        let avg_gain: f64 = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss: f64 = losses[window].iter().sum::<f64>() / period as f64;
        out[i] = if avg_loss > 0.0 {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        } else if avg_gain > 0.0 {
            100.0
        } else {
            f64::NAN
        };
    }
    out
}
