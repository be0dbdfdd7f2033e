//! Rolling and cumulative primitives over ordered numeric sequences.
//!
//! Every function returns a freshly allocated vector aligned index-for-index
//! with its input. Positions without a value are `None`.

/// Simple moving average with window `window`.
///
/// Position `i` holds the mean of `values[i + 1 - window..=i]`, or `None`
/// while fewer than `window` values are available. A zero window yields
/// all `None`.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            Some(slice.iter().sum::<f64>() / window as f64)
        })
        .collect()
}

/// Period-over-period percentage change; the first position is `0.0`.
///
/// Undefined changes (`0.0` to `0.0`) are reported as `0.0`.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(0.0);
    out.extend(values.windows(2).map(|w| {
        let change = (w[1] - w[0]) / w[0];
        if change.is_nan() {
            0.0
        } else {
            change
        }
    }));
    out
}

/// Shift a sequence forward by one position, filling the gap with `fill`.
pub fn lag<T: Copy>(values: &[T], fill: T) -> Vec<T> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(fill);
    out.extend_from_slice(&values[..values.len() - 1]);
    out
}

/// Running total.
pub fn cumsum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}
