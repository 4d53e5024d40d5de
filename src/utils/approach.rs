/// Moves `current` toward `target` by at most `max_delta`, never overshooting.
///
/// A negative `max_delta` would move away from the target; it is treated as zero.
pub fn move_towards(current: f64, target: f64, max_delta: f64) -> f64 {
    let max_delta = max_delta.max(0.0);
    let gap = target - current;
    if gap.abs() <= max_delta {
        target
    } else {
        current + gap.signum() * max_delta
    }
}

/// True when `a` and `b` differ by strictly less than `epsilon`.
pub fn within(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}
