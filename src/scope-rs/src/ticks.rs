// Axis tick placement on 1/2/5 x 10^n boundaries.

const SNAP_TOLERANCE: f64 = 1e-9;

/// Rounds `range` to a 1, 2, 5 or 10 multiple of a power of ten.
///
/// `round` picks the nearest bucket; otherwise the smallest bucket that is not below `range`.
pub fn nice_number(range: f64, round: bool) -> f64 {
    if !range.is_finite() || range <= 0.0 {
        return 0.0;
    }
    let exponent = range.log10().floor();
    let magnitude = 10f64.powf(exponent);
    let fraction = range / magnitude;
    let nice = if round {
        if fraction < 1.5 {
            1.0
        } else if fraction < 3.0 {
            2.0
        } else if fraction < 7.0 {
            5.0
        } else {
            10.0
        }
    } else if fraction <= 1.0 + SNAP_TOLERANCE {
        1.0
    } else if fraction <= 2.0 + SNAP_TOLERANCE {
        2.0
    } else if fraction <= 5.0 + SNAP_TOLERANCE {
        5.0
    } else {
        10.0
    };
    nice * magnitude
}

/// Ascending round tick positions covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, max_ticks: usize) -> Vec<f64> {
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    if max <= min {
        return vec![min];
    }
    let max_ticks = max_ticks.max(2);
    let range = nice_number(max - min, false);
    let spacing = nice_number(range / (max_ticks - 1) as f64, true);
    if spacing <= 0.0 {
        return vec![min];
    }
    let first = (min / spacing + SNAP_TOLERANCE).floor() as i64;
    let last = (max / spacing - SNAP_TOLERANCE).ceil() as i64;
    (first..=last).map(|step| step as f64 * spacing).collect()
}
