use serde::{Deserialize, Serialize};

/// Running mean and sample variance (Welford's algorithm).
#[derive(Debug, Clone)]
pub struct Accumulator {
    n_vals: usize,
    mean: f64,
    diff_2_sum: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccumulatorReport {
    pub n_vals: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self {
            n_vals: 0,
            mean: 0.0,
            diff_2_sum: 0.0,
        }
    }

    pub fn add(&mut self, val: f64) {
        self.n_vals += 1;

        let diff_a = val - self.mean;
        self.mean += diff_a / self.n_vals as f64;

        let diff_b = val - self.mean;
        self.diff_2_sum += diff_a * diff_b;
    }

    pub fn report(&self) -> AccumulatorReport {
        AccumulatorReport {
            n_vals: self.n_vals,
            mean: self.mean,
            // Clamp tiny negative round-off before the square root.
            std_dev: (self.n_vals > 1)
                .then(|| (self.diff_2_sum.max(0.0) / (self.n_vals as f64 - 1.0)).sqrt()),
        }
    }
}

/// Descriptive statistics of a sample, quantiles by linear interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    /// Summarize `vals`, or `None` if it is empty.
    pub fn of(vals: &[f64]) -> Option<Self> {
        if vals.is_empty() {
            return None;
        }
        let mut sorted = vals.to_vec();
        sorted.sort_by(f64::total_cmp);

        let var = compute_var(vals);
        Some(Self {
            count: vals.len(),
            mean: compute_mean(vals),
            std: (!var.is_nan()).then(|| var.sqrt()),
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q75: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }
}

/// Mean over a trailing window of at most `window` values ending at each position.
pub fn rolling_means(vals: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..vals.len())
        .map(|idx| {
            let start = (idx + 1).saturating_sub(window);
            compute_mean(&vals[start..=idx])
        })
        .collect()
}

pub fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

pub fn compute_var(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    vals.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}

/// Quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}
