//! Online batch-means statistics.

use serde::Serialize;

/// Welford accumulator that closes a batch every `batch_size` samples.
#[derive(Clone, Debug)]
pub struct BatchAccumulator {
    batch_size: usize,
    count: usize,
    mean: f64,
    m2: f64,
    batch_means: Vec<f64>,
}

impl BatchAccumulator {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
            count: 0,
            mean: 0.0,
            m2: 0.0,
            batch_means: Vec::new(),
        }
    }

    /// Adds a sample. Returns the batch mean if this sample closed a batch.
    pub fn add(&mut self, value: f64) -> Option<f64> {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        if self.count < self.batch_size {
            return None;
        }
        let batch_mean = self.mean;
        self.batch_means.push(batch_mean);
        self.count = 0;
        self.mean = 0.0;
        self.m2 = 0.0;
        Some(batch_mean)
    }

    /// Samples in the open batch.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Running mean of the open batch.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Running (population) variance of the open batch.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }

    pub fn batch_means(&self) -> &[f64] {
        &self.batch_means
    }

    pub fn closed_batches(&self) -> usize {
        self.batch_means.len()
    }

    pub fn statistic(&self, confidence: f64) -> Statistic {
        Statistic::from_batch_means(&self.batch_means, confidence)
    }
}

/// Run-level estimate built from closed batch means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Statistic {
    pub mean: f64,
    pub sdev: f64,
    /// Half-width of the confidence interval around `mean`.
    pub half_width: f64,
    pub batches: usize,
}

impl Statistic {
    pub fn from_batch_means(batch_means: &[f64], confidence: f64) -> Self {
        let n = batch_means.len();
        if n == 0 {
            return Statistic::default();
        }
        let mut mean = 0.0;
        let mut m2 = 0.0;
        for (i, &x) in batch_means.iter().enumerate() {
            let delta = x - mean;
            mean += delta / (i + 1) as f64;
            m2 += delta * (x - mean);
        }
        let sdev = (m2 / n as f64).sqrt();
        let half_width = if n > 1 {
            let alpha = 1.0 - confidence;
            let df = (n - 1) as f64;
            student_t_quantile(df, 1.0 - alpha / 2.0) * sdev / df.sqrt()
        } else {
            0.0
        };
        Self { mean, sdev, half_width, batches: n }
    }

    pub fn lower(&self) -> f64 {
        self.mean - self.half_width
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.half_width
    }
}

/// Inverse of the Student-t distribution function with `df` degrees of freedom.
pub fn student_t_quantile(df: f64, p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    if p < 0.5 {
        return -student_t_quantile(df, 1.0 - p);
    }
    let mut high = 1.0;
    while student_t_cdf(df, high) < p && high < 1e12 {
        high *= 2.0;
    }
    let mut low = 0.0;
    for _ in 0..200 {
        let mid = 0.5 * (low + high);
        if student_t_cdf(df, mid) < p {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < 1e-12 {
            break;
        }
    }
    0.5 * (low + high)
}

/// Distribution function of the Student-t distribution.
pub fn student_t_cdf(df: f64, t: f64) -> f64 {
    let x = df / (df + t * t);
    let tail = 0.5 * regularized_incomplete_beta(0.5 * df, 0.5, x);
    if t > 0.0 {
        1.0 - tail
    } else {
        tail
    }
}

fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let front = (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();
    // the continued fraction converges fast only on this side
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const TINY: f64 = 1e-300;
    const EPS: f64 = 1e-15;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;
    for m in 1..=300 {
        let m = m as f64;
        let m2 = 2.0 * m;
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;
        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Lanczos approximation of `ln Γ(x)` for `x > 0`.
fn ln_gamma(x: f64) -> f64 {
    const COEFFICIENTS: [f64; 6] = [
        76.18009172947146,
        -86.50532032941677,
        24.01409824083091,
        -1.231739572450155,
        0.1208650973866179e-2,
        -0.5395239384953e-5,
    ];
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut series = 1.000000000190015;
    let mut y = x;
    for coefficient in COEFFICIENTS {
        y += 1.0;
        series += coefficient / y;
    }
    -tmp + (2.5066282746310005 * series / x).ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_student_quantiles() {
        assert!((student_t_quantile(1.0, 0.975) - 12.7062).abs() < 1e-3);
        assert!((student_t_quantile(10.0, 0.975) - 2.2281).abs() < 1e-3);
        assert!((student_t_quantile(63.0, 0.975) - 1.9983).abs() < 1e-3);
        assert!((student_t_quantile(4.0, 0.95) - 2.1318).abs() < 1e-3);
    }

    #[test]
    fn test_student_cdf_symmetry() {
        assert!((student_t_cdf(5.0, 0.0) - 0.5).abs() < 1e-12);
        let left = student_t_cdf(7.0, -1.3);
        let right = student_t_cdf(7.0, 1.3);
        assert!((left + right - 1.0).abs() < 1e-10);
        assert!((student_t_quantile(7.0, 0.1) + student_t_quantile(7.0, 0.9)).abs() < 1e-9);
    }

    #[test]
    fn test_ln_gamma() {
        // Γ(5) = 24
        assert!((ln_gamma(5.0) - 24f64.ln()).abs() < 1e-9);
        // Γ(1/2) = sqrt(pi)
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-9);
    }
}
