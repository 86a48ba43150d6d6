//! Summary statistics over a set of sample values
//!
//! All statistics are population statistics (divisor `n`), matching what the
//! export trailer row reports.

/// Mean, population variance and population standard deviation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SummaryStats {
    /// Number of values the statistics were computed over
    pub count: usize,
    pub mean: f64,
    /// Population variance (divisor `n`)
    pub variance: f64,
    /// Square root of the population variance
    pub std_dev: f64,
}

impl SummaryStats {
    /// Compute statistics in two passes; `None` for an empty input
    pub fn from_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
        I::IntoIter: Clone,
    {
        let iter = values.into_iter();

        let (count, sum) = iter
            .clone()
            .fold((0usize, 0.0f64), |(n, s), v| (n + 1, s + v));
        if count == 0 {
            return None;
        }

        let mean = sum / count as f64;
        let variance = iter.map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Self {
            count,
            mean,
            variance,
            std_dev: variance.sqrt(),
        })
    }
}

/// Smallest and largest value, ignoring NaN; `None` when nothing is comparable
pub fn value_extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}
