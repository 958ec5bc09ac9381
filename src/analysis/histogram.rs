use super::Error;
use std::io::Write;

/// Fixed-width histogram over `[lo, hi]`.
///
/// Bins are half-open `[edge_i, edge_i+1)` except the last, which also takes
/// values equal to `hi`. Values outside the range and NaNs are not counted.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<usize>,
    edges: Vec<f64>,
}

impl Histogram {
    /// Bins `data` into `bins` bins. Without an explicit range the data's
    /// minimum and maximum are used (widened by 0.5 on each side when they
    /// coincide, and `[0, 1]` for empty data).
    pub fn new(data: &[f64], bins: usize, range: Option<(f64, f64)>) -> Result<Self, Error> {
        if bins == 0 {
            return Err(Error::InvalidHistogram("number of bins must be positive".into()));
        }

        let (lo, hi) = match range {
            Some((lo, hi)) => {
                if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                    return Err(Error::InvalidHistogram(format!(
                        "range [{}, {}] is empty",
                        lo, hi
                    )));
                }
                (lo, hi)
            }
            None => data_range(data),
        };

        let width = (hi - lo) / bins as f64;
        let edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0; bins];
        for &value in data {
            if !(lo..=hi).contains(&value) {
                continue;
            }
            let bin = (((value - lo) / width) as usize).min(bins - 1);
            counts[bin] += 1;
        }

        Ok(Self { counts, edges })
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// `bins + 1` bin boundaries.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    /// Number of values that fell inside the range.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Probability density per bin; integrates to 1 over the range. All zeros
    /// when no value was counted.
    pub fn density(&self) -> Vec<f64> {
        let total = self.total();
        if total == 0 {
            return vec![0.0; self.bins()];
        }
        let norm = total as f64 * self.bin_width();
        self.counts.iter().map(|&c| c as f64 / norm).collect()
    }

    /// Center of the fullest bin (the first one on ties).
    pub fn mode(&self) -> Option<f64> {
        let (index, &count) = self
            .counts
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, c)| **c)?;
        (count > 0).then(|| 0.5 * (self.edges[index] + self.edges[index + 1]))
    }

    /// Writes `bin_start,bin_end,center,count,density` rows under a header.
    pub fn to_csv<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        writeln!(writer, "bin_start,bin_end,center,count,density")?;
        let density = self.density();
        for (i, (&count, density)) in self.counts.iter().zip(&density).enumerate() {
            let (start, end) = (self.edges[i], self.edges[i + 1]);
            writeln!(
                writer,
                "{},{},{},{},{}",
                start,
                end,
                0.5 * (start + end),
                count,
                density
            )?;
        }
        Ok(())
    }
}

fn data_range(data: &[f64]) -> (f64, f64) {
    let finite = data.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        (lo, hi)
    }
}

/// Basic descriptive statistics of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// Returns `None` for empty data.
    pub fn of(data: &[f64]) -> Option<Self> {
        if data.is_empty() {
            return None;
        }
        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Self {
            count: data.len(),
            mean,
            std_dev: variance.sqrt(),
            min: data.iter().copied().fold(f64::INFINITY, f64::min),
            max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}
