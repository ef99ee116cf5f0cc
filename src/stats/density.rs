//! Distribution estimators used to draw histograms and KDE curves

/// Number of points a KDE curve is evaluated on.
pub const KDE_GRID_SIZE: usize = 200;

/// How many bandwidths the KDE grid extends past the data range.
const KDE_CUT: f64 = 3.0;

/// Equal-width bin counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    /// `(center, count)` per bin.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Bin `values` into `bins` equal-width bins spanning their range.
///
/// Every bin is half-open except the last, which also holds the maximum.
/// A zero-width range is widened to one unit centred on the value.
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    let bins = bins.max(1);
    let finite = || values.iter().copied().filter(|v| v.is_finite());

    let (mut lo, mut hi) = finite().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo > hi {
        lo = 0.0;
        hi = 1.0;
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for v in finite() {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram { edges, counts }
}

/// A sampled probability density.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityCurve {
    pub bandwidth: f64,
    pub points: Vec<[f64; 2]>,
}

impl DensityCurve {
    pub fn max_density(&self) -> f64 {
        self.points.iter().map(|p| p[1]).fold(0.0, f64::max)
    }
}

/// Gaussian kernel density estimate with Scott's rule bandwidth.
///
/// Returns `None` when the data cannot support an estimate (fewer than
/// two finite values, or zero variance).
pub fn gaussian_kde(values: &[f64]) -> Option<DensityCurve> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = data.len();
    if n < 2 {
        return None;
    }

    let mean = data.iter().sum::<f64>() / n as f64;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    let std_dev = variance.sqrt();
    if std_dev <= 0.0 || !std_dev.is_finite() {
        return None;
    }

    let bandwidth = std_dev * (n as f64).powf(-0.2);
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let start = min - KDE_CUT * bandwidth;
    let end = max + KDE_CUT * bandwidth;
    let step = (end - start) / (KDE_GRID_SIZE - 1) as f64;

    let norm = 1.0 / (n as f64 * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let points = (0..KDE_GRID_SIZE)
        .map(|i| {
            let x = start + step * i as f64;
            let sum: f64 = data
                .iter()
                .map(|&xi| {
                    let z = (x - xi) / bandwidth;
                    (-0.5 * z * z).exp()
                })
                .sum();
            [x, sum * norm]
        })
        .collect();

    Some(DensityCurve { bandwidth, points })
}
