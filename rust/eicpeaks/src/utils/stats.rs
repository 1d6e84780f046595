/// Summary of a set of values, as used for the m/z aggregates of peaks and groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub median: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty input.
    ///
    /// The median of an even number of values is the mean of the two middle ones.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_unstable_by(|a, b| a.total_cmp(b));

        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };
        let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Some(Self {
            median,
            mean,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
        })
    }
}

pub fn mean_f32(values: impl Iterator<Item = f32>) -> Option<f32> {
    let (sum, count) = values.fold((0.0f64, 0usize), |(s, c), v| (s + v as f64, c + 1));
    if count == 0 {
        None
    } else {
        Some((sum / count as f64) as f32)
    }
}
