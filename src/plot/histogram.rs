/// Fixed-binning 1D histogram with under/overflow counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub name: String,
    pub title: String,
    /// Lower edge of the first bin.
    pub min: f64,
    /// Upper edge of the last bin.
    pub max: f64,
    /// Bin contents (length = number of bins).
    pub counts: Vec<u64>,
    /// Values below `min`.
    pub underflow: u64,
    /// Values at or above `max`.
    pub overflow: u64,
}

impl Histogram1D {
    /// Empty histogram of `bins` equal bins over `[min, max)`.
    pub fn new(title: &str, bins: usize, min: f64, max: f64) -> Self {
        Histogram1D {
            name: super::figure_name(title),
            title: title.to_string(),
            min,
            max,
            counts: vec![0; bins],
            underflow: 0,
            overflow: 0,
        }
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len().max(1) as f64
    }

    /// Lower edge of bin `i`.
    pub fn bin_low(&self, i: usize) -> f64 {
        self.min + i as f64 * self.bin_width()
    }

    pub fn fill(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        if value < self.min {
            self.underflow += 1;
        } else if value >= self.max || self.counts.is_empty() {
            self.overflow += 1;
        } else {
            let i = ((value - self.min) / self.bin_width()) as usize;
            // rounding can push values just under `max` past the last bin
            let i = i.min(self.counts.len() - 1);
            self.counts[i] += 1;
        }
    }

    /// All values filled, flows included.
    pub fn entries(&self) -> u64 {
        self.counts.iter().sum::<u64>() + self.underflow + self.overflow
    }

    /// Largest bin content.
    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_bins_and_flows() {
        let mut h = Histogram1D::new("led rate per sec", 40, 995.0, 1005.0);
        for v in [994.0, 995.0, 995.1, 1000.0, 1004.99, 1005.0, f64::NAN] {
            h.fill(v);
        }
        assert_eq!(h.underflow, 1);
        assert_eq!(h.overflow, 1);
        assert_eq!(h.counts[0], 2);
        assert_eq!(h.counts[20], 1);
        assert_eq!(h.counts[39], 1);
        assert_eq!(h.entries(), 6);
        assert_eq!(h.name, "led_rate_per_sec");
    }

    #[test]
    fn cosmic_binning_centres_on_tenths() {
        let h = Histogram1D::new("cosmic rate per sec", 15, -0.05, 1.45);
        assert!((h.bin_width() - 0.1).abs() < 1e-12);
        assert!((h.bin_low(1) - 0.05).abs() < 1e-12);
    }
}
