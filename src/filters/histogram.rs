//! 256-bin intensity histograms for u8 images.
//!
//! Used for the gray-level histogram of the input and the histogram of the
//! restored image (all channels pooled).

use ndarray::{ArrayView2, ArrayView3};

/// Counts per 8-bit intensity level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; 256],
    total: u64,
}

impl Histogram {
    /// Histogram of an arbitrary sequence of samples.
    pub fn from_samples<I: IntoIterator<Item = u8>>(samples: I) -> Self {
        let mut bins = [0u64; 256];
        let mut total = 0u64;
        for v in samples {
            bins[v as usize] += 1;
            total += 1;
        }
        Self { bins, total }
    }

    /// Histogram of a single-channel image.
    pub fn of_gray(image: ArrayView2<u8>) -> Self {
        Self::from_samples(image.iter().copied())
    }

    /// Histogram of every channel of every pixel of a color image.
    pub fn of_color(image: ArrayView3<u8>) -> Self {
        Self::from_samples(image.iter().copied())
    }

    pub fn bins(&self) -> &[u64; 256] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Bin counts normalized so they sum to 1 (all zeros for an empty histogram).
    pub fn density(&self) -> [f64; 256] {
        let mut density = [0.0f64; 256];
        if self.total == 0 {
            return density;
        }
        let total = self.total as f64;
        for (d, &count) in density.iter_mut().zip(self.bins.iter()) {
            *d = count as f64 / total;
        }
        density
    }

    /// Render as `level,count,density` CSV lines with a header.
    pub fn to_csv(&self) -> String {
        let density = self.density();
        let mut out = String::from("level,count,density\n");
        for (level, (&count, d)) in self.bins.iter().zip(density.iter()).enumerate() {
            out.push_str(&format!("{},{},{}\n", level, count, d));
        }
        out
    }
}

/// Gray-level histogram of a luma plane.
pub fn gray_histogram(gray: ArrayView2<u8>) -> Histogram {
    Histogram::of_gray(gray)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn test_gray_counts() {
        let gray = array![[0u8, 0, 255], [128, 128, 128]];

        let hist = gray_histogram(gray.view());

        assert_eq!(hist.total(), 6);
        assert_eq!(hist.bins()[0], 2);
        assert_eq!(hist.bins()[128], 3);
        assert_eq!(hist.bins()[255], 1);
    }

    #[test]
    fn test_density_sums_to_one() {
        let img = Array3::from_shape_fn((5, 7, 3), |(y, x, c)| (y * 31 + x * 7 + c) as u8);

        let hist = Histogram::of_color(img.view());

        assert_eq!(hist.total(), 105);
        let sum: f64 = hist.density().iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_density() {
        let hist = Histogram::from_samples(std::iter::empty());
        assert!(hist.density().iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_csv_layout() {
        let hist = Histogram::from_samples([3u8, 3]);
        let csv = hist.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 257);
        assert_eq!(lines[0], "level,count,density");
        assert_eq!(lines[4], "3,2,1");
    }
}
