use rayon::prelude::*;

/// Pixels per parallel work item when reducing channel sums.
const CHUNK_PIXELS: usize = 16 * 1024;

/// Per-channel mean and population standard deviation over the RGB channels of an image.
///
/// Sums are accumulated as integers, so the parallel reduction is bit-identical to a sequential
/// pass regardless of how rayon splits the work.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChannelStats {
    /// Mean of R, G, B in `0..=255`.
    pub mean: [f64; 3],
    /// Population standard deviation of R, G, B in `0..=255`.
    pub std_dev: [f64; 3],
    /// Number of pixels reduced.
    pub pixel_count: u64,
}

#[derive(Clone, Copy, Default)]
struct Sums {
    sum: [u64; 3],
    sum_sq: [u64; 3],
    n: u64,
}

impl Sums {
    fn merge(mut self, other: Self) -> Self {
        for c in 0..3 {
            self.sum[c] += other.sum[c];
            self.sum_sq[c] += other.sum_sq[c];
        }
        self.n += other.n;
        self
    }
}

impl ChannelStats {
    /// Statistics of an empty pixel set.
    pub const EMPTY: Self = Self {
        mean: [0.0; 3],
        std_dev: [0.0; 3],
        pixel_count: 0,
    };

    /// Reduce tightly packed RGBA8 bytes. Alpha is ignored.
    pub fn from_rgba(rgba: &[u8]) -> Self {
        let sums = rgba
            .par_chunks(CHUNK_PIXELS * 4)
            .map(|chunk| {
                let mut s = Sums::default();
                for px in chunk.chunks_exact(4) {
                    for c in 0..3 {
                        let v = u64::from(px[c]);
                        s.sum[c] += v;
                        s.sum_sq[c] += v * v;
                    }
                    s.n += 1;
                }
                s
            })
            .reduce(Sums::default, Sums::merge);

        if sums.n == 0 {
            return Self::EMPTY;
        }

        let n = sums.n as f64;
        let mut mean = [0.0; 3];
        let mut std_dev = [0.0; 3];
        for c in 0..3 {
            let m = sums.sum[c] as f64 / n;
            let var = (sums.sum_sq[c] as f64 / n - m * m).max(0.0);
            mean[c] = m;
            std_dev[c] = var.sqrt();
        }

        Self {
            mean,
            std_dev,
            pixel_count: sums.n,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/stats.rs"]
mod tests;
