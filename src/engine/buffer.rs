//! Stereo buffer type
//!
//! Two-column sample storage produced by the channel compositor and by
//! the synthesis kernels. Column 0 is the in-memory left channel,
//! column 1 the right. Note that the on-disk convention differs: the
//! save path swaps the columns just before writing (see `engine::io`).

/// A two-column (left, right) buffer of f64 samples
///
/// Both columns always have the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct StereoBuffer {
    /// Column 0 samples (in-memory left)
    pub left: Vec<f64>,
    /// Column 1 samples (in-memory right)
    pub right: Vec<f64>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl StereoBuffer {
    /// Create a zero-initialized buffer
    ///
    /// # Arguments
    /// * `num_samples` - Number of rows (samples per column)
    /// * `sample_rate` - Sample rate in Hz
    pub fn new(num_samples: usize, sample_rate: u32) -> Self {
        Self {
            left: vec![0.0; num_samples],
            right: vec![0.0; num_samples],
            sample_rate,
        }
    }

    /// Number of samples per column
    #[inline]
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Whether the buffer holds no samples
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Duration in seconds
    #[inline]
    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Immutable view of a column (0 = left, 1 = right)
    ///
    /// # Panics
    /// Panics if `column > 1`
    pub fn column(&self, column: usize) -> &[f64] {
        match column {
            0 => &self.left,
            1 => &self.right,
            _ => panic!("stereo buffer has two columns, got index {}", column),
        }
    }

    /// Mutable view of a column (0 = left, 1 = right)
    ///
    /// # Panics
    /// Panics if `column > 1`
    pub fn column_mut(&mut self, column: usize) -> &mut [f64] {
        match column {
            0 => &mut self.left,
            1 => &mut self.right,
            _ => panic!("stereo buffer has two columns, got index {}", column),
        }
    }

    /// Add a waveform into a column, sample by sample
    ///
    /// The waveform may be shorter than the buffer; the tail is left
    /// untouched (zero padding on the right). Accumulation is additive
    /// so multiple sounds routed to the same column mix rather than
    /// clobber.
    pub fn add_into(&mut self, column: usize, wave: &[f64]) {
        let col = self.column_mut(column);
        for (dst, src) in col.iter_mut().zip(wave.iter()) {
            *dst += src;
        }
    }

    /// Element-wise add another buffer of the same length
    pub fn add(&mut self, other: &StereoBuffer) {
        debug_assert_eq!(self.len(), other.len());
        for (dst, src) in self.left.iter_mut().zip(other.left.iter()) {
            *dst += src;
        }
        for (dst, src) in self.right.iter_mut().zip(other.right.iter()) {
            *dst += src;
        }
    }

    /// Interleave columns in memory order: [L0, R0, L1, R1, ...]
    pub fn to_interleaved(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            out.push(*l);
            out.push(*r);
        }
        out
    }

    /// Interleave columns with the on-disk swap applied:
    /// [R0, L0, R1, L1, ...]
    ///
    /// The save path writes in-memory column 0 as the file's right
    /// channel and vice versa. This asymmetry between the in-memory and
    /// on-disk conventions is preserved for file compatibility.
    pub fn to_interleaved_swapped(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            out.push(*r);
            out.push(*l);
        }
        out
    }

    /// Truncate or zero-pad both columns to `num_samples` rows
    pub fn resize(&mut self, num_samples: usize) {
        self.left.resize(num_samples, 0.0);
        self.right.resize(num_samples, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let buf = StereoBuffer::new(100, 48000);
        assert_eq!(buf.len(), 100);
        assert!(buf.left.iter().all(|&s| s == 0.0));
        assert!(buf.right.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_add_into_is_additive_and_pads() {
        let mut buf = StereoBuffer::new(4, 48000);
        buf.add_into(0, &[1.0, 1.0]);
        buf.add_into(0, &[0.5, 0.5, 0.5]);
        assert_eq!(buf.left, vec![1.5, 1.5, 0.5, 0.0]);
        assert_eq!(buf.right, vec![0.0; 4]);
    }

    #[test]
    fn test_interleave_and_swap() {
        let buf = StereoBuffer {
            left: vec![1.0, 2.0],
            right: vec![-1.0, -2.0],
            sample_rate: 48000,
        };
        assert_eq!(buf.to_interleaved(), vec![1.0, -1.0, 2.0, -2.0]);
        assert_eq!(buf.to_interleaved_swapped(), vec![-1.0, 1.0, -2.0, 2.0]);
    }

    #[test]
    fn test_duration() {
        let buf = StereoBuffer::new(24000, 48000);
        assert!((buf.duration_secs() - 0.5).abs() < 1e-12);
    }
}
