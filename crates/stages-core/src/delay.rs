//! Fixed-capacity delay line backing the delay personality.
//!
//! The line is a stack-allocated circular buffer sized at compile time, so
//! a generator can own one without touching the heap. Reads take a
//! fractional delay and interpolate linearly between neighbouring samples.

/// Fixed-size delay line (no heap allocation).
///
/// # Example
///
/// ```rust
/// use stages_core::FixedDelayLine;
///
/// let mut delay: FixedDelayLine<128> = FixedDelayLine::new();
/// delay.write(1.0);
/// for _ in 0..10 {
///     delay.write(0.0);
/// }
/// assert_eq!(delay.read(10.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct FixedDelayLine<const N: usize> {
    buffer: [f32; N],
    write_pos: usize,
}

impl<const N: usize> FixedDelayLine<N> {
    /// Create an empty delay line.
    pub fn new() -> Self {
        assert!(N > 1, "Delay size must be > 1");
        Self {
            buffer: [0.0; N],
            write_pos: 0,
        }
    }

    /// Longest readable delay in samples.
    pub const fn max_delay(&self) -> usize {
        N - 1
    }

    /// Write the next sample.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % N;
    }

    /// Read `delay_samples` behind the most recent write. A delay of 0.0 is
    /// the last written sample. Delays are clamped to [0, `max_delay`].
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let delay = delay_samples.clamp(0.0, (N - 1) as f32);
        let delay_int = (delay as usize).min(N - 1);
        let frac = delay - delay_int as f32;

        let read_pos = (self.write_pos + N - delay_int - 1) % N;
        let next_pos = (read_pos + N - 1) % N;
        let a = self.buffer[read_pos];
        let b = self.buffer[next_pos];
        a + (b - a) * frac
    }

    /// Clear the delay line.
    pub fn clear(&mut self) {
        self.buffer = [0.0; N];
        self.write_pos = 0;
    }
}

impl<const N: usize> Default for FixedDelayLine<N> {
    fn default() -> Self {
        Self::new()
    }
}
