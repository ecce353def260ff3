//! Progress reporting.

/// Snapshot passed to the progress callback after each chunk.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// Zero-based index of the chunk just appended.
    pub index: usize,
    /// Number of chunks appended so far.
    pub completed: usize,
    /// Total number of chunks.
    pub total: usize,
    /// Bytes reassembled so far.
    pub received_bytes: usize,
    /// The chunk just appended.
    pub chunk: &'a [u8],
}

impl Progress<'_> {
    /// Whether this is the last report of the reconstruction.
    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }

    /// Completion as a fraction in `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}
