//! Working pool of extracted lines with at-most-once consumption.

/// Normalized lines of one extracted page. Consuming a line marks it used
/// instead of removing it, so indices stay stable while the pool is walked.
#[derive(Debug, Clone)]
pub struct LinePool {
    lines: Vec<String>,
    consumed: Vec<bool>,
}

impl LinePool {
    pub fn new(lines: Vec<String>) -> Self {
        let consumed = vec![false; lines.len()];
        Self { lines, consumed }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines already claimed by cell matches.
    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|&&used| used).count()
    }

    pub fn is_consumed(&self, idx: usize) -> bool {
        self.consumed.get(idx).copied().unwrap_or(false)
    }

    /// First still-unconsumed line containing `key`. Empty keys never match.
    pub fn find_containing(&self, key: &str) -> Option<usize> {
        if key.is_empty() {
            return None;
        }
        self.lines
            .iter()
            .enumerate()
            .find(|(idx, line)| !self.consumed[*idx] && line.contains(key))
            .map(|(idx, _)| idx)
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// Mark a line used. Out-of-range indices are ignored.
    pub fn consume(&mut self, idx: usize) {
        if let Some(flag) = self.consumed.get_mut(idx) {
            *flag = true;
        }
    }
}
