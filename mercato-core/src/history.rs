use mercato_types::RequestRecord;

/// Append-only request log with an explicit truncation policy.
///
/// When a push makes the log longer than `capacity`, it is cut down to its
/// `retain` most recent entries and then grows normally again.
#[derive(Debug, Clone)]
pub struct RequestHistory {
    records: Vec<RequestRecord>,
    capacity: usize,
    retain: usize,
}

impl Default for RequestHistory {
    fn default() -> Self {
        Self::new(1000, 500)
    }
}

impl RequestHistory {
    /// Empty log. `retain` is clamped to `capacity`.
    #[must_use]
    pub fn new(capacity: usize, retain: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
            retain: retain.min(capacity),
        }
    }

    /// Append a record, truncating when over capacity.
    pub fn push(&mut self, record: RequestRecord) {
        self.records.push(record);
        if self.records.len() > self.capacity {
            let drop = self.records.len() - self.retain;
            self.records.drain(..drop);
        }
    }

    /// Number of records held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no record is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Up to `n` most recent records, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[RequestRecord] {
        let start = self.records.len().saturating_sub(n);
        &self.records[start..]
    }

    /// Forget every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
