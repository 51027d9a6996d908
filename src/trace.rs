//! Per-resolution decision trace
//! Ordered, append-only, human-readable audit trail attached to the result

/// Decision log owned by the engine for the duration of one resolution.
/// Every line is mirrored to `tracing` at debug level.
#[derive(Debug, Default)]
pub struct ResolutionTrace {
    lines: Vec<String>,
}

impl ResolutionTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one decision line
    pub fn push(&mut self, line: impl Into<String>) {
        let line = line.into();
        tracing::debug!(target: "parcelassist::resolve", "{}", line);
        self.lines.push(line);
    }

    /// Merge another trace's lines, preserving their order
    pub fn extend(&mut self, other: ResolutionTrace) {
        self.lines.extend(other.lines);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Consume into the ordered lines for the final result
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_append_order() {
        let mut trace = ResolutionTrace::new();
        trace.push("first");
        trace.push(format!("second: {}", 2));
        trace.push("third");
        assert_eq!(trace.into_lines(), vec!["first", "second: 2", "third"]);
    }

    #[test]
    fn test_extend_keeps_both_orders() {
        let mut a = ResolutionTrace::new();
        a.push("a1");
        let mut b = ResolutionTrace::new();
        b.push("b1");
        b.push("b2");
        a.extend(b);
        assert_eq!(a.into_lines(), vec!["a1", "b1", "b2"]);
    }
}
