use serde::Serialize;
use std::ops::Range;

/// The ordered record stream produced by normalizing operator input.
///
/// Created once per run and never mutated afterwards. The header line, when
/// present, is kept apart from the data lines and re-attached to every batch
/// payload so the remote endpoint can map columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRecordSet {
    pub header_line: Option<String>,
    pub data_lines: Vec<String>,
    pub has_header: bool,
}

impl RawRecordSet {
    pub fn new(header_line: Option<String>, data_lines: Vec<String>) -> Self {
        let has_header = header_line.is_some();
        RawRecordSet {
            header_line,
            data_lines,
            has_header,
        }
    }

    pub fn len(&self) -> usize {
        self.data_lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_lines.is_empty()
    }

    pub fn header(&self) -> Option<&str> {
        self.header_line.as_deref()
    }

    /// Builds the outgoing text for the data lines in `range`, prefixed by the
    /// header line when the input carried one. Lines are joined with `\n`.
    pub fn payload(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.data_lines.len());
        let start = range.start.min(end);
        let slice = &self.data_lines[start..end];

        let mut lines: Vec<&str> = Vec::with_capacity(slice.len() + 1);
        if self.has_header
            && let Some(header) = self.header_line.as_deref()
        {
            lines.push(header);
        }
        lines.extend(slice.iter().map(String::as_str));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(header: Option<&str>, lines: &[&str]) -> RawRecordSet {
        RawRecordSet::new(
            header.map(str::to_string),
            lines.iter().map(|l| l.to_string()).collect(),
        )
    }

    #[test]
    fn payload_prepends_header() {
        let records = set(Some("email,points"), &["a@x.com,10", "b@x.com,20", "c@x.com,30"]);
        assert_eq!(records.payload(1..3), "email,points\nb@x.com,20\nc@x.com,30");
    }

    #[test]
    fn payload_without_header_is_raw_slice() {
        let records = set(None, &["a", "b", "c"]);
        assert!(!records.has_header);
        assert_eq!(records.payload(0..2), "a\nb");
    }

    #[test]
    fn payload_clamps_out_of_range_slices() {
        let records = set(None, &["a", "b"]);
        assert_eq!(records.payload(1..10), "b");
        assert_eq!(records.payload(5..10), "");
    }
}
