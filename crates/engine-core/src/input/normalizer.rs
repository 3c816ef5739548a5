use crate::input::header::HeaderDetector;
use model::records::record_set::RawRecordSet;
use tracing::debug;

/// Splits raw operator text into an ordered record stream.
///
/// Blank and whitespace-only lines are dropped. The first remaining line is
/// handed to `detector`; if it is classified as a header it is kept apart from
/// the data lines. A result with no data lines must be rejected by the caller
/// before anything is dispatched.
pub fn normalize(text: &str, detector: &dyn HeaderDetector) -> RawRecordSet {
    let mut lines = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string);

    let Some(first) = lines.next() else {
        return RawRecordSet::default();
    };

    let (header_line, data_lines) = if detector.is_header(&first) {
        (Some(first), lines.collect::<Vec<_>>())
    } else {
        let mut data = vec![first];
        data.extend(lines);
        (None, data)
    };

    debug!(
        has_header = header_line.is_some(),
        records = data_lines.len(),
        "Normalized input"
    );

    RawRecordSet::new(header_line, data_lines)
}
