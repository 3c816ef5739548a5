use std::fmt::Debug;

/// Decides whether the first line of an input is a header row.
///
/// Detection is heuristic: a data row that happens to contain a marker is
/// classified as a header. Callers that know the shape of their input should
/// pick [`AlwaysHeader`] or [`NoHeader`] instead.
pub trait HeaderDetector: Send + Sync + Debug {
    fn is_header(&self, first_line: &str) -> bool;
}

/// Flags the line as a header when it contains any of the configured marker
/// substrings, compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerHeaderDetector {
    markers: Vec<String>,
}

impl MarkerHeaderDetector {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|m| m.as_ref().trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        MarkerHeaderDetector { markers }
    }

    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl HeaderDetector for MarkerHeaderDetector {
    fn is_header(&self, first_line: &str) -> bool {
        let folded = first_line.to_lowercase();
        self.markers.iter().any(|m| folded.contains(m.as_str()))
    }
}

/// Treats the first line as a header unconditionally.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysHeader;

impl HeaderDetector for AlwaysHeader {
    fn is_header(&self, _first_line: &str) -> bool {
        true
    }
}

/// Treats every line as data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHeader;

impl HeaderDetector for NoHeader {
    fn is_header(&self, _first_line: &str) -> bool {
        false
    }
}
