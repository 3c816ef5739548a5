use model::records::batch::BatchResult;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Wire shape of the endpoint's answer. Every field is optional; any extra
/// numeric field is kept as a domain counter under its original name.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorResponse {
    #[serde(default, alias = "inserted")]
    pub inserted_count: Option<u64>,
    #[serde(default, alias = "skipped")]
    pub skipped_count: Option<u64>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl From<ProcessorResponse> for BatchResult {
    fn from(response: ProcessorResponse) -> Self {
        let counters = response
            .extra
            .into_iter()
            .filter_map(|(name, value)| value.as_u64().map(|count| (name, count)))
            .collect();

        let errors = response
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|err| match err {
                Value::String(message) => message,
                other => other.to_string(),
            })
            .collect();

        BatchResult {
            inserted: response.inserted_count.unwrap_or(0),
            skipped: response.skipped_count.unwrap_or(0),
            counters,
            errors,
        }
    }
}
