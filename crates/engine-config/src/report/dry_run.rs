use crate::settings::ImportSettings;
use engine_core::plan::batch::BatchPlan;
use model::records::record_set::RawRecordSet;
use serde::Serialize;

/// Line span of one planned batch. Record numbers are one-based and
/// inclusive and do not count the header.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct BatchPreview {
    pub batch: usize,
    pub first_record: usize,
    pub last_record: usize,
    pub rows: usize,
    pub payload_bytes: usize,
}

/// What an import would send, computed without contacting the endpoint.
#[derive(Serialize, Debug, Clone)]
pub struct PlanPreview {
    pub profile: String,
    pub header_mode: String,
    pub has_header: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub total_records: usize,
    pub batch_size: usize,
    pub total_batches: usize,
    pub batches: Vec<BatchPreview>,
}

impl PlanPreview {
    pub fn build(records: &RawRecordSet, plan: &BatchPlan, settings: &ImportSettings) -> Self {
        let batches = plan
            .ranges()
            .enumerate()
            .map(|(index, range)| BatchPreview {
                batch: index + 1,
                first_record: range.start + 1,
                last_record: range.end,
                rows: range.len(),
                payload_bytes: records.payload(range).len(),
            })
            .collect();

        PlanPreview {
            profile: settings.profile.to_string(),
            header_mode: settings.header_mode.to_string(),
            has_header: records.has_header,
            header: records.header().map(str::to_string),
            total_records: plan.total_records(),
            batch_size: plan.batch_size(),
            total_batches: plan.total_batches(),
            batches,
        }
    }
}
