use leptos::prelude::*;

use super::fleet_map::Inconsistency;

const BLOCK_STYLE: &str = "background-color: #FF3131; border-radius: 5px; border: 2px solid black; \
	padding: 5px; margin: 5px;";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InconsistencyBlock {
	pub text: String,
}

/// Fixed-format description carrying every field of the record.
pub fn inconsistency_text(record: &Inconsistency) -> String {
	let body = serde_json::to_string(record).unwrap_or_else(|_| {
		format!(
			"{{\"movement_id\":{},\"vehicle_id\":{},\"timestamp\":{},\"inconsistency_type\":{:?}}}",
			record.movement_id, record.vehicle_id, record.timestamp, record.inconsistency_type
		)
	});
	format!("MOVEMENT INCONSISTENCY DETECTED: {body}")
}

pub fn to_blocks(records: &[Inconsistency]) -> Vec<InconsistencyBlock> {
	records
		.iter()
		.map(|record| InconsistencyBlock {
			text: inconsistency_text(record),
		})
		.collect()
}

/// Static list of flagged inconsistencies, fully replaced whenever `blocks` changes.
#[component]
pub fn InconsistencyPanel(#[prop(into)] blocks: Signal<Vec<InconsistencyBlock>>) -> impl IntoView {
	view! {
		<div class="inconsistencies" style="width: 100%; margin: 1em;">
			{move || {
				blocks
					.get()
					.into_iter()
					.map(|block| view! { <div class="inconsistency" style=BLOCK_STYLE>{block.text}</div> })
					.collect_view()
			}}
		</div>
	}
}
