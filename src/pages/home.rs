use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use log::info;

use crate::api::HttpSource;
use crate::components::fleet_map::{FleetMapCanvas, FleetScene, now_ms};
use crate::components::inconsistency_panel::{InconsistencyBlock, InconsistencyPanel};
use crate::config::ViewerConfig;
use crate::session::{SessionController, run_cycle};

const ERROR_STYLE: &str = "color: #FF3131; font-weight: bold; margin: 0.5em 0;";

/// Fleet map page: reset button, canvas, error indicator and inconsistency list.
#[component]
pub fn Home() -> impl IntoView {
	let config = use_context::<ViewerConfig>().unwrap_or_default();
	let scene = Rc::new(RefCell::new(FleetScene::new(config.layout)));
	let session = RwSignal::new(SessionController::default());
	let panel = RwSignal::new(Vec::<InconsistencyBlock>::new());
	let source = HttpSource::new(config.api_base.clone(), config.fetch_timeout_ms);

	let refresh = {
		let scene = scene.clone();
		move || {
			let (scene, source) = (scene.clone(), source.clone());
			spawn_local(async move {
				run_cycle(&session, &source, |snapshot| {
					let mut scene = scene.borrow_mut();
					let report = scene.apply_cycle(snapshot, now_ms());
					info!("cycle applied: {report}");
					panel.set(scene.inconsistencies().to_vec());
				})
				.await;
			});
		}
	};

	// initial load
	refresh();

	let refreshing = move || session.with(SessionController::is_refreshing);
	let error_text = move || session.with(|s| s.last_error().map(str::to_string));

	view! {
		<div class="fleet-viewer">
			<h1>"Fleet Movements"</h1>
			<button id="reset_btn" disabled=refreshing on:click=move |_| refresh()>
				"Reset"
			</button>
			<Show when=move || error_text().is_some()>
				<p class="fleet-error" style=ERROR_STYLE>
					{move || error_text().unwrap_or_default()}
				</p>
			</Show>
			<FleetMapCanvas scene=scene.clone() />
			<InconsistencyPanel blocks=panel />
		</div>
	}
}
