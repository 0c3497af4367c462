use fleet_viewer::{App, ViewerConfig, init_logging};
use leptos::prelude::*;

fn main() {
	let config = ViewerConfig::from_location();
	init_logging(config.log_level);

	leptos::mount::mount_to_body(move || view! { <App config=config /> })
}
