//! Viewer configuration: canvas layout constants and query-string overrides.

use log::{Level, warn};
use web_sys::UrlSearchParams;

pub const CANVAS_WIDTH: f64 = 300.0;
pub const CANVAS_HEIGHT: f64 = 300.0;
pub const HUB_RADIUS: f64 = 10.0;
pub const VEHICLE_RADIUS: f64 = 5.0;

const DEFAULT_FETCH_TIMEOUT_MS: u32 = 10_000;
const QUERY_KEYS: [&str; 3] = ["api", "timeout_ms", "log"];

/// Fixed canvas geometry shared by the mapper and both layers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapLayout {
	pub width: f64,
	pub height: f64,
	pub hub_radius: f64,
	pub vehicle_radius: f64,
	/// Extra space kept free on the right edge, e.g. for vehicle labels.
	pub reserved_right: f64,
}

impl Default for MapLayout {
	fn default() -> Self {
		Self {
			width: CANVAS_WIDTH,
			height: CANVAS_HEIGHT,
			hub_radius: HUB_RADIUS,
			vehicle_radius: VEHICLE_RADIUS,
			reserved_right: 0.0,
		}
	}
}

impl MapLayout {
	pub fn margin(&self) -> f64 {
		self.hub_radius * 2.0
	}

	/// Drawn hub circle radius, one pixel inside the nominal radius.
	pub fn hub_marker_radius(&self) -> f64 {
		self.hub_radius - 1.0
	}

	pub fn vehicle_marker_radius(&self) -> f64 {
		self.vehicle_radius - 1.0
	}

	pub fn x_range(&self) -> (f64, f64) {
		(self.margin(), self.width - self.margin() - self.reserved_right)
	}

	pub fn y_range(&self) -> (f64, f64) {
		(self.margin(), self.height - self.margin())
	}
}

/// Top-level settings, provided to the component tree through context.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
	/// Prefix for the `/api/...` endpoints. Empty means same origin.
	pub api_base: String,
	/// Per-request deadline; `None` waits forever.
	pub fetch_timeout_ms: Option<u32>,
	/// Canvas geometry.
	pub layout: MapLayout,
	/// Console log filter.
	pub log_level: Level,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			api_base: String::new(),
			fetch_timeout_ms: Some(DEFAULT_FETCH_TIMEOUT_MS),
			layout: MapLayout::default(),
			log_level: Level::Debug,
		}
	}
}

impl ViewerConfig {
	/// Apply `api`, `timeout_ms` and `log` overrides from already-decoded query pairs.
	/// Unknown keys and unparsable values are ignored.
	pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: AsRef<str>,
		V: AsRef<str>,
	{
		let mut config = Self::default();
		for (key, value) in pairs {
			let value = value.as_ref();
			match key.as_ref() {
				"api" => config.api_base = value.trim_end_matches('/').to_string(),
				"timeout_ms" => {
					if let Ok(ms) = value.parse::<u32>() {
						config.fetch_timeout_ms = (ms > 0).then_some(ms);
					}
				}
				"log" => {
					if let Ok(level) = value.parse::<Level>() {
						config.log_level = level;
					}
				}
				_ => {}
			}
		}
		config
	}

	/// Decode a `?a=b&c=d` search string with the browser's URL parser.
	pub fn from_search(search: &str) -> Self {
		let Ok(params) = UrlSearchParams::new_with_str(search) else {
			warn!("unreadable query string {search:?}; using defaults");
			return Self::default();
		};
		Self::from_pairs(
			QUERY_KEYS
				.iter()
				.filter_map(|key| params.get(key).map(|value| (*key, value))),
		)
	}

	/// Read overrides from the current page location.
	pub fn from_location() -> Self {
		let search = web_sys::window()
			.and_then(|w| w.location().search().ok())
			.unwrap_or_default();
		Self::from_search(&search)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn default_layout_leaves_hub_margin() {
		let layout = MapLayout::default();
		assert_eq!(layout.x_range(), (20.0, 280.0));
		assert_eq!(layout.y_range(), (20.0, 280.0));
	}

	#[test]
	fn reserved_margin_only_shrinks_x() {
		let layout = MapLayout {
			reserved_right: 40.0,
			..MapLayout::default()
		};
		assert_eq!(layout.x_range(), (20.0, 240.0));
		assert_eq!(layout.y_range(), (20.0, 280.0));
	}

	#[test]
	fn query_overrides() {
		let config = ViewerConfig::from_pairs([
			("api", "http://fleet.local/"),
			("timeout_ms", "2500"),
			("log", "warn"),
			("x", "1"),
		]);
		assert_eq!(config.api_base, "http://fleet.local");
		assert_eq!(config.fetch_timeout_ms, Some(2500));
		assert_eq!(config.log_level, Level::Warn);
	}

	#[test]
	fn zero_timeout_disables_and_garbage_is_ignored() {
		let config = ViewerConfig::from_pairs([("timeout_ms", "0"), ("log", "loud")]);
		assert_eq!(config.fetch_timeout_ms, None);
		assert_eq!(config.log_level, Level::Debug);
		assert_eq!(ViewerConfig::from_pairs(Vec::<(&str, &str)>::new()), ViewerConfig::default());
	}
}
