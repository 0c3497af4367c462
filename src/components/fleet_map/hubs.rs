use log::{debug, warn};

use super::keyed::{Element, JoinSummary, KeyedLayer};
use super::scale::{CoordinateMapping, round2};
use super::types::{Hub, HubId, Point, Position};

#[derive(Clone, Debug, PartialEq)]
pub struct HubMarker {
	pub center: Point,
	pub label: String,
	/// Dataset position, kept for the hover label.
	pub origin: Position,
}

impl HubMarker {
	fn new(hub: &Hub, mapping: &CoordinateMapping) -> Self {
		Self {
			center: mapping.project(hub.pos),
			label: hub.label.clone(),
			origin: hub.pos,
		}
	}

	pub fn tooltip(&self) -> String {
		format!(
			"{} ({}, {})",
			self.label,
			round2(self.origin.x),
			round2(self.origin.y)
		)
	}
}

/// Static hub markers, reconciled by hub id.
#[derive(Debug, Default)]
pub struct HubLayer {
	markers: KeyedLayer<HubId, HubMarker>,
}

impl HubLayer {
	pub fn apply(&mut self, hubs: &[Hub], mapping: &CoordinateMapping) -> JoinSummary {
		let (summary, _) = self.markers.join(
			hubs,
			|hub| hub.id,
			|hub| HubMarker::new(hub, mapping),
			|hub, marker| *marker = HubMarker::new(hub, mapping),
		);
		if summary.duplicates > 0 {
			warn!("skipped {} hub records with duplicate ids", summary.duplicates);
		}
		debug!(
			"hubs: {} entered, {} updated, {} exited",
			summary.entered, summary.updated, summary.exited
		);
		summary
	}

	pub fn clear(&mut self) {
		self.markers.clear();
	}

	pub fn markers(&self) -> impl Iterator<Item = &Element<HubId, HubMarker>> {
		self.markers.iter()
	}

	pub fn get(&self, id: HubId) -> Option<&Element<HubId, HubMarker>> {
		self.markers.get(&id)
	}

	pub fn len(&self) -> usize {
		self.markers.len()
	}

	/// Topmost marker within `radius` of `p`. Later markers are drawn over earlier ones.
	pub fn hit_test(&self, p: Point, radius: f64) -> Option<&Element<HubId, HubMarker>> {
		self.markers.iter().rev().find(|el| {
			let (dx, dy) = (el.attrs.center.x - p.x, el.attrs.center.y - p.y);
			(dx * dx + dy * dy).sqrt() <= radius
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::MapLayout;
	use pretty_assertions::assert_eq;

	fn hub(id: HubId, x: f64, y: f64) -> Hub {
		Hub {
			id,
			label: format!("Hub {id}"),
			pos: Position { x, y },
		}
	}

	fn mapped(hubs: &[Hub]) -> CoordinateMapping {
		CoordinateMapping::from_hubs(hubs, &MapLayout::default()).unwrap()
	}

	#[test]
	fn reconcile_keeps_shared_hubs() {
		let a = vec![hub(1, 0.0, 0.0), hub(2, 10.0, 10.0), hub(3, 5.0, 5.0)];
		let b = vec![hub(1, 0.0, 0.0), hub(2, 10.0, 10.0), hub(4, 2.0, 8.0)];
		let mut layer = HubLayer::default();
		layer.apply(&a, &mapped(&a));
		let kept = [layer.get(1).map(|el| el.id), layer.get(2).map(|el| el.id)];

		let summary = layer.apply(&b, &mapped(&b));
		assert_eq!((summary.entered, summary.updated, summary.exited), (1, 2, 1));
		assert!(layer.get(3).is_none());
		assert!(layer.get(4).is_some());
		assert_eq!([layer.get(1).map(|el| el.id), layer.get(2).map(|el| el.id)], kept);
	}

	#[test]
	fn moved_hub_is_updated_in_place() {
		let a = vec![hub(1, 0.0, 0.0), hub(2, 10.0, 10.0), hub(3, 0.0, 10.0)];
		let mut layer = HubLayer::default();
		layer.apply(&a, &mapped(&a));
		let before = layer.get(3).map(|el| el.id);

		let b = vec![hub(1, 0.0, 0.0), hub(2, 10.0, 10.0), hub(3, 10.0, 0.0)];
		layer.apply(&b, &mapped(&b));
		let moved = layer.get(3).unwrap();
		assert_eq!(Some(moved.id), before);
		assert_eq!(moved.attrs.center, Point::new(280.0, 20.0));
	}

	#[test]
	fn tooltip_rounds_coordinates() {
		let hubs = vec![hub(1, 1.005, 2.0), hub(2, 3.14159, 7.5)];
		let mut layer = HubLayer::default();
		layer.apply(&hubs, &mapped(&hubs));
		assert_eq!(layer.get(1).unwrap().attrs.tooltip(), "Hub 1 (1.01, 2)");
		assert_eq!(layer.get(2).unwrap().attrs.tooltip(), "Hub 2 (3.14, 7.5)");
	}

	#[test]
	fn hit_test_finds_marker_under_cursor() {
		let hubs = vec![hub(1, 0.0, 0.0), hub(2, 10.0, 10.0)];
		let mut layer = HubLayer::default();
		layer.apply(&hubs, &mapped(&hubs));
		assert_eq!(layer.hit_test(Point::new(25.0, 18.0), 10.0).map(|el| el.key), Some(1));
		assert_eq!(layer.hit_test(Point::new(150.0, 150.0), 10.0).map(|el| el.key), None);
	}

	#[test]
	fn hit_test_prefers_topmost_marker() {
		let hubs = vec![hub(1, 0.0, 0.0), hub(2, 10.0, 10.0), hub(3, 0.0, 0.0)];
		let mut layer = HubLayer::default();
		layer.apply(&hubs, &mapped(&hubs));
		assert_eq!(layer.hit_test(Point::new(20.0, 20.0), 9.0).map(|el| el.key), Some(3));
	}
}
