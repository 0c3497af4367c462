use std::collections::HashMap;

use log::debug;

use super::keyed::{Element, ElementId, JoinSummary, KeyedLayer};
use super::scale::{ColorScale, CoordinateMapping, Rgb};
use super::timeline::{Animatable, CancelToken, Ease, Scheduler, Transition, Tween};
use super::types::{Movement, Point, VehicleId};

#[derive(Clone, Debug)]
pub struct VehicleMarker {
	pub center: Point,
	pub color: Rgb,
	pub label: String,
	pub label_opacity: f64,
	/// Shared by every transition scheduled for this marker in the current cycle.
	token: CancelToken,
}

impl Animatable for VehicleMarker {
	fn set_position(&mut self, pos: Point) {
		self.center = pos;
	}

	fn set_opacity(&mut self, opacity: f64) {
		self.label_opacity = opacity;
	}
}

/// All legs of one vehicle, earliest first.
struct Itinerary<'a> {
	vehicle_id: VehicleId,
	legs: Vec<&'a Movement>,
}

impl Itinerary<'_> {
	fn first(&self) -> &Movement {
		self.legs[0]
	}
}

/// Group legs by vehicle in order of first appearance, each group sorted by timestamp.
fn itineraries(movements: &[Movement]) -> Vec<Itinerary<'_>> {
	let mut index: HashMap<VehicleId, usize> = HashMap::new();
	let mut out: Vec<Itinerary<'_>> = Vec::new();
	for movement in movements {
		match index.get(&movement.vehicle_id) {
			Some(&i) => out[i].legs.push(movement),
			None => {
				index.insert(movement.vehicle_id, out.len());
				out.push(Itinerary {
					vehicle_id: movement.vehicle_id,
					legs: vec![movement],
				});
			}
		}
	}
	for itinerary in &mut out {
		itinerary
			.legs
			.sort_by(|a, b| seconds(a.timestamp).total_cmp(&seconds(b.timestamp)));
	}
	out
}

/// Dataset seconds as a usable offset; negative or non-finite values collapse to zero.
fn seconds(v: f64) -> f64 {
	if v.is_finite() { v.max(0.0) } else { 0.0 }
}

/// Animated vehicle markers: one per vehicle id, moved leg by leg on a shared timeline.
#[derive(Debug, Default)]
pub struct VehicleLayer {
	markers: KeyedLayer<VehicleId, VehicleMarker>,
	scheduler: Scheduler,
}

impl VehicleLayer {
	/// Cancel every scheduled or running transition of the layer.
	pub fn interrupt(&mut self) {
		for el in self.markers.iter_mut() {
			el.attrs.token.cancel();
			el.attrs.token = CancelToken::default();
		}
		self.scheduler.prune();
	}

	/// Replace the layer contents with `movements`. Previous transitions are cancelled first;
	/// each marker is placed at the start of its earliest leg and every leg is scheduled
	/// `timestamp` seconds after `cycle_start_ms`.
	pub fn apply(
		&mut self,
		movements: &[Movement],
		mapping: &CoordinateMapping,
		cycle_start_ms: f64,
	) -> JoinSummary {
		self.interrupt();

		let colors = ColorScale::from_values(
			movements.iter().map(|m| m.vehicle_id as f64),
			Rgb::YELLOW,
			Rgb::BLUE,
		);
		let color_of = |id: VehicleId| {
			colors
				.map(|c| c.apply(id as f64))
				.unwrap_or(Rgb::YELLOW)
		};
		let plans = itineraries(movements);

		let (summary, _) = self.markers.join(
			&plans,
			|plan| plan.vehicle_id,
			|plan| VehicleMarker {
				center: mapping.project(plan.first().start_pos),
				color: color_of(plan.vehicle_id),
				label: plan.first().vehicle.clone(),
				label_opacity: 0.0,
				token: CancelToken::default(),
			},
			|plan, marker| {
				marker.center = mapping.project(plan.first().start_pos);
				marker.color = color_of(plan.vehicle_id);
				marker.label = plan.first().vehicle.clone();
				marker.label_opacity = 0.0;
			},
		);

		for (el, plan) in self.markers.iter().zip(&plans) {
			debug_assert_eq!(el.key, plan.vehicle_id);
			for leg in &plan.legs {
				schedule_leg(&mut self.scheduler, el.id, &el.attrs.token, leg, mapping, cycle_start_ms);
			}
		}

		debug!(
			"vehicles: {} entered, {} updated, {} exited, {} transitions",
			summary.entered,
			summary.updated,
			summary.exited,
			self.scheduler.pending()
		);
		summary
	}

	pub fn clear(&mut self) {
		self.interrupt();
		self.markers.clear();
	}

	pub fn tick(&mut self, now_ms: f64) {
		let mut targets: HashMap<ElementId, &mut VehicleMarker> = self
			.markers
			.iter_mut()
			.map(|el| (el.id, &mut el.attrs))
			.collect();
		self.scheduler.tick(now_ms, &mut targets);
	}

	pub fn is_animating(&self) -> bool {
		!self.scheduler.is_idle()
	}

	pub fn markers(&self) -> impl Iterator<Item = &Element<VehicleId, VehicleMarker>> {
		self.markers.iter()
	}

	pub fn len(&self) -> usize {
		self.markers.len()
	}
}

/// Position moves linearly over the whole leg; the label fades in over the first half and
/// out over the second.
fn schedule_leg(
	scheduler: &mut Scheduler,
	element: ElementId,
	token: &CancelToken,
	leg: &Movement,
	mapping: &CoordinateMapping,
	cycle_start_ms: f64,
) {
	let start = cycle_start_ms + seconds(leg.timestamp) * 1000.0;
	let duration = seconds(leg.path_time) * 1000.0;
	let half = duration / 2.0;

	scheduler.schedule(Transition::new(
		element,
		token.clone(),
		start,
		duration,
		Ease::Linear,
		Tween::Position {
			from: mapping.project(leg.start_pos),
			to: mapping.project(leg.end_pos),
		},
	));
	scheduler.schedule(Transition::new(
		element,
		token.clone(),
		start,
		half,
		Ease::CubicOut,
		Tween::Opacity { from: 0.0, to: 1.0 },
	));
	scheduler.schedule(Transition::new(
		element,
		token.clone(),
		start + half,
		half,
		Ease::CubicIn,
		Tween::Opacity { from: 1.0, to: 0.0 },
	));
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::fleet_map::types::{Hub, Position};
	use crate::config::MapLayout;
	use pretty_assertions::assert_eq;

	fn corner_mapping() -> CoordinateMapping {
		let hubs = [
			Hub {
				id: 1,
				label: "A".into(),
				pos: Position { x: 0.0, y: 0.0 },
			},
			Hub {
				id: 2,
				label: "B".into(),
				pos: Position { x: 10.0, y: 10.0 },
			},
		];
		CoordinateMapping::from_hubs(&hubs, &MapLayout::default()).unwrap()
	}

	fn leg(vehicle_id: VehicleId, from: (f64, f64), to: (f64, f64), timestamp: f64, path_time: f64) -> Movement {
		Movement {
			vehicle_id,
			vehicle: format!("Vehicle {vehicle_id}"),
			start_pos: Position { x: from.0, y: from.1 },
			end_pos: Position { x: to.0, y: to.1 },
			timestamp,
			path_time,
		}
	}

	fn center(layer: &VehicleLayer, id: VehicleId) -> Point {
		layer.markers.get(&id).unwrap().attrs.center
	}

	#[test]
	fn single_leg_scenario() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		layer.apply(&[leg(1, (0.0, 0.0), (10.0, 10.0), 0.0, 1.0)], &mapping, 0.0);
		assert_eq!(center(&layer, 1), Point::new(20.0, 20.0));

		layer.tick(500.0);
		assert_eq!(center(&layer, 1), Point::new(150.0, 150.0));
		layer.tick(1000.0);
		assert_eq!(center(&layer, 1), Point::new(280.0, 280.0));
		assert!(!layer.is_animating());
	}

	#[test]
	fn leg_waits_for_timestamp_and_ends_on_time() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		layer.apply(&[leg(1, (0.0, 0.0), (10.0, 0.0), 2.0, 3.0)], &mapping, 1000.0);

		layer.tick(2999.0);
		assert_eq!(center(&layer, 1), Point::new(20.0, 20.0));
		layer.tick(3000.0 + 1500.0);
		assert_eq!(center(&layer, 1), Point::new(150.0, 20.0));
		layer.tick(6000.0);
		assert_eq!(center(&layer, 1), Point::new(280.0, 20.0));
		assert!(!layer.is_animating());
	}

	#[test]
	fn label_fades_in_then_out() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		layer.apply(&[leg(1, (0.0, 0.0), (10.0, 0.0), 0.0, 2.0)], &mapping, 0.0);
		let opacity = |layer: &VehicleLayer| layer.markers.get(&1).unwrap().attrs.label_opacity;

		assert_eq!(opacity(&layer), 0.0);
		layer.tick(500.0);
		assert!(opacity(&layer) > 0.5);
		layer.tick(1000.0);
		assert_eq!(opacity(&layer), 1.0);
		layer.tick(1500.0);
		assert!(opacity(&layer) > 0.5);
		layer.tick(2000.0);
		assert_eq!(opacity(&layer), 0.0);
	}

	#[test]
	fn legs_of_one_vehicle_share_a_marker() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		let movements = [
			leg(4, (10.0, 0.0), (10.0, 10.0), 2.0, 1.0),
			leg(4, (0.0, 0.0), (10.0, 0.0), 0.0, 1.0),
		];
		layer.apply(&movements, &mapping, 0.0);
		assert_eq!(layer.len(), 1);
		assert_eq!(center(&layer, 4), Point::new(20.0, 20.0));

		layer.tick(1000.0);
		assert_eq!(center(&layer, 4), Point::new(280.0, 20.0));
		layer.tick(1500.0);
		assert_eq!(center(&layer, 4), Point::new(280.0, 20.0));
		layer.tick(3000.0);
		assert_eq!(center(&layer, 4), Point::new(280.0, 280.0));
	}

	#[test]
	fn refresh_cancels_stale_transitions() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		layer.apply(&[leg(1, (0.0, 0.0), (10.0, 10.0), 0.0, 10.0)], &mapping, 0.0);
		layer.tick(5000.0);
		assert_eq!(center(&layer, 1), Point::new(150.0, 150.0));
		let stale = layer.markers.get(&1).unwrap().attrs.token.clone();
		let id = layer.markers.get(&1).unwrap().id;

		layer.apply(&[leg(1, (0.0, 10.0), (10.0, 10.0), 1.0, 1.0)], &mapping, 5000.0);
		assert!(stale.is_cancelled());
		assert_eq!(layer.markers.get(&1).unwrap().id, id);
		assert_eq!(center(&layer, 1), Point::new(20.0, 280.0));

		for now in [5500.0, 6000.0, 10_000.0, 20_000.0] {
			layer.tick(now);
		}
		assert_eq!(center(&layer, 1), Point::new(280.0, 280.0));
		assert!(!layer.is_animating());
	}

	#[test]
	fn absent_vehicles_are_removed_and_colors_follow_ids() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		layer.apply(
			&[
				leg(1, (0.0, 0.0), (1.0, 1.0), 0.0, 1.0),
				leg(3, (0.0, 0.0), (1.0, 1.0), 0.0, 1.0),
				leg(5, (0.0, 0.0), (1.0, 1.0), 0.0, 1.0),
			],
			&mapping,
			0.0,
		);
		assert_eq!(layer.markers.get(&1).unwrap().attrs.color, Rgb::YELLOW);
		assert_eq!(layer.markers.get(&5).unwrap().attrs.color, Rgb::BLUE);

		let summary = layer.apply(&[leg(3, (0.0, 0.0), (1.0, 1.0), 0.0, 1.0)], &mapping, 0.0);
		assert_eq!(summary.exited, 2);
		assert_eq!(layer.len(), 1);
		assert_eq!(layer.markers.get(&3).unwrap().attrs.color, Rgb { r: 128, g: 128, b: 128 });
	}

	#[test]
	fn clear_drops_everything() {
		let mapping = corner_mapping();
		let mut layer = VehicleLayer::default();
		layer.apply(&[leg(1, (0.0, 0.0), (10.0, 10.0), 0.0, 10.0)], &mapping, 0.0);
		layer.clear();
		assert_eq!(layer.len(), 0);
		assert!(!layer.is_animating());
	}
}
