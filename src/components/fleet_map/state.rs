use std::fmt;

use log::{debug, warn};

use super::hubs::HubLayer;
use super::keyed::JoinSummary;
use super::scale::CoordinateMapping;
use super::types::{FleetSnapshot, HubId, Point};
use super::vehicles::VehicleLayer;
use crate::components::inconsistency_panel::{InconsistencyBlock, to_blocks};
use crate::config::MapLayout;

/// What a cycle changed, for logging and tests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleReport {
	pub inconsistencies: usize,
	pub mapped: bool,
	pub vehicles: JoinSummary,
	pub hubs: JoinSummary,
}

impl fmt::Display for CycleReport {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if !self.mapped {
			return write!(f, "{} inconsistencies, map cleared", self.inconsistencies);
		}
		let JoinSummary {
			entered,
			updated,
			exited,
			..
		} = self.vehicles;
		write!(
			f,
			"{} inconsistencies, vehicles +{entered} ~{updated} -{exited}, hubs +{} ~{} -{}",
			self.inconsistencies, self.hubs.entered, self.hubs.updated, self.hubs.exited
		)
	}
}

/// Everything currently on screen. The only state carried from one cycle to the next.
pub struct FleetScene {
	pub layout: MapLayout,
	pub hubs: HubLayer,
	pub vehicles: VehicleLayer,
	pub hover: Option<HubId>,
	mapping: Option<CoordinateMapping>,
	inconsistencies: Vec<InconsistencyBlock>,
}

impl FleetScene {
	pub fn new(layout: MapLayout) -> Self {
		Self {
			layout,
			hubs: HubLayer::default(),
			vehicles: VehicleLayer::default(),
			hover: None,
			mapping: None,
			inconsistencies: Vec::new(),
		}
	}

	/// Render one fetched snapshot: inconsistencies, then a fresh mapping from the new hubs,
	/// then vehicles, then hubs. Both layers receive the same mapping value. Without any
	/// mappable hub the map layers are emptied.
	pub fn apply_cycle(&mut self, snapshot: &FleetSnapshot, now_ms: f64) -> CycleReport {
		let mut report = CycleReport::default();

		self.inconsistencies = to_blocks(&snapshot.inconsistencies);
		report.inconsistencies = self.inconsistencies.len();

		self.mapping = CoordinateMapping::from_hubs(&snapshot.hubs, &self.layout);
		let Some(mapping) = self.mapping else {
			warn!(
				"no mappable hubs in snapshot ({} hubs, {} movements); clearing map",
				snapshot.hubs.len(),
				snapshot.movements.len()
			);
			self.vehicles.clear();
			self.hubs.clear();
			self.hover = None;
			return report;
		};
		report.mapped = true;

		report.vehicles = self.vehicles.apply(&snapshot.movements, &mapping, now_ms);
		report.hubs = self.hubs.apply(&snapshot.hubs, &mapping);
		if self.hover.is_some_and(|id| self.hubs.get(id).is_none()) {
			self.hover = None;
		}
		debug!("scene holds {} hubs and {} vehicles", self.hubs.len(), self.vehicles.len());
		report
	}

	pub fn tick(&mut self, now_ms: f64) {
		if self.vehicles.is_animating() {
			self.vehicles.tick(now_ms);
		}
	}

	pub fn inconsistencies(&self) -> &[InconsistencyBlock] {
		&self.inconsistencies
	}

	/// Update the hovered hub from a canvas position and return its label, if any.
	pub fn hover_at(&mut self, p: Option<Point>) -> Option<String> {
		let hit = p.and_then(|p| self.hubs.hit_test(p, self.layout.hub_marker_radius()));
		self.hover = hit.map(|el| el.key);
		hit.map(|el| el.attrs.tooltip())
	}
}
