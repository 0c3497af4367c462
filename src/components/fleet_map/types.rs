use serde::{Deserialize, Serialize};

/// A point in dataset coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Position {
	pub x: f64,
	pub y: f64,
}

/// A point in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn lerp(self, to: Point, t: f64) -> Point {
		Point {
			x: self.x * (1.0 - t) + to.x * t,
			y: self.y * (1.0 - t) + to.y * t,
		}
	}
}

pub type HubId = i64;
pub type VehicleId = i64;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Hub {
	pub id: HubId,
	pub label: String,
	pub pos: Position,
}

/// One leg of travel for one vehicle.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Movement {
	pub vehicle_id: VehicleId,
	pub vehicle: String,
	#[serde(rename = "startPos")]
	pub start_pos: Position,
	#[serde(rename = "endPos")]
	pub end_pos: Position,
	/// Seconds from cycle start until the leg begins.
	pub timestamp: f64,
	/// Travel duration in seconds.
	pub path_time: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Inconsistency {
	pub movement_id: i64,
	pub vehicle_id: VehicleId,
	pub timestamp: serde_json::Number,
	pub inconsistency_type: String,
}

/// Every endpoint wraps its records as `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
	pub data: Vec<T>,
}

/// The three datasets of one refresh cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FleetSnapshot {
	pub hubs: Vec<Hub>,
	pub movements: Vec<Movement>,
	pub inconsistencies: Vec<Inconsistency>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn movement_uses_mixed_case_wire_names() {
		let raw = r#"{
			"vehicle_id": 7,
			"vehicle": "Truck 7",
			"startPos": {"x": 1.5, "y": 2},
			"endPos": {"x": 3, "y": 4},
			"timestamp": 2,
			"path_time": 3.5
		}"#;
		let movement: Movement = serde_json::from_str(raw).unwrap();
		assert_eq!(
			movement,
			Movement {
				vehicle_id: 7,
				vehicle: "Truck 7".into(),
				start_pos: Position { x: 1.5, y: 2.0 },
				end_pos: Position { x: 3.0, y: 4.0 },
				timestamp: 2.0,
				path_time: 3.5,
			}
		);
	}

	#[test]
	fn envelope_unwraps_data() {
		let raw = r#"{"data": [{"id": 1, "label": "North", "pos": {"x": 0, "y": 0}}]}"#;
		let envelope: Envelope<Hub> = serde_json::from_str(raw).unwrap();
		assert_eq!(envelope.data.len(), 1);
		assert_eq!(envelope.data[0].label, "North");
	}

	#[test]
	fn inconsistency_timestamp_keeps_integer_form() {
		let raw = r#"{"movement_id": 5, "vehicle_id": 3, "timestamp": 12, "inconsistency_type": "duplicate"}"#;
		let record: Inconsistency = serde_json::from_str(raw).unwrap();
		assert_eq!(serde_json::to_string(&record).unwrap(), raw.replace(": ", ":").replace(", ", ","));
	}
}
