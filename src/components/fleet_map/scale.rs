//! Linear scales from dataset space onto canvas pixels and colors.

use super::types::{Hub, Point, Position};
use crate::config::MapLayout;

/// Minimum and maximum of the finite values, or `None` if there are none.
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
	values
		.into_iter()
		.filter(|v| v.is_finite())
		.fold(None, |acc, v| match acc {
			None => Some((v, v)),
			Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
		})
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	pub fn from_values(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Option<Self> {
		extent(values).map(|domain| Self::new(domain, range))
	}

	/// Normalized position of `v` in the domain. A zero-width domain puts everything at 0.5.
	fn normalize(&self, v: f64) -> f64 {
		let (d0, d1) = self.domain;
		let span = d1 - d0;
		if span == 0.0 || !span.is_finite() {
			0.5
		} else {
			(v - d0) / span
		}
	}

	pub fn apply(&self, v: f64) -> f64 {
		let t = self.normalize(v);
		let (r0, r1) = self.range;
		r0 * (1.0 - t) + r1 * t
	}
}

/// Dataset-to-canvas projection for one cycle. Built once from the hub set and handed to every
/// layer of that cycle by value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapping {
	pub fx: LinearScale,
	pub fy: LinearScale,
}

impl CoordinateMapping {
	/// `None` when there is no finite hub coordinate on either axis.
	pub fn from_hubs(hubs: &[Hub], layout: &MapLayout) -> Option<Self> {
		let fx = LinearScale::from_values(hubs.iter().map(|h| h.pos.x), layout.x_range())?;
		let fy = LinearScale::from_values(hubs.iter().map(|h| h.pos.y), layout.y_range())?;
		Some(Self { fx, fy })
	}

	pub fn project(&self, pos: Position) -> Point {
		Point::new(self.fx.apply(pos.x), self.fy.apply(pos.y))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
	pub r: u8,
	pub g: u8,
	pub b: u8,
}

impl Rgb {
	pub const YELLOW: Rgb = Rgb { r: 255, g: 255, b: 0 };
	pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };

	pub fn to_css(self) -> String {
		format!("rgb({}, {}, {})", self.r, self.g, self.b)
	}
}

/// Continuous two-color gradient over a numeric domain, interpolated per RGB channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorScale {
	scale: LinearScale,
	low: Rgb,
	high: Rgb,
}

impl ColorScale {
	pub fn from_values(values: impl IntoIterator<Item = f64>, low: Rgb, high: Rgb) -> Option<Self> {
		let scale = LinearScale::from_values(values, (0.0, 1.0))?;
		Some(Self { scale, low, high })
	}

	pub fn apply(&self, v: f64) -> Rgb {
		let t = self.scale.apply(v).clamp(0.0, 1.0);
		let channel = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Rgb {
			r: channel(self.low.r, self.high.r),
			g: channel(self.low.g, self.high.g),
			b: channel(self.low.b, self.high.b),
		}
	}
}

/// Two-decimal rounding, half up, with an epsilon nudge for values like 1.005.
pub fn round2(v: f64) -> f64 {
	((v + f64::EPSILON) * 100.0 + 0.5).floor() / 100.0
}
