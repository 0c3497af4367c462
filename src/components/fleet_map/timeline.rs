//! Delayed, cancelable transitions applied to element attributes on each frame tick.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::keyed::ElementId;
use super::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
	Linear,
	CubicIn,
	CubicOut,
}

impl Ease {
	pub fn apply(self, t: f64) -> f64 {
		let t = t.clamp(0.0, 1.0);
		match self {
			Self::Linear => t,
			Self::CubicIn => t * t * t,
			Self::CubicOut => 1.0 - (1.0 - t).powi(3),
		}
	}
}

/// Shared cancellation flag. Every transition scheduled for an element carries a clone of that
/// element's token; cancelling the token stops all of them.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
	pub fn cancel(&self) {
		self.0.set(true);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

/// Interpolated attribute. Transitions on the same element and channel interrupt each other.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Tween {
	Position { from: Point, to: Point },
	Opacity { from: f64, to: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
	Position,
	Opacity,
}

impl Tween {
	fn channel(&self) -> Channel {
		match self {
			Self::Position { .. } => Channel::Position,
			Self::Opacity { .. } => Channel::Opacity,
		}
	}
}

/// Attributes a transition can write to.
pub trait Animatable {
	fn set_position(&mut self, pos: Point);
	fn set_opacity(&mut self, opacity: f64);
}

#[derive(Clone, Debug)]
pub struct Transition {
	pub element: ElementId,
	pub token: CancelToken,
	/// Absolute start time on the scheduler clock, in milliseconds.
	pub start_ms: f64,
	pub duration_ms: f64,
	pub ease: Ease,
	pub tween: Tween,
	started: bool,
}

impl Transition {
	pub fn new(
		element: ElementId,
		token: CancelToken,
		start_ms: f64,
		duration_ms: f64,
		ease: Ease,
		tween: Tween,
	) -> Self {
		Self {
			element,
			token,
			start_ms,
			duration_ms: duration_ms.max(0.0),
			ease,
			tween,
			started: false,
		}
	}

	fn end_ms(&self) -> f64 {
		self.start_ms + self.duration_ms
	}

	fn progress(&self, now_ms: f64) -> f64 {
		if self.duration_ms <= 0.0 {
			1.0
		} else {
			((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0)
		}
	}

	fn write<A: Animatable>(&self, target: &mut A, now_ms: f64) {
		let t = self.ease.apply(self.progress(now_ms));
		match self.tween {
			Tween::Position { from, to } => target.set_position(from.lerp(to, t)),
			Tween::Opacity { from, to } => target.set_opacity(from * (1.0 - t) + to * t),
		}
	}
}

/// Pending and running transitions of one layer.
#[derive(Debug, Default)]
pub struct Scheduler {
	transitions: Vec<Transition>,
}

impl Scheduler {
	pub fn schedule(&mut self, transition: Transition) {
		self.transitions.push(transition);
	}

	/// Transitions not yet finished or cancelled.
	pub fn pending(&self) -> usize {
		self.transitions.iter().filter(|t| !t.token.is_cancelled()).count()
	}

	pub fn is_idle(&self) -> bool {
		self.pending() == 0
	}

	/// Drop every transition whose token has been cancelled.
	pub fn prune(&mut self) {
		self.transitions.retain(|t| !t.token.is_cancelled());
	}

	/// Advance to `now_ms`, writing into `targets`. Transitions start in start-time order; a
	/// starting transition interrupts older running ones on the same element and channel.
	/// Finished transitions write their end value once and are removed.
	pub fn tick<A: Animatable>(&mut self, now_ms: f64, targets: &mut HashMap<ElementId, &mut A>) {
		self.prune();
		self.transitions
			.sort_by(|a, b| a.start_ms.total_cmp(&b.start_ms));

		let mut interrupted = vec![false; self.transitions.len()];
		for i in 0..self.transitions.len() {
			let current = &self.transitions[i];
			if current.started || now_ms < current.start_ms {
				continue;
			}
			for (j, other) in self.transitions.iter().enumerate().take(i) {
				if other.started
					&& other.element == current.element
					&& other.tween.channel() == current.tween.channel()
				{
					interrupted[j] = true;
				}
			}
			self.transitions[i].started = true;
		}

		let mut index = 0;
		self.transitions.retain(|_| {
			let keep = !interrupted[index];
			index += 1;
			keep
		});

		for transition in self.transitions.iter().filter(|t| t.started) {
			if let Some(attrs) = targets.get_mut(&transition.element) {
				transition.write(&mut **attrs, now_ms);
			}
		}

		self.transitions
			.retain(|t| !t.started || now_ms < t.end_ms());
	}
}
