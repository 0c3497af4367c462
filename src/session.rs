//! Refresh state machine: Idle while the trigger is usable, Refreshing while a cycle is in flight.

use std::cell::RefCell;

use leptos::prelude::{RwSignal, Update};
use log::{error, info};

use crate::api::{FetchError, FleetSource, fetch_snapshot};
use crate::components::fleet_map::FleetSnapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
	Idle,
	Refreshing,
}

/// Proof that a cycle was started. Results are only accepted for the current ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleTicket(u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionController {
	phase: SessionPhase,
	cycle: u64,
	last_error: Option<String>,
}

impl Default for SessionController {
	fn default() -> Self {
		Self {
			phase: SessionPhase::Idle,
			cycle: 0,
			last_error: None,
		}
	}
}

impl SessionController {
	pub fn is_refreshing(&self) -> bool {
		self.phase == SessionPhase::Refreshing
	}

	pub fn last_error(&self) -> Option<&str> {
		self.last_error.as_deref()
	}

	pub fn is_current(&self, ticket: CycleTicket) -> bool {
		self.is_refreshing() && ticket.0 == self.cycle
	}

	/// Idle -> Refreshing. `None` while a cycle is already in flight.
	pub fn begin(&mut self) -> Option<CycleTicket> {
		if self.is_refreshing() {
			return None;
		}
		self.cycle += 1;
		self.phase = SessionPhase::Refreshing;
		info!("refresh cycle {} started", self.cycle);
		Some(CycleTicket(self.cycle))
	}

	/// Refreshing -> Idle, on success and on failure alike. Returns `false` for a stale ticket,
	/// which leaves the state untouched.
	pub fn finish(&mut self, ticket: CycleTicket, outcome: Result<(), &FetchError>) -> bool {
		if !self.is_current(ticket) {
			return false;
		}
		self.phase = SessionPhase::Idle;
		match outcome {
			Ok(()) => {
				self.last_error = None;
				info!("refresh cycle {} finished", ticket.0);
			}
			Err(e) => {
				error!("refresh cycle {} failed: {e}", ticket.0);
				self.last_error = Some(e.to_string());
			}
		}
		true
	}
}

/// Shared handle to the controller, so a cycle can run against plain or reactive storage.
pub trait SessionStore {
	/// Run `f` on the controller. `None` if the storage is gone.
	fn with_session<R>(&self, f: impl FnOnce(&mut SessionController) -> R) -> Option<R>;
}

impl SessionStore for RefCell<SessionController> {
	fn with_session<R>(&self, f: impl FnOnce(&mut SessionController) -> R) -> Option<R> {
		Some(f(&mut self.borrow_mut()))
	}
}

impl SessionStore for RwSignal<SessionController> {
	fn with_session<R>(&self, f: impl FnOnce(&mut SessionController) -> R) -> Option<R> {
		self.try_update(f)
	}
}

/// One full cycle against `source`: fetch everything, hand the snapshot to `render` only if the
/// ticket is still current, then return to Idle whatever happened. `None` if a cycle was
/// already in flight.
pub async fn run_cycle<St, S, F>(
	session: &St,
	source: &S,
	render: F,
) -> Option<Result<(), FetchError>>
where
	St: SessionStore,
	S: FleetSource,
	F: FnOnce(&FleetSnapshot),
{
	let ticket = session.with_session(|s| s.begin()).flatten()?;
	let outcome = fetch_snapshot(source).await;
	if let Ok(snapshot) = &outcome {
		if session.with_session(|s| s.is_current(ticket)).unwrap_or(false) {
			render(snapshot);
		}
	}
	let outcome = outcome.map(|_| ());
	session.with_session(|s| s.finish(ticket, outcome.as_ref().map(|_| ())));
	Some(outcome)
}
