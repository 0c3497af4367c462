//! Read-only access to the fleet API.

use std::fmt;
use std::future::Future;
use std::pin::pin;

use futures_util::future::{Either, select, try_join3};
use gloo_net::http::Request;
use log::debug;
use serde::de::DeserializeOwned;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, AbortSignal};

use crate::components::fleet_map::{Envelope, FleetSnapshot, Hub, Inconsistency, Movement};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
	Hubs,
	Movements,
	Inconsistencies,
}

impl Endpoint {
	pub fn path(self) -> &'static str {
		match self {
			Self::Hubs => "/api/hubs",
			Self::Movements => "/api/movements",
			Self::Inconsistencies => "/api/inconsistencies",
		}
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.path())
	}
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
	#[error("{endpoint}: request failed: {message}")]
	Transport { endpoint: Endpoint, message: String },

	#[error("{endpoint}: server answered {status}")]
	Status { endpoint: Endpoint, status: u16 },

	#[error("{endpoint}: malformed response: {source}")]
	Decode {
		endpoint: Endpoint,
		#[source]
		source: serde_json::Error,
	},

	#[error("{endpoint}: no response after {ms} ms")]
	Timeout { endpoint: Endpoint, ms: u32 },
}

/// Something that can answer a GET for an endpoint with its raw JSON body.
pub trait FleetSource {
	fn get_json(&self, endpoint: Endpoint) -> impl Future<Output = Result<String, FetchError>>;
}

/// Browser HTTP client for the fleet API.
#[derive(Clone, Debug, Default)]
pub struct HttpSource {
	base_url: String,
	timeout_ms: Option<u32>,
}

impl HttpSource {
	pub fn new(base_url: impl Into<String>, timeout_ms: Option<u32>) -> Self {
		Self {
			base_url: base_url.into(),
			timeout_ms,
		}
	}

	pub fn url(&self, endpoint: Endpoint) -> String {
		format!("{}{}", self.base_url, endpoint.path())
	}

	async fn request(
		&self,
		endpoint: Endpoint,
		signal: Option<&AbortSignal>,
	) -> Result<String, FetchError> {
		let transport = |e: gloo_net::Error| FetchError::Transport {
			endpoint,
			message: e.to_string(),
		};
		let resp = Request::get(&self.url(endpoint))
			.abort_signal(signal)
			.send()
			.await
			.map_err(transport)?;
		if !resp.ok() {
			return Err(FetchError::Status {
				endpoint,
				status: resp.status(),
			});
		}
		resp.text().await.map_err(transport)
	}
}

impl FleetSource for HttpSource {
	async fn get_json(&self, endpoint: Endpoint) -> Result<String, FetchError> {
		let Some(ms) = self.timeout_ms else {
			return self.request(endpoint, None).await;
		};
		let controller = AbortController::new().ok();
		let signal = controller.as_ref().map(AbortController::signal);
		let request = self.request(endpoint, signal.as_ref());
		let abort = || {
			if let Some(controller) = &controller {
				controller.abort();
			}
		};
		with_deadline(request, sleep_ms(ms), abort)
			.await
			.unwrap_or(Err(FetchError::Timeout { endpoint, ms }))
	}
}

/// Race `work` against `deadline`. If the deadline wins, `on_expiry` runs and `None` is
/// returned; the unfinished work is dropped.
async fn with_deadline<T>(
	work: impl Future<Output = T>,
	deadline: impl Future<Output = ()>,
	on_expiry: impl FnOnce(),
) -> Option<T> {
	match select(pin!(work), pin!(deadline)).await {
		Either::Left((out, _)) => Some(out),
		Either::Right(_) => {
			on_expiry();
			None
		}
	}
}

/// Resolve after `ms` milliseconds on the browser event loop.
async fn sleep_ms(ms: u32) {
	let promise = js_sys::Promise::new(&mut |resolve, _| {
		if let Some(window) = web_sys::window() {
			let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
				&resolve,
				i32::try_from(ms).unwrap_or(i32::MAX),
			);
		}
	});
	let _ = JsFuture::from(promise).await;
}

async fn fetch_records<S, T>(source: &S, endpoint: Endpoint) -> Result<Vec<T>, FetchError>
where
	S: FleetSource,
	T: DeserializeOwned,
{
	let body = source.get_json(endpoint).await?;
	let envelope: Envelope<T> =
		serde_json::from_str(&body).map_err(|source| FetchError::Decode { endpoint, source })?;
	debug!("{endpoint}: {} records", envelope.data.len());
	Ok(envelope.data)
}

/// Fetch all three datasets concurrently. Fails as a whole on the first error.
pub async fn fetch_snapshot<S: FleetSource>(source: &S) -> Result<FleetSnapshot, FetchError> {
	let (inconsistencies, hubs, movements) = try_join3(
		fetch_records::<_, Inconsistency>(source, Endpoint::Inconsistencies),
		fetch_records::<_, Hub>(source, Endpoint::Hubs),
		fetch_records::<_, Movement>(source, Endpoint::Movements),
	)
	.await?;
	Ok(FleetSnapshot {
		hubs,
		movements,
		inconsistencies,
	})
}
