use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{error, info};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Window};

use super::render;
use super::state::FleetScene;
use super::types::Point;

const TOOLTIP_STYLE: &str = "position: fixed; z-index: 10; background: #fff; text-align: center; padding: 2px; font: 12px sans-serif; border-radius: 5px;";

/// Milliseconds on the page's monotonic clock.
pub fn now_ms() -> f64 {
	web_sys::window()
		.and_then(|w| w.performance())
		.map(|p| p.now())
		.unwrap_or(0.0)
}

fn context_2d(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")
		.ok()
		.flatten()
		.and_then(|ctx| ctx.dyn_into().ok())
}

/// Fixed-size canvas showing `scene`, redrawn every animation frame.
#[component]
pub fn FleetMapCanvas(scene: Rc<RefCell<FleetScene>>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let tooltip = RwSignal::new(None::<(String, i32, i32)>);
	let layout = scene.borrow().layout;
	let (scene_init, animate_init) = (scene.clone(), animate.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window): Option<Window> = web_sys::window() else {
			return;
		};
		canvas.set_width(layout.width as u32);
		canvas.set_height(layout.height as u32);

		let Some(ctx) = context_2d(&canvas) else {
			error!("canvas has no 2d context");
			return;
		};
		info!("canvas ready ({}x{})", layout.width, layout.height);

		let (scene_anim, animate_inner) = (scene_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = scene_anim.borrow_mut();
				s.tick(now_ms());
				render::render(&s, &ctx);
			}
			if let (Some(window), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let rect = canvas.get_bounding_client_rect();
		let p = Point::new(
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		let label = scene_mm.borrow_mut().hover_at(Some(p));
		tooltip.set(label.map(|text| (text, ev.client_x() + 10, ev.client_y() - 10)));
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		scene_ml.borrow_mut().hover_at(None);
		tooltip.set(None);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="fleet-map-canvas"
			on:mousemove=on_mousemove
			on:mouseleave=on_mouseleave
			style="display: block;"
		/>
		<div
			class="fleet-map-tooltip"
			style=TOOLTIP_STYLE
			style:visibility=move || if tooltip.with(Option::is_some) { "visible" } else { "hidden" }
			style:left=move || tooltip.with(|t| t.as_ref().map(|t| format!("{}px", t.1)).unwrap_or_default())
			style:top=move || tooltip.with(|t| t.as_ref().map(|t| format!("{}px", t.2)).unwrap_or_default())
		>
			{move || tooltip.with(|t| t.as_ref().map(|t| t.0.clone()).unwrap_or_default())}
		</div>
	}
}
