use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::FleetScene;

const HUB_FILL: &str = "red";
const STROKE: &str = "black";
const LABEL_FONT: &str = "10px sans-serif";

/// Draw one frame. Vehicles go down first so hub markers sit on top of their paths.
pub fn render(scene: &FleetScene, ctx: &CanvasRenderingContext2d) {
	ctx.clear_rect(0.0, 0.0, scene.layout.width, scene.layout.height);
	draw_vehicles(scene, ctx);
	draw_hubs(scene, ctx);
}

fn draw_vehicles(scene: &FleetScene, ctx: &CanvasRenderingContext2d) {
	let radius = scene.layout.vehicle_marker_radius();
	ctx.set_line_width(1.0);
	ctx.set_stroke_style_str(STROKE);
	ctx.set_font(LABEL_FONT);

	for el in scene.vehicles.markers() {
		let marker = &el.attrs;
		let (x, y) = (marker.center.x, marker.center.y);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(&marker.color.to_css());
		ctx.fill();
		ctx.stroke();

		if marker.label_opacity > 0.01 {
			ctx.set_global_alpha(marker.label_opacity);
			ctx.set_fill_style_str(STROKE);
			let _ = ctx.fill_text(&marker.label, x + radius + 3.0, y + 3.0);
			ctx.set_global_alpha(1.0);
		}
	}
}

fn draw_hubs(scene: &FleetScene, ctx: &CanvasRenderingContext2d) {
	let radius = scene.layout.hub_marker_radius();
	ctx.set_stroke_style_str(STROKE);
	ctx.set_fill_style_str(HUB_FILL);

	for el in scene.hubs.markers() {
		let center = el.attrs.center;
		// hovered hub gets a heavier outline
		ctx.set_line_width(if scene.hover == Some(el.key) { 2.0 } else { 1.0 });
		ctx.begin_path();
		let _ = ctx.arc(center.x, center.y, radius, 0.0, 2.0 * PI);
		ctx.fill();
		ctx.stroke();
	}
	ctx.set_line_width(1.0);
}
