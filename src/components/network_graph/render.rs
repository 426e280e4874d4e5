//! Canvas rendering for the network graph.
//!
//! Materializes a [`Frame`] of draw commands. Rendering uses multiple passes
//! for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, hovered edge last (world space)
//! 3. Nodes, then pin and focus rings
//! 4. Labels and detail annotations

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{EdgeDraw, Frame, LabelDraw, NodeDraw};
use super::theme::{Color, Theme};

/// Renders one frame to the canvas.
pub fn render(frame: &Frame, ctx: &CanvasRenderingContext2d, theme: &Theme, width: f64, height: f64) {
	draw_background(ctx, theme, width, height);

	ctx.save();
	let _ = ctx.translate(frame.transform.x, frame.transform.y);
	let _ = ctx.scale(frame.transform.k, frame.transform.k);

	draw_edges(ctx, theme, &frame.edges);
	draw_nodes(ctx, frame, theme);
	draw_labels(ctx, frame, theme);

	ctx.restore();
}

fn draw_background(ctx: &CanvasRenderingContext2d, theme: &Theme, width: f64, height: f64) {
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				width / 2.0,
				height / 2.0,
				0.0,
				width / 2.0,
				height / 2.0,
				width.max(height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, width, height);
}

fn draw_edges(ctx: &CanvasRenderingContext2d, theme: &Theme, edges: &[EdgeDraw]) {
	ctx.set_line_cap("round");
	for edge in edges.iter().filter(|e| !e.hovered) {
		draw_edge(ctx, edge, theme.edge.color(edge.bucket));
	}
	for edge in edges.iter().filter(|e| e.hovered) {
		draw_edge(ctx, edge, theme.edge.hovered);
	}
}

fn draw_edge(ctx: &CanvasRenderingContext2d, edge: &EdgeDraw, color: Color) {
	let (dx, dy) = (edge.x2 - edge.x1, edge.y2 - edge.y1);
	if dx * dx + dy * dy < 1e-6 {
		return;
	}

	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(edge.width);
	ctx.begin_path();
	ctx.move_to(edge.x1, edge.y1);
	ctx.line_to(edge.x2, edge.y2);
	ctx.stroke();
}

fn draw_nodes(ctx: &CanvasRenderingContext2d, frame: &Frame, theme: &Theme) {
	for node in &frame.nodes {
		draw_node(ctx, node, theme);
	}

	// Rings go on top so neighbors never cover them.
	for node in frame.nodes.iter().filter(|n| n.pinned) {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(3.0 * frame.scale.ring_width),
			&JsValue::from_f64(2.0 * frame.scale.ring_width),
		));
		draw_ring(
			ctx,
			node,
			theme.node.pin_color,
			frame.scale.ring_width,
			frame.scale.ring_width * 2.0,
		);
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	for node in frame.nodes.iter().filter(|n| n.focused) {
		draw_ring(
			ctx,
			node,
			theme.node.focus_color,
			frame.scale.ring_width,
			frame.scale.ring_width * 4.0,
		);
	}
}

fn draw_node(ctx: &CanvasRenderingContext2d, node: &NodeDraw, theme: &Theme) {
	let (x, y, radius) = (node.x, node.y, node.radius);

	let gradient = theme
		.node
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &node.color.lighten(0.4).to_css());
			let _ = gradient.add_color_stop(0.7, &node.color.to_css());
			let _ = gradient.add_color_stop(1.0, &node.color.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&node.color.to_css()),
	}
	ctx.fill();
}

fn draw_ring(ctx: &CanvasRenderingContext2d, node: &NodeDraw, color: Color, width: f64, offset: f64) {
	ctx.begin_path();
	let _ = ctx.arc(node.x, node.y, node.radius + offset, 0.0, 2.0 * PI);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(width);
	ctx.stroke();
}

fn draw_labels(ctx: &CanvasRenderingContext2d, frame: &Frame, theme: &Theme) {
	if frame.labels.is_empty() {
		return;
	}

	ctx.set_font(&frame.scale.label_font);
	ctx.set_fill_style_str(&theme.label.color.to_css());
	for label in &frame.labels {
		let _ = ctx.fill_text(&label.text, label.x, label.y);
	}

	let details: Vec<&LabelDraw> = frame.labels.iter().filter(|l| l.detail.is_some()).collect();
	if details.is_empty() {
		return;
	}
	ctx.set_font(&frame.scale.detail_font);
	ctx.set_fill_style_str(&theme.label.detail_color.to_css());
	for label in details {
		if let Some(detail) = &label.detail {
			let _ = ctx.fill_text(detail, label.x, label.y + frame.scale.detail_line_height);
		}
	}
}
