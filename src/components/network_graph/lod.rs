//! Level-of-detail and viewport culling.
//!
//! Two independent filters decide what is drawn each frame:
//!
//! - **Size/zoom filter**: below an entity kind's zoom threshold, small nodes
//!   and low-value edges are hidden. Labels and detail annotations have their
//!   own, higher thresholds because text is the most expensive thing to draw.
//! - **Viewport culling**: anything whose bounding box misses the visible
//!   rectangle (grown by [`CULL_BUFFER_PX`]) is skipped. Toggled by
//!   [`PerformanceConfig::viewport_culling`].

use super::gesture::ViewportTransform;
use super::perf::PerformanceConfig;

/// Screen-space margin kept around the viewport so elements just outside the
/// fold are already drawn when panned in.
pub const CULL_BUFFER_PX: f64 = 100.0;

/// Visible world-space rectangle, including the culling buffer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
	/// Left edge.
	pub min_x: f64,
	/// Top edge.
	pub min_y: f64,
	/// Right edge.
	pub max_x: f64,
	/// Bottom edge.
	pub max_y: f64,
}

impl ViewportRect {
	/// World-space area shown by a `width` x `height` surface under
	/// `transform`, grown by [`CULL_BUFFER_PX`] screen pixels on every side.
	pub fn visible_area(transform: &ViewportTransform, width: f64, height: f64) -> Self {
		let (x0, y0) = transform.screen_to_world(-CULL_BUFFER_PX, -CULL_BUFFER_PX);
		let (x1, y1) = transform.screen_to_world(width + CULL_BUFFER_PX, height + CULL_BUFFER_PX);
		Self {
			min_x: x0.min(x1),
			min_y: y0.min(y1),
			max_x: x0.max(x1),
			max_y: y0.max(y1),
		}
	}

	/// Whether the bounding box of a disc touches the rectangle.
	pub fn contains_circle(&self, x: f64, y: f64, radius: f64) -> bool {
		!(x + radius < self.min_x
			|| x - radius > self.max_x
			|| y + radius < self.min_y
			|| y - radius > self.max_y)
	}

	/// Whether the bounding box of a segment touches the rectangle.
	pub fn contains_segment(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> bool {
		!(x1.max(x2) < self.min_x
			|| x1.min(x2) > self.max_x
			|| y1.max(y2) < self.min_y
			|| y1.min(y2) > self.max_y)
	}
}

/// Something the LOD filter can be asked about.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LodEntity {
	/// A node disc.
	Node {
		/// Activity metric.
		activity: f64,
		/// Center x.
		x: f64,
		/// Center y.
		y: f64,
		/// Radius in world units.
		radius: f64,
	},
	/// An edge segment.
	Edge {
		/// Total value.
		value: f64,
		/// Start x.
		x1: f64,
		/// Start y.
		y1: f64,
		/// End x.
		x2: f64,
		/// End y.
		y2: f64,
	},
	/// A node's primary label.
	Label {
		/// Activity of the labeled node.
		activity: f64,
		/// Anchor x.
		x: f64,
		/// Anchor y.
		y: f64,
		/// Radius of the labeled node.
		radius: f64,
	},
	/// A node's secondary annotation.
	DetailLabel {
		/// Activity of the annotated node.
		activity: f64,
		/// Anchor x.
		x: f64,
		/// Anchor y.
		y: f64,
		/// Radius of the annotated node.
		radius: f64,
	},
}

/// Decides whether `entity` is drawn at `zoom` inside `viewport`.
pub fn visible(
	entity: &LodEntity,
	zoom: f64,
	viewport: &ViewportRect,
	config: &PerformanceConfig,
) -> bool {
	passes_detail_filter(entity, zoom, config)
		&& (!config.viewport_culling || in_viewport(entity, viewport))
}

/// The size/zoom half of [`visible`], without culling.
fn passes_detail_filter(entity: &LodEntity, zoom: f64, config: &PerformanceConfig) -> bool {
	match *entity {
		LodEntity::Node { activity, .. } => node_shown(activity, zoom, config),
		LodEntity::Edge { value, .. } => edge_shown(value, zoom, config),
		LodEntity::Label { activity, .. } => {
			zoom >= config.label_zoom_threshold && node_shown(activity, zoom, config)
		}
		LodEntity::DetailLabel { activity, .. } => {
			zoom >= config.detail_zoom_threshold
				&& zoom >= config.label_zoom_threshold
				&& node_shown(activity, zoom, config)
		}
	}
}

/// Whether a node of this activity is drawn at `zoom`, ignoring culling.
pub fn node_shown(activity: f64, zoom: f64, config: &PerformanceConfig) -> bool {
	zoom >= config.node_zoom_threshold || activity >= config.min_node_size_to_show
}

/// Whether an edge of this value is drawn at `zoom`, ignoring culling.
pub fn edge_shown(value: f64, zoom: f64, config: &PerformanceConfig) -> bool {
	zoom >= config.edge_zoom_threshold || value >= config.min_edge_value_to_show
}

fn in_viewport(entity: &LodEntity, viewport: &ViewportRect) -> bool {
	match *entity {
		LodEntity::Node { x, y, radius, .. }
		| LodEntity::Label { x, y, radius, .. }
		| LodEntity::DetailLabel { x, y, radius, .. } => viewport.contains_circle(x, y, radius),
		LodEntity::Edge { x1, y1, x2, y2, .. } => viewport.contains_segment(x1, y1, x2, y2),
	}
}

#[cfg(test)]
mod tests {
	use super::super::perf::PerformanceTier;
	use super::*;

	fn config() -> PerformanceConfig {
		PerformanceTier::Large.config()
	}

	fn wide_viewport() -> ViewportRect {
		ViewportRect {
			min_x: -1e6,
			min_y: -1e6,
			max_x: 1e6,
			max_y: 1e6,
		}
	}

	fn node(activity: f64, x: f64, y: f64) -> LodEntity {
		LodEntity::Node {
			activity,
			x,
			y,
			radius: 5.0,
		}
	}

	fn label(activity: f64) -> LodEntity {
		LodEntity::Label {
			activity,
			x: 0.0,
			y: 0.0,
			radius: 5.0,
		}
	}

	fn detail(activity: f64) -> LodEntity {
		LodEntity::DetailLabel {
			activity,
			x: 0.0,
			y: 0.0,
			radius: 5.0,
		}
	}

	#[test]
	fn everything_visible_above_thresholds() {
		let c = config();
		let v = wide_viewport();
		let zoom = c.detail_zoom_threshold;

		assert!(visible(&node(0.0, 0.0, 0.0), zoom, &v, &c));
		assert!(visible(&label(0.0), zoom, &v, &c));
		assert!(visible(&detail(0.0), zoom, &v, &c));
		let edge = LodEntity::Edge {
			value: 0.0,
			x1: 0.0,
			y1: 0.0,
			x2: 10.0,
			y2: 10.0,
		};
		assert!(visible(&edge, zoom, &v, &c));
	}

	#[test]
	fn small_nodes_and_weak_edges_hidden_when_zoomed_out() {
		let c = config();
		let v = wide_viewport();
		let zoom = c.node_zoom_threshold.min(c.edge_zoom_threshold) / 2.0;

		assert!(!visible(&node(c.min_node_size_to_show - 1.0, 0.0, 0.0), zoom, &v, &c));
		assert!(visible(&node(c.min_node_size_to_show, 0.0, 0.0), zoom, &v, &c));

		let edge = |value| LodEntity::Edge {
			value,
			x1: 0.0,
			y1: 0.0,
			x2: 1.0,
			y2: 1.0,
		};
		assert!(!visible(&edge(c.min_edge_value_to_show / 2.0), zoom, &v, &c));
		assert!(visible(&edge(c.min_edge_value_to_show), zoom, &v, &c));

		assert!(!edge_shown(c.min_edge_value_to_show / 2.0, zoom, &c));
		assert!(edge_shown(c.min_edge_value_to_show / 2.0, c.edge_zoom_threshold, &c));
		assert!(!node_shown(0.0, zoom, &c));
	}

	#[test]
	fn labels_use_three_independent_thresholds() {
		let c = config();
		let v = wide_viewport();
		let big = c.min_node_size_to_show * 10.0;

		let between_node_and_label = (c.node_zoom_threshold + c.label_zoom_threshold) / 2.0;
		assert!(visible(&node(0.0, 0.0, 0.0), between_node_and_label, &v, &c));
		assert!(!visible(&label(big), between_node_and_label, &v, &c));

		let between_label_and_detail = (c.label_zoom_threshold + c.detail_zoom_threshold) / 2.0;
		assert!(visible(&label(big), between_label_and_detail, &v, &c));
		assert!(!visible(&detail(big), between_label_and_detail, &v, &c));
		assert!(visible(&detail(big), c.detail_zoom_threshold, &v, &c));
	}

	#[test]
	fn culling_is_independently_toggleable() {
		let mut c = config();
		let transform = ViewportTransform::identity();
		let v = ViewportRect::visible_area(&transform, 800.0, 600.0);
		let far = node(1e6, 5000.0, 5000.0);
		let just_outside = node(1e6, 850.0, 300.0);

		assert!(!visible(&far, 2.0, &v, &c));
		assert!(visible(&just_outside, 2.0, &v, &c));

		c.viewport_culling = false;
		assert!(visible(&far, 2.0, &v, &c));
	}

	#[test]
	fn segments_crossing_the_view_are_kept() {
		let v = ViewportRect {
			min_x: 0.0,
			min_y: 0.0,
			max_x: 100.0,
			max_y: 100.0,
		};
		assert!(v.contains_segment(-50.0, 50.0, 150.0, 50.0));
		assert!(!v.contains_segment(-50.0, -50.0, -10.0, 150.0));
		assert!(v.contains_circle(-3.0, 50.0, 5.0));
		assert!(!v.contains_circle(-6.0, 50.0, 5.0));
	}

	#[test]
	fn visible_area_follows_pan_and_zoom() {
		let transform = ViewportTransform {
			x: 100.0,
			y: 50.0,
			k: 2.0,
		};
		let v = ViewportRect::visible_area(&transform, 800.0, 600.0);
		assert_eq!(v.min_x, (-CULL_BUFFER_PX - 100.0) / 2.0);
		assert_eq!(v.min_y, (-CULL_BUFFER_PX - 50.0) / 2.0);
		assert_eq!(v.max_x, (800.0 + CULL_BUFFER_PX - 100.0) / 2.0);
		assert_eq!(v.max_y, (600.0 + CULL_BUFFER_PX - 50.0) / 2.0);
	}
}
