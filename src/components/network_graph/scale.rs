//! Zoom-dependent scaling for graph visuals.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: The coordinate system of the layout. Values in
//!   world-space scale proportionally with zoom.
//! - **Screen-space**: Pixel coordinates on the canvas. Values in screen-space
//!   remain constant regardless of zoom level.
//!
//! Node radii and edge widths come from the data (activity, value) in world
//! units and are clamped so they stay readable at any zoom. Text and hit
//! slack are fixed screen sizes.

/// World-space size clamped to on-screen bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenClamp {
	/// Smallest on-screen size in pixels.
	pub min_screen: f64,
	/// Largest on-screen size in pixels.
	pub max_screen: f64,
}

impl ScreenClamp {
	/// World-space value for `base` at zoom `k`, ready for drawing after the
	/// canvas transform has been applied.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		base.clamp(self.min_screen / k, self.max_screen / k)
	}
}

/// Scaling knobs for every drawn element.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// How a node's activity-derived radius scales.
	pub node_radius: ScreenClamp,
	/// How an edge's value-derived stroke width scales.
	pub edge_width: ScreenClamp,
	/// Extra pick radius around nodes and edges, in screen pixels.
	pub hit_slack: f64,
	/// Primary label font size in screen pixels.
	pub label_size: f64,
	/// Detail annotation font size in screen pixels.
	pub detail_size: f64,
	/// Gap between a node and its label in screen pixels.
	pub label_gap: f64,
	/// Pin marker ring width in screen pixels.
	pub ring_width: f64,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: ScreenClamp {
				min_screen: 2.0,
				max_screen: 60.0,
			},
			edge_width: ScreenClamp {
				min_screen: 0.5,
				max_screen: 8.0,
			},
			hit_slack: 4.0,
			label_size: 11.0,
			detail_size: 9.0,
			label_gap: 4.0,
			ring_width: 1.5,
		}
	}
}

/// Scale values for one zoom level.
///
/// Computed once per frame and shared by every draw command.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	node_radius: ScreenClamp,
	edge_width: ScreenClamp,
	/// Pick slack in world-space.
	pub hit_slack: f64,
	/// Primary label font, e.g. `"11px sans-serif"` in world-space pixels.
	pub label_font: String,
	/// Detail annotation font.
	pub detail_font: String,
	/// Detail line height in world-space.
	pub detail_line_height: f64,
	/// Label gap in world-space.
	pub label_gap: f64,
	/// Pin ring width in world-space.
	pub ring_width: f64,
}

impl ScaledValues {
	/// Computes the values for zoom `k`; non-positive zoom is treated as 1.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let k = if k > 0.0 { k } else { 1.0 };
		Self {
			k,
			node_radius: config.node_radius.clone(),
			edge_width: config.edge_width.clone(),
			hit_slack: config.hit_slack / k,
			label_font: format!("{}px sans-serif", config.label_size / k),
			detail_font: format!("{}px sans-serif", config.detail_size / k),
			detail_line_height: (config.detail_size + 2.0) / k,
			label_gap: config.label_gap / k,
			ring_width: config.ring_width / k,
		}
	}

	/// Drawn radius for a node whose layout radius is `base`.
	pub fn node_radius(&self, base: f64) -> f64 {
		self.node_radius.apply(base, self.k)
	}

	/// Drawn stroke width for an edge whose visual weight is `base`.
	pub fn edge_width(&self, base: f64) -> f64 {
		self.edge_width.apply(base, self.k)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_sizes_stay_on_screen() {
		let config = ScaleConfig::default();

		let far = ScaledValues::new(&config, 0.1);
		assert!((far.node_radius(5.0) * far.k - 2.0).abs() < 1e-9);
		let near = ScaledValues::new(&config, 10.0);
		assert!((near.node_radius(40.0) * near.k - 60.0).abs() < 1e-9);
		let normal = ScaledValues::new(&config, 1.0);
		assert_eq!(normal.node_radius(12.0), 12.0);
		assert_eq!(normal.edge_width(3.0), 3.0);
	}

	#[test]
	fn text_keeps_its_screen_size() {
		let config = ScaleConfig::default();
		let scaled = ScaledValues::new(&config, 2.0);
		assert_eq!(scaled.label_font, "5.5px sans-serif");
		assert_eq!(scaled.hit_slack, 2.0);
		assert_eq!(scaled.ring_width, 0.75);
	}

	#[test]
	fn non_positive_zoom_falls_back_to_identity() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 0.0);
		assert_eq!(scaled.k, 1.0);
	}
}
