//! Render budget selection.
//!
//! A [`PerformanceConfig`] is chosen once per dataset from its size. It caps
//! how many nodes and edges reach the layout solver, how long the solver may
//! run, how aggressively detail is hidden at low zoom, and how often frames
//! are drawn.

use serde::Deserialize;

/// Node count above which the circuit-breaker tier is forced.
pub const CIRCUIT_BREAKER_NODES: usize = 2000;
/// Edge count above which the circuit-breaker tier is forced.
pub const CIRCUIT_BREAKER_EDGES: usize = 4000;

/// Budget tier, from cheapest input to the forced hard-ceiling tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerformanceTier {
	/// Up to 100 nodes / 200 edges.
	Small,
	/// Up to 300 nodes / 600 edges.
	Medium,
	/// Up to 800 nodes / 1600 edges.
	Large,
	/// Up to 2000 nodes / 4000 edges.
	XLarge,
	/// Anything above the absolute ceiling.
	CircuitBreaker,
}

impl PerformanceTier {
	/// Inclusive `(nodes, edges)` input limits of each normal tier.
	const LIMITS: [(PerformanceTier, usize, usize); 4] = [
		(PerformanceTier::Small, 100, 200),
		(PerformanceTier::Medium, 300, 600),
		(PerformanceTier::Large, 800, 1600),
		(PerformanceTier::XLarge, CIRCUIT_BREAKER_NODES, CIRCUIT_BREAKER_EDGES),
	];

	fn for_nodes(node_count: usize) -> Self {
		Self::LIMITS
			.iter()
			.find(|(_, nodes, _)| node_count <= *nodes)
			.map(|(tier, _, _)| *tier)
			.unwrap_or(PerformanceTier::CircuitBreaker)
	}

	fn for_edges(edge_count: usize) -> Self {
		Self::LIMITS
			.iter()
			.find(|(_, _, edges)| edge_count <= *edges)
			.map(|(tier, _, _)| *tier)
			.unwrap_or(PerformanceTier::CircuitBreaker)
	}

	/// Short lowercase name used in logs.
	pub fn name(self) -> &'static str {
		match self {
			PerformanceTier::Small => "small",
			PerformanceTier::Medium => "medium",
			PerformanceTier::Large => "large",
			PerformanceTier::XLarge => "x-large",
			PerformanceTier::CircuitBreaker => "circuit-breaker",
		}
	}

	/// The budget this tier imposes.
	pub fn config(self) -> PerformanceConfig {
		match self {
			PerformanceTier::Small => PerformanceConfig {
				tier: self,
				max_nodes: 100,
				max_edges: 200,
				node_zoom_threshold: 0.3,
				edge_zoom_threshold: 0.3,
				label_zoom_threshold: 0.5,
				detail_zoom_threshold: 1.2,
				max_iterations: 300,
				min_node_size_to_show: 0.0,
				min_edge_value_to_show: 0.0,
				target_fps: 60,
				viewport_culling: false,
			},
			PerformanceTier::Medium => PerformanceConfig {
				tier: self,
				max_nodes: 300,
				max_edges: 600,
				node_zoom_threshold: 0.5,
				edge_zoom_threshold: 0.5,
				label_zoom_threshold: 0.8,
				detail_zoom_threshold: 1.5,
				max_iterations: 200,
				min_node_size_to_show: 2.0,
				min_edge_value_to_show: 10.0,
				target_fps: 60,
				viewport_culling: true,
			},
			PerformanceTier::Large => PerformanceConfig {
				tier: self,
				max_nodes: 250,
				max_edges: 500,
				node_zoom_threshold: 0.7,
				edge_zoom_threshold: 0.8,
				label_zoom_threshold: 1.0,
				detail_zoom_threshold: 1.8,
				max_iterations: 150,
				min_node_size_to_show: 5.0,
				min_edge_value_to_show: 100.0,
				target_fps: 45,
				viewport_culling: true,
			},
			PerformanceTier::XLarge => PerformanceConfig {
				tier: self,
				max_nodes: 200,
				max_edges: 400,
				node_zoom_threshold: 0.9,
				edge_zoom_threshold: 1.0,
				label_zoom_threshold: 1.3,
				detail_zoom_threshold: 2.2,
				max_iterations: 100,
				min_node_size_to_show: 10.0,
				min_edge_value_to_show: 500.0,
				target_fps: 30,
				viewport_culling: true,
			},
			PerformanceTier::CircuitBreaker => PerformanceConfig {
				tier: self,
				max_nodes: 150,
				max_edges: 300,
				node_zoom_threshold: 1.0,
				edge_zoom_threshold: 1.2,
				label_zoom_threshold: 1.5,
				detail_zoom_threshold: 2.5,
				max_iterations: 50,
				min_node_size_to_show: 20.0,
				min_edge_value_to_show: 1000.0,
				target_fps: 30,
				viewport_culling: true,
			},
		}
	}
}

/// Budget descriptor for one render session.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceConfig {
	/// Tier this budget came from.
	pub tier: PerformanceTier,
	/// Maximum nodes handed to the solver.
	pub max_nodes: usize,
	/// Maximum edges handed to the solver.
	pub max_edges: usize,
	/// Zoom at and above which nodes are never size-filtered.
	pub node_zoom_threshold: f64,
	/// Zoom at and above which edges are never value-filtered.
	pub edge_zoom_threshold: f64,
	/// Zoom below which node labels are hidden.
	pub label_zoom_threshold: f64,
	/// Zoom below which detail annotations are hidden.
	pub detail_zoom_threshold: f64,
	/// Solver iteration cap per run.
	pub max_iterations: u32,
	/// Minimum node activity rendered below the node zoom threshold.
	pub min_node_size_to_show: f64,
	/// Minimum edge value rendered below the edge zoom threshold.
	pub min_edge_value_to_show: f64,
	/// Redraw rate target.
	pub target_fps: u32,
	/// Whether elements outside the viewport are culled.
	pub viewport_culling: bool,
}

impl Default for PerformanceConfig {
	fn default() -> Self {
		PerformanceTier::Small.config()
	}
}

/// Picks the budget for a dataset of the given size.
///
/// The tier is the heavier of the node-based and edge-based tiers, so a small
/// but densely connected graph still gets an edge budget it can afford.
pub fn select(node_count: usize, edge_count: usize) -> PerformanceConfig {
	if node_count > CIRCUIT_BREAKER_NODES || edge_count > CIRCUIT_BREAKER_EDGES {
		return PerformanceTier::CircuitBreaker.config();
	}
	let tier = PerformanceTier::for_nodes(node_count).max(PerformanceTier::for_edges(edge_count));
	tier.config()
}

/// Caller-supplied overrides. Every field is optional; omitted fields keep
/// the auto-selected value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[allow(missing_docs)]
pub struct PerformanceOverride {
	pub tier: Option<PerformanceTier>,
	pub max_nodes: Option<usize>,
	pub max_edges: Option<usize>,
	pub node_zoom_threshold: Option<f64>,
	pub edge_zoom_threshold: Option<f64>,
	pub label_zoom_threshold: Option<f64>,
	pub detail_zoom_threshold: Option<f64>,
	pub max_iterations: Option<u32>,
	pub min_node_size_to_show: Option<f64>,
	pub min_edge_value_to_show: Option<f64>,
	pub target_fps: Option<u32>,
	pub viewport_culling: Option<bool>,
}

impl PerformanceOverride {
	/// Layers this override on top of `base`. A forced `tier` replaces the
	/// whole base before the individual fields are applied.
	pub fn apply(&self, base: PerformanceConfig) -> PerformanceConfig {
		let base = self.tier.map(PerformanceTier::config).unwrap_or(base);
		PerformanceConfig {
			tier: base.tier,
			max_nodes: self.max_nodes.unwrap_or(base.max_nodes),
			max_edges: self.max_edges.unwrap_or(base.max_edges),
			node_zoom_threshold: self.node_zoom_threshold.unwrap_or(base.node_zoom_threshold),
			edge_zoom_threshold: self.edge_zoom_threshold.unwrap_or(base.edge_zoom_threshold),
			label_zoom_threshold: self.label_zoom_threshold.unwrap_or(base.label_zoom_threshold),
			detail_zoom_threshold: self
				.detail_zoom_threshold
				.unwrap_or(base.detail_zoom_threshold),
			max_iterations: self.max_iterations.unwrap_or(base.max_iterations),
			min_node_size_to_show: self
				.min_node_size_to_show
				.unwrap_or(base.min_node_size_to_show),
			min_edge_value_to_show: self
				.min_edge_value_to_show
				.unwrap_or(base.min_edge_value_to_show),
			target_fps: self.target_fps.unwrap_or(base.target_fps).max(1),
			viewport_culling: self.viewport_culling.unwrap_or(base.viewport_culling),
		}
	}
}

/// Auto-selects a budget and applies the optional caller override.
pub fn resolve(
	node_count: usize,
	edge_count: usize,
	override_config: Option<&PerformanceOverride>,
) -> PerformanceConfig {
	let base = select(node_count, edge_count);
	match override_config {
		Some(o) => o.apply(base),
		None => base,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SIZES: [usize; 7] = [0, 1, 30, 150, 400, 1000, 3000];

	#[test]
	fn select_is_total_and_idempotent() {
		for &n in &SIZES {
			for &e in &SIZES {
				let first = select(n, e);
				assert_eq!(first, select(n, e));
				assert!(first.max_nodes <= 300, "{n}/{e} -> {}", first.max_nodes);
				assert!(first.max_edges <= 600);
				assert!(first.max_iterations > 0);
				assert!(first.target_fps > 0);
			}
		}
	}

	#[test]
	fn tiers_follow_the_larger_dimension() {
		assert_eq!(select(0, 0).tier, PerformanceTier::Small);
		assert_eq!(select(30, 30).tier, PerformanceTier::Small);
		assert_eq!(select(150, 30).tier, PerformanceTier::Medium);
		assert_eq!(select(30, 400).tier, PerformanceTier::Medium);
		assert_eq!(select(400, 30).tier, PerformanceTier::Large);
		assert_eq!(select(1000, 30).tier, PerformanceTier::XLarge);
		assert_eq!(select(30, 3000).tier, PerformanceTier::XLarge);
	}

	#[test]
	fn circuit_breaker_caps_arbitrarily_large_inputs() {
		for (n, e) in [(3000, 0), (0, 4001), (2001, 10), (1_000_000, 5_000_000)] {
			let config = select(n, e);
			assert_eq!(config.tier, PerformanceTier::CircuitBreaker);
			assert!(config.max_nodes <= 150);
			assert!(config.max_edges <= 300);
		}
		assert_eq!(select(2000, 4000).tier, PerformanceTier::XLarge);
	}

	#[test]
	fn budgets_shrink_as_tiers_grow() {
		let tiers = [
			PerformanceTier::Medium,
			PerformanceTier::Large,
			PerformanceTier::XLarge,
			PerformanceTier::CircuitBreaker,
		];
		for pair in tiers.windows(2) {
			let (a, b) = (pair[0].config(), pair[1].config());
			assert!(b.max_nodes <= a.max_nodes);
			assert!(b.max_iterations <= a.max_iterations);
			assert!(b.label_zoom_threshold >= a.label_zoom_threshold);
		}
	}

	#[test]
	fn scenario_large_tier() {
		let config = select(500, 1000);
		assert_eq!(config.tier, PerformanceTier::Large);
		assert_eq!(config.tier.name(), "large");
	}

	#[test]
	fn label_thresholds_are_ordered_within_each_tier() {
		for &n in &SIZES {
			let config = select(n, n);
			assert!(config.label_zoom_threshold >= config.node_zoom_threshold);
			assert!(config.detail_zoom_threshold > config.label_zoom_threshold);
		}
	}

	#[test]
	fn override_keeps_omitted_fields() {
		let o: PerformanceOverride =
			serde_json::from_str(r#"{ "maxNodes": 42, "viewportCulling": false }"#).unwrap();
		let config = resolve(500, 1000, Some(&o));
		let base = select(500, 1000);

		assert_eq!(config.max_nodes, 42);
		assert!(!config.viewport_culling);
		assert_eq!(config.max_edges, base.max_edges);
		assert_eq!(config.tier, PerformanceTier::Large);
		assert_eq!(config.max_iterations, base.max_iterations);
	}

	#[test]
	fn override_can_force_a_tier() {
		let o: PerformanceOverride =
			serde_json::from_str(r#"{ "tier": "x-large", "targetFps": 24 }"#).unwrap();
		let config = resolve(10, 10, Some(&o));
		assert_eq!(config.tier, PerformanceTier::XLarge);
		assert_eq!(config.max_nodes, PerformanceTier::XLarge.config().max_nodes);
		assert_eq!(config.target_fps, 24);
	}

	#[test]
	fn override_rejects_unknown_options() {
		let parsed = serde_json::from_str::<PerformanceOverride>(r#"{ "maxNode": 10 }"#);
		assert!(parsed.is_err());
	}

	#[test]
	fn override_never_yields_zero_fps() {
		let o = PerformanceOverride {
			target_fps: Some(0),
			..Default::default()
		};
		assert_eq!(o.apply(PerformanceConfig::default()).target_fps, 1);
	}
}
