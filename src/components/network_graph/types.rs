//! Network data structures for input to the network graph component.

use serde::Deserialize;

/// An entity in the network.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NetworkNode {
	/// Unique, stable identifier. Edges reference nodes by this id.
	pub id: String,
	/// Optional display label. Falls back to the id when absent.
	#[serde(default)]
	pub label: Option<String>,
	/// Category used for coloring and grouping.
	#[serde(default = "default_category")]
	pub category: String,
	/// Sum of inbound and outbound relationship counts.
	#[serde(default)]
	pub activity: f64,
	/// Optional monetary metric shown as a secondary annotation.
	#[serde(default)]
	pub amount: Option<f64>,
}

fn default_category() -> String {
	"default".to_string()
}

impl NetworkNode {
	/// Label to draw for this node.
	pub fn display_label(&self) -> &str {
		self.label.as_deref().unwrap_or(&self.id)
	}
}

/// A pre-aggregated relationship between two nodes.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEdge {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Total value carried by the relationship.
	#[serde(default)]
	pub value: f64,
	/// Number of underlying relationships.
	#[serde(default = "default_count")]
	pub count: u32,
	/// Fraction of successful relationships, in `[0, 1]`.
	#[serde(default = "default_success_rate")]
	pub success_rate: f64,
}

fn default_count() -> u32 {
	1
}

fn default_success_rate() -> f64 {
	1.0
}

impl NetworkEdge {
	/// Ranking score used when downsampling: `count * ln(value + 1)`.
	pub fn score(&self) -> f64 {
		f64::from(self.count) * (self.value.max(0.0) + 1.0).ln()
	}

	/// Success rate clamped into `[0, 1]`.
	pub fn clamped_success_rate(&self) -> f64 {
		if self.success_rate.is_nan() {
			return 0.0;
		}
		self.success_rate.clamp(0.0, 1.0)
	}
}

/// Complete network data: nodes and edges.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct NetworkData {
	/// All entities.
	pub nodes: Vec<NetworkNode>,
	/// All relationships.
	pub edges: Vec<NetworkEdge>,
}

impl NetworkData {
	/// Number of nodes in the dataset.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges in the dataset.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Returns `true` when there is nothing to render.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}
