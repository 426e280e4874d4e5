//! Downsampling of an arbitrary dataset into the render budget.
//!
//! Nodes are ranked first and edges second, so the most active entities are
//! always kept and edges only compete among the survivors.

use std::collections::HashSet;

use log::debug;

use super::perf::PerformanceConfig;
use super::types::{NetworkData, NetworkEdge, NetworkNode};

/// Node and edge counts of a dataset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DatasetSize {
	/// Node count.
	pub nodes: usize,
	/// Edge count.
	pub edges: usize,
}

/// Describes what the optimizer did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OptimizationMetadata {
	/// Whether the dataset was downsampled to fit the budget.
	pub is_optimized: bool,
	/// Size of the raw input.
	pub original_size: DatasetSize,
	/// Size of the returned working set.
	pub optimized_size: DatasetSize,
}

/// The bounded subset of the dataset handed to the solver.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkingSet {
	/// Surviving nodes, most active first when downsampled.
	pub nodes: Vec<NetworkNode>,
	/// Surviving edges; both endpoints are always in `nodes`.
	pub edges: Vec<NetworkEdge>,
	/// Bookkeeping about the pass.
	pub metadata: OptimizationMetadata,
}

/// Fits `data` into the budget described by `config`.
///
/// Duplicate node ids keep their first occurrence and edges that reference
/// unknown nodes are dropped; both are expected while upstream data is being
/// refreshed and never fail the pass.
pub fn optimize(data: &NetworkData, config: &PerformanceConfig) -> WorkingSet {
	let original_size = DatasetSize {
		nodes: data.node_count(),
		edges: data.edge_count(),
	};

	let mut seen = HashSet::with_capacity(data.nodes.len());
	let nodes: Vec<&NetworkNode> = data
		.nodes
		.iter()
		.filter(|node| seen.insert(node.id.as_str()))
		.collect();
	let edges: Vec<&NetworkEdge> = data
		.edges
		.iter()
		.filter(|edge| seen.contains(edge.source.as_str()) && seen.contains(edge.target.as_str()))
		.collect();

	if nodes.len() <= config.max_nodes && edges.len() <= config.max_edges {
		let nodes: Vec<NetworkNode> = nodes.into_iter().cloned().collect();
		let edges: Vec<NetworkEdge> = edges.into_iter().cloned().collect();
		let optimized_size = DatasetSize {
			nodes: nodes.len(),
			edges: edges.len(),
		};
		return WorkingSet {
			nodes,
			edges,
			metadata: OptimizationMetadata {
				is_optimized: false,
				original_size,
				optimized_size,
			},
		};
	}

	let kept_nodes = top_nodes(nodes, config.max_nodes);
	let kept_ids: HashSet<&str> = kept_nodes.iter().map(|node| node.id.as_str()).collect();
	let surviving_edges: Vec<&NetworkEdge> = edges
		.into_iter()
		.filter(|edge| {
			kept_ids.contains(edge.source.as_str()) && kept_ids.contains(edge.target.as_str())
		})
		.collect();
	let kept_edges = top_edges(surviving_edges, config.max_edges);

	let optimized_size = DatasetSize {
		nodes: kept_nodes.len(),
		edges: kept_edges.len(),
	};
	debug!(
		"network-graph: downsampled {}/{} -> {}/{} ({} tier)",
		original_size.nodes,
		original_size.edges,
		optimized_size.nodes,
		optimized_size.edges,
		config.tier.name()
	);

	WorkingSet {
		nodes: kept_nodes.into_iter().cloned().collect(),
		edges: kept_edges.into_iter().cloned().collect(),
		metadata: OptimizationMetadata {
			is_optimized: true,
			original_size,
			optimized_size,
		},
	}
}

/// Most active nodes first. `sort_by` is stable, so equal activity keeps
/// input order.
fn top_nodes(mut nodes: Vec<&NetworkNode>, limit: usize) -> Vec<&NetworkNode> {
	nodes.sort_by(|a, b| b.activity.total_cmp(&a.activity));
	nodes.truncate(limit);
	nodes
}

fn top_edges(mut edges: Vec<&NetworkEdge>, limit: usize) -> Vec<&NetworkEdge> {
	edges.sort_by(|a, b| b.score().total_cmp(&a.score()));
	edges.truncate(limit);
	edges
}

#[cfg(test)]
mod tests {
	use super::super::perf::{PerformanceTier, select};
	use super::*;

	fn node(id: impl Into<String>, activity: f64) -> NetworkNode {
		NetworkNode {
			id: id.into(),
			label: None,
			category: "default".into(),
			activity,
			amount: None,
		}
	}

	fn edge(source: impl Into<String>, target: impl Into<String>, value: f64, count: u32) -> NetworkEdge {
		NetworkEdge {
			source: source.into(),
			target: target.into(),
			value,
			count,
			success_rate: 1.0,
		}
	}

	/// Deterministic pseudo-random dataset with a spread of activities.
	fn synthetic(node_count: usize, edge_count: usize) -> NetworkData {
		let nodes = (0..node_count)
			.map(|i| node(format!("n{i}"), ((i * 7919) % 97) as f64))
			.collect();
		let edges = (0..edge_count)
			.map(|i| {
				let s = (i * 31) % node_count.max(1);
				let t = (i * 17 + 1) % node_count.max(1);
				edge(format!("n{s}"), format!("n{t}"), (i % 50) as f64 * 10.0, (i % 7) as u32 + 1)
			})
			.collect();
		NetworkData { nodes, edges }
	}

	fn assert_no_dangling(set: &WorkingSet) {
		let ids: HashSet<&str> = set.nodes.iter().map(|n| n.id.as_str()).collect();
		for e in &set.edges {
			assert!(ids.contains(e.source.as_str()), "dangling source {}", e.source);
			assert!(ids.contains(e.target.as_str()), "dangling target {}", e.target);
		}
	}

	#[test]
	fn within_budget_is_returned_unchanged() {
		let data = synthetic(40, 80);
		let config = select(40, 80);
		let set = optimize(&data, &config);

		assert!(!set.metadata.is_optimized);
		assert_eq!(set.nodes, data.nodes);
		assert_eq!(set.edges, data.edges);
		assert_eq!(set.metadata.original_size, set.metadata.optimized_size);
	}

	#[test]
	fn over_budget_keeps_exactly_max_nodes_without_dangling_edges() {
		for (n, e) in [(500, 1000), (900, 3000), (2500, 5000)] {
			let data = synthetic(n, e);
			let config = select(n, e);
			let set = optimize(&data, &config);

			assert!(set.metadata.is_optimized, "{n}/{e}");
			assert_eq!(set.nodes.len(), config.max_nodes.min(n));
			assert!(set.edges.len() <= config.max_edges);
			assert_no_dangling(&set);
		}
	}

	#[test]
	fn ranking_is_deterministic_and_stable() {
		let mut data = synthetic(300, 100);
		for n in data.nodes.iter_mut() {
			n.activity = 1.0;
		}
		let mut config = select(10, 10);
		config.max_nodes = 25;

		let first = optimize(&data, &config);
		let second = optimize(&data, &config);
		let ids = |set: &WorkingSet| set.nodes.iter().map(|n| n.id.clone()).collect::<Vec<_>>();

		assert_eq!(ids(&first), ids(&second));
		// All ties: the first 25 input nodes survive, in input order.
		let expected: Vec<String> = (0..25).map(|i| format!("n{i}")).collect();
		assert_eq!(ids(&first), expected);
	}

	#[test]
	fn keeps_most_active_nodes() {
		let data = NetworkData {
			nodes: vec![node("low", 1.0), node("high", 50.0), node("mid", 10.0)],
			edges: vec![edge("low", "high", 5.0, 1), edge("high", "mid", 5.0, 1)],
		};
		let mut config = select(3, 2);
		config.max_nodes = 2;

		let set = optimize(&data, &config);
		let ids: Vec<&str> = set.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["high", "mid"]);
		assert_eq!(set.edges, vec![edge("high", "mid", 5.0, 1)]);
	}

	#[test]
	fn edges_ranked_by_composite_score() {
		let data = NetworkData {
			nodes: vec![node("a", 3.0), node("b", 2.0), node("c", 1.0)],
			edges: vec![
				edge("a", "b", 0.0, 100),
				edge("a", "c", 1000.0, 1),
				edge("b", "c", 1000.0, 5),
			],
		};
		let mut config = select(3, 3);
		config.max_edges = 2;

		let set = optimize(&data, &config);
		assert!(set.metadata.is_optimized);
		assert_eq!(set.edges[0], edge("b", "c", 1000.0, 5));
		assert_eq!(set.edges[1], edge("a", "c", 1000.0, 1));
	}

	#[test]
	fn dangling_and_duplicate_entries_are_dropped() {
		let data = NetworkData {
			nodes: vec![node("a", 1.0), node("b", 1.0), node("a", 99.0)],
			edges: vec![edge("a", "b", 1.0, 1), edge("a", "ghost", 1.0, 1)],
		};
		let set = optimize(&data, &select(3, 2));

		assert_eq!(set.nodes.len(), 2);
		assert_eq!(set.nodes[0].activity, 1.0);
		assert_eq!(set.edges.len(), 1);
		assert_eq!(set.metadata.original_size, DatasetSize { nodes: 3, edges: 2 });
		assert_no_dangling(&set);
	}

	#[test]
	fn empty_dataset_is_a_valid_input() {
		let set = optimize(&NetworkData::default(), &select(0, 0));
		assert!(set.nodes.is_empty());
		assert!(set.edges.is_empty());
		assert!(!set.metadata.is_optimized);
	}

	#[test]
	fn scenario_500_by_1000() {
		let data = synthetic(500, 1000);
		let config = select(500, 1000);
		assert_eq!(config.tier, PerformanceTier::Large);

		let set = optimize(&data, &config);
		assert!(set.metadata.is_optimized);
		assert!(set.nodes.len() <= config.max_nodes);
		assert!(set.edges.len() <= config.max_edges);
		assert_eq!(set.metadata.original_size, DatasetSize { nodes: 500, edges: 1000 });
		assert_eq!(
			set.metadata.optimized_size,
			DatasetSize {
				nodes: set.nodes.len(),
				edges: set.edges.len()
			}
		);
	}
}
