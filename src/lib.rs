//! network-graph: Budgeted, interactive network graph visualization.
//!
//! This crate provides a WASM-based graph component that fits arbitrarily
//! large entity/relationship datasets into a render budget, lays them out with
//! a force simulation and keeps pan, zoom, drag and hover responsive.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::network_graph::{
	GraphNotification, NetworkData, NetworkEdge, NetworkGraphCanvas, NetworkGraphState,
	NetworkNode, PerformanceConfig, PerformanceOverride, PerformanceTier, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("network-graph: logging initialized");
}

/// Text of the `<script>` element with the given id, if present.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Parses embedded JSON, logging and discarding malformed input.
fn parse_embedded<T: DeserializeOwned>(id: &str, json_text: &str) -> Option<T> {
	match serde_json::from_str::<T>(json_text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("network-graph: ignoring malformed #{}: {}", id, e);
			None
		}
	}
}

/// Load the dataset from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], edges: [...] }
fn load_graph_data() -> Option<NetworkData> {
	let data: NetworkData = parse_embedded("graph-data", &script_text("graph-data")?)?;
	info!(
		"network-graph: loaded {} nodes, {} edges",
		data.node_count(),
		data.edge_count()
	);
	Some(data)
}

/// Load an optional performance override from id="graph-config".
fn load_performance_override() -> Option<PerformanceOverride> {
	parse_embedded("graph-config", &script_text("graph-config")?)
}

/// Main application component.
/// Loads the dataset from the DOM and renders the network visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());
	let performance = load_performance_override();

	let (selected, set_selected) = signal(None::<NetworkNode>);
	let (hovered_edge, set_hovered_edge) = signal(None::<NetworkEdge>);

	let status = move || {
		if let Some(node) = selected.get() {
			format!("{} ({}, activity {})", node.display_label(), node.category, node.activity)
		} else if let Some(edge) = hovered_edge.get() {
			format!(
				"{} \u{2192} {}: {} x{}, {:.0}% success",
				edge.source,
				edge.target,
				edge.value,
				edge.count,
				edge.clamped_success_rate() * 100.0
			)
		} else {
			"Drag nodes to reposition. Click a node to pin it. Scroll to zoom. Drag background to pan."
				.to_string()
		}
	};

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Network Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<NetworkGraphCanvas
				data=graph_signal
				performance=performance.unwrap_or_default()
				fullscreen=true
				on_node_selected=move |node| set_selected.set(node)
				on_edge_hovered=move |edge| set_hovered_edge.set(edge)
			/>
			<div class="graph-overlay">
				<h1>"Network"</h1>
				<p class="subtitle">{status}</p>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn malformed_override_is_ignored() {
		let parsed: Option<PerformanceOverride> =
			parse_embedded("graph-config", r#"{"maxNodes": 50, "warpDrive": true}"#);
		assert_eq!(parsed, None);

		let parsed: Option<PerformanceOverride> =
			parse_embedded("graph-config", r#"{"maxNodes": 50}"#);
		assert_eq!(parsed.and_then(|o| o.max_nodes), Some(50));
	}

	#[test]
	fn dataset_defaults_fill_missing_fields() {
		let data: Option<NetworkData> = parse_embedded(
			"graph-data",
			r#"{"nodes": [{"id": "a"}, {"id": "b"}], "edges": [{"source": "a", "target": "b"}]}"#,
		);
		let data = data.expect("valid dataset");
		assert_eq!(data.node_count(), 2);
		assert_eq!(data.edges[0].count, 1);
		assert_eq!(data.nodes[0].category, "default");
	}
}
