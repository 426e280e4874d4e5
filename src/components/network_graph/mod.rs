//! Budgeted, interactive network graph.
//!
//! Renders a node-link graph of entities and weighted relationships on an
//! HTML canvas under a frame-time budget:
//! - Tiered performance budgets chosen from the dataset size
//! - Downsampling to the most active nodes and highest-scoring edges
//! - Force-directed layout that cools down and stops on its own
//! - Level-of-detail and viewport culling per frame
//! - Drag, pan, zoom, hover and click-to-pin arbitrated by one gesture state
//!   machine
//!
//! Everything except [`NetworkGraphCanvas`] and the canvas renderer is plain
//! Rust and runs outside the browser.
//!
//! # Example
//!
//! ```ignore
//! use network_graph::{NetworkData, NetworkGraphCanvas};
//!
//! let data: NetworkData = serde_json::from_str(json)?;
//!
//! view! {
//!     <NetworkGraphCanvas
//!         data=data.into()
//!         fullscreen=true
//!         on_node_selected=move |node| log::info!("selected {node:?}")
//!     />
//! }
//! ```

mod component;
pub mod frame;
pub mod gesture;
pub mod lod;
pub mod optimize;
pub mod perf;
mod render;
pub mod scale;
pub mod simulation;
pub mod state;
pub mod theme;
mod types;

pub use component::NetworkGraphCanvas;
pub use perf::{PerformanceConfig, PerformanceOverride, PerformanceTier};
pub use state::{GraphNotification, NetworkGraphState};
pub use theme::Theme;
pub use types::{NetworkData, NetworkEdge, NetworkNode};
