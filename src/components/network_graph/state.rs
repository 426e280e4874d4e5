//! Render loop state.
//!
//! [`NetworkGraphState`] owns one mounted graph session: the selected
//! performance budget, the working set, the layout solver and the gesture
//! coordinator. The platform layer feeds it pointer events and frame
//! timestamps; it answers with [`Frame`]s of draw commands and a queue of
//! [`GraphNotification`]s for the outbound callbacks.

use log::{debug, info, warn};

use super::frame::FrameLimiter;
use super::gesture::{GestureCoordinator, GestureEvent, HoverTarget, ViewportTransform};
use super::lod::{LodEntity, ViewportRect, edge_shown, node_shown, visible};
use super::optimize::{OptimizationMetadata, WorkingSet, optimize};
use super::perf::{PerformanceConfig, PerformanceOverride, resolve};
use super::scale::{ScaleConfig, ScaledValues};
use super::simulation::{EdgeBucket, LayoutSolver, SolverParams, SolverPhase};
use super::theme::{Color, Theme};
use super::types::{NetworkData, NetworkEdge, NetworkNode};

/// Re-initializations allowed before the session stops accepting new data.
pub const MAX_REINITS: u32 = 5;
/// Solver ticks per second, independent of the redraw rate.
pub const SOLVER_TICK_FPS: u32 = 30;
/// Pointer travel, in screen pixels, that turns a press on a node into a drag.
pub const DRAG_SLOP_PX: f64 = 4.0;

/// Zoom step applied per wheel notch.
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// A node to draw, in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDraw {
	/// Index in the working set.
	pub index: usize,
	/// Center x.
	pub x: f64,
	/// Center y.
	pub y: f64,
	/// Drawn radius.
	pub radius: f64,
	/// Fill color from the node's category.
	pub color: Color,
	/// Whether the node is pinned.
	pub pinned: bool,
	/// Whether the node is hovered or dragged.
	pub focused: bool,
}

/// An edge to draw, in world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeDraw {
	/// Index in the working set.
	pub index: usize,
	/// Source x.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
	/// Stroke width.
	pub width: f64,
	/// Color bucket.
	pub bucket: EdgeBucket,
	/// Whether the pointer is over this edge.
	pub hovered: bool,
}

/// Text next to a node.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelDraw {
	/// Baseline start x.
	pub x: f64,
	/// Baseline y.
	pub y: f64,
	/// Primary label.
	pub text: String,
	/// Secondary annotation below the label, when zoomed in far enough.
	pub detail: Option<String>,
}

/// Everything needed to paint one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
	/// Viewport transform to apply before drawing world-space commands.
	pub transform: ViewportTransform,
	/// Zoom-dependent sizes for this frame.
	pub scale: ScaledValues,
	/// Edges, drawn first.
	pub edges: Vec<EdgeDraw>,
	/// Nodes, drawn over edges.
	pub nodes: Vec<NodeDraw>,
	/// Labels, drawn last.
	pub labels: Vec<LabelDraw>,
	/// Solver phase after this frame's tick.
	pub phase: SolverPhase,
}

/// Outbound notification for the host UI.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphNotification {
	/// The hovered node changed.
	NodeSelected(Option<NetworkNode>),
	/// The hovered edge changed.
	EdgeHovered(Option<NetworkEdge>),
}

/// Per-node values that never change during a solver run.
#[derive(Clone, Debug)]
struct NodeDecor {
	color: Color,
	label: String,
	detail: Option<String>,
}

/// What the primary pointer button is doing.
#[derive(Clone, Debug, PartialEq)]
enum Press {
	Idle,
	/// Pressed on a node, not yet past the drag slop.
	Node {
		index: usize,
		id: String,
		start: (f64, f64),
	},
	Dragging {
		index: usize,
	},
	Pan {
		start: (f64, f64),
		origin: ViewportTransform,
	},
}

/// One mounted graph session.
pub struct NetworkGraphState {
	config: PerformanceConfig,
	perf_override: Option<PerformanceOverride>,
	working: WorkingSet,
	solver: LayoutSolver,
	decor: Vec<NodeDecor>,
	gestures: GestureCoordinator,
	frames: FrameLimiter,
	ticks: FrameLimiter,
	scale: ScaleConfig,
	theme: Theme,
	press: Press,
	reinits: u32,
	notifications: Vec<GraphNotification>,
	width: f64,
	height: f64,
}

impl NetworkGraphState {
	/// Starts a session on `data` for a `width` x `height` surface.
	pub fn new(
		data: &NetworkData,
		width: f64,
		height: f64,
		perf_override: Option<PerformanceOverride>,
		theme: Theme,
	) -> Self {
		let config = resolve(data.node_count(), data.edge_count(), perf_override.as_ref());
		let working = optimize(data, &config);
		let solver = build_solver(&working, &config, width, height);
		let decor = decorate(&working, &theme);
		info!(
			"network-graph: {} tier, {} nodes / {} edges in view",
			config.tier.name(),
			working.nodes.len(),
			working.edges.len()
		);

		Self {
			frames: FrameLimiter::new(config.target_fps),
			ticks: FrameLimiter::new(SOLVER_TICK_FPS),
			config,
			perf_override,
			working,
			solver,
			decor,
			gestures: GestureCoordinator::default(),
			scale: ScaleConfig::default(),
			theme,
			press: Press::Idle,
			reinits: 0,
			notifications: Vec::new(),
			width,
			height,
		}
	}

	/// Active budget.
	pub fn config(&self) -> &PerformanceConfig {
		&self.config
	}

	/// What the optimizer did to the current dataset.
	pub fn metadata(&self) -> &OptimizationMetadata {
		&self.working.metadata
	}

	/// Current layout.
	pub fn layout(&self) -> &LayoutSolver {
		&self.solver
	}

	/// Current viewport transform.
	pub fn transform(&self) -> &ViewportTransform {
		self.gestures.transform()
	}

	/// Whether a drag is in progress or settling.
	pub fn is_busy(&self) -> bool {
		self.gestures.is_busy()
	}

	/// Visual theme.
	pub fn theme(&self) -> &Theme {
		&self.theme
	}

	/// Surface width in pixels.
	pub fn width(&self) -> f64 {
		self.width
	}

	/// Surface height in pixels.
	pub fn height(&self) -> f64 {
		self.height
	}

	/// Replaces the dataset wholesale and re-selects the budget.
	///
	/// Returns `false` when the re-initialization limit is reached.
	pub fn load_dataset(&mut self, data: &NetworkData, now_ms: f64) -> bool {
		if self.breaker_tripped() {
			return false;
		}
		self.config = resolve(
			data.node_count(),
			data.edge_count(),
			self.perf_override.as_ref(),
		);
		self.frames = FrameLimiter::new(self.config.target_fps);
		self.reinitialize(data, now_ms)
	}

	/// Swaps in a refinement of the current dataset (e.g. a filter change),
	/// keeping the selected budget.
	///
	/// Returns `false` when the re-initialization limit is reached.
	pub fn refine_dataset(&mut self, data: &NetworkData, now_ms: f64) -> bool {
		if self.breaker_tripped() {
			return false;
		}
		self.reinitialize(data, now_ms)
	}

	fn breaker_tripped(&self) -> bool {
		if self.reinits >= MAX_REINITS {
			warn!(
				"network-graph: dropped dataset update after {} consecutive re-initializations",
				self.reinits
			);
			return true;
		}
		false
	}

	fn reinitialize(&mut self, data: &NetworkData, now_ms: f64) -> bool {
		self.solver.stop();
		if matches!(self.press, Press::Dragging { .. }) {
			self.gestures.on_drag_end(now_ms);
		}
		self.press = Press::Idle;
		self.gestures.on_hover(None, now_ms);
		self.pump_gesture_events();

		self.working = optimize(data, &self.config);
		self.solver = build_solver(&self.working, &self.config, self.width, self.height);
		self.decor = decorate(&self.working, &self.theme);
		// Only layouts that run count toward the breaker.
		self.reinits = if self.solver.is_running() {
			self.reinits + 1
		} else {
			0
		};
		info!(
			"network-graph: re-initialized ({}), {} nodes / {} edges in view",
			self.reinits,
			self.working.nodes.len(),
			self.working.edges.len()
		);
		true
	}

	/// Surface size changed.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Primary button pressed at screen position `(sx, sy)`.
	pub fn pointer_down(&mut self, sx: f64, sy: f64, now_ms: f64) {
		self.gestures.poll(now_ms);
		let scaled = self.scaled();
		let (wx, wy) = self.transform().screen_to_world(sx, sy);

		self.press = match self.pick_node(wx, wy, &scaled) {
			Some(index) => Press::Node {
				index,
				id: self.solver.nodes()[index].id.clone(),
				start: (sx, sy),
			},
			None if self.gestures.accepts_viewport_gesture() => Press::Pan {
				start: (sx, sy),
				origin: *self.transform(),
			},
			None => Press::Idle,
		};
	}

	/// Pointer moved to `(sx, sy)`.
	pub fn pointer_move(&mut self, sx: f64, sy: f64, now_ms: f64) {
		let (wx, wy) = self.transform().screen_to_world(sx, sy);

		match self.press.clone() {
			Press::Idle => {
				let scaled = self.scaled();
				let target = self.hover_target(wx, wy, &scaled);
				self.gestures.on_hover(target, now_ms);
			}
			Press::Node { index, id, start } => {
				let (dx, dy) = (sx - start.0, sy - start.1);
				if (dx * dx + dy * dy).sqrt() > DRAG_SLOP_PX {
					self.gestures.on_drag_start(&id, now_ms);
					self.solver.begin_drag(index);
					self.solver.drag_to(wx, wy);
					self.press = Press::Dragging { index };
				}
			}
			Press::Dragging { .. } => {
				if !self.solver.is_running() {
					self.solver.restart();
				}
				self.solver.drag_to(wx, wy);
			}
			Press::Pan { start, origin } => {
				let panned = origin.panned(sx - start.0, sy - start.1);
				if !self.gestures.on_zoom(panned, now_ms) {
					self.press = Press::Idle;
				}
			}
		}
		self.pump_gesture_events();
	}

	/// Primary button released.
	pub fn pointer_up(&mut self, now_ms: f64) {
		match std::mem::replace(&mut self.press, Press::Idle) {
			Press::Node { id, .. } => self.gestures.on_click(&id, now_ms),
			Press::Dragging { .. } => {
				self.solver.end_drag();
				self.gestures.on_drag_end(now_ms);
			}
			Press::Idle | Press::Pan { .. } => {}
		}
		self.pump_gesture_events();
	}

	/// Pointer left the surface. Ends a drag without producing a click.
	pub fn pointer_leave(&mut self, now_ms: f64) {
		if let Press::Dragging { .. } = std::mem::replace(&mut self.press, Press::Idle) {
			self.solver.end_drag();
			self.gestures.on_drag_end(now_ms);
		}
		self.gestures.on_hover(None, now_ms);
		self.pump_gesture_events();
	}

	/// Wheel at `(sx, sy)`; positive `delta_y` zooms out. Returns whether the
	/// zoom was applied.
	pub fn wheel(&mut self, sx: f64, sy: f64, delta_y: f64, now_ms: f64) -> bool {
		let factor = if delta_y > 0.0 {
			WHEEL_ZOOM_OUT
		} else {
			WHEEL_ZOOM_IN
		};
		let zoomed = self.transform().zoomed_at(sx, sy, factor);
		let applied = self.gestures.on_zoom(zoomed, now_ms);
		self.pump_gesture_events();
		applied
	}

	/// CSS cursor for the current interaction.
	pub fn cursor(&self) -> &'static str {
		match (&self.press, self.gestures.hovered()) {
			(Press::Dragging { .. } | Press::Pan { .. }, _) => "grabbing",
			(_, Some(HoverTarget::Node(_))) => "pointer",
			_ => "grab",
		}
	}

	/// Notifications produced since the last call.
	pub fn take_notifications(&mut self) -> Vec<GraphNotification> {
		std::mem::take(&mut self.notifications)
	}

	/// Advances timers and, if the frame limiter admits `now_ms`, the solver,
	/// then returns the draw commands for this frame.
	pub fn frame(&mut self, now_ms: f64) -> Option<Frame> {
		self.gestures.poll(now_ms);
		self.pump_gesture_events();

		if !self.frames.admit(now_ms) {
			return None;
		}

		match self.solver.phase() {
			SolverPhase::Running if self.ticks.admit(now_ms) => {
				let phase = self.solver.tick();
				if phase != SolverPhase::Running && self.reinits > 0 {
					debug!("network-graph: layout settled, re-initialization budget restored");
					self.reinits = 0;
				}
			}
			SolverPhase::Stabilized => {
				self.solver.tick();
			}
			_ => {}
		}

		Some(self.build_frame())
	}

	fn scaled(&self) -> ScaledValues {
		ScaledValues::new(&self.scale, self.transform().k)
	}

	fn build_frame(&self) -> Frame {
		let transform = *self.transform();
		let scale = self.scaled();
		let zoom = transform.k;
		let viewport = ViewportRect::visible_area(&transform, self.width, self.height);
		let nodes = self.solver.nodes();

		let hovered_edge = match self.gestures.hovered() {
			Some(HoverTarget::Edge(index)) => Some(*index),
			_ => None,
		};
		let focused_node = self.solver.dragged().or_else(|| match self.gestures.hovered() {
			Some(HoverTarget::Node(id)) => self.solver.index_of(id),
			_ => None,
		});

		let edges = self
			.solver
			.edges()
			.iter()
			.enumerate()
			.filter_map(|(index, edge)| {
				let (s, t) = (&nodes[edge.source], &nodes[edge.target]);
				let entity = LodEntity::Edge {
					value: edge.value,
					x1: s.x,
					y1: s.y,
					x2: t.x,
					y2: t.y,
				};
				visible(&entity, zoom, &viewport, &self.config).then(|| EdgeDraw {
					index,
					x1: s.x,
					y1: s.y,
					x2: t.x,
					y2: t.y,
					width: scale.edge_width(edge.visual.stroke_width),
					bucket: edge.visual.bucket,
					hovered: hovered_edge == Some(index),
				})
			})
			.collect();

		let mut node_draws = Vec::with_capacity(nodes.len());
		let mut labels = Vec::new();
		for (index, node) in nodes.iter().enumerate() {
			let radius = scale.node_radius(node.radius);
			let entity = LodEntity::Node {
				activity: node.activity,
				x: node.x,
				y: node.y,
				radius,
			};
			if !visible(&entity, zoom, &viewport, &self.config) {
				continue;
			}
			let Some(decor) = self.decor.get(index) else {
				continue;
			};

			node_draws.push(NodeDraw {
				index,
				x: node.x,
				y: node.y,
				radius,
				color: decor.color,
				pinned: node.is_pinned(),
				focused: focused_node == Some(index),
			});

			let label = LodEntity::Label {
				activity: node.activity,
				x: node.x,
				y: node.y,
				radius,
			};
			if !visible(&label, zoom, &viewport, &self.config) {
				continue;
			}
			let detail = LodEntity::DetailLabel {
				activity: node.activity,
				x: node.x,
				y: node.y,
				radius,
			};
			labels.push(LabelDraw {
				x: node.x + radius + scale.label_gap,
				y: node.y + 3.0 / scale.k,
				text: decor.label.clone(),
				detail: decor
					.detail
					.clone()
					.filter(|_| visible(&detail, zoom, &viewport, &self.config)),
			});
		}

		Frame {
			transform,
			scale,
			edges,
			nodes: node_draws,
			labels,
			phase: self.solver.phase(),
		}
	}

	/// Topmost drawn node whose drawn disc, plus the hit slack, covers a world
	/// position.
	fn pick_node(&self, wx: f64, wy: f64, scale: &ScaledValues) -> Option<usize> {
		self.solver.node_at(wx, wy, |node| {
			node_shown(node.activity, scale.k, &self.config)
				.then(|| scale.node_radius(node.radius) + scale.hit_slack)
		})
	}

	fn hover_target(&self, wx: f64, wy: f64, scale: &ScaledValues) -> Option<HoverTarget> {
		if let Some(index) = self.pick_node(wx, wy, scale) {
			return Some(HoverTarget::Node(self.solver.nodes()[index].id.clone()));
		}

		self.solver
			.edge_at(wx, wy, scale.hit_slack, |edge| {
				edge_shown(edge.value, scale.k, &self.config)
			})
			.map(HoverTarget::Edge)
	}

	/// Applies coordinator events: pin toggles go to the solver, hover
	/// changes become notifications.
	fn pump_gesture_events(&mut self) {
		for event in self.gestures.drain_events() {
			match event {
				GestureEvent::PinToggled(id) => {
					let Some(index) = self.solver.index_of(&id) else {
						continue;
					};
					if let Some(pinned) = self.solver.toggle_pin(index) {
						debug!("network-graph: {} {}", id, if pinned { "pinned" } else { "released" });
					}
				}
				GestureEvent::NodeSelected(id) => {
					let node = id
						.and_then(|id| self.solver.index_of(&id))
						.and_then(|index| self.working.nodes.get(index))
						.cloned();
					self.notifications.push(GraphNotification::NodeSelected(node));
				}
				GestureEvent::EdgeHovered(index) => {
					let edge = index.and_then(|index| self.working.edges.get(index)).cloned();
					self.notifications.push(GraphNotification::EdgeHovered(edge));
				}
			}
		}
	}
}

fn build_solver(working: &WorkingSet, config: &PerformanceConfig, width: f64, height: f64) -> LayoutSolver {
	let params = SolverParams::new(working.nodes.len(), config.max_iterations, width, height);
	LayoutSolver::new(working, params)
}

fn decorate(working: &WorkingSet, theme: &Theme) -> Vec<NodeDecor> {
	working
		.nodes
		.iter()
		.map(|node| NodeDecor {
			color: theme.palette.for_category(&node.category),
			label: node.display_label().to_string(),
			detail: detail_text(node.amount, success_rate(&node.id, &working.edges)),
		})
		.collect()
}

/// Count-weighted mean success rate of the edges touching `id`.
fn success_rate(id: &str, edges: &[NetworkEdge]) -> Option<f64> {
	let (weighted, total) = edges
		.iter()
		.filter(|edge| edge.source == id || edge.target == id)
		.fold((0.0, 0.0), |(weighted, total), edge| {
			let count = f64::from(edge.count);
			(weighted + edge.clamped_success_rate() * count, total + count)
		});
	(total > 0.0).then(|| weighted / total)
}

fn detail_text(amount: Option<f64>, success_rate: Option<f64>) -> Option<String> {
	let parts: Vec<String> = amount
		.filter(|amount| amount.is_finite())
		.map(format_amount)
		.into_iter()
		.chain(success_rate.map(|rate| format!("{:.0}% ok", rate * 100.0)))
		.collect();
	(!parts.is_empty()).then(|| parts.join(" / "))
}

/// Compact amount, e.g. `1.2k` or `3.4M`.
fn format_amount(amount: f64) -> String {
	let magnitude = amount.abs();
	if magnitude >= 1e9 {
		format!("{:.1}B", amount / 1e9)
	} else if magnitude >= 1e6 {
		format!("{:.1}M", amount / 1e6)
	} else if magnitude >= 1e3 {
		format!("{:.1}k", amount / 1e3)
	} else {
		format!("{amount:.0}")
	}
}
