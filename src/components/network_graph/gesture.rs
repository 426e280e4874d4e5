//! Gesture coordination.
//!
//! Drag, pan/zoom, hover and click all arrive on the same pointer stream and
//! can be misread as one another: releasing a drag looks like the start of a
//! pan, and a drag that ends on a node looks like a click. The
//! [`GestureCoordinator`] owns the only "is the user interacting" state and
//! every other part of the engine asks it via [`GestureCoordinator::is_busy`].
//!
//! Time is passed in explicitly as milliseconds so the settle and click
//! delays are driven by whatever clock the platform provides.

use log::debug;

/// Time a released drag keeps the coordinator busy, so the release cannot
/// start a viewport pan.
pub const DRAG_SETTLE_MS: f64 = 150.0;
/// Delay between a click and the pin toggle it requests.
pub const CLICK_CONFIRM_MS: f64 = 180.0;
/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;
/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Pan and zoom applied to the entire graph view.
///
/// A world point `(wx, wy)` is drawn at `(wx * k + x, wy * k + y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to `MIN_ZOOM..=MAX_ZOOM`).
	pub k: f64,
}

impl Default for ViewportTransform {
	fn default() -> Self {
		Self::identity()
	}
}

impl ViewportTransform {
	/// No pan, no zoom.
	pub fn identity() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}

	/// Converts a screen position to world coordinates.
	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	/// Converts a world position to screen coordinates.
	pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
		(wx * self.k + self.x, wy * self.k + self.y)
	}

	/// Zooms by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoomed_at(&self, sx: f64, sy: f64, factor: f64) -> Self {
		let k = (self.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = k / self.k;
		Self {
			x: sx - (sx - self.x) * ratio,
			y: sy - (sy - self.y) * ratio,
			k,
		}
	}

	/// Translates by a screen-space delta.
	pub fn panned(&self, dx: f64, dy: f64) -> Self {
		Self {
			x: self.x + dx,
			y: self.y + dy,
			k: self.k,
		}
	}
}

/// Interaction state.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureState {
	/// Nothing in progress.
	Idle,
	/// A node is being dragged.
	Dragging {
		/// Id of the dragged node.
		node_id: String,
	},
	/// A drag just ended; viewport gestures stay blocked until `settle_at`.
	ZoomPendingRelease {
		/// Time at which the coordinator returns to idle.
		settle_at: f64,
	},
}

/// Something under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum HoverTarget {
	/// A node, by id.
	Node(String),
	/// An edge, by index in the working set.
	Edge(usize),
}

/// Notification produced by the coordinator, in input order.
#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
	/// The hovered node changed.
	NodeSelected(Option<String>),
	/// The hovered edge changed.
	EdgeHovered(Option<usize>),
	/// A confirmed click asks for the node's pin to be toggled.
	PinToggled(String),
}

#[derive(Clone, Debug, PartialEq)]
struct PendingClick {
	node_id: String,
	due_at: f64,
}

/// Single owner of gesture state and of the viewport transform.
#[derive(Debug)]
pub struct GestureCoordinator {
	state: GestureState,
	transform: ViewportTransform,
	hovered: Option<HoverTarget>,
	pending_click: Option<PendingClick>,
	events: Vec<GestureEvent>,
}

impl GestureCoordinator {
	/// Starts idle with the given transform.
	pub fn new(transform: ViewportTransform) -> Self {
		Self {
			state: GestureState::Idle,
			transform,
			hovered: None,
			pending_click: None,
			events: Vec::new(),
		}
	}

	/// Current state.
	pub fn state(&self) -> &GestureState {
		&self.state
	}

	/// Whether a drag is in progress or settling.
	pub fn is_busy(&self) -> bool {
		self.state != GestureState::Idle
	}

	/// Current viewport transform.
	pub fn transform(&self) -> &ViewportTransform {
		&self.transform
	}

	/// Currently hovered entity.
	pub fn hovered(&self) -> Option<&HoverTarget> {
		self.hovered.as_ref()
	}

	/// Fires timers that are due at `now_ms`.
	pub fn poll(&mut self, now_ms: f64) {
		if let GestureState::ZoomPendingRelease { settle_at } = self.state {
			if now_ms >= settle_at {
				self.state = GestureState::Idle;
			}
		}

		if self
			.pending_click
			.as_ref()
			.is_some_and(|click| now_ms >= click.due_at)
		{
			if let Some(click) = self.pending_click.take() {
				if self.is_busy() {
					debug!("network-graph: dropped click on {} during a gesture", click.node_id);
				} else {
					self.events.push(GestureEvent::PinToggled(click.node_id));
				}
			}
		}
	}

	/// A drag started on `node_id`. Cancels any pending release or click.
	/// Returns `false` when a drag was already in progress.
	pub fn on_drag_start(&mut self, node_id: &str, now_ms: f64) -> bool {
		self.poll(now_ms);
		if matches!(self.state, GestureState::Dragging { .. }) {
			return false;
		}
		self.pending_click = None;
		self.hovered = None;
		self.state = GestureState::Dragging {
			node_id: node_id.to_string(),
		};
		true
	}

	/// The drag ended. Without a drag in progress this does nothing.
	pub fn on_drag_end(&mut self, now_ms: f64) -> bool {
		self.poll(now_ms);
		if !matches!(self.state, GestureState::Dragging { .. }) {
			return false;
		}
		self.state = GestureState::ZoomPendingRelease {
			settle_at: now_ms + DRAG_SETTLE_MS,
		};
		true
	}

	/// Id of the node being dragged.
	pub fn dragged_node(&self) -> Option<&str> {
		match &self.state {
			GestureState::Dragging { node_id } => Some(node_id),
			_ => None,
		}
	}

	/// The pointer moved onto `target` (or off everything). Ignored while
	/// busy; only changes are reported.
	pub fn on_hover(&mut self, target: Option<HoverTarget>, now_ms: f64) {
		self.poll(now_ms);
		if self.is_busy() || self.hovered == target {
			return;
		}

		let previous = std::mem::replace(&mut self.hovered, target.clone());
		match previous {
			Some(HoverTarget::Node(_)) if !matches!(target, Some(HoverTarget::Node(_))) => {
				self.events.push(GestureEvent::NodeSelected(None))
			}
			Some(HoverTarget::Edge(_)) if !matches!(target, Some(HoverTarget::Edge(_))) => {
				self.events.push(GestureEvent::EdgeHovered(None))
			}
			_ => {}
		}
		match target {
			Some(HoverTarget::Node(id)) => self.events.push(GestureEvent::NodeSelected(Some(id))),
			Some(HoverTarget::Edge(index)) => self.events.push(GestureEvent::EdgeHovered(Some(index))),
			None => {}
		}
	}

	/// A click on `node_id` released at `now_ms`. Ignored while busy;
	/// otherwise the pin toggle is confirmed [`CLICK_CONFIRM_MS`] later.
	pub fn on_click(&mut self, node_id: &str, now_ms: f64) {
		self.poll(now_ms);
		if self.is_busy() {
			return;
		}
		self.pending_click = Some(PendingClick {
			node_id: node_id.to_string(),
			due_at: now_ms + CLICK_CONFIRM_MS,
		});
	}

	/// Whether a pan/zoom gesture would currently be accepted.
	pub fn accepts_viewport_gesture(&self) -> bool {
		!self.is_busy()
	}

	/// Applies a pan/zoom result. Rejected while busy.
	pub fn on_zoom(&mut self, transform: ViewportTransform, now_ms: f64) -> bool {
		self.poll(now_ms);
		if self.is_busy() {
			return false;
		}
		self.transform = transform;
		true
	}

	/// Takes all queued notifications.
	pub fn drain_events(&mut self) -> Vec<GestureEvent> {
		std::mem::take(&mut self.events)
	}
}

impl Default for GestureCoordinator {
	fn default() -> Self {
		Self::new(ViewportTransform::identity())
	}
}
