//! Force-directed layout solver.
//!
//! Each tick combines four forces on the working set:
//! - link attraction, pulling busier pairs closer together
//! - all-pairs repulsion, stronger for more active nodes
//! - collision, keeping node discs from overlapping
//! - centering, keeping the free nodes around the viewport center
//!
//! The solver cools down through a decaying `alpha`. It stabilizes once alpha
//! falls under [`ALPHA_MIN`] and stops when its iteration budget runs out,
//! whichever happens first. User interaction can reheat it.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::debug;

use super::optimize::WorkingSet;
use super::types::NetworkEdge;

/// Alpha below which the layout counts as stabilized.
pub const ALPHA_MIN: f64 = 0.001;
/// Alpha a restart reheats to, at least.
pub const REHEAT_ALPHA: f64 = 0.3;
/// Alpha target held while a node is being dragged.
const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Fraction of velocity lost per tick.
const VELOCITY_DECAY: f64 = 0.4;

/// Ticks to cool from 1.0 to [`ALPHA_MIN`] on small graphs.
const SETTLE_TICKS_SMALL: f64 = 300.0;
/// Ticks to cool on graphs above [`LARGE_GRAPH_NODES`].
const SETTLE_TICKS_LARGE: f64 = 120.0;
const LARGE_GRAPH_NODES: usize = 100;

const LINK_DISTANCE_BASE: f64 = 160.0;
const LINK_DISTANCE_FLOOR: f64 = 50.0;
const CHARGE_PER_ACTIVITY: f64 = 4.0;
const CHARGE_WEAKEST: f64 = -200.0;
const CHARGE_STRONGEST: f64 = -800.0;
const COLLISION_STRENGTH: f64 = 0.7;
const COLLISION_PADDING: f64 = 2.0;
const CENTER_STRENGTH: f64 = 0.1;

const NODE_BASE_RADIUS: f64 = 5.0;
const NODE_RADIUS_PER_SQRT_ACTIVITY: f64 = 1.5;
const NODE_MAX_RADIUS: f64 = 40.0;

/// Lifecycle of one solver run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverPhase {
	/// Alpha is above the threshold and budget remains.
	Running,
	/// Alpha fell below [`ALPHA_MIN`]; positions are settled. The next
	/// tick moves the solver to `Stopped`.
	Stabilized,
	/// The iteration budget ran out, or the solver was stopped.
	Stopped,
}

/// Tuning of a solver run.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverParams {
	/// Iteration budget per run.
	pub max_iterations: u32,
	/// Stabilization threshold.
	pub alpha_min: f64,
	/// Per-tick fraction by which alpha approaches its target.
	pub alpha_decay: f64,
	/// Center of the viewing surface in world units.
	pub center: (f64, f64),
}

impl SolverParams {
	/// Default tuning for a graph of `node_count` nodes. Expensive graphs cool
	/// faster so they settle in fewer ticks.
	pub fn new(node_count: usize, max_iterations: u32, width: f64, height: f64) -> Self {
		let settle_ticks = if node_count > LARGE_GRAPH_NODES {
			SETTLE_TICKS_LARGE
		} else {
			SETTLE_TICKS_SMALL
		};
		Self {
			max_iterations,
			alpha_min: ALPHA_MIN,
			alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / settle_ticks),
			center: (width / 2.0, height / 2.0),
		}
	}
}

/// Color bucket of an edge, from its success rate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeBucket {
	/// Success rate of 90% or more.
	Strong,
	/// Success rate of 70% or more.
	Moderate,
	/// Anything lower.
	Weak,
}

/// Stroke style of an edge, fixed when the edge is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeVisual {
	/// Stroke width in screen pixels at zoom 1.
	pub stroke_width: f64,
	/// Color bucket.
	pub bucket: EdgeBucket,
}

impl EdgeVisual {
	/// Derives the visual weight of `edge`.
	pub fn for_edge(edge: &NetworkEdge) -> Self {
		let rate = edge.clamped_success_rate();
		let bucket = if rate >= 0.9 {
			EdgeBucket::Strong
		} else if rate >= 0.7 {
			EdgeBucket::Moderate
		} else {
			EdgeBucket::Weak
		};
		Self {
			stroke_width: (1.0 + (edge.value.max(0.0) + 1.0).log10()).clamp(1.0, 6.0),
			bucket,
		}
	}
}

/// A node being positioned.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
	/// Stable identifier.
	pub id: String,
	/// Display label.
	pub label: String,
	/// Category for coloring.
	pub category: String,
	/// Activity metric.
	pub activity: f64,
	/// Optional monetary metric.
	pub amount: Option<f64>,
	/// Current x position.
	pub x: f64,
	/// Current y position.
	pub y: f64,
	/// Current x velocity.
	pub vx: f64,
	/// Current y velocity.
	pub vy: f64,
	/// Pinned x position.
	pub fx: Option<f64>,
	/// Pinned y position.
	pub fy: Option<f64>,
	/// Collision and drawing radius in world units.
	pub radius: f64,
}

impl LayoutNode {
	/// Whether the node is pinned on either axis.
	pub fn is_pinned(&self) -> bool {
		self.fx.is_some() || self.fy.is_some()
	}

	fn charge(&self) -> f64 {
		(CHARGE_WEAKEST - self.activity.max(0.0) * CHARGE_PER_ACTIVITY)
			.clamp(CHARGE_STRONGEST, CHARGE_WEAKEST)
	}
}

/// Radius for a node of the given activity. Square-root scaled so area,
/// not radius, tracks activity.
pub fn node_radius(activity: f64) -> f64 {
	(NODE_BASE_RADIUS + activity.max(0.0).sqrt() * NODE_RADIUS_PER_SQRT_ACTIVITY)
		.min(NODE_MAX_RADIUS)
}

/// A link between two layout nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutEdge {
	/// Index of the source node.
	pub source: usize,
	/// Index of the target node.
	pub target: usize,
	/// Total value.
	pub value: f64,
	/// Relationship count.
	pub count: u32,
	/// Success rate in `[0, 1]`.
	pub success_rate: f64,
	/// Stroke style.
	pub visual: EdgeVisual,
	distance: f64,
	strength: f64,
	bias: f64,
}

/// Rest length of a link. Busier pairs sit closer, down to a floor.
pub fn link_distance(count: u32) -> f64 {
	(LINK_DISTANCE_BASE / f64::from(count.max(1)).sqrt()).max(LINK_DISTANCE_FLOOR)
}

#[derive(Clone, Copy, Debug)]
struct DragAnchor {
	index: usize,
	x: f64,
	y: f64,
}

/// Iterative force-directed solver over one working set.
pub struct LayoutSolver {
	nodes: Vec<LayoutNode>,
	edges: Vec<LayoutEdge>,
	index_by_id: HashMap<String, usize>,
	params: SolverParams,
	alpha: f64,
	alpha_target: f64,
	remaining: u32,
	ticks: u32,
	phase: SolverPhase,
	drag: Option<DragAnchor>,
}

impl LayoutSolver {
	/// Builds a solver with nodes laid out on a phyllotaxis spiral around the
	/// center. An empty working set yields a solver that is already stopped.
	pub fn new(set: &WorkingSet, params: SolverParams) -> Self {
		let (cx, cy) = params.center;
		let golden_angle = PI * (3.0 - 5f64.sqrt());

		let nodes: Vec<LayoutNode> = set
			.nodes
			.iter()
			.enumerate()
			.map(|(i, node)| {
				let r = 10.0 * (0.5 + i as f64).sqrt();
				let a = i as f64 * golden_angle;
				LayoutNode {
					id: node.id.clone(),
					label: node.display_label().to_string(),
					category: node.category.clone(),
					activity: node.activity,
					amount: node.amount,
					x: cx + r * a.cos(),
					y: cy + r * a.sin(),
					vx: 0.0,
					vy: 0.0,
					fx: None,
					fy: None,
					radius: node_radius(node.activity),
				}
			})
			.collect();

		let index_by_id: HashMap<String, usize> = nodes
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();

		let resolved: Vec<(usize, usize, &NetworkEdge)> = set
			.edges
			.iter()
			.filter_map(|edge| {
				let s = *index_by_id.get(&edge.source)?;
				let t = *index_by_id.get(&edge.target)?;
				Some((s, t, edge))
			})
			.collect();

		let mut degree = vec![0usize; nodes.len()];
		for &(s, t, _) in &resolved {
			degree[s] += 1;
			degree[t] += 1;
		}

		let edges = resolved
			.into_iter()
			.map(|(s, t, edge)| {
				let (ds, dt) = (degree[s] as f64, degree[t] as f64);
				LayoutEdge {
					source: s,
					target: t,
					value: edge.value,
					count: edge.count,
					success_rate: edge.clamped_success_rate(),
					visual: EdgeVisual::for_edge(edge),
					distance: link_distance(edge.count),
					strength: 1.0 / ds.min(dt).max(1.0),
					bias: ds / (ds + dt),
				}
			})
			.collect();

		let phase = if nodes.is_empty() || params.max_iterations == 0 {
			SolverPhase::Stopped
		} else {
			SolverPhase::Running
		};

		Self {
			remaining: params.max_iterations,
			nodes,
			edges,
			index_by_id,
			params,
			alpha: 1.0,
			alpha_target: 0.0,
			ticks: 0,
			phase,
			drag: None,
		}
	}

	/// Current phase.
	pub fn phase(&self) -> SolverPhase {
		self.phase
	}

	/// Whether the next [`tick`](Self::tick) will move nodes.
	pub fn is_running(&self) -> bool {
		self.phase == SolverPhase::Running
	}

	/// Current temperature.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Ticks performed since the solver was created.
	pub fn ticks(&self) -> u32 {
		self.ticks
	}

	/// Laid-out nodes.
	pub fn nodes(&self) -> &[LayoutNode] {
		&self.nodes
	}

	/// Laid-out edges.
	pub fn edges(&self) -> &[LayoutEdge] {
		&self.edges
	}

	/// Index of the node with the given id.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index_by_id.get(id).copied()
	}

	/// Advances the simulation by one step and returns the resulting phase.
	///
	/// A stabilized layout moves to [`SolverPhase::Stopped`] on the tick
	/// after it settled, without moving any node.
	pub fn tick(&mut self) -> SolverPhase {
		match self.phase {
			SolverPhase::Running => {}
			SolverPhase::Stabilized => {
				self.phase = SolverPhase::Stopped;
				return self.phase;
			}
			SolverPhase::Stopped => return self.phase,
		}

		self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
		self.apply_links();
		self.apply_charge();
		self.apply_collision();
		self.integrate();
		self.apply_center();

		self.ticks += 1;
		self.remaining = self.remaining.saturating_sub(1);

		if self.alpha < self.params.alpha_min {
			self.phase = SolverPhase::Stabilized;
			debug!("network-graph: layout stabilized after {} ticks", self.ticks);
		} else if self.remaining == 0 {
			self.phase = SolverPhase::Stopped;
			debug!("network-graph: layout hit its {} tick budget", self.params.max_iterations);
		}
		self.phase
	}

	/// Reheats the simulation and refills the iteration budget. A solver
	/// without nodes stays stopped.
	pub fn restart(&mut self) {
		if self.nodes.is_empty() || self.params.max_iterations == 0 {
			return;
		}
		self.alpha = self.alpha.max(REHEAT_ALPHA);
		self.remaining = self.params.max_iterations;
		self.phase = SolverPhase::Running;
	}

	/// Halts the solver; positions are kept as they are.
	pub fn stop(&mut self) {
		self.phase = SolverPhase::Stopped;
		self.drag = None;
		self.alpha_target = 0.0;
	}

	/// Starts holding node `index` under the pointer and reheats.
	pub fn begin_drag(&mut self, index: usize) {
		let Some(node) = self.nodes.get(index) else {
			return;
		};
		self.drag = Some(DragAnchor {
			index,
			x: node.x,
			y: node.y,
		});
		self.alpha_target = DRAG_ALPHA_TARGET;
		self.restart();
	}

	/// Moves the dragged node to `(x, y)` in world units.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		if let Some(anchor) = self.drag.as_mut() {
			anchor.x = x;
			anchor.y = y;
			if let Some(node) = self.nodes.get_mut(anchor.index) {
				node.x = x;
				node.y = y;
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
	}

	/// Releases the dragged node and lets the layout cool down.
	pub fn end_drag(&mut self) {
		self.drag = None;
		self.alpha_target = 0.0;
	}

	/// Index of the node being dragged.
	pub fn dragged(&self) -> Option<usize> {
		self.drag.map(|anchor| anchor.index)
	}

	/// Pins a free node at its current position, or frees a pinned one, then
	/// reheats. Returns whether the node is now pinned.
	pub fn toggle_pin(&mut self, index: usize) -> Option<bool> {
		let node = self.nodes.get_mut(index)?;
		let pinned = if node.is_pinned() {
			node.fx = None;
			node.fy = None;
			false
		} else {
			node.fx = Some(node.x);
			node.fy = Some(node.y);
			node.vx = 0.0;
			node.vy = 0.0;
			true
		};
		self.restart();
		Some(pinned)
	}

	/// Topmost node whose hit disc contains `(x, y)`.
	///
	/// `reach` gives each node's hit radius, or `None` for nodes that cannot
	/// be hit; those never shadow the nodes beneath them.
	pub fn node_at<R>(&self, x: f64, y: f64, reach: R) -> Option<usize>
	where
		R: Fn(&LayoutNode) -> Option<f64>,
	{
		self.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, node)| {
				reach(node).is_some_and(|reach| {
					let (dx, dy) = (node.x - x, node.y - y);
					dx * dx + dy * dy <= reach * reach
				})
			})
			.map(|(i, _)| i)
	}

	/// Closest edge within `tolerance` of `(x, y)` among those `hittable`
	/// accepts.
	pub fn edge_at<H>(&self, x: f64, y: f64, tolerance: f64, hittable: H) -> Option<usize>
	where
		H: Fn(&LayoutEdge) -> bool,
	{
		let mut best: Option<(usize, f64)> = None;
		for (i, edge) in self.edges.iter().enumerate().filter(|(_, edge)| hittable(edge)) {
			let (s, t) = (&self.nodes[edge.source], &self.nodes[edge.target]);
			let d = point_segment_distance(x, y, s.x, s.y, t.x, t.y);
			if d <= tolerance && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((i, d));
			}
		}
		best.map(|(i, _)| i)
	}

	fn apply_links(&mut self) {
		let alpha = self.alpha;
		for edge in &self.edges {
			if edge.source == edge.target {
				continue;
			}
			let (s, t) = (&self.nodes[edge.source], &self.nodes[edge.target]);
			let mut x = t.x + t.vx - s.x - s.vx;
			let mut y = t.y + t.vy - s.y - s.vy;
			if x == 0.0 && y == 0.0 {
				(x, y) = jiggle(edge.source, edge.target);
			}
			let l = (x * x + y * y).sqrt();
			let k = (l - edge.distance) / l * alpha * edge.strength;
			let (x, y) = (x * k, y * k);

			let t = &mut self.nodes[edge.target];
			t.vx -= x * edge.bias;
			t.vy -= y * edge.bias;
			let s = &mut self.nodes[edge.source];
			s.vx += x * (1.0 - edge.bias);
			s.vy += y * (1.0 - edge.bias);
		}
	}

	fn apply_charge(&mut self) {
		let alpha = self.alpha;
		let n = self.nodes.len();
		for i in 0..n {
			let (xi, yi) = (self.nodes[i].x, self.nodes[i].y);
			let (mut ax, mut ay) = (0.0, 0.0);
			for j in 0..n {
				if i == j {
					continue;
				}
				let other = &self.nodes[j];
				let (mut dx, mut dy) = (other.x - xi, other.y - yi);
				if dx == 0.0 && dy == 0.0 {
					(dx, dy) = jiggle(i, j);
				}
				let l2 = (dx * dx + dy * dy).max(1.0);
				let w = other.charge() * alpha / l2;
				ax += dx * w;
				ay += dy * w;
			}
			self.nodes[i].vx += ax;
			self.nodes[i].vy += ay;
		}
	}

	fn apply_collision(&mut self) {
		let n = self.nodes.len();
		for i in 0..n {
			for j in (i + 1)..n {
				let (a, b) = (&self.nodes[i], &self.nodes[j]);
				let reach = a.radius + b.radius + COLLISION_PADDING;
				let mut dx = a.x + a.vx - b.x - b.vx;
				let mut dy = a.y + a.vy - b.y - b.vy;
				let mut l2 = dx * dx + dy * dy;
				if l2 >= reach * reach {
					continue;
				}
				if l2 == 0.0 {
					(dx, dy) = jiggle(i, j);
					l2 = dx * dx + dy * dy;
				}
				let l = l2.sqrt();
				let push = (reach - l) / l * COLLISION_STRENGTH;
				let (ra2, rb2) = (a.radius * a.radius, b.radius * b.radius);
				let wa = rb2 / (ra2 + rb2);
				let (px, py) = (dx * push, dy * push);

				let a = &mut self.nodes[i];
				a.vx += px * wa;
				a.vy += py * wa;
				let b = &mut self.nodes[j];
				b.vx -= px * (1.0 - wa);
				b.vy -= py * (1.0 - wa);
			}
		}
	}

	fn integrate(&mut self) {
		let retain = 1.0 - VELOCITY_DECAY;
		for node in &mut self.nodes {
			match node.fx {
				Some(fx) => {
					node.x = fx;
					node.vx = 0.0;
				}
				None => {
					node.vx *= retain;
					node.x += node.vx;
				}
			}
			match node.fy {
				Some(fy) => {
					node.y = fy;
					node.vy = 0.0;
				}
				None => {
					node.vy *= retain;
					node.y += node.vy;
				}
			}
		}

		if let Some(anchor) = self.drag {
			if let Some(node) = self.nodes.get_mut(anchor.index) {
				node.x = anchor.x;
				node.y = anchor.y;
				node.vx = 0.0;
				node.vy = 0.0;
			}
		}
	}

	/// Shifts free nodes so the centroid drifts toward the center.
	fn apply_center(&mut self) {
		let n = self.nodes.len();
		if n == 0 {
			return;
		}
		let (sx, sy) = self
			.nodes
			.iter()
			.fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
		let (cx, cy) = self.params.center;
		let shift_x = (cx - sx / n as f64) * CENTER_STRENGTH;
		let shift_y = (cy - sy / n as f64) * CENTER_STRENGTH;
		let dragged = self.dragged();

		for (i, node) in self.nodes.iter_mut().enumerate() {
			if Some(i) == dragged {
				continue;
			}
			if node.fx.is_none() {
				node.x += shift_x;
			}
			if node.fy.is_none() {
				node.y += shift_y;
			}
		}
	}
}

/// Small deterministic offset for coincident points.
fn jiggle(i: usize, j: usize) -> (f64, f64) {
	let angle = ((i as f64) * 0.618_034 + (j as f64) * 0.414_214) * std::f64::consts::TAU;
	(angle.cos() * 1e-6, angle.sin() * 1e-6)
}

fn point_segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((px - x1) * dx + (py - y1) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	let (cx, cy) = (x1 + t * dx, y1 + t * dy);
	((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
	use super::super::types::NetworkNode;
	use super::*;

	fn working_set(node_count: usize, links: &[(usize, usize, u32)]) -> WorkingSet {
		let nodes = (0..node_count)
			.map(|i| NetworkNode {
				id: format!("n{i}"),
				label: None,
				category: "default".into(),
				activity: (i % 5) as f64 * 3.0,
				amount: None,
			})
			.collect();
		let edges = links
			.iter()
			.map(|&(s, t, count)| NetworkEdge {
				source: format!("n{s}"),
				target: format!("n{t}"),
				value: 100.0,
				count,
				success_rate: 0.95,
			})
			.collect();
		WorkingSet {
			nodes,
			edges,
			..Default::default()
		}
	}

	fn params(max_iterations: u32, alpha_decay: f64) -> SolverParams {
		SolverParams {
			max_iterations,
			alpha_min: ALPHA_MIN,
			alpha_decay,
			center: (400.0, 300.0),
		}
	}

	fn run(solver: &mut LayoutSolver) {
		while solver.is_running() {
			solver.tick();
		}
	}

	fn distance(a: &LayoutNode, b: &LayoutNode) -> f64 {
		((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
	}

	#[test]
	fn stabilizes_when_alpha_crosses_threshold_before_the_cap() {
		// alpha after t ticks is e^(-0.175 t): above 0.001 at 39, below at 40.
		let decay = 1.0 - (-0.175f64).exp();
		let mut solver = LayoutSolver::new(&working_set(6, &[(0, 1, 1), (1, 2, 1)]), params(300, decay));
		run(&mut solver);

		assert_eq!(solver.ticks(), 40);
		assert_eq!(solver.phase(), SolverPhase::Stabilized);
		assert!(solver.alpha() < ALPHA_MIN);
	}

	#[test]
	fn stops_at_the_iteration_cap() {
		let mut solver = LayoutSolver::new(&working_set(4, &[(0, 1, 1)]), params(25, 0.0001));
		run(&mut solver);

		assert_eq!(solver.ticks(), 25);
		assert_eq!(solver.phase(), SolverPhase::Stopped);
		assert_eq!(solver.tick(), SolverPhase::Stopped);
		assert_eq!(solver.ticks(), 25);
	}

	#[test]
	fn empty_working_set_never_runs() {
		let mut solver = LayoutSolver::new(&WorkingSet::default(), SolverParams::new(0, 300, 800.0, 600.0));
		assert_eq!(solver.phase(), SolverPhase::Stopped);
		solver.restart();
		assert_eq!(solver.tick(), SolverPhase::Stopped);
		assert_eq!(solver.ticks(), 0);
		assert_eq!(solver.node_at(0.0, 0.0, |n| Some(n.radius + 10.0)), None);
		assert_eq!(solver.edge_at(0.0, 0.0, 10.0, |_| true), None);
	}

	#[test]
	fn large_graphs_cool_faster() {
		let small = SolverParams::new(50, 300, 800.0, 600.0);
		let large = SolverParams::new(150, 300, 800.0, 600.0);
		assert!(large.alpha_decay > small.alpha_decay);
		assert_eq!(small.center, (400.0, 300.0));
	}

	#[test]
	fn restart_reheats_a_settled_solver() {
		let mut solver = LayoutSolver::new(&working_set(3, &[(0, 1, 1)]), params(10, 0.5));
		run(&mut solver);
		assert!(!solver.is_running());

		solver.restart();
		assert!(solver.is_running());
		assert!(solver.alpha() >= REHEAT_ALPHA);
	}

	#[test]
	fn linked_nodes_end_closer_than_unlinked_ones() {
		let links = [(0, 1, 20), (2, 3, 20), (4, 5, 20)];
		let mut solver =
			LayoutSolver::new(&working_set(12, &links), SolverParams::new(12, 300, 800.0, 600.0));
		run(&mut solver);

		let nodes = solver.nodes();
		let linked = links
			.iter()
			.map(|&(s, t, _)| distance(&nodes[s], &nodes[t]))
			.sum::<f64>()
			/ links.len() as f64;
		let mut unlinked = Vec::new();
		for i in 6..nodes.len() {
			for j in (i + 1)..nodes.len() {
				unlinked.push(distance(&nodes[i], &nodes[j]));
			}
		}
		let unlinked = unlinked.iter().sum::<f64>() / unlinked.len() as f64;
		assert!(linked < unlinked, "linked {linked} vs unlinked {unlinked}");
	}

	#[test]
	fn nodes_do_not_overlap_after_settling() {
		let mut solver =
			LayoutSolver::new(&working_set(20, &[]), SolverParams::new(20, 300, 800.0, 600.0));
		run(&mut solver);

		let nodes = solver.nodes();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let min = (nodes[i].radius + nodes[j].radius) * 0.9;
				assert!(distance(&nodes[i], &nodes[j]) >= min, "{i} and {j} overlap");
			}
		}
	}

	#[test]
	fn layout_stays_centered() {
		let mut solver = LayoutSolver::new(
			&working_set(30, &[(0, 1, 1), (2, 3, 2), (4, 5, 3)]),
			SolverParams::new(30, 300, 800.0, 600.0),
		);
		run(&mut solver);

		let n = solver.nodes().len() as f64;
		let cx = solver.nodes().iter().map(|node| node.x).sum::<f64>() / n;
		let cy = solver.nodes().iter().map(|node| node.y).sum::<f64>() / n;
		assert!((cx - 400.0).abs() < 5.0, "cx {cx}");
		assert!((cy - 300.0).abs() < 5.0, "cy {cy}");
	}

	#[test]
	fn pinned_nodes_hold_position() {
		let mut solver = LayoutSolver::new(
			&working_set(8, &[(0, 1, 1), (0, 2, 1)]),
			SolverParams::new(8, 300, 800.0, 600.0),
		);
		assert_eq!(solver.toggle_pin(0), Some(true));
		let (x, y) = (solver.nodes()[0].x, solver.nodes()[0].y);
		for _ in 0..50 {
			solver.tick();
		}
		assert_eq!((solver.nodes()[0].x, solver.nodes()[0].y), (x, y));

		assert_eq!(solver.toggle_pin(0), Some(false));
		assert!(!solver.nodes()[0].is_pinned());
		assert_eq!(solver.toggle_pin(99), None);
	}

	#[test]
	fn dragged_node_follows_the_pointer() {
		let mut solver = LayoutSolver::new(
			&working_set(5, &[(0, 1, 1)]),
			SolverParams::new(5, 300, 800.0, 600.0),
		);
		solver.begin_drag(1);
		solver.drag_to(10.0, 20.0);
		for _ in 0..5 {
			solver.tick();
		}
		let node = &solver.nodes()[1];
		assert_eq!((node.x, node.y), (10.0, 20.0));
		assert!(solver.is_running());
		assert!(!node.is_pinned());

		solver.end_drag();
		assert_eq!(solver.dragged(), None);
	}

	#[test]
	fn radius_tracks_square_root_of_activity() {
		assert_eq!(node_radius(0.0), NODE_BASE_RADIUS);
		let r1 = node_radius(4.0) - NODE_BASE_RADIUS;
		let r2 = node_radius(16.0) - NODE_BASE_RADIUS;
		assert!((r2 / r1 - 2.0).abs() < 1e-9);
		assert_eq!(node_radius(1e9), NODE_MAX_RADIUS);
	}

	#[test]
	fn charge_is_clamped() {
		let mut solver = LayoutSolver::new(&working_set(1, &[]), params(1, 0.1));
		let node = &mut solver.nodes[0];
		node.activity = 0.0;
		assert_eq!(node.charge(), CHARGE_WEAKEST);
		node.activity = 1e6;
		assert_eq!(node.charge(), CHARGE_STRONGEST);
	}

	#[test]
	fn busier_links_are_shorter_down_to_a_floor() {
		assert!(link_distance(4) < link_distance(1));
		assert_eq!(link_distance(0), link_distance(1));
		assert_eq!(link_distance(10_000), LINK_DISTANCE_FLOOR);
	}

	#[test]
	fn edge_visual_buckets_by_success_rate() {
		let mut edge = NetworkEdge {
			source: "a".into(),
			target: "b".into(),
			value: 0.0,
			count: 1,
			success_rate: 0.95,
		};
		assert_eq!(EdgeVisual::for_edge(&edge).bucket, EdgeBucket::Strong);
		assert_eq!(EdgeVisual::for_edge(&edge).stroke_width, 1.0);
		edge.success_rate = 0.75;
		assert_eq!(EdgeVisual::for_edge(&edge).bucket, EdgeBucket::Moderate);
		edge.success_rate = 0.2;
		edge.value = 1e9;
		let visual = EdgeVisual::for_edge(&edge);
		assert_eq!(visual.bucket, EdgeBucket::Weak);
		assert_eq!(visual.stroke_width, 6.0);
	}

	#[test]
	fn hit_testing_finds_nodes_and_edges() {
		let solver = LayoutSolver::new(&working_set(2, &[(0, 1, 1)]), params(10, 0.1));
		let (a, b) = (&solver.nodes()[0], &solver.nodes()[1]);
		assert_eq!(solver.node_at(a.x, a.y, |n| Some(n.radius)), Some(0));
		assert_eq!(solver.node_at(b.x + b.radius + 3.0, b.y, |n| Some(n.radius + 4.0)), Some(1));

		let (mx, my) = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		assert_eq!(solver.edge_at(mx, my, 1.0, |_| true), Some(0));
		assert_eq!(solver.edge_at(mx, my, 1.0, |_| false), None);
		assert_eq!(solver.edge_at(mx + 500.0, my, 1.0, |_| true), None);
	}

	#[test]
	fn unhittable_nodes_do_not_shadow_the_ones_below() {
		let mut solver = LayoutSolver::new(&working_set(2, &[]), params(10, 0.1));
		let (x, y) = (solver.nodes()[0].x, solver.nodes()[0].y);
		solver.begin_drag(1);
		solver.drag_to(x, y);

		assert_eq!(solver.node_at(x, y, |n| Some(n.radius)), Some(1));
		let hidden = solver.nodes()[1].id.clone();
		assert_eq!(
			solver.node_at(x, y, |n| (n.id != hidden).then_some(n.radius)),
			Some(0)
		);
	}

	#[test]
	fn stabilized_layout_comes_to_a_stop_on_the_next_tick() {
		let mut solver = LayoutSolver::new(&working_set(3, &[(0, 1, 1)]), params(300, 0.5));
		run(&mut solver);
		assert_eq!(solver.phase(), SolverPhase::Stabilized);
		let ticks = solver.ticks();

		assert_eq!(solver.tick(), SolverPhase::Stopped);
		assert_eq!(solver.ticks(), ticks);
		assert_eq!(solver.tick(), SolverPhase::Stopped);

		solver.restart();
		assert!(solver.is_running());
	}
}
