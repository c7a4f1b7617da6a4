//! Force-layout simulation adapter.
//!
//! Wraps the `force_graph` physics with the named forces and cooling schedule
//! the renderer configures: a link force resolved by node id, many-body
//! repulsion with an optional per-node strength, and a centering force on the
//! canvas midpoint. Every render builds a fresh simulation from copies of the
//! caller's data and settles it over a fixed number of ticks.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::debug;
use serde::Deserialize;

use super::error::GraphError;
use super::identity::{LinkEnds, NodeIdentity, link_id};
use super::types::{GraphData, LinkDefaults, NodeDefaults};

/// Ticks run by [`run_simulation`] when the caller does not choose.
pub const DEFAULT_STEPS: usize = 300;

/// Physics time per tick before alpha scaling, matching a 60fps frame.
const TICK_DT: f64 = 0.016;
/// Mass of a node whose charge strength equals [`DEFAULT_CHARGE`].
const BASE_MASS: f64 = 10.0;
/// Many-body strength used when no charge function is given.
pub const DEFAULT_CHARGE: f64 = -30.0;
const MIN_MASS: f64 = 0.01;
/// Squared distance below which the attractive pull stops growing.
const ATTRACT_DISTANCE_MIN2: f64 = 100.0;

const DEFAULT_ALPHA: f64 = 1.0;
const DEFAULT_ALPHA_MIN: f64 = 0.001;
const DEFAULT_ALPHA_TARGET: f64 = 0.0;
const DEFAULT_VELOCITY_DECAY: f64 = 0.4;

/// Per-node many-body strength. Negative values repel, positive attract.
pub type ChargeStrength = Arc<dyn Fn(&SimNodeInfo) -> f64 + Send + Sync>;

/// Tuning parameters forwarded to the simulation when present.
#[derive(Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationOptions {
	/// Initial energy.
	pub alpha: Option<f64>,
	/// Fraction of the distance to `alpha_target` covered per tick.
	pub alpha_decay: Option<f64>,
	/// Alpha below which the simulation counts as cooled.
	pub alpha_min: Option<f64>,
	/// Value alpha cools towards.
	pub alpha_target: Option<f64>,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: Option<f64>,
	/// Many-body strength per node, defaulting to [`DEFAULT_CHARGE`].
	#[serde(skip)]
	pub charge_strength: Option<ChargeStrength>,
}

impl fmt::Debug for SimulationOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SimulationOptions")
			.field("alpha", &self.alpha)
			.field("alpha_decay", &self.alpha_decay)
			.field("alpha_min", &self.alpha_min)
			.field("alpha_target", &self.alpha_target)
			.field("velocity_decay", &self.velocity_decay)
			.field("charge_strength", &self.charge_strength.is_some())
			.finish()
	}
}

/// The copy of a node handed to the physics: identity and size only.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimNodeInfo {
	/// Node id.
	pub id: String,
	/// Radius after defaults.
	pub radius: f64,
}

/// A node as positioned by the simulation.
#[derive(Clone, Debug, PartialEq)]
pub struct SimNode {
	/// Node id.
	pub id: String,
	/// Radius the simulation was given.
	pub radius: f64,
	/// Horizontal position.
	pub x: f64,
	/// Vertical position.
	pub y: f64,
	/// Horizontal displacement over the most recent tick.
	pub vx: f64,
	/// Vertical displacement over the most recent tick.
	pub vy: f64,
}

/// A link from the link force, endpoints resolved to positioned nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct SimLink {
	/// Positioned source node.
	pub source: SimNode,
	/// Positioned target node.
	pub target: SimNode,
	/// Edge weight.
	pub value: f64,
}

impl NodeIdentity for SimNode {
	fn id(&self) -> &str {
		&self.id
	}
}

impl LinkEnds for SimLink {
	fn source_id(&self) -> &str {
		&self.source.id
	}

	fn target_id(&self) -> &str {
		&self.target.id
	}
}

/// Operations the renderer needs from a force simulation.
///
/// Implement this to supply a custom simulation through
/// [`GraphOptions::simulation_factory`](super::render::GraphOptions).
pub trait Simulation {
	/// Reset the internal clock so the simulation counts as running.
	fn restart(&mut self);
	/// Advance the physics by one step.
	fn tick(&mut self);
	/// Halt the internal clock.
	fn stop(&mut self);
	/// Between `restart` and `stop`.
	fn is_running(&self) -> bool;
	/// Positioned nodes, in insertion order.
	fn nodes(&self) -> Vec<SimNode>;
	/// The link force's resolved links, in insertion order.
	fn links(&self) -> Vec<SimLink>;
}

/// Restart `sim`, advance it exactly `steps` ticks, then stop it.
///
/// There is no convergence check: the step count is fixed.
pub fn run_simulation<S: Simulation + ?Sized>(sim: &mut S, steps: usize) -> &mut S {
	sim.restart();
	for _ in 0..steps {
		sim.tick();
	}
	sim.stop();
	sim
}

/// Build a simulation over copies of `data`, centred on the canvas midpoint.
///
/// Fails if a link references a node id that is not in `data.nodes`.
pub fn create_simulation(
	data: &GraphData,
	width: f64,
	height: f64,
	options: &SimulationOptions,
) -> Result<ForceSimulation, GraphError> {
	ForceSimulation::new(data, width, height, options)
}

#[derive(Clone, Copy, Debug)]
struct LinkEdge {
	source: DefaultNodeIdx,
	target: DefaultNodeIdx,
	value: f64,
}

/// Default [`Simulation`] backed by `force_graph`.
pub struct ForceSimulation {
	graph: ForceGraph<SimNodeInfo, ()>,
	links: Vec<LinkEdge>,
	/// Nodes with a positive many-body strength, pulling others in.
	attractors: Vec<(DefaultNodeIdx, f64)>,
	velocity: HashMap<DefaultNodeIdx, (f64, f64)>,
	center: (f64, f64),
	alpha: f64,
	alpha_decay: f64,
	alpha_min: f64,
	alpha_target: f64,
	running: bool,
	ticks: usize,
}

impl ForceSimulation {
	/// See [`create_simulation`].
	pub fn new(
		data: &GraphData,
		width: f64,
		height: f64,
		options: &SimulationOptions,
	) -> Result<Self, GraphError> {
		let alpha_min = options.alpha_min.unwrap_or(DEFAULT_ALPHA_MIN);
		let velocity_decay = options.velocity_decay.unwrap_or(DEFAULT_VELOCITY_DECAY);
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: (1.0 - velocity_decay).clamp(0.0, 1.0) as f32,
		});

		let center = (width / 2.0, height / 2.0);
		let node_defaults = NodeDefaults::default();
		let mut id_to_idx = HashMap::with_capacity(data.nodes.len());
		let mut attractors = Vec::new();

		for (i, node) in data.nodes.iter().enumerate() {
			let info = SimNodeInfo {
				id: node.id.clone(),
				radius: node.radius.unwrap_or(node_defaults.radius),
			};
			let strength = options
				.charge_strength
				.as_ref()
				.map_or(DEFAULT_CHARGE, |f| f(&info));
			// The library only repels, scaled by mass. Attraction is applied per tick.
			let mass = (BASE_MASS * strength / DEFAULT_CHARGE).max(MIN_MASS);

			// Phyllotaxis seeding keeps placement deterministic.
			let r = 10.0 * (0.5 + i as f64).sqrt();
			let angle = i as f64 * PI * (3.0 - 5f64.sqrt());
			let idx = graph.add_node(NodeData {
				x: (center.0 + r * angle.cos()) as f32,
				y: (center.1 + r * angle.sin()) as f32,
				mass: mass as f32,
				is_anchor: false,
				user_data: info,
			});
			id_to_idx.insert(node.id.clone(), idx);
			if strength > 0.0 {
				attractors.push((idx, strength));
			}
		}

		let link_defaults = LinkDefaults::default();
		let mut links = Vec::with_capacity(data.links.len());
		for link in &data.links {
			let resolve = |id: &String| {
				id_to_idx
					.get(id)
					.copied()
					.ok_or_else(|| GraphError::UnknownNode {
						link: link_id(link),
						node: id.clone(),
					})
			};
			let (source, target) = (resolve(&link.source)?, resolve(&link.target)?);
			graph.add_edge(source, target, EdgeData::default());
			links.push(LinkEdge {
				source,
				target,
				value: link.value.unwrap_or(link_defaults.value),
			});
		}

		debug!(
			"simulation: {} nodes, {} links, centre ({}, {})",
			data.nodes.len(),
			links.len(),
			center.0,
			center.1
		);

		Ok(Self {
			graph,
			links,
			attractors,
			velocity: HashMap::new(),
			center,
			alpha: options.alpha.unwrap_or(DEFAULT_ALPHA),
			alpha_decay: options
				.alpha_decay
				.unwrap_or_else(|| 1.0 - alpha_min.powf(1.0 / DEFAULT_STEPS as f64)),
			alpha_min,
			alpha_target: options.alpha_target.unwrap_or(DEFAULT_ALPHA_TARGET),
			running: false,
			ticks: 0,
		})
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Whether alpha has fallen below `alpha_min`.
	pub fn is_cooled(&self) -> bool {
		self.alpha < self.alpha_min
	}

	/// Ticks taken since construction.
	pub fn ticks(&self) -> usize {
		self.ticks
	}

	fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut out = HashMap::new();
		self.graph.visit_nodes(|node| {
			out.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		out
	}

	/// Pull every node towards each attractor, scaled by alpha.
	fn attract(&mut self) {
		if self.attractors.is_empty() {
			return;
		}
		let positions = self.positions();
		let mut shifts: HashMap<DefaultNodeIdx, (f64, f64)> = HashMap::new();
		// Insertion order keeps the float sums deterministic.
		let mut order = Vec::with_capacity(positions.len());
		self.graph.visit_nodes(|node| order.push(node.index()));
		for &(src, strength) in &self.attractors {
			let Some(&(sx, sy)) = positions.get(&src) else {
				continue;
			};
			for &idx in order.iter().filter(|&&idx| idx != src) {
				let Some(&(x, y)) = positions.get(&idx) else {
					continue;
				};
				let (dx, dy) = (sx - x, sy - y);
				let l2 = (dx * dx + dy * dy).max(ATTRACT_DISTANCE_MIN2);
				let w = strength * self.alpha / l2;
				let shift = shifts.entry(idx).or_insert((0.0, 0.0));
				shift.0 += dx * w;
				shift.1 += dy * w;
			}
		}
		self.graph.visit_nodes_mut(|node| {
			if let Some(&(dx, dy)) = shifts.get(&node.index()) {
				node.data.x += dx as f32;
				node.data.y += dy as f32;
			}
		});
	}

	/// Translate all nodes so their centroid sits on the canvas midpoint.
	fn recenter(&mut self) {
		let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
		self.graph.visit_nodes(|node| {
			sx += node.x() as f64;
			sy += node.y() as f64;
			n += 1;
		});
		if n == 0 {
			return;
		}
		let (dx, dy) = (
			(self.center.0 - sx / n as f64) as f32,
			(self.center.1 - sy / n as f64) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			node.data.x += dx;
			node.data.y += dy;
		});
	}

	fn positioned(&self) -> Vec<(DefaultNodeIdx, SimNode)> {
		let mut out = Vec::new();
		self.graph.visit_nodes(|node| {
			let idx = node.index();
			let (vx, vy) = self.velocity.get(&idx).copied().unwrap_or((0.0, 0.0));
			out.push((
				idx,
				SimNode {
					id: node.data.user_data.id.clone(),
					radius: node.data.user_data.radius,
					x: node.x() as f64,
					y: node.y() as f64,
					vx,
					vy,
				},
			));
		});
		out
	}
}

impl Simulation for ForceSimulation {
	fn restart(&mut self) {
		self.running = true;
	}

	fn tick(&mut self) {
		self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
		let before = self.positions();
		self.graph.update((TICK_DT * self.alpha) as f32);
		self.attract();
		self.recenter();

		self.velocity.clear();
		self.graph.visit_nodes(|node| {
			if let Some(&(x0, y0)) = before.get(&node.index()) {
				self.velocity
					.insert(node.index(), (node.x() as f64 - x0, node.y() as f64 - y0));
			}
		});
		self.ticks += 1;
	}

	fn stop(&mut self) {
		self.running = false;
	}

	fn is_running(&self) -> bool {
		self.running
	}

	fn nodes(&self) -> Vec<SimNode> {
		self.positioned().into_iter().map(|(_, node)| node).collect()
	}

	fn links(&self) -> Vec<SimLink> {
		let by_idx: HashMap<_, _> = self.positioned().into_iter().collect();
		self.links
			.iter()
			.filter_map(|edge| {
				Some(SimLink {
					source: by_idx.get(&edge.source)?.clone(),
					target: by_idx.get(&edge.target)?.clone(),
					value: edge.value,
				})
			})
			.collect()
	}
}
