//! Scene construction for the force graph.
//!
//! Turns graph data plus a settled simulation into flat lists of visual
//! primitives. Output is layered for correct z-ordering:
//! 1. Link lines
//! 2. Node circles
//! 3. Labels

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use log::{debug, warn};

use super::error::GraphError;
use super::identity::{hydrate, link_id, merge_defaults, node_id};
use super::simulation::{
	DEFAULT_STEPS, SimLink, SimNode, Simulation, SimulationOptions, create_simulation,
	run_simulation,
};
use super::types::{GraphData, LinkDefaults, LinkRecord, NodeDefaults, NodeRecord};

/// Builds an unsettled simulation from the full graph options.
pub type SimulationFactory =
	Arc<dyn Fn(&GraphData, &GraphOptions) -> Result<Box<dyn Simulation>, GraphError> + Send + Sync>;

/// Computes one axis of a label's offset from its node.
pub type OffsetFn = Arc<dyn Fn(&NodeRecord) -> f64 + Send + Sync>;

/// Label placement relative to the node centre.
#[derive(Clone)]
pub struct LabelOffset {
	/// Horizontal offset.
	pub x: OffsetFn,
	/// Vertical offset.
	pub y: OffsetFn,
}

impl Default for LabelOffset {
	/// Beside the node, up and to the right, scaled by its radius.
	fn default() -> Self {
		Self {
			x: Arc::new(|node: &NodeRecord| node.radius / 2.0),
			y: Arc::new(|node: &NodeRecord| -node.radius / 4.0),
		}
	}
}

/// Display and physics configuration for a graph.
#[derive(Clone)]
pub struct GraphOptions {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Tuning for the default simulation.
	pub simulation: SimulationOptions,
	/// Replaces [`create_simulation`]. Must return a simulation that has not
	/// been settled yet.
	pub simulation_factory: Option<SimulationFactory>,
	/// Node field rendered as label text.
	pub label_attr: String,
	/// Where labels sit relative to their node.
	pub label_offset: LabelOffset,
	/// Show every label, not only nodes with `show_label` set.
	pub show_labels: bool,
	/// Styling for nodes that leave attributes unset.
	pub node_defaults: NodeDefaults,
	/// Styling for links that leave attributes unset.
	pub link_defaults: LinkDefaults,
}

impl Default for GraphOptions {
	fn default() -> Self {
		Self {
			width: 900.0,
			height: 600.0,
			simulation: SimulationOptions::default(),
			simulation_factory: None,
			label_attr: "id".to_string(),
			label_offset: LabelOffset::default(),
			show_labels: false,
			node_defaults: NodeDefaults::default(),
			link_defaults: LinkDefaults::default(),
		}
	}
}

impl fmt::Debug for GraphOptions {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("GraphOptions")
			.field("width", &self.width)
			.field("height", &self.height)
			.field("simulation", &self.simulation)
			.field("simulation_factory", &self.simulation_factory.is_some())
			.field("label_attr", &self.label_attr)
			.field("show_labels", &self.show_labels)
			.field("node_defaults", &self.node_defaults)
			.field("link_defaults", &self.link_defaults)
			.finish()
	}
}

/// The positional output of a settled simulation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Layout {
	/// Settled nodes.
	pub nodes: Vec<SimNode>,
	/// Settled links.
	pub links: Vec<SimLink>,
}

/// The part of the data the physics depends on: node sizes and link weights.
///
/// Two graphs with equal inputs settle to the same layout.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimulationInput {
	nodes: Vec<(String, Option<f64>)>,
	links: Vec<(String, String, Option<f64>)>,
}

impl From<&GraphData> for SimulationInput {
	fn from(data: &GraphData) -> Self {
		Self {
			nodes: data.nodes.iter().map(|n| (n.id.clone(), n.radius)).collect(),
			links: data
				.links
				.iter()
				.map(|l| (l.source.clone(), l.target.clone(), l.value))
				.collect(),
		}
	}
}

/// One `<line>`.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkLine {
	/// `source=>target`, unique within a scene.
	pub id: String,
	/// Hydrated styling.
	pub record: LinkRecord,
	/// Source x.
	pub x1: f64,
	/// Source y.
	pub y1: f64,
	/// Target x.
	pub x2: f64,
	/// Target y.
	pub y2: f64,
	/// `sqrt(value)`, so area rather than width tracks the weight.
	pub stroke_width: f64,
}

/// One `<circle>`.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeCircle {
	/// Hydrated styling.
	pub record: NodeRecord,
	/// Centre x.
	pub x: f64,
	/// Centre y.
	pub y: f64,
}

/// One `<text>`.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeLabel {
	/// The labelled node.
	pub record: NodeRecord,
	/// Value of the label attribute.
	pub text: String,
	/// Anchor x, offset applied.
	pub x: f64,
	/// Anchor y, offset applied.
	pub y: f64,
}

/// Everything the view layer draws, in stacking order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	/// Canvas width.
	pub width: f64,
	/// Canvas height.
	pub height: f64,
	/// Bottom layer.
	pub links: Vec<LinkLine>,
	/// Middle layer.
	pub nodes: Vec<NodeCircle>,
	/// Top layer.
	pub labels: Vec<NodeLabel>,
}

impl Scene {
	/// A scene with nothing to draw.
	pub fn empty(width: f64, height: f64) -> Self {
		Self {
			width,
			height,
			..Default::default()
		}
	}

	/// The line with `id`.
	pub fn link(&self, id: &str) -> Option<&LinkLine> {
		self.links.iter().find(|l| l.id == id)
	}

	/// The circle for node `id`.
	pub fn node(&self, id: &str) -> Option<&NodeCircle> {
		self.nodes.iter().find(|n| n.record.id == id)
	}

	/// The label for node `id`, if shown.
	pub fn label(&self, id: &str) -> Option<&NodeLabel> {
		self.labels.iter().find(|l| l.record.id == id)
	}
}

/// Build the configured simulation and run it to a settled state.
pub fn settle(data: &GraphData, options: &GraphOptions) -> Result<Layout, GraphError> {
	let mut sim: Box<dyn Simulation> = match &options.simulation_factory {
		Some(factory) => factory(data, options)?,
		None => Box::new(create_simulation(
			data,
			options.width,
			options.height,
			&options.simulation,
		)?),
	};
	run_simulation(sim.as_mut(), DEFAULT_STEPS);
	debug!("settled {} nodes after {} ticks", data.nodes.len(), DEFAULT_STEPS);

	Ok(Layout {
		nodes: sim.nodes(),
		links: sim.links(),
	})
}

/// Hydrate a settled layout with the data's styling and emit primitives.
///
/// Repeated links draw once, at the position of the last occurrence.
pub fn compose_scene(data: &GraphData, options: &GraphOptions, layout: &Layout) -> Scene {
	let node_map = merge_defaults(&data.nodes, node_id, &options.node_defaults);
	let link_map = merge_defaults(&data.links, link_id, &options.link_defaults);

	let mut seen = HashSet::new();
	let mut links: Vec<LinkLine> = layout
		.links
		.iter()
		.rev()
		.filter(|link| seen.insert(link_id(*link)))
		.filter_map(|link| {
			let Some(h) = hydrate(link, link_id, &link_map) else {
				warn!("no link record for {}", link_id(link));
				return None;
			};
			Some(LinkLine {
				id: link_id(link),
				record: h.record.clone(),
				x1: h.item.source.x,
				y1: h.item.source.y,
				x2: h.item.target.x,
				y2: h.item.target.y,
				stroke_width: h.record.value.sqrt(),
			})
		})
		.collect();
	links.reverse();

	let positioned: Vec<NodeCircle> = layout
		.nodes
		.iter()
		.filter_map(|node| {
			let Some(h) = hydrate(node, node_id, &node_map) else {
				warn!("no node record for {}", node.id);
				return None;
			};
			Some(NodeCircle {
				record: h.record.clone(),
				x: h.item.x,
				y: h.item.y,
			})
		})
		.collect();

	let labels = positioned
		.iter()
		.filter(|circle| options.show_labels || circle.record.show_label)
		.map(|circle| NodeLabel {
			record: circle.record.clone(),
			text: circle.record.label(&options.label_attr),
			x: circle.x + (options.label_offset.x)(&circle.record),
			y: circle.y + (options.label_offset.y)(&circle.record),
		})
		.collect();

	Scene {
		width: options.width,
		height: options.height,
		links,
		nodes: positioned,
		labels,
	}
}

/// Settle `data` and compose its scene in one pass.
pub fn build_scene(data: &GraphData, options: &GraphOptions) -> Result<Scene, GraphError> {
	let layout = settle(data, options)?;
	Ok(compose_scene(data, options, &layout))
}

#[cfg(test)]
mod tests {
	use std::sync::Mutex;

	use super::*;
	use crate::components::force_graph::types::{Link, Node};

	fn pair() -> GraphData {
		GraphData {
			nodes: vec![Node::new("a"), Node::new("b")],
			links: vec![Link::new("a", "b").with_value(4.0)],
		}
	}

	/// Fixed positions; records how it was driven.
	struct FixedSimulation {
		nodes: Vec<SimNode>,
		links: Vec<SimLink>,
		log: Arc<Mutex<Vec<&'static str>>>,
	}

	impl Simulation for FixedSimulation {
		fn restart(&mut self) {
			self.log.lock().unwrap().push("restart");
		}

		fn tick(&mut self) {
			self.log.lock().unwrap().push("tick");
		}

		fn stop(&mut self) {
			self.log.lock().unwrap().push("stop");
		}

		fn is_running(&self) -> bool {
			false
		}

		fn nodes(&self) -> Vec<SimNode> {
			self.nodes.clone()
		}

		fn links(&self) -> Vec<SimLink> {
			self.links.clone()
		}
	}

	fn at(id: &str, x: f64, y: f64) -> SimNode {
		SimNode {
			id: id.into(),
			radius: 5.0,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
		}
	}

	fn fixed_options(log: Arc<Mutex<Vec<&'static str>>>) -> GraphOptions {
		GraphOptions {
			simulation_factory: Some(Arc::new(
				move |_: &GraphData, _: &GraphOptions| -> Result<Box<dyn Simulation>, GraphError> {
					Ok(Box::new(FixedSimulation {
						nodes: vec![at("a", 10.0, 20.0), at("b", 30.0, 40.0)],
						links: vec![SimLink {
							source: at("a", 10.0, 20.0),
							target: at("b", 30.0, 40.0),
							value: 4.0,
						}],
						log: log.clone(),
					}))
				},
			)),
			..Default::default()
		}
	}

	#[test]
	fn link_stroke_width_is_sqrt_of_value() {
		let scene = build_scene(&pair(), &GraphOptions::default()).unwrap();
		assert_eq!(scene.links.len(), 1);
		assert_eq!(scene.links[0].id, "a=>b");
		assert_eq!(scene.links[0].stroke_width, 2.0);
	}

	#[test]
	fn factory_simulation_is_settled_by_renderer() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let scene = build_scene(&pair(), &fixed_options(log.clone())).unwrap();

		let log = log.lock().unwrap();
		assert_eq!(log.first(), Some(&"restart"));
		assert_eq!(log.last(), Some(&"stop"));
		assert_eq!(log.iter().filter(|s| **s == "tick").count(), DEFAULT_STEPS);

		assert_eq!((scene.nodes[0].x, scene.nodes[0].y), (10.0, 20.0));
		let line = &scene.links[0];
		assert_eq!((line.x1, line.y1, line.x2, line.y2), (10.0, 20.0, 30.0, 40.0));
	}

	#[test]
	fn nodes_carry_hydrated_styling() {
		let mut data = pair();
		data.nodes[1].color = Some("tomato".into());
		let log = Arc::new(Mutex::new(Vec::new()));
		let scene = build_scene(&data, &fixed_options(log)).unwrap();

		assert_eq!(scene.nodes[0].record.color, "#333");
		assert_eq!(scene.nodes[1].record.color, "tomato");
		assert_eq!(scene.links[0].record.opacity, 0.6);
	}

	#[test]
	fn labels_hidden_by_default() {
		let scene = build_scene(&pair(), &GraphOptions::default()).unwrap();
		assert!(scene.labels.is_empty());
	}

	#[test]
	fn global_flag_shows_every_label() {
		let options = GraphOptions {
			show_labels: true,
			..Default::default()
		};
		let scene = build_scene(&pair(), &options).unwrap();
		assert_eq!(scene.labels.len(), 2);
	}

	#[test]
	fn per_node_flag_shows_one_label_at_default_offset() {
		let mut data = pair();
		data.nodes[0].show_label = Some(true);
		data.nodes[0].radius = Some(8.0);
		let log = Arc::new(Mutex::new(Vec::new()));
		let scene = build_scene(&data, &fixed_options(log)).unwrap();

		assert_eq!(scene.labels.len(), 1);
		let label = &scene.labels[0];
		assert_eq!(label.text, "a");
		assert_eq!((label.x, label.y), (10.0 + 4.0, 20.0 - 2.0));
	}

	#[test]
	fn label_attr_and_offset_are_configurable() {
		let mut data = pair();
		data.nodes[0]
			.extra
			.insert("name".into(), serde_json::Value::String("Alpha".into()));
		let log = Arc::new(Mutex::new(Vec::new()));
		let options = GraphOptions {
			show_labels: true,
			label_attr: "name".into(),
			label_offset: LabelOffset {
				x: Arc::new(|_: &NodeRecord| 0.0),
				y: Arc::new(|n: &NodeRecord| n.radius * 2.0),
			},
			..fixed_options(log)
		};
		let scene = build_scene(&data, &options).unwrap();
		let label = scene.label("a").unwrap();
		assert_eq!(label.text, "Alpha");
		assert_eq!((label.x, label.y), (10.0, 30.0));
		assert_eq!(scene.label("b").unwrap().text, "");
	}

	#[test]
	fn unknown_endpoint_surfaces_as_error() {
		let data = GraphData {
			nodes: vec![Node::new("a")],
			links: vec![Link::new("a", "b")],
		};
		assert!(matches!(
			build_scene(&data, &GraphOptions::default()),
			Err(GraphError::UnknownNode { .. })
		));
	}

	#[test]
	fn repeated_links_draw_once() {
		let data = GraphData {
			nodes: vec![Node::new("a"), Node::new("b"), Node::new("c")],
			links: vec![
				Link::new("a", "b"),
				Link::new("b", "c"),
				Link::new("a", "b").with_value(9.0),
			],
		};
		let scene = build_scene(&data, &GraphOptions::default()).unwrap();
		let ids: Vec<_> = scene.links.iter().map(|l| l.id.as_str()).collect();
		assert_eq!(ids, vec!["b=>c", "a=>b"]);
		assert_eq!(scene.link("a=>b").unwrap().stroke_width, 3.0);
	}

	#[test]
	fn simulation_input_ignores_styling() {
		let mut styled = pair();
		styled.nodes[0].opacity = Some(0.25);
		styled.nodes[1].show_label = Some(true);
		styled.links[0].opacity = Some(0.1);
		assert_eq!(SimulationInput::from(&pair()), SimulationInput::from(&styled));

		styled.nodes[0].radius = Some(9.0);
		assert_ne!(SimulationInput::from(&pair()), SimulationInput::from(&styled));
	}
}
