//! Graph data structures for input to the force graph component.
//!
//! [`Node`] and [`Link`] are what callers hand in: every visual attribute is
//! optional. [`NodeRecord`] and [`LinkRecord`] are the hydrated forms produced
//! by merging a [`NodeDefaults`] / [`LinkDefaults`] underneath them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::GraphError;
use super::identity::{Defaults, LinkEnds, NodeIdentity, link_id};

/// A node in the graph.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Optional group name, carried through to the hydrated record.
	pub group: Option<String>,
	/// Circle radius.
	pub radius: Option<f64>,
	/// Fill and stroke opacity in `0.0..=1.0`.
	pub opacity: Option<f64>,
	/// CSS fill color.
	pub color: Option<String>,
	/// CSS stroke color.
	pub stroke: Option<String>,
	/// Stroke width in pixels.
	pub stroke_width: Option<f64>,
	/// Render this node's label even when labels are globally hidden.
	pub show_label: Option<bool>,
	/// CSS class added to the node's circle.
	pub class_name: Option<String>,
	/// Inline style applied to the node's circle.
	pub style: Option<String>,
	/// Any other fields, available to `label_attr`.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl Node {
	/// A node with the given id and nothing else set.
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Default::default()
		}
	}
}

/// An edge between two nodes, referenced by id.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Edge weight. Rendered stroke width is `sqrt(value)`.
	pub value: Option<f64>,
	/// Stroke opacity.
	pub opacity: Option<f64>,
	/// CSS stroke color.
	pub color: Option<String>,
	/// CSS class added to the line.
	pub class_name: Option<String>,
	/// Inline style applied to the line.
	pub style: Option<String>,
}

impl Link {
	/// A link between two node ids with nothing else set.
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			..Default::default()
		}
	}

	/// Set the edge weight.
	pub fn with_value(mut self, value: f64) -> Self {
		self.value = Some(value);
		self
	}
}

/// Complete graph data: nodes and links.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct GraphData {
	/// All nodes, ids unique.
	pub nodes: Vec<Node>,
	/// Edges by node id.
	pub links: Vec<Link>,
}

impl GraphData {
	/// Parse graph JSON (`{ "nodes": [...], "links": [...] }`) and validate it.
	pub fn from_json(text: &str) -> Result<Self, GraphError> {
		let data: GraphData = serde_json::from_str(text)?;
		data.validate()?;
		Ok(data)
	}

	/// The node with `id`, if any.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Check data that crossed in from an untyped source.
	///
	/// Rejects duplicate node ids, links whose endpoints are not nodes, and
	/// non-finite numeric attributes. Duplicate links are allowed.
	pub fn validate(&self) -> Result<(), GraphError> {
		let mut ids = HashSet::with_capacity(self.nodes.len());
		for node in &self.nodes {
			if !ids.insert(node.id.as_str()) {
				return Err(GraphError::DuplicateNode(node.id.clone()));
			}
			check_finite(&node.id, "radius", node.radius)?;
			check_finite(&node.id, "opacity", node.opacity)?;
			check_finite(&node.id, "strokeWidth", node.stroke_width)?;
		}

		for link in &self.links {
			for end in [&link.source, &link.target] {
				if !ids.contains(end.as_str()) {
					return Err(GraphError::UnknownNode {
						link: link_id(link),
						node: end.clone(),
					});
				}
			}
			check_finite(&link_id(link), "value", link.value)?;
			check_finite(&link_id(link), "opacity", link.opacity)?;
		}
		Ok(())
	}
}

fn check_finite(id: &str, field: &'static str, value: Option<f64>) -> Result<(), GraphError> {
	match value {
		Some(v) if !v.is_finite() => Err(GraphError::InvalidNumber {
			id: id.to_string(),
			field,
			value: v,
		}),
		_ => Ok(()),
	}
}

/// A node with every visual attribute resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
	/// Node id.
	pub id: String,
	/// Group name, if the node had one.
	pub group: Option<String>,
	/// Circle radius.
	pub radius: f64,
	/// Fill and stroke opacity.
	pub opacity: f64,
	/// Fill color.
	pub color: String,
	/// Stroke color.
	pub stroke: String,
	/// Stroke width.
	pub stroke_width: f64,
	/// Whether the label is drawn.
	pub show_label: bool,
	/// CSS class, passed through.
	pub class_name: Option<String>,
	/// Inline style, passed through.
	pub style: Option<String>,
	/// Unrecognised input fields.
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl NodeRecord {
	/// Text shown for this node when `attr` selects the label field.
	///
	/// `id` and `group` read the typed fields; anything else is looked up in
	/// the extra fields. Missing fields give an empty label.
	pub fn label(&self, attr: &str) -> String {
		match attr {
			"id" => self.id.clone(),
			"group" => self.group.clone().unwrap_or_default(),
			other => match self.extra.get(other) {
				Some(Value::String(s)) => s.clone(),
				Some(Value::Null) | None => String::new(),
				Some(v) => v.to_string(),
			},
		}
	}
}

/// A link with every visual attribute resolved.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Edge weight.
	pub value: f64,
	/// Stroke opacity.
	pub opacity: f64,
	/// Stroke color.
	pub color: String,
	/// CSS class, passed through.
	pub class_name: Option<String>,
	/// Inline style, passed through.
	pub style: Option<String>,
}

/// Visual attributes applied to nodes that do not set their own.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeDefaults {
	/// Circle radius.
	pub radius: f64,
	/// Fill and stroke opacity.
	pub opacity: f64,
	/// Fill color.
	pub color: String,
	/// Stroke color.
	pub stroke: String,
	/// Stroke width.
	pub stroke_width: f64,
	/// Draw labels for nodes that do not say otherwise.
	pub show_label: bool,
}

impl Default for NodeDefaults {
	fn default() -> Self {
		Self {
			radius: 5.0,
			opacity: 1.0,
			color: "#333".to_string(),
			stroke: "#fff".to_string(),
			stroke_width: 1.5,
			show_label: false,
		}
	}
}

impl Defaults<Node> for NodeDefaults {
	type Record = NodeRecord;

	fn merge(&self, node: &Node) -> NodeRecord {
		NodeRecord {
			id: node.id.clone(),
			group: node.group.clone(),
			radius: node.radius.unwrap_or(self.radius),
			opacity: node.opacity.unwrap_or(self.opacity),
			color: node.color.clone().unwrap_or_else(|| self.color.clone()),
			stroke: node.stroke.clone().unwrap_or_else(|| self.stroke.clone()),
			stroke_width: node.stroke_width.unwrap_or(self.stroke_width),
			show_label: node.show_label.unwrap_or(self.show_label),
			class_name: node.class_name.clone(),
			style: node.style.clone(),
			extra: node.extra.clone(),
		}
	}
}

/// Visual attributes applied to links that do not set their own.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinkDefaults {
	/// Edge weight.
	pub value: f64,
	/// Stroke opacity.
	pub opacity: f64,
	/// Stroke color.
	pub color: String,
}

impl Default for LinkDefaults {
	fn default() -> Self {
		Self {
			value: 1.0,
			opacity: 0.6,
			color: "#999".to_string(),
		}
	}
}

impl Defaults<Link> for LinkDefaults {
	type Record = LinkRecord;

	fn merge(&self, link: &Link) -> LinkRecord {
		LinkRecord {
			source: link.source.clone(),
			target: link.target.clone(),
			value: link.value.unwrap_or(self.value),
			opacity: link.opacity.unwrap_or(self.opacity),
			color: link.color.clone().unwrap_or_else(|| self.color.clone()),
			class_name: link.class_name.clone(),
			style: link.style.clone(),
		}
	}
}

impl NodeIdentity for Node {
	fn id(&self) -> &str {
		&self.id
	}
}

impl NodeIdentity for NodeRecord {
	fn id(&self) -> &str {
		&self.id
	}
}

impl LinkEnds for Link {
	fn source_id(&self) -> &str {
		&self.source
	}

	fn target_id(&self) -> &str {
		&self.target
	}
}

impl LinkEnds for LinkRecord {
	fn source_id(&self) -> &str {
		&self.source
	}

	fn target_id(&self) -> &str {
		&self.target
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn bare_node_hydrates_to_default_record() {
		let record = NodeDefaults::default().merge(&Node::new("a"));
		assert_eq!(
			record,
			NodeRecord {
				id: "a".into(),
				group: None,
				radius: 5.0,
				opacity: 1.0,
				color: "#333".into(),
				stroke: "#fff".into(),
				stroke_width: 1.5,
				show_label: false,
				class_name: None,
				style: None,
				extra: Map::new(),
			}
		);
	}

	#[test]
	fn node_fields_override_defaults() {
		let node = Node {
			radius: Some(12.0),
			color: Some("red".into()),
			show_label: Some(true),
			..Node::new("a")
		};
		let record = NodeDefaults::default().merge(&node);
		assert_eq!(record.radius, 12.0);
		assert_eq!(record.color, "red");
		assert!(record.show_label);
		assert_eq!(record.stroke, "#fff");
	}

	#[test]
	fn bare_link_hydrates_to_default_record() {
		let record = LinkDefaults::default().merge(&Link::new("a", "b"));
		assert_eq!(record.value, 1.0);
		assert_eq!(record.opacity, 0.6);
		assert_eq!(record.color, "#999");
	}

	#[test]
	fn parses_extra_fields_and_camel_case() {
		let data = GraphData::from_json(
			&json!({
				"nodes": [
					{ "id": "a", "name": "Alpha", "showLabel": true, "strokeWidth": 2 },
					{ "id": "b", "weight": 3 }
				],
				"links": [{ "source": "a", "target": "b", "value": 4 }]
			})
			.to_string(),
		)
		.unwrap();

		let a = NodeDefaults::default().merge(&data.nodes[0]);
		assert_eq!(a.label("name"), "Alpha");
		assert_eq!(a.label("id"), "a");
		assert_eq!(a.stroke_width, 2.0);
		assert!(a.show_label);

		let b = NodeDefaults::default().merge(&data.nodes[1]);
		assert_eq!(b.label("weight"), "3");
		assert_eq!(b.label("missing"), "");
		assert_eq!(data.links[0].value, Some(4.0));
	}

	#[test]
	fn validate_rejects_duplicate_nodes() {
		let data = GraphData {
			nodes: vec![Node::new("a"), Node::new("a")],
			links: vec![],
		};
		assert_eq!(data.validate(), Err(GraphError::DuplicateNode("a".into())));
	}

	#[test]
	fn validate_rejects_unknown_endpoint() {
		let data = GraphData {
			nodes: vec![Node::new("a")],
			links: vec![Link::new("a", "z")],
		};
		assert_eq!(
			data.validate(),
			Err(GraphError::UnknownNode {
				link: "a=>z".into(),
				node: "z".into(),
			})
		);
	}

	#[test]
	fn validate_rejects_non_finite_numbers() {
		let data = GraphData {
			nodes: vec![Node {
				radius: Some(f64::NAN),
				..Node::new("a")
			}],
			links: vec![],
		};
		assert!(matches!(
			data.validate(),
			Err(GraphError::InvalidNumber { field: "radius", .. })
		));
	}

	#[test]
	fn validate_allows_duplicate_links() {
		let data = GraphData {
			nodes: vec![Node::new("a"), Node::new("b")],
			links: vec![Link::new("a", "b"), Link::new("a", "b")],
		};
		assert!(data.validate().is_ok());
	}

	#[test]
	fn raw_and_hydrated_links_share_an_id() {
		let link = Link::new("a", "b").with_value(3.0);
		let record = LinkDefaults::default().merge(&link);
		assert_eq!(link_id(&link), "a=>b");
		assert_eq!(link_id(&record), link_id(&link));
	}

	#[test]
	fn from_json_reports_parse_errors() {
		assert!(matches!(
			GraphData::from_json("{\"nodes\": 3}"),
			Err(GraphError::Parse(_))
		));
	}
}
