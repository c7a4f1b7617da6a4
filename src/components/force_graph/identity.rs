//! Stable identifiers for nodes and links, and default merging keyed by them.

use std::collections::HashMap;

/// Anything that carries a node id.
pub trait NodeIdentity {
	/// The node's id.
	fn id(&self) -> &str;
}

/// Anything with source and target node ids.
///
/// Implemented both by raw [`Link`](super::types::Link)s and by the resolved
/// links a simulation holds, so [`link_id`] agrees across the two shapes.
pub trait LinkEnds {
	/// Id of the source node.
	fn source_id(&self) -> &str;
	/// Id of the target node.
	fn target_id(&self) -> &str;
}

/// Fills unset visual attributes of an item from a default record.
pub trait Defaults<T> {
	/// The fully resolved form of `T`.
	type Record;

	/// Build the record for `item`. Fields the item sets win over defaults.
	fn merge(&self, item: &T) -> Self::Record;
}

/// The node's id, unchanged.
pub fn node_id<N: NodeIdentity + ?Sized>(node: &N) -> String {
	node.id().to_string()
}

/// `"{source}=>{target}"`.
pub fn link_id<L: LinkEnds + ?Sized>(link: &L) -> String {
	format!("{}=>{}", link.source_id(), link.target_id())
}

/// Merge `defaults` under every item, keyed by `id`.
///
/// Items sharing an id collide; the last one wins.
pub fn merge_defaults<T, D>(
	items: &[T],
	id: impl Fn(&T) -> String,
	defaults: &D,
) -> HashMap<String, D::Record>
where
	D: Defaults<T>,
{
	items
		.iter()
		.map(|item| (id(item), defaults.merge(item)))
		.collect()
}

/// A simulation-produced item paired with the styling record of the same id.
///
/// The record's fields take precedence; the item only contributes what the
/// record lacks (its position).
#[derive(Clone, Debug, PartialEq)]
pub struct Hydrated<'a, T, R> {
	/// What the simulation produced.
	pub item: &'a T,
	/// Styling for the same id.
	pub record: &'a R,
}

/// Look up the record for `item` in `map`. `None` if the id has no record.
pub fn hydrate<'a, T, R>(
	item: &'a T,
	id: impl Fn(&T) -> String,
	map: &'a HashMap<String, R>,
) -> Option<Hydrated<'a, T, R>> {
	map.get(&id(item)).map(|record| Hydrated { item, record })
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::simulation::{SimLink, SimNode};
	use crate::components::force_graph::types::{Link, LinkDefaults, Node, NodeDefaults};

	fn sim_node(id: &str) -> SimNode {
		SimNode {
			id: id.into(),
			radius: 5.0,
			x: 1.0,
			y: 2.0,
			vx: 0.0,
			vy: 0.0,
		}
	}

	#[test]
	fn node_id_is_unmodified() {
		assert_eq!(node_id(&Node::new(" a b ")), " a b ");
	}

	#[test]
	fn link_id_matches_across_shapes() {
		let raw = Link::new("a", "b");
		let resolved = SimLink {
			source: sim_node("a"),
			target: sim_node("b"),
			value: 1.0,
		};
		assert_eq!(link_id(&raw), "a=>b");
		assert_eq!(link_id(&raw), link_id(&resolved));
	}

	#[test]
	fn merge_defaults_is_last_write_wins() {
		let nodes = vec![
			Node {
				color: Some("red".into()),
				..Node::new("a")
			},
			Node::new("b"),
			Node {
				color: Some("blue".into()),
				..Node::new("a")
			},
		];
		let map = merge_defaults(&nodes, node_id, &NodeDefaults::default());
		assert_eq!(map.len(), 2);
		assert_eq!(map["a"].color, "blue");
		assert_eq!(map["b"].color, "#333");
	}

	#[test]
	fn merge_defaults_keys_links_by_endpoints() {
		let links = vec![Link::new("a", "b").with_value(9.0)];
		let map = merge_defaults(&links, link_id, &LinkDefaults::default());
		assert_eq!(map["a=>b"].value, 9.0);
		assert_eq!(map["a=>b"].opacity, 0.6);
	}

	#[test]
	fn hydrate_pairs_item_with_record() {
		let map = merge_defaults(&[Node::new("a")], node_id, &NodeDefaults::default());
		let item = sim_node("a");
		let hydrated = hydrate(&item, |n: &SimNode| n.id.clone(), &map).unwrap();
		assert_eq!(hydrated.item.x, 1.0);
		assert_eq!(hydrated.record.radius, 5.0);

		let stray = sim_node("zz");
		assert!(hydrate(&stray, |n: &SimNode| n.id.clone(), &map).is_none());
	}
}
