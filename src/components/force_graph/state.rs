//! Selection and hover tracking for the interactive graph.
//!
//! The state is a plain value driven by a reducer: the component feeds it
//! [`InteractionEvent`]s from the view and fires the caller's select/deselect
//! callbacks from the returned [`Transition`]. Styling derived from it is
//! recomputed on every render by [`apply_overlay`] and never stored.

use super::types::{GraphData, LinkDefaults, NodeDefaults, NodeRecord};

/// Divisor applied to unfocused opacity while a node is selected or hovered.
pub const DEFAULT_OPACITY_FACTOR: f64 = 4.0;

/// Pointer interactions with a node or its label.
#[derive(Clone, Debug, PartialEq)]
pub enum InteractionEvent {
	/// The pointer entered a node or its label.
	HoverEnter(NodeRecord),
	/// The pointer left whatever it was hovering.
	HoverLeave,
	/// A click on a node's circle or its label.
	Click(NodeRecord),
}

/// A selection change the caller should be told about.
#[derive(Clone, Debug, PartialEq)]
pub enum Transition {
	/// The node became the selection.
	Selected(NodeRecord),
	/// The node was selected and has been clicked again.
	Deselected(NodeRecord),
}

/// At most one selected and one hovered node, compared by id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
	/// Toggled by clicks.
	pub selected: Option<NodeRecord>,
	/// Set while the pointer is over a node.
	pub hovered: Option<NodeRecord>,
}

impl InteractionState {
	/// Nothing hovered, `default_selected` selected.
	pub fn new(default_selected: Option<NodeRecord>) -> Self {
		Self {
			selected: default_selected,
			hovered: None,
		}
	}

	/// Fold one event into the state, reporting any selection change.
	pub fn apply(&mut self, event: InteractionEvent) -> Option<Transition> {
		match event {
			InteractionEvent::HoverEnter(node) => {
				self.hovered = Some(node);
				None
			}
			InteractionEvent::HoverLeave => {
				self.hovered = None;
				None
			}
			InteractionEvent::Click(node) => {
				if self.is_selected(&node.id) {
					self.selected = None;
					Some(Transition::Deselected(node))
				} else {
					self.selected = Some(node.clone());
					Some(Transition::Selected(node))
				}
			}
		}
	}

	/// Whether the selected node has `id`.
	pub fn is_selected(&self, id: &str) -> bool {
		self.selected.as_ref().is_some_and(|n| n.id == id)
	}

	/// Whether the hovered node has `id`.
	pub fn is_hovered(&self, id: &str) -> bool {
		self.hovered.as_ref().is_some_and(|n| n.id == id)
	}

	/// Selected or hovered.
	pub fn is_highlighted(&self, id: &str) -> bool {
		self.is_selected(id) || self.is_hovered(id)
	}

	/// Whether any node is selected or hovered.
	pub fn has_focus(&self) -> bool {
		self.selected.is_some() || self.hovered.is_some()
	}
}

/// Apply `event` through `update`, then report the resulting transition.
///
/// `update` folds the event into wherever the state lives and returns what
/// [`InteractionState::apply`] reported. Callbacks run after it returns, so
/// they may read the new state.
pub fn dispatch(
	event: InteractionEvent,
	update: impl FnOnce(InteractionEvent) -> Option<Transition>,
	on_select: impl FnOnce(NodeRecord),
	on_deselect: impl FnOnce(NodeRecord),
) {
	match update(event) {
		Some(Transition::Selected(node)) => on_select(node),
		Some(Transition::Deselected(node)) => on_deselect(node),
		None => {}
	}
}

/// Wrap a node handler so the event built by `event` reaches `internal`
/// before `caller` sees the same node.
pub fn forward<I, C>(
	event: fn(NodeRecord) -> InteractionEvent,
	internal: I,
	caller: Option<C>,
) -> impl Fn(NodeRecord)
where
	I: Fn(InteractionEvent),
	C: Fn(NodeRecord),
{
	move |node: NodeRecord| {
		internal(event(node.clone()));
		if let Some(caller) = &caller {
			caller(node);
		}
	}
}

/// Copy `data` with labels and opacities adjusted for the current focus.
///
/// Highlighted nodes show their label. While anything is focused, every
/// other node and every link has its opacity divided by `opacity_factor`.
pub fn apply_overlay(
	data: &GraphData,
	state: &InteractionState,
	opacity_factor: f64,
	node_defaults: &NodeDefaults,
	link_defaults: &LinkDefaults,
) -> GraphData {
	let focused = state.has_focus();

	let nodes = data
		.nodes
		.iter()
		.map(|node| {
			let mut node = node.clone();
			if state.is_highlighted(&node.id) {
				node.show_label = Some(true);
			} else if focused {
				let base = node.opacity.unwrap_or(node_defaults.opacity);
				node.opacity = Some(base / opacity_factor);
			}
			node
		})
		.collect();

	let links = data
		.links
		.iter()
		.map(|link| {
			let mut link = link.clone();
			if focused {
				let base = link.opacity.unwrap_or(link_defaults.opacity);
				link.opacity = Some(base / opacity_factor);
			}
			link
		})
		.collect();

	GraphData { nodes, links }
}
