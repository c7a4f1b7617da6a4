//! Hover and select behaviour layered over [`ForceGraph`].
//!
//! Caller data is never mutated: the component keeps an [`InteractionState`],
//! derives a restyled copy of the data from it and hands that to the static
//! graph. Every handler it installs updates the state first, then forwards the
//! same node to the caller's own handler.

use leptos::prelude::*;
use log::debug;

use super::component::ForceGraph;
use super::identity::Defaults;
use super::render::GraphOptions;
use super::state::{
	DEFAULT_OPACITY_FACTOR, InteractionEvent, InteractionState, apply_overlay, dispatch, forward,
};
use super::types::{GraphData, NodeRecord};

/// A force graph that highlights the hovered and selected nodes.
///
/// Hovering or selecting a node shows its label and dims every other node and
/// all links by `opacity_factor`. Clicking a node (or its label) selects it;
/// clicking the selected node again deselects it.
#[component]
pub fn InteractiveForceGraph(
	/// Nodes and links to draw. Never mutated.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Passed through to [`ForceGraph`].
	#[prop(optional)]
	options: GraphOptions,
	/// Id of the node selected on mount.
	#[prop(optional, into)]
	default_selected_node: Option<String>,
	/// Divisor for unfocused opacity.
	#[prop(default = DEFAULT_OPACITY_FACTOR)]
	opacity_factor: f64,
	/// A node became selected.
	#[prop(optional)]
	on_select_node: Option<Callback<NodeRecord>>,
	/// The selected node was clicked again.
	#[prop(optional)]
	on_deselect_node: Option<Callback<NodeRecord>>,
	/// Called after the hover state is updated.
	#[prop(optional)]
	on_hover_node: Option<Callback<NodeRecord>>,
	/// Called after the hover state is cleared.
	#[prop(optional)]
	on_blur_node: Option<Callback<NodeRecord>>,
	/// Called after a node click is applied.
	#[prop(optional)]
	on_click_node: Option<Callback<NodeRecord>>,
	/// Called after a label click is applied.
	#[prop(optional)]
	on_click_label: Option<Callback<NodeRecord>>,
) -> impl IntoView {
	let node_defaults = options.node_defaults.clone();
	let link_defaults = options.link_defaults.clone();

	let initial = default_selected_node.and_then(|id| {
		data.with_untracked(|d| d.node(&id).map(|node| node_defaults.merge(node)))
	});
	let state = RwSignal::new(InteractionState::new(initial));

	let styled = Signal::derive(move || {
		state.with(|s| {
			data.with(|d| apply_overlay(d, s, opacity_factor, &node_defaults, &link_defaults))
		})
	});

	let internal = move |event: InteractionEvent| {
		dispatch(
			event,
			|e| {
				let mut transition = None;
				state.update(|s| transition = s.apply(e));
				transition
			},
			|node| {
				debug!("selected {}", node.id);
				if let Some(cb) = on_select_node {
					cb.run(node);
				}
			},
			|node| {
				debug!("deselected {}", node.id);
				if let Some(cb) = on_deselect_node {
					cb.run(node);
				}
			},
		);
	};
	let caller = |cb: Option<Callback<NodeRecord>>| cb.map(|cb| move |node: NodeRecord| cb.run(node));

	let on_hover = Callback::new(forward(
		InteractionEvent::HoverEnter,
		internal,
		caller(on_hover_node),
	));
	let on_blur = Callback::new(forward(
		|_| InteractionEvent::HoverLeave,
		internal,
		caller(on_blur_node),
	));
	let on_click = Callback::new(forward(
		InteractionEvent::Click,
		internal,
		caller(on_click_node),
	));
	let on_label = Callback::new(forward(
		InteractionEvent::Click,
		internal,
		caller(on_click_label),
	));

	view! {
		<ForceGraph
			data=styled
			options=options
			on_hover_node=on_hover
			on_blur_node=on_blur
			on_click_node=on_click
			on_click_label=on_label
		/>
	}
}
