//! Leptos component rendering a settled force graph as SVG.
//!
//! The settled layout is memoized on the physics input (node ids and radii,
//! link endpoints and weights), so styling-only updates reuse positions
//! instead of re-running the simulation. Each layer is a keyed `<For>` list
//! so elements keep their identity across renders; attributes read the
//! current [`Scene`] reactively.

use leptos::prelude::*;
use log::warn;

use super::render::{
	GraphOptions, LinkLine, NodeCircle, NodeLabel, Scene, SimulationInput, compose_scene, settle,
};
use super::types::{GraphData, NodeRecord};

/// Callbacks attached to one element kind.
#[derive(Clone, Copy)]
struct NodeHandlers {
	hover: Option<Callback<NodeRecord>>,
	blur: Option<Callback<NodeRecord>>,
	click: Option<Callback<NodeRecord>>,
}

fn fire(callback: Option<Callback<NodeRecord>>, node: NodeRecord) {
	if let Some(cb) = callback {
		cb.run(node);
	}
}

/// Renders a force-directed graph as static SVG primitives.
///
/// Positions come from a simulation settled synchronously on each data
/// change. Node circles and labels report hover, blur and click with the
/// node's hydrated [`NodeRecord`].
#[component]
pub fn ForceGraph(
	/// Nodes and links to draw.
	#[prop(into)]
	data: Signal<GraphData>,
	/// Size, physics and label configuration.
	#[prop(optional)]
	options: GraphOptions,
	/// Pointer entered a node or label.
	#[prop(optional)]
	on_hover_node: Option<Callback<NodeRecord>>,
	/// Pointer left a node or label.
	#[prop(optional)]
	on_blur_node: Option<Callback<NodeRecord>>,
	/// A node circle was clicked.
	#[prop(optional)]
	on_click_node: Option<Callback<NodeRecord>>,
	/// A label was clicked.
	#[prop(optional)]
	on_click_label: Option<Callback<NodeRecord>>,
) -> impl IntoView {
	let (width, height) = (options.width, options.height);

	let sim_input = Memo::new(move |_| data.with(|d| SimulationInput::from(d)));
	let layout_options = options.clone();
	let layout = Memo::new(move |_| {
		sim_input.track();
		data.with_untracked(|d| settle(d, &layout_options))
	});

	let scene = Memo::new(move |_| {
		layout.with(|result| match result {
			Ok(settled) => data.with(|d| compose_scene(d, &options, settled)),
			Err(e) => {
				warn!("force graph: {}", e);
				Scene::empty(width, height)
			}
		})
	});

	let node_handlers = NodeHandlers {
		hover: on_hover_node,
		blur: on_blur_node,
		click: on_click_node,
	};
	let label_handlers = NodeHandlers {
		click: on_click_label,
		..node_handlers
	};

	view! {
		<svg
			class="force-graph"
			width=width.to_string()
			height=height.to_string()
			viewBox=format!("0 0 {} {}", width, height)
		>
			<g class="force-graph-links">
				<For
					each=move || scene.with(|s| s.links.clone())
					key=|line: &LinkLine| line.id.clone()
					children=move |line| link_view(scene, line)
				/>
			</g>
			<g class="force-graph-nodes">
				<For
					each=move || scene.with(|s| s.nodes.clone())
					key=|circle: &NodeCircle| circle.record.id.clone()
					children=move |circle| node_view(scene, circle, node_handlers)
				/>
			</g>
			<g class="force-graph-labels">
				<For
					each=move || scene.with(|s| s.labels.clone())
					key=|label: &NodeLabel| label.record.id.clone()
					children=move |label| label_view(scene, label, label_handlers)
				/>
			</g>
		</svg>
	}
}

fn link_view(scene: Memo<Scene>, line: LinkLine) -> impl IntoView {
	let id = line.id.clone();
	let current = Memo::new(move |_| {
		scene
			.with(|s| s.link(&id).cloned())
			.unwrap_or_else(|| line.clone())
	});

	view! {
		<line
			class=move || current.with(|l| l.record.class_name.clone().unwrap_or_default())
			x1=move || current.with(|l| l.x1.to_string())
			y1=move || current.with(|l| l.y1.to_string())
			x2=move || current.with(|l| l.x2.to_string())
			y2=move || current.with(|l| l.y2.to_string())
			stroke=move || current.with(|l| l.record.color.clone())
			stroke-width=move || current.with(|l| l.stroke_width.to_string())
			stroke-opacity=move || current.with(|l| l.record.opacity.to_string())
			style=move || current.with(|l| l.record.style.clone().unwrap_or_default())
		/>
	}
}

fn node_view(scene: Memo<Scene>, circle: NodeCircle, handlers: NodeHandlers) -> impl IntoView {
	let id = circle.record.id.clone();
	let current = Memo::new(move |_| {
		scene
			.with(|s| s.node(&id).cloned())
			.unwrap_or_else(|| circle.clone())
	});
	let record = move || current.with_untracked(|c| c.record.clone());

	view! {
		<circle
			class=move || current.with(|c| c.record.class_name.clone().unwrap_or_default())
			cx=move || current.with(|c| c.x.to_string())
			cy=move || current.with(|c| c.y.to_string())
			r=move || current.with(|c| c.record.radius.to_string())
			fill=move || current.with(|c| c.record.color.clone())
			stroke=move || current.with(|c| c.record.stroke.clone())
			stroke-width=move || current.with(|c| c.record.stroke_width.to_string())
			opacity=move || current.with(|c| c.record.opacity.to_string())
			style=move || current.with(|c| c.record.style.clone().unwrap_or_default())
			on:mouseenter=move |_| fire(handlers.hover, record())
			on:mouseleave=move |_| fire(handlers.blur, record())
			on:click=move |_| fire(handlers.click, record())
		/>
	}
}

fn label_view(scene: Memo<Scene>, label: NodeLabel, handlers: NodeHandlers) -> impl IntoView {
	let id = label.record.id.clone();
	let current = Memo::new(move |_| {
		scene
			.with(|s| s.label(&id).cloned())
			.unwrap_or_else(|| label.clone())
	});
	let record = move || current.with_untracked(|l| l.record.clone());

	view! {
		<text
			class="force-graph-label"
			x=move || current.with(|l| l.x.to_string())
			y=move || current.with(|l| l.y.to_string())
			opacity=move || current.with(|l| l.record.opacity.to_string())
			on:mouseenter=move |_| fire(handlers.hover, record())
			on:mouseleave=move |_| fire(handlers.blur, record())
			on:click=move |_| fire(handlers.click, record())
		>
			{move || current.with(|l| l.text.clone())}
		</text>
	}
}
