//! force-graph-view: force-directed graph components for Leptos.
//!
//! This crate provides SVG graph components whose layout comes from a force
//! simulation settled synchronously per render, plus an interactive wrapper
//! that highlights hovered and selected nodes.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{
	ForceGraph, GraphData, GraphError, GraphOptions, InteractiveForceGraph, Link, Node,
	NodeRecord, SimulationOptions,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("force-graph-view: logging initialized");
}

/// Text content of the `<script>` element with the given id.
fn script_text(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...] }
pub fn load_graph_data() -> Option<GraphData> {
	let json_text = script_text("graph-data")?;

	match GraphData::from_json(&json_text) {
		Ok(data) => {
			info!(
				"force-graph-view: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("force-graph-view: rejected graph data: {}", e);
			None
		}
	}
}

/// Load JSON configuration from a script element, if present and valid.
fn load_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let json_text = script_text(id)?;
	serde_json::from_str(&json_text)
		.inspect_err(|e| warn!("force-graph-view: ignoring #{}: {}", id, e))
		.ok()
}

/// Sample tree used when the page embeds no graph data.
fn sample_data(n: usize) -> GraphData {
	let nodes = (0..n)
		.map(|i| Node {
			group: Some(format!("g{}", i % 5)),
			show_label: (i == 0).then_some(true),
			..Node::new(format!("n{}", i))
		})
		.collect();

	let links = (1..n)
		.map(|i| {
			let parent = (rand_simple(i) * i as f64) as usize;
			Link::new(format!("n{}", i), format!("n{}", parent)).with_value((1 + i % 4) as f64)
		})
		.collect();

	GraphData { nodes, links }
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

/// Main application component.
/// Loads graph data from DOM and renders the interactive graph.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_else(|| sample_data(40));
	let graph_signal = Signal::derive(move || graph_data.clone());
	let options = GraphOptions {
		simulation: load_json::<SimulationOptions>("graph-options").unwrap_or_default(),
		..Default::default()
	};

	let selected = RwSignal::new(Option::<String>::None);
	let on_select = Callback::new(move |node: NodeRecord| selected.set(Some(node.id)));
	let on_deselect = Callback::new(move |_: NodeRecord| selected.set(None));

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Force Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="graph-page">
			<InteractiveForceGraph
				data=graph_signal
				options=options
				on_select_node=on_select
				on_deselect_node=on_deselect
			/>
			<div class="graph-overlay">
				<h1>"Force Graph"</h1>
				<p class="subtitle">
					{move || match selected.get() {
						Some(id) => format!("Selected: {}", id),
						None => "Hover to highlight. Click to select.".to_string(),
					}}
				</p>
			</div>
		</div>
	}
}
