//! Force-directed graph visualization components.
//!
//! Lays out a graph with a force simulation settled synchronously per render,
//! then draws it as SVG:
//! - [`ForceGraph`] renders links, nodes and labels with raw hover/blur/click
//!   callbacks
//! - [`InteractiveForceGraph`] adds hover and selection highlighting on top
//!
//! # Example
//!
//! ```ignore
//! use force_graph_view::{GraphData, InteractiveForceGraph, Link, Node};
//!
//! let data = GraphData {
//!     nodes: vec![Node::new("a"), Node::new("b")],
//!     links: vec![Link::new("a", "b").with_value(4.0)],
//! };
//!
//! view! { <InteractiveForceGraph data=Signal::derive(move || data.clone()) /> }
//! ```

mod component;
pub mod error;
pub mod identity;
mod interactive;
pub mod render;
pub mod simulation;
pub mod state;
mod types;

pub use component::ForceGraph;
pub use error::GraphError;
pub use interactive::InteractiveForceGraph;
pub use render::{GraphOptions, LabelOffset, Scene, build_scene};
pub use simulation::{Simulation, SimulationOptions, create_simulation, run_simulation};
pub use state::{InteractionState, Transition};
pub use types::{GraphData, Link, LinkDefaults, LinkRecord, Node, NodeDefaults, NodeRecord};
