//! Error type for graph data entering the component.

use thiserror::Error;

/// Failures raised while validating graph data or building a simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
	/// Two nodes share the same id.
	#[error("duplicate node id `{0}`")]
	DuplicateNode(String),
	/// A link endpoint names a node that does not exist.
	#[error("link `{link}` references unknown node `{node}`")]
	UnknownNode {
		/// Id of the offending link.
		link: String,
		/// The missing node id.
		node: String,
	},
	/// A numeric attribute is NaN or infinite.
	#[error("{field} of `{id}` must be finite, got {value}")]
	InvalidNumber {
		/// Node or link id.
		id: String,
		/// Attribute name as written in JSON.
		field: &'static str,
		/// The rejected value.
		value: f64,
	},
	/// Graph JSON could not be parsed.
	#[error("invalid graph data: {0}")]
	Parse(String),
}

impl From<serde_json::Error> for GraphError {
	fn from(e: serde_json::Error) -> Self {
		GraphError::Parse(e.to_string())
	}
}
