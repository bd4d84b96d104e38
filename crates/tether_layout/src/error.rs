//! Coordinator error types

use thiserror::Error;

use crate::tree::{NodeId, ViewId};

/// Errors raised while preparing, measuring or laying out a coordinator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordinatorError {
    /// No descendant of the container carries the anchor id
    #[error("Could not find descendant with id {anchor} to anchor node {child:?}")]
    AnchorNotFound { anchor: ViewId, child: NodeId },

    /// The anchor is the anchored node itself or nested inside it
    #[error("Anchor {anchor} must not be node {child:?} or one of its descendants")]
    CyclicAnchor { anchor: ViewId, child: NodeId },

    /// An anchor was changed after measurement began but before layout completed
    #[error("Anchor of node {child:?} changed after measurement began, before layout completed")]
    StaleAnchor { child: NodeId },

    /// Behaviors and anchors form a true dependency cycle
    #[error("Dependency cycle between children {nodes:?}")]
    DependencyCycle { nodes: Vec<NodeId> },

    /// A named behavior could not be constructed
    #[error("Could not instantiate behavior {name}: {reason}")]
    BehaviorInstantiation { name: String, reason: String },

    /// The node is not a direct child of the container
    #[error("Node {0:?} is not a child of this coordinator")]
    NotAChild(NodeId),

    /// Container configuration could not be parsed
    #[error("Invalid coordinator configuration: {0}")]
    Config(String),
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, CoordinatorError>;
