//! Node tree owned by a coordinator
//!
//! The root node is the container itself. Its direct children are laid out by
//! the coordinator; deeper descendants are positioned by the host and only
//! matter as anchor targets.

use std::fmt;

use slotmap::{new_key_type, SlotMap};
use tether_core::{Point, Rect, Size};

new_key_type! {
    pub struct NodeId;
}

/// Symbolic, host-assigned identifier used to reference a node as an anchor
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub u32);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Visibility of a node
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Visible,
    /// Not drawn, but still takes part in layout
    Invisible,
    /// Not drawn and reports an empty rect
    Gone,
}

/// Host-supplied description of a node
///
/// # Example
///
/// ```rust
/// use tether_layout::tree::{Node, ViewId};
///
/// let fab = Node::new()
///     .view_id(ViewId(7))
///     .kind("floating_button")
///     .content_size(56.0, 56.0)
///     .elevation(6.0);
/// assert_eq!(fab.get_view_id(), Some(ViewId(7)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Node {
    view_id: Option<ViewId>,
    kind: Option<String>,
    content_size: Size,
    elevation: f32,
    visibility: Visibility,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view_id(mut self, id: ViewId) -> Self {
        self.view_id = Some(id);
        self
    }

    /// Node kind, used to look up a default behavior
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Intrinsic content size reported to measurement
    pub fn content_size(mut self, width: f32, height: f32) -> Self {
        self.content_size = Size::new(width, height);
        self
    }

    /// Visual elevation; higher values are on top for touch routing
    pub fn elevation(mut self, elevation: f32) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn get_view_id(&self) -> Option<ViewId> {
        self.view_id
    }

    pub fn get_kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn get_content_size(&self) -> Size {
        self.content_size
    }

    pub fn get_elevation(&self) -> f32 {
        self.elevation
    }

    pub fn get_visibility(&self) -> Visibility {
        self.visibility
    }
}

struct NodeEntry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Layout box relative to the parent
    frame: Rect,
    /// Transient visual offset applied on top of the frame
    translation: Point,
    measured: Size,
    layout_requested: bool,
}

impl NodeEntry {
    fn new(node: Node, parent: Option<NodeId>) -> Self {
        Self {
            node,
            parent,
            children: Vec::new(),
            frame: Rect::ZERO,
            translation: Point::ZERO,
            measured: Size::ZERO,
            layout_requested: true,
        }
    }
}

/// Arena of nodes rooted at the container
pub struct NodeTree {
    nodes: SlotMap<NodeId, NodeEntry>,
    root: NodeId,
}

impl NodeTree {
    /// Create a tree whose root is the given container node
    pub fn new(root: Node) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeEntry::new(root, None));
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Append a descendant under `parent`
    ///
    /// Returns `None` when the parent does not exist or is the root. Direct
    /// children carry layout state and are added through
    /// [`Coordinator::add_child`](crate::coordinator::Coordinator::add_child).
    pub fn append(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        if parent == self.root || !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.nodes.insert(NodeEntry::new(node, Some(parent)));
        self.nodes[parent].children.push(id);
        Some(id)
    }

    /// Append a direct child of the root
    pub(crate) fn append_to_root(&mut self, node: Node) -> NodeId {
        let root = self.root;
        let id = self.nodes.insert(NodeEntry::new(node, Some(root)));
        self.nodes[root].children.push(id);
        id
    }

    /// Move `child` to `index` among its siblings
    pub(crate) fn reorder(&mut self, child: NodeId, index: usize) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        let siblings = &mut self.nodes[parent].children;
        let Some(current) = siblings.iter().position(|&c| c == child) else {
            return false;
        };
        siblings.remove(current);
        siblings.insert(index.min(siblings.len()), child);
        true
    }

    /// Remove a descendant and everything below it
    ///
    /// Refuses the root and its direct children, which are removed through
    /// [`Coordinator::remove_child`](crate::coordinator::Coordinator::remove_child).
    pub fn remove_descendant(&mut self, id: NodeId) -> bool {
        if !self.contains(id) || id == self.root || self.parent(id) == Some(self.root) {
            return false;
        }
        self.remove_subtree(id);
        true
    }

    /// Remove a node and all its descendants
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        if id == self.root {
            return;
        }
        if let Some(parent) = self.parent(id) {
            if let Some(entry) = self.nodes.get_mut(parent) {
                entry.children.retain(|&c| c != id);
            }
        }

        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(entry) = self.nodes.remove(next) {
                stack.extend(entry.children);
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id).map(|entry| &entry.node)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id).map(|entry| &mut entry.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|entry| entry.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over the ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Depth-first search below `from` for a node carrying `view_id`
    ///
    /// `from` itself is not considered.
    pub fn find_by_view_id(&self, from: NodeId, view_id: ViewId) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(from).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let entry = &self.nodes[id];
            if entry.node.view_id == Some(view_id) {
                return Some(id);
            }
            stack.extend(entry.children.iter().rev().copied());
        }
        None
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// Layout box relative to the parent
    pub fn frame(&self, id: NodeId) -> Rect {
        self.nodes.get(id).map(|entry| entry.frame).unwrap_or_default()
    }

    /// Set the layout box and clear any pending layout request
    pub fn set_frame(&mut self, id: NodeId, frame: Rect) {
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.frame = frame;
            entry.layout_requested = false;
        }
    }

    /// Move the layout box without resizing it
    pub fn offset(&mut self, id: NodeId, dx: f32, dy: f32) {
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.frame = entry.frame.offset(dx, dy);
        }
    }

    pub fn translation(&self, id: NodeId) -> Point {
        self.nodes
            .get(id)
            .map(|entry| entry.translation)
            .unwrap_or_default()
    }

    pub fn set_translation(&mut self, id: NodeId, translation: Point) {
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.translation = translation;
        }
    }

    pub fn measured(&self, id: NodeId) -> Size {
        self.nodes
            .get(id)
            .map(|entry| entry.measured)
            .unwrap_or_default()
    }

    pub fn set_measured(&mut self, id: NodeId, size: Size) {
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.measured = size;
        }
    }

    pub fn request_layout(&mut self, id: NodeId) {
        if let Some(entry) = self.nodes.get_mut(id) {
            entry.layout_requested = true;
        }
    }

    pub fn is_layout_requested(&self, id: NodeId) -> bool {
        self.nodes
            .get(id)
            .map(|entry| entry.layout_requested)
            .unwrap_or(false)
    }

    /// Bounds of any descendant in root coordinates
    ///
    /// With `transformed`, each node's translation is applied on the way up,
    /// giving the on-screen position rather than the layout position.
    pub fn descendant_rect(&self, id: NodeId, transformed: bool) -> Rect {
        let Some(entry) = self.nodes.get(id) else {
            return Rect::ZERO;
        };
        let mut rect = entry.frame.size.to_rect();

        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                break;
            }
            let entry = &self.nodes[node];
            rect = rect.offset(entry.frame.origin.x, entry.frame.origin.y);
            if transformed {
                rect = rect.offset(entry.translation.x, entry.translation.y);
            }
            current = entry.parent;
        }
        rect
    }
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new(Node::new())
    }
}
