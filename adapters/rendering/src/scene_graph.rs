use std::collections::{BTreeMap, BTreeSet};

use isogrid_core::{
    ContainerId, DepthKey, ElementHandle, ElementKind, InstantiateRequest, PlacementBackend,
    ScreenPosition, VariantId,
};

/// Visual element instantiated into the scene graph.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    /// Handle returned to the caller that created the node.
    pub handle: ElementHandle,
    /// Kind of element the node draws.
    pub kind: ElementKind,
    /// Container the node is attached to.
    pub parent: ContainerId,
    /// Position relative to the parent container.
    pub local_position: ScreenPosition,
    /// Label attached at creation time.
    pub label: String,
    /// Visual variant the node is drawn with.
    pub variant: VariantId,
    /// Draw order assigned at creation time.
    pub depth: DepthKey,
}

#[derive(Clone, Debug, PartialEq)]
struct Container {
    name: String,
    origin: ScreenPosition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct DrawKey {
    depth: DepthKey,
    sorting_layer: u8,
    handle: ElementHandle,
}

impl DrawKey {
    fn of(node: &SceneNode) -> Self {
        Self {
            depth: node.depth,
            sorting_layer: node.kind.sorting_layer(),
            handle: node.handle,
        }
    }
}

/// Retained scene of containers and the elements attached to them.
///
/// Nodes are kept in a draw-order index ordered by depth, then sorting layer,
/// then creation handle, so backends can paint back to front without sorting.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneGraph {
    containers: BTreeMap<ContainerId, Container>,
    nodes: BTreeMap<ElementHandle, SceneNode>,
    draw_order: BTreeSet<DrawKey>,
    next_container: u32,
    next_handle: u32,
}

impl SceneGraph {
    /// Creates an empty scene graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a named container whose children are positioned relative to `origin`.
    pub fn create_container<N>(&mut self, name: N, origin: ScreenPosition) -> ContainerId
    where
        N: Into<String>,
    {
        let id = ContainerId::new(self.next_container);
        self.next_container = self.next_container.wrapping_add(1);
        let _ = self.containers.insert(
            id,
            Container {
                name: name.into(),
                origin,
            },
        );
        id
    }

    /// Name the container was created with.
    #[must_use]
    pub fn container_name(&self, container: ContainerId) -> Option<&str> {
        self.containers
            .get(&container)
            .map(|container| container.name.as_str())
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Reports whether no nodes are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node with the provided handle.
    #[must_use]
    pub fn get(&self, handle: ElementHandle) -> Option<&SceneNode> {
        self.nodes.get(&handle)
    }

    /// Number of nodes attached to the container.
    #[must_use]
    pub fn count_in(&self, container: ContainerId) -> usize {
        self.nodes
            .values()
            .filter(|node| node.parent == container)
            .count()
    }

    /// Absolute position of a node, combining its container origin.
    #[must_use]
    pub fn world_position(&self, handle: ElementHandle) -> Option<ScreenPosition> {
        self.nodes.get(&handle).map(|node| self.absolute(node))
    }

    /// Iterates nodes back to front.
    pub fn draw_order(&self) -> impl Iterator<Item = &SceneNode> + '_ {
        self.draw_order
            .iter()
            .filter_map(|key| self.nodes.get(&key.handle))
    }

    /// Smallest rectangle containing every node anchor, as `(min, max)`.
    #[must_use]
    pub fn bounds(&self) -> Option<(ScreenPosition, ScreenPosition)> {
        self.nodes.values().map(|node| self.absolute(node)).fold(
            None,
            |bounds, position| match bounds {
                None => Some((position, position)),
                Some((min, max)) => Some((
                    ScreenPosition::new(min.x.min(position.x), min.y.min(position.y)),
                    ScreenPosition::new(max.x.max(position.x), max.y.max(position.y)),
                )),
            },
        )
    }

    fn absolute(&self, node: &SceneNode) -> ScreenPosition {
        let origin = self
            .containers
            .get(&node.parent)
            .map_or(ScreenPosition::ZERO, |container| container.origin);
        origin + node.local_position
    }
}

impl PlacementBackend for SceneGraph {
    fn instantiate(&mut self, request: InstantiateRequest<'_>) -> ElementHandle {
        let handle = ElementHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let node = SceneNode {
            handle,
            kind: request.kind,
            parent: request.parent,
            local_position: request.position,
            label: request.label.to_owned(),
            variant: request.variant,
            depth: request.depth,
        };
        let _ = self.draw_order.insert(DrawKey::of(&node));
        let _ = self.nodes.insert(handle, node);
        handle
    }

    fn destroy(&mut self, element: ElementHandle) {
        if let Some(node) = self.nodes.remove(&element) {
            let _ = self.draw_order.remove(&DrawKey::of(&node));
        }
    }

    fn children(&self, container: ContainerId) -> Vec<ElementHandle> {
        self.nodes
            .values()
            .filter(|node| node.parent == container)
            .map(|node| node.handle)
            .collect()
    }
}
