use isogrid_core::{
    ContainerId, ElementHandle, ElementKind, GridCell, Placement, PlacementBackend, VariantId,
};

/// Element placed on the grid by a completed or in-flight generation.
#[derive(Clone, Debug, PartialEq)]
pub struct GridElement {
    pub(crate) kind: ElementKind,
    pub(crate) cell: GridCell,
    pub(crate) variant: VariantId,
    pub(crate) placement: Placement,
    pub(crate) handle: ElementHandle,
    pub(crate) label: String,
}

impl GridElement {
    /// Kind of the element.
    #[must_use]
    pub const fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Grid cell the element occupies.
    #[must_use]
    pub const fn cell(&self) -> GridCell {
        self.cell
    }

    /// Visual variant chosen for the element.
    #[must_use]
    pub const fn variant(&self) -> VariantId {
        self.variant
    }

    /// Screen position and draw order of the element.
    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    /// Backend handle of the instantiated element.
    #[must_use]
    pub const fn handle(&self) -> ElementHandle {
        self.handle
    }

    /// Label attached to the element, e.g. `Tile (3 - 1) : grass`.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered collection of elements sharing one parent container.
#[derive(Clone, Debug)]
pub struct ElementLayer {
    container: ContainerId,
    elements: Vec<GridElement>,
}

impl ElementLayer {
    pub(crate) const fn new(container: ContainerId) -> Self {
        Self {
            container,
            elements: Vec::new(),
        }
    }

    /// Container the layer's elements are attached to.
    #[must_use]
    pub const fn container(&self) -> ContainerId {
        self.container
    }

    /// Number of elements in the layer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Reports whether the layer holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element stored at the provided creation index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GridElement> {
        self.elements.get(index)
    }

    /// Iterates the elements in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &GridElement> {
        self.elements.iter()
    }

    pub(crate) fn push(&mut self, element: GridElement) {
        self.elements.push(element);
    }

    /// Destroys every child of the container and empties the collection.
    ///
    /// The sweep covers whatever the backend reports under the container, so
    /// strays that never made it into the collection are removed as well.
    pub(crate) fn sweep<B>(&mut self, backend: &mut B) -> usize
    where
        B: PlacementBackend + ?Sized,
    {
        let children = backend.children(self.container);
        let destroyed = children.len();
        for child in children {
            backend.destroy(child);
        }
        self.elements.clear();
        destroyed
    }
}
