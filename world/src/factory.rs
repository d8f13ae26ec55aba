use isogrid_core::{
    ConfigurationError, ElementKind, GenerationError, GridCell, InstantiateRequest, Placement,
    PlacementBackend, VariantPool,
};
use rand::Rng;

use crate::layers::{ElementLayer, GridElement};

/// Where and what a single element should be created as.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ElementPlan {
    pub(crate) kind: ElementKind,
    pub(crate) cell: GridCell,
    pub(crate) placement: Placement,
}

/// Picks a random variant, instantiates it and appends it to the layer.
///
/// Tiles are labelled with their cell, obstacles with their index in the
/// obstacle layer.
pub(crate) fn create<R, B>(
    rng: &mut R,
    backend: &mut B,
    plan: ElementPlan,
    pool: &VariantPool,
    layer: &mut ElementLayer,
) -> Result<(), GenerationError>
where
    R: Rng + ?Sized,
    B: PlacementBackend + ?Sized,
{
    if pool.is_empty() {
        return Err(ConfigurationError::EmptyVariantPool { kind: plan.kind }.into());
    }
    let variant = pool
        .get(rng.gen_range(0..pool.len()))
        .ok_or(ConfigurationError::EmptyVariantPool { kind: plan.kind })?;

    let label = match plan.kind {
        ElementKind::Tile => format!(
            "Tile ({} - {}) : {}",
            plan.cell.column(),
            plan.cell.row(),
            variant.name()
        ),
        ElementKind::Obstacle => format!("Obstacle {} : {}", layer.len(), variant.name()),
    };

    let handle = backend.instantiate(InstantiateRequest {
        kind: plan.kind,
        parent: layer.container(),
        position: plan.placement.position(),
        label: &label,
        variant: variant.id(),
        depth: plan.placement.depth(),
    });

    layer.push(GridElement {
        kind: plan.kind,
        cell: plan.cell,
        variant: variant.id(),
        placement: plan.placement,
        handle,
        label,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use isogrid_core::{ContainerId, DepthKey, ElementHandle, ScreenPosition, VariantId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[derive(Default)]
    struct CountingBackend {
        created: Vec<(ContainerId, String)>,
    }

    impl PlacementBackend for CountingBackend {
        fn instantiate(&mut self, request: InstantiateRequest<'_>) -> ElementHandle {
            self.created.push((request.parent, request.label.to_owned()));
            ElementHandle::new(self.created.len() as u32)
        }

        fn destroy(&mut self, _element: ElementHandle) {}

        fn children(&self, _container: ContainerId) -> Vec<ElementHandle> {
            Vec::new()
        }
    }

    fn plan(kind: ElementKind, column: u32, row: u32) -> ElementPlan {
        ElementPlan {
            kind,
            cell: GridCell::new(column, row),
            placement: Placement::new(ScreenPosition::ZERO, DepthKey::new((column + row) as i32)),
        }
    }

    #[test]
    fn tiles_are_labelled_with_their_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut backend = CountingBackend::default();
        let mut layer = ElementLayer::new(ContainerId::new(4));
        let pool = VariantPool::from_names(["grass"]);

        create(&mut rng, &mut backend, plan(ElementKind::Tile, 3, 1), &pool, &mut layer)
            .expect("pool is populated");

        let element = layer.get(0).expect("tile appended");
        assert_eq!(element.label(), "Tile (3 - 1) : grass");
        assert_eq!(element.variant(), VariantId::new(0));
        assert_eq!(backend.created, vec![(ContainerId::new(4), element.label.clone())]);
    }

    #[test]
    fn obstacles_are_labelled_with_their_index() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut backend = CountingBackend::default();
        let mut layer = ElementLayer::new(ContainerId::new(5));
        let pool = VariantPool::from_names(["rock"]);

        for column in 0..2 {
            create(
                &mut rng,
                &mut backend,
                plan(ElementKind::Obstacle, column, 0),
                &pool,
                &mut layer,
            )
            .expect("pool is populated");
        }

        let labels: Vec<&str> = layer.iter().map(GridElement::label).collect();
        assert_eq!(labels, vec!["Obstacle 0 : rock", "Obstacle 1 : rock"]);
    }

    #[test]
    fn empty_pool_fails_without_instantiating() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut backend = CountingBackend::default();
        let mut layer = ElementLayer::new(ContainerId::new(4));

        let result = create(
            &mut rng,
            &mut backend,
            plan(ElementKind::Tile, 0, 0),
            &VariantPool::default(),
            &mut layer,
        );

        assert_eq!(
            result,
            Err(GenerationError::InvalidConfiguration(
                ConfigurationError::EmptyVariantPool {
                    kind: ElementKind::Tile,
                }
            ))
        );
        assert!(backend.created.is_empty());
        assert!(layer.is_empty());
    }
}
