use std::collections::{BTreeMap, BTreeSet};

use isogrid_core::{
    Command, ConfigurationError, ContainerId, ElementHandle, ElementKind, Event, GenerationError,
    GridCell, GridParameters, InstantiateRequest, LayerContainers, PlacementBackend,
    ScreenPosition, VariantPool, MAX_DIMENSION, MIN_DIMENSION,
};
use isogrid_system_bootstrap::GenerateTrigger;
use isogrid_world::{
    advance, apply, handle, query, regenerate, GenerationState, GridSettings, RequestOutcome,
    World,
};

const TILES: ContainerId = ContainerId::new(10);
const OBSTACLES: ContainerId = ContainerId::new(20);

#[derive(Clone, Debug, PartialEq)]
struct Recorded {
    kind: ElementKind,
    parent: ContainerId,
    position: ScreenPosition,
    label: String,
    depth: i32,
}

/// Backend double that keeps every live element and counts operations.
#[derive(Default)]
struct RecordingBackend {
    next_handle: u32,
    live: BTreeMap<ElementHandle, Recorded>,
    instantiated: usize,
    destroyed: usize,
}

impl RecordingBackend {
    fn children_count(&self, container: ContainerId) -> usize {
        self.live
            .values()
            .filter(|element| element.parent == container)
            .count()
    }
}

impl PlacementBackend for RecordingBackend {
    fn instantiate(&mut self, request: InstantiateRequest<'_>) -> ElementHandle {
        let handle = ElementHandle::new(self.next_handle);
        self.next_handle += 1;
        self.instantiated += 1;
        let _ = self.live.insert(
            handle,
            Recorded {
                kind: request.kind,
                parent: request.parent,
                position: request.position,
                label: request.label.to_owned(),
                depth: request.depth.get(),
            },
        );
        handle
    }

    fn destroy(&mut self, element: ElementHandle) {
        if self.live.remove(&element).is_some() {
            self.destroyed += 1;
        }
    }

    fn children(&self, container: ContainerId) -> Vec<ElementHandle> {
        self.live
            .iter()
            .filter(|(_, element)| element.parent == container)
            .map(|(handle, _)| *handle)
            .collect()
    }
}

fn settings(parameters: GridParameters) -> GridSettings {
    GridSettings::new(
        parameters,
        VariantPool::from_names(["grass", "sand", "stone"]),
        VariantPool::from_names(["rock", "tree"]),
    )
}

fn world_with(settings: GridSettings) -> World {
    World::new(
        settings,
        LayerContainers::new(TILES, OBSTACLES),
        isogrid_core::SubscriberId::new(0),
    )
}

fn world(parameters: GridParameters) -> World {
    world_with(settings(parameters))
}

#[test]
fn two_by_two_grid_matches_reference_layout() {
    let mut world = world(GridParameters::new(2, 2, 0));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();

    let outcome = regenerate(&mut world, true, &mut backend, &mut events);
    assert_eq!(outcome, Ok(RequestOutcome::Started));

    let tiles: Vec<(GridCell, ScreenPosition, i32)> = query::tile_layer(&world)
        .iter()
        .map(|tile| {
            (
                tile.cell(),
                tile.placement().position(),
                tile.placement().depth().get(),
            )
        })
        .collect();

    assert_eq!(
        tiles,
        vec![
            (GridCell::new(0, 0), ScreenPosition::new(0.0, 0.5), 0),
            (GridCell::new(0, 1), ScreenPosition::new(1.0, 0.0), 1),
            (GridCell::new(1, 0), ScreenPosition::new(-1.0, 0.0), 1),
            (GridCell::new(1, 1), ScreenPosition::new(0.0, -0.5), 2),
        ],
        "tiles must be created column-major at their isometric positions"
    );
    assert!(query::obstacle_layer(&world).is_empty());
    assert_eq!(backend.children_count(TILES), 4);
}

#[test]
fn two_by_two_grid_with_one_obstacle_places_it_on_a_tile() {
    for seed in 0..50 {
        let mut world = world_with(settings(GridParameters::new(2, 2, 1)).with_seed(seed));
        let mut backend = RecordingBackend::default();
        let mut events = Vec::new();
        let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");

        let depths: Vec<i32> = query::tile_layer(&world)
            .iter()
            .map(|tile| tile.placement().depth().get())
            .collect();
        assert_eq!(depths, vec![0, 1, 1, 2]);

        let obstacles = query::obstacle_layer(&world);
        assert_eq!(obstacles.len(), 1, "seed {seed}");
        let obstacle = obstacles.get(0).expect("one obstacle");
        let tile = query::tile_layer(&world)
            .iter()
            .find(|tile| tile.cell() == obstacle.cell())
            .expect("obstacle sits on a tile");
        assert_eq!(tile.placement(), obstacle.placement());

        let _ = regenerate(&mut world, false, &mut backend, &mut events).expect("regenerates");
        assert_eq!(backend.live.len(), 5, "seed {seed}");
    }
}

#[test]
fn tile_layer_size_matches_every_supported_dimension() {
    for width in MIN_DIMENSION..=MAX_DIMENSION {
        for height in MIN_DIMENSION..=MAX_DIMENSION {
            let mut world = world(GridParameters::new(width, height, 3));
            let mut backend = RecordingBackend::default();
            let mut events = Vec::new();

            let _ = regenerate(&mut world, true, &mut backend, &mut events)
                .expect("valid configuration generates");

            assert_eq!(
                query::tile_layer(&world).len(),
                (width * height) as usize,
                "{width}x{height} produced the wrong number of tiles"
            );
            assert_eq!(query::obstacle_layer(&world).len(), 3);
        }
    }
}

#[test]
fn obstacles_occupy_distinct_tiles_with_matching_placements() {
    let mut world = world(GridParameters::new(6, 5, 12));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();

    let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");

    let tiles: BTreeMap<GridCell, _> = query::tile_layer(&world)
        .iter()
        .map(|tile| (tile.cell(), tile.placement()))
        .collect();
    let mut occupied = BTreeSet::new();
    for obstacle in query::obstacle_layer(&world).iter() {
        assert_eq!(obstacle.kind(), ElementKind::Obstacle);
        assert!(
            occupied.insert(obstacle.cell()),
            "two obstacles share cell {:?}",
            obstacle.cell()
        );
        assert_eq!(
            tiles.get(&obstacle.cell()),
            Some(&obstacle.placement()),
            "obstacle must copy the position and depth of its tile"
        );
    }
    assert_eq!(occupied.len(), 12);
    assert_eq!(backend.children_count(OBSTACLES), 12);
}

#[test]
fn obstacle_count_is_clamped_to_the_tile_count() {
    let mut world = world(GridParameters::new(2, 2, 9));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();

    let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");

    assert_eq!(query::obstacle_layer(&world).len(), 4);
    assert!(events.contains(&Event::ObstaclesPlaced {
        requested: 9,
        placed: 4,
    }));
    assert_eq!(
        query::parameters(&world).obstacle_count(),
        9,
        "clamping applies to the session only"
    );
}

#[test]
fn repeated_regeneration_leaves_no_residue() {
    let mut world = world(GridParameters::new(5, 4, 3));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();

    let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("first generation");
    world.set_parameters(GridParameters::new(3, 3, 2));
    let _ = regenerate(&mut world, false, &mut backend, &mut events).expect("second generation");
    let _ = regenerate(&mut world, false, &mut backend, &mut events).expect("third generation");

    assert_eq!(backend.children_count(TILES), 9);
    assert_eq!(backend.children_count(OBSTACLES), 2);
    assert_eq!(backend.live.len(), 11, "no elements from earlier generations survive");
    assert_eq!(backend.destroyed, backend.instantiated - 11);
    assert_eq!(query::completed_generations(&world), 3);
}

#[test]
fn clear_sweeps_strays_attached_to_the_containers() {
    let mut world = world(GridParameters::new(2, 3, 1));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();
    let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");

    let _ = backend.instantiate(InstantiateRequest {
        kind: ElementKind::Tile,
        parent: TILES,
        position: ScreenPosition::ZERO,
        label: "stray",
        variant: isogrid_core::VariantId::new(0),
        depth: isogrid_core::DepthKey::new(0),
    });
    events.clear();
    let _ = regenerate(&mut world, false, &mut backend, &mut events).expect("regenerates");

    assert!(events.contains(&Event::GridCleared { destroyed: 8 }));
    assert!(backend.live.values().all(|element| element.label != "stray"));
}

#[test]
fn requests_while_generating_are_dropped() {
    let mut world = world(GridParameters::new(4, 4, 2));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();

    let first = apply(
        &mut world,
        Command::Regenerate {
            first_generation: true,
        },
        &mut events,
    );
    assert_eq!(first, Ok(RequestOutcome::Started));
    assert_eq!(
        advance(&mut world, &mut backend, &mut events),
        Ok(GenerationState::Generating)
    );

    let second = apply(
        &mut world,
        Command::Regenerate {
            first_generation: false,
        },
        &mut events,
    );
    assert_eq!(second, Ok(RequestOutcome::Rejected));
    assert_eq!(events.last(), Some(&Event::GenerationRejected));

    while advance(&mut world, &mut backend, &mut events).expect("phase succeeds")
        == GenerationState::Generating
    {}

    assert_eq!(query::state(&world), GenerationState::Idle);
    assert_eq!(backend.children_count(TILES), 16, "no duplicate tile layer");
    assert_eq!(backend.children_count(OBSTACLES), 2);
    assert_eq!(query::completed_generations(&world), 1);
}

#[test]
fn parameter_changes_mid_session_apply_to_the_next_one() {
    let mut world = world(GridParameters::new(3, 3, 0));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();

    let _ = apply(
        &mut world,
        Command::Regenerate {
            first_generation: true,
        },
        &mut events,
    );
    world.set_parameters(GridParameters::new(7, 7, 0));
    assert_eq!(
        query::session_parameters(&world),
        Some(GridParameters::new(3, 3, 0)),
        "the session keeps what it captured"
    );
    while advance(&mut world, &mut backend, &mut events).expect("phase succeeds")
        == GenerationState::Generating
    {}

    assert_eq!(query::tile_layer(&world).len(), 9);
    assert_eq!(query::parameters(&world), GridParameters::new(7, 7, 0));
    assert_eq!(query::session_parameters(&world), None);
}

#[test]
fn invalid_configuration_keeps_the_previous_grid() {
    let mut world = world(GridParameters::new(3, 2, 1));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();
    let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");

    world.set_variant_pools(VariantPool::default(), VariantPool::from_names(["rock"]));
    assert!(query::tile_variants(&world).is_empty());
    assert_eq!(query::obstacle_variants(&world).len(), 1);
    let result = regenerate(&mut world, false, &mut backend, &mut events);

    assert_eq!(
        result,
        Err(GenerationError::InvalidConfiguration(
            ConfigurationError::EmptyVariantPool {
                kind: ElementKind::Tile,
            }
        ))
    );
    assert_eq!(query::state(&world), GenerationState::Idle);
    assert_eq!(query::tile_layer(&world).len(), 6);
    assert_eq!(backend.children_count(TILES), 6, "prior grid left untouched");
    assert_eq!(backend.destroyed, 0);
}

#[test]
fn identical_seeds_replay_identical_grids() {
    let run = |seed: u64| {
        let mut world = world_with(settings(GridParameters::new(8, 6, 10)).with_seed(seed));
        let mut backend = RecordingBackend::default();
        let mut events = Vec::new();
        let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");
        let _ = regenerate(&mut world, false, &mut backend, &mut events).expect("regenerates");
        backend.live.into_values().collect::<Vec<Recorded>>()
    };

    assert_eq!(run(17), run(17), "same seed must replay the same grid");
}

#[test]
fn labels_name_cells_and_obstacle_indices() {
    let mut world = world_with(GridSettings::new(
        GridParameters::new(2, 2, 2),
        VariantPool::from_names(["grass"]),
        VariantPool::from_names(["rock"]),
    ));
    let mut backend = RecordingBackend::default();
    let mut events = Vec::new();
    let _ = regenerate(&mut world, true, &mut backend, &mut events).expect("generates");

    let tiles: Vec<&str> = query::tile_layer(&world).iter().map(|tile| tile.label()).collect();
    let obstacles: Vec<&str> = query::obstacle_layer(&world)
        .iter()
        .map(|obstacle| obstacle.label())
        .collect();

    assert_eq!(
        tiles,
        vec![
            "Tile (0 - 0) : grass",
            "Tile (0 - 1) : grass",
            "Tile (1 - 0) : grass",
            "Tile (1 - 1) : grass",
        ]
    );
    assert_eq!(obstacles, vec!["Obstacle 0 : rock", "Obstacle 1 : rock"]);
}

#[test]
fn trigger_presses_reach_only_subscribed_worlds() {
    let mut trigger = GenerateTrigger::new();
    let subscribed = trigger.subscribe();
    let disabled = trigger.subscribe();
    let _ = trigger.unsubscribe(disabled);

    let containers = LayerContainers::new(TILES, OBSTACLES);
    let parameters = GridParameters::new(2, 2, 0);
    let mut listening = World::new(settings(parameters), containers, subscribed);
    let mut silent = World::new(settings(parameters), containers, disabled);
    let mut dispatches = Vec::new();
    let mut events = Vec::new();

    trigger.press(&mut dispatches);
    handle(&mut listening, &dispatches, &mut events).expect("valid configuration");
    handle(&mut silent, &dispatches, &mut events).expect("valid configuration");

    assert_eq!(query::subscriber(&listening), subscribed);
    assert_eq!(query::subscriber(&silent), disabled);
    assert_eq!(query::state(&listening), GenerationState::Generating);
    assert_eq!(query::state(&silent), GenerationState::Idle);
    assert!(matches!(
        events.first(),
        Some(Event::GenerationStarted {
            first_generation: true,
            ..
        })
    ));
}
