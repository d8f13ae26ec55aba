#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state and the generation lifecycle.
//!
//! The world owns both element layers exclusively. A regeneration request
//! validates the configuration, captures the parameters into a session and
//! queues its phases; [`advance`] then executes exactly one phase per call so
//! adapters can spread the work across frames. Requests that arrive while a
//! session is in flight are dropped.

mod factory;
mod layers;

use std::collections::VecDeque;

use isogrid_core::{
    Command, ConfigurationError, Dispatch, ElementKind, Event, GenerationError, GridParameters,
    LayerContainers, PlacementBackend, SubscriberId, VariantPool,
};
use isogrid_system_projection::IsometricProjector;
use isogrid_system_sampler::{SamplingStrategy, UniqueSampler};
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::factory::ElementPlan;
pub use crate::layers::{ElementLayer, GridElement};

/// Seed used when the configuration does not provide one.
pub const DEFAULT_SEED: u64 = 0x1509_65ad_7c3e_0b21;

/// Inputs a grid world is configured with.
#[derive(Clone, Debug)]
pub struct GridSettings {
    /// Dimensions and obstacle budget of the next generation.
    pub parameters: GridParameters,
    /// Variants tiles are drawn from.
    pub tile_variants: VariantPool,
    /// Variants obstacles are drawn from.
    pub obstacle_variants: VariantPool,
    /// Seed of the random source driving variant and obstacle selection.
    pub seed: u64,
    /// Algorithm used to pick obstacle cells.
    pub sampling: SamplingStrategy,
}

impl GridSettings {
    /// Creates settings with the default seed and sampling strategy.
    #[must_use]
    pub fn new(
        parameters: GridParameters,
        tile_variants: VariantPool,
        obstacle_variants: VariantPool,
    ) -> Self {
        Self {
            parameters,
            tile_variants,
            obstacle_variants,
            seed: DEFAULT_SEED,
            sampling: SamplingStrategy::default(),
        }
    }

    /// Returns a copy using the provided seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Returns a copy using the provided sampling strategy.
    #[must_use]
    pub fn with_sampling(mut self, sampling: SamplingStrategy) -> Self {
        self.sampling = sampling;
        self
    }

    /// Checks that the settings can produce a grid.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let parameters = self.parameters;
        if parameters.width() == 0 || parameters.height() == 0 {
            return Err(ConfigurationError::ZeroDimension {
                width: parameters.width(),
                height: parameters.height(),
            });
        }
        if self.tile_variants.is_empty() {
            return Err(ConfigurationError::EmptyVariantPool {
                kind: ElementKind::Tile,
            });
        }
        if parameters.obstacle_count() > 0 && self.obstacle_variants.is_empty() {
            return Err(ConfigurationError::EmptyVariantPool {
                kind: ElementKind::Obstacle,
            });
        }
        Ok(())
    }
}

/// Lifecycle state of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationState {
    /// No generation is in flight.
    Idle,
    /// A generation session has phases left to run.
    Generating,
}

/// Result of submitting a regeneration request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The request opened a new generation session.
    Started,
    /// A session was already in flight; the request was dropped.
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Clear,
    Tiles,
    Obstacles,
}

/// Parameters and remaining work captured when a request is accepted.
#[derive(Debug)]
struct GenerationSession {
    parameters: GridParameters,
    tile_variants: VariantPool,
    obstacle_variants: VariantPool,
    pending: VecDeque<Phase>,
}

/// Owns the generated grid and drives its regeneration.
#[derive(Debug)]
pub struct World {
    settings: GridSettings,
    subscriber: SubscriberId,
    tiles: ElementLayer,
    obstacles: ElementLayer,
    session: Option<GenerationSession>,
    sampler: UniqueSampler,
    rng: ChaCha8Rng,
    completed_generations: u64,
}

impl World {
    /// Creates an empty world bound to its layer containers.
    ///
    /// `subscriber` is the trigger subscription the world answers to; dispatches
    /// addressed to other subscribers are ignored by [`handle`].
    #[must_use]
    pub fn new(
        settings: GridSettings,
        containers: LayerContainers,
        subscriber: SubscriberId,
    ) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            sampler: UniqueSampler::new(settings.sampling),
            settings,
            subscriber,
            tiles: ElementLayer::new(containers.tiles),
            obstacles: ElementLayer::new(containers.obstacles),
            session: None,
            completed_generations: 0,
        }
    }

    /// Replaces the parameters used by the next accepted request.
    ///
    /// An in-flight session keeps the parameters it captured.
    pub fn set_parameters(&mut self, parameters: GridParameters) {
        self.settings.parameters = parameters;
    }

    /// Replaces the variant pools used by the next accepted request.
    pub fn set_variant_pools(&mut self, tiles: VariantPool, obstacles: VariantPool) {
        self.settings.tile_variants = tiles;
        self.settings.obstacle_variants = obstacles;
    }
}

/// Applies a command to the world.
///
/// A `Regenerate` command is validated against the current settings before
/// anything is touched. On success the session's phases are queued; the
/// clear phase is skipped for the first generation.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<RequestOutcome, GenerationError> {
    match command {
        Command::Regenerate { first_generation } => {
            if world.session.is_some() {
                debug!("regeneration request dropped: generation already in flight");
                out_events.push(Event::GenerationRejected);
                return Ok(RequestOutcome::Rejected);
            }

            if let Err(error) = world.settings.validate() {
                warn!("regeneration rejected: {error}");
                return Err(error.into());
            }

            let parameters = world.settings.parameters;
            let mut pending = VecDeque::with_capacity(3);
            if !first_generation {
                pending.push_back(Phase::Clear);
            }
            pending.push_back(Phase::Tiles);
            pending.push_back(Phase::Obstacles);

            world.session = Some(GenerationSession {
                parameters,
                tile_variants: world.settings.tile_variants.clone(),
                obstacle_variants: world.settings.obstacle_variants.clone(),
                pending,
            });
            info!(
                "generating {}x{} grid with {} obstacles",
                parameters.width(),
                parameters.height(),
                parameters.obstacle_count()
            );
            out_events.push(Event::GenerationStarted {
                parameters,
                first_generation,
            });
            Ok(RequestOutcome::Started)
        }
    }
}

/// Applies every dispatch addressed to the world's subscription.
pub fn handle(
    world: &mut World,
    dispatches: &[Dispatch],
    out_events: &mut Vec<Event>,
) -> Result<(), GenerationError> {
    for dispatch in dispatches {
        if dispatch.subscriber == world.subscriber {
            let _ = apply(world, dispatch.command, out_events)?;
        }
    }
    Ok(())
}

/// Runs the next queued phase of the in-flight session, if any.
///
/// Returns the state after the phase. A failing phase abandons the session
/// and leaves the world idle.
pub fn advance<B>(
    world: &mut World,
    backend: &mut B,
    out_events: &mut Vec<Event>,
) -> Result<GenerationState, GenerationError>
where
    B: PlacementBackend + ?Sized,
{
    let Some(session) = world.session.as_mut() else {
        return Ok(GenerationState::Idle);
    };
    let Some(phase) = session.pending.pop_front() else {
        world.session = None;
        return Ok(GenerationState::Idle);
    };

    let result = match phase {
        Phase::Clear => {
            let destroyed = world.tiles.sweep(backend) + world.obstacles.sweep(backend);
            debug!("cleared {destroyed} elements");
            out_events.push(Event::GridCleared { destroyed });
            Ok(())
        }
        Phase::Tiles => place_tiles(
            &mut world.rng,
            backend,
            session.parameters,
            &session.tile_variants,
            &mut world.tiles,
        )
        .map(|count| out_events.push(Event::TilesPlaced { count })),
        Phase::Obstacles => place_obstacles(
            &mut world.rng,
            &world.sampler,
            backend,
            session.parameters,
            &session.obstacle_variants,
            &world.tiles,
            &mut world.obstacles,
        )
        .map(|placed| {
            out_events.push(Event::ObstaclesPlaced {
                requested: session.parameters.obstacle_count(),
                placed,
            });
        }),
    };

    if let Err(error) = result {
        warn!("generation abandoned: {error}");
        world.session = None;
        return Err(error);
    }

    if session.pending.is_empty() {
        world.session = None;
        world.completed_generations = world.completed_generations.saturating_add(1);
        info!(
            "generation complete: {} tiles, {} obstacles",
            world.tiles.len(),
            world.obstacles.len()
        );
        out_events.push(Event::GenerationCompleted {
            tiles: world.tiles.len(),
            obstacles: world.obstacles.len(),
        });
        return Ok(GenerationState::Idle);
    }
    Ok(GenerationState::Generating)
}

/// Requests a regeneration and drives it to completion.
///
/// Convenience for callers that do not need to spread phases across frames.
pub fn regenerate<B>(
    world: &mut World,
    first_generation: bool,
    backend: &mut B,
    out_events: &mut Vec<Event>,
) -> Result<RequestOutcome, GenerationError>
where
    B: PlacementBackend + ?Sized,
{
    let outcome = apply(world, Command::Regenerate { first_generation }, out_events)?;
    if outcome == RequestOutcome::Started {
        while advance(world, backend, out_events)? == GenerationState::Generating {}
    }
    Ok(outcome)
}

fn place_tiles<B>(
    rng: &mut ChaCha8Rng,
    backend: &mut B,
    parameters: GridParameters,
    pool: &VariantPool,
    tiles: &mut ElementLayer,
) -> Result<usize, GenerationError>
where
    B: PlacementBackend + ?Sized,
{
    let projector = IsometricProjector::new(&parameters);
    let mut placed = 0;
    for cell in projector.cells() {
        let plan = ElementPlan {
            kind: ElementKind::Tile,
            cell,
            placement: projector.project(cell),
        };
        factory::create(rng, backend, plan, pool, tiles)?;
        placed += 1;
    }
    Ok(placed)
}

fn place_obstacles<B>(
    rng: &mut ChaCha8Rng,
    sampler: &UniqueSampler,
    backend: &mut B,
    parameters: GridParameters,
    pool: &VariantPool,
    tiles: &ElementLayer,
    obstacles: &mut ElementLayer,
) -> Result<usize, GenerationError>
where
    B: PlacementBackend + ?Sized,
{
    let requested = parameters.obstacle_count() as usize;
    let count = requested.min(tiles.len());
    if count < requested {
        warn!("obstacle count {requested} exceeds {} tiles; placing {count}", tiles.len());
    }

    let indices = sampler
        .sample(rng, 0..tiles.len(), count)
        .map_err(|_| GenerationError::ObstacleSampling {
            requested: count,
            available: tiles.len(),
        })?;
    let plans = obstacle_plans(tiles, &indices)?;
    for plan in &plans {
        factory::create(rng, backend, *plan, pool, obstacles)?;
    }
    Ok(plans.len())
}

/// Maps sampled tile indices to obstacle plans sitting exactly on those tiles.
fn obstacle_plans(
    tiles: &ElementLayer,
    indices: &[usize],
) -> Result<Vec<ElementPlan>, GenerationError> {
    indices
        .iter()
        .map(|&index| {
            tiles
                .get(index)
                .map(|tile| ElementPlan {
                    kind: ElementKind::Obstacle,
                    cell: tile.cell(),
                    placement: tile.placement(),
                })
                .ok_or(GenerationError::ObstacleSampling {
                    requested: indices.len(),
                    available: tiles.len(),
                })
        })
        .collect()
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use isogrid_core::{GridParameters, SubscriberId, VariantPool};

    use super::{ElementLayer, GenerationState, World};

    /// Current lifecycle state of the world.
    #[must_use]
    pub fn state(world: &World) -> GenerationState {
        if world.session.is_some() {
            GenerationState::Generating
        } else {
            GenerationState::Idle
        }
    }

    /// Parameters the next accepted request will use.
    #[must_use]
    pub fn parameters(world: &World) -> GridParameters {
        world.settings.parameters
    }

    /// Parameters captured by the in-flight session, if any.
    #[must_use]
    pub fn session_parameters(world: &World) -> Option<GridParameters> {
        world.session.as_ref().map(|session| session.parameters)
    }

    /// Tile variants the next accepted request will draw from.
    #[must_use]
    pub fn tile_variants(world: &World) -> &VariantPool {
        &world.settings.tile_variants
    }

    /// Obstacle variants the next accepted request will draw from.
    #[must_use]
    pub fn obstacle_variants(world: &World) -> &VariantPool {
        &world.settings.obstacle_variants
    }

    /// Layer holding every generated tile.
    #[must_use]
    pub fn tile_layer(world: &World) -> &ElementLayer {
        &world.tiles
    }

    /// Layer holding every generated obstacle.
    #[must_use]
    pub fn obstacle_layer(world: &World) -> &ElementLayer {
        &world.obstacles
    }

    /// Trigger subscription the world answers to.
    #[must_use]
    pub fn subscriber(world: &World) -> SubscriberId {
        world.subscriber
    }

    /// Number of sessions that ran to completion.
    #[must_use]
    pub fn completed_generations(world: &World) -> u64 {
        world.completed_generations
    }
}
