//! Frame-driven glue between the generate trigger, the grid world and the scene.

use std::sync::{Mutex, PoisonError};

use isogrid_core::{
    Dispatch, Event, GridParameters, LayerContainers, ScreenPosition, MAX_DIMENSION,
    MIN_DIMENSION,
};
use isogrid_rendering::{FrameInput, Scene, SceneGraph};
use isogrid_system_bootstrap::GenerateTrigger;
use isogrid_world::{self as world, query, GenerationState, GridSettings, World};
use log::{error, trace};

/// Highest obstacle count the steppers allow: one per cell of the largest grid.
const MAX_OBSTACLES: u32 = MAX_DIMENSION * MAX_DIMENSION;

/// Creates the tile and obstacle containers the world places into.
pub(crate) fn create_containers(graph: &mut SceneGraph) -> LayerContainers {
    LayerContainers::new(
        graph.create_container("Tiles", ScreenPosition::ZERO),
        graph.create_container("Obstacles", ScreenPosition::ZERO),
    )
}

/// Owns the world and advances it one phase per frame.
#[derive(Debug)]
pub(crate) struct GridApp {
    world: World,
    trigger: &'static Mutex<GenerateTrigger>,
    dispatches: Vec<Dispatch>,
    events: Vec<Event>,
    last_error: Option<String>,
}

impl GridApp {
    /// Subscribes a new world to the trigger.
    pub(crate) fn new(
        settings: GridSettings,
        containers: LayerContainers,
        trigger: &'static Mutex<GenerateTrigger>,
    ) -> Self {
        let subscriber = lock(trigger).subscribe();
        Self {
            world: World::new(settings, containers, subscriber),
            trigger,
            dispatches: Vec::new(),
            events: Vec::new(),
            last_error: None,
        }
    }

    /// Processes one frame of input and runs at most one generation phase.
    pub(crate) fn frame(&mut self, input: FrameInput, scene: &mut Scene) {
        if input.adjusts_parameters() {
            let adjusted = adjust(query::parameters(&self.world), input);
            self.world.set_parameters(adjusted);
        }

        if input.generate_pressed {
            lock(self.trigger).press(&mut self.dispatches);
            match world::handle(&mut self.world, &self.dispatches, &mut self.events) {
                Ok(()) => self.last_error = None,
                Err(failure) => {
                    error!("grid generation failed: {failure}");
                    self.last_error = Some(failure.to_string());
                }
            }
            self.dispatches.clear();
        }

        if let Err(failure) = world::advance(&mut self.world, &mut scene.graph, &mut self.events) {
            error!("grid generation failed: {failure}");
            self.last_error = Some(failure.to_string());
        }

        for event in self.events.drain(..) {
            trace!("{event:?}");
        }
        self.refresh_status(scene);
    }

    /// Whether a generation is in flight.
    pub(crate) fn is_generating(&self) -> bool {
        query::state(&self.world) == GenerationState::Generating
    }

    /// Message of the last failed request, if the latest request failed.
    pub(crate) fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    fn refresh_status(&self, scene: &mut Scene) {
        let status = &mut scene.status;
        status.parameters = query::parameters(&self.world);
        status.generating = self.is_generating();
        status.tiles = query::tile_layer(&self.world).len();
        status.obstacles = query::obstacle_layer(&self.world).len();
        status.last_error = self.last_error.clone();
    }
}

/// Applies stepper deltas, keeping dimensions inside the supported range.
fn adjust(parameters: GridParameters, input: FrameInput) -> GridParameters {
    let step = |value: u32, delta: i32, min: u32, max: u32| {
        value.saturating_add_signed(delta).clamp(min, max)
    };
    let width = step(parameters.width(), input.width_delta, MIN_DIMENSION, MAX_DIMENSION);
    let height = step(parameters.height(), input.height_delta, MIN_DIMENSION, MAX_DIMENSION);
    let obstacles = step(parameters.obstacle_count(), input.obstacle_delta, 0, MAX_OBSTACLES);
    parameters
        .with_width(width)
        .with_height(height)
        .with_obstacle_count(obstacles)
}

fn lock(trigger: &Mutex<GenerateTrigger>) -> std::sync::MutexGuard<'_, GenerateTrigger> {
    trigger.lock().unwrap_or_else(PoisonError::into_inner)
}
