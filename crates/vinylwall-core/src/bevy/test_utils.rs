//! Test utilities for headless Bevy integration tests.
//!
//! Provides `TestApp`, a wrapper around `bevy::app::App` that uses
//! `MinimalPlugins` + `ShelfCorePlugin` for driving the view logic
//! without a rendering or windowing backend.

use bevy::prelude::*;

use crate::bevy::components::{ShelfCamera, SpotPart};
use crate::bevy::events::SpotActivated;
use crate::bevy::plugin::ShelfCorePlugin;
use crate::bevy::resources::{CommandQueue, EffectOutbox, ShelfCommand, ShelfViewState, SideEffect};
use crate::coord::GridCoord;
use crate::shelf::Shelf;

/// A headless Bevy app wrapper for testing.
pub(crate) struct TestApp {
    pub app: App,
}

impl TestApp {
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(bevy::state::app::StatesPlugin);
        app.add_plugins(ShelfCorePlugin::default());
        // Run one update to initialize resources and spawn the camera.
        app.update();
        Self { app }
    }

    /// Run a single frame update.
    pub fn update(&mut self) {
        self.app.update();
    }

    /// Push a command without running a frame.
    pub fn push_command(&mut self, cmd: ShelfCommand) {
        self.app.world().resource::<CommandQueue>().push(cmd);
    }

    /// Push a command and run one frame to process it.
    pub fn command(&mut self, cmd: ShelfCommand) {
        self.push_command(cmd);
        self.update();
    }

    /// Replace the snapshot and let the scene rebuild.
    pub fn load_snapshot(&mut self, shelf: Shelf) {
        self.command(ShelfCommand::ReplaceSnapshot { shelf });
    }

    /// Toggle into edit mode. The extra update lets the state transition
    /// and the placeholder rebuild run.
    pub fn enter_edit_mode(&mut self) {
        self.command(ShelfCommand::ToggleEditMode);
        self.update();
    }

    /// Report a part activation, as the windowed picking layer would.
    pub fn activate(&mut self, coord: GridCoord, part: SpotPart) {
        self.app
            .world_mut()
            .write_message(SpotActivated { coord, part });
    }

    /// Current shelf snapshot, if any.
    pub fn shelf(&self) -> Option<Shelf> {
        self.app.world().resource::<ShelfViewState>().shelf.clone()
    }

    /// Drain all pending side effects.
    pub fn drain_effects(&self) -> Vec<SideEffect> {
        self.app.world().resource::<EffectOutbox>().drain()
    }

    /// The single shelf camera's controller state.
    pub fn single_camera(&mut self) -> ShelfCamera {
        let world = self.app.world_mut();
        let mut query = world.query::<&ShelfCamera>();
        query.single(world).unwrap().clone()
    }

    /// Number of entities carrying component `C`.
    pub fn count<C: Component>(&mut self) -> usize {
        let world = self.app.world_mut();
        let mut query = world.query::<&C>();
        query.iter(world).count()
    }

    pub fn world(&self) -> &World {
        self.app.world()
    }

    #[allow(dead_code)]
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
