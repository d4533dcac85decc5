//! Retained-mode UI toolkit: a control tree with two-pass measure/arrange
//! layout, memoized behind dirty flags, plus input routing (hover, focus,
//! modal blocking, context menus) and a backend-agnostic render command
//! stream.
//!
//! The [`desktop::Desktop`] owns every control in an arena and drives the
//! frame in a fixed order: `update_input` → `update_layout` → command
//! emission → deferred flush ([`desktop::Desktop::run_frame`]). Containers
//! come in four shapes: free panels, [`stack`]s, [`grid`]s with
//! fixed/auto/star tracks, and single-child [`scroll`] viewers.
//!
//! ```no_run
//! use trellis_ui::prelude::*;
//!
//! let mut desktop = Desktop::new(Rect::new(0, 0, 800, 600));
//! let grid = desktop.new_control(ControlKind::Grid(Default::default()));
//! desktop.control_mut(grid).set_columns(vec![
//!     TrackDefinition::pixels(200),
//!     TrackDefinition::star(1.0),
//! ]);
//! desktop.attach_root(grid);
//! let commands = desktop.run_frame(&InputFrame::default(), 0.0);
//! # let _ = commands;
//! ```

pub mod assets;
pub mod color;
pub mod control;
pub mod desktop;
pub mod events;
pub mod grid;
pub mod input;
pub mod math;
pub mod render_commands;
#[cfg(feature = "renderer")]
pub mod renderer;
pub mod scroll;
pub mod stack;
pub mod style;
pub mod transform;
pub mod tree;

mod dispatch;
mod layout;
mod render;

pub mod prelude;

pub use color::Color;
pub use desktop::Desktop;
pub use tree::ControlId;
