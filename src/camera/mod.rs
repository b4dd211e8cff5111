//! Camera model and the interaction state machine around it.
//!
//! [`CameraController`] is split across files by concern: event handling and
//! free flight in `controller.rs`, focus/follow in `follow.rs`, standing on a
//! body in `surface.rs`, hover and click handling in `picking.rs`, and
//! distance-dependent damping in `proximity.rs`.

mod controller;
mod follow;
pub mod math;
mod picking;
mod proximity;
mod state;
mod surface;

pub use controller::CameraController;
pub use follow::{Focus, FollowMode, LagrangeTarget};
pub use picking::ContextMenu;
pub use proximity::Proximity;
pub use state::{CameraState, PITCH_LIMIT};
pub use surface::SurfaceView;
