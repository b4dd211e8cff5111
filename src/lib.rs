//! Camera and interaction core for a solar-system viewer.
//!
//! The library is windowing-agnostic: the binary translates platform events
//! into [`input::InputEvent`]s and feeds them, together with the per-frame
//! [`world::World`], to a single [`camera::CameraController`].

pub mod body;
pub mod camera;
pub mod catalog;
pub mod ephemeris;
pub mod error;
pub mod input;
pub mod settings;
pub mod world;
