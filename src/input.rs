//! Structured input stream consumed by the camera controller.
//!
//! The windowing layer translates platform events into these values and feeds
//! them to [`crate::camera::CameraController::handle_event`] in arrival order,
//! once per frame, on the render thread.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Keys the camera reacts to. Everything else is dropped by the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Forward,
    Back,
    Left,
    Right,
    Up,
    Down,
    RollLeft,
    RollRight,
    Boost,
    FocusSelected,
    ToggleFollowMode,
    ToggleSurfaceView,
    Reset,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMoved { x: f32, y: f32 },
    PointerButton {
        button: PointerButton,
        pressed: bool,
        at: Instant,
    },
    /// Positive scrolls away from the user (zoom in).
    Scroll { delta: f32 },
    Key { key: Key, pressed: bool },
    Resized { width: u32, height: u32 },
}

/// Cursor glyph the window should show over the 3D view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorKind {
    #[default]
    Default,
    Pointer,
}

/// Held movement keys, integrated once per frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyState {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
    pub boost: bool,
}

impl KeyState {
    /// Records a held key; returns `false` for keys that are not held state.
    pub fn set(&mut self, key: Key, pressed: bool) -> bool {
        let slot = match key {
            Key::Forward => &mut self.forward,
            Key::Back => &mut self.back,
            Key::Left => &mut self.left,
            Key::Right => &mut self.right,
            Key::Up => &mut self.up,
            Key::Down => &mut self.down,
            Key::RollLeft => &mut self.roll_left,
            Key::RollRight => &mut self.roll_right,
            Key::Boost => &mut self.boost,
            _ => return false,
        };
        *slot = pressed;
        true
    }

    /// -1, 0 or 1 along (right, up, forward).
    pub fn axes(&self) -> (f32, f32, f32) {
        fn axis(pos: bool, neg: bool) -> f32 {
            (pos as i32 - neg as i32) as f32
        }
        (
            axis(self.right, self.left),
            axis(self.up, self.down),
            axis(self.forward, self.back),
        )
    }

    pub fn roll_axis(&self) -> f32 {
        (self.roll_right as i32 - self.roll_left as i32) as f32
    }

    pub fn any_movement(&self) -> bool {
        self.axes() != (0.0, 0.0, 0.0) || self.roll_axis() != 0.0
    }
}
