use solarvis_rs::input::{Key, PointerButton};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Physical key layout: WASD flight, Space/Ctrl lift, Q/E roll.
///
/// Only the left Shift and Ctrl are bound. Held keys are single flags.
pub fn map_key(key: PhysicalKey) -> Option<Key> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    let key = match code {
        KeyCode::KeyW => Key::Forward,
        KeyCode::KeyS => Key::Back,
        KeyCode::KeyA => Key::Left,
        KeyCode::KeyD => Key::Right,
        KeyCode::Space => Key::Up,
        KeyCode::ControlLeft => Key::Down,
        KeyCode::KeyQ => Key::RollLeft,
        KeyCode::KeyE => Key::RollRight,
        KeyCode::ShiftLeft => Key::Boost,
        KeyCode::KeyF => Key::FocusSelected,
        KeyCode::KeyG => Key::ToggleFollowMode,
        KeyCode::KeyV => Key::ToggleSurfaceView,
        KeyCode::KeyR => Key::Reset,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}

pub fn map_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Left),
        MouseButton::Right => Some(PointerButton::Right),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_keys_are_mapped() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyW)), Some(Key::Forward));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftLeft)), Some(Key::Boost));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyV)), Some(Key::ToggleSurfaceView));
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::KeyZ)), None);
    }

    #[test]
    fn right_shift_cannot_release_boost() {
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ShiftRight)), None);
        assert_eq!(map_key(PhysicalKey::Code(KeyCode::ControlRight)), None);
    }

    #[test]
    fn extra_mouse_buttons_are_dropped() {
        assert_eq!(map_button(MouseButton::Middle), Some(PointerButton::Middle));
        assert_eq!(map_button(MouseButton::Back), None);
    }
}
