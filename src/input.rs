use winit::{
    event::*,
    keyboard::{KeyCode, PhysicalKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Exit,
    Redraw,
}

/// Maps a window event to an application action, if it is one we react to.
pub fn handle_input(event: &WindowEvent) -> Option<InputAction> {
    match event {
        WindowEvent::CloseRequested => Some(InputAction::Exit),
        WindowEvent::KeyboardInput {
            event:
                KeyEvent {
                    state: ElementState::Pressed,
                    physical_key: PhysicalKey::Code(key),
                    repeat: false,
                    ..
                },
            ..
        } => match key {
            KeyCode::Escape => Some(InputAction::Exit),
            // Re-submit the frame on demand; the scene itself never changes.
            KeyCode::KeyR | KeyCode::Space => Some(InputAction::Redraw),
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn close_request_exits() {
        assert_eq!(
            handle_input(&WindowEvent::CloseRequested),
            Some(InputAction::Exit)
        );
    }

    #[test]
    fn unrelated_events_are_ignored() {
        assert_eq!(handle_input(&WindowEvent::Focused(true)), None);
        assert_eq!(handle_input(&WindowEvent::RedrawRequested), None);
    }
}
