use padgui_core::Key;
use winit::keyboard::KeyCode;

/// Physical key to the input vocabulary. Letters are reported lowercase
/// whatever the layout's shift state.
pub fn translate(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::Enter => Key::Enter,
        KeyCode::NumpadEnter => Key::NumpadEnter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Space => Key::Space,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::ControlLeft => Key::ControlLeft,
        KeyCode::AltLeft => Key::AltLeft,
        KeyCode::ShiftLeft => Key::ShiftLeft,
        other => return letter(other).map(Key::Char),
    };
    Some(key)
}

fn letter(code: KeyCode) -> Option<char> {
    const LETTERS: [KeyCode; 26] = [
        KeyCode::KeyA,
        KeyCode::KeyB,
        KeyCode::KeyC,
        KeyCode::KeyD,
        KeyCode::KeyE,
        KeyCode::KeyF,
        KeyCode::KeyG,
        KeyCode::KeyH,
        KeyCode::KeyI,
        KeyCode::KeyJ,
        KeyCode::KeyK,
        KeyCode::KeyL,
        KeyCode::KeyM,
        KeyCode::KeyN,
        KeyCode::KeyO,
        KeyCode::KeyP,
        KeyCode::KeyQ,
        KeyCode::KeyR,
        KeyCode::KeyS,
        KeyCode::KeyT,
        KeyCode::KeyU,
        KeyCode::KeyV,
        KeyCode::KeyW,
        KeyCode::KeyX,
        KeyCode::KeyY,
        KeyCode::KeyZ,
    ];
    LETTERS
        .iter()
        .position(|c| *c == code)
        .map(|i| (b'a' + i as u8) as char)
}

#[cfg(test)]
mod tests {
    use super::*;
    use padgui_core::{Action, InputEvent, InputHandler};

    #[test]
    fn letters_are_lowercase_chars() {
        assert_eq!(translate(KeyCode::KeyZ), Some(Key::Char('z')));
        assert_eq!(translate(KeyCode::KeyA), Some(Key::Char('a')));
        assert_eq!(translate(KeyCode::F1), None);
    }

    #[test]
    fn translated_keys_drive_default_bindings() {
        let mut input = InputHandler::new();
        let events = [KeyCode::KeyZ, KeyCode::Enter]
            .into_iter()
            .filter_map(translate)
            .map(InputEvent::KeyDown);
        input.process(events);
        // the last new press of the frame wins
        assert_eq!(input.pressed(), Some(Action::Start));

        let ctrl = translate(KeyCode::ControlLeft).unwrap();
        input.process([InputEvent::KeyDown(ctrl)]);
        assert_eq!(input.pressed(), Some(Action::L));
    }
}
