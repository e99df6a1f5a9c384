//! Platform-neutral input vocabulary and per-frame edge detection.
//!
//! Keyboard, controller buttons and analog axes are all folded into the same
//! small set of [`Action`]s. [`InputHandler::process`] is called once per
//! frame with whatever events the platform collected; afterwards
//! [`InputHandler::pressed`] holds at most one action for that frame.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    A,
    B,
    X,
    Y,
    L,
    R,
    Start,
    Select,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::A,
        Action::B,
        Action::X,
        Action::Y,
        Action::L,
        Action::R,
        Action::Start,
        Action::Select,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::A => "A",
            Action::B => "B",
            Action::X => "X",
            Action::Y => "Y",
            Action::L => "L",
            Action::R => "R",
            Action::Start => "start",
            Action::Select => "select",
        }
    }

    /// Only the directions auto-repeat while held.
    pub fn can_repeat(self) -> bool {
        matches!(
            self,
            Action::Up | Action::Down | Action::Left | Action::Right
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown action '{0}'")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|a| a.name() == s)
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Keyboard keys the default bindings care about. Letters are lowercase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Enter,
    NumpadEnter,
    Escape,
    Space,
    Backspace,
    ControlLeft,
    AltLeft,
    ShiftLeft,
    Char(char),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    KeyDown(Key),
    KeyUp(Key),
    ButtonDown(u8),
    ButtonUp(u8),
    AxisMotion { axis: u8, value: i16 },
    /// The window needs repainting.
    Exposed,
    ControllerAdded(u32),
}

pub const REPEAT_RATE: i32 = 5;
pub const REPEAT_DELAY: i32 = 10;
/// Raw axis values are divided by this and rounded, giving -1, 0 or 1.
pub const AXIS_MOD: f64 = 32768.0 * 1.2;

pub fn default_key_map() -> HashMap<Key, Action> {
    HashMap::from([
        (Key::ArrowUp, Action::Up),
        (Key::ArrowRight, Action::Right),
        (Key::ArrowDown, Action::Down),
        (Key::ArrowLeft, Action::Left),
        (Key::NumpadEnter, Action::Start),
        (Key::Enter, Action::Start),
        (Key::Escape, Action::Select),
        (Key::Space, Action::A),
        (Key::Char('z'), Action::A),
        (Key::Char('x'), Action::B),
        (Key::Char('a'), Action::X),
        (Key::Char('s'), Action::Y),
        (Key::ControlLeft, Action::L),
        (Key::AltLeft, Action::R),
    ])
}

pub fn default_button_map() -> HashMap<u8, Action> {
    HashMap::from([
        (11, Action::Up),
        (12, Action::Down),
        (13, Action::Left),
        (14, Action::Right),
        (0, Action::A),
        (1, Action::B),
        (2, Action::X),
        (3, Action::Y),
        (9, Action::L),
        (10, Action::R),
        (4, Action::Select),
        (6, Action::Start),
    ])
}

pub fn default_axis_map() -> HashMap<(u8, i8), Action> {
    HashMap::from([
        ((1, -1), Action::Up),
        ((1, 1), Action::Down),
        ((0, -1), Action::Left),
        ((0, 1), Action::Right),
    ])
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Key(Key),
    Button(u8),
    Axis(u8),
}

pub struct InputHandler {
    key_map: HashMap<Key, Action>,
    button_map: HashMap<u8, Action>,
    axis_map: HashMap<(u8, i8), Action>,
    keys: HashMap<Key, bool>,
    buttons: HashMap<u8, bool>,
    axes: HashMap<u8, i8>,
    last_press: Option<(Source, Action)>,
    held_for: i32,
    pressed: Option<Action>,
    quit: bool,
    redraw: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            key_map: default_key_map(),
            button_map: default_button_map(),
            axis_map: default_axis_map(),
            keys: HashMap::new(),
            buttons: HashMap::new(),
            axes: HashMap::new(),
            last_press: None,
            held_for: 0,
            pressed: None,
            quit: false,
            redraw: false,
        }
    }

    pub fn with_key_map(mut self, map: HashMap<Key, Action>) -> Self {
        self.key_map = map;
        self
    }
    pub fn with_button_map(mut self, map: HashMap<u8, Action>) -> Self {
        self.button_map = map;
        self
    }
    pub fn with_axis_map(mut self, map: HashMap<(u8, i8), Action>) -> Self {
        self.axis_map = map;
        self
    }

    /// The action produced this frame, if any.
    pub fn pressed(&self) -> Option<Action> {
        self.pressed
    }
    pub fn quit(&self) -> bool {
        self.quit
    }
    pub fn redraw_requested(&self) -> bool {
        self.redraw
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.keys
            .iter()
            .any(|(k, down)| *down && self.key_map.get(k) == Some(&action))
            || self
                .buttons
                .iter()
                .any(|(b, down)| *down && self.button_map.get(b) == Some(&action))
            || self
                .axes
                .iter()
                .any(|(a, v)| *v != 0 && self.axis_map.get(&(*a, *v)) == Some(&action))
    }

    /// Inject a press from outside the event stream (scripted input, tests).
    pub fn press(&mut self, action: Action) {
        self.pressed = Some(action);
    }

    fn begin_press(&mut self, source: Source, action: Action) {
        self.pressed = Some(action);
        self.last_press = Some((source, action));
        self.held_for = -REPEAT_DELAY;
    }

    fn source_held(&self, source: Source) -> bool {
        match source {
            Source::Key(k) => self.keys.get(&k).copied().unwrap_or(false),
            Source::Button(b) => self.buttons.get(&b).copied().unwrap_or(false),
            Source::Axis(a) => self.axes.get(&a).is_some_and(|v| *v != 0),
        }
    }

    pub fn process<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.pressed = None;
        self.redraw = false;

        for event in events {
            match event {
                InputEvent::Quit => self.quit = true,
                InputEvent::ControllerAdded(id) => log::info!("controller {id} connected"),
                InputEvent::KeyDown(key) => {
                    if key == Key::Escape {
                        self.quit = true;
                    }
                    // OS key repeat arrives as repeated KeyDown; only the
                    // first one counts.
                    if !self.keys.get(&key).copied().unwrap_or(false) {
                        self.keys.insert(key, true);
                        if let Some(&action) = self.key_map.get(&key) {
                            self.begin_press(Source::Key(key), action);
                        }
                    }
                }
                InputEvent::KeyUp(key) => {
                    self.keys.insert(key, false);
                }
                InputEvent::ButtonDown(button) => {
                    if !self.buttons.get(&button).copied().unwrap_or(false) {
                        self.buttons.insert(button, true);
                        if let Some(&action) = self.button_map.get(&button) {
                            self.begin_press(Source::Button(button), action);
                        }
                    }
                }
                InputEvent::ButtonUp(button) => {
                    self.buttons.insert(button, false);
                }
                InputEvent::AxisMotion { axis, value } => {
                    let v = (value as f64 / AXIS_MOD).round() as i8;
                    if v != 0
                        && self.axes.get(&axis) != Some(&v)
                        && let Some(&action) = self.axis_map.get(&(axis, v))
                    {
                        self.begin_press(Source::Axis(axis), action);
                    }
                    self.axes.insert(axis, v);
                }
                InputEvent::Exposed => self.redraw = true,
            }
        }

        if let Some((source, action)) = self.last_press
            && action.can_repeat()
            && self.source_held(source)
        {
            self.held_for += 1;
            if self.held_for > REPEAT_RATE {
                self.held_for = 0;
                self.pressed = Some(action);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle(h: &mut InputHandler) {
        h.process(std::iter::empty());
    }

    #[test]
    fn press_is_an_edge() {
        let mut h = InputHandler::new();
        h.process([InputEvent::KeyDown(Key::Char('z'))]);
        assert_eq!(h.pressed(), Some(Action::A));
        // held: OS repeat and idle frames never re-emit A
        h.process([InputEvent::KeyDown(Key::Char('z'))]);
        assert_eq!(h.pressed(), None);
        for _ in 0..40 {
            idle(&mut h);
            assert_eq!(h.pressed(), None);
        }
        h.process([InputEvent::KeyUp(Key::Char('z'))]);
        h.process([InputEvent::KeyDown(Key::Char('z'))]);
        assert_eq!(h.pressed(), Some(Action::A));
    }

    #[test]
    fn held_direction_repeats_after_delay() {
        let mut h = InputHandler::new();
        h.process([InputEvent::ButtonDown(12)]);
        assert_eq!(h.pressed(), Some(Action::Down));

        let mut fired = Vec::new();
        for frame in 1..=30 {
            idle(&mut h);
            if h.pressed() == Some(Action::Down) {
                fired.push(frame);
            }
        }
        let first = (REPEAT_DELAY + REPEAT_RATE) as usize;
        let step = (REPEAT_RATE + 1) as usize;
        assert_eq!(fired, vec![first, first + step, first + 2 * step]);

        h.process([InputEvent::ButtonUp(12)]);
        for _ in 0..20 {
            idle(&mut h);
            assert_eq!(h.pressed(), None);
        }
    }

    #[test]
    fn axis_quantizes_and_detects_changes() {
        let mut h = InputHandler::new();
        h.process([InputEvent::AxisMotion { axis: 1, value: 9000 }]);
        assert_eq!(h.pressed(), None);
        h.process([InputEvent::AxisMotion { axis: 1, value: 30000 }]);
        assert_eq!(h.pressed(), Some(Action::Down));
        h.process([InputEvent::AxisMotion { axis: 1, value: 32000 }]);
        assert_eq!(h.pressed(), None);
        h.process([InputEvent::AxisMotion { axis: 1, value: -32768 }]);
        assert_eq!(h.pressed(), Some(Action::Up));
        h.process([InputEvent::AxisMotion { axis: 1, value: 0 }]);
        for _ in 0..20 {
            idle(&mut h);
            assert_eq!(h.pressed(), None);
        }
    }

    #[test]
    fn escape_quits_and_selects() {
        let mut h = InputHandler::new();
        h.process([InputEvent::KeyDown(Key::Escape)]);
        assert!(h.quit());
        assert_eq!(h.pressed(), Some(Action::Select));
    }

    #[test]
    fn exposed_requests_redraw_for_one_frame() {
        let mut h = InputHandler::new();
        h.process([InputEvent::Exposed]);
        assert!(h.redraw_requested());
        idle(&mut h);
        assert!(!h.redraw_requested());
    }

    #[test]
    fn is_held_follows_sources() {
        let mut h = InputHandler::new();
        h.process([InputEvent::KeyDown(Key::ArrowLeft)]);
        assert!(h.is_held(Action::Left));
        h.process([InputEvent::KeyUp(Key::ArrowLeft)]);
        assert!(!h.is_held(Action::Left));
    }

    #[test]
    fn action_names_round_trip() {
        assert_eq!("start".parse::<Action>(), Ok(Action::Start));
        assert!("jump".parse::<Action>().is_err());
    }
}
