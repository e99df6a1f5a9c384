//! On-screen keyboard driven by directional input.

use padgui_core::{Action, ConfigError};
use serde_json::Value;

use crate::context::UiContext;
use crate::region::{BarCell, ListItem, Region, resolve_cell};

/// Rows of keys. `None` splits a row into left and right groups.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyboardLayout {
    rows: Vec<Vec<Option<String>>>,
}

impl KeyboardLayout {
    /// Every row needs at least one key; the last row starts with the shift,
    /// space, backspace and done keys.
    pub fn new(rows: Vec<Vec<Option<String>>>) -> Result<Self, ConfigError> {
        let layout = Self { rows };
        if layout.rows.is_empty() || (0..layout.rows.len()).any(|r| layout.keys(r).is_empty()) {
            return Err(ConfigError::invalid("keyboard", "rows with at least one key", "an empty row"));
        }
        if layout.keys(layout.rows.len() - 1).len() < 4 {
            return Err(ConfigError::invalid(
                "keyboard",
                "a last row of shift, space, backspace and done",
                format!("{:?}", layout.keys(layout.rows.len() - 1)),
            ));
        }
        Ok(layout)
    }

    /// Rows given as strings become one key per character.
    pub fn from_strs(rows: &[&str]) -> Result<Self, ConfigError> {
        Self::new(
            rows.iter()
                .map(|r| r.chars().map(|c| Some(c.to_string())).collect())
                .collect(),
        )
    }

    /// A JSON list whose rows are strings (one key per character) or lists
    /// of key names and nulls.
    pub fn from_json(key: &str, v: &Value) -> Result<Self, ConfigError> {
        let rows = v
            .as_array()
            .ok_or_else(|| ConfigError::invalid(key, "a list of rows", v))?;
        let rows = rows
            .iter()
            .map(|row| match row {
                Value::String(s) => Ok(s.chars().map(|c| Some(c.to_string())).collect()),
                Value::Array(keys) => keys
                    .iter()
                    .map(|k| match k {
                        Value::Null => Ok(None),
                        Value::String(s) if s.is_empty() => Ok(None),
                        Value::String(s) => Ok(Some(s.clone())),
                        other => Err(ConfigError::invalid(key, "key names or null", other)),
                    })
                    .collect(),
                other => Err(ConfigError::invalid(key, "a string or a list of keys", other)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rows)
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Keys of `row` in selection order, splits removed.
    pub fn keys(&self, row: usize) -> Vec<&str> {
        self.rows
            .get(row)
            .map(|r| r.iter().flatten().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn specials(&self) -> [&str; 4] {
        let last = self.keys(self.rows.len() - 1);
        [last[0], last[1], last[2], last[3]]
    }

    /// Bar rows for a Region list; key names that are images become image
    /// cells.
    pub fn list_items(&self, ctx: &mut UiContext) -> Vec<ListItem> {
        self.rows
            .iter()
            .map(|row| {
                ListItem::Bar(
                    row.iter()
                        .map(|k| match k {
                            Some(name) if name.chars().count() == 1 => BarCell::Text(name.clone()),
                            Some(name) => resolve_cell(ctx, name),
                            None => BarCell::Split,
                        })
                        .collect(),
                )
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyboardOutcome {
    Idle,
    Changed,
    /// Finished; `_` placeholders are turned back into spaces.
    Done(String),
    Cancelled,
}

/// Text entry state: two layouts, a cursor over the visible keys and the
/// text typed so far. Spaces are kept as `_` while editing.
#[derive(Clone, Debug)]
pub struct OnScreenKeyboard {
    lower: KeyboardLayout,
    upper: KeyboardLayout,
    upper_active: bool,
    row: usize,
    col: usize,
    text: String,
}

impl OnScreenKeyboard {
    pub fn new(lower: KeyboardLayout, upper: KeyboardLayout, text: &str) -> Self {
        let mut kb = Self {
            lower,
            upper,
            upper_active: false,
            row: 1,
            col: 1,
            text: text.replace(' ', "_"),
        };
        kb.clamp_cursor();
        kb
    }

    pub fn layout(&self) -> &KeyboardLayout {
        if self.upper_active { &self.upper } else { &self.lower }
    }

    pub fn is_upper(&self) -> bool {
        self.upper_active
    }

    /// (row, index among the row's visible keys)
    pub fn cursor(&self) -> (usize, usize) {
        (self.row, self.col)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn clamp_cursor(&mut self) {
        let rows = self.layout().rows();
        self.row = self.row.min(rows - 1);
        let keys = self.layout().keys(self.row).len();
        self.col = self.col.min(keys - 1);
    }

    fn finish(&self) -> KeyboardOutcome {
        KeyboardOutcome::Done(self.text.replace('_', " "))
    }

    fn press_key(&mut self) -> KeyboardOutcome {
        let key = self.layout().keys(self.row)[self.col].to_string();
        let [shift, space, backspace, done] = self.layout().specials().map(str::to_string);
        if key.chars().count() == 1 {
            self.text.push_str(&key);
        } else if key == space {
            self.text.push('_');
        } else if key == backspace {
            self.text.pop();
        } else if key == shift {
            self.toggle_case();
        } else if key == done {
            return self.finish();
        } else {
            log::debug!("keyboard key '{key}' does nothing");
            return KeyboardOutcome::Idle;
        }
        KeyboardOutcome::Changed
    }

    fn toggle_case(&mut self) {
        self.upper_active = !self.upper_active;
        self.clamp_cursor();
    }

    pub fn handle(&mut self, action: Option<Action>) -> KeyboardOutcome {
        let Some(action) = action else {
            return KeyboardOutcome::Idle;
        };
        let rows = self.layout().rows();
        match action {
            Action::Up => {
                self.row = (self.row + rows - 1) % rows;
                self.clamp_cursor();
            }
            Action::Down => {
                self.row = (self.row + 1) % rows;
                self.clamp_cursor();
            }
            Action::Left => {
                let keys = self.layout().keys(self.row).len();
                self.col = (self.col + keys - 1) % keys;
            }
            Action::Right => {
                let keys = self.layout().keys(self.row).len();
                self.col = (self.col + 1) % keys;
            }
            Action::Start => return self.finish(),
            Action::B | Action::Select => return KeyboardOutcome::Cancelled,
            Action::X | Action::Y => self.toggle_case(),
            Action::L => {
                self.text.pop();
            }
            Action::R => self.text.push('_'),
            Action::A => return self.press_key(),
        }
        KeyboardOutcome::Changed
    }

    /// Show the current layout and cursor in `region`.
    pub fn sync(&self, ctx: &mut UiContext, region: &mut Region) -> Result<(), ConfigError> {
        region.set_list(self.layout().list_items(ctx))?;
        region.set_selected(self.row);
        region.set_selected_x(Some(self.col));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{attrs, ctx};
    use serde_json::json;

    fn special_row() -> Vec<Option<String>> {
        ["shift", "space", "back", "done"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect()
    }

    fn layouts() -> (KeyboardLayout, KeyboardLayout) {
        let make = |rows: [&str; 2]| {
            let mut r: Vec<Vec<Option<String>>> = rows
                .iter()
                .map(|s| s.chars().map(|c| Some(c.to_string())).collect())
                .collect();
            r.push(special_row());
            KeyboardLayout::new(r).unwrap()
        };
        (make(["abc", "defgh"]), make(["ABC", "DEFGH"]))
    }

    #[test]
    fn cursor_wraps_rows_and_clamps_columns() {
        let (lower, upper) = layouts();
        let mut kb = OnScreenKeyboard::new(lower, upper, "");
        assert_eq!(kb.cursor(), (1, 1));
        kb.handle(Some(Action::Right));
        kb.handle(Some(Action::Right));
        kb.handle(Some(Action::Right));
        assert_eq!(kb.cursor(), (1, 4));
        kb.handle(Some(Action::Up));
        assert_eq!(kb.cursor(), (0, 2));
        kb.handle(Some(Action::Up));
        assert_eq!(kb.cursor(), (2, 2));
        kb.handle(Some(Action::Right));
        kb.handle(Some(Action::Right));
        assert_eq!(kb.cursor(), (2, 0));
        kb.handle(Some(Action::Left));
        assert_eq!(kb.cursor(), (2, 3));
    }

    #[test]
    fn typing_with_shift_space_and_backspace() {
        let (lower, upper) = layouts();
        let mut kb = OnScreenKeyboard::new(lower, upper, "hi there");
        assert_eq!(kb.text(), "hi_there");

        kb.handle(Some(Action::Up)); // row 0, 'b'
        kb.handle(Some(Action::A));
        kb.handle(Some(Action::X));
        kb.handle(Some(Action::A));
        assert!(kb.is_upper());
        kb.handle(Some(Action::R));
        assert_eq!(kb.text(), "hi_therebB_");
        kb.handle(Some(Action::L));
        assert_eq!(kb.text(), "hi_therebB");

        // last row: shift, space, back, done
        kb.handle(Some(Action::Up));
        kb.handle(Some(Action::A)); // space
        kb.handle(Some(Action::Right));
        kb.handle(Some(Action::A)); // back
        kb.handle(Some(Action::Right));
        assert_eq!(kb.text(), "hi_therebB");
        assert_eq!(
            kb.handle(Some(Action::A)),
            KeyboardOutcome::Done("hi therebB".into())
        );
    }

    #[test]
    fn cancel_start_and_idle() {
        let (lower, upper) = layouts();
        let mut kb = OnScreenKeyboard::new(lower, upper, "a b");
        assert_eq!(kb.handle(None), KeyboardOutcome::Idle);
        assert_eq!(kb.handle(Some(Action::B)), KeyboardOutcome::Cancelled);
        assert_eq!(kb.handle(Some(Action::Start)), KeyboardOutcome::Done("a b".into()));
    }

    #[test]
    fn json_rows_expand_strings_and_keep_splits() {
        let layout = KeyboardLayout::from_json(
            "keyboard",
            &json!(["qwe", ["shift", "space", "back", null, "done"]]),
        )
        .unwrap();
        assert_eq!(layout.keys(0), vec!["q", "w", "e"]);
        assert_eq!(layout.keys(1), vec!["shift", "space", "back", "done"]);
        assert!(KeyboardLayout::from_json("keyboard", &json!(["abc"])).is_err());
        assert!(KeyboardLayout::from_strs(&["abc", "", "wxyz"]).is_err());
    }

    #[test]
    fn sync_shows_cursor_in_region() {
        let mut ctx = ctx();
        let mut region = Region::new(
            &mut ctx,
            &attrs(json!({"area": [0, 0, 300, 60], "font": "mono", "fontsize": 10})),
        )
        .unwrap();
        let (lower, upper) = layouts();
        let mut kb = OnScreenKeyboard::new(lower, upper, "");
        kb.handle(Some(Action::Down));
        kb.sync(&mut ctx, &mut region).unwrap();
        assert_eq!(region.list().len(), 3);
        assert_eq!(region.selected(), 2);
        assert_eq!(region.selected_x(), Some(1));
    }
}
