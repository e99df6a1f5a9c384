//! Option menus: a list of bars where each row edits one setting.

use padgui_core::{Action, ConfigError, InputHandler};

use crate::context::UiContext;
use crate::image::ImageId;
use crate::region::{BarCell, ListItem, Region};

#[derive(Clone, Debug, PartialEq)]
pub enum MenuOption {
    Checkbox(bool),
    /// The first value is the current one; left and right rotate.
    Choice(Vec<String>),
    /// Returned by the menu when activated.
    Command(String),
    /// Shown but never selected.
    Label,
}

/// Images drawn in option rows. Missing icons fall back to short labels.
#[derive(Clone, Debug, Default)]
pub struct OptionIcons {
    pub checked: Option<ImageId>,
    pub unchecked: Option<ImageId>,
    pub more: Option<ImageId>,
    pub left: Option<ImageId>,
    pub right: Option<ImageId>,
}

impl OptionIcons {
    /// Look up the images named `checked`, `unchecked`, `more`, `left` and
    /// `right`.
    pub fn load(ctx: &mut UiContext) -> Self {
        Self {
            checked: ctx.try_load_image("checked"),
            unchecked: ctx.try_load_image("unchecked"),
            more: ctx.try_load_image("more"),
            left: ctx.try_load_image("left"),
            right: ctx.try_load_image("right"),
        }
    }
}

fn icon(image: Option<ImageId>, fallback: &str) -> BarCell {
    image.map_or_else(|| BarCell::Text(fallback.to_string()), BarCell::Image)
}

/// One list row per option, plus the indices of rows that can be selected.
///
/// Choice rows list the right arrow before the value and the left arrow
/// after it; right-hand bar cells are laid out from the right edge, so they
/// read `< value >` on screen.
pub fn make_option_bar(
    options: &[(String, MenuOption)],
    icons: &OptionIcons,
) -> (Vec<ListItem>, Vec<usize>) {
    let mut rows = Vec::with_capacity(options.len());
    let mut selectable = Vec::new();
    for (i, (key, option)) in options.iter().enumerate() {
        let label = BarCell::Text(key.clone());
        let row = match option {
            MenuOption::Checkbox(true) => vec![label, BarCell::Split, icon(icons.checked, "[x]")],
            MenuOption::Checkbox(false) => {
                vec![label, BarCell::Split, icon(icons.unchecked, "[ ]")]
            }
            MenuOption::Choice(values) => vec![
                label,
                BarCell::Split,
                icon(icons.right, ">"),
                BarCell::Text(values.first().cloned().unwrap_or_default()),
                icon(icons.left, "<"),
            ],
            MenuOption::Command(_) => vec![label, BarCell::Split, icon(icons.more, "...")],
            MenuOption::Label => {
                rows.push(ListItem::Text(key.clone()));
                continue;
            }
        };
        rows.push(ListItem::Bar(row));
        selectable.push(i);
    }
    (rows, selectable)
}

/// Numbers from `low` to `high` in `step`s, rotated so `start` comes first.
///
/// `range_list(50, 0, 100, 10)` is `50, 60, .. 100, 0, 10, .. 40`.
pub fn range_list(start: i64, low: i64, high: i64, step: i64) -> Vec<String> {
    if step <= 0 {
        return vec![start.to_string()];
    }
    let upper = (start..=high).step_by(step as usize);
    let mut below: Vec<i64> = std::iter::successors(Some(start - step), |v| Some(v - step))
        .take_while(|v| *v >= low)
        .collect();
    below.reverse();
    upper.chain(below).map(|v| v.to_string()).collect()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuOutcome {
    /// Nothing happened.
    Idle,
    /// Selection or a value changed; redraw.
    Changed,
    /// Left with B or select; callers discard the edits.
    Cancelled,
    /// A command row was activated.
    Command(String),
    /// Left with start.
    Done,
}

pub struct OptionMenu {
    options: Vec<(String, MenuOption)>,
    icons: OptionIcons,
}

impl OptionMenu {
    pub fn new(options: Vec<(String, MenuOption)>, icons: OptionIcons) -> Self {
        Self { options, icons }
    }

    pub fn options(&self) -> &[(String, MenuOption)] {
        &self.options
    }

    pub fn into_options(self) -> Vec<(String, MenuOption)> {
        self.options
    }

    /// Show the options in `region`, selecting the first editable row.
    pub fn attach(&self, region: &mut Region) -> Result<(), ConfigError> {
        self.rebuild(region)?;
        let first = region.selectable().and_then(|s| s.first().copied());
        region.set_selected(first.unwrap_or(0));
        region.set_selected_x(Some(0));
        Ok(())
    }

    fn rebuild(&self, region: &mut Region) -> Result<(), ConfigError> {
        let selected = region.selected();
        let (rows, selectable) = make_option_bar(&self.options, &self.icons);
        region.set_list(rows)?;
        region.set_selected(selected);
        region.set_selectable(selectable)
    }

    /// Apply one frame of input to the menu shown in `region`.
    pub fn handle(
        &mut self,
        ctx: &mut UiContext,
        region: &mut Region,
        input: &InputHandler,
    ) -> Result<MenuOutcome, ConfigError> {
        let moved = region.update(ctx, input);
        if input.quit() {
            return Ok(MenuOutcome::Cancelled);
        }
        let Some(action) = input.pressed() else {
            return Ok(if moved { MenuOutcome::Changed } else { MenuOutcome::Idle });
        };

        let index = region.selected();
        let Some((key, option)) = self.options.get_mut(index) else {
            return Ok(MenuOutcome::Changed);
        };
        let changed = match (action, option) {
            (Action::B | Action::Select, _) => {
                ctx.play(region.style().cancel_sound.as_deref());
                return Ok(MenuOutcome::Cancelled);
            }
            (Action::Start, _) => return Ok(MenuOutcome::Done),
            (Action::Right | Action::A, MenuOption::Choice(values)) => {
                let n = 1.min(values.len());
                values.rotate_left(n);
                true
            }
            (Action::Left, MenuOption::Choice(values)) => {
                let n = 1.min(values.len());
                values.rotate_right(n);
                true
            }
            (Action::Right | Action::A, MenuOption::Checkbox(on)) => {
                *on = !*on;
                true
            }
            (Action::Right | Action::A, MenuOption::Command(cmd)) => {
                log::debug!("option '{key}' -> command '{cmd}'");
                return Ok(MenuOutcome::Command(cmd.clone()));
            }
            _ => false,
        };
        if changed {
            self.rebuild(region)?;
        }
        // any press redraws
        Ok(MenuOutcome::Changed)
    }
}
