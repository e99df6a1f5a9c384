//! Blocking menu loops. Each one owns the frame loop until the user leaves
//! it; cancelling is an ordinary return value.

use padgui_core::Anchor;
use padgui_ui::{
    AttrMap, Highlight, KeyboardLayout, KeyboardOutcome, MenuOption, MenuOutcome, OnScreenKeyboard,
    OptionIcons, OptionMenu, Region, UiContext,
};

use crate::Platform;

/// How an option menu was left.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuExit {
    /// B, select or quit; the options are untouched.
    Cancelled,
    /// Start; the options hold the edited values.
    Done,
    /// A command row was activated; edits so far are kept.
    Command(String),
}

/// Highlight list entries with the theme's `list` Region when the region
/// doesn't define its own `selected`.
fn theme_highlight(platform: &mut Platform, region: &mut Region) -> anyhow::Result<()> {
    if region.highlight().is_some() || platform.theme().region("list").is_none() {
        return Ok(());
    }
    let mut select = platform.region("list")?;
    let style = region.style();
    let (font, size) = (style.font.clone(), style.fontsize);
    select.set_font(platform.ctx_mut(), font.as_deref(), size)?;
    select.set_align(Anchor::Center);
    region.set_highlight(Some(Highlight::Renderer(Box::new(select))));
    Ok(())
}

/// Edit `options` in `foreground`, drawn over `background`.
///
/// Right or A toggles checkboxes, rotates choices and activates commands;
/// left rotates choices back.
pub fn option_menu(
    platform: &mut Platform,
    foreground: &mut Region,
    background: Option<&Region>,
    options: &mut Vec<(String, MenuOption)>,
) -> anyhow::Result<MenuExit> {
    theme_highlight(platform, foreground)?;
    let icons = OptionIcons::load(platform.ctx_mut());
    let mut menu = OptionMenu::new(options.clone(), icons);
    menu.attach(foreground)?;

    let mut redraw = true;
    loop {
        platform.process();
        let (ctx, input) = platform.ui();
        let exposed = input.redraw_requested();
        match menu.handle(ctx, foreground, input)? {
            MenuOutcome::Cancelled => return Ok(MenuExit::Cancelled),
            MenuOutcome::Done => {
                *options = menu.into_options();
                return Ok(MenuExit::Done);
            }
            MenuOutcome::Command(cmd) => {
                *options = menu.into_options();
                return Ok(MenuExit::Command(cmd));
            }
            MenuOutcome::Changed => redraw = true,
            MenuOutcome::Idle => {}
        }
        if redraw || exposed {
            match background {
                Some(bg) => platform.present(&[bg, foreground]),
                None => platform.present(&[foreground]),
            }
            redraw = false;
        }
        platform.frame_delay();
    }
}

/// Show the typed text above the keys; once it is wider than the keyboard
/// the end stays in view.
fn echo_text(
    ctx: &UiContext,
    echo: &mut Region,
    pad: &Region,
    text: &str,
) -> anyhow::Result<()> {
    echo.set_text(ctx, text)?;
    let width = echo.font().map_or(0, |f| ctx.fonts().width(f, text));
    echo.set_align(if width > pad.area().width {
        Anchor::TopRight
    } else {
        Anchor::TopLeft
    });
    Ok(())
}

/// Let the user edit `text` on an on-screen keyboard styled by `style`.
/// Returns `None` when cancelled.
pub fn keyboard(
    platform: &mut Platform,
    style: &AttrMap,
    lower: KeyboardLayout,
    upper: KeyboardLayout,
    text: &str,
) -> anyhow::Result<Option<String>> {
    let mut pad = Region::new(platform.ctx_mut(), style)?;
    theme_highlight(platform, &mut pad)?;
    let mut kb = OnScreenKeyboard::new(lower, upper, text);
    kb.sync(platform.ctx_mut(), &mut pad)?;

    let mut echo = if platform.theme().region("background").is_some() {
        platform.region("background")?
    } else {
        Region::new(platform.ctx_mut(), &AttrMap::new())?
    };
    let (font, size) = (pad.style().font.clone(), pad.style().fontsize);
    echo.set_font(platform.ctx_mut(), font.as_deref(), size)?;
    echo.style_mut().borderx = pad.area().x;
    echo_text(platform.ctx(), &mut echo, &pad, kb.text())?;

    let mut redraw = true;
    loop {
        let input = platform.process();
        if input.quit() {
            return Ok(None);
        }
        let (pressed, exposed) = (input.pressed(), input.redraw_requested());
        match kb.handle(pressed) {
            KeyboardOutcome::Done(text) => return Ok(Some(text)),
            KeyboardOutcome::Cancelled => return Ok(None),
            KeyboardOutcome::Changed => {
                kb.sync(platform.ctx_mut(), &mut pad)?;
                echo_text(platform.ctx(), &mut echo, &pad, kb.text())?;
                redraw = true;
            }
            KeyboardOutcome::Idle => {}
        }
        if redraw || exposed {
            platform.present(&[&echo, &pad]);
            redraw = false;
        }
        platform.frame_delay();
    }
}
