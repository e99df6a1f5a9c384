use std::path::Path;

use padgui_core::Action;
use padgui_platform::{MenuExit, Platform, keyboard, option_menu};
use padgui_ui::{KeyboardLayout, MenuOption, range_list};

fn layout(rows: &[&str]) -> anyhow::Result<KeyboardLayout> {
    let mut keys: Vec<Vec<Option<String>>> = rows
        .iter()
        .map(|r| r.chars().map(|c| Some(c.to_string())).collect())
        .collect();
    keys.push(
        [Some("shift"), Some("space"), Some("back"), None, Some("done")]
            .into_iter()
            .map(|k| k.map(str::to_string))
            .collect(),
    );
    Ok(KeyboardLayout::new(keys)?)
}

fn status_line(options: &[(String, MenuOption)], name: &str) -> String {
    let mut parts = vec![format!("name: {name}")];
    for (key, option) in options {
        match option {
            MenuOption::Checkbox(on) => {
                parts.push(format!("{key}: {}", if *on { "on" } else { "off" }))
            }
            MenuOption::Choice(values) => {
                parts.push(format!("{key}: {}", values.first().map_or("", String::as_str)))
            }
            _ => {}
        }
    }
    parts.join("  ")
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("theme");
    let mut platform = Platform::init(&dir, &args)?;

    let background = platform.region("background")?;
    let title = platform.region("title")?;
    let mut main_menu = platform.region("main")?;
    let mut status = platform.region("status")?;

    let mut options = vec![
        ("Audio".to_string(), MenuOption::Label),
        ("Sound".to_string(), MenuOption::Checkbox(true)),
        ("Volume".to_string(), MenuOption::Choice(range_list(50, 0, 100, 10))),
        (
            "Scale".to_string(),
            MenuOption::Choice(vec!["fit".into(), "stretch".into(), "native".into()]),
        ),
        ("Reset".to_string(), MenuOption::Command("reset".into())),
    ];
    let defaults = options.clone();
    let lower = layout(&["1234567890", "qwertyuiop", "asdfghjkl", "zxcvbnm.-"])?;
    let upper = layout(&["!@#$%^&*()", "QWERTYUIOP", "ASDFGHJKL", "ZXCVBNM,_"])?;
    let mut name = String::from("player");

    status.set_text(platform.ctx(), &status_line(&options, &name))?;
    let mut redraw = true;
    loop {
        platform.process();
        let (ctx, input) = platform.ui();
        if input.quit() {
            break;
        }
        let pressed = input.pressed();
        redraw |= main_menu.update(ctx, input) || input.redraw_requested();

        if matches!(pressed, Some(Action::A | Action::Start)) {
            match main_menu.selected() {
                0 => {
                    let mut settings = platform.region("settings")?;
                    let exit =
                        option_menu(&mut platform, &mut settings, Some(&background), &mut options)?;
                    match exit {
                        MenuExit::Command(cmd) if cmd == "reset" => options = defaults.clone(),
                        MenuExit::Command(cmd) => log::warn!("unhandled command '{cmd}'"),
                        MenuExit::Done | MenuExit::Cancelled => {}
                    }
                }
                1 => {
                    let style = platform.theme().region("keyboard").cloned().unwrap_or_default();
                    if let Some(text) =
                        keyboard(&mut platform, &style, lower.clone(), upper.clone(), &name)?
                    {
                        name = text;
                    }
                }
                2 => {
                    let mut credits = platform.region("credits")?;
                    platform.present(&[&background, &title, &credits]);
                    loop {
                        platform.process();
                        let (ctx, input) = platform.ui();
                        if input.quit() || input.pressed().is_some() {
                            break;
                        }
                        if credits.update(ctx, input) || input.redraw_requested() {
                            platform.present(&[&background, &title, &credits]);
                        }
                        platform.frame_delay();
                    }
                }
                _ => break,
            }
            status.set_text(platform.ctx(), &status_line(&options, &name))?;
            redraw = true;
        }

        if redraw {
            platform.present(&[&background, &title, &main_menu, &status]);
            redraw = false;
        }
        platform.frame_delay();
    }
    log::info!("bye");
    Ok(())
}
