use padgui_core::{Anchor, FitError, VAlign};

/// Greedy word wrap.
///
/// Lines that already fit are kept as they are. Longer lines are split on
/// single spaces and refilled word by word; an accumulated line keeps its
/// trailing space, and a line is closed as soon as adding the next word (plus
/// a space) would reach `max_width`. Any word at least `max_width` wide is an
/// error.
pub fn split_lines<F>(text: &str, max_width: i32, measure: F) -> Result<Vec<String>, FitError>
where
    F: Fn(&str) -> i32,
{
    let mut out = Vec::new();
    for line in text.lines() {
        if measure(line) <= max_width {
            out.push(line.to_string());
            continue;
        }
        let words: Vec<&str> = line.split(' ').collect();
        if let Some(word) = words.iter().find(|w| measure(w) >= max_width) {
            return Err(FitError::Unfittable {
                word: word.to_string(),
                width: measure(word),
                available: max_width,
            });
        }
        let mut acc = String::new();
        for word in words {
            let test = format!("{acc}{word} ");
            if measure(&test) < max_width {
                acc = test;
            } else {
                out.push(std::mem::replace(&mut acc, format!("{word} ")));
            }
        }
        out.push(acc);
    }
    Ok(out)
}

/// Top edge of a block of `lines` lines anchored at `y` with `anchor`'s
/// vertical component.
pub fn block_top(anchor: Anchor, y: i32, lines: usize, line_height: i32, linespace: i32) -> i32 {
    if lines == 0 {
        return y;
    }
    let n = lines as i32;
    let block = n * line_height + (n - 1) * linespace;
    match anchor.vertical() {
        VAlign::Top => y,
        VAlign::Middle => y - block.div_euclid(2),
        VAlign::Bottom => y - block,
    }
}
