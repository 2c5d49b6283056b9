use std::io::Write;

use coverdiff_core::{AlignedComparison, ComparisonResult, WarrantyCategory};
use owo_colors::OwoColorize;

/// Width of each of the two panels, in characters.
pub const COLUMN_WIDTH: usize = 38;

const GUTTER: &str = " | ";

/// Shown for a category that is present but lists no warranties.
pub const NO_WARRANTIES: &str = "(aucune garantie)";

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Render both tables side by side, one block per aligned category.
pub fn print_comparison(
    w: &mut dyn Write,
    result: &ComparisonResult,
    placeholder: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let aligned = result.align();

    print_header(w, &result.left.name, &result.right.name, color)?;
    for pair in &aligned {
        writeln!(w)?;
        if color.enabled() {
            writeln!(w, "{}", pair.name.bold().cyan())?;
        } else {
            writeln!(w, "{}", pair.name)?;
        }
        let left = panel(pair.left, placeholder);
        let right = panel(pair.right, placeholder);
        print_rows(w, &left, &right, color)?;
    }

    print_summary(w, &aligned, color)
}

fn print_header(
    w: &mut dyn Write,
    left: &str,
    right: &str,
    color: ColorMode,
) -> std::io::Result<()> {
    let sep = "=".repeat(COLUMN_WIDTH * 2 + GUTTER.len());
    let left = fit(left);
    let right = fit(right);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}{}{}", left.bold(), GUTTER, right.bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "{}{}{}", left, GUTTER, right)?;
        writeln!(w, "{}", sep)?;
    }
    Ok(())
}

/// A single panel's content before it is laid out next to its neighbor.
#[derive(Debug, PartialEq)]
enum Line {
    Title(String),
    Body(String),
    Note(String),
    Placeholder(String),
}

impl Line {
    fn text(&self) -> &str {
        match self {
            Line::Title(s) | Line::Body(s) | Line::Note(s) | Line::Placeholder(s) => s,
        }
    }
}

fn panel(category: Option<&WarrantyCategory>, placeholder: &str) -> Vec<Line> {
    let Some(category) = category else {
        return wrap(placeholder, COLUMN_WIDTH)
            .into_iter()
            .map(Line::Placeholder)
            .collect();
    };

    if category.warranties.is_empty() {
        return vec![Line::Note(NO_WARRANTIES.to_string())];
    }

    let mut lines = Vec::new();
    for warranty in &category.warranties {
        lines.extend(wrap(&warranty.name, COLUMN_WIDTH).into_iter().map(Line::Title));
        lines.extend(
            wrap(&warranty.summary, COLUMN_WIDTH - 2)
                .into_iter()
                .map(|l| Line::Body(format!("  {l}"))),
        );
        if !warranty.special_rules.trim().is_empty() {
            lines.extend(
                wrap(&format!("* {}", warranty.special_rules), COLUMN_WIDTH - 2)
                    .into_iter()
                    .map(|l| Line::Body(format!("  {l}"))),
            );
        }
    }
    lines
}

fn print_rows(
    w: &mut dyn Write,
    left: &[Line],
    right: &[Line],
    color: ColorMode,
) -> std::io::Result<()> {
    let rows = left.len().max(right.len());
    for i in 0..rows {
        let l = cell(left.get(i), color);
        let r = cell(right.get(i), color);
        writeln!(w, "{}{}{}", l, GUTTER, r.trim_end())?;
    }
    Ok(())
}

fn cell(line: Option<&Line>, color: ColorMode) -> String {
    let Some(line) = line else {
        return " ".repeat(COLUMN_WIDTH);
    };
    // Pad on the plain text so escape codes don't skew the columns.
    let padded = fit(line.text());
    if !color.enabled() {
        return padded;
    }
    match line {
        Line::Title(_) => padded.bold().to_string(),
        Line::Body(_) => padded,
        Line::Note(_) => padded.dimmed().to_string(),
        Line::Placeholder(_) => padded.dimmed().italic().to_string(),
    }
}

fn print_summary(
    w: &mut dyn Write,
    aligned: &AlignedComparison<'_>,
    color: ColorMode,
) -> std::io::Result<()> {
    let shared = aligned.iter().filter(|p| p.is_shared()).count();
    let left_only = aligned.iter().filter(|p| p.right.is_none()).count();
    let right_only = aligned.iter().filter(|p| p.left.is_none()).count();

    writeln!(w)?;
    let line = format!(
        "{} categories: {} shared, {} only in the first table, {} only in the second",
        aligned.len(),
        shared,
        left_only,
        right_only
    );
    if color.enabled() {
        writeln!(w, "{}", line.dimmed())?;
    } else {
        writeln!(w, "{}", line)?;
    }

    if aligned.shadowed() > 0 {
        let msg = format!(
            "{} duplicate category name(s) were hidden",
            aligned.shadowed()
        );
        if color.enabled() {
            writeln!(w, "{}", msg.yellow())?;
        } else {
            writeln!(w, "{}", msg)?;
        }
    }
    Ok(())
}

/// Truncate or pad to exactly one column.
fn fit(s: &str) -> String {
    let count = s.chars().count();
    if count > COLUMN_WIDTH {
        let mut out: String = s.chars().take(COLUMN_WIDTH - 1).collect();
        out.push('…');
        out
    } else {
        format!("{}{}", s, " ".repeat(COLUMN_WIDTH - count))
    }
}

/// Greedy word wrap by character count. Words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if len > 0 {
                lines.push(std::mem::take(&mut current));
                len = 0;
            }
            let rest = word.split_off(width);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        if word.is_empty() {
            continue;
        }
        if len > 0 && len + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
            len = 0;
        }
        if len > 0 {
            current.push(' ');
            len += 1;
        }
        len += word.len();
        current.extend(word);
    }
    if len > 0 {
        lines.push(current);
    }
    lines
}
