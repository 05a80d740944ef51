//! Welcome banner. The figlet title is shaded left to right across the columns, so each
//! glyph keeps one hue from top to bottom.

use crossterm::QueueableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{self, Write};

const TITLE: &str = "PSYTRACK";
const TAGLINE: &str = "symptom journal & analytics";

type Rgb = (u8, u8, u8);

/// Colour stops spread evenly over the banner width.
const STOPS: [Rgb; 3] = [
    (0xb3, 0x88, 0xff), // lavender
    (0x82, 0xb1, 0xff), // periwinkle
    (0x64, 0xff, 0xda), // mint
];

/// Colour at `t` in [0, 1] along the stops. Out-of-range values clamp to the ends.
fn shade(stops: &[Rgb], t: f64) -> Rgb {
    let [first, .., last] = stops else {
        return stops.first().copied().unwrap_or((0xff, 0xff, 0xff));
    };
    if t <= 0.0 {
        return *first;
    }
    if t >= 1.0 {
        return *last;
    }
    let scaled = t * (stops.len() - 1) as f64;
    let i = scaled.floor() as usize;
    let (a, b) = (stops[i], stops[i + 1]);
    let f = scaled - i as f64;
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * f).round() as u8;
    (mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// A stretch of one line printed in a single colour. Blank stretches carry no colour.
#[derive(Debug, PartialEq)]
struct Run {
    color: Option<Rgb>,
    text: String,
}

/// Split `line` into runs, shading each visible column by its position in `width`.
fn paint_line(line: &str, width: usize) -> Vec<Run> {
    let span = width.saturating_sub(1).max(1) as f64;
    let mut runs: Vec<Run> = Vec::new();
    for (col, ch) in line.chars().enumerate() {
        let color = (!ch.is_whitespace()).then(|| shade(&STOPS, col as f64 / span));
        match runs.last_mut() {
            Some(run) if run.color == color => run.text.push(ch),
            _ => runs.push(Run {
                color,
                text: ch.to_string(),
            }),
        }
    }
    runs
}

/// Title art, or the bare title when the font cannot render it.
fn title_lines() -> Vec<String> {
    let art = FIGfont::standard()
        .ok()
        .and_then(|font| font.convert(TITLE).map(|figure| figure.to_string()));
    match art {
        Some(art) => art
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect(),
        None => vec![TITLE.to_string()],
    }
}

fn write_banner(out: &mut impl Write) -> io::Result<()> {
    let lines = title_lines();
    let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    for line in &lines {
        for run in paint_line(line, width) {
            match run.color {
                Some((r, g, b)) => {
                    out.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
                    out.queue(Print(run.text))?;
                }
                None => {
                    out.queue(ResetColor)?;
                    out.queue(Print(run.text))?;
                }
            }
        }
        out.queue(ResetColor)?;
        out.queue(Print("\r\n"))?;
    }

    let (r, g, b) = shade(&STOPS, 1.0);
    out.queue(SetForegroundColor(Color::Rgb { r, g, b }))?;
    out.queue(Print(format!(
        "v{} | {}\r\n",
        env!("CARGO_PKG_VERSION"),
        TAGLINE
    )))?;
    out.queue(ResetColor)?;
    out.flush()
}

/// Print the banner to stdout. A terminal that rejects the escape codes just gets no banner.
pub fn print_welcome() {
    let _ = write_banner(&mut io::stdout().lock());
}
