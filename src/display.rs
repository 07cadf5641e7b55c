// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: Apache-2.0

//! Interactive terminal view of the response time histogram.

use crate::plot::Figure;
use crate::types::Result;

#[cfg(feature = "tui")]
pub use terminal::show;

/// Without the `tui` feature there is nothing to open.
#[cfg(not(feature = "tui"))]
pub fn show(_figure: &Figure) -> Result<()> {
    tracing::warn!("Built without the `tui` feature; skipping the histogram display");
    Ok(())
}

#[cfg(feature = "tui")]
mod terminal {
    use std::io::{self, IsTerminal, Write};

    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
        execute,
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    };
    use ratatui::{
        backend::CrosstermBackend,
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Color, Style},
        text::{Line, Span},
        widgets::canvas::{Canvas, Context, Line as CanvasLine, Rectangle},
        widgets::{Block, Borders, Paragraph},
        Frame, Terminal,
    };
    use tracing::{debug, warn};

    use super::{Figure, Result};

    const BAR_COLOR: Color = Color::Green;
    // Black is unreadable on most terminal themes; white plays its role here.
    const QUARTILE_COLOR: Color = Color::White;
    const MEAN_COLOR: Color = Color::Red;

    /// Open the full-screen view and block until the user dismisses it
    /// with `q`, `Esc`, `Enter` or Ctrl-C.
    pub fn show(figure: &Figure) -> Result<()> {
        show_on(io::stdout(), figure)
    }

    /// Draw onto `out`, which must be a terminal. Anything else (a pipe or a
    /// redirected file) would receive escape sequences, so the view is skipped.
    fn show_on<W: Write + IsTerminal>(out: W, figure: &Figure) -> Result<()> {
        if !out.is_terminal() {
            warn!("Output is not a terminal; skipping the histogram display");
            return Ok(());
        }

        let mut terminal = Terminal::new(CrosstermBackend::new(out))?;
        enable_raw_mode()?;
        execute!(terminal.backend_mut(), EnterAlternateScreen).ok();
        terminal.clear().ok();

        let res = loop {
            if let Err(e) = terminal.draw(|f| draw(f, figure)) {
                break Err(e.into());
            }

            match event::read() {
                Ok(Event::Key(k)) if k.kind == KeyEventKind::Press => match (k.modifiers, k.code) {
                    (_, KeyCode::Char('q')) | (_, KeyCode::Esc) | (_, KeyCode::Enter) => {
                        break Ok(());
                    }
                    (KeyModifiers::CONTROL, KeyCode::Char('c')) => break Ok(()),
                    _ => {}
                },
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            }
        };

        disable_raw_mode().ok();
        execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
        debug!("Histogram display closed");
        res
    }

    fn draw_line(ctx: &mut Context, x: f64, top: f64, color: Color) {
        ctx.draw(&CanvasLine {
            x1: x,
            y1: 0.0,
            x2: x,
            y2: top,
            color,
        });
    }

    fn draw(f: &mut Frame, figure: &Figure) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(3)].as_ref())
            .split(f.area());

        let (x_lo, x_hi) = figure.x_range();
        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(figure.title.as_str()),
            )
            .x_bounds([x_lo, x_hi])
            .y_bounds([0.0, figure.y_top()])
            .paint(|ctx| {
                for bin in figure.histogram.bins().iter().filter(|b| b.count > 0) {
                    ctx.draw(&Rectangle {
                        x: bin.start,
                        y: 0.0,
                        width: bin.end - bin.start,
                        height: bin.count as f64,
                        color: BAR_COLOR,
                    });
                }
                ctx.layer();
                for line in &figure.lines {
                    let color = if line.kind.is_quartile_group() {
                        QUARTILE_COLOR
                    } else {
                        MEAN_COLOR
                    };
                    draw_line(ctx, line.value, figure.line_height, color);
                }
            });
        f.render_widget(canvas, chunks[0]);

        let legend = Line::from(vec![
            Span::styled("■ response times  ", Style::default().fg(BAR_COLOR)),
            Span::styled("│ quartiles & bounds  ", Style::default().fg(QUARTILE_COLOR)),
            Span::styled("│ mean & σ bands  ", Style::default().fg(MEAN_COLOR)),
            Span::raw(format!(
                "x: {:.0}..{:.0} days   q/Esc/Enter to close",
                x_lo, x_hi
            )),
        ]);
        f.render_widget(
            Paragraph::new(legend)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL)),
            chunks[1],
        );
    }

    #[cfg(test)]
    mod tests {
        use std::io::{Read, Seek};

        use super::*;
        use crate::stats::summarize;
        use crate::types::FenceMode;

        #[test]
        fn redirected_output_gets_no_escape_sequences() {
            let samples: Vec<f64> = (1..=10).map(f64::from).collect();
            let summary = summarize(&samples, FenceMode::UpperQuartile).unwrap();
            let figure = Figure::new("Plumbing", &samples, &summary, 10, 900.0).unwrap();

            let mut file = tempfile::tempfile().unwrap();
            // returns at once instead of waiting for a key press
            show_on(file.try_clone().unwrap(), &figure).unwrap();

            let mut written = String::new();
            file.rewind().unwrap();
            file.read_to_string(&mut written).unwrap();
            assert_eq!(written, "");
        }
    }
}
