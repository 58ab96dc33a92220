pub mod charting;

use std::ops::Range;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use typometer::session::{CharState, Snapshot};
use unicode_width::UnicodeWidthChar;

use crate::{App, AppState, SaveStatus};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const PROMPT_LINES: usize = 3;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Typing => render_typing(self, area, buf),
            AppState::Results => render_results(self, area, buf),
        }
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let snapshot = session.snapshot();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = bold_style.add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // last score
            Constraint::Min(0),
            Constraint::Length(1), // live stats
            Constraint::Length(1),
            Constraint::Length(PROMPT_LINES as u16),
            Constraint::Min(0),
            Constraint::Length(1), // notice
            Constraint::Length(1), // legend
        ])
        .split(area);

    let last_score = match &app.last_score {
        Some(r) => format!(
            "last: {} {:.0} cpm ({:.0} wpm) on {}",
            r.language, r.cpm, r.wpm, r.timestamp
        ),
        None => String::from("no previous score"),
    };
    Paragraph::new(Span::styled(last_score, italic_style.fg(Color::Gray)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    let stats = format!(
        "{:.0}s   {:.0} cpm   {:.0} wpm   {}",
        snapshot.remaining.as_secs_f64().ceil(),
        snapshot.cpm,
        snapshot.wpm,
        session.language()
    );
    Paragraph::new(Span::styled(stats, dim_bold_style))
        .alignment(Alignment::Center)
        .render(chunks[2], buf);

    let max_width = chunks[4].width.max(1) as usize;
    let lines = layout_lines(session.target_chars(), session.word_spans(), max_width);
    let first = visible_from(&lines, snapshot.typed_len);
    let current_word = snapshot
        .current_word()
        .map(|i| session.word_spans()[i].clone());

    let text: Vec<Line> = lines[first..(first + PROMPT_LINES).min(lines.len())]
        .iter()
        .map(|range| {
            Line::from(
                range
                    .clone()
                    .map(|i| char_span(session.target_chars()[i], i, &snapshot, current_word.as_ref()))
                    .collect::<Vec<Span>>(),
            )
        })
        .collect();

    Paragraph::new(text)
        .wrap(Wrap { trim: false })
        .render(chunks[4], buf);

    if let Some(notice) = &app.notice {
        Paragraph::new(Span::styled(notice.as_str(), Style::default().fg(Color::Yellow)))
            .alignment(Alignment::Center)
            .render(chunks[6], buf);
    }

    Paragraph::new(Span::styled(
        "(←) retry / (→) new / (tab) language / (esc)ape",
        italic_style,
    ))
    .render(chunks[7], buf);
}

fn char_span(
    c: char,
    idx: usize,
    snapshot: &Snapshot,
    current_word: Option<&Range<usize>>,
) -> Span<'static> {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);

    let (text, style) = match snapshot.chars[idx] {
        CharState::Correct => (c.to_string(), bold_style.fg(Color::Green)),
        CharState::Incorrect => (
            match c {
                ' ' => "·".to_owned(),
                c => c.to_string(),
            },
            bold_style.fg(Color::Red),
        ),
        CharState::Untyped if idx == snapshot.typed_len => {
            (c.to_string(), bold_style.add_modifier(Modifier::REVERSED))
        }
        CharState::Untyped if current_word.is_some_and(|w| w.contains(&idx)) => {
            (c.to_string(), bold_style)
        }
        CharState::Untyped => (c.to_string(), bold_style.add_modifier(Modifier::DIM)),
    };

    match current_word {
        Some(word) if word.contains(&idx) => {
            Span::styled(text, style.add_modifier(Modifier::UNDERLINED))
        }
        _ => Span::styled(text, style),
    }
}

/// Breaks the target text into display lines at word boundaries.
/// Each range covers a run of whole words plus their trailing separators.
pub fn layout_lines(target: &[char], spans: &[Range<usize>], max_width: usize) -> Vec<Range<usize>> {
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0;

    for span in spans {
        let chunk_end = (span.end + 1).min(target.len());
        let width: usize = target[span.start..chunk_end]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum();

        if line_width > 0 && line_width + width > max_width {
            lines.push(line_start..span.start);
            line_start = span.start;
            line_width = 0;
        }
        line_width += width;
    }
    lines.push(line_start..target.len());

    lines
}

/// First line to show so the cursor sits on the first or second visible line
fn visible_from(lines: &[Range<usize>], cursor: usize) -> usize {
    let cursor_line = lines
        .iter()
        .position(|l| cursor < l.end)
        .unwrap_or(lines.len().saturating_sub(1));

    cursor_line
        .saturating_sub(1)
        .min(lines.len().saturating_sub(PROMPT_LINES))
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(result) = &app.result else {
        return;
    };
    let session = &app.session;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);
    let magenta_style = Style::default().fg(Color::Magenta);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // details
            Constraint::Length(1), // save status
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (overall_duration, highest_wpm) = charting::compute_chart_params(
        session.samples().points(),
        session.duration_limit().as_secs_f64(),
    );

    let tuples = session.samples().as_tuples();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(magenta_style)
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        );

    chart.render(chunks[0], buf);

    Paragraph::new(Span::styled(
        format!(
            "{:.0} cpm   {:.0} wpm   {:.0}% acc",
            result.cpm, result.wpm, result.accuracy
        ),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        format!(
            "{}/{} words   {} chars correct   {:.1}s   {}",
            result.correct_words,
            session.words().len(),
            result.correct_chars,
            result.elapsed.as_secs_f64(),
            result.language
        ),
        Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    let (save_text, save_style) = match &app.save_status {
        SaveStatus::Saved => (String::from("saved to score log"), Style::default().fg(Color::Green)),
        SaveStatus::Failed(e) => (format!("not saved: {e}"), Style::default().fg(Color::Red)),
        SaveStatus::Unsaved => (String::new(), Style::default()),
    };
    Paragraph::new(Span::styled(save_text, save_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let legend = if matches!(app.save_status, SaveStatus::Failed(_)) {
        "(r)etry / (n)ew / (l)anguage / (s)ave again / (esc)ape"
    } else {
        "(r)etry / (n)ew / (l)anguage / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[5], buf);
}
