pub mod charting;
pub mod leaderboard;
pub mod screen;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use typerace::{matcher::CharState, report::SessionReport};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold() -> Style {
    bold().add_modifier(Modifier::DIM)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn state_style(state: CharState) -> Style {
    match state {
        CharState::Correct => bold().fg(Color::Green),
        CharState::Error => bold().fg(Color::Red),
        CharState::Cursor => dim_bold().add_modifier(Modifier::UNDERLINED),
        CharState::Pending => dim_bold(),
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.race.last_report() {
            Some(report) if self.race.is_finished() => render_results(self, report, area, buf),
            _ => render_typing(self, area, buf),
        }
    }
}

fn prompt_spans(app: &App) -> Vec<Span<'static>> {
    let matcher = app.race.session().matcher();
    let overlay = matcher.incorrect_overlay();

    let cells = (0..matcher.len()).filter_map(|idx| {
        let c = matcher.display_char(idx)?;
        // a mistyped space would be invisible
        let c = match (overlay.contains_key(&idx), c) {
            (true, ' ') => '·',
            (_, c) => c,
        };
        Some((matcher.char_state(idx), c))
    });

    let mut spans = Vec::new();
    for (state, chunk) in &cells.chunk_by(|(state, _)| *state) {
        let text: String = chunk.map(|(_, c)| c).collect();
        spans.push(Span::styled(text, state_style(state)));
    }
    spans
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = app.race.session();
    let text = &session.paragraph().text;

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
    let prompt_occupied_lines = if text.width() <= max_chars_per_line as usize {
        1
    } else {
        ((text.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines + 4) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(
            [
                Constraint::Length(padding),
                Constraint::Length(2),
                Constraint::Length(prompt_occupied_lines),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let header = Paragraph::new(Span::styled(
        format!("{}   {}s", app.race.mode(), app.race.elapsed_secs()),
        dim_bold(),
    ))
    .alignment(Alignment::Center);
    header.render(chunks[1], buf);

    let prompt = Paragraph::new(Line::from(prompt_spans(app)))
        .alignment(if prompt_occupied_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true });
    prompt.render(chunks[2], buf);

    let hint = if let Some(notice) = app.race.notice() {
        Some(Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)))
    } else if session.matcher().is_locked() {
        Some(Span::styled(
            "too many mistakes, backspace to fix them",
            bold().fg(Color::Red),
        ))
    } else {
        session.tracker().pinned_word().map(|w| {
            Span::styled(
                format!("fix \"{}\"", w.span.word),
                italic().fg(Color::Red),
            )
        })
    };
    if let Some(hint) = hint {
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }

    let legend = Paragraph::new(Span::styled(
        "(←) restart / (→) next / (tab) mode / (esc)ape",
        italic(),
    ));
    legend.render(chunks[5], buf);
}

fn render_results(app: &App, report: &SessionReport, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints(
            [
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(area);

    let speeds = report.word_speeds();
    let (word_count, highest_wpm) = charting::compute_chart_params(&speeds);
    let tuples: Vec<(f64, f64)> = speeds.into_iter().map(Into::into).collect();

    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("word")
                .bounds([1.0, word_count])
                .labels(vec![
                    Span::styled("1", bold()),
                    Span::styled(charting::format_label(word_count), bold()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold()),
                    Span::styled(charting::format_label(highest_wpm), bold()),
                ]),
        );
    chart.render(chunks[0], buf);

    let mut stats = format!(
        "{:.0} wpm   {:.0}% acc   {:.1}s   {} words   {} mistakes",
        report.wpm(),
        report.accuracy(),
        report.duration_secs(),
        report.typed_word_count,
        report.wrongful_char_count,
    );
    if let Some(reason) = app.race.session().finish_reason() {
        stats.push_str(&format!("   {reason}"));
    }
    Paragraph::new(Span::styled(stats, bold()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let status = match (app.race.notice(), app.race.artifact_message()) {
        (Some(notice), _) => Span::styled(notice.to_string(), Style::default().fg(Color::Yellow)),
        (None, Some(msg)) => Span::styled(msg.to_string(), italic().fg(Color::Cyan)),
        (None, None) => Span::raw(""),
    };
    Paragraph::new(status)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(r)etry / (n)ew / (l)eaderboard / (m)ode / (esc)ape",
        italic(),
    ))
    .render(chunks[4], buf);
}
