use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use typerace::report_store::{Leaderboard, LeaderboardEntry};

use crate::App;

/// Pure presenter for a single leaderboard row
pub fn present_row(rank: usize, entry: &LeaderboardEntry) -> Row<'static> {
    let accuracy_color = if entry.accuracy >= 98.0 {
        Color::Green
    } else if entry.accuracy >= 90.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(format!("#{rank}")).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(format!("{:.0}", entry.wpm)),
        Cell::from(format!("{:.1}", entry.accuracy)).style(Style::default().fg(accuracy_color)),
        Cell::from(
            entry
                .finished_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
    ])
}

fn averages_line(board: &Leaderboard) -> String {
    match (board.average_wpm, board.average_accuracy) {
        (Some(wpm), Some(acc)) => format!("average {wpm:.0} wpm   {acc:.1}% acc"),
        _ => "no sessions yet".to_string(),
    }
}

/// Render the best sessions of the current mode
pub fn render_leaderboard(app: &mut App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(2),
        ])
        .split(area);

    let mode = app.race.mode();
    let subtitle = app
        .leaderboard
        .as_ref()
        .map(averages_line)
        .unwrap_or_else(|| "results are not being saved".to_string());

    let title = Paragraph::new(format!("{mode}: {subtitle}"))
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, chunks[0]);

    match &app.leaderboard {
        Some(board) if !board.entries.is_empty() => {
            let header = Row::new(vec![
                Cell::from("Rank"),
                Cell::from("WPM"),
                Cell::from("Acc (%)"),
                Cell::from("Finished"),
            ])
            .style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );

            let rows: Vec<Row> = board
                .entries
                .iter()
                .enumerate()
                .map(|(i, entry)| present_row(i + 1, entry))
                .collect();

            let widths = [
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Min(16),
            ];

            let table = Table::new(rows, widths)
                .header(header)
                .block(Block::default().borders(Borders::ALL).title("Top sessions"))
                .column_spacing(2);

            f.render_widget(table, chunks[1]);
        }
        _ => {
            let no_data = Paragraph::new("No finished sessions for this mode yet.")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Gray));
            f.render_widget(no_data, chunks[1]);
        }
    }

    let instructions = Paragraph::new("(b/backspace) back  (m) mode  (n) new  (r) retry  (esc)ape")
        .alignment(Alignment::Center)
        .wrap(ratatui::widgets::Wrap { trim: true });
    f.render_widget(instructions, chunks[2]);
}
