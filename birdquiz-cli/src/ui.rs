use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Terminal,
};

use crate::controls::{feedback_text, recording_info_text, result_text, QuizView};

pub fn draw_quiz(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    view: &QuizView,
    history: &[(&'static str, String)],
    log_lines: &[String],
) {
    let _ = terminal.draw(|f| {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(8),
            ])
            .split(f.size());

        let title = if view.finished {
            "Bird Quiz".to_string()
        } else {
            format!("Bird Quiz  {}/{}", view.turn, view.total)
        };
        let title = Paragraph::new(title).style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(title, rows[0]);

        let controls = Paragraph::new("enter=answer  tab=play/stop  esc=quit")
            .style(Style::default().fg(Color::Blue))
            .block(Block::default().borders(Borders::ALL).title("Controls"));
        f.render_widget(controls, rows[1]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(rows[2]);

        let main = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(7),
                Constraint::Length(3),
                Constraint::Min(3),
            ])
            .split(columns[0]);

        let info = match &view.clip {
            Some(clip) => recording_info_text(clip),
            None => String::new(),
        };
        let info_title = if view.playing { "Recording ▶" } else { "Recording" };
        let info_widget = Paragraph::new(info)
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::ALL).title(info_title));
        f.render_widget(info_widget, main[0]);

        let input = Paragraph::new(format!("{}_", view.input))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).title("Answer"));
        f.render_widget(input, main[1]);

        let mut feedback = view
            .feedback
            .as_ref()
            .map(feedback_text)
            .unwrap_or_default();
        if view.finished {
            let summary = match &view.score {
                Some(score) => result_text(score),
                None => "No questions were answered.".to_string(),
            };
            feedback = format!("{}\n\n{}\n\nPress enter to exit.", feedback, summary);
        }
        let feedback_widget = Paragraph::new(feedback)
            .style(Style::default().fg(Color::Yellow))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title("Result"));
        f.render_widget(feedback_widget, main[2]);

        let history_height = columns[1].height.saturating_sub(2) as usize;
        let start = history.len().saturating_sub(history_height);
        let history_lines: Vec<Line> = history[start..]
            .iter()
            .map(|(mark, name)| Line::from(format!("{} {}", mark, name)))
            .collect();
        let history_widget = Paragraph::new(history_lines)
            .block(Block::default().borders(Borders::ALL).title("History"));
        f.render_widget(history_widget, columns[1]);

        let log_height = rows[3].height.saturating_sub(2) as usize;
        let start = log_lines.len().saturating_sub(log_height);
        let log_text = if log_lines.is_empty() {
            "No logs yet.".to_string()
        } else {
            log_lines[start..].join("\n")
        };

        let log_widget = Paragraph::new(log_text)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Logs"));
        f.render_widget(log_widget, rows[3]);
    });
}
