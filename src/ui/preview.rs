use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::invoice_gen::{DocumentLayout, Line};
use crate::models::InvoiceRecord;

pub enum PreviewAction {
    Back,
    Export,
}

/// Read-only view over the submitted record. The record is never mutated
/// here; export takes a clone and "back" discards the whole state.
pub struct PreviewState {
    record: InvoiceRecord,
    show_error: Option<String>,
    show_success: Option<String>,
}

impl PreviewState {
    pub fn new(record: InvoiceRecord) -> Self {
        Self {
            record,
            show_error: None,
            show_success: None,
        }
    }

    pub fn record(&self) -> &InvoiceRecord {
        &self.record
    }

    pub fn set_error(&mut self, message: String) {
        self.show_error = Some(message);
    }

    pub fn set_success(&mut self, message: String) {
        self.show_success = Some(message);
    }
}

pub fn render_preview<B: Backend>(frame: &mut Frame<B>, state: &mut PreviewState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(10), Constraint::Length(3)].as_ref())
        .split(size);

    // The preview shows the same layout the exporter rasterizes, composed
    // fresh so the "generated on" stamp tracks the wall clock.
    let layout = DocumentLayout::compose(&state.record, Local::now().date_naive());
    let lines: Vec<Spans> = layout.lines.iter().map(line_to_spans).collect();

    let preview = Paragraph::new(lines)
        .block(Block::default().title("Invoice Preview").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(preview, chunks[0]);

    let buttons = Paragraph::new("<D> Download PDF | <Esc> Back to Form")
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));
    frame.render_widget(buttons, chunks[1]);

    if let Some(error) = &state.show_error {
        render_error(frame, size, error);
    }

    if let Some(message) = &state.show_success {
        render_success(frame, size, message);
    }
}

fn line_to_spans(line: &Line) -> Spans<'static> {
    match line {
        Line::Text {
            content,
            scale,
            emphasis,
            ..
        } => {
            let style = if *scale >= 3 {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else if *scale >= 2 || *emphasis {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Spans::from(Span::styled(content.clone(), style))
        }
        Line::Split {
            left,
            right,
            emphasis,
            ..
        } => {
            let value_style = if *emphasis {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Spans::from(vec![
                Span::styled(format!("{}: ", left), Style::default().fg(Color::Yellow)),
                Span::styled(right.clone(), value_style),
            ])
        }
        Line::Rule => Spans::from(Span::styled(
            "─".repeat(60),
            Style::default().fg(Color::DarkGray),
        )),
        Line::Blank => Spans::from(""),
    }
}

fn render_error<B: Backend>(frame: &mut Frame<B>, size: Rect, error: &str) {
    let popup_area = centered_rect(60, 20, size);

    let error_msg = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(error),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title("Error").borders(Borders::ALL))
    .style(Style::default().fg(Color::Red));

    frame.render_widget(error_msg, popup_area);
}

fn render_success<B: Backend>(frame: &mut Frame<B>, size: Rect, message: &str) {
    let popup_area = centered_rect(60, 20, size);

    let success_msg = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(message),
        Spans::from(""),
        Spans::from("Press any key to continue"),
    ])
    .block(Block::default().title("Success").borders(Borders::ALL))
    .style(Style::default().fg(Color::Green));

    frame.render_widget(success_msg, popup_area);
}

// Helper function to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn handle_input(state: &mut PreviewState) -> Result<Option<PreviewAction>> {
    // Any key dismisses a result popup before the next action is read.
    state.show_error = None;
    state.show_success = None;

    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc | KeyCode::Char('b') => {
                return Ok(Some(PreviewAction::Back));
            }
            KeyCode::Char('d') | KeyCode::Char('D') => {
                return Ok(Some(PreviewAction::Export));
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> InvoiceRecord {
        InvoiceRecord {
            amount: "1000".to_string(),
            bug_date: "2024-03-15".to_string(),
            description: "CSRF on settings page".to_string(),
            invoice_date: "2024-03-20".to_string(),
            invoice_name: "INV-2024-001".to_string(),
            payee_name: "John Doe".to_string(),
            payee_address: "123 Main St".to_string(),
            payee_email: "john.doe@example.com".to_string(),
        }
    }

    #[test]
    fn preview_holds_the_record_unmutated() {
        let record = sample_record();
        let state = PreviewState::new(record.clone());
        assert_eq!(state.record(), &record);
    }

    #[test]
    fn result_popups_replace_each_other() {
        let mut state = PreviewState::new(sample_record());
        state.set_error("Error generating PDF. Please try again.".to_string());
        assert!(state.show_error.is_some());

        state.show_error = None;
        state.set_success("Saved bug-bounty-invoice-INV-2024-001.pdf".to_string());
        assert!(state.show_success.is_some());
        assert!(state.show_error.is_none());
    }
}
