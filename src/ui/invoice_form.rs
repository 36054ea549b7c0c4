use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::models::InvoiceRecord;
use crate::ui::components::date_input::DateInputState;

pub enum FormAction {
    Exit,
    Submit(InvoiceRecord),
}

#[derive(Clone, Copy, PartialEq)]
pub enum FormField {
    Amount,
    BugDate,
    InvoiceDate,
    InvoiceName,
    Description,
    PayeeName,
    PayeeAddress,
    PayeeEmail,
}

pub struct FormState {
    pub record: InvoiceRecord,
    pub current_field: FormField,
    pub editing: bool,
    bug_date_input: DateInputState,
    invoice_date_input: DateInputState,
}

impl FormState {
    pub fn new() -> Self {
        let today = Local::now().date_naive();
        Self {
            record: InvoiceRecord::new(),
            current_field: FormField::Amount,
            editing: false,
            bug_date_input: DateInputState::new(today),
            invoice_date_input: DateInputState::new(today),
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;

        if self.editing {
            match self.current_field {
                FormField::BugDate => self.bug_date_input.toggle_editing(),
                FormField::InvoiceDate => self.invoice_date_input.toggle_editing(),
                _ => {}
            }
        } else {
            self.bug_date_input.editing = false;
            self.invoice_date_input.editing = false;
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            FormField::Amount => FormField::BugDate,
            FormField::BugDate => FormField::InvoiceDate,
            FormField::InvoiceDate => FormField::InvoiceName,
            FormField::InvoiceName => FormField::Description,
            FormField::Description => FormField::PayeeName,
            FormField::PayeeName => FormField::PayeeAddress,
            FormField::PayeeAddress => FormField::PayeeEmail,
            FormField::PayeeEmail => FormField::Amount,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            FormField::Amount => FormField::PayeeEmail,
            FormField::BugDate => FormField::Amount,
            FormField::InvoiceDate => FormField::BugDate,
            FormField::InvoiceName => FormField::InvoiceDate,
            FormField::Description => FormField::InvoiceName,
            FormField::PayeeName => FormField::Description,
            FormField::PayeeAddress => FormField::PayeeName,
            FormField::PayeeEmail => FormField::PayeeAddress,
        };
    }

    /// Whether the current field accepts embedded newlines while editing.
    pub fn multiline_field(&self) -> bool {
        matches!(
            self.current_field,
            FormField::Description | FormField::PayeeAddress
        )
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            FormField::Amount => match key {
                // The amount widget only accepts number-shaped input; whatever
                // it lets through still flows to the formatter unvalidated.
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                    self.record.amount.push(c);
                }
                KeyCode::Backspace => {
                    self.record.amount.pop();
                }
                _ => {}
            },
            FormField::BugDate => {
                if self.bug_date_input.handle_input(key) {
                    self.record.bug_date = self.bug_date_input.value_string();
                }
            }
            FormField::InvoiceDate => {
                if self.invoice_date_input.handle_input(key) {
                    self.record.invoice_date = self.invoice_date_input.value_string();
                }
            }
            FormField::Description => edit_text_field(&mut self.record.description, key, true),
            FormField::PayeeAddress => edit_text_field(&mut self.record.payee_address, key, true),
            FormField::InvoiceName => edit_text_field(&mut self.record.invoice_name, key, false),
            FormField::PayeeName => edit_text_field(&mut self.record.payee_name, key, false),
            FormField::PayeeEmail => edit_text_field(&mut self.record.payee_email, key, false),
        }
    }

    /// All eight fields are independently required; there is no cross-field
    /// validation beyond that.
    pub fn is_valid(&self) -> bool {
        !self.record.amount.is_empty()
            && !self.record.bug_date.is_empty()
            && !self.record.description.is_empty()
            && !self.record.invoice_date.is_empty()
            && !self.record.invoice_name.is_empty()
            && !self.record.payee_name.is_empty()
            && !self.record.payee_address.is_empty()
            && !self.record.payee_email.is_empty()
    }

    fn display_value(&self, field: FormField) -> String {
        match field {
            FormField::Amount => self.record.amount.clone(),
            FormField::BugDate => {
                if self.editing && self.current_field == FormField::BugDate {
                    self.bug_date_input.display_string()
                } else {
                    self.record.bug_date.clone()
                }
            }
            FormField::InvoiceDate => {
                if self.editing && self.current_field == FormField::InvoiceDate {
                    self.invoice_date_input.display_string()
                } else {
                    self.record.invoice_date.clone()
                }
            }
            FormField::InvoiceName => self.record.invoice_name.clone(),
            FormField::Description => self.record.description.replace('\n', " ⏎ "),
            FormField::PayeeName => self.record.payee_name.clone(),
            FormField::PayeeAddress => self.record.payee_address.replace('\n', " ⏎ "),
            FormField::PayeeEmail => self.record.payee_email.clone(),
        }
    }
}

fn edit_text_field(value: &mut String, key: KeyCode, multiline: bool) {
    match key {
        KeyCode::Char(c) => {
            value.push(c);
        }
        KeyCode::Enter if multiline => {
            value.push('\n');
        }
        KeyCode::Backspace => {
            value.pop();
        }
        _ => {}
    }
}

const FIELDS: [(FormField, &str); 8] = [
    (FormField::Amount, "Amount ($)"),
    (FormField::BugDate, "Date of Bug Discovery"),
    (FormField::InvoiceDate, "Invoice Date"),
    (FormField::InvoiceName, "Invoice Name/Number"),
    (FormField::Description, "Bug Description"),
    (FormField::PayeeName, "Payee Name"),
    (FormField::PayeeAddress, "Payee Address"),
    (FormField::PayeeEmail, "Payee Email"),
];

pub fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title = Paragraph::new("Create Bug Bounty Invoice")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_fields(f, state, chunks[1]);

    let help_text = if state.editing {
        if state.multiline_field() {
            "Enter - New line | Esc - Done editing"
        } else {
            "Esc - Done editing"
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | G - Generate Invoice | Esc - Quit"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_fields<B: Backend>(f: &mut Frame<B>, state: &mut FormState, area: Rect) {
    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|(field, label)| {
            let value = state.display_value(*field);
            let selected = *field == state.current_field;

            let content = if selected && state.editing {
                Spans::from(vec![
                    Span::styled(format!("{}: ", label), Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}|", value),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ])
            } else {
                let style = if selected {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                };

                Spans::from(vec![
                    Span::styled(format!("{}: ", label), style),
                    Span::raw(value),
                ])
            };

            ListItem::new(content)
        })
        .collect();

    let form_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Invoice Details"))
        .highlight_style(Style::default().fg(Color::Yellow));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut FormState) -> Result<Option<FormAction>> {
    if let Event::Key(key) = event::read()? {
        match key.code {
            KeyCode::Esc => {
                if state.editing {
                    state.toggle_editing();
                } else {
                    return Ok(Some(FormAction::Exit));
                }
            }
            KeyCode::Enter => {
                if state.editing && state.multiline_field() {
                    state.edit_current_field(KeyCode::Enter);
                } else {
                    state.toggle_editing();
                }
            }
            KeyCode::Up if !state.editing => {
                state.previous_field();
            }
            KeyCode::Down if !state.editing => {
                state.next_field();
            }
            KeyCode::Char('g') | KeyCode::Char('G') if !state.editing => {
                if state.is_valid() {
                    return Ok(Some(FormAction::Submit(state.record.clone())));
                }
            }
            _ if state.editing => {
                state.edit_current_field(key.code);
            }
            _ => {}
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(state: &mut FormState, text: &str) {
        for c in text.chars() {
            state.edit_current_field(KeyCode::Char(c));
        }
    }

    fn fill_field(state: &mut FormState, field: FormField, text: &str) {
        state.current_field = field;
        state.toggle_editing();
        type_text(state, text);
        state.toggle_editing();
    }

    #[test]
    fn fresh_form_defaults_invoice_date_to_today() {
        let state = FormState::new();
        let today = Local::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(state.record.invoice_date, today);
        assert!(state.record.amount.is_empty());
        assert!(state.record.bug_date.is_empty());
    }

    #[test]
    fn amount_accepts_only_number_shaped_input() {
        let mut state = FormState::new();
        state.toggle_editing();
        type_text(&mut state, "1a0b0.5c");
        assert_eq!(state.record.amount, "100.5");
    }

    #[test]
    fn form_is_invalid_until_all_fields_are_populated() {
        let mut state = FormState::new();
        assert!(!state.is_valid());

        fill_field(&mut state, FormField::Amount, "1000");
        fill_field(&mut state, FormField::InvoiceName, "INV-2024-001");
        fill_field(&mut state, FormField::Description, "XSS in search");
        fill_field(&mut state, FormField::PayeeName, "John Doe");
        fill_field(&mut state, FormField::PayeeAddress, "123 Main St");
        fill_field(&mut state, FormField::PayeeEmail, "john@example.com");
        assert!(!state.is_valid());

        state.current_field = FormField::BugDate;
        state.toggle_editing();
        type_text(&mut state, "2024");
        state.toggle_editing();
        assert!(state.is_valid());
    }

    #[test]
    fn submitted_record_carries_the_exact_typed_values() {
        let mut state = FormState::new();
        fill_field(&mut state, FormField::Amount, "1000");
        fill_field(&mut state, FormField::InvoiceName, "INV-2024-001");
        fill_field(&mut state, FormField::PayeeName, "John Doe");

        let record = state.record.clone();
        assert_eq!(record.amount, "1000");
        assert_eq!(record.invoice_name, "INV-2024-001");
        assert_eq!(record.payee_name, "John Doe");
    }

    #[test]
    fn multiline_fields_accept_embedded_newlines() {
        let mut state = FormState::new();
        state.current_field = FormField::PayeeAddress;
        state.toggle_editing();
        type_text(&mut state, "123 Main St");
        state.edit_current_field(KeyCode::Enter);
        type_text(&mut state, "Springfield");
        assert_eq!(state.record.payee_address, "123 Main St\nSpringfield");
    }

    #[test]
    fn editing_a_date_field_commits_to_the_record() {
        let mut state = FormState::new();
        state.current_field = FormField::BugDate;
        state.toggle_editing();
        type_text(&mut state, "2023");

        let today = Local::now().date_naive();
        let expected = format!("2023-{}", today.format("%m-%d"));
        assert_eq!(state.record.bug_date, expected);
    }
}
