mod format;
mod invoice_gen;
mod models;
mod ui;

use std::io;
use anyhow::Result;
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::invoice_gen::InvoiceGenerator;
use crate::ui::{
    invoice_form::{FormState, FormAction, render_form, handle_input as handle_form_input},
    preview::{PreviewState, PreviewAction, render_preview, handle_input as handle_preview_input},
};

// Represents the current screen in the app
enum AppScreen {
    Form,
    Preview,
}

// Main application state
struct AppState {
    screen: AppScreen,
    form_state: FormState,
    preview_state: Option<PreviewState>,
}

impl AppState {
    fn new() -> Self {
        Self {
            screen: AppScreen::Form,
            form_state: FormState::new(),
            preview_state: None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state
    let mut app_state = AppState::new();

    // Run the main app loop
    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Show any error message
    if let Err(err) = result {
        println!("Error: {}", err);
    }

    println!("Thanks for using Bug Bounty Invoice Generator!");

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        // Render current screen
        terminal.draw(|f| {
            match app_state.screen {
                AppScreen::Form => {
                    render_form(f, &mut app_state.form_state);
                }
                AppScreen::Preview => {
                    if let Some(state) = &mut app_state.preview_state {
                        render_preview(f, state);
                    }
                }
            }
        })?;

        // Handle input for current screen
        let should_quit = match app_state.screen {
            AppScreen::Form => handle_form_screen(app_state).await?,
            AppScreen::Preview => handle_preview_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn handle_form_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_form_input(&mut app_state.form_state)? {
        Some(FormAction::Exit) => {
            return Ok(true);
        }
        Some(FormAction::Submit(record)) => {
            // The submitted record is immutable from here on
            app_state.preview_state = Some(PreviewState::new(record));
            app_state.screen = AppScreen::Preview;
        }
        None => {}
    }

    Ok(false)
}

async fn handle_preview_screen(app_state: &mut AppState) -> Result<bool> {
    if let Some(state) = &mut app_state.preview_state {
        match handle_preview_input(state)? {
            Some(PreviewAction::Back) => {
                // Discard the record and re-enter a fresh form
                app_state.preview_state = None;
                app_state.form_state = FormState::new();
                app_state.screen = AppScreen::Form;
            }
            Some(PreviewAction::Export) => {
                // Rasterization and PDF assembly block, so run them off the
                // event loop and suspend until they finish
                let record = state.record().clone();
                let result = tokio::task::spawn_blocking(move || {
                    InvoiceGenerator::new(".")?.export(&record)
                })
                .await?;

                match result {
                    Ok(path) => {
                        log::debug!("invoice exported to {}", path.display());
                        state.set_success(format!("Saved {}", path.display()));
                    }
                    Err(err) => {
                        log::error!("invoice export failed: {}", err);
                        state.set_error("Error generating PDF. Please try again.".to_string());
                    }
                }
            }
            None => {}
        }
    }

    Ok(false)
}
