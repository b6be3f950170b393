mod api;
mod app;
mod cli;
mod config;
mod controller;
mod error;
mod events;
mod formatter;
mod logging;
mod models;
mod ui;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, prelude::*};
use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info};

use api::BlogClient;
use app::{App, AppMode, Confirmation};
use cli::Cli;
use controller::Controller;
use events::AppEvent;
use models::Topic;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config::load_config()?;
    cli.apply_overrides(&mut config);

    let log_result =
        config::get_log_path().and_then(|path| logging::init(&path, &config.log_level));
    if let Err(err) = log_result {
        eprintln!("Warning: logging disabled: {err:#}");
    }

    let client = BlogClient::new(&config.backend_url, config.request_timeout)?;
    let controller = Controller::new(Arc::new(client.clone()));

    if let Some(command) = cli.command {
        return cli::run(command, &controller).await;
    }

    info!(backend = client.base_url(), "starting terminal UI");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config);

    // Create channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();

    let health_tx = tx.clone();
    tokio::spawn(async move {
        let online = client.health_check().await;
        let _ = health_tx.send(AppEvent::BackendStatus(online));
    });

    let res = run_app(&mut terminal, &mut app, &controller, &tx, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %format!("{err:#}"), "terminal UI failed");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn spawn_generate(
    app: &mut App,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    if let Err(err) = Topic::parse(&app.input_buffer) {
        app.show_validation(err, Instant::now());
        return;
    }

    app.begin_generate();
    let topic = app.input_buffer.clone();
    let controller = controller.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let result = controller.generate(&topic).await;
        let _ = tx.send(AppEvent::GenerateFinished(result));
    });
}

fn spawn_regenerate(
    app: &mut App,
    topic: String,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    app.begin_generate();
    let controller = controller.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let event = match controller.regenerate(&topic, true).await {
            Ok(Some(blog)) => AppEvent::GenerateFinished(Ok(blog)),
            Ok(None) => return,
            Err(err) => AppEvent::GenerateFinished(Err(err)),
        };
        let _ = tx.send(event);
    });
}

fn spawn_save(app: &mut App, controller: &Controller, event_tx: &mpsc::UnboundedSender<AppEvent>) {
    if !app.can_save() {
        return;
    }

    app.begin_save();
    let current = app.current_blog.clone();
    let controller = controller.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let result = controller.save(current.as_ref()).await;
        let _ = tx.send(AppEvent::SaveFinished(result));
    });
}

fn spawn_library_load(
    app: &mut App,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    app.begin_library();
    let controller = controller.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let result = controller.list_blogs().await;
        let _ = tx.send(AppEvent::LibraryLoaded(result));
    });
}

fn spawn_delete(
    app: &mut App,
    id: i64,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    app.begin_library();
    let controller = controller.clone();
    let tx = event_tx.clone();

    tokio::spawn(async move {
        let result = controller.delete_blog(id).await;
        let _ = tx.send(AppEvent::BlogDeleted { id, result });
    });
}

/// Keys while a confirmation modal is open. Returns true when consumed.
fn handle_confirm_keys(
    app: &mut App,
    key: KeyCode,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) -> bool {
    let Some(confirm) = app.confirm.clone() else {
        return false;
    };

    match key {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
            app.confirm = None;
            match confirm {
                Confirmation::Regenerate { topic } => {
                    spawn_regenerate(app, topic, controller, event_tx);
                }
                Confirmation::Delete { id, .. } => spawn_delete(app, id, controller, event_tx),
            }
        }
        KeyCode::Char('n' | 'N') | KeyCode::Esc => {
            app.confirm = None;
        }
        _ => {}
    }
    true
}

fn handle_help_keys(app: &mut App, key: KeyCode, modifiers: KeyModifiers) -> bool {
    if !app.show_help {
        return false;
    }

    match key {
        KeyCode::Char('h') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.toggle_help();
        }
        KeyCode::Esc => {
            app.show_help = false;
        }
        _ => {}
    }
    true
}

fn handle_library_keys(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match key {
        KeyCode::Esc => app.switch_mode(AppMode::Compose),
        KeyCode::Up => app.select_previous(),
        KeyCode::Down => app.select_next(),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::F(5) if !app.library_loading => spawn_library_load(app, controller, event_tx),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => {
            if !app.library_loading {
                app.request_delete();
            }
        }
        _ => {}
    }
}

fn handle_compose_keys(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    let ctrl = modifiers.contains(KeyModifiers::CONTROL);

    match key {
        KeyCode::Esc => app.dismiss_alert(),
        KeyCode::Char('s') if ctrl => spawn_save(app, controller, event_tx),
        KeyCode::Char('r') if ctrl => {
            if app.generating {
                return;
            }
            if let Err(err) = app.request_regenerate() {
                app.show_validation(err, Instant::now());
            }
        }
        KeyCode::Char('t') if ctrl => app.toggle_html(),

        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Home => app.scroll_to_top(),
        KeyCode::End => app.scroll_to_bottom(),

        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Enter if !app.generating => spawn_generate(app, controller, event_tx),

        KeyCode::Char(c) if !ctrl => {
            app.input_buffer.push(c);
        }

        _ => {}
    }
}

fn handle_key(
    app: &mut App,
    key: KeyCode,
    modifiers: KeyModifiers,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    if handle_confirm_keys(app, key, controller, event_tx) {
        return;
    }
    if handle_help_keys(app, key, modifiers) {
        return;
    }

    let ctrl = modifiers.contains(KeyModifiers::CONTROL);
    match key {
        KeyCode::Char('c') if ctrl => {
            if app.exit_pending {
                app.quit();
            } else {
                app.exit_pending = true;
            }
            return;
        }
        KeyCode::Esc if app.exit_pending => {
            app.exit_pending = false;
            return;
        }
        // Any other key cancels pending exit
        _ if app.exit_pending => app.exit_pending = false,
        _ => {}
    }

    match key {
        KeyCode::Char('h') if ctrl => app.toggle_help(),
        KeyCode::Char('l') if ctrl => match app.mode {
            AppMode::Compose => {
                app.switch_mode(AppMode::Library);
                if !app.library_loading {
                    spawn_library_load(app, controller, event_tx);
                }
            }
            AppMode::Library => app.switch_mode(AppMode::Compose),
        },
        _ => match app.mode {
            AppMode::Compose => handle_compose_keys(app, key, modifiers, controller, event_tx),
            AppMode::Library => handle_library_keys(app, key, modifiers, controller, event_tx),
        },
    }
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    controller: &Controller,
    event_tx: &mpsc::UnboundedSender<AppEvent>,
    event_rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|f| ui::render(f, app))?;

        // Apply every resolved request before reading input
        while let Ok(app_event) = event_rx.try_recv() {
            app.handle_event(app_event, Instant::now());
        }

        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers, controller, event_tx);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiEnvelope, MockBlogBackend};
    use crate::app::AlertKind;
    use crate::models::AppConfig;

    type Harness = (
        App,
        Controller,
        mpsc::UnboundedSender<AppEvent>,
        mpsc::UnboundedReceiver<AppEvent>,
    );

    fn setup(mock: MockBlogBackend) -> Harness {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            App::new(&AppConfig::default()),
            Controller::new(Arc::new(mock)),
            tx,
            rx,
        )
    }

    fn type_text(
        app: &mut App,
        text: &str,
        controller: &Controller,
        tx: &mpsc::UnboundedSender<AppEvent>,
    ) {
        for c in text.chars() {
            handle_key(app, KeyCode::Char(c), KeyModifiers::NONE, controller, tx);
        }
    }

    #[tokio::test]
    async fn test_enter_generates_and_displays_blog() {
        let mut mock = MockBlogBackend::new();
        mock.expect_generate()
            .withf(|req| req.topic == "Rust vs Go")
            .times(1)
            .returning(|_| {
                Ok(ApiEnvelope {
                    success: true,
                    topic: Some("Rust vs Go".to_string()),
                    content: Some("# Intro\n\nRust is fast.".to_string()),
                    ..Default::default()
                })
            });
        let (mut app, controller, tx, mut rx) = setup(mock);

        type_text(&mut app, "Rust vs Go", &controller, &tx);
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE, &controller, &tx);
        assert!(app.generating);

        let event = rx.recv().await.unwrap();
        app.handle_event(event, Instant::now());

        assert!(!app.generating);
        assert!(app.rendered_html.contains(">Intro</h1>"));
        assert!(app.rendered_html.contains("<p>Rust is fast.</p>"));
    }

    #[tokio::test]
    async fn test_short_topic_warns_without_request() {
        let mut mock = MockBlogBackend::new();
        mock.expect_generate().never();
        let (mut app, controller, tx, _rx) = setup(mock);

        type_text(&mut app, "ab", &controller, &tx);
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE, &controller, &tx);

        assert!(!app.generating);
        let alert = app.alert.as_ref().unwrap();
        assert_eq!(alert.kind, AlertKind::Warning);
        assert!(alert.message.contains("at least 3 characters"));
    }

    #[tokio::test]
    async fn test_failed_generation_surfaces_server_error() {
        let mut mock = MockBlogBackend::new();
        mock.expect_generate().returning(|_| {
            Ok(ApiEnvelope {
                error: Some("model unavailable".to_string()),
                ..Default::default()
            })
        });
        let (mut app, controller, tx, mut rx) = setup(mock);

        type_text(&mut app, "Rust vs Go", &controller, &tx);
        handle_key(&mut app, KeyCode::Enter, KeyModifiers::NONE, &controller, &tx);
        let event = rx.recv().await.unwrap();
        app.handle_event(event, Instant::now());

        assert!(!app.generating);
        assert!(app.alert.as_ref().unwrap().message.contains("model unavailable"));
    }

    #[tokio::test]
    async fn test_declined_regenerate_sends_nothing() {
        let mut mock = MockBlogBackend::new();
        mock.expect_generate().never();
        let (mut app, controller, tx, mut rx) = setup(mock);

        type_text(&mut app, "Rust vs Go", &controller, &tx);
        handle_key(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL, &controller, &tx);
        assert!(app.confirm.is_some());

        handle_key(&mut app, KeyCode::Char('n'), KeyModifiers::NONE, &controller, &tx);
        assert!(app.confirm.is_none());
        assert!(!app.generating);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_save_without_blog_warns() {
        let mut mock = MockBlogBackend::new();
        mock.expect_save().never();
        let (mut app, controller, tx, mut rx) = setup(mock);

        handle_key(&mut app, KeyCode::Char('s'), KeyModifiers::CONTROL, &controller, &tx);
        let event = rx.recv().await.unwrap();
        app.handle_event(event, Instant::now());

        assert!(!app.saving);
        assert_eq!(app.alert.as_ref().unwrap().message, "No blog to save");
    }

    #[test]
    fn test_ctrl_c_twice_quits() {
        let (mut app, controller, tx, _rx) = setup(MockBlogBackend::new());
        handle_key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &controller, &tx);
        assert!(app.exit_pending);
        assert!(!app.should_quit);
        handle_key(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL, &controller, &tx);
        assert!(app.should_quit);
    }
}
