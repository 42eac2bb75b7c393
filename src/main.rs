use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use slide_quiz::{
    logger, load_page, App, AppEvent, BannerTone, DraftStorage, FeedbackResponse, HttpQuizClient,
    QuizBackend, QuizConfig, QuizSession, SqliteDraftStorage,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> io::Result<()> {
    logger::init();

    let Some(page_path) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: slide-quiz <page.json>");
        std::process::exit(2);
    };

    let config = QuizConfig::from_env();
    let page = load_page(&page_path)?;
    log::info!(
        "Loaded quiz for slide {} ({} questions) from {}",
        page.slide_id,
        page.questions.len(),
        page_path.display()
    );

    let backend: Arc<dyn QuizBackend> =
        Arc::new(HttpQuizClient::new(&config).map_err(io::Error::other)?);
    let storage: Option<Arc<dyn DraftStorage>> = match SqliteDraftStorage::open(&config.db_path) {
        Ok(storage) => Some(Arc::new(storage)),
        Err(e) => {
            log::error!(
                "Draft storage unavailable at {}: {}",
                config.db_path.display(),
                e
            );
            None
        }
    };

    let mut session = QuizSession::new(page, backend, storage);
    let restored = session.start();

    let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let mut app = App::new(session, &config, feedback_tx, events_tx);
    if restored > 0 {
        app.view.notify(
            BannerTone::Info,
            "Draft restored",
            format!("{} saved answer(s) restored", restored),
        );
    }

    let mut terminal = setup_terminal()?;

    let result = run(&mut terminal, &mut app, feedback_rx, events_rx).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("Exiting after terminal error: {}", e);
    }
    result
}

/// Enters raw mode and the alternate screen. A failure part way through
/// puts the terminal back before returning the error.
fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let entered = execute!(stdout, EnterAlternateScreen);
    let terminal = entered.and_then(|()| Terminal::new(CrosstermBackend::new(stdout)));
    restore_on_err(terminal, || {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = disable_raw_mode();
    })
}

fn restore_on_err<T>(result: io::Result<T>, restore: impl FnOnce()) -> io::Result<T> {
    if let Err(e) = &result {
        log::error!("Terminal setup failed: {}", e);
        restore();
    }
    result
}

async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut feedback_rx: mpsc::UnboundedReceiver<FeedbackResponse>,
    mut events_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> io::Result<()> {
    let mut reader = EventStream::new();
    let mut ticker = tokio::time::interval(TICK_RATE);

    loop {
        terminal.draw(|f| app.draw(f))?;

        tokio::select! {
            maybe_event = reader.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => break,
            },
            Some(response) = feedback_rx.recv() => app.on_feedback(response),
            Some(event) = events_rx.recv() => app.on_event(event),
            _ = ticker.tick() => {
                app.tick(Instant::now());
            }
        }
    }

    log::info!("Quiz closed");
    Ok(())
}
