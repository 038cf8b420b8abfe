mod app;
mod cli;
mod config;
mod docker;
mod input;
mod model;
mod ui;

use anyhow::{Context, Result};
use app::{App, AppCommand};
use clap::Parser;
use cli::CliArgs;
use config::Settings;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use docker::DockerGateway;
use futures::{FutureExt, Stream, StreamExt};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout};
use tokio::time::{Duration, sleep};
use tracing::debug;
use tracing_subscriber::EnvFilter;

type TuiTerminal = Terminal<CrosstermBackend<Stdout>>;

/// How long the transient "no resources" notice stays on screen before the
/// menu returns to the main screen on its own.
const EMPTY_NOTICE_DELAY: Duration = Duration::from_millis(1_000);

const DEBUG_LOG_FILE: &str = "dockyard.log";

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    let debug_enabled = std::env::var("DEBUG").is_ok_and(|value| value == "true");
    init_tracing(&args.log_filter, debug_enabled)?;

    let settings = Settings::load(args.docker_bin.clone())?;
    let gateway = DockerGateway::new(settings.docker_bin.clone());
    let mut app = App::new(settings);

    run(&mut app, &gateway).await
}

fn init_tracing(level_filter: &str, debug_enabled: bool) -> Result<()> {
    // The TUI owns stdout, so log lines go to a file when DEBUG=true and
    // are otherwise discarded.
    let directive = if debug_enabled { "debug" } else { level_filter };
    let filter = EnvFilter::try_new(directive)
        .or_else(|_| EnvFilter::try_new("info"))
        .context("failed to initialize tracing filter")?;

    if debug_enabled {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(DEBUG_LOG_FILE)
            .with_context(|| format!("failed to open {DEBUG_LOG_FILE}"))?;
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .compact()
            .with_writer(std::sync::Mutex::new(file))
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .with_writer(io::sink)
            .try_init();
    }

    Ok(())
}

async fn run(app: &mut App, gateway: &DockerGateway) -> Result<()> {
    let mut terminal = init_terminal()?;
    let run_result = run_loop(&mut terminal, app, gateway).await;
    let restore_result = restore_terminal(&mut terminal);

    match (run_result, restore_result) {
        (Err(run_error), Err(restore_error)) => Err(anyhow::anyhow!(
            "{run_error:#}\nterminal restore error: {restore_error:#}"
        )),
        (Err(error), _) => Err(error),
        (_, Err(error)) => Err(error),
        (Ok(()), Ok(())) => Ok(()),
    }
}

fn init_terminal() -> Result<TuiTerminal> {
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;
    terminal.clear().context("failed to clear terminal")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut TuiTerminal) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;
    Ok(())
}

async fn run_loop(terminal: &mut TuiTerminal, app: &mut App, gateway: &DockerGateway) -> Result<()> {
    let mut reader = EventStream::new();

    loop {
        terminal
            .draw(|frame| ui::render(frame, app))
            .context("failed to render terminal frame")?;

        if !app.running() {
            break;
        }

        match reader.next().await {
            Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                if let Some(action) = input::map_key(key) {
                    debug!("action={action:?}");
                    let command = app.apply_action(action);
                    dispatch(terminal, app, gateway, &mut reader, command).await?;
                }
            }
            Some(Ok(Event::Resize(_, _))) => {}
            Some(Ok(_)) => {}
            Some(Err(error)) => {
                app.set_status(format!("terminal event error: {error}"));
            }
            None => {
                app.set_status("terminal event stream closed");
                break;
            }
        }
    }

    Ok(())
}

/// Executes the work a state transition asked for. Listing and command
/// execution are awaited inline, so exactly one external process is in
/// flight and no input is handled until it finishes. Keys pressed during
/// those awaits queue up in the terminal event stream; they are discarded
/// before control returns, never replayed against the new screen.
async fn dispatch(
    terminal: &mut TuiTerminal,
    app: &mut App,
    gateway: &DockerGateway,
    reader: &mut EventStream,
    command: AppCommand,
) -> Result<()> {
    match command {
        AppCommand::None => {}
        AppCommand::StartListing {
            action,
            kind,
            template,
        } => {
            terminal
                .draw(|frame| ui::render(frame, app))
                .context("failed to render terminal frame")?;
            let result = gateway.list(kind).await;
            app.finish_listing(action, kind, template, result);
            if app.notice_active() {
                terminal
                    .draw(|frame| ui::render(frame, app))
                    .context("failed to render terminal frame")?;
                sleep(EMPTY_NOTICE_DELAY).await;
                app.dismiss_notice();
            }
            discard_buffered_input(reader).await;
        }
        AppCommand::Execute { command } => {
            terminal
                .draw(|frame| ui::render(frame, app))
                .context("failed to render terminal frame")?;
            let report = gateway.execute(&command).await;
            app.set_status(report);
            discard_buffered_input(reader).await;
        }
    }

    Ok(())
}

async fn discard_buffered_input<S>(events: &mut S) -> usize
where
    S: Stream + Unpin,
{
    let mut discarded = 0usize;
    while let Some(Some(_)) = events.next().now_or_never() {
        discarded += 1;
    }
    if discarded > 0 {
        debug!("discarded {discarded} input events buffered during an await");
    }
    discarded
}
