mod commands;
mod render;

use anyhow::{Context, Result};
use clap::Parser;
use commands::{CalendarCommand, Command};
use rustyline::error::ReadlineError;
use seedling_core::{
    Overlay, Phase, RandomSource, SeededRandom, SeedlingConfig, Session, SessionStore, ThreadRandom,
    UiState,
};
use seedling_reasoning::providers::{create_client, MockProvider};
use seedling_reasoning::{GenerationClient, TurnController, TurnOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "seedling", author, version, about, long_about = None)]
struct Args {
    /// Path to the config file (defaults to <config dir>/seedling/config.toml)
    #[arg(short, long, env = "SEEDLING_CONFIG")]
    config: Option<PathBuf>,

    /// Model provider: gemini or mock
    #[arg(long)]
    provider: Option<String>,

    /// Model name
    #[arg(short, long)]
    model: Option<String>,

    /// Multiply every scripted delay (0.1 makes the awakening ten times faster)
    #[arg(long)]
    time_scale: Option<f64>,

    /// Seed the flavor-text and reflection randomness for a repeatable session
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

enum Input {
    Line(String),
    Interrupted,
    Eof,
}

enum Flow {
    Continue,
    Quit,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let _log_guard = init_tracing(args.log_file.as_deref())?;

    let config = load_config(&args);
    let client = build_client(&config);
    let random: Arc<dyn RandomSource> = match args.seed {
        Some(seed) => Arc::new(SeededRandom::new(seed)),
        None => Arc::new(ThreadRandom),
    };

    let store = Arc::new(SessionStore::new());
    let controller = TurnController::new(Arc::clone(&store), client, random, &config);
    info!(provider = %config.llm.provider, model = %config.llm.model, "Seedling starting");

    println!("🌱 A small seed of light waits in the dark. (/help for commands, /quit to leave)");
    println!("What is your name?");

    let printer = tokio::spawn(print_updates(store.subscribe(), store.subscribe_ui()));
    let mut lines = spawn_reader();

    while let Some(input) = lines.recv().await {
        match input {
            Input::Line(line) => {
                if let Flow::Quit = handle_line(&controller, &line).await {
                    break;
                }
            }
            Input::Interrupted => println!("(Ctrl-C detected. Type /quit to leave.)"),
            Input::Eof => break,
        }
    }

    printer.abort();
    println!("🌙 Until next time.");
    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    match log_file {
        Some(path) => {
            let file_name = path
                .file_name()
                .with_context(|| format!("Log path {} has no file name", path.display()))?;
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}

fn load_config(args: &Args) -> SeedlingConfig {
    let path = args
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|d| d.join("seedling").join("config.toml")));
    let mut config = match path {
        Some(path) if path.exists() || args.config.is_some() => SeedlingConfig::load_or_default(path),
        _ => SeedlingConfig::default(),
    };
    if let Some(provider) = &args.provider {
        config.llm.provider = provider.clone();
    }
    if let Some(model) = &args.model {
        config.llm.model = model.clone();
    }
    if let Some(scale) = args.time_scale {
        config.pacing.time_scale = scale;
    }
    config
}

fn build_client(config: &SeedlingConfig) -> Arc<dyn GenerationClient> {
    match create_client(&config.llm) {
        Ok(client) => client,
        Err(e) => {
            warn!("Falling back to the offline companion: {:#}", e);
            println!("(No model available: {e:#}. Your seedling will speak from memory instead.)");
            Arc::new(MockProvider::new("offline"))
        }
    }
}

/// rustyline blocks, so it lives on its own thread and feeds lines back.
fn spawn_reader() -> mpsc::Receiver<Input> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let mut rl = match rustyline::DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                warn!("Line editor unavailable: {}", e);
                let _ = tx.blocking_send(Input::Eof);
                return;
            }
        };
        loop {
            let input = match rl.readline("> ") {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        let _ = rl.add_history_entry(line.as_str());
                    }
                    Input::Line(line)
                }
                Err(ReadlineError::Interrupted) => Input::Interrupted,
                Err(ReadlineError::Eof) => Input::Eof,
                Err(e) => {
                    warn!("Readline error: {}", e);
                    Input::Eof
                }
            };
            let done = matches!(input, Input::Eof);
            if tx.blocking_send(input).is_err() || done {
                break;
            }
        }
    });
    rx
}

/// Print every new message and phase change as snapshots are committed,
/// and the typing indicator as it rises.
async fn print_updates(mut rx: watch::Receiver<Arc<Session>>, mut ui: watch::Receiver<UiState>) {
    let (mut session_id, mut shown, mut phase) = {
        let s = rx.borrow_and_update();
        (s.id, s.messages.len(), s.phase)
    };
    let mut typing = ui.borrow_and_update().is_typing();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = ui.changed() => {
                if changed.is_err() {
                    break;
                }
                let now = *ui.borrow_and_update();
                if let Some(line) = render::typing(&rx.borrow(), typing, &now) {
                    println!("{line}");
                }
                typing = now.is_typing();
                continue;
            }
        }
        let snapshot = Arc::clone(&rx.borrow_and_update());
        if snapshot.id != session_id {
            session_id = snapshot.id;
            shown = 0;
        }
        for msg in snapshot.messages.iter().skip(shown) {
            if let Some(line) = render::message(&snapshot, msg) {
                println!("{line}");
            }
        }
        shown = snapshot.messages.len();

        if snapshot.phase != phase {
            if let Some(hint) = phase_hint(phase, &snapshot) {
                println!("{hint}");
            }
            phase = snapshot.phase;
        }
    }
}

fn phase_hint(previous: Phase, session: &Session) -> Option<String> {
    match session.phase {
        Phase::Intro => Some("🌱 A new seed waits. What is your name?".to_string()),
        Phase::Naming => Some(format!("Hello, {}. What will you call your seedling?", session.user_name)),
        Phase::Ceremony => Some(format!("Press Enter to begin {}'s awakening.", session.ai_name)),
        Phase::Awakening => None,
        Phase::Chat if previous == Phase::Awakening => {
            Some("(Type to talk. /spark lets them speak first.)".to_string())
        }
        Phase::Chat => None,
        Phase::DreamState => Some(format!("(💤 {} is dreaming. /wake to wake them.)", session.ai_name)),
    }
}

async fn handle_line(controller: &TurnController, line: &str) -> Flow {
    let command = match commands::parse(line) {
        Ok(command) => command,
        Err(msg) => {
            println!("{msg}");
            return Flow::Continue;
        }
    };

    match command {
        Command::Quit => return Flow::Quit,
        Command::Help => println!("{}", commands::COMMANDS_HELP),
        Command::Reset => controller.reset(),
        Command::Say(text) => say(controller, &text).await,
        other => {
            let snapshot = controller.store().snapshot();
            if snapshot.phase.is_conversational() {
                run_command(controller, other).await;
            } else {
                println!("(That can wait until your seedling is awake.)");
            }
        }
    }
    Flow::Continue
}

async fn say(controller: &TurnController, text: &str) {
    let phase = controller.store().snapshot().phase;
    let result = match phase {
        Phase::Intro => controller.submit_user_name(text),
        Phase::Naming => controller.name_companion(text),
        Phase::Ceremony => controller.begin_awakening().map(|_| ()),
        Phase::Awakening => {
            println!("(The light is still forming...)");
            Ok(())
        }
        Phase::Chat | Phase::DreamState => match controller.handle_user_message(text).await {
            Ok(report) => {
                if report.outcome == TurnOutcome::Abandoned {
                    println!("(The thought drifted away.)");
                }
                Ok(())
            }
            Err(e) => Err(e),
        },
    };
    if let Err(e) = result {
        println!("({e})");
    }
}

async fn run_command(controller: &TurnController, command: Command) {
    let snapshot = controller.store().snapshot();
    match command {
        Command::Spark => match controller.spark_thought().await {
            Ok(report) if report.outcome == TurnOutcome::Busy => {
                println!("({} is already thinking.)", snapshot.ai_name)
            }
            Ok(_) => {}
            Err(e) => println!("({e})"),
        },
        Command::Wake => {
            if controller.wake_from_dream().is_err() {
                println!("({} is not dreaming.)", snapshot.ai_name);
            }
        }
        Command::Garden => show_overlay(controller, Overlay::MemoryGarden, "memory garden", render::memory_garden),
        Command::Gallery => show_overlay(controller, Overlay::Manifestations, "gallery", render::gallery),
        Command::Growth => print!("{}", render::growth(&snapshot)),
        Command::Calendar(action) => calendar(controller, &snapshot, action),
        Command::Say(_) | Command::Help | Command::Reset | Command::Quit => {}
    }
}

fn show_overlay(controller: &TurnController, overlay: Overlay, name: &str, view: fn(&Session) -> String) {
    if controller.toggle_overlay(overlay) {
        print!("{}", view(&controller.store().snapshot()));
    } else {
        println!("(The {name} fades from view.)");
    }
}

fn calendar(controller: &TurnController, snapshot: &Session, action: CalendarCommand) {
    let nth = |n: usize| snapshot.calendar.get(n - 1).map(|e| e.id.clone());
    let result = match action {
        CalendarCommand::Toggle => {
            show_overlay(controller, Overlay::Calendar, "calendar", render::calendar);
            return;
        }
        CalendarCommand::Add { date, title, note } => controller
            .add_calendar_event(&title, &date, note.as_deref())
            .map(|_| "Added.".to_string()),
        CalendarCommand::Complete(n) => match nth(n) {
            Some(id) => controller
                .toggle_calendar_event(&id)
                .map(|done| (if done { "Marked done." } else { "Marked not done." }).to_string()),
            None => Ok(format!("There is no event {n}.")),
        },
        CalendarCommand::Delete(n) => match nth(n) {
            Some(id) => controller
                .delete_calendar_event(&id)
                .map(|event| format!("Removed '{}'.", event.title)),
            None => Ok(format!("There is no event {n}.")),
        },
    };
    match result {
        Ok(msg) => println!("{msg}"),
        Err(e) => println!("({e})"),
    }
}
