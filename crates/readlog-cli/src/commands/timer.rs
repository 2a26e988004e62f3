use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use readlog_core::{Config, CoreError, Database, StateError, SystemClock, TimerStateMachine};

use super::common;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start (or resume) the timer
    Start,
    /// Pause, keeping the accumulated time
    Pause,
    /// Discard the accumulated time and the saved state
    Reset,
    /// Record the elapsed time as a session
    Submit,
    /// Print the current timer state as JSON
    Status,
    /// Run the live timer, printing elapsed time once per second
    Watch,
}

/// The machine persists itself through the database's kv table, so state
/// carries across one-shot invocations.
fn load_machine(
    config: &Config,
    db: &Arc<Database>,
) -> Result<TimerStateMachine, Box<dyn std::error::Error>> {
    let sessions = common::session_store(config, db)?;
    let mut machine = TimerStateMachine::new(Arc::new(SystemClock), db.clone(), sessions);
    machine.rehydrate()?;
    Ok(machine)
}

pub fn run(action: TimerAction) -> common::CliResult {
    let config = Config::load()?;
    let db = Arc::new(Database::open()?);
    let mut machine = load_machine(&config, &db)?;

    match action {
        TimerAction::Start => match machine.start()? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            // Already running; show where it stands instead.
            None => println!("{}", serde_json::to_string_pretty(&machine.snapshot())?),
        },
        TimerAction::Pause => match machine.pause()? {
            Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
            None => println!("{}", serde_json::to_string_pretty(&machine.snapshot())?),
        },
        TimerAction::Reset => {
            let event = machine.reset()?;
            println!("{}", serde_json::to_string_pretty(&event)?);
        }
        TimerAction::Submit => {
            let rt = common::runtime()?;
            match rt.block_on(machine.submit()) {
                Ok(session) => println!("{}", serde_json::to_string_pretty(&session)?),
                Err(CoreError::State(StateError::SubmitBelowMinimum {
                    elapsed_secs,
                    min_secs,
                })) => {
                    eprintln!("nothing submitted: {elapsed_secs}s elapsed, {min_secs}s required");
                }
                Err(e) => return Err(e.into()),
            }
        }
        TimerAction::Status => {
            machine.tick();
            println!("{}", serde_json::to_string_pretty(&machine.snapshot())?);
        }
        TimerAction::Watch => {
            let rt = common::runtime()?;
            rt.block_on(watch(machine))?;
        }
    }
    Ok(())
}

/// Live mode: keep the process in the foreground and repaint the elapsed
/// time on every tick until interrupted.
async fn watch(mut machine: TimerStateMachine) -> Result<(), Box<dyn std::error::Error>> {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    machine.set_on_tick(Arc::new(move || {
        let _ = tx.send(());
    }));
    machine.start()?;

    print_elapsed(machine.elapsed_ms())?;
    while rx.recv().await.is_some() {
        print_elapsed(machine.tick())?;
    }
    Ok(())
}

fn print_elapsed(elapsed_ms: i64) -> std::io::Result<()> {
    let secs = elapsed_ms / 1000;
    print!("\r{:02}:{:02}", secs / 60, secs % 60);
    std::io::stdout().flush()
}
