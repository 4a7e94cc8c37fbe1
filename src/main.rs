use clap::Parser;
use protimer::app::{App, Outcome};
use protimer::cli::Arguments;
use protimer::clock::SystemClock;
use protimer::settings::Store;
use std::io;
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use tracing_log::LogTracer;

fn main() {
    let arguments = Arguments::parse();
    set_log_level(&arguments).expect("Failed to configure logging");

    tracing::debug!(?arguments, "starting protimer");

    if let Err(e) = run(arguments) {
        tracing::error!(%e, "Unable to run the stopwatch");
    }
}

fn set_log_level(arguments: &Arguments) -> anyhow::Result<()> {
    LogTracer::init()?;

    let level = match arguments.verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(level)
        .with_file(true)
        .with_line_number(true)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn run(arguments: Arguments) -> anyhow::Result<()> {
    let store = Store::new(arguments.settings);
    let mut app = App::new(store, SystemClock::default(), arguments.export_dir);

    let (sender, receiver) = mpsc::channel();
    std::thread::spawn(move || read_loop(sender));

    println!("protimer ready; type 'help' for commands.");

    loop {
        // The poll granularity follows the precision setting; elapsed time
        // itself is derived from the clock, so a late tick loses nothing.
        match receiver.recv_timeout(app.tick_interval()) {
            Ok(line) => {
                if app.handle_line(line.trim()) == Outcome::Quit {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        app.run_tick();
    }

    Ok(())
}

fn read_loop(sender: Sender<String>) {
    let stdin = io::stdin();

    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                if sender.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to read console input");
                break;
            }
        }
    }
}
