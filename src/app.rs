use crate::clock::Clock;
use crate::engine::records::LapRecord;
use crate::engine::timing::Phase;
use crate::engine::Stopwatch;
use crate::format;
use crate::settings::{Precision, Store, Theme};
use crate::view::{self, RecordFilter, RecordSort};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// One console command, parsed from an input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Lap,
    Split,
    Reset,
    Clear,
    Records,
    Stats,
    Status,
    Sort(RecordSort),
    Filter(RecordFilter),
    Precision(Precision),
    Sound(bool),
    AutoLap(u32),
    ConfirmReset(bool),
    Theme,
    Export(Option<PathBuf>),
    Help,
    Quit,
}

#[derive(Debug)]
pub struct CommandParseError;

impl Display for CommandParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unrecognized command; try 'help'")
    }
}

impl Error for CommandParseError {}

fn parse_switch(s: &str) -> Result<bool, CommandParseError> {
    match s {
        "on" => Ok(true),
        "off" => Ok(false),
        _ => Err(CommandParseError),
    }
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let head = words.next().ok_or(CommandParseError)?;
        let tail = words.next();
        if words.next().is_some() {
            return Err(CommandParseError);
        }

        match (head, tail) {
            ("start", None) => Ok(Command::Start),
            ("pause", None) => Ok(Command::Pause),
            ("toggle", None) => Ok(Command::Toggle),
            ("lap", None) => Ok(Command::Lap),
            ("split", None) => Ok(Command::Split),
            ("reset", None) => Ok(Command::Reset),
            ("clear", None) => Ok(Command::Clear),
            ("records", None) => Ok(Command::Records),
            ("stats", None) => Ok(Command::Stats),
            ("status", None) => Ok(Command::Status),
            ("theme", None) => Ok(Command::Theme),
            ("export", None) => Ok(Command::Export(None)),
            ("export", Some(path)) => Ok(Command::Export(Some(PathBuf::from(path)))),
            ("help", None) => Ok(Command::Help),
            ("quit", None) | ("exit", None) => Ok(Command::Quit),
            ("sort", Some(choice)) => {
                Ok(Command::Sort(choice.parse().map_err(|_| CommandParseError)?))
            }
            ("filter", Some(choice)) => Ok(Command::Filter(
                choice.parse().map_err(|_| CommandParseError)?,
            )),
            ("precision", Some("cs")) | ("precision", Some("centiseconds")) => {
                Ok(Command::Precision(Precision::Centiseconds))
            }
            ("precision", Some("ms")) | ("precision", Some("milliseconds")) => {
                Ok(Command::Precision(Precision::Milliseconds))
            }
            ("sound", Some(switch)) => Ok(Command::Sound(parse_switch(switch)?)),
            ("confirm", Some(switch)) => Ok(Command::ConfirmReset(parse_switch(switch)?)),
            ("autolap", Some(seconds)) => Ok(Command::AutoLap(
                seconds.parse().map_err(|_| CommandParseError)?,
            )),
            _ => Err(CommandParseError),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Console adapter around the engine: parses commands, renders state, and
/// owns the view selections, reset confirmation, and settings persistence.
pub struct App<C> {
    stopwatch: Stopwatch,
    store: Store,
    clock: C,
    export_dir: PathBuf,
    filter: RecordFilter,
    sort: RecordSort,
    pending_reset: bool,
    last_render: String,
}

impl<C: Clock> App<C> {
    pub fn new(store: Store, clock: C, export_dir: PathBuf) -> Self {
        let settings = store.load();
        let stopwatch = Stopwatch::new(settings, clock.now_utc());
        Self {
            stopwatch,
            store,
            clock,
            export_dir,
            filter: RecordFilter::default(),
            sort: RecordSort::default(),
            pending_reset: false,
            last_render: String::new(),
        }
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn tick_interval(&self) -> Duration {
        self.stopwatch.settings().precision.tick_interval()
    }

    /// Wall-clock time since the session began, independent of the
    /// stopwatch's run state.
    pub fn session_elapsed_ms(&self) -> u64 {
        (self.clock.now_utc() - self.stopwatch.session_start())
            .num_milliseconds()
            .max(0) as u64
    }

    /// Advances the engine from the real clock and repaints the running
    /// display when it changes.
    pub fn run_tick(&mut self) {
        let tick = self
            .stopwatch
            .tick(self.clock.now_ms(), self.clock.now_utc());

        if let Some(lap) = tick.auto_lap {
            println!();
            self.announce_lap(&lap);
            self.chirp();
        }

        if self.stopwatch.is_running() {
            let rendered = format::elapsed(tick.elapsed_ms, self.stopwatch.settings().precision);
            if rendered != self.last_render {
                print!("\r{rendered}");
                let _ = std::io::stdout().flush();
                self.last_render = rendered;
            }
        }
    }

    pub fn handle_line(&mut self, line: &str) -> Outcome {
        if self.pending_reset {
            self.pending_reset = false;
            if matches!(line, "y" | "yes") {
                self.stopwatch.reset();
                self.chirp();
                println!("Reset.");
            } else {
                println!("Reset cancelled.");
            }
            return Outcome::Continue;
        }

        match line.parse::<Command>() {
            Ok(command) => self.dispatch(command),
            Err(e) => {
                println!("{e}");
                Outcome::Continue
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> Outcome {
        match command {
            Command::Start => {
                self.stopwatch.start(self.clock.now_ms());
                self.chirp();
                self.print_status();
            }
            Command::Pause => {
                self.stopwatch.pause(self.clock.now_ms());
                self.chirp();
                self.print_status();
            }
            Command::Toggle => {
                self.stopwatch.toggle(self.clock.now_ms());
                self.chirp();
                self.print_status();
            }
            Command::Lap => {
                match self
                    .stopwatch
                    .record_lap(self.clock.now_ms(), self.clock.now_utc())
                {
                    Some(lap) => {
                        self.announce_lap(&lap);
                        self.chirp();
                    }
                    None => println!("Not running; no lap recorded."),
                }
            }
            Command::Split => {
                match self
                    .stopwatch
                    .record_split(self.clock.now_ms(), self.clock.now_utc())
                {
                    Some(split) => {
                        println!(
                            "Split {}: {}",
                            split.sequence,
                            format::elapsed(split.elapsed_ms, self.stopwatch.settings().precision)
                        );
                        self.chirp();
                    }
                    None => println!("Not running; no split recorded."),
                }
            }
            Command::Reset => {
                if self.stopwatch.settings().confirm_reset && self.stopwatch.has_session_data() {
                    self.pending_reset = true;
                    println!("Reset the stopwatch and discard all records? [y/N]");
                } else {
                    self.stopwatch.reset();
                    self.chirp();
                    println!("Reset.");
                }
            }
            Command::Clear => {
                if self.stopwatch.record_count() == 0 {
                    println!("No records to clear.");
                } else {
                    self.stopwatch.clear_records();
                    self.chirp();
                    println!("All records cleared.");
                }
            }
            Command::Records => self.print_records(),
            Command::Stats => self.print_stats(),
            Command::Status => self.print_status(),
            Command::Sort(sort) => {
                self.sort = sort;
                self.print_records();
            }
            Command::Filter(filter) => {
                self.filter = filter;
                self.print_records();
            }
            Command::Precision(precision) => {
                self.stopwatch.settings_mut().precision = precision;
                self.persist_settings();
                self.print_status();
            }
            Command::Sound(enabled) => {
                self.stopwatch.settings_mut().sound_enabled = enabled;
                self.persist_settings();
                println!("Sound {}.", if enabled { "on" } else { "off" });
            }
            Command::AutoLap(seconds) => {
                self.stopwatch.settings_mut().auto_lap_interval = seconds;
                self.persist_settings();
                if seconds == 0 {
                    println!("Auto lap disabled.");
                } else {
                    println!("Auto lap every {seconds}s.");
                }
            }
            Command::ConfirmReset(enabled) => {
                self.stopwatch.settings_mut().confirm_reset = enabled;
                self.persist_settings();
                println!("Reset confirmation {}.", if enabled { "on" } else { "off" });
            }
            Command::Theme => {
                let theme = self.stopwatch.settings().theme.toggled();
                self.stopwatch.settings_mut().theme = theme;
                self.persist_settings();
                println!(
                    "Theme: {}.",
                    match theme {
                        Theme::Light => "light",
                        Theme::Dark => "dark",
                    }
                );
            }
            Command::Export(path) => {
                let directory = path.as_deref().unwrap_or(&self.export_dir);
                let export = self.stopwatch.export(self.clock.now_utc());
                match export.write_to(directory) {
                    Ok(path) => {
                        self.chirp();
                        println!("Exported to {}", path.display());
                    }
                    Err(e) => {
                        tracing::error!(%e, "Failed to export the session");
                        println!("Export failed: {e}");
                    }
                }
            }
            Command::Help => self.print_help(),
            Command::Quit => return Outcome::Quit,
        }

        Outcome::Continue
    }

    fn persist_settings(&self) {
        if let Err(e) = self.store.save(self.stopwatch.settings()) {
            tracing::warn!(%e, path = %self.store.path().display(), "Failed to persist settings");
        }
    }

    fn chirp(&self) {
        if self.stopwatch.settings().sound_enabled {
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
    }

    fn announce_lap(&self, lap: &LapRecord) {
        let precision = self.stopwatch.settings().precision;
        println!(
            "Lap {}: {} (total {})",
            lap.sequence,
            format::elapsed(lap.lap_ms, precision),
            format::elapsed(lap.total_ms, precision)
        );
    }

    fn print_status(&mut self) {
        let phase = match self.stopwatch.phase() {
            Phase::Ready => "Ready",
            Phase::Running => "Running",
            Phase::Paused => "Paused",
        };
        let rendered = format::elapsed(
            self.stopwatch.elapsed_ms(),
            self.stopwatch.settings().precision,
        );
        println!(
            "{phase} {rendered} (session {})",
            format::session(self.session_elapsed_ms())
        );
        self.last_render.clear();
    }

    fn print_records(&self) {
        let count = self.stopwatch.record_count();
        println!("{} record{}", count, if count == 1 { "" } else { "s" });

        let entries = view::project(
            self.stopwatch.laps(),
            self.stopwatch.splits(),
            self.filter,
            self.sort,
        );
        if entries.is_empty() {
            println!("No records to display");
            return;
        }

        let precision = self.stopwatch.settings().precision;
        let analytics = self.stopwatch.analytics();
        let best = analytics.best_lap.as_ref().map(|lap| lap.sequence);
        let worst = analytics.worst_lap.as_ref().map(|lap| lap.sequence);

        for entry in entries {
            let badge = match entry {
                view::RecordEntry::Lap(lap) if best == Some(lap.sequence) => " BEST",
                view::RecordEntry::Lap(lap) if worst == Some(lap.sequence) => " SLOWEST",
                _ => "",
            };
            println!(
                "#{} {} {} at {}{}",
                entry.sequence(),
                entry.kind(),
                format::elapsed(entry.display_ms(), precision),
                entry.captured_at().format("%H:%M:%S"),
                badge
            );
        }
    }

    fn print_stats(&self) {
        let precision = self.stopwatch.settings().precision;
        let analytics = self.stopwatch.analytics();

        println!("Laps: {}", analytics.lap_count);
        match analytics.average_lap_ms {
            Some(average) => println!("Average: {}", format::elapsed(average as u64, precision)),
            None => println!("Average: --:--"),
        }
        match &analytics.best_lap {
            Some(lap) => println!(
                "Best: {} (lap {})",
                format::elapsed(lap.lap_ms, precision),
                lap.sequence
            ),
            None => println!("Best: --:--"),
        }
        match &analytics.worst_lap {
            Some(lap) => println!(
                "Worst: {} (lap {})",
                format::elapsed(lap.lap_ms, precision),
                lap.sequence
            ),
            None => println!("Worst: --:--"),
        }
        if analytics.lap_count == 0 {
            println!("Consistency: --%");
        } else {
            println!("Consistency: {}%", analytics.consistency_percent.round());
        }
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  start | pause | toggle      control the stopwatch");
        println!("  lap | split                 capture a record while running");
        println!("  reset | clear               discard the session / the records");
        println!("  records | stats | status    show state");
        println!("  sort <newest|oldest|fastest|slowest>");
        println!("  filter <all|laps|splits>");
        println!("  precision <cs|ms> | sound <on|off> | autolap <sec> | confirm <on|off> | theme");
        println!("  export [dir] | help | quit");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use chrono::{DateTime, Utc};
    use std::cell::Cell;

    struct ManualClock {
        now_ms: Cell<u64>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now_ms: Cell::new(0),
            }
        }
    }

    impl Clock for ManualClock {
        fn now_ms(&self) -> u64 {
            self.now_ms.get()
        }

        fn now_utc(&self) -> DateTime<Utc> {
            DateTime::from_timestamp_millis(1_700_000_000_000 + self.now_ms.get() as i64).unwrap()
        }
    }

    fn test_app(settings: Settings) -> (App<ManualClock>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path().join("settings.json"));
        store.save(&settings).unwrap();
        let app = App::new(store, ManualClock::new(), dir.path().to_path_buf());
        (app, dir)
    }

    #[test]
    fn commands_parse_from_console_lines() {
        assert_eq!("start".parse::<Command>().unwrap(), Command::Start);
        assert_eq!(
            "sort fastest".parse::<Command>().unwrap(),
            Command::Sort(RecordSort::Fastest)
        );
        assert_eq!(
            "filter laps".parse::<Command>().unwrap(),
            Command::Filter(RecordFilter::Laps)
        );
        assert_eq!(
            "precision ms".parse::<Command>().unwrap(),
            Command::Precision(Precision::Milliseconds)
        );
        assert_eq!(
            "sound off".parse::<Command>().unwrap(),
            Command::Sound(false)
        );
        assert_eq!(
            "autolap 10".parse::<Command>().unwrap(),
            Command::AutoLap(10)
        );
        assert_eq!("export".parse::<Command>().unwrap(), Command::Export(None));
        assert_eq!(
            "export /tmp/out".parse::<Command>().unwrap(),
            Command::Export(Some(PathBuf::from("/tmp/out")))
        );
        assert!("autolap ten".parse::<Command>().is_err());
        assert!("sort sideways".parse::<Command>().is_err());
        assert!("frobnicate".parse::<Command>().is_err());
        assert!("lap extra words".parse::<Command>().is_err());
        assert!("".parse::<Command>().is_err());
    }

    #[test]
    fn lap_is_refused_until_started() {
        let (mut app, _dir) = test_app(Settings::default());
        app.handle_line("lap");
        assert!(app.stopwatch().laps().is_empty());

        app.handle_line("start");
        app.clock.now_ms.set(1_500);
        app.handle_line("lap");
        assert_eq!(app.stopwatch().laps().len(), 1);
        assert_eq!(app.stopwatch().laps()[0].lap_ms, 1_500);
    }

    #[test]
    fn reset_waits_for_confirmation_when_there_is_data() {
        let (mut app, _dir) = test_app(Settings::default());
        app.handle_line("start");
        app.clock.now_ms.set(2_000);
        app.handle_line("lap");

        app.handle_line("reset");
        // Anything but yes cancels.
        app.handle_line("n");
        assert_eq!(app.stopwatch().laps().len(), 1);

        app.handle_line("reset");
        app.handle_line("y");
        assert!(app.stopwatch().laps().is_empty());
        assert_eq!(app.stopwatch().phase(), Phase::Ready);
    }

    #[test]
    fn reset_skips_confirmation_with_nothing_to_lose() {
        let (mut app, _dir) = test_app(Settings::default());
        app.handle_line("reset");
        assert!(!app.pending_reset);
        assert_eq!(app.stopwatch().phase(), Phase::Ready);
    }

    #[test]
    fn reset_skips_confirmation_when_disabled() {
        let mut settings = Settings::default();
        settings.confirm_reset = false;
        let (mut app, _dir) = test_app(settings);

        app.handle_line("start");
        app.clock.now_ms.set(500);
        app.handle_line("reset");
        assert!(!app.pending_reset);
        assert_eq!(app.stopwatch().elapsed_ms(), 0);
    }

    #[test]
    fn setting_changes_persist_immediately() {
        let (mut app, _dir) = test_app(Settings::default());
        app.handle_line("precision ms");
        app.handle_line("autolap 30");

        let reloaded = app.store.load();
        assert_eq!(reloaded.precision, Precision::Milliseconds);
        assert_eq!(reloaded.auto_lap_interval, 30);
    }

    #[test]
    fn export_writes_a_parseable_session_file() {
        let (mut app, dir) = test_app(Settings::default());
        app.handle_line("start");
        app.clock.now_ms.set(1_000);
        app.handle_line("lap");
        app.handle_line("export");

        let exported = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .find(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("protimer-session-")
            })
            .expect("an export file exists");
        let blob = std::fs::read_to_string(exported.path()).unwrap();
        let parsed: crate::session::SessionExport = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed.session.lap_times.len(), 1);
    }

    #[test]
    fn export_honors_a_destination_argument() {
        let (mut app, dir) = test_app(Settings::default());
        let destination = dir.path().join("sessions");
        std::fs::create_dir(&destination).unwrap();

        app.handle_line("start");
        app.clock.now_ms.set(1_000);
        app.handle_line("lap");
        app.handle_line(&format!("export {}", destination.display()));

        let exported = std::fs::read_dir(&destination)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .find(|entry| {
                entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with("protimer-session-")
            })
            .expect("an export file exists in the requested directory");
        let blob = std::fs::read_to_string(exported.path()).unwrap();
        let parsed: crate::session::SessionExport = serde_json::from_str(&blob).unwrap();
        assert_eq!(parsed.session.lap_times.len(), 1);
    }

    #[test]
    fn session_clock_follows_the_wall_clock() {
        let (mut app, _dir) = test_app(Settings::default());
        assert_eq!(app.session_elapsed_ms(), 0);

        // The session clock keeps counting even while paused.
        app.clock.now_ms.set(65_000);
        assert_eq!(app.session_elapsed_ms(), 65_000);
        assert_eq!(app.stopwatch().elapsed_ms(), 0);
        assert_eq!(format::session(app.session_elapsed_ms()), "1:05");
    }

    #[test]
    fn quit_ends_the_session() {
        let (mut app, _dir) = test_app(Settings::default());
        assert_eq!(app.handle_line("quit"), Outcome::Quit);
        assert_eq!(app.handle_line("status"), Outcome::Continue);
    }
}
