//! Dodge Sim entry point
//!
//! Headless runner: plays sessions with the autopilot at a fixed frame rate,
//! logs a HUD line every simulated second and prints the leaderboard.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use dodge_sim::consts::SIM_DT;
use dodge_sim::highscores::format_seconds;
use dodge_sim::platform::{Autopilot, Renderer};
use dodge_sim::sim::FrameView;
use dodge_sim::{Config, FileLeaderboard, GameError, GameStateMachine, Mode, Phase};

#[derive(Parser, Debug)]
#[command(name = "dodge-sim", about = "Headless projectile-dodging survival simulation")]
struct Args {
    /// Game mode: normal or nightmare
    #[arg(long, default_value = "normal", value_parser = parse_mode)]
    mode: Mode,

    /// RNG seed for the first session
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// JSON file of options layered over the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the leaderboard files
    #[arg(long, default_value = "scores")]
    scores: PathBuf,

    /// Stop a session that survives this long (seconds, not recorded)
    #[arg(long, default_value_t = 300.0)]
    max_seconds: f32,

    /// Number of sessions to play
    #[arg(long, default_value_t = 1)]
    runs: u32,

    /// Show the leaderboard for the mode and exit
    #[arg(long)]
    hall_of_fame: bool,
}

fn parse_mode(s: &str) -> Result<Mode, String> {
    Mode::from_str(s).ok_or_else(|| format!("unknown mode `{s}` (expected normal or nightmare)"))
}

/// Logs the HUD once per simulated second
#[derive(Default)]
struct LogRenderer {
    last_second: Option<u32>,
}

impl Renderer for LogRenderer {
    fn render(&mut self, view: &FrameView<'_>) {
        let Some(session) = &view.session else {
            self.last_second = None;
            return;
        };
        let second = session.elapsed as u32;
        if self.last_second == Some(second) {
            return;
        }
        self.last_second = Some(second);

        let next_heart = session
            .next_heart_at
            .map(|n| format!(", next heart at {n}"))
            .unwrap_or_default();
        log::info!(
            "[{}] hearts {}/{}, dodges {}{}, {} projectiles, interval {:.2}s",
            format_seconds(session.elapsed),
            session.hearts,
            session.max_hearts,
            session.dodges,
            next_heart,
            session.projectiles.len(),
            session.spawn_interval
        );
    }
}

fn print_board(mode: Mode, view: &FrameView<'_>) {
    println!("Top scores ({})", mode.as_str());
    if view.board.is_empty() {
        println!("  (none yet)");
    }
    for (rank, record) in view.board.iter().enumerate() {
        println!(
            "  {:>2}. {:>8}  {} dodges",
            rank + 1,
            format_seconds(record.survival_time),
            record.dodges
        );
    }
}

fn run(args: &Args) -> Result<(), GameError> {
    let config = match &args.config {
        Some(path) => Config::defaults().merged(Config::load(path)?),
        None => Config::defaults(),
    };
    let store = FileLeaderboard::new(&args.scores);
    let mut machine = GameStateMachine::new(&config, store, args.seed);

    if args.hall_of_fame {
        machine.show_hall_of_fame(args.mode)?;
        print_board(args.mode, &machine.view());
        return Ok(());
    }

    let mut pilot = Autopilot::default();
    let mut renderer = LogRenderer::default();

    for run in 1..=args.runs {
        machine.start(args.mode)?;

        while machine.phase() == Phase::Playing {
            machine.frame(&mut pilot, SIM_DT)?;
            let view = machine.view();
            renderer.render(&view);

            let timed_out = view
                .session
                .as_ref()
                .is_some_and(|s| s.elapsed >= args.max_seconds);
            if timed_out {
                log::warn!("Run {} hit the {}s limit, abandoning", run, args.max_seconds);
                machine.abandon()?;
            }
        }

        let view = machine.view();
        if let Some(record) = view.last_record {
            println!(
                "Run {}: survived {} with {} dodges",
                run,
                format_seconds(record.survival_time),
                record.dodges
            );
            print_board(args.mode, &view);
        }
        machine.request_menu()?;
    }

    let stats = machine.stats();
    println!(
        "{} sessions, {} hits, {} dodges, {} hearts restored, best {}",
        stats.sessions_played,
        stats.total_hits,
        stats.total_dodges,
        stats.total_hearts_restored,
        format_seconds(stats.best_survival)
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
