//! gesture_deck — interactive entry point.

use gesture_deck::app::run;
use gesture_deck::cli::Cli;
use gesture_deck::config::DetectorKind;
use tracing::error;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse_args();

    // --verbose enables debug-level output
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let cfg = match cli.resolve_config() {
        Ok(cfg) => cfg,
        Err(e)  => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    if cli.print_config {
        match cfg.to_toml() {
            Ok(text) => print!("{}", text),
            Err(e)   => {
                error!("{}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          Gesture Deck — hand-gesture media controller        ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    match cfg.detector.kind {
        DetectorKind::Sim     => println!("  Mode: Keyboard + mouse simulation"),
        DetectorKind::Process => println!("  Mode: External detector `{}`", cfg.detector.command.join(" ")),
        DetectorKind::Leap    => println!("  Mode: LeapMotion hardware"),
    }
    println!();
    println!("  Opening visualizer window…");
    println!();

    if let Err(e) = run(cfg) {
        error!("{}", e);
        std::process::exit(1);
    }
}
