use eptsdle::cli::{CliInterface, parse_cli};
use eptsdle::game_state::game_loop;
use eptsdle::logging::init_logging;
use eptsdle::tui::TuiInterface;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;

fn main() {
    let cli = parse_cli();

    match init_logging(!cli.plain) {
        Ok(Some(path)) => log::info!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => eprintln!("Failed to set up log file: {e}"),
    }

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let paths = cli.data_paths();

    let outcome = if cli.plain {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        game_loop(&mut interface, &paths, cli.game, &mut rng)
    } else {
        let mut interface = match TuiInterface::new(cli.game) {
            Ok(interface) => interface,
            Err(e) => {
                eprintln!("Failed to start the terminal interface: {e}");
                eprintln!("Try again with --plain.");
                return;
            }
        };
        game_loop(&mut interface, &paths, cli.game, &mut rng)
    };

    log::info!(
        "Finished in {} after winning {} round(s)",
        outcome.kind.title(),
        outcome.rounds_won
    );
}
