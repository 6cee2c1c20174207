use anyhow::{bail, Result};

use balatro_bot::heuristics::HeuristicPlayer;
use balatro_bot::server::LiveServer;
use balatro_bot::simulator::GameSimulator;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 12345;

fn usage() -> ! {
    eprintln!("usage: balatro-bot serve [host] [port]");
    eprintln!("       balatro-bot demo [seed] [games]");
    std::process::exit(2);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("serve") => {
            let host = args.get(1).cloned().unwrap_or_else(|| DEFAULT_HOST.to_string());
            let port = match args.get(2) {
                Some(raw) => raw.parse()?,
                None => DEFAULT_PORT,
            };
            serve(host, port)
        }
        Some("demo") => {
            let seed = match args.get(1) {
                Some(raw) => raw.parse()?,
                None => 42,
            };
            let games = match args.get(2) {
                Some(raw) => raw.parse()?,
                None => 10,
            };
            demo(seed, games)
        }
        _ => usage(),
    }
}

/// Run the live TCP bridge until interrupted.
fn serve(host: String, port: u16) -> Result<()> {
    println!("balatro-bot listening on {host}:{port}");
    let server = LiveServer::new(host, port);
    server.run()?;
    Ok(())
}

/// Self-play a batch of seeded games with the heuristic player and
/// print a summary.
fn demo(seed: u64, games: usize) -> Result<()> {
    if games == 0 {
        bail!("need at least one game");
    }

    let mut player = HeuristicPlayer::new();
    for offset in 0..games {
        let mut game = GameSimulator::with_seed(seed + offset as u64);
        let won = player.play_game(&mut game);
        println!(
            "game {:>3}: {} (reached ante {}, {} chips at the end)",
            offset + 1,
            if won { "WON " } else { "lost" },
            game.ante,
            game.current_chips,
        );
    }

    println!();
    println!(
        "{} games | {} won ({:.0}%) | {} hands played | {} discards",
        player.stats.games_played,
        player.stats.games_won,
        player.win_rate() * 100.0,
        player.stats.hands_played,
        player.stats.discards_used,
    );
    Ok(())
}
