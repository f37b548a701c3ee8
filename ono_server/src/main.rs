//! Ono game server.
//!
//! Hosts a single match: opens a lobby window for players to join, then
//! runs the game to completion and exits.

use std::{net::SocketAddr, path::PathBuf};

use anyhow::Error;
use ctrlc::set_handler;
use log::info;
use ono::{GameSettings, RoomConfig, constants::DEFAULT_STARTING_HAND_SIZE, server};
use pico_args::Arguments;

const HELP: &str = "\
Host a single match of the Ono card game

USAGE:
  ono_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT    Server socket bind address       [default: env ONO_BIND or 127.0.0.1:6969]
  --countdown  SECS       Lobby countdown before the deal  [default: env ONO_LOBBY_COUNTDOWN or 60]
  --hand-size  N          Cards dealt to each seat         [default: env ONO_STARTING_HAND_SIZE or 8]
  --game-log   PATH       Match journal file               [default: env ONO_GAME_LOG or game_log]

FLAGS:
  -h, --help              Print help information

ENVIRONMENT:
  ONO_BIND                Server bind address (e.g. 0.0.0.0:8080)
  ONO_LOBBY_COUNTDOWN     Lobby countdown in seconds
  ONO_STARTING_HAND_SIZE  Cards dealt to each seat (7 or 8)
  ONO_GAME_LOG            Match journal path
  (See .env file for all configuration options)
";

struct Args {
    bind: SocketAddr,
    config: RoomConfig,
}

fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.value_from_str("--bind").unwrap_or_else(|_| {
            std::env::var("ONO_BIND")
                .unwrap_or_else(|_| "127.0.0.1:6969".to_string())
                .parse()
                .expect("Invalid ONO_BIND address")
        }),
        config: RoomConfig {
            lobby_countdown_secs: pargs.value_from_str("--countdown").unwrap_or_else(|_| {
                std::env::var("ONO_LOBBY_COUNTDOWN")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(60)
            }),
            journal_path: Some(pargs.value_from_str("--game-log").unwrap_or_else(|_| {
                std::env::var("ONO_GAME_LOG")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("game_log"))
            })),
            settings: GameSettings {
                starting_hand_size: pargs.value_from_str("--hand-size").unwrap_or_else(|_| {
                    std::env::var("ONO_STARTING_HAND_SIZE")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(DEFAULT_STARTING_HAND_SIZE)
                }),
            },
        },
    };

    // Catching signals for exit.
    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();
    info!("Starting Ono server at {}", args.bind);

    server::run(args.bind, args.config)?;

    info!("Match complete, goodbye");
    Ok(())
}
