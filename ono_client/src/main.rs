//! Line-oriented terminal client for the Ono card game.
//!
//! Joins a server's lobby, then relays turn notices and state updates
//! to the terminal while reading moves from stdin.

use std::{
    io::{self, BufRead},
    net::{SocketAddr, TcpStream},
    process::exit,
    thread,
};

use anyhow::Error;
use crossterm::style::Stylize;
use ono::{
    Client,
    entities::{Card, Colour, GameView, Move, Username},
    messages::ServerMessage,
    utils,
};
use pico_args::Arguments;

const HELP: &str = "\
Connect to an Ono game server

USAGE:
  ono_client [OPTIONS]

OPTIONS:
  --username  NAME       Player name                   [default: login username]
  --connect   IP:PORT    Server address to connect to  [default: 127.0.0.1:6969]

FLAGS:
  -h, --help             Print help information

Once the match starts, type moves at the prompt:
  DRAW              draw a card (this ends your turn)
  MOVE <i> <c>      play hand card i (1-based); colour c is only used
                    for wilds: 0 = none, 1 = red, 2 = blue, 3 = green,
                    4 = yellow
  quit              leave the game
";

fn paint(card: Card) -> String {
    let text = card.to_string();
    let styled = match card.colour {
        Colour::Red => text.red(),
        Colour::Blue => text.blue(),
        Colour::Green => text.green(),
        Colour::Yellow => text.yellow(),
        Colour::Wild => text.magenta(),
    };
    styled.to_string()
}

fn render_view(view: &GameView) {
    println!();
    println!("top card: {}", paint(view.top_card));
    println!("turn: {} (play is {})", view.current_player, view.direction);
    for seat in &view.seats {
        let status = if seat.is_active { "" } else { " (left)" };
        println!("  {}: {} cards{status}", seat.name, seat.cards_remaining);
    }
    print!("your hand:");
    for (position, card) in view.hand.iter().enumerate() {
        print!(" [{}] {}", position + 1, paint(*card));
    }
    println!();
}

/// Render everything the server pushes at us until the match ends or
/// the connection drops.
fn listen(mut stream: TcpStream) {
    loop {
        match utils::read_prefixed::<ServerMessage, _>(&mut stream) {
            Ok(ServerMessage::GameView(view)) => render_view(&view),
            Ok(ServerMessage::TurnSignal(top)) => {
                println!("your turn! top card is {}", paint(top));
            }
            Ok(ServerMessage::Event(event)) => println!("== {event}"),
            Ok(ServerMessage::UserError(error)) => println!("rejected: {error}"),
            Ok(ServerMessage::GameOver(winner)) => {
                println!("game over: {winner} wins!");
                exit(0);
            }
            Ok(ServerMessage::Ack(_)) => {}
            Ok(ServerMessage::ClientError(error)) => {
                println!("server refused us: {error}");
                exit(1);
            }
            // The read timeout just means the lobby is still counting
            // down or it's another seat's turn.
            Err(error)
                if matches!(
                    error.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
                ) => {}
            Err(_) => {
                println!("lost connection to the server");
                exit(1);
            }
        }
    }
}

fn main() -> Result<(), Error> {
    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        exit(0);
    }

    let username: String = pargs
        .value_from_str("--username")
        .unwrap_or_else(|_| whoami::username());
    let addr: SocketAddr = pargs.value_from_str("--connect").unwrap_or_else(|_| {
        "127.0.0.1:6969"
            .parse()
            .expect("default address is well-formed")
    });

    let mut client = Client::connect(Username::new(&username), &addr)?;
    println!("joined the lobby as {}", client.username);
    println!("waiting for the match to start...");

    let notices = client.stream.try_clone()?;
    thread::spawn(move || listen(notices));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            let _ = client.disconnect();
            break;
        }
        match trimmed.to_uppercase().parse::<Move>() {
            Ok(mv) => client.take_turn(mv)?,
            Err(error) => println!("{error} (type DRAW or MOVE <index> <colour>)"),
        }
    }
    Ok(())
}
