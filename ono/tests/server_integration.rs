//! End-to-end tests over TCP: blocking clients against a real server,
//! from lobby registration through a finished match.

use std::{
    net::{SocketAddr, TcpListener},
    thread,
    time::Duration,
};

use ono::{
    Client, GameSettings, RoomConfig, UserError,
    entities::{Card, Colour, Move, Username},
    messages::ServerMessage,
    server,
};

fn get_random_open_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn test_config() -> RoomConfig {
    RoomConfig {
        lobby_countdown_secs: 1,
        journal_path: None,
        settings: GameSettings {
            starting_hand_size: 7,
        },
    }
}

fn start_server() -> SocketAddr {
    let port = get_random_open_port();
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    thread::spawn(move || server::run(addr, test_config()));
    thread::sleep(Duration::from_millis(50));
    addr
}

/// Play honestly until the match ends: track the hand from game views,
/// answer each turn signal with the first legal card (or a draw), and
/// return the announced winner.
fn play_to_completion(mut client: Client) -> Username {
    let mut hand: Vec<Card> = Vec::new();
    for _ in 0..20_000 {
        match client.recv() {
            Ok(ServerMessage::GameView(view)) => hand = view.hand,
            Ok(ServerMessage::TurnSignal(top)) => {
                let mv = match hand.iter().position(|card| card.is_playable_on(top)) {
                    Some(index) => Move::Play {
                        index,
                        colour: Some(Colour::Red),
                    },
                    None => Move::Draw,
                };
                client.take_turn(mv).unwrap();
            }
            Ok(ServerMessage::GameOver(winner)) => return winner,
            Ok(_) => {}
            Err(error) => panic!("connection failed mid-match: {error}"),
        }
    }
    panic!("match did not finish within the expected number of messages");
}

#[test]
fn two_players_play_a_full_match() {
    let addr = start_server();

    let alice = Client::connect(Username::new("alice"), &addr).unwrap();
    let bob = Client::connect(Username::new("bob"), &addr).unwrap();

    let alice_result = thread::spawn(move || play_to_completion(alice));
    let bob_result = thread::spawn(move || play_to_completion(bob));
    let alice_winner = alice_result.join().unwrap();
    let bob_winner = bob_result.join().unwrap();

    assert_eq!(alice_winner, bob_winner);
    assert!(alice_winner == Username::new("alice") || alice_winner == Username::new("bob"));
}

#[test]
fn match_starts_with_the_configured_hand_size() {
    let addr = start_server();

    let mut alice = Client::connect(Username::new("alice"), &addr).unwrap();
    let _bob = Client::connect(Username::new("bob"), &addr).unwrap();

    let view = Client::recv_view(&mut alice.stream).unwrap();
    assert_eq!(view.hand.len(), 7);
    assert_eq!(view.seats.len(), 2);
    assert!(view.top_card.is_number());
    assert_eq!(view.current_player, Username::new("alice"));
}

#[test]
fn lobby_rejects_duplicate_usernames() {
    let addr = start_server();

    let _alice = Client::connect(Username::new("alice"), &addr).unwrap();
    let rejected = Client::connect(Username::new("alice"), &addr);
    assert!(rejected.is_err());
}

#[test]
fn lobby_aborts_below_minimum_players() {
    let port = get_random_open_port();
    let addr: SocketAddr = format!("127.0.0.1:{port}").parse().unwrap();
    let running = thread::spawn(move || server::run(addr, test_config()));
    thread::sleep(Duration::from_millis(50));

    let mut alice = Client::connect(Username::new("alice"), &addr).unwrap();

    // One player isn't enough; the server reports the precondition
    // failure and never starts the match.
    let result = running.join().unwrap();
    assert!(result.is_err());
    assert!(alice.recv().is_err());
}

#[test]
fn out_of_turn_move_gets_an_explicit_rejection() {
    let addr = start_server();

    let _alice = Client::connect(Username::new("alice"), &addr).unwrap();
    let mut bob = Client::connect(Username::new("bob"), &addr).unwrap();

    // The first seat acts first; bob jumps the queue anyway.
    Client::recv_view(&mut bob.stream).unwrap();
    bob.take_turn(Move::Draw).unwrap();
    let error = Client::recv_user_error(&mut bob.stream).unwrap();
    assert_eq!(error, UserError::OutOfTurn);
}

#[test]
fn disconnect_hands_victory_to_the_last_seat() {
    let addr = start_server();

    let mut alice = Client::connect(Username::new("alice"), &addr).unwrap();
    let mut bob = Client::connect(Username::new("bob"), &addr).unwrap();

    Client::recv_view(&mut bob.stream).unwrap();
    alice.disconnect().unwrap();
    drop(alice);

    let winner = loop {
        match bob.recv().unwrap() {
            ServerMessage::GameOver(winner) => break winner,
            _ => continue,
        }
    };
    assert_eq!(winner, Username::new("bob"));
}
