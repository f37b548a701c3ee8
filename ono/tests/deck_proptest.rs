//! Property tests for card legality, the circular deck, and the move
//! text codec.

use proptest::prelude::*;

use ono::constants::DECK_SIZE;
use ono::entities::{Card, Colour, Deck, Kind, Move};

fn arb_colour() -> impl Strategy<Value = Colour> {
    prop_oneof![
        Just(Colour::Red),
        Just(Colour::Blue),
        Just(Colour::Green),
        Just(Colour::Yellow),
    ]
}

fn arb_kind() -> impl Strategy<Value = Kind> {
    prop_oneof![
        (0u8..10).prop_map(Kind::Number),
        Just(Kind::Skip),
        Just(Kind::Reverse),
        Just(Kind::DrawTwo),
    ]
}

fn arb_card() -> impl Strategy<Value = Card> {
    prop_oneof![
        (arb_colour(), arb_kind()).prop_map(|(colour, kind)| Card::new(colour, kind)),
        Just(Card::wild()),
        Just(Card::wild_draw_four()),
    ]
}

proptest! {
    #[test]
    fn wilds_are_playable_on_anything(top in arb_card()) {
        prop_assert!(Card::wild().is_playable_on(top));
        prop_assert!(Card::wild_draw_four().is_playable_on(top));
    }

    #[test]
    fn matching_colours_are_always_playable(
        colour in arb_colour(),
        kind_a in arb_kind(),
        kind_b in arb_kind(),
    ) {
        prop_assert!(Card::new(colour, kind_a).is_playable_on(Card::new(colour, kind_b)));
    }

    #[test]
    fn playability_is_reflexive(card in arb_card()) {
        prop_assert!(card.is_playable_on(card));
    }

    #[test]
    fn rejection_implies_every_rule_failed(candidate in arb_card(), top in arb_card()) {
        if !candidate.is_playable_on(top) {
            prop_assert_ne!(candidate.colour, top.colour);
            prop_assert_ne!(top.colour, Colour::Wild);
            prop_assert!(!matches!(candidate.kind, Kind::Wild | Kind::WildDrawFour));
            // Equal kinds always make a card playable, whether through
            // the digit rule or the power-kind rule.
            prop_assert_ne!(candidate.kind, top.kind);
        }
    }

    #[test]
    fn deck_draws_never_fail_past_exhaustion(extra in 1usize..500) {
        let mut deck = Deck::default();
        for _ in 0..DECK_SIZE + extra {
            deck.draw();
        }
        prop_assert_eq!(deck.cursor, (extra - 1) % DECK_SIZE + 1);
    }

    #[test]
    fn move_text_encoding_round_trips(index in 0usize..30, code in 0u8..5) {
        let mv = Move::Play { index, colour: Colour::from_code(code) };
        let text = mv.to_string();
        prop_assert_eq!(text.parse::<Move>().unwrap(), mv);
    }
}
