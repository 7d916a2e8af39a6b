use quickcheck::Arbitrary;

use crate::{Cell, Color, PlayerId, PALETTE};

impl Arbitrary for Color {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        *g.choose(&PALETTE).unwrap()
    }
}

impl Arbitrary for Cell {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        // Mostly unclaimed cells, like in the early game
        let player_id: PlayerId = *g.choose(&[0, 0, 0, 1, 2]).unwrap();
        let color = if bool::arbitrary(g) || player_id == 0 {
            Some(Color::arbitrary(g))
        } else {
            None
        };
        Cell { player_id, color }
    }
}
