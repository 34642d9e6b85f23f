use std::fmt;

/// Minecraft chat colours and their `§` formatting codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Colour {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl Colour {
    /// Formatting code character that follows `§`.
    pub const fn code(self) -> char {
        match self {
            Self::Black => '0',
            Self::DarkBlue => '1',
            Self::DarkGreen => '2',
            Self::DarkAqua => '3',
            Self::DarkRed => '4',
            Self::DarkPurple => '5',
            Self::Gold => '6',
            Self::Gray => '7',
            Self::DarkGray => '8',
            Self::Blue => '9',
            Self::Green => 'a',
            Self::Aqua => 'b',
            Self::Red => 'c',
            Self::LightPurple => 'd',
            Self::Yellow => 'e',
            Self::White => 'f',
        }
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\u{a7}{}", self.code())
    }
}

/// Colours used for successive clusters of re-echoed results.
pub const COLOUR_CYCLE: [Colour; 7] = [
    Colour::Red,
    Colour::Gold,
    Colour::Yellow,
    Colour::Green,
    Colour::Aqua,
    Colour::DarkPurple,
    Colour::LightPurple,
];

/// Results further apart than this (in blocks) start a new colour.
pub const COLOUR_PROXIMITY_LIMIT: i64 = 4;

/// Picks a colour per result so that neighbouring results (one ore deposit,
/// say) share a colour and the colour changes when a new cluster starts.
#[derive(Debug, Clone)]
pub struct ColourCycle {
    index: usize,
    last: (i32, i32, i32),
}

impl ColourCycle {
    pub fn new() -> Self {
        // The first result is nearly always far from the origin, so start on
        // the last colour and let it roll over to the first.
        Self {
            index: COLOUR_CYCLE.len() - 1,
            last: (0, 0, 0),
        }
    }

    pub fn next_colour(&mut self, x: i32, y: i32, z: i32) -> Colour {
        let dx = i64::from(x) - i64::from(self.last.0);
        let dy = i64::from(y) - i64::from(self.last.1);
        let dz = i64::from(z) - i64::from(self.last.2);
        let distance_sq = dx * dx + dy * dy + dz * dz;
        if distance_sq > COLOUR_PROXIMITY_LIMIT * COLOUR_PROXIMITY_LIMIT {
            self.index = (self.index + 1) % COLOUR_CYCLE.len();
        }
        self.last = (x, y, z);
        COLOUR_CYCLE[self.index]
    }
}

impl Default for ColourCycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_distant_result_is_red() {
        let mut cycle = ColourCycle::new();
        assert_eq!(cycle.next_colour(100, 12, -300), Colour::Red);
    }

    #[test]
    fn nearby_results_share_a_colour() {
        let mut cycle = ColourCycle::new();
        let first = cycle.next_colour(100, 12, 100);
        assert_eq!(cycle.next_colour(101, 12, 100), first);
        // Exactly at the limit (4 blocks) does not advance.
        assert_eq!(cycle.next_colour(105, 12, 100), first);
        assert_eq!(cycle.next_colour(110, 12, 100), Colour::Gold);
    }

    #[test]
    fn palette_wraps() {
        let mut cycle = ColourCycle::new();
        let colours: Vec<Colour> = (0..8).map(|i| cycle.next_colour(i * 100, 0, 0)).collect();
        // First call at the origin does not advance from the starting colour.
        assert_eq!(colours[0], Colour::LightPurple);
        assert_eq!(colours[1], Colour::Red);
        assert_eq!(colours[7], Colour::LightPurple);
    }

    #[test]
    fn display_emits_formatting_code() {
        assert_eq!(Colour::Red.to_string(), "\u{a7}c");
    }
}
