use super::board::Cell;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    /// Get the other side
    pub fn other(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    /// The mark this side places on the board
    pub fn to_cell(self) -> Cell {
        match self {
            Side::A => Cell::A,
            Side::B => Cell::B,
        }
    }

    /// Token shown on the board and in state keys
    pub fn name(self) -> &'static str {
        match self {
            Side::A => "X",
            Side::B => "O",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "x" => Ok(Side::A),
            "b" | "o" => Ok(Side::B),
            other => Err(format!("unknown side '{other}' (expected 'a' or 'b')")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_side() {
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
    }

    #[test]
    fn test_side_name() {
        assert_eq!(Side::A.name(), "X");
        assert_eq!(Side::B.name(), "O");
    }

    #[test]
    fn test_parse_side() {
        assert_eq!("a".parse::<Side>().unwrap(), Side::A);
        assert_eq!("O".parse::<Side>().unwrap(), Side::B);
        assert!("c".parse::<Side>().is_err());
    }
}
