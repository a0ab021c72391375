//! Scalar logic levels for circuit nodes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Not;

/// A single logic level on a circuit node.
///
/// The simulator computes with the two driven states `Zero` and `One`.
/// The remaining variants are reserved tokens: `X` (unknown), `U`
/// (uninitialized), and `Z` (high-impedance) can appear while decoding
/// stimulus input, but are never committed to a node.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Logic {
    /// Logic low (driven 0).
    Zero = 0,
    /// Logic high (driven 1).
    One = 1,
    /// Unknown (reserved).
    X = 2,
    /// Uninitialized (reserved).
    U = 3,
    /// High-impedance (reserved).
    Z = 4,
}

impl Logic {
    /// Converts a boolean into a driven logic level.
    pub fn from_bool(b: bool) -> Self {
        if b {
            Logic::One
        } else {
            Logic::Zero
        }
    }

    /// Decodes a stimulus or netlist character into a logic level.
    ///
    /// Accepts `0`, `1`, `x`/`X`, `u`/`U`, and `z`/`Z`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Logic::Zero),
            '1' => Some(Logic::One),
            'x' | 'X' => Some(Logic::X),
            'u' | 'U' => Some(Logic::U),
            'z' | 'Z' => Some(Logic::Z),
            _ => None,
        }
    }

    /// Returns `true` for `One`, `false` for every other level.
    pub fn is_one(self) -> bool {
        matches!(self, Logic::One)
    }

    /// Returns `true` for the driven states `Zero` and `One`.
    pub fn is_driven(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }
}

impl Default for Logic {
    fn default() -> Self {
        Logic::Zero
    }
}

/// Negation over driven values; the reserved states map to `X`.
impl Not for Logic {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Logic::Zero => Logic::One,
            Logic::One => Logic::Zero,
            _ => Logic::X,
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::U => write!(f, "U"),
            Logic::Z => write!(f, "Z"),
        }
    }
}
