//! The effect lattice and declaration flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

/// The three-valued effect of an expression or function.
///
/// The lattice is strictly ordered: `Pure < Impure < ImpureCoroutine`.
/// Every effect comparison in the parser is a `<=` on this order; the
/// declared effect of a function must be at least the effect of every
/// value it computes.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Effect {
    #[default]
    Pure,
    /// Marked `!` in source.
    Impure,
    /// Marked `?` in source: impure, and may suspend.
    ImpureCoroutine,
}

impl Effect {
    pub fn is_pure(self) -> bool {
        self == Effect::Pure
    }

    /// True for `!` and `?` alike.
    pub fn is_impure(self) -> bool {
        self >= Effect::Impure
    }

    pub fn is_coroutine(self) -> bool {
        self == Effect::ImpureCoroutine
    }

    pub fn weaker_than(self, other: Effect) -> bool {
        self < other
    }

    pub fn as_flags(self) -> Flags {
        match self {
            Effect::Pure => Flags::default(),
            Effect::Impure => Flags::IMPURE,
            Effect::ImpureCoroutine => Flags::IMPURE | Flags::SUSPENDIBLE,
        }
    }

    pub fn from_flags(flags: Flags) -> Effect {
        if flags.contains(Flags::SUSPENDIBLE) {
            Effect::ImpureCoroutine
        } else if flags.contains(Flags::IMPURE) {
            Effect::Impure
        } else {
            Effect::Pure
        }
    }
}

impl fmt::Display for Effect {
    /// Renders the source sigil: nothing, `!` or `?`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Pure => Ok(()),
            Effect::Impure => f.write_str("!"),
            Effect::ImpureCoroutine => f.write_str("?"),
        }
    }
}

/// Bit-packed declaration and expression flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flags(u32);

impl Flags {
    pub const PUBLIC: Flags = Flags(1 << 0);
    pub const PRIVATE_DATA: Flags = Flags(1 << 1);
    pub const CLASSY: Flags = Flags(1 << 2);
    pub const CHOOSY: Flags = Flags(1 << 3);
    pub const HAS_CHOOSE_CPU_ARCH: Flags = Flags(1 << 4);
    pub const IMPURE: Flags = Flags(1 << 5);
    pub const SUSPENDIBLE: Flags = Flags(1 << 6);

    pub fn contains(self, other: Flags) -> bool {
        (self.0 & other.0) == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}
