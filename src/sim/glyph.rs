//! Seven-segment glyph table
//!
//! Segment naming follows the usual display convention:
//!
//! ```text
//!  AAA
//! F   B
//!  GGG
//! E   C
//!  DDD
//! ```

use serde::{Deserialize, Serialize};

/// One of the seven bars of a glyph
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Segment {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
}

impl Segment {
    pub const ALL: [Segment; 7] = [
        Segment::A,
        Segment::B,
        Segment::C,
        Segment::D,
        Segment::E,
        Segment::F,
        Segment::G,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    /// Horizontal bars are one-way "step up" platforms, vertical bars are solid
    pub const fn default_one_way(self) -> bool {
        matches!(self, Segment::A | Segment::D | Segment::G)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "A" | "a" => Some(Segment::A),
            "B" | "b" => Some(Segment::B),
            "C" | "c" => Some(Segment::C),
            "D" | "d" => Some(Segment::D),
            "E" | "e" => Some(Segment::E),
            "F" | "f" => Some(Segment::F),
            "G" | "g" => Some(Segment::G),
            _ => None,
        }
    }
}

/// Lit state of all seven segments, bit `n` = `Segment` with index `n`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SegmentMask(pub u8);

impl SegmentMask {
    pub const EMPTY: SegmentMask = SegmentMask(0);

    /// Build a mask from segment letters, e.g. `"BC"` for a one
    pub const fn from_letters(letters: &str) -> Self {
        let bytes = letters.as_bytes();
        let mut mask = 0u8;
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            if b >= b'A' && b <= b'G' {
                mask |= 1 << (b - b'A');
            }
            i += 1;
        }
        SegmentMask(mask)
    }

    #[inline]
    pub const fn is_lit(self, segment: Segment) -> bool {
        self.0 & segment.bit() != 0
    }

    /// Number of lit segments
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }
}

const GLYPHS: &[(&str, SegmentMask)] = &[
    ("0", SegmentMask::from_letters("ABCDEF")),
    ("1", SegmentMask::from_letters("BC")),
    ("2", SegmentMask::from_letters("ABDEG")),
    ("3", SegmentMask::from_letters("ABCDG")),
    ("4", SegmentMask::from_letters("BCFG")),
    ("5", SegmentMask::from_letters("ACDFG")),
    ("6", SegmentMask::from_letters("ACDEFG")),
    ("7", SegmentMask::from_letters("ABC")),
    ("8", SegmentMask::from_letters("ABCDEFG")),
    ("9", SegmentMask::from_letters("ABCDFG")),
    ("A", SegmentMask::from_letters("ABCEFG")),
    ("B", SegmentMask::from_letters("CDEFG")),
    ("C", SegmentMask::from_letters("ADEF")),
    ("D", SegmentMask::from_letters("BCDEG")),
    ("E", SegmentMask::from_letters("ADEFG")),
    ("H", SegmentMask::from_letters("BCEFG")),
    ("I", SegmentMask::from_letters("EF")),
    ("J", SegmentMask::from_letters("BCDE")),
    ("L", SegmentMask::from_letters("DEF")),
    ("P", SegmentMask::from_letters("ABEFG")),
    ("N", SegmentMask::from_letters("CEG")),
    ("S", SegmentMask::from_letters("ACDFG")),
    ("U", SegmentMask::from_letters("BCDEF")),
    ("Y", SegmentMask::from_letters("BCDFG")),
    ("Z", SegmentMask::from_letters("ABDEG")),
    ("_", SegmentMask::from_letters("D")),
    ("¯", SegmentMask::from_letters("A")),
    ("T", SegmentMask::from_letters("A")),
    ("-", SegmentMask::from_letters("G")),
    ("M1", SegmentMask::from_letters("ABCEF")),
    ("N1", SegmentMask::from_letters("BCEF")),
    ("G", SegmentMask::from_letters("ACDEF")),
    ("W", SegmentMask::from_letters("BCDEF")),
    ("G1", SegmentMask::from_letters("ACDEF")),
    ("K1", SegmentMask::from_letters("CEFG")),
    ("R", SegmentMask::from_letters("EG")),
    ("O", SegmentMask::from_letters("CDEG")),
];

/// Look up the lit segments for a glyph name.
///
/// Case-insensitive and total: unknown glyphs are all-unlit.
pub fn segments_for(glyph: &str) -> SegmentMask {
    GLYPHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(glyph))
        .map(|(_, mask)| *mask)
        .unwrap_or(SegmentMask::EMPTY)
}

/// Same as [`segments_for`], with `None` meaning "blank"
pub fn segments_for_opt(glyph: Option<&str>) -> SegmentMask {
    glyph.map(segments_for).unwrap_or(SegmentMask::EMPTY)
}
