//! The legal-successor relation of the trailer's opcode grammar
//!
//! The "expected next opcode" mechanism is a grammar, encoded here as data:
//! a bitset over opcodes plus a table from each handled opcode to its legal
//! follow set. `End` closes the current nesting level and is legal anywhere.

use std::fmt;

use super::opcode::Opcode;

/// A set of opcodes, packed as a bitmask over the defined opcode range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpectedSet(u32);

impl ExpectedSet {
    /// The unconstrained set: any opcode is legal next
    pub const NONE: Self = Self(0);

    /// Build a set from a list of opcodes
    pub const fn of(opcodes: &[Opcode]) -> Self {
        let mut bits = 0u32;
        let mut i = 0;
        while i < opcodes.len() {
            bits |= 1 << (opcodes[i] as u32);
            i += 1;
        }
        Self(bits)
    }

    /// Whether this set places no constraint on the next opcode
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Whether `opcode` is a legal next opcode under this set
    pub const fn contains(self, opcode: Opcode) -> bool {
        self.0 & (1 << (opcode as u32)) != 0
    }
}

impl fmt::Display for ExpectedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for byte in 0x00..=0x19u8 {
            if let Some(opcode) = Opcode::from_byte(byte)
                && self.contains(opcode)
            {
                if !first {
                    f.write_str(", ")?;
                }
                f.write_str(opcode.name())?;
                first = false;
            }
        }
        if first {
            f.write_str("any")?;
        }
        Ok(())
    }
}

/// The follow set each handled opcode leaves behind.
///
/// Opcodes without a handler never reach this table; the walker rejects them
/// first. `End` and `Dummy` leave the walk unconstrained.
pub const fn successors(opcode: Opcode) -> ExpectedSet {
    use Opcode::{
        Attributes, Digest, Dummy, EmptyStream, EncoderUnpackSize, End, FileName, Folder,
        MTime, MainStreamsInfo, PackInfo, Size,
    };
    match opcode {
        Opcode::Header => ExpectedSet::of(&[MainStreamsInfo]),
        Opcode::EncodedHeader | Opcode::MainStreamsInfo => ExpectedSet::of(&[PackInfo]),
        Opcode::FilesInfo => ExpectedSet::of(&[FileName, EmptyStream, Dummy]),
        Opcode::PackInfo => ExpectedSet::of(&[Size]),
        Opcode::UnpackInfo => ExpectedSet::of(&[Folder]),
        Opcode::Size | Opcode::Digest | Opcode::EncoderUnpackSize => ExpectedSet::of(&[End]),
        Opcode::Folder => ExpectedSet::of(&[EncoderUnpackSize, Digest, End]),
        Opcode::FileName => ExpectedSet::of(&[End, MTime, Dummy]),
        Opcode::CTime | Opcode::ATime | Opcode::MTime => {
            ExpectedSet::of(&[Attributes, End, Dummy])
        }
        Opcode::Attributes => ExpectedSet::of(&[End, Dummy]),
        _ => ExpectedSet::NONE,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn membership_matches_construction() {
        let set = ExpectedSet::of(&[Opcode::EncoderUnpackSize, Opcode::Digest, Opcode::End]);
        assert!(set.contains(Opcode::Digest));
        assert!(set.contains(Opcode::End));
        assert!(!set.contains(Opcode::Folder));
        assert!(!set.is_empty());
        assert!(ExpectedSet::NONE.is_empty());
    }

    #[test]
    fn folder_follow_set_matches_the_grammar() {
        let set = successors(Opcode::Folder);
        for byte in 0x00..=0x19u8 {
            let opcode = Opcode::from_byte(byte).expect("defined opcode");
            let legal = matches!(
                opcode,
                Opcode::EncoderUnpackSize | Opcode::Digest | Opcode::End
            );
            assert_eq!(set.contains(opcode), legal, "opcode {opcode}");
        }
    }

    #[test]
    fn terminators_leave_the_walk_unconstrained() {
        assert!(successors(Opcode::End).is_empty());
        assert!(successors(Opcode::Dummy).is_empty());
    }

    #[test]
    fn both_trailer_kinds_lead_to_pack_info() {
        assert!(successors(Opcode::EncodedHeader).contains(Opcode::PackInfo));
        assert!(successors(Opcode::MainStreamsInfo).contains(Opcode::PackInfo));
        assert!(successors(Opcode::Header).contains(Opcode::MainStreamsInfo));
    }

    #[test]
    fn display_names_the_members() {
        let set = ExpectedSet::of(&[Opcode::Size]);
        assert_eq!(set.to_string(), "Size");
        assert_eq!(ExpectedSet::NONE.to_string(), "any");
    }
}
