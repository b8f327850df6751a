//! Physical address model for the MV family.
//!
//! A physical address is 31 bits wide: the top 3 bits select one of 8
//! segments ("rings") of 256 MB each, the low 28 bits are the word offset
//! inside that segment. All ring/offset bit manipulation in the crate lives
//! behind [`Address`] so the program counter and the active segment cannot
//! drift apart.

/// Number of addressable segments (rings).
pub const SEGMENT_COUNT: usize = 8;

/// Bit position of the ring field inside a physical address.
pub const RING_SHIFT: u32 = 28;

/// Mask selecting the 3 ring bits of a physical address.
pub const RING_MASK: u32 = 0x7000_0000;

/// Mask selecting the 28-bit in-segment word offset.
pub const OFFSET_MASK: u32 = 0x0FFF_FFFF;

/// Mask selecting all significant bits of a physical address.
pub const PHYS_MASK: u32 = 0x7FFF_FFFF;

/// Physical-address confinement applied while address translation is off:
/// the machine can only reach the first 16 M words (32 MB).
pub const NO_ATU_MASK: u32 = 0x00FF_FFFF;

/// Top bit of a 16-bit cell: a further level of indirection when chasing
/// narrow pointer chains.
pub const WORD_IND_BIT: u16 = 0x8000;

/// Top bit of a 32-bit cell: a further level of indirection when chasing
/// wide pointer chains.
pub const DWORD_IND_BIT: u32 = 0x8000_0000;

/// A 31-bit physical word address split into ring and in-segment offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct Address {
    ring: u8,
    offset: u32,
}

impl Address {
    /// Builds an address from a ring number and a word offset.
    ///
    /// The ring is kept to 3 bits and the offset to 28 bits.
    #[must_use]
    pub const fn new(ring: u8, offset: u32) -> Self {
        Self {
            ring: ring & 0x7,
            offset: offset & OFFSET_MASK,
        }
    }

    /// Splits a raw 31-bit physical address into ring and offset.
    #[must_use]
    pub const fn from_phys(phys: u32) -> Self {
        Self {
            ring: ((phys & RING_MASK) >> RING_SHIFT) as u8,
            offset: phys & OFFSET_MASK,
        }
    }

    /// Recombines ring and offset into the raw 31-bit physical address.
    #[must_use]
    pub const fn phys(self) -> u32 {
        ((self.ring as u32) << RING_SHIFT) | self.offset
    }

    /// The 3-bit ring (segment) number.
    #[must_use]
    pub const fn ring(self) -> u8 {
        self.ring
    }

    /// The 28-bit word offset inside the segment.
    #[must_use]
    pub const fn offset(self) -> u32 {
        self.offset
    }

    /// The raw ring bits, positioned for OR-ing onto an offset.
    #[must_use]
    pub const fn ring_bits(self) -> u32 {
        (self.ring as u32) << RING_SHIFT
    }

    /// Returns the address of a fixed page-zero cell in this address's ring.
    #[must_use]
    pub const fn page_zero(self, cell: u32) -> u32 {
        self.ring_bits() | (cell & OFFSET_MASK)
    }

    /// Returns a copy advanced by `words`, wrapping inside the segment.
    #[must_use]
    pub const fn advance(self, words: u32) -> Self {
        Self {
            ring: self.ring,
            offset: (self.offset.wrapping_add(words)) & OFFSET_MASK,
        }
    }

    /// Replaces the offset, keeping the ring.
    #[must_use]
    pub const fn with_offset(self, offset: u32) -> Self {
        Self {
            ring: self.ring,
            offset: offset & OFFSET_MASK,
        }
    }

    /// Forces a physical address into this address's ring, dropping whatever
    /// ring bits the value carried. Used after indirection chains so that a
    /// ring-relative computation never escapes the current segment.
    #[must_use]
    pub const fn rejoin(self, phys: u32) -> u32 {
        self.ring_bits() | (phys & OFFSET_MASK)
    }
}

/// Converts a word address and byte selector into a byte pointer.
///
/// Byte pointers address the two bytes of each word left-to-right: an even
/// byte pointer names the high (left) byte.
#[must_use]
pub const fn byte_pointer(word_addr: u32, right_byte: bool) -> u32 {
    (word_addr << 1) | right_byte as u32
}

/// Splits a byte pointer into its word address and byte selector.
#[must_use]
pub const fn split_byte_pointer(bp: u32) -> (u32, bool) {
    (bp >> 1, (bp & 1) != 0)
}
