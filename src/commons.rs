use std::fmt;

use crate::error::Error;

// cache geometry

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {           // unit         meaning
    set_bits: u32,              // bits         s, the cache has 2^s sets
    lines_per_set: usize,       // lines        E, associativity
    block_bits: u32,            // bits         b, blocks are 2^b bytes
}

impl Geometry {
    /// Validates `s`, `E` and `b`.
    ///
    /// The arguments are signed so that whatever the user typed on the command
    /// line can be rejected here with a readable message. The tag must keep at
    /// least one bit, i.e. `s + b < 64`, and the whole cache must be
    /// addressable on this host.
    pub fn new(set_bits: i64, lines_per_set: i64, block_bits: i64) -> Result<Self, Error> {
        if set_bits < 0 {
            return Err(Error::geometry(format!("s must not be negative, got {set_bits}")));
        }
        if lines_per_set <= 0 {
            return Err(Error::geometry(format!("E must be positive, got {lines_per_set}")));
        }
        if block_bits < 0 {
            return Err(Error::geometry(format!("b must not be negative, got {block_bits}")));
        }
        if set_bits.saturating_add(block_bits) >= 64 {
            return Err(Error::geometry(format!(
                "s + b must be below 64 to leave room for a tag, got {set_bits} + {block_bits}"
            )));
        }

        let lines_per_set = usize::try_from(lines_per_set)
            .map_err(|_| Error::geometry(format!("E = {lines_per_set} does not fit in memory")))?;
        let geometry = Geometry {
            set_bits: set_bits as u32,
            lines_per_set,
            block_bits: block_bits as u32,
        };
        if geometry.total_lines().is_none() {
            return Err(Error::geometry(format!(
                "2^{set_bits} sets of {lines_per_set} lines do not fit in memory"
            )));
        }
        Ok(geometry)
    }

    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }
    pub fn lines_per_set(&self) -> usize {
        self.lines_per_set
    }
    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }
    pub fn tag_bits(&self) -> u32 {
        64 - self.set_bits - self.block_bits
    }

    /// 2^s, `None` if the host cannot index that many sets
    pub fn checked_num_sets(&self) -> Option<usize> {
        usize::try_from(1u64 << self.set_bits).ok()
    }
    pub fn num_sets(&self) -> usize {
        // checked in `new`
        self.checked_num_sets().unwrap_or(usize::MAX)
    }
    /// 2^s * E
    pub fn total_lines(&self) -> Option<usize> {
        self.checked_num_sets()?.checked_mul(self.lines_per_set)
    }
    pub fn block_size(&self) -> u64 {
        1u64 << self.block_bits
    }
    /// capacity in bytes, saturating for absurd geometries
    pub fn cache_size(&self) -> u64 {
        (1u64 << self.set_bits)
            .saturating_mul(self.lines_per_set as u64)
            .saturating_mul(self.block_size())
    }

    fn set_mask(&self) -> u64 {
        // s <= 63 here, the shift never reaches the word width
        (1u64 << self.set_bits) - 1
    }
    fn block_mask(&self) -> u64 {
        (1u64 << self.block_bits) - 1
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} E={} b={} ({} sets, {}-byte blocks, {} tag bits)",
            self.set_bits,
            self.lines_per_set,
            self.block_bits,
            self.num_sets(),
            self.block_size(),
            self.tag_bits(),
        )
    }
}

// addresses

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Addr(pub u64);

impl Addr {
    /// get set index and tag of this address under the given geometry
    ///
    /// layout, high to low: `tag | set index (s bits) | block offset (b bits)`
    pub fn pos(&self, geometry: &Geometry) -> (usize, u64) {
        let low_bits = geometry.set_bits + geometry.block_bits;
        let tag = self.0 >> low_bits;
        let index = (self.0 >> geometry.block_bits) & geometry.set_mask();
        // index < 2^s, which `Geometry::new` checked against usize
        (index as usize, tag)
    }

    /// the byte within the block, never used by the simulation
    pub fn offset(&self, geometry: &Geometry) -> u64 {
        self.0 & geometry.block_mask()
    }
}

impl fmt::LowerHex for Addr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

// trace records

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Instruction,
    Load,
    Store,
    /// a load immediately followed by a store to the same address
    Modify,
}

impl AccessKind {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'I' => Some(AccessKind::Instruction),
            'L' => Some(AccessKind::Load),
            'S' => Some(AccessKind::Store),
            'M' => Some(AccessKind::Modify),
            _ => None,
        }
    }
    pub fn code(&self) -> char {
        match self {
            AccessKind::Instruction => 'I',
            AccessKind::Load => 'L',
            AccessKind::Store => 'S',
            AccessKind::Modify => 'M',
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccessEvent {
    pub kind: AccessKind,
    pub addr: Addr,
    pub size: u32,              // bytes, carried along but unused
}

impl AccessEvent {
    pub fn new(kind: AccessKind, addr: u64, size: u32) -> Self {
        AccessEvent { kind, addr: Addr(addr), size }
    }
}

impl fmt::Display for AccessEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind.code(), self.addr, self.size)
    }
}
