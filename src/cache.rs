// The cache model: geometry plus line state, nothing else.
//
// Lines are kept in one flat buffer, set `i` being the `E` lines starting at
// `i * E`. The shape is fixed when the cache is built; the simulator mutates
// lines through the accessors below and there is no way to add, drop or
// invalidate a line afterwards.

use log::debug;

use crate::commons::Geometry;
use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,               // meaningful only if valid
    pub inserted: u64,          // logical time of the last fill
}

#[derive(Debug)]
pub struct Cache {
    geometry: Geometry,
    lines: Vec<CacheLine>,
}

impl Cache {
    /// Allocates `2^s` sets of `E` invalid lines.
    ///
    /// Fails with [`Error::InvalidGeometry`] if the buffer cannot be
    /// allocated, rather than aborting on out-of-memory.
    pub fn new(geometry: Geometry) -> Result<Self, Error> {
        let total = geometry
            .total_lines()
            .ok_or_else(|| Error::geometry(format!("{geometry} does not fit in memory")))?;
        let mut lines = Vec::new();
        lines.try_reserve_exact(total).map_err(|e| {
            Error::geometry(format!("cannot allocate {total} cache lines: {e}"))
        })?;
        lines.resize(total, CacheLine::default());
        debug!("allocated cache {geometry}: {total} lines");
        Ok(Cache { geometry, lines })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }
    pub fn num_sets(&self) -> usize {
        self.lines.len() / self.geometry.lines_per_set()
    }

    pub fn set(&self, index: usize) -> &[CacheLine] {
        &self.lines[self.span(index)]
    }
    pub fn set_mut(&mut self, index: usize) -> &mut [CacheLine] {
        let span = self.span(index);
        &mut self.lines[span]
    }
    pub fn line(&self, index: usize, way: usize) -> &CacheLine {
        &self.set(index)[way]
    }
    pub fn line_mut(&mut self, index: usize, way: usize) -> &mut CacheLine {
        &mut self.set_mut(index)[way]
    }

    /// number of lines holding data, over the whole cache
    pub fn occupancy(&self) -> usize {
        self.lines.iter().filter(|l| l.valid).count()
    }

    fn span(&self, index: usize) -> std::ops::Range<usize> {
        assert!(index < self.num_sets(), "set index {index} out of range");
        let e = self.geometry.lines_per_set();
        index * e..index * e + e
    }
}
