// The simulation engine: decodes each access, looks it up in its set and
// applies FIFO replacement on a miss into a full set.

use std::fmt;
use std::path::Path;

use log::{debug, info, trace, warn};

use crate::cache::{Cache, CacheLine};
use crate::commons::{AccessEvent, AccessKind, Addr, Geometry};
use crate::error::Error;
use crate::trace::TraceReader;

/// running totals of a simulation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Stats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
    pub fn hit_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

/// what a single cache access did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    /// filled an invalid line
    Miss,
    /// replaced the oldest line of a full set
    MissEviction,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Outcome::Hit => "hit",
            Outcome::Miss => "miss",
            Outcome::MissEviction => "miss eviction",
        })
    }
}

/// The line to replace in a full set: the one filled first.
///
/// Ties go to the lowest index. The logical clock never hands out the same
/// stamp twice, so a tie can only come from lines that were never filled.
pub fn victim(set: &[CacheLine]) -> usize {
    set.iter()
        .enumerate()
        .min_by_key(|(_, line)| line.inserted)
        .map(|(way, _)| way)
        .unwrap_or(0)
}

#[derive(Debug)]
pub struct Simulator {
    cache: Cache,
    clock: u64,                 // bumped on every fill and refill
    stats: Stats,
}

impl Simulator {
    pub fn new(geometry: Geometry) -> Result<Self, Error> {
        Ok(Simulator::with_cache(Cache::new(geometry)?))
    }

    pub fn with_cache(cache: Cache) -> Self {
        Simulator {
            cache,
            clock: 0,
            stats: Stats::default(),
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }
    pub fn stats(&self) -> Stats {
        self.stats
    }
    /// logical time of the most recent fill
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Performs one data access.
    ///
    /// A hit leaves the line untouched, in particular its insertion stamp:
    /// replacement follows fill order, not use order.
    pub fn access(&mut self, addr: Addr) -> Outcome {
        let (index, tag) = addr.pos(self.cache.geometry());
        let set = self.cache.set_mut(index);

        if set.iter().any(|line| line.valid && line.tag == tag) {
            self.stats.hits += 1;
            return Outcome::Hit;
        }

        self.stats.misses += 1;
        self.clock += 1;
        let filled = CacheLine {
            valid: true,
            tag,
            inserted: self.clock,
        };
        match set.iter().position(|line| !line.valid) {
            Some(way) => {
                set[way] = filled;
                Outcome::Miss
            }
            None => {
                let way = victim(set);
                trace!(
                    "set {index}: evicting tag {:#x} from way {way} (filled at {})",
                    set[way].tag,
                    set[way].inserted
                );
                set[way] = filled;
                self.stats.evictions += 1;
                Outcome::MissEviction
            }
        }
    }

    /// Replays one trace record.
    ///
    /// Returns the outcome of the cache access, `None` for instruction
    /// fetches which are not simulated. A modify is a load and a store to the
    /// same address; the store always hits and is counted here.
    pub fn step(&mut self, event: &AccessEvent) -> Option<Outcome> {
        let outcome = match event.kind {
            AccessKind::Instruction => return None,
            AccessKind::Load | AccessKind::Store => self.access(event.addr),
            AccessKind::Modify => {
                let outcome = self.access(event.addr);
                self.stats.hits += 1;
                outcome
            }
        };
        if event.kind == AccessKind::Modify {
            trace!("{event} {outcome} hit");
        } else {
            trace!("{event} {outcome}");
        }
        Some(outcome)
    }

    /// Replays every event in order and returns the totals.
    pub fn run<I>(&mut self, events: I) -> Stats
    where
        I: IntoIterator<Item = AccessEvent>,
    {
        for event in events {
            self.step(&event);
        }
        self.stats
    }
}

/// Simulates `geometry` against the trace at `path`.
///
/// The cache is built before the file is opened. A malformed record ends the
/// replay early and the totals up to that point are returned.
pub fn simulate(geometry: Geometry, path: &Path) -> Result<Stats, Error> {
    let mut sim = Simulator::new(geometry)?;
    let mut reader = TraceReader::open(path)?;
    debug!("simulating {geometry}");

    let stats = sim.run(reader.by_ref());
    if reader.truncated() {
        warn!(
            "{}: replay stopped after {} records",
            path.display(),
            reader.records()
        );
    }
    info!(
        "{} records, {} accesses, hit rate {:.2}%, {} of {} lines in use",
        reader.records(),
        stats.accesses(),
        stats.hit_rate() * 100.0,
        sim.cache().occupancy(),
        sim.cache().num_sets() * geometry.lines_per_set(),
    );
    Ok(stats)
}
