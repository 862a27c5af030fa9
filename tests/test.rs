use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use cachesim_trace::{simulate, AccessEvent, AccessKind, Error, Geometry, Simulator, Stats};
use proptest::prelude::*;

fn trace_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("traces")
        .join(name)
}

fn replay(name: &str, s: i64, e: i64, b: i64) -> Stats {
    simulate(Geometry::new(s, e, b).unwrap(), &trace_path(name)).unwrap()
}

fn stats(hits: u64, misses: u64, evictions: u64) -> Stats {
    Stats { hits, misses, evictions }
}

#[test]
fn test_yi_trace() {
    assert_eq!(replay("yi.trace", 4, 1, 4), stats(4, 5, 3));
    assert_eq!(replay("yi.trace", 4, 2, 4), stats(4, 5, 2));
    assert_eq!(replay("yi.trace", 1, 1, 1), stats(2, 7, 5));
    assert_eq!(replay("yi.trace", 0, 1, 0), stats(2, 7, 6));
    assert_eq!(replay("yi.trace", 0, 4, 0), stats(2, 7, 3));
}

#[test]
fn test_fifo_trace() {
    // a fully associative pair of 64-byte lines: the hit on 0 does not save it
    assert_eq!(replay("fifo.trace", 0, 2, 6), stats(2, 7, 5));
    assert_eq!(replay("fifo.trace", 1, 2, 6), stats(4, 5, 1));
    assert_eq!(replay("fifo.trace", 4, 2, 4), stats(4, 5, 0));
    assert_eq!(replay("fifo.trace", 0, 1, 0), stats(1, 8, 7));
}

#[test]
fn test_truncated_trace_keeps_partial_counts() {
    assert_eq!(replay("truncated.trace", 0, 1, 0), stats(1, 1, 0));
    assert_eq!(replay("truncated.trace", 4, 2, 4), stats(1, 1, 0));
}

#[test]
fn test_missing_trace() {
    let geometry = Geometry::new(0, 1, 0).unwrap();
    match simulate(geometry, &trace_path("no_such.trace")) {
        Err(Error::OpenTrace(path, _)) => assert!(path.ends_with("no_such.trace")),
        other => panic!("expected an open error, got {other:?}"),
    }
}

#[test]
fn test_invalid_geometry() {
    for (s, e, b) in [(-1, 1, 0), (0, 0, 0), (0, 1, -2), (40, 1, 24)] {
        match Geometry::new(s, e, b) {
            Err(Error::InvalidGeometry(_)) => (),
            other => panic!("({s}, {e}, {b}) accepted: {other:?}"),
        }
    }
}

// a second FIFO, one queue of tags per set, to check the simulator against

fn reference(events: &[AccessEvent], s: u32, e: usize, b: u32) -> Stats {
    let mut sets: HashMap<u64, VecDeque<u64>> = HashMap::new();
    let mut st = Stats::default();
    for event in events {
        if event.kind == AccessKind::Instruction {
            continue;
        }
        let addr = event.addr.0;
        let tag = addr >> (s + b);
        let index = (addr >> b) & ((1u64 << s) - 1);
        let queue = sets.entry(index).or_default();
        if queue.contains(&tag) {
            st.hits += 1;
        } else {
            st.misses += 1;
            if queue.len() == e {
                queue.pop_front();
                st.evictions += 1;
            }
            queue.push_back(tag);
        }
        if event.kind == AccessKind::Modify {
            st.hits += 1;
        }
    }
    st
}

fn kind() -> impl Strategy<Value = AccessKind> {
    prop_oneof![
        Just(AccessKind::Instruction),
        Just(AccessKind::Load),
        Just(AccessKind::Store),
        Just(AccessKind::Modify),
    ]
}

fn trace_events() -> impl Strategy<Value = Vec<AccessEvent>> {
    prop::collection::vec(
        (kind(), 0u64..512, 1u32..9).prop_map(|(k, a, n)| AccessEvent::new(k, a, n)),
        0..300,
    )
}

proptest! {
    #[test]
    fn prop_counts_add_up(events in trace_events(), s in 0u32..4, e in 1usize..5, b in 0u32..4) {
        let geometry = Geometry::new(s as i64, e as i64, b as i64).unwrap();
        let st = Simulator::new(geometry).unwrap().run(events.iter().copied());

        let count = |k: AccessKind| events.iter().filter(|ev| ev.kind == k).count() as u64;
        let modifies = count(AccessKind::Modify);
        prop_assert_eq!(
            st.hits + st.misses,
            count(AccessKind::Load) + count(AccessKind::Store) + 2 * modifies
        );
        prop_assert!(st.hits >= modifies);
        prop_assert!(st.evictions <= st.misses);
    }

    #[test]
    fn prop_matches_queue_model(events in trace_events(), s in 0u32..4, e in 1usize..5, b in 0u32..4) {
        let geometry = Geometry::new(s as i64, e as i64, b as i64).unwrap();
        let st = Simulator::new(geometry).unwrap().run(events.iter().copied());
        prop_assert_eq!(st, reference(&events, s, e, b));
    }

    #[test]
    fn prop_deterministic(events in trace_events(), s in 0u32..4, e in 1usize..5, b in 0u32..4) {
        let geometry = Geometry::new(s as i64, e as i64, b as i64).unwrap();
        let first = Simulator::new(geometry).unwrap().run(events.iter().copied());
        let second = Simulator::new(geometry).unwrap().run(events.iter().copied());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_no_evictions_without_pressure(events in trace_events(), s in 0u32..3) {
        // 512 lines per set cover every address the strategy generates
        let geometry = Geometry::new(s as i64, 512, 0).unwrap();
        let st = Simulator::new(geometry).unwrap().run(events.iter().copied());
        prop_assert_eq!(st.evictions, 0);
    }
}
