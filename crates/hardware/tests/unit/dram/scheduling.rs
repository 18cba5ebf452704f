//! DRAM Scheduling Property Tests.
//!
//! Drives the controller with random request streams and checks, every cycle,
//! that scheduled requests never share a bus slot or bank interval, that a
//! non-hit winner was only chosen when no row hit could go, and that every
//! request retires exactly when its data transfer ends.

use std::collections::HashMap;

use memsim_core::common::{BlockRequest, RequesterKind};
use memsim_core::config::DramConfig;
use memsim_core::soc::memory::{DramController, MemoryRequest, RowBufferStatus};
use proptest::prelude::*;

const CYCLE_LIMIT: u64 = 50_000;

/// `(row, bank, gap)` triples become block addresses `(row << 16) | (bank << 5)`
/// arriving `gap` cycles after the previous request.
fn stream() -> impl Strategy<Value = Vec<(u32, u32, u64)>> {
    prop::collection::vec((0u32..4, 0u32..8, 0u64..80), 1..16)
}

fn arrivals(stream: &[(u32, u32, u64)]) -> Vec<(u64, BlockRequest)> {
    let mut at = 0;
    stream
        .iter()
        .map(|&(row, bank, gap)| {
            at += gap;
            let addr = (row << 16) | (bank << 5);
            (at, BlockRequest::new(addr, RequesterKind::Data))
        })
        .collect()
}

fn blocked_by(request: &MemoryRequest, others: &[MemoryRequest]) -> bool {
    others.iter().any(|o| request.conflicts_with(o))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn schedule_respects_resources_and_priority(stream in stream()) {
        let requests = arrivals(&stream);
        let mut dram = DramController::new(&DramConfig::default(), 32);
        let mut next = 0;
        let mut data_end: HashMap<u64, u64> = HashMap::new();
        let mut retired = 0;
        let mut now = 0;

        while (next < requests.len() || !dram.is_idle()) && now < CYCLE_LIMIT {
            while next < requests.len() && requests[next].0 == now {
                dram.add_request(requests[next].1, now);
                next += 1;
            }
            let before: Vec<u64> = dram.ongoing().iter().map(|r| r.id).collect();
            let tick = dram.tick(now);

            for block in &tick.retired {
                prop_assert!(requests.iter().any(|(_, b)| b == block));
            }
            retired += tick.retired.len();

            let ongoing = dram.ongoing();
            for (i, a) in ongoing.iter().enumerate() {
                for b in &ongoing[i + 1..] {
                    prop_assert!(
                        !a.conflicts_with(b),
                        "cycle {}: {} overlaps {}",
                        now,
                        a.plan,
                        b.plan
                    );
                }
            }

            if let Some(winner) = tick.scheduled {
                prop_assert_eq!(winner.plan.bank.start, now);
                let _ = data_end.insert(winner.id, winner.plan.data.end);
                let held: Vec<MemoryRequest> = ongoing
                    .iter()
                    .filter(|r| r.id != winner.id && before.contains(&r.id))
                    .copied()
                    .collect();
                prop_assert!(!blocked_by(&winner, &held));
                if winner.status != RowBufferStatus::Hit {
                    for p in dram.pending() {
                        if p.status == RowBufferStatus::Hit || p.id < winner.id {
                            prop_assert!(
                                blocked_by(p, &held),
                                "request {} was eligible but {} was chosen", p.id, winner.id
                            );
                        }
                    }
                }
            }

            for r in ongoing {
                prop_assert!(r.plan.data.end > now, "request {} outlived its transfer", r.id);
            }
            now += 1;
        }

        prop_assert!(now < CYCLE_LIMIT, "controller did not drain");
        prop_assert_eq!(retired, requests.len());
        prop_assert_eq!(data_end.len(), requests.len());
    }
}
