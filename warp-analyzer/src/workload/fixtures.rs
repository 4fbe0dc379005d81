//! Reference workloads shared by the unit tests.
//!
//! All use `M = 0.9`, `E2E = 0.99`, no fault floor.

use super::{WorkLoad, WorkloadConfig};

/// `(flow name, period/deadline, node chain)`; `None` keeps the defaults.
type FlowSpec<'a> = (&'a str, Option<u64>, &'a [&'a str]);

pub(crate) fn build(name: &str, config: WorkloadConfig, flows: &[FlowSpec<'_>]) -> WorkLoad {
    let mut wl = WorkLoad::new(name, config).unwrap();
    for (flow, timing, nodes) in flows {
        wl.add_flow(flow).unwrap();
        if let Some(t) = timing {
            wl.set_flow_period(flow, *t).unwrap();
            wl.set_flow_deadline(flow, *t).unwrap();
        }
        for node in nodes.iter() {
            wl.add_node_to_flow(flow, node).unwrap();
        }
    }
    wl
}

fn reference_config() -> WorkloadConfig {
    WorkloadConfig::new(0.9, 0.99)
}

/// Six flows, periods {20,75,50,75,50,75}, node counts {3,3,7,6,8,5}.
pub(crate) fn test_flows() -> WorkLoad {
    build(
        "TestFlows",
        reference_config(),
        &[
            ("F1", Some(20), &["A", "B", "C"]),
            ("F5", Some(75), &["C", "D", "E"]),
            ("F2", Some(50), &["A", "D", "F", "G", "H", "I", "J"]),
            ("F4", Some(75), &["K", "L", "M", "N", "O", "P"]),
            ("F3", Some(50), &["Q", "R", "S", "T", "U", "V", "W", "X"]),
            ("F6", Some(75), &["B", "E", "H", "K", "N"]),
        ],
    )
}

/// A single six-node flow with period and deadline 50.
pub(crate) fn one_flow() -> WorkLoad {
    build(
        "OneFlow",
        reference_config(),
        &[("F3", Some(50), &["C", "D", "E", "J", "K", "L"])],
    )
}

/// Nodes discovered as B, C, D, A, E.
pub(crate) fn test_indexes() -> WorkLoad {
    build(
        "TestIndexes",
        reference_config(),
        &[
            ("F0", Some(50), &["B", "C", "D"]),
            ("F1", Some(50), &["A", "B", "C", "D", "E"]),
        ],
    )
}

/// Nodes discovered in reverse alphabetical order.
pub(crate) fn example() -> WorkLoad {
    build("Example", reference_config(), &[("F0", None, &["C", "B", "A"])])
}

/// Periods 10, 20, 15, 20, 25, 25; RM order is F0, F2, F1, F3, F4, F5.
pub(crate) fn example2() -> WorkLoad {
    build(
        "Example2",
        reference_config(),
        &[
            ("F0", Some(10), &["A", "B"]),
            ("F1", Some(20), &["B", "C"]),
            ("F2", Some(15), &["C", "D"]),
            ("F3", Some(20), &["D", "E"]),
            ("F4", Some(25), &["E", "F"]),
            ("F5", Some(25), &["F", "A"]),
        ],
    )
}

/// A four-node flow and a three-node flow over the same nodes.
pub(crate) fn example4() -> WorkLoad {
    build(
        "Example4",
        reference_config(),
        &[
            ("F0", Some(20), &["A", "B", "C", "D"]),
            ("F1", Some(20), &["C", "B", "A"]),
        ],
    )
}

/// One 26-node chain A → Z.
pub(crate) fn long_chain() -> WorkLoad {
    const ALPHABET: [&str; 26] = [
        "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q",
        "R", "S", "T", "U", "V", "W", "X", "Y", "Z",
    ];
    build("LongChain", reference_config(), &[("F0", None, &ALPHABET)])
}
