//! Reference instances used by the CLI `example` command and the tests.

use crate::{FctpResult, Instance};

const ORIGINS: [(&str, f64); 4] = [("i1", 20.0), ("i2", 30.0), ("i3", 40.0), ("i4", 20.0)];
const DESTINATIONS: [(&str, f64); 3] = [("j1", 20.0), ("j2", 50.0), ("j3", 30.0)];
const FIXED_COSTS: [[f64; 3]; 4] = [
    [10.0, 20.0, 30.0],
    [20.0, 30.0, 40.0],
    [30.0, 40.0, 50.0],
    [40.0, 50.0, 60.0],
];
const UNIT_COSTS: [[f64; 3]; 4] = [
    [1.0, 2.0, 3.0],
    [3.0, 2.0, 1.0],
    [2.0, 3.0, 4.0],
    [4.0, 3.0, 2.0],
];

/// Four origins (capacity 110) serving three destinations (demand 100).
pub fn four_by_three() -> FctpResult<Instance> {
    let mut builder = Instance::builder();
    for (id, capacity) in ORIGINS {
        builder = builder.origin(id, capacity);
    }
    for (id, demand) in DESTINATIONS {
        builder = builder.destination(id, demand);
    }
    for (i, (origin, _)) in ORIGINS.iter().enumerate() {
        for (j, (destination, _)) in DESTINATIONS.iter().enumerate() {
            builder = builder.arc(*origin, *destination, FIXED_COSTS[i][j], UNIT_COSTS[i][j]);
        }
    }
    builder.build()
}

/// One origin, one destination: the optimum opens the arc and ships 100
/// units for a total of 110.
pub fn single_arc() -> FctpResult<Instance> {
    Instance::builder()
        .origin("i1", 100.0)
        .destination("j1", 100.0)
        .arc("i1", "j1", 10.0, 1.0)
        .build()
}
