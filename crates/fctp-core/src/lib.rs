//! # fctp-core: Fixed-Charge Transportation Data Model
//!
//! Static data for the fixed-charge transportation problem (FCTP) and the
//! run configuration that feeds the decomposition solver in `fctp-algo`.
//!
//! ## Quick Start
//!
//! ```rust
//! use fctp_core::Instance;
//!
//! let instance = Instance::builder()
//!     .origin("i1", 100.0)
//!     .destination("j1", 100.0)
//!     .arc("i1", "j1", 10.0, 1.0)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(instance.num_arcs(), 1);
//! assert_eq!(instance.flow_limits(), vec![100.0]);
//! ```
//!
//! ## Core Data Structures
//!
//! - [`Instance`] - Validated origins, destinations and the full arc grid
//! - [`InstanceBuilder`] - Incremental construction with validation on `build()`
//! - [`RunConfig`] - YAML/JSON run file (instance data plus loop options)
//! - [`FctpError`] - Loading and validation failures

pub mod config;
pub mod error;
pub mod instance;
pub mod reference;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use config::{load_config_from_path, RunConfig};
pub use error::{FctpError, FctpResult};
pub use instance::{Destination, Instance, InstanceBuilder, Origin, TransportArc};

/// Name of a supply point, as written in the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OriginId(String);

/// Name of a demand point, as written in the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(String);

/// Position of an arc in [`Instance::arcs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArcId(usize);

impl OriginId {
    pub fn new(value: impl Into<String>) -> Self {
        OriginId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DestinationId {
    pub fn new(value: impl Into<String>) -> Self {
        DestinationId(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ArcId {
    #[inline]
    pub fn new(value: usize) -> Self {
        ArcId(value)
    }

    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for OriginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
