//! Marker traits separating writes from reads
//!
//! Commands change the audited tables (and therefore produce new audit
//! records through the capture trigger); queries only read.

use std::fmt::Debug;

/// A request that writes.
pub trait Command: Debug + Send + 'static {}

/// A request that only reads.
pub trait Query: Debug + Send + 'static {}
