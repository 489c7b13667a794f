//! Core module containing the decoding pipeline
//!
//! This module provides:
//! - Transport layer for analyzer connections (serial, in-memory)
//! - Stream framer turning raw bytes into packet bodies
//! - Field extractor turning packet bodies into ordered records
//! - Identifier map for analyzer token codes
//! - ID heuristic resolver for mislabeled patient identifiers
//! - Result sink boundary for downstream consumers
//! - Per-connection reader worker tying it all together

pub mod extractor;
pub mod framer;
pub mod identifiers;
pub mod record;
pub mod resolver;
pub mod sink;
pub mod transport;
pub mod worker;
