//! Synthetic import paths for top-level packages

use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

const SUFFIX_MODULUS: u32 = 100_000;

/// Import path given to files that sit directly in the base directory
///
/// Always `main` plus five digits, so it can never equal the reserved `main`.
pub fn synthetic_import_path(suffix: u32) -> String {
    format!("main{:05}", suffix % SUFFIX_MODULUS)
}

/// Source of the numeric suffix used by [`synthetic_import_path`]
pub trait SuffixSource: Send + Sync {
    fn next_suffix(&self) -> u32;
}

/// Random suffix drawn from a v4 UUID
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomSuffix;

impl SuffixSource for RandomSuffix {
    fn next_suffix(&self) -> u32 {
        (Uuid::new_v4().as_u128() % u128::from(SUFFIX_MODULUS)) as u32
    }
}

/// Deterministic suffixes: `start`, `start + 1`, ...
#[derive(Debug)]
pub struct FixedSuffix {
    next: AtomicU32,
}

impl FixedSuffix {
    pub fn new(start: u32) -> Self {
        Self {
            next: AtomicU32::new(start),
        }
    }
}

impl SuffixSource for FixedSuffix {
    fn next_suffix(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed) % SUFFIX_MODULUS
    }
}
