//! Per-instance tunables for `ChainedTable`.

use crate::error::TableError;

pub const DEFAULT_STARTING_SIZE: usize = 1024;
pub const DEFAULT_GROWTH_FACTOR: usize = 2;
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.7;

/// Sizing policy for a table: initial bucket count, how much to grow by,
/// and the load factor that triggers growth.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    starting_size: usize,
    growth_factor: usize,
    max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            starting_size: DEFAULT_STARTING_SIZE,
            growth_factor: DEFAULT_GROWTH_FACTOR,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial number of buckets. Must be a power of two.
    pub fn with_starting_size(mut self, starting_size: usize) -> Self {
        self.starting_size = starting_size;
        self
    }

    /// Multiplier applied to the bucket count on growth. Must be a power of
    /// two of at least 2 so the bucket count stays a power of two.
    pub fn with_growth_factor(mut self, growth_factor: usize) -> Self {
        self.growth_factor = growth_factor;
        self
    }

    /// Ratio of entries to buckets above which the table grows.
    pub fn with_max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    pub fn starting_size(&self) -> usize {
        self.starting_size
    }

    pub fn growth_factor(&self) -> usize {
        self.growth_factor
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    pub fn validate(&self) -> Result<(), TableError> {
        let res = if !self.starting_size.is_power_of_two() {
            Err(TableError::InvalidConfig(
                "starting_size must be a power of two",
            ))
        } else if self.growth_factor < 2 || !self.growth_factor.is_power_of_two() {
            Err(TableError::InvalidConfig(
                "growth_factor must be a power of two >= 2",
            ))
        } else if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            Err(TableError::InvalidConfig(
                "max_load_factor must be finite and positive",
            ))
        } else if self.grow_threshold(self.starting_size) == 0 {
            Err(TableError::InvalidConfig(
                "starting_size * max_load_factor must allow at least one entry",
            ))
        } else {
            Ok(())
        };
        if let Err(e) = &res {
            log::trace!("rejected {:?}: {}", self, e);
        }
        res
    }

    /// Largest entry count a table with `bucket_count` buckets holds before
    /// the next insert grows it.
    pub(crate) fn grow_threshold(&self, bucket_count: usize) -> usize {
        let t = (bucket_count as f64 * self.max_load_factor).floor();
        if t >= usize::MAX as f64 {
            usize::MAX
        } else {
            t as usize
        }
    }
}
