//! Configuration record.
//!
//! Loaded once, lazily, on first use of the public surface (see
//! `lib::with_heap`). Every option can be overridden by an environment
//! variable; an override that is absent, unparsable, or fails its
//! constraint is silently ignored and the compile-time default is kept:
//! a malformed `REGION_SIZE` in the environment must never itself become
//! the allocator's first failure.

use crate::heap::block::MIN_BLOCK_SIZE;

const DEFAULT_REGION_SIZE: usize = 1024 * 1024;
const DEFAULT_MAX_BLOCK_SIZE: usize = 128 * 1024;
const DEFAULT_RESERVE_CAPACITY: usize = 0;
const DEFAULT_MIN_SPLIT_SIZE: usize = MIN_BLOCK_SIZE;
const DEFAULT_SCRIBBLE_CHAR: u8 = 0;

const REGION_SIZE_ENV_VAR: &str = "REGION_SIZE";
const MAX_BLOCK_ALLOC_ENV_VAR: &str = "MAX_BLOCK_ALLOC";
const RESERVE_CAPACITY_ENV_VAR: &str = "RESERVE_CAPACITY";
const MIN_SPLIT_ENV_VAR: &str = "MIN_SPLIT_SIZE";
const SCRIBBLE_ENV_VAR: &str = "SCRIBBLE_CHAR";

/// Options recognized by the allocator, loaded once at first use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Bytes per region mapping; must be a multiple of 4096.
    pub region_size: usize,
    /// Upper bound for small-path routing; requests above go large.
    pub max_block_size: usize,
    /// Padding added to a request before deciding whether to split.
    pub reserve_capacity: usize,
    /// Minimum leftover size that justifies splitting.
    pub min_split_size: usize,
    /// If nonzero, newly allocated payloads are filled with this byte.
    pub scribble_char: u8,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            region_size: DEFAULT_REGION_SIZE,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            reserve_capacity: DEFAULT_RESERVE_CAPACITY,
            min_split_size: DEFAULT_MIN_SPLIT_SIZE,
            scribble_char: DEFAULT_SCRIBBLE_CHAR,
        }
    }
}

impl Config {
    /// Builds a configuration from the compile-time defaults overridden by
    /// whatever environment variables are present and valid.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Some(v) = read_env_usize(REGION_SIZE_ENV_VAR) {
            if v % 4096 == 0 {
                config.region_size = v;
            } else {
                log::warn!(
                    "{}={} is not a multiple of 4096, ignoring",
                    REGION_SIZE_ENV_VAR,
                    v
                );
            }
        }

        if let Some(v) = read_env_usize(MAX_BLOCK_ALLOC_ENV_VAR) {
            config.max_block_size = v;
        }

        if let Some(v) = read_env_usize(RESERVE_CAPACITY_ENV_VAR) {
            if v % 16 == 0 {
                config.reserve_capacity = v;
            } else {
                log::warn!(
                    "{}={} is not a multiple of 16, ignoring",
                    RESERVE_CAPACITY_ENV_VAR,
                    v
                );
            }
        }

        if let Some(v) = read_env_usize(MIN_SPLIT_ENV_VAR) {
            if v % 16 == 0 {
                config.min_split_size = v;
            } else {
                log::warn!(
                    "{}={} is not a multiple of 16, ignoring",
                    MIN_SPLIT_ENV_VAR,
                    v
                );
            }
        }

        if let Ok(raw) = std::env::var(SCRIBBLE_ENV_VAR) {
            match u8::from_str_radix(raw.trim_start_matches("0x"), 16) {
                Ok(byte) => config.scribble_char = byte,
                Err(_) => log::warn!("{}={:?} is not a hex byte, ignoring", SCRIBBLE_ENV_VAR, raw),
            }
        }

        if config.max_block_size > config.region_size {
            log::warn!(
                "{}={} exceeds region_size={}, clamping",
                MAX_BLOCK_ALLOC_ENV_VAR,
                config.max_block_size,
                config.region_size
            );
            config.max_block_size = config.region_size;
        }

        config
    }
}

fn read_env_usize(var: &str) -> Option<usize> {
    match std::env::var(var) {
        Ok(raw) => match raw.parse::<usize>() {
            Ok(v) => Some(v),
            Err(_) => {
                log::warn!("{}={:?} is not a valid integer, ignoring", var, raw);
                None
            }
        },
        Err(_) => None,
    }
}
