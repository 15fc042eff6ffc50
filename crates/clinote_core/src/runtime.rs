//! Process-global engine slot.
//!
//! # Invariants
//! - The engine is built at most once per slot.
//! - Re-initialization with an identical config is a no-op; a different
//!   config is rejected.
//! - Access before initialization fails with `NotInitialized`.

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::{NoteError, NoteResult};
use log::warn;
use once_cell::sync::OnceCell;

static ENGINE: EngineSlot = EngineSlot::new();

/// Lazily initialized engine holder.
#[derive(Debug)]
pub struct EngineSlot {
    cell: OnceCell<Engine>,
}

impl EngineSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Builds the engine once.
    ///
    /// # Errors
    /// - Engine construction errors on first use.
    /// - `Config` when already initialized with a different config.
    pub fn init(&self, config: EngineConfig) -> NoteResult<&Engine> {
        if let Some(engine) = self.cell.get() {
            return ensure_same_config(engine, &config);
        }
        let engine = self
            .cell
            .get_or_try_init(|| Engine::new(config.clone()))?;
        ensure_same_config(engine, &config)
    }

    pub fn get(&self) -> NoteResult<&Engine> {
        self.cell.get().ok_or(NoteError::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for EngineSlot {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_same_config<'a>(engine: &'a Engine, config: &EngineConfig) -> NoteResult<&'a Engine> {
    if engine.config() == config {
        return Ok(engine);
    }
    warn!("event=engine_init module=runtime status=rejected reason=config_conflict");
    Err(NoteError::Config(
        "engine already initialized with a different configuration".to_string(),
    ))
}

/// Initializes the process-global engine.
pub fn init_engine(config: EngineConfig) -> NoteResult<&'static Engine> {
    ENGINE.init(config)
}

/// Returns the process-global engine.
///
/// # Errors
/// - `NotInitialized` before [`init_engine`] succeeded.
pub fn engine() -> NoteResult<&'static Engine> {
    ENGINE.get()
}

pub fn is_initialized() -> bool {
    ENGINE.is_initialized()
}

#[cfg(test)]
mod tests {
    use super::EngineSlot;
    use crate::config::EngineConfig;
    use crate::error::NoteError;

    #[test]
    fn slot_rejects_use_before_init() {
        let slot = EngineSlot::new();
        assert_eq!(slot.get().unwrap_err(), NoteError::NotInitialized);
        assert!(!slot.is_initialized());
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let slot = EngineSlot::new();
        slot.init(EngineConfig::default())
            .expect("first init should succeed");
        slot.init(EngineConfig::default())
            .expect("same config should be idempotent");

        let other = EngineConfig {
            preview_chars: 12,
            ..EngineConfig::default()
        };
        let err = slot.init(other).unwrap_err();
        assert_eq!(err.code(), "config");
        assert_eq!(
            slot.get().expect("engine stays available").config(),
            &EngineConfig::default()
        );
    }

    #[test]
    fn failed_init_leaves_slot_empty() {
        let slot = EngineSlot::new();
        let bad = EngineConfig {
            preview_chars: 0,
            ..EngineConfig::default()
        };
        assert!(slot.init(bad).is_err());
        assert!(!slot.is_initialized());
    }
}
