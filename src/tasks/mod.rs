//! Background Tasks Module
//!
//! Long-running maintenance tasks spawned by the cache service.

mod sweep;

pub(crate) use sweep::spawn_sweep_task;
