//! Error Types
//!
//! This module defines the error types used throughout the renderer.
//!
//! # Overview
//!
//! The main error type [`GloamError`] covers all failure modes including:
//! - GPU initialization failures
//! - Scene configuration errors (light caps)
//! - Deliberately unimplemented paths
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, GloamError>`.
//!
//! ```rust,ignore
//! use gloam::errors::{GloamError, Result};
//!
//! fn register_light() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```
//!
//! Transient per-frame conditions (an empty visible set, a degenerate shadow
//! frustum) are not errors: they are represented in data (the NaN sentinel
//! sphere, a light's `out_of_range` flag) and recovered locally each frame.

use thiserror::Error;

use crate::scene::light::LightKind;

/// The main error type for the Gloam renderer.
///
/// This enum covers all possible error conditions that can occur
/// during renderer operation. Each variant provides specific context
/// about what went wrong.
#[derive(Error, Debug)]
pub enum GloamError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    // ========================================================================
    // Scene Configuration Errors
    // ========================================================================
    /// Registering the light would exceed the per-kind cap.
    ///
    /// The light is *not* registered when this is returned.
    #[error("Too many {kind:?} lights: the registry holds at most {cap} of each kind")]
    TooManyLights {
        /// The kind of light that was being registered
        kind: LightKind,
        /// The per-kind registration cap
        cap: usize,
    },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Known-Incomplete Paths
    // ========================================================================
    /// The operation exists in the API surface but is deliberately not
    /// implemented (point-light shadow maps, the combined-texture model
    /// factory, the ambient-only pass). Failing loudly here is the contract;
    /// these are not degraded modes.
    #[error("Not implemented: {0}")]
    Unimplemented(&'static str),
}

/// Alias for `Result<T, GloamError>`.
pub type Result<T> = std::result::Result<T, GloamError>;
