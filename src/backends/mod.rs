// SPDX-License-Identifier: GPL-3.0-only

//! Backend layer for capture control
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 Session Layer                │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌─────────────────┐  ┌──────────────────┐  │
//! │  │ Camera controls │  │  Virtual camera  │  │
//! │  │ (mapper, tiers, │  │ (simulated HW,   │  │
//! │  │  WB freeze)     │  │  image frames)   │  │
//! │  └─────────────────┘  └──────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Capture-request model, parameter mapping and negotiation
//! - [`virtual_camera`]: Simulated device implementing [`camera::ControlApplier`]

pub mod camera;
pub mod virtual_camera;
