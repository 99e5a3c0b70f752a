//! Page interaction layer for the portfolio site.
//!
//! Everything here is target independent and unit tested on the host; the
//! browser bindings in the binary's `frontend` module implement the
//! [`tracker::PageHost`], [`menu::MenuSurface`], [`frame::FrameScheduler`]
//! and [`events::DocumentEffects`] seams against `web_sys`.

pub mod config;
pub mod contact;
pub mod events;
pub mod frame;
pub mod logging;
pub mod menu;
pub mod theme;
pub mod tracker;
pub mod typing;
pub mod viewport;
