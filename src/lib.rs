//! Interactive voice-menu engine for a payphone.
//!
//! Menus are immutable [`menu::MenuTree`]s walked by an
//! [`engine::NavigationEngine`]. The [`bootloader::BootloaderController`]
//! sits on top and switches between the phone systems found by
//! [`registry::SystemRegistry`].

pub mod audio;
pub mod bootloader;
pub mod config;
pub mod engine;
pub mod input;
#[cfg(any(feature = "native-audio", test))]
mod lock;
pub mod menu;
pub mod registry;
pub mod runtime;
pub mod systems;
pub mod telemetry;
#[cfg(test)]
mod test_support;

#[cfg(any(feature = "native-audio", test))]
pub(crate) use lock::lock_or_recover;
