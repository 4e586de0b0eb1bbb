//! RepairMe Host - Client and UI interfaces of the game client
//!
//! This crate describes the small part of the host application the plugin
//! talks to. It has no knowledge of equipment or sampling; it only defines:
//! - [`client`] - login state and chat output
//! - [`ui`] - named UI object lookup and visibility queries
//! - [`session`] - the login/logout event publisher
//! - [`interfaces`] - the bundle of host services handed to the plugin
//!
//! # Thread Safety
//!
//! Every interface is `Send + Sync`. The host delivers events and answers
//! queries from its own threads, so implementations must not assume they run
//! on the game's main thread.

pub mod client;
pub mod error;
pub mod interfaces;
pub mod session;
pub mod ui;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use client::{ChatGui, ClientState};
pub use error::UiError;
pub use interfaces::HostInterfaces;
pub use session::{ListenerKey, SessionEvent, SessionEvents};
pub use ui::{GameGui, UiHandle};
