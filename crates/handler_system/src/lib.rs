//! # Handler System
//!
//! Capability-typed player event handlers for the essentials game server.
//! Plugins observe and influence player events without touching the engine:
//! they implement the handler traits they care about, register with a
//! player's [`HandlerRegistry`], and the engine fans each event out to the
//! subscribers of that kind.
//!
//! ## Core Features
//!
//! - **Capability Matching**: A subscriber is tested once per kind at
//!   registration; dispatch only visits members of the kind being raised
//! - **Ordered Fan-out**: Subscribers run in registration order and see each
//!   other's changes to the context and `&mut` arguments
//! - **Composable Cleanup**: [`UnregisterToken`] removes a subscriber from every
//!   kind it matched and is safe to run more than once
//! - **Concurrent Use**: Registration and dispatch may race freely; no lock is
//!   held while handlers run, so handlers may unregister themselves
//! - **Failure Isolation**: A failing or panicking handler aborts only the call
//!   it was part of
//!
//! ## Quick Start Example
//!
//! ```rust
//! use handler_system::*;
//! use std::sync::Arc;
//!
//! struct NoSwearing;
//!
//! impl ChatHandler for NoSwearing {
//!     fn handle_chat(&self, ctx: &mut EventContext, message: &mut String) -> HandlerResult {
//!         if message.contains("heck") {
//!             ctx.cancel();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! subscriber!(NoSwearing: Chat);
//!
//! let registry = create_handler_registry();
//! let token = registry.register(Arc::new(NoSwearing)).unwrap();
//!
//! let mut ctx = EventContext::new();
//! let mut message = "what the heck".to_string();
//! registry.dispatch_chat(&mut ctx, &mut message).unwrap();
//! assert!(ctx.is_cancelled());
//!
//! token.unregister();
//! assert_eq!(registry.subscriber_count(EventKind::Chat), 0);
//! ```

pub mod capability;
pub mod context;
mod dispatch;
pub mod error;
mod lifecycle;
mod registry;
pub mod stats;
pub mod types;

pub use capability::*;
pub use context::EventContext;
pub use error::{EventError, HandlerError, HandlerResult};
pub use lifecycle::{HandlerRegistry, UnregisterToken};
pub use registry::SubscriberId;
pub use stats::RegistryStats;
pub use types::*;

/// Creates an empty registry for one player session.
pub fn create_handler_registry() -> HandlerRegistry {
    HandlerRegistry::new()
}
