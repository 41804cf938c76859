#![warn(missing_docs)]
//! Chat command dispatch.
//!
//! The [`Dispatcher`] takes parsed chat lines one at a time, applies the hide/block
//! filters, counts meows, enforces blacklist and cooldown rules, and routes `!`
//! commands through a [`CommandRegistry`] to handlers that act on a [`BotContext`].

mod context;
mod dispatcher;
mod handlers;
mod moderation;
mod registry;
mod settings;

pub use context::BotContext;
pub use dispatcher::{Dispatcher, Disposition, IgnoreReason, SuppressReason};
pub use handlers::builtin_registry;
pub use moderation::{CooldownCheck, ModerationGate};
pub use registry::{CommandRegistry, Handler, Invocation, Registration};
pub use settings::{CommandToggles, DispatchSettings};
