//! Gotbot Core
//!
//! Update dispatch runtime: the poll loop and its cursor, the command router,
//! action decorators, auto-registration and the keep-alive indicator

pub mod actions;
pub mod auto_register;
pub mod context;
pub mod decorators;
pub mod dispatcher;
pub mod handler;
pub mod keep_alive;
pub mod registry;
pub mod router;
pub mod runtime;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use auto_register::{AutoRegister, ChatRecord, RegistrationStore, UserRecord};
pub use context::Context;
pub use decorators::{decorate, Logging, Recover};
pub use dispatcher::{Bot, DispatchMode, DEFAULT_POLL_INTERVAL};
pub use handler::{handler_fn, FnHandler, Handler};
pub use keep_alive::{KeepAlive, KeepAliveFactory, KeepAliveGuard, DEFAULT_KEEP_ALIVE_INTERVAL};
pub use registry::SqliteRegistry;
pub use router::Router;
pub use runtime::{enabled_commands, register_command, Runtime};
pub use transport::{ChatSink, UpdateSource};
