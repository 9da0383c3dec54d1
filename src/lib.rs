//! # nsqmsg
//!
//! `nsqmsg` models the lifecycle of a single message consumed from an
//! NSQ-style broker: the at-most-once response rule, the client-side
//! processing timeout that must be renewed to avoid redelivery, and the
//! notifications that tell the owning connection which command to send.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `event`: Order-preserving publish/subscribe used by messages and connections.
//! - `message`: The `Message` entity, its response state machine and requeue options.
//! - `timer`: The scheduling capability message timeouts run on, backed by tokio.
//! - `conn`: The `Connection` trait and an in-process connection producing `FIN`/`REQ`/`TOUCH` commands.
//! - `consumer`: The auto-respond rule applied after a message handler returns.
//! - `config`: Handles loading and managing configuration.
//! - `utils`: Shared utilities, such as error types and logging setup.

pub mod config;
pub mod conn;
pub mod consumer;
pub mod event;
pub mod message;
pub mod timer;
pub mod utils;
