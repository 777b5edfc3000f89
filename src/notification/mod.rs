//! Push-notification fan-out and the internal inbox.
//!
//! The dispatcher delivers one message to every push endpoint a user has
//! registered, pruning endpoints the channel reports as gone. The review
//! notifier builds on it to implement the task context's
//! [`crate::task::ports::ReviewNotifier`] port: an inbox record plus a push
//! fan-out per audit decision.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
