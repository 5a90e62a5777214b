//! Notifications fired as a side effect of task transitions
//!
//! [`NotificationPolicy`] decides whether a transition warrants a message and
//! builds it without doing any I/O. [`Dispatcher`] makes one best-effort
//! delivery attempt through a [`NotificationTransport`] and never fails the
//! caller.

mod dispatcher;
mod policy;
mod transport;

pub use dispatcher::*;
pub use policy::*;
pub use transport::*;
