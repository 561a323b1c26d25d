//! Stream sources and the shared error channel.
//!
//! ## Contents
//! - [`Scanner`], [`Bot`] the external collaborators that produce item streams
//! - [`ItemStream`], [`UserStreams`] what they produce
//! - [`StreamContext`] the cancellation signal and error sender they receive
//! - [`ErrorSender`] the reporting side of the run's error channel

mod channel;
mod source;

pub use channel::ErrorSender;
pub(crate) use channel::{ErrorReceiver, Report, error_channel};
pub use source::{Bot, ItemStream, Scanner, StreamContext, UserStreams};
