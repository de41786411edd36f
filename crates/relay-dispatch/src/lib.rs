//! Outbound delivery for the alert relay.
//!
//! [`resolve`] turns request query parameters plus configured credentials
//! into a concrete [`Destination`] URL, following a strict priority chain.
//! [`RobotSender`] posts rendered messages there, one attempt per message.

#![forbid(unsafe_code)]

mod error;
mod resolver;
mod sender;

pub use error::{DispatchError, Result};
pub use resolver::{CredentialTier, Destination, PlatformCredentials, SendParams, resolve};
pub use sender::{RobotSender, SendOutcome};
