//! Shared types for Crustline.
//!
//! This crate defines the data every other layer agrees on:
//!
//! - **Types** ([`Session`], [`User`], [`SessionInfo`], [`NavigationState`]):
//!   what the identity backend hands out and what the UI gets to see.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those values are
//!   turned into bytes when they are persisted on the client.
//! - **Errors** ([`CodecError`]): what can go wrong while encoding or
//!   decoding.
//!
//! # Architecture
//!
//! The types layer sits below everything else. It doesn't know about
//! timers, routers, or storage backends. It only describes data.
//!
//! ```text
//! Types (Session, User) → Store / Route → Session monitor → Application
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::CodecError;
pub use types::{
    NavigationState, Session, SessionInfo, User, UserRole, unix_now,
};
