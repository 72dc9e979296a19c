//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Borrows the caller's unit of work, never a connection of its own
//! - `get` is a single-row lookup failing with NotFound
//! - `create` is one insert committed immediately, returning the new id
//! - Navigation methods return lazy streams in insertion order

pub mod ping_images;
pub mod pings;
pub mod qr_codes;
pub mod users;

pub use ping_images::{PingImageRepo, QrCodePingImage};
pub use pings::{NewPing, PingRepo, QrCodePing};
pub use qr_codes::{QrCode, QrCodeRepo};
pub use users::{User, UserRepo};

pub use crate::error::DbError;
