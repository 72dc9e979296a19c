//! Route handlers organized by resource

pub mod health;
pub mod pings;
pub mod qr_codes;
pub mod users;
