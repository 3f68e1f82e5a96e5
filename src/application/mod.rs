//! Application layer containing the cart orchestration.
//!
//! [`engine::CartEngine`] owns the cart of the active partition and keeps the
//! durable store in step with it. [`session::ShopSession`] wraps the engine
//! with a switchable identity and drives the login/logout flow.

pub mod engine;
pub mod session;
