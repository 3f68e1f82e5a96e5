//! Cart domain: line items, the cart value itself, identities and the ports
//! the engine talks to.

pub mod cart;
pub mod command;
pub mod events;
pub mod identity;
pub mod line_item;
pub mod order;
pub mod ports;
