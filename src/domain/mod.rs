//! Domain types for the captive-portal checkout: what the customer picks,
//! what a checkout request looks like, and the ports the pipeline talks to.

pub mod checkout;
pub mod package;
pub mod payment;
pub mod phone;
pub mod ports;
pub mod selection;
pub mod voucher;
