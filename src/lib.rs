//! Paygate - Payment Settlement & Subscription-Access Engine
//!
//! Turns an untrusted, possibly duplicated or lost payment-notification
//! stream into exactly-once subscription state changes, with a
//! reconciliation path for notifications that never arrive and a retrying
//! access-control engine keeping channel membership in step with
//! subscription state.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
