//! Trustgate - Stateless trust and verification core for subscriber sites
//!
//! Decides whether a visitor is a trusted subscriber/member without a
//! database round-trip (HMAC trust tokens), issues and validates
//! short-lived single-use verification codes with human-readable sequence
//! numbering, and governs the subscriber lifecycle
//! (unverified → verified → subscribed ⇄ unsubscribed).

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
