// src/notify/mod.rs
//! Outbound notifications.

pub mod mailer;
