//! HTTP Routes

pub mod webhook;
