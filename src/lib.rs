//! Tokengate - Dual-Window Quota Rate Limiter
//!
//! This crate implements a sliding-window rate limiter for APIs that meter
//! usage along two independent axes at once: a request count per minute and
//! a token (weight) budget per minute, as generative-AI providers do. Every
//! admission is gated against both trailing 60-second quotas with blocking
//! backpressure, so callers simply experience latency when quotas are tight.

pub mod config;
pub mod error;
pub mod quota;
