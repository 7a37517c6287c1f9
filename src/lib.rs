//! Peanut Suite - marketing attribution analytics service
//!
//! This library provides the core functionality for the Peanut Suite
//! service: visitor touch tracking, conversion recording and multi-touch
//! attribution reporting over a REST API.
//!
//! # Architecture
//! - `attribution`: model library, calculator and report aggregation
//! - `storage`: store traits and the in-memory backend
//! - `cache`: report cache abstraction (moka / null)
//! - `services`: business logic shared by the HTTP API and tests
//! - `api`: HTTP endpoints and response envelope
//! - `system`: logging setup and the in-process event bus
//! - `config`: environment-backed configuration

pub mod api;
pub mod attribution;
pub mod cache;
pub mod config;
pub mod errors;
pub mod services;
pub mod storage;
pub mod system;
