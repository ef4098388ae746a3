//! Text-to-image studio: prompt assembly, optional enhancement, image generation
//! and variation loops, served as a small web application.

#![allow(clippy::multiple_crate_versions)]
#![deny(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::complexity)]
#![deny(clippy::correctness)]
#![deny(clippy::disallowed_methods)]
#![deny(clippy::expect_used)]
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::panic)]
#![deny(clippy::perf)]
#![deny(clippy::trivially_copy_pass_by_ref)]
#![deny(clippy::unreachable)]
#![deny(clippy::unwrap_used)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod config;
pub mod constants;
pub mod enhancer;
pub mod error;
pub mod generator;
pub mod history;
pub mod prompt;
pub mod request;
pub mod studio;
pub mod variations;
pub mod web;

#[cfg(test)]
mod testing;
