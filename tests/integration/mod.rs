//! Integration tests for debforge
//!
//! These tests drive the compiled binary against local distribution indexes and
//! `file://` release repositories, so they need `git` but no network access and
//! no Debian toolchain.
//!
//! Run with: `cargo test --test integration`

mod common;

mod cache;
mod cli;
mod graph;
mod order;
mod pipeline;
