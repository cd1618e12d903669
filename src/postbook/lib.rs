//! # Postbook Architecture
//!
//! Postbook is a **UI-agnostic markdown post library**. The `postbook` binary
//! is one client of it; a TUI or a web front end would drive the same
//! [`controller::ViewController`].
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, prompts, prints, picks exit codes      │
//! │  - The ONLY place that knows about stdout/stderr            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Controller Layer (controller/)                             │
//! │  - List / Editor / Reader state machine                     │
//! │  - Returns CmdResult messages, never prints                 │
//! └─────────────────────────────────────────────────────────────┘
//!                 │                              │
//!                 ▼                              ▼
//! ┌───────────────────────────────┐  ┌──────────────────────────┐
//! │  Repository (repository.rs)   │  │  Renderer (render.rs)    │
//! │  - Ordered post collection    │  │  - markdown → SafeHtml   │
//! │  - Validation, timestamps     │  │  - ammonia allow-list    │
//! └───────────────────────────────┘  └──────────────────────────┘
//!                 │
//!                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - PersistentStore trait: key → JSON value                  │
//! │  - FileStore (production), InMemoryStore (testing)          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From the controller inward, code takes Rust values and returns
//! `Result<T>`. It never writes to stdout, never calls `std::process::exit`
//! and only reports diagnostics through the `log` facade.
//!
//! ## Durability
//!
//! The in-memory collection is authoritative for the session. A mutation
//! that the store fails to persist still takes effect in memory; the caller
//! receives the store error next to the value (see
//! [`repository::Committed`]) and the next mutation rewrites the full
//! snapshot.
//!
//! A snapshot that fails to load is never overwritten: it is moved aside
//! through the store, or the session runs read-only.
//!
//! ## Module Overview
//!
//! - [`controller`]: View state machine and command results
//! - [`repository`]: Post collection, validation and persistence
//! - [`render`]: Markdown rendering and HTML sanitization
//! - [`store`]: Storage abstraction and implementations
//! - [`model`]: Core data types (`Post`, `Draft`, `PostId`)
//! - [`index`]: Post references (list positions, id prefixes)
//! - [`config`]: Configuration management
//! - [`editor`]: External editor integration
//! - [`logging`]: Logger bootstrap for binaries
//! - [`error`]: Error types

pub mod config;
pub mod controller;
pub mod editor;
pub mod error;
pub mod index;
pub mod logging;
pub mod model;
pub mod render;
pub mod repository;
pub mod store;
