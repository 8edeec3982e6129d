//! # exoai
//!
//! Network-facing half of the ExoAI dashboard data layer.
//!
//! ```text
//!  consumer ──▶ Dashboard ──▶ ExoClient ──▶ classification service
//!                  │ on TransportError
//!                  ├─▶ tracing::warn! + Notifier
//!                  └─▶ exoai_core::substitute
//! ```
//!
//! - [`client`]: one HTTP call per operation, fixed timeout, no retries
//! - [`degrade`]: never-failing facade with substitute fallback
//! - [`notify`]: fallback notifications (log, console, channel)
//! - [`workflow`]: classify form state machine with persisted history
//! - [`config`]: defaults, TOML file and environment layering
//! - [`api`]: offline stub backend serving substitute data
//! - [`cli`]: the `exoai` command line

pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod degrade;
pub mod notify;
pub mod workflow;

pub use client::{ClientConfig, ExoClient, TransportError};
pub use degrade::{Dashboard, Source, Sourced};
pub use notify::{ChannelNotifier, ConsoleNotifier, LogNotifier, Notice, Notifier};
pub use workflow::{ClassifyState, ClassifyWorkflow};
