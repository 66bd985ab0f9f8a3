//! # DashFlow Deep Research
//!
//! A workflow-graph-driven deep research orchestrator: route a query
//! through direct-answer, single-epoch web research, or an iterative
//! multi-epoch deep-search loop, citing every factual claim against the
//! sources that were actually retrieved.
//!
//! ## Features
//!
//! - **Typed workflow graph**: router → direct/web/deep/agent/clarify →
//!   writer → evaluator, with a bounded revise loop (see [`workflow`]).
//! - **Iterative deep search**: plan/search/hydrate/summarize/gate epochs
//!   with budget guards and `auto`/`tree`/`linear` branching (see
//!   [`deepsearch`]).
//! - **Multi-provider search orchestration**: fan-out, dedup via stable
//!   source identity, deterministic ranking, response caching (see
//!   [`orchestrator`], [`source_registry`], [`search_cache`]).
//! - **Reliability**: per-provider retry with backoff and circuit
//!   breaking around every outbound call (see [`reliability`]).
//! - **Evidence gating**: citation coverage, freshness, and an
//!   LLM-backed claim/evidence consistency oracle (see [`evaluator`],
//!   [`claim_verifier`]).
//! - **Cooperative cancellation, checkpointing, and streaming**: a run can
//!   be cancelled, resumed from its last checkpoint, and observed through
//!   an ordered event stream (see [`cancellation`], [`checkpoint`],
//!   [`events`]).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use dashflow_deep_research::config::RunConfig;
//! use dashflow_deep_research::providers::{LlmRegistry, ProviderRegistry};
//! use dashflow_deep_research::run_controller::RunController;
//!
//! # async fn run(chat_model: Arc<dyn dashflow_deep_research::providers::ChatModel>) {
//! let mut llms = LlmRegistry::new();
//! llms.register(chat_model);
//! let providers = ProviderRegistry::new();
//!
//! let controller = RunController::new(RunConfig::default(), providers, llms, None, None);
//! let (run_id, mut events) = controller
//!     .start_run("what is the Raft consensus protocol?", Default::default())
//!     .await
//!     .unwrap();
//! while let Ok(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! # let _ = run_id;
//! # }
//! ```

pub mod cancellation;
pub mod checkpoint;
pub mod claim_verifier;
pub mod config;
pub mod context;
pub mod deepsearch;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod hydrator;
pub mod orchestrator;
pub mod planner;
pub mod providers;
pub mod reliability;
pub mod run_controller;
pub mod search_cache;
pub mod source_registry;
pub mod types;
pub mod workflow;
pub mod writer;

pub use error::RunError;
pub use run_controller::{RunController, RunDetail, RunSummary, StartOptions};
pub use types::{Mode, RunState};
