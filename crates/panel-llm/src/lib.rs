//! Panel LLM - the model-backed capability consumed by pipeline agents
//!
//! Agents only ever ask one question of a model: "given these prompts, return
//! structured JSON". This crate provides:
//! - [`ModelCapability`], the abstract `complete(system, user)` seam
//! - [`HttpModelClient`], an OpenAI-compatible implementation
//! - [`decode`], lenient decoding for truncated or chatty responses
//!
//! Callers never let a model failure escape: [`request_json`] folds transport
//! and decode failures into a single [`LlmError`] so the caller can pick its
//! deterministic fallback.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod capability;
pub mod decode;
pub mod error;
pub mod http;

pub use capability::{request_json, ModelCapability, NoModel};
pub use decode::{resilient_decode, Decoded};
pub use error::LlmError;
pub use http::{HttpModelClient, HttpModelConfig};
