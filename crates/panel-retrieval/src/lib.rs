//! Panel Retrieval - bind every information item to a library component
//!
//! Stage 1 scores every (info item, component) pair with a deterministic
//! weighted heuristic and keeps the top candidates with readable reasons.
//! Stage 2 hands those shortlists to the model capability for arbitration and
//! falls back to the Stage 1 leader whenever the model is absent, fails, or
//! picks something off-list.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod arbiter;
pub mod scoring;
pub mod weights;

pub use arbiter::{Binding, BindingSource, RetrievalOutcome, TwoStageRetriever};
pub use scoring::{rank_components, score_pair, ScoredCandidate};
pub use weights::RetrievalWeights;
