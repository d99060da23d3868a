//! Ranks candidate diseases for a free-text description of symptoms.
//!
//! Two independent scores are produced: the fraction of each disease's symptoms that were
//! mentioned, and the posterior probability of each disease in a Bayesian network built from the
//! knowledge base, computed exactly by variable elimination.

pub mod variable;
pub mod factor;
pub mod init;
pub mod model;
pub mod inference;
pub mod knowledge;
pub mod network;
pub mod diagnosis;
pub mod config;
pub mod telemetry;
pub mod server;
pub mod util;

pub use util::{DiagnetError, ErrorKind, Result};
pub use diagnosis::{diagnose, rule_based_score, run_inference, Diagnosis, ScoreTable};
pub use knowledge::{extract_symptoms, Evidence, KnowledgeBase};
pub use network::{build_network, Network};
