//! Builds the diagnosis `Network` from a `KnowledgeBase`.
//!
//! Every disease becomes a root with a binomial prior. Every symptom becomes a child of the
//! diseases that cause it, with a leaky-or CPD whose specificity shrinks as more diseases share
//! the symptom.

use crate::init::Initialization;
use crate::knowledge::KnowledgeBase;
use crate::model::{DirectedModel, DirectedModelBuilder};
use crate::util::{DiagnetError, Result};
use crate::variable::Variable;

use std::collections::HashMap;

use tracing::info;


/// The diagnosis network: one binary `Variable` per disease and per symptom, named after them
pub type Network = DirectedModel;

/// Lowest probability that a symptom shows when one of its causes is present
pub const SPECIFICITY_FLOOR: f64 = 0.6;

/// Loss of specificity for each disease sharing a symptom
pub const SPECIFICITY_DECAY: f64 = 0.1;

/// Probability that a symptom shows when none of its causes is present
pub const BACKGROUND_RATE: f64 = 0.1;


/// ```P(symptom = Present | some cause present)``` for a symptom with `n` causes
pub fn specificity(n: usize) -> f64 {
    (1.0 - SPECIFICITY_DECAY * n as f64).max(SPECIFICITY_FLOOR)
}


/// Build the `Network` for `kb`.
///
/// Diseases are added first, in declaration order; symptoms follow in order of first mention,
/// each with its causes as parents in declaration order.
///
/// # Errors
/// `DiagnetError::InvalidKnowledgeBase` if a symptom has no cause, or any error raised while
/// assembling the model.
pub fn build_network(kb: &KnowledgeBase) -> Result<Network> {
    let mut builder = DirectedModelBuilder::new();
    let mut diseases: HashMap<&str, Variable> = HashMap::with_capacity(kb.len());

    for d in kb.iter() {
        let var = Variable::disease();
        builder = builder.with_named_variable(&var, &d.name, vec![], Initialization::Binomial(d.prior));
        diseases.insert(d.name.as_str(), var);
    }

    let index = kb.symptom_index();
    let mut max_parents = 0;

    for (symptom, causes) in index.iter() {
        if causes.is_empty() {
            return Err(DiagnetError::InvalidKnowledgeBase(format!("{} has no cause", symptom)));
        }

        let parents = causes.iter()
                            .map(|c| diseases.get(c.as_str())
                                             .cloned()
                                             .ok_or_else(|| DiagnetError::MissingParent(c.clone())))
                            .collect::<Result<Vec<Variable>>>()?;

        let n = parents.len();
        max_parents = max_parents.max(n);

        let init = Initialization::LeakyOr { specificity: specificity(n), leak: BACKGROUND_RATE };
        builder = builder.with_named_variable(&Variable::symptom(), symptom, parents, init);
    }

    let network = builder.build()?;

    info!(
        diseases = kb.len(),
        symptoms = index.len(),
        max_parents,
        largest_cpd = 1usize << (max_parents + 1),
        "built diagnosis network"
    );

    Ok(network)
}
