//! Defines a `ConditionalInferenceEngine` that uses exact inference by variable elimination to
//! answer conditional inference queries.
//!
//! Implementation of Koller & Friedman Algorithm 9.1 - Sum-Product-VE

use crate::factor::Factor;
use crate::model::DirectedModel;
use super::ConditionalInferenceEngine;
use crate::util::{DiagnetError, Result};
use crate::variable::{Assignment, State, Variable};

use std::collections::HashMap;
use std::collections::HashSet;

use tracing::debug;


/// The order in which non-query variables are summed out. Every order gives the same posterior;
/// they differ only in the size of the intermediate factors.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum EliminationOrder {

    /// All symptoms, then all diseases, each in the model's declaration order. Unobserved
    /// symptoms are leaves, so they are eliminated before they can join their parents together.
    #[default]
    SymptomsFirst,

    /// The reverse of a maximum-cardinality search over the interaction graph of the conditioned
    /// factors.
    MaxCardinality,

    /// A caller supplied order. Variables it does not mention are eliminated afterwards, in
    /// topological order.
    Explicit(Vec<Variable>)

}


pub struct VariableEliminationEngine {

    /// the CPDs of the model (a 'bag of factors'), reduced by the provided evidence
    factors: Vec<Factor>,

    /// the unobserved `Variable`s of the model, in topological order
    variables: Vec<Variable>,

    /// the strategy used to pick the elimination order of each query
    order: EliminationOrder

}


impl VariableEliminationEngine {

    /// Build an engine answering queries about `model` given `evidence`.
    ///
    /// The evidence is applied once, here; every later query starts from the reduced factors.
    pub fn for_directed(model: &DirectedModel, evidence: &Assignment) -> Self {
        let factors = model.condition(evidence);
        let variables = model.topological_order()
                             .into_iter()
                             .filter(|v| !evidence.contains(v))
                             .collect();

        VariableEliminationEngine { factors, variables, order: EliminationOrder::default() }
    }

    /// Use `order` for subsequent queries
    pub fn with_order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    /// Compute ```P(var = Present | evidence)```
    ///
    /// # Errors
    /// * `DiagnetError::InvalidScope` if `var` is not an unobserved variable of the model
    /// * `DiagnetError::ZeroPartition` if the evidence has zero probability under the model
    pub fn posterior(&self, var: &Variable) -> Result<f64> {
        let query: HashSet<Variable> = std::iter::once(*var).collect();
        let phi = self.infer(&query)?;

        if phi.scope() != vec![*var] {
            return Err(DiagnetError::InvalidScope(format!("the posterior of {} has the wrong scope", var)));
        }

        let mut assn = Assignment::new();
        assn.set(var, State::Present);
        phi.value(&assn)
    }

    /// The full elimination order for this engine's strategy. Query variables are skipped when
    /// the order is run.
    fn elimination_order(&self) -> Vec<Variable> {
        match &self.order {
            EliminationOrder::SymptomsFirst => {
                let (symptoms, diseases): (Vec<Variable>, Vec<Variable>) = self.variables
                                                                               .iter()
                                                                               .partition(|v| v.is_symptom());
                symptoms.into_iter().chain(diseases).collect()
            },
            EliminationOrder::MaxCardinality => max_cardinality_elimination_order(&self.factors, &self.variables),
            EliminationOrder::Explicit(order) => {
                let mut full: Vec<Variable> = order.iter()
                                                   .filter(|v| self.variables.contains(v))
                                                   .cloned()
                                                   .collect();
                let missing: Vec<Variable> = self.variables
                                                 .iter()
                                                 .filter(|v| !full.contains(v))
                                                 .cloned()
                                                 .collect();
                full.extend(missing);
                full
            }
        }
    }

}

/// Compute the preferred elimination order by the max-cardinality heuristic
fn max_cardinality_elimination_order(factors: &[Factor], vars: &[Variable]) -> Vec<Variable> {
    // since we do not explictly hold the graph structure, we need to determine the neighbors of
    // each variable.
    let mut neighbors: HashMap<Variable, HashSet<Variable>> = vars.iter()
                                                                  .map(|v| (*v, HashSet::new()))
                                                                  .collect();

    for f in factors.iter() {
        let scope = f.scope();
        for (i, vi) in scope.iter().enumerate() {
            for vj in scope[i + 1..].iter() {
                if let Some(n) = neighbors.get_mut(vi) {
                    n.insert(*vj);
                }
                if let Some(n) = neighbors.get_mut(vj) {
                    n.insert(*vi);
                }
            }
        }
    }

    // set of marked variables
    let mut marked = HashSet::new();
    // the (reverse) elimination order
    let mut elimination = Vec::with_capacity(vars.len());

    // for |vars| iterations
    for _ in 0..vars.len() {
        let mut idx: Option<(usize, usize)> = None;

        // loop over all variables
        for (vidx, v) in vars.iter().enumerate() {
            // if we have already marked this variable, it is already in the elimination order so
            // we don't process it again
            if marked.contains(v) {
                continue;
            }

            // otherwise, count the number of marked neighbors
            let ct = neighbors[v].iter().filter(|&n| marked.contains(n)).count();

            // if there are more neighbors, update the max index to this variable's index
            match idx {
                Some((_, max)) if ct <= max => (),
                _ => idx = Some((vidx, ct))
            }
        }

        // add the selected variable to the elimination order and marked variable list
        if let Some((i, _)) = idx {
            elimination.push(vars[i]);
            marked.insert(vars[i]);
        }
    }

    // we need to reverse the elimination order before returning
    elimination.reverse();
    elimination
}


impl ConditionalInferenceEngine for VariableEliminationEngine {

    fn infer(&self, variables: &HashSet<Variable>) -> Result<Factor> {
        // check input arguments
        if let Some(v) = variables.iter().find(|v| !self.variables.contains(v)) {
            // a variable requested is not found in the (reduced) model
            return Err(DiagnetError::InvalidScope(format!("{} is observed or not in the model", v)));
        }

        let order = self.elimination_order();
        debug!(variables = order.len(), factors = self.factors.len(), "running variable elimination");

        let mut phis = self.factors.clone();
        for var in order.into_iter() {
            if variables.contains(&var) {
                // we are computing P(var | e), so do not eliminate the variable
                continue;
            }

            // Otherwise, time to get rid of var
            let (phi_1prime, phi_2prime): (Vec<Factor>, Vec<Factor>) = phis
                                           .into_iter()
                                           .partition(|f| f.contains(&var));
            phis = phi_2prime;

            if phi_1prime.is_empty() {
                continue;
            }

            // product step - multiply factors with var
            let psi = phi_1prime.iter()
                                .try_fold(Factor::Identity, |acc, phi| acc.product(phi))?;

            // sum step - marginalize psi over var
            let tau = psi.sum_out(&var)?;

            // a CPD summed over its own child is all ones and contributes nothing
            if !tau.is_unit() {
                phis.push(tau);
            }
        }

        // multiply together remaining phis
        let phi_star = phis.iter()
                           .try_fold(Factor::Identity, |acc, phi| acc.product(phi))?;

        // now we have an unnormalized distribution. We need the partition function to return a
        // conditional probability.
        phi_star.normalize()
    }

}
