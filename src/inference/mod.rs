//! Defines the interface to inference engines

use crate::factor::Factor;
use crate::util::Result;
use crate::variable::Variable;

use std::collections::HashSet;

mod variable_elimination;

pub use self::variable_elimination::{EliminationOrder, VariableEliminationEngine};


/// A `ConditionalInferenceEngine` is capable of answering Conditional Probability Queries of the form:
///     ```P(Y | E = e)```
///
/// `ConditionalInferenceEngine`s take the evidence `e` as an argument to whatever construction
/// mechanism they employ, and may then answer any number of queries about it.
pub trait ConditionalInferenceEngine {

    /// Infer the joint distribution ```P(variables | evidence)```
    fn infer(&self, variables: &HashSet<Variable>) -> Result<Factor>;

}
