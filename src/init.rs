//! Module containing initialization routines for the parameters of a model.

use crate::factor::{Factor, Table};
use crate::util::{DiagnetError, Result};
use crate::variable::{State, Variable};

use ndarray::prelude as nd;

/// Defines possible ways to initialize a `Variable`s CPD.
#[derive(Clone, Debug)]
pub enum Initialization {

    /// Initialize the CPD as a Binomial distribution with ```P(Present) = p```.
    /// Note that this `Initialization` is valid only for a `Variable` with no parents.
    Binomial(f64),

    /// A leaky, noisy-OR style CPD. The child is present with probability `specificity` whenever
    /// at least one parent is present, and with probability `leak` when every parent is absent.
    /// Only whether *any* parent is present matters, not which.
    LeakyOr {
        specificity: f64,
        leak: f64
    },

    /// User defined CPD
    Table(Factor)
}


impl Initialization {

    /// Construct a CPD, initialized based on ```self```
    ///
    /// # Args
    /// * `var`: the child `Variable` of the CPD
    /// * `parents`: the parents of `var`, in the order they appear in the CPD's scope
    ///
    /// # Returns
    /// a `Factor` with scope ```[var, parents...]```
    pub fn build_cpd(self, var: Variable, parents: Vec<Variable>) -> Result<Factor> {
        match self {
            // if this is a user defined factor, it just needs to be verified and returned
            Initialization::Table(f) => {
                if !f.is_cpd() {
                    return Err(DiagnetError::InvalidInitialization(format!("the table for {} is not a CPD", var)));
                }

                let s = f.scope();
                if s.first() == Some(&var) && s[1..] == parents[..] {
                    Ok(f)
                } else {
                    Err(DiagnetError::InvalidScope(format!("the table for {} does not match its parents", var)))
                }
            },

            Initialization::Binomial(p) => {
                if !parents.is_empty() {
                    return Err(DiagnetError::InvalidInitialization(
                        format!("a binomial prior for {} cannot have parents", var)
                    ));
                }
                check_probability(var, p)?;

                Factor::cpd(var, parents, nd::arr1(&[p, 1.0 - p]).into_dyn())
            },

            Initialization::LeakyOr { specificity, leak } => {
                if parents.is_empty() {
                    return Err(DiagnetError::InvalidInitialization(
                        format!("a leaky-or CPD for {} needs at least one parent", var)
                    ));
                }
                check_probability(var, specificity)?;
                check_probability(var, leak)?;

                let table = leaky_or_table(parents.len(), specificity, leak)?;
                Factor::cpd(var, parents, table)
            }
        }
    }

}


fn check_probability(var: Variable, p: f64) -> Result<()> {
    if p > 0.0 && p < 1.0 {
        Ok(())
    } else {
        Err(DiagnetError::InvalidInitialization(format!("probability {} for {} is not in (0, 1)", p, var)))
    }
}


/// The column of a CPD table that holds the parent assignment encoded by `bits`.
///
/// Bit ```j``` of `bits` is 1 when parent ```j``` is present. Columns are laid out big-endian over
/// the parents with `State::Present` first, so a present parent contributes index 0 on its axis.
pub fn parent_column(bits: usize, n: usize) -> usize {
    (0..n).fold(0, |col, j| {
        let state = if (bits >> j) & 1 == 1 { State::Present } else { State::Absent };
        col * 2 + state.index()
    })
}


/// Build the table of a leaky-or CPD over ```[child, parent_0, ..., parent_{n-1}]```.
///
/// Every parent assignment is enumerated as a bit-vector ```i in 0..2^n```; the first half of the
/// table is the child present, the second half the child absent.
fn leaky_or_table(n: usize, specificity: f64, leak: f64) -> Result<Table> {
    let rows = 1usize << n;
    let mut values = vec![0.0; 2 * rows];

    for i in 0..rows {
        let p = if i != 0 { specificity } else { leak };
        let col = parent_column(i, n);
        values[col] = p;
        values[rows + col] = 1.0 - p;
    }

    let shape = vec![State::ALL.len(); n + 1];
    Table::from_shape_vec(nd::IxDyn(&shape), values).map_err(|e| DiagnetError::InvalidInitialization(e.to_string()))
}
