//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of `Variable`s: a function from each
//! joint assignment of its scope to a non-negative real.
//!
//! # Table layout
//! The table is indexed big-endian over the scope: the first `Variable` varies slowest, and along
//! each axis `State::Present` (index 0) precedes `State::Absent` (index 1). `Factor::values`
//! returns the table flattened in exactly that order.

use crate::util::{DiagnetError, Result};
use crate::variable::{Assignment, State, Variable};

use itertools::Itertools;
use ndarray::prelude as nd;

/// Alias f64 ndarray::Array as Table
pub type Table = nd::ArrayD<f64>;

/// Slack allowed when checking that a CPD column sums to one
const CPD_TOLERANCE: f64 = 1e-9;

/// Slack allowed when deciding that a factor is the multiplicative identity
const UNIT_TOLERANCE: f64 = 1e-12;


#[derive(Clone, Debug)]
pub enum Factor {
    /// The empty, identity `Factor` with no scope. This type exists for dealing with arithmetic
    /// operations of `Factor`s
    Identity,

    /// A `Factor` over some scope of variables. Represented as a table-CPD as described in Koller
    /// & Friedman. An empty scope holds a single scalar.
    TableFactor {
        /// The scope of the `Factor`
        scope: Vec<Variable>,

        /// The values of the `Factor` table.
        table: Table,

        /// `true`, if the `Factor` is a conditional probability distribution (i.e. is normalized
        /// over the first variable of its scope)
        cpd: bool
    }
}


impl Factor {

    /// Get the identity factor
    pub fn identity() -> Self {
        Factor::Identity
    }


    /// Create a new `Factor`
    ///
    /// # Errors
    /// * `DiagnetError::DuplicateVariable` if a `Variable` appears twice in the scope
    /// * `DiagnetError::InvalidScope` if the table's shape does not match the scope
    /// * `DiagnetError::InvalidInitialization` if the table holds negative or non-finite values
    pub fn new(scope: Vec<Variable>, table: Table) -> Result<Self> {
        validate(&scope, &table)?;
        Ok(Factor::TableFactor { scope, table, cpd: false })
    }


    /// Create a new `Factor` from values laid out in table order
    pub fn from_values(scope: Vec<Variable>, values: Vec<f64>) -> Result<Self> {
        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();
        let table = Table::from_shape_vec(nd::IxDyn(&shape), values)
            .map_err(|e| DiagnetError::InvalidScope(e.to_string()))?;

        Factor::new(scope, table)
    }


    /// Create a conditional probability distribution ```P(var | parents)```.
    ///
    /// The scope of the resulting `Factor` is ```[var, parents...]```, so the table's first axis
    /// is `var`. For every assignment to the parents, the entries along that axis must sum to one.
    ///
    /// # Errors
    /// * any error of `Factor::new`
    /// * `DiagnetError::NotACPD` if some column does not sum to one
    pub fn cpd(var: Variable, parents: Vec<Variable>, table: Table) -> Result<Self> {
        let mut scope = Vec::with_capacity(parents.len() + 1);
        scope.push(var);
        scope.extend(parents);

        validate(&scope, &table)?;

        let sums = table.sum_axis(nd::Axis(0));
        if sums.iter().any(|s| (s - 1.0).abs() > CPD_TOLERANCE) {
            return Err(DiagnetError::NotACPD(format!("columns of the CPD for {} do not sum to one", var)));
        }

        Ok(Factor::TableFactor { scope, table, cpd: true })
    }


    /// Create a `Factor` with an empty scope holding a single value
    pub fn scalar(value: f64) -> Self {
        Factor::TableFactor {
            scope: vec![],
            table: Table::from_elem(nd::IxDyn(&[]), value),
            cpd: false
        }
    }


    /// Check if the `Factor` is the identity `Factor`
    pub fn is_identity(&self) -> bool {
        matches!(self, Factor::Identity)
    }


    /// Check if the `Factor` is a Conditional Probability Distribution - i.e. if the values in the
    /// `Factor` are normalized.
    ///
    /// # Note
    /// The identity `Factor` is considered a CPD.
    pub fn is_cpd(&self) -> bool {
        match self {
            Factor::Identity => true,
            Factor::TableFactor { cpd, .. } => *cpd
        }
    }


    /// Retrieve the scope of the `Factor`.
    ///
    /// # Note
    /// This method returns a clone of the `Factor`'s scope. `Variable`'s are lightweight and
    /// therefore this is an acceptable overhead
    pub fn scope(&self) -> Vec<Variable> {
        match self {
            Factor::Identity => vec![],
            Factor::TableFactor { scope, .. } => scope.clone()
        }
    }


    /// Check if `var` is in the scope of this `Factor`
    pub fn contains(&self, var: &Variable) -> bool {
        match self {
            Factor::Identity => false,
            Factor::TableFactor { scope, .. } => scope.contains(var)
        }
    }


    /// The table flattened in table order. The identity `Factor` is the scalar one.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Factor::Identity => vec![1.0],
            Factor::TableFactor { table, .. } => table.iter().cloned().collect()
        }
    }


    /// `true` if every entry is one, i.e. multiplying by this `Factor` changes nothing
    pub fn is_unit(&self) -> bool {
        match self {
            Factor::Identity => true,
            Factor::TableFactor { table, .. } => table.iter().all(|v| (v - 1.0).abs() <= UNIT_TOLERANCE)
        }
    }


    /// Retrieve the value for a complete assignment over the scope of this `Factor`
    ///
    /// # Args
    /// * `assignment`: a full assignment to the scope of a `Factor`. The assignment's scope may be
    ///   a superset of the `Factor`s scope.
    ///
    /// # Errors
    /// * `DiagnetError::IncompleteAssignment`, if assignment is not a complete assignment to the
    ///   scope of the `Factor`
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        match self {
            Factor::Identity => Ok(1.0),
            Factor::TableFactor { scope, table, .. } => {
                let idxs = scope.iter()
                                .map(|v| assignment.get(v).map(|s| s.index()))
                                .collect::<Option<Vec<usize>>>()
                                .ok_or(DiagnetError::IncompleteAssignment)?;

                Ok(table[nd::IxDyn(&idxs)])
            }
        }
    }


    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1
    ///
    /// # Returns
    /// A new `Factor` of scope ```union(self.scope(), other.scope())```, ordered as this
    /// `Factor`'s scope followed by the variables only `other` has. Disjoint scopes are allowed.
    pub fn product(&self, other: &Self) -> Result<Self> {
        // Factor::Identity is the multiplicative identity
        let (my_scope, my_table) = match self {
            Factor::Identity => return Ok(other.clone()),
            Factor::TableFactor { scope, table, .. } => (scope, table)
        };
        let (other_scope, other_table) = match other {
            Factor::Identity => return Ok(self.clone()),
            Factor::TableFactor { scope, table, .. } => (scope, table)
        };

        // We are computing a new factor Psi(X, Y, Z) = phi1(X, Y) * phi2(Y, Z).
        // See Koller & Friedman Definition 4.2
        let new_scope: Vec<Variable> = my_scope.iter()
                                               .chain(other_scope.iter())
                                               .unique()
                                               .cloned()
                                               .collect();
        let shape: Vec<usize> = new_scope.iter().map(|v| v.cardinality()).collect();

        let lhs: Vec<f64> = my_table.iter().cloned().collect();
        let rhs: Vec<f64> = other_table.iter().cloned().collect();
        let lhs_strides = strides_within(&new_scope, my_scope);
        let rhs_strides = strides_within(&new_scope, other_scope);

        // walk the new table in order, moving through both inputs with an odometer over the
        // new scope
        let total: usize = shape.iter().product();
        let mut values = Vec::with_capacity(total);
        let mut counter = vec![0; shape.len()];
        let (mut i, mut j) = (0, 0);

        for _ in 0..total {
            values.push(lhs[i] * rhs[j]);

            for k in (0..shape.len()).rev() {
                counter[k] += 1;
                i += lhs_strides[k];
                j += rhs_strides[k];
                if counter[k] < shape[k] {
                    break;
                }

                counter[k] = 0;
                i -= lhs_strides[k] * shape[k];
                j -= rhs_strides[k] * shape[k];
            }
        }

        let table = Table::from_shape_vec(nd::IxDyn(&shape), values)
            .map_err(|e| DiagnetError::InvalidScope(e.to_string()))?;

        Ok(Factor::TableFactor { scope: new_scope, table, cpd: false })
    }


    /// Restrict the `Factor` to the entries consistent with ```var = state```, removing `var` from
    /// the scope.
    ///
    /// Defined in Koller & Friedman 4.2.3
    ///
    /// # Errors
    /// * `DiagnetError::InvalidScope` if `var` is not in the scope of this `Factor`
    pub fn restrict(&self, var: &Variable, state: State) -> Result<Self> {
        if !self.contains(var) {
            return Err(DiagnetError::InvalidScope(format!("{} is not in the scope of the factor", var)));
        }

        let mut assn = Assignment::new();
        assn.set(var, state);
        Ok(self.reduce(&assn))
    }


    /// Reduce the `Factor` over the given partial assignment. Assigned variables outside of the
    /// scope are ignored.
    pub fn reduce(&self, assignment: &Assignment) -> Self {
        match self {
            Factor::Identity => Factor::Identity,
            Factor::TableFactor { scope, table, cpd } => {
                if !scope.iter().any(|v| assignment.contains(v)) {
                    // empty assignment (relative to scope)
                    return self.clone();
                }

                let mut reduced = table.clone();
                let mut new_scope = Vec::with_capacity(scope.len());

                // remove axes from the back so that earlier axis indices stay valid
                for (i, v) in scope.iter().enumerate().rev() {
                    if let Some(state) = assignment.get(v) {
                        reduced = reduced.index_axis_move(nd::Axis(i), state.index());
                    } else {
                        new_scope.push(*v);
                    }
                }
                new_scope.reverse();

                // reducing only parents of a CPD leaves a CPD over the child
                let still_cpd = *cpd && !assignment.contains(&scope[0]);

                Factor::TableFactor { scope: new_scope, table: reduced, cpd: still_cpd }
            }
        }
    }


    /// Sum `var` out of the `Factor`
    ///
    /// Defined in Koller & Friedman 9.3.1
    ///
    /// # Errors
    /// * `DiagnetError::InvalidScope` if `var` is not in the scope of this `Factor`
    pub fn sum_out(&self, var: &Variable) -> Result<Self> {
        match self {
            Factor::TableFactor { scope, table, .. } => {
                let idx = scope.iter()
                               .position(|v| v == var)
                               .ok_or_else(|| DiagnetError::InvalidScope(
                                   format!("cannot sum out {}, it is not in the scope of the factor", var)
                               ))?;

                let new_table = table.sum_axis(nd::Axis(idx));
                let new_scope = scope.iter().filter(|&v| v != var).cloned().collect();

                Ok(Factor::TableFactor { scope: new_scope, table: new_table, cpd: false })
            },
            Factor::Identity => {
                Err(DiagnetError::InvalidScope(format!("cannot sum {} out of the identity factor", var)))
            }
        }
    }


    /// Divide every entry by the sum of all entries
    ///
    /// # Errors
    /// * `DiagnetError::ZeroPartition` if the total mass is not a positive, finite number
    pub fn normalize(&self) -> Result<Self> {
        match self {
            Factor::Identity => Ok(Factor::Identity),
            Factor::TableFactor { scope, table, .. } => {
                let z = table.sum();
                if !z.is_finite() || z <= f64::MIN_POSITIVE {
                    return Err(DiagnetError::ZeroPartition(z));
                }

                Ok(Factor::TableFactor { scope: scope.clone(), table: table.mapv(|v| v / z), cpd: true })
            }
        }
    }

}


/// Check the invariants shared by every table `Factor`
fn validate(scope: &[Variable], table: &Table) -> Result<()> {
    if scope.iter().unique().count() != scope.len() {
        return Err(DiagnetError::DuplicateVariable(String::from("a factor scope lists a variable twice")));
    }

    if scope.len() != table.ndim() {
        return Err(DiagnetError::InvalidScope(
            String::from("cardinality of scope must match number of table dimensions")
        ));
    }

    if scope.iter().map(|v| v.cardinality()).ne(table.shape().iter().cloned()) {
        return Err(DiagnetError::InvalidScope(String::from("table dimensions do not match the scope")));
    }

    // factors may not have negative values
    if table.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(DiagnetError::InvalidInitialization(
            String::from("factor values must be finite and non-negative")
        ));
    }

    Ok(())
}


/// For each variable of `scope`, the stride of that variable in a table laid out over `sub`, or 0
/// if `sub` does not mention it.
fn strides_within(scope: &[Variable], sub: &[Variable]) -> Vec<usize> {
    let mut own = vec![0; sub.len()];
    let mut acc = 1;
    for (k, v) in sub.iter().enumerate().rev() {
        own[k] = acc;
        acc *= v.cardinality();
    }

    scope.iter()
         .map(|v| sub.iter().position(|w| w == v).map_or(0, |k| own[k]))
         .collect()
}
