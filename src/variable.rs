//! Definition of the variable module
//!
//! A `Variable` represents a binary random variable in the diagnosis network: either a disease or
//! a symptom. Every `Variable` takes one of the two `State`s, always ordered ```(Present, Absent)```
//! so that factor tables are unambiguous.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Source of unique `Variable` ids
static NEXT_ID: AtomicUsize = AtomicUsize::new(0);


/// The role a `Variable` plays in the network. Diseases are roots, symptoms are their children.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Disease,
    Symptom,
}


/// The domain of every `Variable`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum State {
    Present,
    Absent,
}

impl State {

    /// All states, in domain order
    pub const ALL: [State; 2] = [State::Present, State::Absent];

    /// The index of this state in a factor table axis
    pub fn index(self) -> usize {
        match self {
            State::Present => 0,
            State::Absent => 1,
        }
    }

    /// The state stored at the given axis index
    pub fn from_index(idx: usize) -> Option<State> {
        State::ALL.get(idx).copied()
    }

}


/// A binary random variable.
///
/// `Variable`s are lightweight, `Copy` handles. They carry no name; the model holding them maps
/// names to handles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable {
    id: usize,
    role: Role,
}

impl Variable {

    /// Construct a new disease `Variable`
    pub fn disease() -> Self {
        Variable::new(Role::Disease)
    }

    /// Construct a new symptom `Variable`
    pub fn symptom() -> Self {
        Variable::new(Role::Symptom)
    }

    fn new(role: Role) -> Self {
        Variable { id: NEXT_ID.fetch_add(1, Ordering::Relaxed), role }
    }

    /// The role of this `Variable` in the network
    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_disease(&self) -> bool {
        self.role == Role::Disease
    }

    pub fn is_symptom(&self) -> bool {
        self.role == Role::Symptom
    }

    /// The number of values this `Variable` can take
    pub fn cardinality(&self) -> usize {
        State::ALL.len()
    }

}

impl fmt::Display for Variable {

    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.role {
            Role::Disease => write!(f, "D{}", self.id),
            Role::Symptom => write!(f, "S{}", self.id),
        }
    }

}


/// A (partial or complete) assignment of `State`s to `Variable`s
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Assignment {
    values: HashMap<Variable, State>,
}

impl Assignment {

    pub fn new() -> Self {
        Assignment { values: HashMap::new() }
    }

    /// Assign `state` to `var`, replacing any previous assignment
    pub fn set(&mut self, var: &Variable, state: State) {
        self.values.insert(*var, state);
    }

    pub fn get(&self, var: &Variable) -> Option<&State> {
        self.values.get(var)
    }

    pub fn contains(&self, var: &Variable) -> bool {
        self.values.contains_key(var)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &State)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

}


/// Enumerate every complete `Assignment` to `scope`.
///
/// Assignments are produced in table order: the first `Variable` of the scope varies slowest and
/// `Present` comes before `Absent`.
pub fn all_assignments(scope: &[Variable]) -> impl Iterator<Item = Assignment> + '_ {
    let total: usize = scope.iter().map(|v| v.cardinality()).product();

    (0..total).map(move |flat| {
        let mut assn = Assignment::new();
        let mut rem = flat;
        for v in scope.iter().rev() {
            let card = v.cardinality();
            assn.set(v, State::ALL[rem % card]);
            rem /= card;
        }
        assn
    })
}
