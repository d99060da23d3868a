//! Defines a `DirectedModel`, a Bayesian network representing the factorization of a probability
//! distribution P as a product of one CPD per `Variable`.

use crate::factor::Factor;
use crate::init::Initialization;
use crate::util::{DiagnetError, Result};
use crate::variable::{Assignment, Variable};

use bidir_map::BidirMap;
use indexmap::IndexMap;


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// The network is represented as a Directed Acyclic Graph (DAG). A traditional graph data
/// structure is not used for the simple representation of a `DirectedModel`; instead, the
/// Conditional Probability Distribution (CPD) of each `Variable` implicitly defines the edges of
/// the graph. The `Variable`s are held in their topological order to faciliate efficient
/// computations over the graph.
///
/// A `DirectedModel` is immutable once built and can be shared freely between threads.
pub struct DirectedModel {

    /// The `Variable`s comprising the scope of the `DirectedModel` and their associated CPDs. Note
    /// that the `Factor` associated with a `Variable` ```X``` has scope ```[X, Pa(X)...]```, where
    /// ```Pa(X)``` are the parent's of ```X```. Therefore, in the DAG represented by this map,
    /// there are edges ```P -> X forall P in X.scope() where P != X```
    graph: IndexMap<Variable, Factor>,

    /// The user-defined names of each `Variable`. This is a two way lookup ```(`Variable`->Name)```
    /// and ```(Name->`Variable`)```
    names: BidirMap<Variable, String>

}

impl DirectedModel {

    /// Get the `Factor` for the given variable in this model.
    pub fn cpd(&self, v: &Variable) -> Option<&Factor> {
        self.graph.get(v)
    }

    /// All CPDs of the model, in topological order
    pub fn factors(&self) -> impl Iterator<Item = &Factor> {
        self.graph.values()
    }

    /// Get a topological order of the `DirectedModel`
    pub fn topological_order(&self) -> Vec<Variable> {
        self.graph.keys().cloned().collect()
    }

    /// Lookup a `Variable` in the `DirectedModel` based on the name
    pub fn lookup_variable(&self, name: &str) -> Option<&Variable> {
        self.names.get_by_second(&String::from(name))
    }

    /// Lookup a `Variable`'s name in the `DirectedModel`.
    pub fn lookup_name(&self, var: &Variable) -> Option<&String> {
        self.names.get_by_first(var)
    }

    /// Get the number of `Variable`s in the the `DirectedModel`
    pub fn num_variables(&self) -> usize {
        self.graph.len()
    }

    /// The disease `Variable`s, in declaration order
    pub fn diseases(&self) -> Vec<Variable> {
        self.graph.keys().filter(|v| v.is_disease()).cloned().collect()
    }

    /// The symptom `Variable`s, in declaration order
    pub fn symptoms(&self) -> Vec<Variable> {
        self.graph.keys().filter(|v| v.is_symptom()).cloned().collect()
    }

    /// The parents of `var`, in the order they appear in its CPD
    pub fn parents(&self, var: &Variable) -> Vec<Variable> {
        self.graph
            .get(var)
            .map(|cpd| cpd.scope().into_iter().skip(1).collect())
            .unwrap_or_default()
    }

    /// The children of `var`, in topological order
    pub fn children(&self, var: &Variable) -> Vec<Variable> {
        self.graph
            .iter()
            .filter(|(_, cpd)| cpd.scope().iter().skip(1).any(|p| p == var))
            .map(|(v, _)| *v)
            .collect()
    }

    /// Determine the probability of a full `Assignment` to the `Variable`s in the `DirectedModel`.
    ///
    /// Specifically, this computes ```P(zeta)```, where ```zeta``` is a full assignment, by the
    /// chain rule for Bayesian networks.
    pub fn probability(&self, assignment: &Assignment) -> Result<f64> {
        // for every variable in the graph
        self.graph.values()
                  // get the probability of the assignment
                  .map(|cpd| cpd.value(assignment))
                  // and multiply those probability by the chain rule
                  // but if there are any errors, just return the error
                  .try_fold(1.0, |acc, val| val.map(|v| acc * v))
    }

    /// Condition the `DirectedModel` given the evidence.
    ///
    /// # Returns
    /// the CPDs of the model, each reduced by the evidence. Their product is proportional to
    /// ```P(self.vars() - evidence.keys(), evidence)```.
    pub fn condition(&self, evidence: &Assignment) -> Vec<Factor> {
        self.graph.values().map(|cpd| cpd.reduce(evidence)).collect()
    }
}


/// An implementation of the [builder pattern] for creating a `DirectedModel`.
///
/// Models must be assembled in topological order: a `Variable`'s parents are added before it.
///
/// [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern
pub struct DirectedModelBuilder {

    /// The `Variable`s and their associated CPDs
    factors: IndexMap<Variable, Factor>,

    /// The names of each `Variable`
    names: BidirMap<Variable, String>,

    /// The error state of the builder
    err: Option<DiagnetError>

}


impl Default for DirectedModelBuilder {
    fn default() -> Self {
        DirectedModelBuilder::new()
    }
}


impl DirectedModelBuilder {

    /// Construct a new `DirectedModelBuilder` representing an empty `DirectedModel`
    pub fn new() -> Self {
        DirectedModelBuilder {
            factors: IndexMap::new(),
            names: BidirMap::new(),
            err: None
        }
    }


    /// Add an anonymous `Variable` to the `DirectedModel`.
    ///
    /// # Args
    /// * `var`: the variable to add to the model
    /// * `parents`: the parent variables. The parents must already be in the model.
    /// * `init`: the initialization mechanism for the CPD of `var` in the model.
    pub fn with_variable(
        self,
        var: &Variable,
        parents: Vec<Variable>,
        init: Initialization,
    ) -> Self {
        self.add_variable(var, var.to_string(), parents, init)
    }


    /// Add a named `Variable` to the `DirectedModel`.
    ///
    /// # Args
    /// * `var`: the variable to add to the model
    /// * `name`: the name for the variable. Names must be unique within a model.
    /// * `parents`: the parent variables. The parents must already be in the model.
    /// * `init`: the initialization mechanism for the CPD of `var` in the model.
    pub fn with_named_variable(
        self,
        var: &Variable,
        name: &str,
        parents: Vec<Variable>,
        init: Initialization,
    ) -> Self {
        self.add_variable(var, String::from(name), parents, init)
    }


    /// Complete building the model.
    ///
    /// # Returns
    /// the `DirectedModel`, or the first error generated during the building process
    pub fn build(self) -> Result<DirectedModel> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(DirectedModel { graph: self.factors, names: self.names })
        }
    }

    /// Internal function that acutally does the variable addition to the model
    fn add_variable(
        mut self,
        var: &Variable,
        name: String,
        parents: Vec<Variable>,
        init: Initialization,
    ) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Check for error conditions
        if let Some(p) = parents.iter().find(|v| !self.factors.contains_key(*v)) {
            self.err = Some(DiagnetError::MissingParent(format!("{} is not in the model yet", p)));
            return self;
        }

        if self.factors.contains_key(var) {
            self.err = Some(DiagnetError::DuplicateVariable(format!("{} was added twice", var)));
            return self;
        }

        if self.names.contains_second_key(&name) {
            self.err = Some(DiagnetError::DuplicateVariable(format!("the name {} is already taken", name)));
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the factor based on the initialization
        match init.build_cpd(*var, parents) {
            Ok(factor) => {
                ///////////////////////////////////////////////////////////////
                // 4) Add to current model
                self.factors.insert(*var, factor);
                self.names.insert(*var, name);
            },
            Err(e) => {
                self.err = Some(e);
            }
        }

        self
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::variable::State;

    #[test]
    fn build_empty() {
        let model = DirectedModelBuilder::new().build().unwrap();

        assert_eq!(model.num_variables(), 0);
        assert!(model.topological_order().is_empty());
    }


    #[test]
    /// Tests building a model with a single, named binary variable
    fn build_named_simple() {
        let v = Variable::disease();
        let model = DirectedModelBuilder::new()
                     .with_named_variable(&v, "foo", vec![], Initialization::Binomial(0.25))
                     .build()
                     .unwrap();

        assert_eq!(1, model.num_variables());
        let name = model.lookup_name(&v).unwrap();
        assert_eq!(name, "foo");
        assert_eq!(&v, model.lookup_variable("foo").unwrap());
        assert!(model.lookup_variable("bar").is_none());

        let f = model.cpd(&v).unwrap();
        assert!(f.is_cpd());
        assert_eq!(vec![v], f.scope());
        assert_eq!(vec![0.25, 0.75], f.values());
    }


    #[test]
    fn build_anonymous() {
        let v = Variable::disease();
        let model = DirectedModelBuilder::new()
                     .with_variable(&v, vec![], Initialization::Binomial(0.5))
                     .build()
                     .unwrap();

        assert_eq!(&v.to_string(), model.lookup_name(&v).unwrap());
    }


    #[test]
    fn build_errors() {
        let d = Variable::disease();
        let s = Variable::symptom();
        let leaky = || Initialization::LeakyOr { specificity: 0.9, leak: 0.1 };

        // parent added after the child
        let res = DirectedModelBuilder::new()
                   .with_named_variable(&s, "s", vec![d], leaky())
                   .with_named_variable(&d, "d", vec![], Initialization::Binomial(0.1))
                   .build();
        match res {
            Err(DiagnetError::MissingParent(_)) => (),
            other => panic!("unexpected result {:?}", other.map(|m| m.num_variables()))
        };

        // same variable twice
        let res = DirectedModelBuilder::new()
                   .with_named_variable(&d, "d", vec![], Initialization::Binomial(0.1))
                   .with_named_variable(&d, "e", vec![], Initialization::Binomial(0.1))
                   .build();
        assert!(matches!(res, Err(DiagnetError::DuplicateVariable(_))));

        // same name twice
        let res = DirectedModelBuilder::new()
                   .with_named_variable(&d, "d", vec![], Initialization::Binomial(0.1))
                   .with_named_variable(&Variable::disease(), "d", vec![], Initialization::Binomial(0.1))
                   .build();
        assert!(matches!(res, Err(DiagnetError::DuplicateVariable(_))));

        // the first error wins
        let res = DirectedModelBuilder::new()
                   .with_named_variable(&d, "d", vec![], Initialization::Binomial(2.0))
                   .with_named_variable(&d, "d", vec![], Initialization::Binomial(0.1))
                   .build();
        assert!(matches!(res, Err(DiagnetError::InvalidInitialization(_))));
    }


    #[test]
    fn adjacency() {
        let d1 = Variable::disease();
        let d2 = Variable::disease();
        let s1 = Variable::symptom();
        let s2 = Variable::symptom();
        let leaky = || Initialization::LeakyOr { specificity: 0.8, leak: 0.1 };

        let model = DirectedModelBuilder::new()
                     .with_named_variable(&d1, "d1", vec![], Initialization::Binomial(0.1))
                     .with_named_variable(&d2, "d2", vec![], Initialization::Binomial(0.2))
                     .with_named_variable(&s1, "s1", vec![d1, d2], leaky())
                     .with_named_variable(&s2, "s2", vec![d2], leaky())
                     .build()
                     .unwrap();

        assert_eq!(vec![d1, d2], model.diseases());
        assert_eq!(vec![s1, s2], model.symptoms());
        assert_eq!(vec![d1, d2], model.parents(&s1));
        assert!(model.parents(&d1).is_empty());
        assert_eq!(vec![s1, s2], model.children(&d2));
        assert_eq!(vec![s1], model.children(&d1));
        assert!(model.children(&s1).is_empty());
    }


    #[test]
    /// Tests the chain rule and conditioning on a two variable network
    fn probability_and_condition() {
        let d = Variable::disease();
        let s = Variable::symptom();

        let model = DirectedModelBuilder::new()
                     .with_named_variable(&d, "D", vec![], Initialization::Binomial(0.3))
                     .with_named_variable(&s, "S", vec![d], Initialization::LeakyOr { specificity: 0.9, leak: 0.2 })
                     .build()
                     .unwrap();

        let cases = [
            (State::Present, State::Present, 0.3 * 0.9),
            (State::Present, State::Absent, 0.3 * (1.0 - 0.9)),
            (State::Absent, State::Present, 0.7 * 0.2),
            (State::Absent, State::Absent, 0.7 * 0.8),
        ];
        for &(ds, ss, expected) in cases.iter() {
            let mut a = Assignment::new();
            a.set(&d, ds);
            a.set(&s, ss);
            assert!((model.probability(&a).unwrap() - expected).abs() < 1e-12);
        }

        // test partial assignment
        let mut a = Assignment::new();
        a.set(&d, State::Present);
        assert!(model.probability(&a).is_err());

        // conditioning on the symptom leaves a prior over D and a likelihood over D
        let mut evidence = Assignment::new();
        evidence.set(&s, State::Present);
        let factors = model.condition(&evidence);
        assert_eq!(2, factors.len());
        assert_eq!(vec![d], factors[1].scope());
        assert!((factors[1].values()[0] - 0.9).abs() < 1e-12);
        assert!((factors[1].values()[1] - 0.2).abs() < 1e-12);
    }
}
