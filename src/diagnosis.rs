//! Ranks diseases for a set of observed symptoms, by symptom overlap and by posterior probability
//! in the diagnosis network.

use crate::inference::VariableEliminationEngine;
use crate::knowledge::{extract_symptoms, Evidence, KnowledgeBase};
use crate::network::Network;
use crate::util::{ErrorKind, Result};
use crate::variable::Assignment;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, warn};


/// Message sent with a completed analysis
pub const ANALYSIS_COMPLETE: &str = "Analysis completed successfully";

/// Message sent when the text mentions no known symptom
pub const NO_SYMPTOMS: &str = "No symptoms detected";


/// Round `x` to `places` decimal places
pub fn round(x: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (x * scale).round() / scale
}


/// Scores per disease.
///
/// A `ScoreTable` is read (and serialized) ranked: highest score first, ties in knowledge base
/// declaration order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreTable {

    /// the scores, in knowledge base declaration order
    scores: IndexMap<String, f64>

}


impl ScoreTable {

    /// Build a `ScoreTable` from scores given in declaration order
    pub fn from_scores<I: IntoIterator<Item = (String, f64)>>(scores: I) -> Self {
        ScoreTable { scores: scores.into_iter().collect() }
    }

    pub fn get(&self, disease: &str) -> Option<f64> {
        self.scores.get(disease).cloned()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// The scores, highest first
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self.scores
                                               .iter()
                                               .map(|(k, v)| (k.as_str(), *v))
                                               .collect();

        // sort_by is stable, so ties stay in declaration order
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        ranked
    }

    /// A copy with every score rounded to `places` decimal places
    pub fn rounded(&self, places: i32) -> Self {
        ScoreTable::from_scores(self.scores.iter().map(|(k, v)| (k.clone(), round(*v, places))))
    }

}


impl Serialize for ScoreTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let ranked = self.ranked();
        let mut map = serializer.serialize_map(Some(ranked.len()))?;
        for (disease, score) in ranked.iter() {
            map.serialize_entry(disease, score)?;
        }
        map.end()
    }
}


/// Compute ```P(disease = Present | evidence)``` for every disease of the `network`.
///
/// Evidence about names that are not symptoms of the network is ignored. A disease whose
/// posterior cannot be normalized (the evidence is impossible under the model) is left out of the
/// table; any other failure is returned.
pub fn run_inference(network: &Network, evidence: &Evidence) -> Result<ScoreTable> {
    let mut assignment = Assignment::new();
    for (symptom, state) in evidence.iter() {
        match network.lookup_variable(symptom) {
            Some(var) if var.is_symptom() => assignment.set(var, *state),
            _ => debug!(symptom = %symptom, "ignoring unknown symptom")
        }
    }

    let engine = VariableEliminationEngine::for_directed(network, &assignment);
    let mut scores = Vec::new();

    for disease in network.diseases() {
        let name = network.lookup_name(&disease)
                          .cloned()
                          .unwrap_or_else(|| disease.to_string());

        match engine.posterior(&disease) {
            Ok(p) => scores.push((name, p)),
            Err(e) if e.kind() == ErrorKind::Numeric => {
                warn!(disease = %name, error = %e, "skipping disease");
            },
            Err(e) => return Err(e)
        }
    }

    Ok(ScoreTable::from_scores(scores))
}


/// Score each disease by the fraction of its symptoms observed present, rounded to two decimals.
/// Diseases with no observed symptom are left out.
pub fn rule_based_score(evidence: &Evidence, kb: &KnowledgeBase) -> ScoreTable {
    let observed: HashSet<&str> = evidence.present().map(|s| s.as_str()).collect();

    ScoreTable::from_scores(kb.iter().filter_map(|d| {
        let matches = d.symptoms.iter().filter(|s| observed.contains(s.as_str())).count();
        if matches > 0 {
            Some((d.name.clone(), round(matches as f64 / d.symptoms.len() as f64, 2)))
        } else {
            None
        }
    }))
}


/// The result of analysing one message
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Diagnosis {

    /// the symptoms found in the text, in order, repeats included
    pub symptoms: Vec<String>,

    pub rule_based: ScoreTable,

    /// posterior probabilities, rounded to two decimals
    pub bayesian: ScoreTable,

    pub message: String

}


impl Diagnosis {

    /// The response for a text with no known symptom
    pub fn no_symptoms() -> Self {
        Diagnosis {
            symptoms: vec![],
            rule_based: ScoreTable::default(),
            bayesian: ScoreTable::default(),
            message: String::from(NO_SYMPTOMS)
        }
    }

}


/// Analyse a free text description of symptoms
pub fn diagnose(text: &str, kb: &KnowledgeBase, network: &Network) -> Result<Diagnosis> {
    let symptoms = extract_symptoms(text, kb);
    if symptoms.is_empty() {
        return Ok(Diagnosis::no_symptoms());
    }

    let evidence = Evidence::from_symptoms(&symptoms);
    let rule_based = rule_based_score(&evidence, kb);
    let bayesian = run_inference(network, &evidence)?.rounded(2);

    Ok(Diagnosis { symptoms, rule_based, bayesian, message: String::from(ANALYSIS_COMPLETE) })
}
