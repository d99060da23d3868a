//! The disease/symptom knowledge base, the evidence observed against it, and the tokenizer that
//! turns free text into evidence.

use crate::util::{DiagnetError, Result};
use crate::variable::State;

use indexmap::{IndexMap, IndexSet};
use regex::Regex;

use std::sync::OnceLock;


/// A disease known to the `KnowledgeBase`
#[derive(Clone, Debug, PartialEq)]
pub struct Disease {

    /// unique identifier, also the label used in score tables
    pub name: String,

    /// ```P(disease = Present)``` before any symptom is observed
    pub prior: f64,

    /// the symptoms the disease causes, in declaration order
    pub symptoms: IndexSet<String>

}


impl Disease {

    pub fn new(name: &str, prior: f64, symptoms: &[&str]) -> Self {
        Disease {
            name: String::from(name),
            prior,
            symptoms: symptoms.iter().map(|s| String::from(*s)).collect()
        }
    }

}


/// An ordered, immutable table of diseases and the symptoms they cause.
///
/// Every symptom in the universe is caused by at least one disease, since the universe is
/// derived from the disease table itself.
#[derive(Clone, Debug)]
pub struct KnowledgeBase {
    diseases: IndexMap<String, Disease>
}


impl KnowledgeBase {

    /// Build a `KnowledgeBase` from diseases in declaration order.
    ///
    /// # Errors
    /// `DiagnetError::InvalidKnowledgeBase` on duplicate disease names, priors outside of
    /// ```(0, 1)```, diseases without symptoms, or a symptom sharing a name with a disease.
    pub fn new(diseases: Vec<Disease>) -> Result<Self> {
        let mut table = IndexMap::with_capacity(diseases.len());

        for d in diseases.into_iter() {
            if !(d.prior > 0.0 && d.prior < 1.0) {
                return Err(DiagnetError::InvalidKnowledgeBase(
                    format!("prior {} of {} is not in (0, 1)", d.prior, d.name)
                ));
            }

            if d.symptoms.is_empty() {
                return Err(DiagnetError::InvalidKnowledgeBase(format!("{} has no symptoms", d.name)));
            }

            if table.contains_key(&d.name) {
                return Err(DiagnetError::InvalidKnowledgeBase(format!("{} is declared twice", d.name)));
            }

            table.insert(d.name.clone(), d);
        }

        let kb = KnowledgeBase { diseases: table };
        if let Some(s) = kb.symptoms().into_iter().find(|s| kb.diseases.contains_key(s)) {
            return Err(DiagnetError::InvalidKnowledgeBase(format!("{} is both a disease and a symptom", s)));
        }

        Ok(kb)
    }

    /// The built-in twenty disease table
    pub fn standard() -> Result<Self> {
        KnowledgeBase::new(vec![
            Disease::new("Flu", 0.10, &["fever", "cough", "sore throat", "fatigue", "headache"]),
            Disease::new("Common Cold", 0.15, &["cough", "sore throat", "runny nose", "mild fever"]),
            Disease::new("COVID-19", 0.05, &["fever", "cough", "loss of taste", "loss of smell", "shortness of breath"]),
            Disease::new("Malaria", 0.01, &["fever", "night sweats", "chills", "fatigue", "vomiting"]),
            Disease::new("Dengue", 0.01, &["fever", "rash", "joint pain", "headache", "nausea"]),
            Disease::new("Food Poisoning", 0.07, &["nausea", "vomiting", "diarrhea", "abdominal pain"]),
            Disease::new("Pneumonia", 0.03, &["fever", "chest pain", "cough", "shortness of breath"]),
            Disease::new("Migraine", 0.10, &["headache", "nausea", "sensitivity to light", "fatigue"]),
            Disease::new("Tuberculosis", 0.01, &["cough", "night sweats", "weight loss", "chest pain"]),
            Disease::new("Asthma", 0.05, &["shortness of breath", "chest tightness", "cough"]),
            Disease::new("Diabetes", 0.08, &["frequent urination", "excessive thirst", "weight loss", "fatigue", "blurred vision"]),
            Disease::new("Hypertension", 0.10, &["headache", "dizziness", "chest pain", "shortness of breath", "nosebleeds"]),
            Disease::new("Heart Attack", 0.02, &["chest pain", "shortness of breath", "sweating", "nausea", "pain in left arm"]),
            Disease::new("Stroke", 0.01, &["sudden numbness", "confusion", "trouble speaking", "blurred vision", "loss of balance"]),
            Disease::new("Chickenpox", 0.01, &["fever", "rash", "itching", "loss of appetite", "fatigue"]),
            Disease::new("Typhoid", 0.01, &["fever", "abdominal pain", "headache", "diarrhea", "loss of appetite"]),
            Disease::new("Hepatitis", 0.01, &["jaundice", "fatigue", "abdominal pain", "loss of appetite", "dark urine"]),
            Disease::new("Kidney Stones", 0.01, &["severe back pain", "abdominal pain", "blood in urine", "nausea", "frequent urination"]),
            Disease::new("Anemia", 0.05, &["fatigue", "shortness of breath", "dizziness", "headache"]),
            Disease::new("Allergy", 0.10, &["sneezing", "runny nose", "itchy eyes", "rash", "cough"]),
        ])
    }

    pub fn get(&self, name: &str) -> Option<&Disease> {
        self.diseases.get(name)
    }

    /// The diseases, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Disease> {
        self.diseases.values()
    }

    pub fn len(&self) -> usize {
        self.diseases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diseases.is_empty()
    }

    /// The symptom universe, in order of first mention
    pub fn symptoms(&self) -> IndexSet<String> {
        self.iter()
            .flat_map(|d| d.symptoms.iter().cloned())
            .collect()
    }

    /// The symptom universe, sorted lexicographically
    pub fn sorted_symptoms(&self) -> Vec<String> {
        let mut symptoms: Vec<String> = self.symptoms().into_iter().collect();
        symptoms.sort();
        symptoms
    }

    /// Map each symptom to the diseases that cause it. Symptoms appear in order of first mention
    /// and their diseases in declaration order.
    pub fn symptom_index(&self) -> IndexMap<String, Vec<String>> {
        let mut index: IndexMap<String, Vec<String>> = IndexMap::new();
        for d in self.iter() {
            for s in d.symptoms.iter() {
                index.entry(s.clone()).or_default().push(d.name.clone());
            }
        }
        index
    }

}


/// Observed symptom states, keyed by symptom name
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Evidence {
    observed: IndexMap<String, State>
}


impl Evidence {

    pub fn new() -> Self {
        Evidence { observed: IndexMap::new() }
    }

    /// Evidence that every symptom in `symptoms` is present. Repeats collapse into one
    /// observation.
    pub fn from_symptoms<S: AsRef<str>>(symptoms: &[S]) -> Self {
        let mut evidence = Evidence::new();
        for s in symptoms.iter() {
            evidence.observe(s.as_ref(), State::Present);
        }
        evidence
    }

    /// Record `state` for `symptom`, replacing any earlier observation
    pub fn observe(&mut self, symptom: &str, state: State) {
        self.observed.insert(String::from(symptom), state);
    }

    pub fn get(&self, symptom: &str) -> Option<State> {
        self.observed.get(symptom).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &State)> {
        self.observed.iter()
    }

    /// The symptoms observed present
    pub fn present(&self) -> impl Iterator<Item = &String> {
        self.observed
            .iter()
            .filter(|(_, s)| **s == State::Present)
            .map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

}


fn word_pattern() -> &'static Regex {
    static WORDS: OnceLock<Regex> = OnceLock::new();
    WORDS.get_or_init(|| Regex::new(r"\w+").expect("static pattern is valid"))
}


/// Find the known symptoms mentioned in `text`.
///
/// The text is lower-cased and split into runs of word characters; a token is kept when it is
/// exactly the name of a symptom. Tokens keep their input order and repeats are kept, so
/// symptoms whose name contains a space are never found.
pub fn extract_symptoms(text: &str, kb: &KnowledgeBase) -> Vec<String> {
    let universe = kb.symptoms();
    let lowered = text.to_lowercase();

    word_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| universe.contains(*t))
        .map(String::from)
        .collect()
}
