//! Print both disease rankings for a description of symptoms.
//!
//! ```text
//! cargo run --example diagnose -- "I have a fever, a cough and a headache"
//! ```

use diagnet::{build_network, diagnose, KnowledgeBase};

fn main() -> anyhow::Result<()> {
    diagnet::telemetry::init_tracing();

    let text = std::env::args()
        .skip(1)
        .collect::<Vec<String>>()
        .join(" ");
    let text = if text.is_empty() {
        String::from("I have a fever, a cough and a headache")
    } else {
        text
    };

    let kb = KnowledgeBase::standard()?;
    let network = build_network(&kb)?;
    let diagnosis = diagnose(&text, &kb, &network)?;

    println!("{}", diagnosis.message);
    println!("symptoms: {}", diagnosis.symptoms.join(", "));

    println!("\n{:<16} {:>10} {:>10}", "disease", "rule", "bayes");
    for (disease, p) in diagnosis.bayesian.ranked() {
        let rule = diagnosis.rule_based
                            .get(disease)
                            .map(|r| format!("{:.2}", r))
                            .unwrap_or_else(|| String::from("-"));
        println!("{:<16} {:>10} {:>10.2}", disease, rule, p);
    }

    Ok(())
}
