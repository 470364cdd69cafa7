//! Terminal output for concepts and projects.

use anyhow::Result;
use colored::Colorize;
use lens_core::concept::{Concept, GroundingSource};
use lens_core::history::{SavedProject, WriteOutcome};
use lens_core::session::Session;
use serde::Serialize;

/// What a generation or `history show` prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptReport<'a> {
    pub product_name: &'a str,
    pub concepts: &'a [Concept],
    pub grounding_sources: &'a [GroundingSource],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_project_id: Option<&'a str>,
}

impl<'a> ConceptReport<'a> {
    pub fn from_session(session: &'a Session, saved_project_id: Option<&'a str>) -> Self {
        Self {
            product_name: &session.product.name,
            concepts: &session.concepts,
            grounding_sources: &session.grounding_sources,
            saved_project_id,
        }
    }

    pub fn from_project(project: &'a SavedProject) -> Self {
        Self {
            product_name: project.display_name(),
            concepts: &project.concepts,
            grounding_sources: &project.grounding_sources,
            saved_project_id: Some(&project.id),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_report(report: &ConceptReport<'_>) {
    let heading = if report.product_name.trim().is_empty() {
        "Concepts".to_string()
    } else {
        format!("Concepts for {}", report.product_name)
    };
    println!("{}", heading.bold());
    println!();

    for (index, concept) in report.concepts.iter().enumerate() {
        println!(
            "{} {}",
            format!("{}.", index + 1).bright_black(),
            concept.title.bright_white().bold()
        );
        println!("   {}", concept.category.to_uppercase().bright_magenta());
        println!("   {}", concept.description);
        println!("   {} {}", "Prompt:".cyan(), concept.prompt);
        println!();
    }

    if !report.grounding_sources.is_empty() {
        println!("{}", "Research sources".bold());
        for source in report.grounding_sources {
            println!(
                "  - {} {}",
                source.display_title(),
                source.uri.as_deref().unwrap_or_default().bright_blue()
            );
        }
        println!();
    }

    if let Some(id) = report.saved_project_id {
        println!("{} {}", "Project:".bright_black(), id);
    }
}

/// Tells the user whether a save reached disk.
pub fn print_save_outcome(outcome: &WriteOutcome<SavedProject>) {
    match outcome.persistence_error() {
        None => println!("{}", "Project saved to your local history!".green()),
        Some(e) => {
            eprintln!("{}", e.user_message().yellow());
            eprintln!(
                "{}",
                format!(
                    "Project {} is kept for this run only.",
                    outcome.value.id
                )
                .yellow()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lens_core::product::ProductDescriptor;

    #[test]
    fn test_report_json_shape() {
        let session = Session {
            product: ProductDescriptor {
                name: "Lamp".to_string(),
                ..Default::default()
            },
            concepts: vec![Concept {
                id: "concept-1-0".into(),
                category: "Situational Action".into(),
                title: "Morning Read".into(),
                description: "Warm light".into(),
                prompt: "8K".into(),
            }],
            ..Default::default()
        };

        let value = serde_json::to_value(ConceptReport::from_session(&session, None)).unwrap();
        assert_eq!(value["productName"], "Lamp");
        assert_eq!(value["concepts"][0]["id"], "concept-1-0");
        assert!(value["groundingSources"].as_array().unwrap().is_empty());
        assert!(value.get("savedProjectId").is_none());
    }
}
