use anyhow::Result;
use colored::Colorize;

use super::context::{AppContext, GlobalOptions};
use super::render::{self, ConceptReport};

pub fn list(globals: &GlobalOptions) -> Result<()> {
    let store = AppContext::open(globals)?.history_store()?;
    if store.is_empty() {
        println!("{}", "No saved projects yet.".bright_black());
        return Ok(());
    }

    for project in store.list() {
        let saved_at = project
            .saved_at()
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{}  {}  {}  {}",
            project.id.bright_black(),
            saved_at,
            project.display_name().bright_white().bold(),
            format!(
                "{} concept(s), {}",
                project.concepts.len(),
                project.product.asset_type
            )
            .bright_black()
        );
    }
    Ok(())
}

pub fn show(globals: &GlobalOptions, id: &str, json: bool) -> Result<()> {
    let store = AppContext::open(globals)?.history_store()?;
    let project = store.load(id)?;
    if json {
        render::print_json(&project)
    } else {
        render::print_report(&ConceptReport::from_project(&project));
        Ok(())
    }
}

pub fn delete(globals: &GlobalOptions, id: &str) -> Result<()> {
    let mut store = AppContext::open(globals)?.history_store()?;
    let outcome = store.delete(id);

    match &outcome.value {
        Some(project) => println!("{} {}", "Deleted".green(), project.display_name()),
        None => println!("{}", format!("No project with id '{id}'.").bright_black()),
    }
    if let Some(e) = outcome.persistence_error() {
        eprintln!("{}", e.user_message().yellow());
    }
    Ok(())
}

pub async fn refine(
    globals: &GlobalOptions,
    id: &str,
    feedback: &str,
    save: bool,
    json: bool,
) -> Result<()> {
    let context = AppContext::open(globals)?;
    let controller = context.controller().await?;

    controller.load_project(id).await?;
    controller.set_refinement(feedback).await;
    if !json {
        eprintln!("{}", "Refining concepts...".bright_black());
    }
    controller.refine().await?;

    let saved = if save {
        let outcome = controller.save_project().await?;
        if !json {
            render::print_save_outcome(&outcome);
        }
        Some(outcome.value)
    } else {
        None
    };

    let session = controller.session().await;
    let report = ConceptReport::from_session(&session, saved.as_ref().map(|p| p.id.as_str()));
    if json {
        render::print_json(&report)
    } else {
        render::print_report(&report);
        Ok(())
    }
}
