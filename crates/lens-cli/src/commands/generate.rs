use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use lens_core::product::{AspectRatio, AssetType, ProductDescriptor, SeasonalTheme};
use lens_infrastructure::load_image_file;

use super::context::{AppContext, GlobalOptions};
use super::render::{self, ConceptReport};

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Product name
    #[arg(long)]
    pub name: Option<String>,

    /// Product page to research
    #[arg(long)]
    pub url: Option<String>,

    /// Reference photo of the product
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Seasonal preset (see `lens themes`) or free text
    #[arg(long)]
    pub theme: Option<String>,

    /// Lifestyle or Infographic
    #[arg(long, default_value_t = AssetType::Lifestyle)]
    pub asset_type: AssetType,

    /// 1:1, 9:16, 16:9 or 4:5
    #[arg(long, default_value_t = AspectRatio::Square)]
    pub aspect_ratio: AspectRatio,

    /// Features or mechanical parts worth highlighting
    #[arg(long)]
    pub details: Option<String>,

    /// Feedback applied in a second, refined pass
    #[arg(long, value_name = "TEXT")]
    pub refine: Option<String>,

    /// Save the final batch to history
    #[arg(long)]
    pub save: bool,

    /// Print JSON instead of formatted text
    #[arg(long)]
    pub json: bool,
}

impl GenerateArgs {
    fn apply_to(&self, product: &mut ProductDescriptor) {
        product.name = self.name.clone().unwrap_or_default();
        product.url = self.url.clone().unwrap_or_default();
        product.theme = self.theme.as_deref().map(normalize_theme).unwrap_or_default();
        product.asset_type = self.asset_type;
        product.aspect_ratio = self.aspect_ratio;
        product.specific_details = self.details.clone().unwrap_or_default();
    }
}

/// Maps a preset key such as `valentines` to its display value.
fn normalize_theme(theme: &str) -> String {
    SeasonalTheme::from_str(theme.trim())
        .map(|preset| preset.to_string())
        .unwrap_or_else(|_| theme.trim().to_string())
}

pub async fn run(globals: &GlobalOptions, args: GenerateArgs) -> Result<()> {
    let context = AppContext::open(globals)?;
    let controller = context.controller().await?;

    controller.edit_product(|product| args.apply_to(product)).await;
    if let Some(path) = &args.image {
        let image = load_image_file(path, context.config.image.max_bytes)?;
        controller.attach_encoded_image(image).await?;
    }

    if !args.json {
        eprintln!("{}", "Generating concepts...".bright_black());
    }
    controller.generate().await?;

    if let Some(feedback) = &args.refine {
        if !args.json {
            eprintln!("{}", "Refining concepts...".bright_black());
        }
        controller.set_refinement(feedback.as_str()).await;
        controller.refine().await?;
    }

    let saved = if args.save {
        let outcome = controller.save_project().await?;
        if !args.json {
            render::print_save_outcome(&outcome);
        }
        Some(outcome.value)
    } else {
        None
    };

    let session = controller.session().await;
    let report = ConceptReport::from_session(&session, saved.as_ref().map(|p| p.id.as_str()));
    if args.json {
        render::print_json(&report)?;
    } else {
        render::print_report(&report);
    }
    Ok(())
}
