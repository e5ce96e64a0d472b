use anyhow::Result;
use clap::Subcommand;
use plateplan::config::Config;
use plateplan_mealplan::{DeletionValidationResult, RecipeSummary, WarningSeverity};
use serde::Serialize;

use super::{ensure_can_edit, print_json};

#[derive(Subcommand)]
pub enum RecipeCommand {
    /// Add or update a recipe summary
    Add {
        #[arg(long)]
        family: String,
        id: String,
        #[arg(long)]
        title: String,
        /// Minutes
        #[arg(long, default_value_t = 0)]
        prep_time: u32,
        #[arg(long, default_value_t = 0)]
        servings: u32,
        #[arg(long)]
        user: String,
    },
    /// List the recipe summaries of a family
    List {
        #[arg(long)]
        family: String,
    },
    /// Report the plans that would lose this recipe
    CheckDelete {
        #[arg(long)]
        family: String,
        id: String,
    },
    /// Remove the recipe from every plan of the family
    Detach {
        #[arg(long)]
        family: String,
        id: String,
        #[arg(long)]
        user: String,
    },
}

#[derive(Serialize)]
struct WarningView {
    severity: WarningSeverity,
    message: String,
}

#[derive(Serialize)]
struct DeletionView {
    can_delete: bool,
    summary: String,
    has_active_conflicts: bool,
    warnings: Vec<WarningView>,
    meal_plan_ids: Vec<String>,
}

impl From<DeletionValidationResult> for DeletionView {
    fn from(result: DeletionValidationResult) -> Self {
        Self {
            can_delete: result.can_delete,
            summary: result.summary_message(),
            has_active_conflicts: result.has_active_meal_plan_conflicts(),
            warnings: result
                .warnings
                .iter()
                .map(|w| WarningView {
                    severity: w.severity(),
                    message: w.message(),
                })
                .collect(),
            meal_plan_ids: result
                .conflicting_meal_plans
                .into_iter()
                .map(|p| p.id)
                .collect(),
        }
    }
}

#[tracing::instrument(skip(config, command))]
pub async fn run(config: Config, command: RecipeCommand) -> Result<()> {
    let service = super::service(&config).await?;

    match command {
        RecipeCommand::Add {
            family,
            id,
            title,
            prep_time,
            servings,
            user,
        } => {
            ensure_can_edit(&config, &user, &family)?;

            let recipe = RecipeSummary {
                id,
                title,
                prep_time,
                servings,
            };
            service.recipes().upsert(family, &recipe).await?;

            print_json(&recipe)
        }
        RecipeCommand::List { family } => print_json(&service.recipes().list(family).await?),
        RecipeCommand::CheckDelete { family, id } => {
            let result = service.validate_recipe_for_deletion(&family, &id).await?;

            print_json(&DeletionView::from(result))
        }
        RecipeCommand::Detach { family, id, user } => {
            ensure_can_edit(&config, &user, &family)?;

            let updated = service
                .remove_recipe_from_all_meal_plans(&family, &id)
                .await?;

            print_json(&serde_json::json!({ "recipe_id": id, "updated_meal_plans": updated }))
        }
    }
}
