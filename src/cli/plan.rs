use anyhow::Result;
use clap::Subcommand;
use plateplan::config::Config;
use plateplan_mealplan::{CreateMealPlan, MealAssignment, PlanKind};
use serde::Serialize;
use time::Date;

use super::{PlanView, ensure_can_edit, parse_date, print_json};

#[derive(Subcommand)]
pub enum PlanCommand {
    /// Create an empty 4-week meal plan
    Create {
        #[arg(long)]
        family: String,
        #[arg(long)]
        name: String,
        /// First day of the plan (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        start: Date,
        /// Meal slot, repeat for several (defaults from config)
        #[arg(long = "slot")]
        slots: Vec<String>,
        #[arg(long)]
        user: String,
    },
    /// Show a plan with its resolved assignments
    Show { id: String },
    /// Assign a recipe to a date and slot
    Assign {
        id: String,
        #[arg(long, value_parser = parse_date)]
        date: Date,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        recipe: String,
        #[arg(long)]
        user: String,
    },
    /// Clear a date and slot
    Unassign {
        id: String,
        #[arg(long, value_parser = parse_date)]
        date: Date,
        #[arg(long)]
        slot: String,
        #[arg(long)]
        user: String,
    },
    Delete {
        id: String,
        #[arg(long)]
        user: String,
    },
    /// List the plans of a family
    List {
        #[arg(long)]
        family: String,
        /// Only templates
        #[arg(long)]
        templates: bool,
    },
}

#[derive(Serialize)]
struct PlanDetail {
    #[serde(flatten)]
    plan: PlanView,
    meals: Vec<MealAssignment>,
}

#[tracing::instrument(skip(config, command))]
pub async fn run(config: Config, command: PlanCommand) -> Result<()> {
    let service = super::service(&config).await?;
    let today = service.today();

    match command {
        PlanCommand::Create {
            family,
            name,
            start,
            slots,
            user,
        } => {
            ensure_can_edit(&config, &user, &family)?;

            let meal_slots = if slots.is_empty() {
                config.mealplan.default_slots.clone()
            } else {
                slots
            };

            let plan = service
                .create(CreateMealPlan {
                    name,
                    family_id: family,
                    start_date: start,
                    meal_slots,
                    assignments: Default::default(),
                    created_by: user,
                    kind: PlanKind::Regular,
                })
                .await?;

            print_json(&PlanView::new(&plan, today)?)
        }
        PlanCommand::Show { id } => {
            let plan = service.find(&id).await?;
            let meals = service.get_meal_assignments(&plan).await?;

            print_json(&PlanDetail {
                plan: PlanView::new(&plan, today)?,
                meals,
            })
        }
        PlanCommand::Assign {
            id,
            date,
            slot,
            recipe,
            user,
        } => {
            let plan = service.find(&id).await?;
            ensure_can_edit(&config, &user, &plan.family_id)?;

            let plan = service
                .assign_recipe_to_slot(&plan, date, &slot, recipe)
                .await?;

            print_json(&PlanView::new(&plan, today)?)
        }
        PlanCommand::Unassign {
            id,
            date,
            slot,
            user,
        } => {
            let plan = service.find(&id).await?;
            ensure_can_edit(&config, &user, &plan.family_id)?;

            let plan = service.remove_recipe_from_slot(&plan, date, &slot).await?;

            print_json(&PlanView::new(&plan, today)?)
        }
        PlanCommand::Delete { id, user } => {
            let plan = service.find(&id).await?;
            ensure_can_edit(&config, &user, &plan.family_id)?;

            service.delete(&id).await?;

            print_json(&serde_json::json!({ "deleted": id }))
        }
        PlanCommand::List { family, templates } => {
            let plans = if templates {
                service.list_templates(&family).await?
            } else {
                service.list(&family).await?
            };

            let views = plans
                .iter()
                .map(|plan| PlanView::new(plan, today))
                .collect::<Result<Vec<_>>>()?;

            print_json(&views)
        }
    }
}
