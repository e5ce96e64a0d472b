use anyhow::Result;
use plateplan::config::Config;
use plateplan_mealplan::{Clock, MealPlan, MealPlanStore, RecipeQuery, Service, calendar, key};
use serde::Serialize;
use time::{Date, format_description::well_known::Rfc3339};

pub mod plan;
pub mod recipe;
pub mod template;

pub type CliService = Service<MealPlanStore, RecipeQuery>;

pub async fn service(config: &Config) -> Result<CliService> {
    let pool =
        plateplan::create_pool(&config.database.url, config.database.max_connections).await?;

    Ok(
        Service::new(MealPlanStore(pool.clone()), RecipeQuery(pool))
            .with_clock(Clock::Timezone(config.mealplan.timezone.to_owned())),
    )
}

/// Rejects `user` unless the configured editors allow them on `family_id`.
pub fn ensure_can_edit(config: &Config, user: &str, family_id: &str) -> Result<()> {
    plateplan_shared::ensure_can_edit(&config.mealplan, user, family_id)
        .map_err(|e| anyhow::anyhow!("{e}: {user} cannot edit family {family_id}"))
}

/// clap value parser for `YYYY-MM-DD` arguments
pub fn parse_date(value: &str) -> Result<Date, String> {
    key::parse_date(value).map_err(|e| e.to_string())
}

pub fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

#[derive(Serialize)]
pub struct WeekView {
    pub week: u32,
    pub range: String,
}

#[derive(Serialize)]
pub struct PlanView {
    pub id: String,
    pub name: String,
    pub family_id: String,
    pub start_date: String,
    pub end_date: String,
    pub date_range: String,
    pub weeks: Vec<WeekView>,
    pub meal_slots: Vec<String>,
    pub assignments: std::collections::BTreeMap<String, String>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
    pub is_template: bool,
    pub template_name: Option<String>,
    pub template_description: Option<String>,
    pub active: bool,
}

impl PlanView {
    pub fn new(plan: &MealPlan, today: Date) -> Result<Self> {
        let weeks = (0..calendar::WEEKS_PER_PLAN as u32)
            .map(|week| WeekView {
                week: week + 1,
                range: calendar::format_week_range(plan.start_date, week),
            })
            .collect();

        Ok(Self {
            id: plan.id.to_owned(),
            name: plan.name.to_owned(),
            family_id: plan.family_id.to_owned(),
            start_date: key::format_date(plan.start_date)?,
            end_date: key::format_date(plan.end_date())?,
            date_range: plan.date_range(),
            weeks,
            meal_slots: plan.meal_slots.clone(),
            assignments: plan.assignments.clone(),
            created_by: plan.created_by.to_owned(),
            created_at: plan.created_at.format(&Rfc3339)?,
            updated_at: plan.updated_at.format(&Rfc3339)?,
            is_template: plan.is_template(),
            template_name: plan.template_name().map(ToOwned::to_owned),
            template_description: plan
                .template()
                .and_then(|t| t.description())
                .map(ToOwned::to_owned),
            active: plan.is_currently_active(today),
        })
    }
}
