use std::collections::HashMap;

use plateplan_shared::mealplan::MealPlanError;
use serde::Serialize;
use time::Date;

use crate::{
    Clock, CreateMealPlan, DeletionValidationResult, MealPlan, MealPlanChanges,
    MealPlanRepository, PlanKind, RecipeLookup, RecipeSummary, TEMPLATE_REFERENCE_DATE,
    TemplateInfo, TemplateStats,
    key::{self, AssignmentKey},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AssignmentRecipe {
    Resolved(RecipeSummary),
    RecipeUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MealAssignment {
    pub key: String,
    #[serde(skip)]
    pub date: Date,
    pub slot: String,
    pub recipe_id: String,
    pub recipe: AssignmentRecipe,
}

#[derive(Clone)]
pub struct Service<R, L> {
    repository: R,
    recipes: L,
    clock: Clock,
}

impl<R: MealPlanRepository, L: RecipeLookup> Service<R, L> {
    pub fn new(repository: R, recipes: L) -> Self {
        Self {
            repository,
            recipes,
            clock: Clock::default(),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn recipes(&self) -> &L {
        &self.recipes
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    async fn persist(&self, plan: MealPlan) -> plateplan_shared::Result<MealPlan> {
        plan.validate_plan()?;
        self.repository.save(&plan).await?;

        Ok(plan)
    }

    pub async fn create(&self, input: CreateMealPlan) -> plateplan_shared::Result<MealPlan> {
        let plan = self.persist(MealPlan::create(input)).await?;

        tracing::info!(
            mealplan_id = %plan.id,
            family_id = %plan.family_id,
            start_date = %plan.start_date,
            "mealplan created"
        );

        Ok(plan)
    }

    pub async fn find(&self, id: &str) -> plateplan_shared::Result<MealPlan> {
        self.repository
            .load_by_id(id)
            .await?
            .ok_or_else(|| plateplan_shared::Error::NotFound(format!("mealplan {id}")))
    }

    pub async fn list(&self, family_id: &str) -> plateplan_shared::Result<Vec<MealPlan>> {
        self.repository.load_all(family_id).await
    }

    pub async fn list_templates(&self, family_id: &str) -> plateplan_shared::Result<Vec<MealPlan>> {
        let mut plans = self.repository.load_all(family_id).await?;
        plans.retain(MealPlan::is_template);

        Ok(plans)
    }

    pub async fn delete(&self, id: &str) -> plateplan_shared::Result<()> {
        if !self.repository.delete(id).await? {
            return Err(plateplan_shared::Error::NotFound(format!("mealplan {id}")));
        }

        tracing::info!(mealplan_id = id, "mealplan deleted");

        Ok(())
    }

    pub async fn assign_recipe_to_slot(
        &self,
        plan: &MealPlan,
        date: Date,
        slot: &str,
        recipe_id: impl Into<String>,
    ) -> plateplan_shared::Result<MealPlan> {
        let assignment_key = encode_key(date, slot)?;
        if !plan.has_slot(slot) {
            return Err(MealPlanError::UnknownMealSlot(slot.to_owned()).into());
        }

        let recipe_id = recipe_id.into();

        let mut assignments = plan.assignments.clone();
        assignments.insert(assignment_key.to_owned(), recipe_id.to_owned());

        let plan = self
            .persist(plan.copy_with(MealPlanChanges {
                assignments: Some(assignments),
                ..Default::default()
            }))
            .await?;

        tracing::info!(
            mealplan_id = %plan.id,
            key = %assignment_key,
            recipe_id = %recipe_id,
            "recipe assigned"
        );

        Ok(plan)
    }

    pub async fn remove_recipe_from_slot(
        &self,
        plan: &MealPlan,
        date: Date,
        slot: &str,
    ) -> plateplan_shared::Result<MealPlan> {
        let assignment_key = encode_key(date, slot)?;

        let mut assignments = plan.assignments.clone();
        let removed = assignments.remove(&assignment_key);

        let plan = self
            .persist(plan.copy_with(MealPlanChanges {
                assignments: Some(assignments),
                ..Default::default()
            }))
            .await?;

        tracing::info!(
            mealplan_id = %plan.id,
            key = %assignment_key,
            removed = removed.is_some(),
            "recipe unassigned"
        );

        Ok(plan)
    }

    /// Assignments in calendar order, slots in the plan's slot order.
    pub async fn get_meal_assignments(
        &self,
        plan: &MealPlan,
    ) -> plateplan_shared::Result<Vec<MealAssignment>> {
        let mut summaries: HashMap<&str, Option<RecipeSummary>> = HashMap::new();
        let mut assignments = Vec::with_capacity(plan.assignments.len());

        for (assignment_key, recipe_id) in plan.assignments.iter() {
            let AssignmentKey { date, slot } = assignment_key
                .parse::<AssignmentKey>()
                .map_err(|e| MealPlanError::InvalidAssignmentKey {
                    key: assignment_key.to_owned(),
                    reason: e.to_string(),
                })?;

            let summary = match summaries.get(recipe_id.as_str()) {
                Some(summary) => summary.clone(),
                None => {
                    let summary = self.recipes.get_by_id(recipe_id).await?;
                    if summary.is_none() {
                        tracing::warn!(
                            mealplan_id = %plan.id,
                            recipe_id = %recipe_id,
                            "recipe unavailable"
                        );
                    }

                    summaries.insert(recipe_id.as_str(), summary.clone());
                    summary
                }
            };

            assignments.push(MealAssignment {
                key: assignment_key.to_owned(),
                date,
                slot,
                recipe_id: recipe_id.to_owned(),
                recipe: summary
                    .map(AssignmentRecipe::Resolved)
                    .unwrap_or(AssignmentRecipe::RecipeUnavailable),
            });
        }

        let slot_position = |slot: &str| {
            plan.meal_slots
                .iter()
                .position(|s| s == slot)
                .unwrap_or(plan.meal_slots.len())
        };

        assignments.sort_by(|a, b| {
            (a.date, slot_position(&a.slot), &a.slot).cmp(&(
                b.date,
                slot_position(&b.slot),
                &b.slot,
            ))
        });

        Ok(assignments)
    }

    /// Stores a copy of `plan` as a template anchored at
    /// [`TEMPLATE_REFERENCE_DATE`], keeping each assignment's week and day.
    pub async fn save_as_template(
        &self,
        plan: &MealPlan,
        template_name: impl Into<String>,
        description: Option<String>,
    ) -> plateplan_shared::Result<MealPlan> {
        let info = TemplateInfo::new(template_name, description)?;

        let wanted = info.name().to_lowercase();
        let existing = self.repository.load_all(&plan.family_id).await?;
        if existing
            .iter()
            .filter_map(MealPlan::template_name)
            .any(|name| name.to_lowercase() == wanted)
        {
            return Err(MealPlanError::DuplicateTemplateName(info.name().to_owned()).into());
        }

        let assignments = plan.reanchor_assignments(TEMPLATE_REFERENCE_DATE)?;

        let template = self
            .persist(MealPlan::create(CreateMealPlan {
                name: info.name().to_owned(),
                family_id: plan.family_id.to_owned(),
                start_date: TEMPLATE_REFERENCE_DATE,
                meal_slots: plan.meal_slots.clone(),
                assignments,
                created_by: plan.created_by.to_owned(),
                kind: PlanKind::Template(info),
            }))
            .await?;

        tracing::info!(
            template_id = %template.id,
            source_id = %plan.id,
            family_id = %template.family_id,
            "template saved"
        );

        Ok(template)
    }

    pub fn get_template_stats(&self, plan: &MealPlan) -> plateplan_shared::Result<TemplateStats> {
        Ok(plan.template_stats()?)
    }

    /// Creates a regular plan starting at `target_start`. Each assignment
    /// lands on `target_start + 7 * week + day` with no month handling.
    pub async fn apply_template(
        &self,
        template: &MealPlan,
        target_start: Date,
        created_by: impl Into<String>,
    ) -> plateplan_shared::Result<MealPlan> {
        let Some(info) = template.template() else {
            return Err(MealPlanError::NotATemplate.into());
        };

        let assignments = template.reanchor_assignments(target_start)?;

        let plan = self
            .persist(MealPlan::create(CreateMealPlan {
                name: info.name().to_owned(),
                family_id: template.family_id.to_owned(),
                start_date: target_start,
                meal_slots: template.meal_slots.clone(),
                assignments,
                created_by: created_by.into(),
                kind: PlanKind::Regular,
            }))
            .await?;

        tracing::info!(
            mealplan_id = %plan.id,
            template_id = %template.id,
            start_date = %target_start,
            "template applied"
        );

        Ok(plan)
    }

    pub async fn get_meal_plans_containing_recipe(
        &self,
        family_id: &str,
        recipe_id: &str,
    ) -> plateplan_shared::Result<Vec<MealPlan>> {
        let mut plans = self.repository.load_all(family_id).await?;
        plans.retain(|plan| plan.contains_recipe(recipe_id));

        tracing::debug!(family_id, recipe_id, count = plans.len(), "plans using recipe");

        Ok(plans)
    }

    pub async fn get_active_meal_plans_containing_recipe(
        &self,
        family_id: &str,
        recipe_id: &str,
    ) -> plateplan_shared::Result<Vec<MealPlan>> {
        let today = self.today();
        let mut plans = self
            .get_meal_plans_containing_recipe(family_id, recipe_id)
            .await?;
        plans.retain(|plan| plan.is_currently_active(today));

        Ok(plans)
    }

    /// Drops every assignment of `recipe_id`, one save per touched plan.
    /// Returns how many plans changed.
    pub async fn remove_recipe_from_all_meal_plans(
        &self,
        family_id: &str,
        recipe_id: &str,
    ) -> plateplan_shared::Result<usize> {
        let plans = self
            .get_meal_plans_containing_recipe(family_id, recipe_id)
            .await?;

        for plan in plans.iter() {
            let mut assignments = plan.assignments.clone();
            assignments.retain(|_, id| id != recipe_id);

            let updated = plan.copy_with(MealPlanChanges {
                assignments: Some(assignments),
                ..Default::default()
            });
            self.repository.save(&updated).await?;
        }

        tracing::info!(
            family_id,
            recipe_id,
            updated = plans.len(),
            "recipe removed from mealplans"
        );

        Ok(plans.len())
    }

    pub async fn validate_recipe_for_deletion(
        &self,
        family_id: &str,
        recipe_id: &str,
    ) -> plateplan_shared::Result<DeletionValidationResult> {
        let plans = self
            .get_meal_plans_containing_recipe(family_id, recipe_id)
            .await?;

        Ok(DeletionValidationResult::new(plans, self.today()))
    }
}

fn encode_key(date: Date, slot: &str) -> Result<String, MealPlanError> {
    AssignmentKey::new(date, slot)
        .map(|cell| cell.to_string())
        .map_err(|e| MealPlanError::InvalidAssignmentKey {
            key: format!("{date}{}{slot}", key::SEPARATOR),
            reason: e.to_string(),
        })
}
