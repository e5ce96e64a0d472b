use std::{
    borrow::Cow,
    collections::{BTreeMap, BTreeSet, HashSet},
};

use plateplan_shared::mealplan::MealPlanError;
use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};
use ulid::Ulid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    calendar,
    key::{self, AssignmentKey},
};

pub const MAX_MEAL_SLOTS: usize = 8;
pub const DEFAULT_MEAL_SLOTS: [&str; 3] = ["breakfast", "lunch", "dinner"];

/// Day 0 of every template; templates keep only day offsets from it.
pub const TEMPLATE_REFERENCE_DATE: Date = time::macros::date!(2024 - 01 - 01);

pub fn default_meal_slots() -> Vec<String> {
    DEFAULT_MEAL_SLOTS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    name: String,
    description: Option<String>,
}

impl TemplateInfo {
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, MealPlanError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(MealPlanError::EmptyTemplateName);
        }

        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self { name, description })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlanKind {
    #[default]
    Regular,
    Template(TemplateInfo),
}

#[derive(Debug, Clone, PartialEq, Validate)]
pub struct MealPlan {
    pub id: String,
    #[validate(length(
        min = 1,
        max = 100,
        message = "Name must be between 1 and 100 characters"
    ))]
    pub name: String,
    pub family_id: String,
    pub start_date: Date,
    #[validate(length(
        min = 1,
        max = 8,
        message = "A meal plan needs between 1 and 8 meal slots"
    ))]
    pub meal_slots: Vec<String>,
    pub assignments: BTreeMap<String, String>,
    pub created_by: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub kind: PlanKind,
}

pub struct CreateMealPlan {
    pub name: String,
    pub family_id: String,
    pub start_date: Date,
    pub meal_slots: Vec<String>,
    pub assignments: BTreeMap<String, String>,
    pub created_by: String,
    pub kind: PlanKind,
}

/// Fields to override in [`MealPlan::copy_with`]; `None` keeps the current value.
#[derive(Debug, Clone, Default)]
pub struct MealPlanChanges {
    pub name: Option<String>,
    pub start_date: Option<Date>,
    pub meal_slots: Option<Vec<String>>,
    pub assignments: Option<BTreeMap<String, String>>,
    pub kind: Option<PlanKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateStats {
    pub total_slots: usize,
    pub assigned_slots: usize,
    pub empty_slots: usize,
    pub unique_recipes: usize,
    pub meal_slots_count: usize,
    pub completion_percentage: u8,
}

pub(crate) fn now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();

    now - Duration::nanoseconds(now.nanosecond() as i64)
}

impl MealPlan {
    /// Builds a new plan. Never fails: check [`MealPlan::is_valid`] before
    /// persisting.
    pub fn create(input: CreateMealPlan) -> Self {
        let created_at = now();

        Self {
            id: Ulid::new().to_string(),
            name: input.name,
            family_id: input.family_id,
            start_date: input.start_date,
            meal_slots: input.meal_slots,
            assignments: input.assignments,
            created_by: input.created_by,
            created_at,
            updated_at: created_at,
            kind: input.kind,
        }
    }

    pub fn copy_with(&self, changes: MealPlanChanges) -> Self {
        let mut plan = self.clone();

        if let Some(name) = changes.name {
            plan.name = name;
        }

        if let Some(start_date) = changes.start_date {
            plan.start_date = start_date;
        }

        if let Some(meal_slots) = changes.meal_slots {
            plan.meal_slots = meal_slots;
        }

        if let Some(assignments) = changes.assignments {
            plan.assignments = assignments;
        }

        if let Some(kind) = changes.kind {
            plan.kind = kind;
        }

        plan.updated_at = now();
        plan
    }

    pub fn is_template(&self) -> bool {
        matches!(self.kind, PlanKind::Template(_))
    }

    pub fn template(&self) -> Option<&TemplateInfo> {
        match &self.kind {
            PlanKind::Template(info) => Some(info),
            PlanKind::Regular => None,
        }
    }

    pub fn template_name(&self) -> Option<&str> {
        self.template().map(TemplateInfo::name)
    }

    pub fn dates(&self) -> [Date; 28] {
        calendar::generate_four_week_dates(self.start_date)
    }

    pub fn end_date(&self) -> Date {
        self.start_date + Duration::days(calendar::PLAN_DAYS - 1)
    }

    pub fn date_range(&self) -> String {
        calendar::format_date_range(self.start_date, self.end_date())
    }

    /// Templates are calendar-agnostic and never active.
    pub fn is_currently_active(&self, today: Date) -> bool {
        !self.is_template() && calendar::is_within_window(self.start_date, today)
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.meal_slots.iter().any(|s| s == slot)
    }

    pub fn contains_recipe(&self, recipe_id: &str) -> bool {
        self.assignments.values().any(|id| id == recipe_id)
    }

    pub fn recipe_ids(&self) -> BTreeSet<&str> {
        self.assignments.values().map(String::as_str).collect()
    }

    pub fn validate_plan(&self) -> Result<(), ValidationErrors> {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        let mut seen = HashSet::new();
        for slot in self.meal_slots.iter() {
            if let Err(e) = key::validate_slot(slot) {
                errors.add(
                    "meal_slots",
                    validation_error("slot_name", format!("Invalid meal slot \"{slot}\": {e}")),
                );
            } else if !seen.insert(slot) {
                errors.add(
                    "meal_slots",
                    validation_error("unique", format!("Meal slot \"{slot}\" is duplicated")),
                );
            }
        }

        for assignment_key in self.assignments.keys() {
            match assignment_key.parse::<AssignmentKey>() {
                Err(e) => errors.add(
                    "assignments",
                    validation_error(
                        "key",
                        format!("Invalid assignment key \"{assignment_key}\": {e}"),
                    ),
                ),
                Ok(cell) if !calendar::is_within_window(self.start_date, cell.date) => errors
                    .add(
                        "assignments",
                        validation_error(
                            "window",
                            format!(
                                "Assignment \"{assignment_key}\" is outside {}",
                                self.date_range()
                            ),
                        ),
                    ),
                Ok(cell) if !self.has_slot(&cell.slot) => errors.add(
                    "assignments",
                    validation_error(
                        "slot",
                        format!(
                            "Assignment \"{assignment_key}\" uses unknown meal slot \"{}\"",
                            cell.slot
                        ),
                    ),
                ),
                Ok(_) => {}
            }
        }

        let template_name_len = self.template().map(|t| t.name().chars().count());
        if template_name_len.is_some_and(|len| len > 100) {
            errors.add(
                "template",
                validation_error(
                    "length",
                    "Template name must be at most 100 characters".to_owned(),
                ),
            );
        }

        if errors.is_empty() {
            return Ok(());
        }

        Err(errors)
    }

    /// Field name to first human-readable message, empty when valid
    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        let Err(errors) = self.validate_plan() else {
            return BTreeMap::new();
        };

        errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());

                    (field.to_string(), message)
                })
            })
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validate_plan().is_ok()
    }

    pub fn template_stats(&self) -> Result<TemplateStats, MealPlanError> {
        if !self.is_template() {
            return Err(MealPlanError::NotATemplate);
        }

        let meal_slots_count = self.meal_slots.len();
        let total_slots = meal_slots_count * calendar::PLAN_DAYS as usize;
        let assigned_slots = self.assignments.len();

        Ok(TemplateStats {
            total_slots,
            assigned_slots,
            empty_slots: total_slots.saturating_sub(assigned_slots),
            unique_recipes: self.recipe_ids().len(),
            meal_slots_count,
            completion_percentage: completion_percentage(assigned_slots, total_slots),
        })
    }

    /// Moves every assignment to the same day offset from `start_date`.
    ///
    /// Fails on the first key that does not decode or lies outside the
    /// current window.
    pub fn reanchor_assignments(
        &self,
        start_date: Date,
    ) -> Result<BTreeMap<String, String>, MealPlanError> {
        let mut assignments = BTreeMap::new();

        for (assignment_key, recipe_id) in self.assignments.iter() {
            let invalid_key = |e: key::KeyError| MealPlanError::InvalidAssignmentKey {
                key: assignment_key.to_owned(),
                reason: e.to_string(),
            };

            let AssignmentKey { date, slot } = assignment_key
                .parse::<AssignmentKey>()
                .map_err(invalid_key)?;

            let offset = calendar::days_between(self.start_date, date);
            if !(0..calendar::PLAN_DAYS).contains(&offset) {
                return Err(MealPlanError::OutsideWindow {
                    date: date.to_string(),
                    start: self.start_date.to_string(),
                });
            }

            let week = offset / calendar::DAYS_PER_WEEK;
            let day = offset % calendar::DAYS_PER_WEEK;
            let target = start_date + Duration::days(week * calendar::DAYS_PER_WEEK + day);
            let target_key = AssignmentKey::new(target, slot).map_err(invalid_key)?;

            assignments.insert(target_key.to_string(), recipe_id.to_owned());
        }

        Ok(assignments)
    }
}

/// Half-up rounded percentage, 0 when there is nothing to fill
pub fn completion_percentage(assigned: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }

    ((assigned * 100 + total / 2) / total).min(100) as u8
}

fn validation_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Owned(message))
}
