use serde::Serialize;
use strum::{AsRefStr, Display};
use time::Date;

use crate::MealPlan;

#[derive(
    Display, AsRefStr, Serialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "lowercase")]
pub enum WarningSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionWarning {
    /// The plan's 4-week window includes today
    ActiveMealPlan {
        plan_id: String,
        plan_name: String,
        date_range: String,
    },
    /// Past or future plan
    InactiveMealPlan {
        plan_id: String,
        plan_name: String,
        date_range: String,
    },
    Generic {
        message: String,
    },
}

impl DeletionWarning {
    pub fn for_plan(plan: &MealPlan, today: Date) -> Self {
        if let Some(template) = plan.template() {
            return DeletionWarning::Generic {
                message: format!("Used in template \"{}\"", template.name()),
            };
        }

        if plan.is_currently_active(today) {
            return DeletionWarning::ActiveMealPlan {
                plan_id: plan.id.to_owned(),
                plan_name: plan.name.to_owned(),
                date_range: plan.date_range(),
            };
        }

        DeletionWarning::InactiveMealPlan {
            plan_id: plan.id.to_owned(),
            plan_name: plan.name.to_owned(),
            date_range: plan.date_range(),
        }
    }

    pub fn severity(&self) -> WarningSeverity {
        match self {
            DeletionWarning::ActiveMealPlan { .. } => WarningSeverity::High,
            DeletionWarning::InactiveMealPlan { .. } => WarningSeverity::Medium,
            DeletionWarning::Generic { .. } => WarningSeverity::Low,
        }
    }

    pub fn message(&self) -> String {
        match self {
            DeletionWarning::ActiveMealPlan {
                plan_name,
                date_range,
                ..
            } => format!("Used in active meal plan \"{plan_name}\" ({date_range})"),
            DeletionWarning::InactiveMealPlan {
                plan_name,
                date_range,
                ..
            } => format!("Used in meal plan \"{plan_name}\" ({date_range})"),
            DeletionWarning::Generic { message } => message.to_owned(),
        }
    }
}

/// Most severe first, stable for equal severities
pub fn sort_by_severity(warnings: &mut [DeletionWarning]) {
    warnings.sort_by_key(|w| std::cmp::Reverse(w.severity()));
}

#[derive(Debug, Clone)]
pub struct DeletionValidationResult {
    pub can_delete: bool,
    pub warnings: Vec<DeletionWarning>,
    pub conflicting_meal_plans: Vec<MealPlan>,
}

impl DeletionValidationResult {
    /// Deletion is always allowed; warnings are advisory.
    pub fn new(conflicting_meal_plans: Vec<MealPlan>, today: Date) -> Self {
        let mut warnings = conflicting_meal_plans
            .iter()
            .map(|plan| DeletionWarning::for_plan(plan, today))
            .collect::<Vec<_>>();

        sort_by_severity(&mut warnings);

        Self {
            can_delete: true,
            warnings,
            conflicting_meal_plans,
        }
    }

    pub fn active_conflict_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, DeletionWarning::ActiveMealPlan { .. }))
            .count()
    }

    pub fn has_active_meal_plan_conflicts(&self) -> bool {
        self.active_conflict_count() > 0
    }

    pub fn summary_message(&self) -> String {
        let total = self.conflicting_meal_plans.len();
        if total == 0 {
            return "Recipe can be safely deleted".to_owned();
        }

        let active = self.active_conflict_count();
        let others = total - active;

        match (active, others) {
            (0, others) => format!("Recipe is used in {}", meal_plans(others)),
            (active, 0) => format!("Recipe is used in {active} active {}", plural(active)),
            (active, others) => format!(
                "Recipe is used in {active} active {} and {} other {}",
                plural(active),
                others,
                plural(others)
            ),
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "meal plan" } else { "meal plans" }
}

fn meal_plans(count: usize) -> String {
    format!("{count} {}", plural(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CreateMealPlan, MealPlanChanges, PlanKind, TemplateInfo, default_meal_slots};
    use time::macros::date;

    fn plan(name: &str, start_date: Date) -> MealPlan {
        MealPlan::create(CreateMealPlan {
            name: name.to_owned(),
            family_id: "doe".to_owned(),
            start_date,
            meal_slots: default_meal_slots(),
            assignments: Default::default(),
            created_by: "john".to_owned(),
            kind: PlanKind::Regular,
        })
    }

    const TODAY: Date = date!(2024 - 03 - 20);

    #[test]
    fn test_severity_ordering() {
        let mut warnings = vec![
            DeletionWarning::Generic {
                message: "note".to_owned(),
            },
            DeletionWarning::InactiveMealPlan {
                plan_id: "1".to_owned(),
                plan_name: "past".to_owned(),
                date_range: "1/1 - 1/28".to_owned(),
            },
            DeletionWarning::ActiveMealPlan {
                plan_id: "2".to_owned(),
                plan_name: "now".to_owned(),
                date_range: "3/15 - 4/11".to_owned(),
            },
        ];

        sort_by_severity(&mut warnings);

        assert_eq!(
            warnings.iter().map(|w| w.severity()).collect::<Vec<_>>(),
            vec![
                WarningSeverity::High,
                WarningSeverity::Medium,
                WarningSeverity::Low
            ]
        );
        assert!(WarningSeverity::High > WarningSeverity::Medium);
    }

    #[test]
    fn test_no_conflicts() {
        let result = DeletionValidationResult::new(vec![], TODAY);

        assert!(result.can_delete);
        assert!(!result.has_active_meal_plan_conflicts());
        assert_eq!(result.summary_message(), "Recipe can be safely deleted");
    }

    #[test]
    fn test_active_conflict() {
        let result =
            DeletionValidationResult::new(vec![plan("March", date!(2024 - 03 - 15))], TODAY);

        assert!(result.can_delete);
        assert!(result.has_active_meal_plan_conflicts());
        assert!(result.summary_message().contains("1 active meal plan"));
        assert!(!result.summary_message().contains("meal plans"));
    }

    #[test]
    fn test_inactive_conflict() {
        let result =
            DeletionValidationResult::new(vec![plan("January", date!(2024 - 01 - 01))], TODAY);

        assert!(!result.has_active_meal_plan_conflicts());
        assert!(result.summary_message().contains("1 meal plan"));
        assert!(!result.summary_message().contains("active"));
        assert_eq!(result.warnings[0].severity(), WarningSeverity::Medium);
    }

    #[test]
    fn test_mixed_conflicts_are_sorted_and_pluralized() {
        let template = plan("Base", date!(2024 - 01 - 01)).copy_with(MealPlanChanges {
            kind: Some(PlanKind::Template(TemplateInfo::new("Base", None).unwrap())),
            ..Default::default()
        });

        let result = DeletionValidationResult::new(
            vec![
                template,
                plan("January", date!(2024 - 01 - 01)),
                plan("March", date!(2024 - 03 - 15)),
                plan("Spring", date!(2024 - 03 - 01)),
            ],
            TODAY,
        );

        assert_eq!(
            result.summary_message(),
            "Recipe is used in 2 active meal plans and 2 other meal plans"
        );
        assert_eq!(
            result
                .warnings
                .iter()
                .map(|w| w.severity())
                .collect::<Vec<_>>(),
            vec![
                WarningSeverity::High,
                WarningSeverity::High,
                WarningSeverity::Medium,
                WarningSeverity::Low
            ]
        );
        assert_eq!(result.warnings[3].message(), "Used in template \"Base\"");
    }
}
