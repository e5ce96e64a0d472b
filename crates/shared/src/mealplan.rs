/// Failures caused by what the caller asked for rather than by the shape of
/// the data. They are user-actionable and never retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MealPlanError {
    #[error("a template named \"{0}\" already exists, choose a different template name")]
    DuplicateTemplateName(String),

    #[error("template name is required")]
    EmptyTemplateName,

    #[error("meal plan is not a template")]
    NotATemplate,

    #[error("meal slot \"{0}\" is not part of this meal plan")]
    UnknownMealSlot(String),

    #[error("invalid assignment key \"{key}\": {reason}")]
    InvalidAssignmentKey { key: String, reason: String },

    #[error("{date} is outside the 4-week window starting {start}")]
    OutsideWindow { date: String, start: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_into_shared_error() {
        let err: crate::Error = MealPlanError::NotATemplate.into();

        assert!(matches!(
            err,
            crate::Error::MealPlan(MealPlanError::NotATemplate)
        ));
        assert_eq!(err.to_string(), "meal plan is not a template");
    }
}
