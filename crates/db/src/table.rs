use sea_query::Iden;

#[derive(Iden, Clone)]
#[iden = "mealplan"]
pub enum MealPlan {
    Table,
    Id,
    FamilyId,
    Name,
    StartDate,
    MealSlots,
    Assignments,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    IsTemplate,
    TemplateName,
    TemplateDescription,
}

#[derive(Iden, Clone)]
#[iden = "mealplan_recipe"]
pub enum MealPlanRecipe {
    Table,
    Id,
    FamilyId,
    Title,
    PrepTime,
    Servings,
}
