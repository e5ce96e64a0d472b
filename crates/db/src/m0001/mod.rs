mod mealplan;
mod mealplan_recipe;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "plateplan",
    "m0001",
    vec_box![],
    vec_box![
        mealplan::CreateTable,
        mealplan::CreateFamilyIdx,
        mealplan_recipe::CreateTable
    ]
);
