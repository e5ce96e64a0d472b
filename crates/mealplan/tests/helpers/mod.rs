use std::{path::PathBuf, str::FromStr};

use plateplan_mealplan::{
    Clock, CreateMealPlan, MealPlan, MealPlanStore, PlanKind, RecipeQuery, RecipeSummary, Service,
};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};
use time::Date;

pub type TestService = Service<MealPlanStore, RecipeQuery>;

pub struct TestState {
    pub pool: SqlitePool,
    pub service: TestService,
}

pub async fn setup_test_state(path: PathBuf, today: Date) -> anyhow::Result<TestState> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    plateplan_db::migrator::<sqlx::Sqlite>()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    let service = Service::new(MealPlanStore(pool.clone()), RecipeQuery(pool.clone()))
        .with_clock(Clock::Fixed(today));

    Ok(TestState { pool, service })
}

#[allow(dead_code)]
pub async fn create_plan(
    state: &TestState,
    name: impl Into<String>,
    start_date: Date,
    assignments: &[(&str, &str)],
) -> anyhow::Result<MealPlan> {
    let plan = state
        .service
        .create(CreateMealPlan {
            name: name.into(),
            family_id: "doe".to_owned(),
            start_date,
            meal_slots: plateplan_mealplan::default_meal_slots(),
            assignments: assignments
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            created_by: "john".to_owned(),
            kind: PlanKind::Regular,
        })
        .await?;

    Ok(plan)
}

#[allow(dead_code)]
pub async fn add_recipe(state: &TestState, id: &str, title: &str) -> anyhow::Result<()> {
    RecipeQuery(state.pool.clone())
        .upsert(
            "doe",
            &RecipeSummary {
                id: id.to_owned(),
                title: title.to_owned(),
                prep_time: 15,
                servings: 4,
            },
        )
        .await?;

    Ok(())
}
