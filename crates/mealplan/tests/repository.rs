use std::collections::BTreeMap;

use plateplan_mealplan::{
    CreateMealPlan, MealPlan, MealPlanChanges, MealPlanRepository, MealPlanStore, PlanKind,
    RecipeLookup, RecipeQuery, RecipeSummary, TemplateInfo,
};
use temp_dir::TempDir;
use time::macros::date;

mod helpers;

#[tokio::test]
async fn test_store_preserves_plan() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path, date!(2024 - 03 - 20)).await?;
    let store = MealPlanStore(state.pool.clone());

    let plan = MealPlan::create(CreateMealPlan {
        name: "Goûters".to_owned(),
        family_id: "doe".to_owned(),
        start_date: date!(2024 - 02 - 20),
        meal_slots: vec!["petit_déjeuner".to_owned(), "kids dinner".to_owned()],
        assignments: BTreeMap::from([
            ("2024-02-29_petit_déjeuner".to_owned(), "r1".to_owned()),
            ("2024-03-18_kids dinner".to_owned(), "r2".to_owned()),
        ]),
        created_by: "john".to_owned(),
        kind: PlanKind::Template(TemplateInfo::new("Winter", Some("Cozy".to_owned()))?),
    });

    store.save(&plan).await?;

    let loaded = store.load_by_id(&plan.id).await?.unwrap();
    assert_eq!(loaded, plan);

    let renamed = plan.copy_with(MealPlanChanges {
        name: Some("Snacks".to_owned()),
        kind: Some(PlanKind::Regular),
        ..Default::default()
    });
    store.save(&renamed).await?;

    let all = store.load_all("doe").await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Snacks");
    assert_eq!(all[0].kind, PlanKind::Regular);
    assert_eq!(all[0].created_at, plan.created_at);

    assert!(store.load_by_id("missing").await?.is_none());
    assert!(store.load_all("smith").await?.is_empty());

    assert!(store.delete(&plan.id).await?);
    assert!(!store.delete(&plan.id).await?);

    Ok(())
}

#[tokio::test]
async fn test_template_row_without_name_is_an_error() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path, date!(2024 - 03 - 20)).await?;
    let store = MealPlanStore(state.pool.clone());

    sqlx::query(
        "INSERT INTO mealplan (id, family_id, name, start_date, meal_slots, assignments, created_by, created_at, updated_at, is_template) VALUES ('broken', 'doe', 'Broken', '2024-01-01', '[\"lunch\"]', '{}', 'john', 0, 0, 1)",
    )
    .execute(&state.pool)
    .await?;

    let err = store.load_by_id("broken").await.unwrap_err();
    assert!(matches!(err, plateplan_shared::Error::Server(_)));
    assert_eq!(err.to_string(), "template broken has no name");

    Ok(())
}

#[tokio::test]
async fn test_recipe_summaries_upsert() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path, date!(2024 - 03 - 20)).await?;
    let recipes = RecipeQuery(state.pool.clone());

    helpers::add_recipe(&state, "r1", "Pancakes").await?;
    recipes
        .upsert(
            "doe",
            &RecipeSummary {
                id: "r1".to_owned(),
                title: "Crêpes".to_owned(),
                prep_time: 20,
                servings: 2,
            },
        )
        .await?;
    helpers::add_recipe(&state, "r2", "Bagels").await?;

    let recipe = recipes.get_by_id("r1").await?.unwrap();
    assert_eq!(recipe.title, "Crêpes");
    assert_eq!(recipe.prep_time, 20);
    assert_eq!(recipe.servings, 2);

    assert!(recipes.get_by_id("r3").await?.is_none());
    assert_eq!(
        recipes
            .list("doe")
            .await?
            .into_iter()
            .map(|r| r.title)
            .collect::<Vec<_>>(),
        vec!["Bagels", "Crêpes"]
    );

    Ok(())
}
