use plateplan_db::table::MealPlanRecipe;
use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::{SqlitePool, prelude::FromRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct RecipeSummary {
    pub id: String,
    pub title: String,
    pub prep_time: u32,
    pub servings: u32,
}

#[async_trait::async_trait]
pub trait RecipeLookup: Send + Sync {
    async fn get_by_id(&self, id: &str) -> plateplan_shared::Result<Option<RecipeSummary>>;
}

/// Recipe summaries kept next to the plans that reference them.
#[derive(Clone)]
pub struct RecipeQuery(pub SqlitePool);

impl RecipeQuery {
    pub async fn upsert(
        &self,
        family_id: impl Into<String>,
        recipe: &RecipeSummary,
    ) -> plateplan_shared::Result<()> {
        let statement = Query::insert()
            .into_table(MealPlanRecipe::Table)
            .columns([
                MealPlanRecipe::Id,
                MealPlanRecipe::FamilyId,
                MealPlanRecipe::Title,
                MealPlanRecipe::PrepTime,
                MealPlanRecipe::Servings,
            ])
            .values_panic([
                recipe.id.to_owned().into(),
                family_id.into().into(),
                recipe.title.to_owned().into(),
                recipe.prep_time.into(),
                recipe.servings.into(),
            ])
            .on_conflict(
                OnConflict::column(MealPlanRecipe::Id)
                    .update_columns([
                        MealPlanRecipe::Title,
                        MealPlanRecipe::PrepTime,
                        MealPlanRecipe::Servings,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.0).await?;

        tracing::debug!(recipe_id = %recipe.id, "recipe summary saved");

        Ok(())
    }

    pub async fn list(
        &self,
        family_id: impl Into<String>,
    ) -> plateplan_shared::Result<Vec<RecipeSummary>> {
        let statement = Query::select()
            .columns([
                MealPlanRecipe::Id,
                MealPlanRecipe::Title,
                MealPlanRecipe::PrepTime,
                MealPlanRecipe::Servings,
            ])
            .from(MealPlanRecipe::Table)
            .and_where(Expr::col(MealPlanRecipe::FamilyId).eq(family_id.into()))
            .order_by(MealPlanRecipe::Title, sea_query::Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, RecipeSummary, _>(&sql, values)
            .fetch_all(&self.0)
            .await?)
    }
}

#[async_trait::async_trait]
impl RecipeLookup for RecipeQuery {
    async fn get_by_id(&self, id: &str) -> plateplan_shared::Result<Option<RecipeSummary>> {
        let statement = Query::select()
            .columns([
                MealPlanRecipe::Id,
                MealPlanRecipe::Title,
                MealPlanRecipe::PrepTime,
                MealPlanRecipe::Servings,
            ])
            .from(MealPlanRecipe::Table)
            .and_where(Expr::col(MealPlanRecipe::Id).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, RecipeSummary, _>(&sql, values)
            .fetch_optional(&self.0)
            .await?)
    }
}
