use std::collections::BTreeMap;

use plateplan_db::table::MealPlan as MealPlanTable;
use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};
use time::OffsetDateTime;

use crate::{MealPlan, PlanKind, TemplateInfo, key};

#[async_trait::async_trait]
pub trait MealPlanRepository: Send + Sync {
    /// Inserts or replaces the whole plan in a single statement.
    async fn save(&self, plan: &MealPlan) -> plateplan_shared::Result<()>;

    /// Every plan and template of the family, oldest start date first
    async fn load_all(&self, family_id: &str) -> plateplan_shared::Result<Vec<MealPlan>>;

    async fn load_by_id(&self, id: &str) -> plateplan_shared::Result<Option<MealPlan>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: &str) -> plateplan_shared::Result<bool>;
}

#[derive(Debug, FromRow)]
struct MealPlanRow {
    id: String,
    family_id: String,
    name: String,
    start_date: String,
    meal_slots: String,
    assignments: String,
    created_by: String,
    created_at: i64,
    updated_at: i64,
    is_template: bool,
    template_name: Option<String>,
    template_description: Option<String>,
}

impl TryFrom<MealPlanRow> for MealPlan {
    type Error = plateplan_shared::Error;

    fn try_from(row: MealPlanRow) -> Result<Self, Self::Error> {
        let start_date = key::parse_date(&row.start_date)
            .map_err(|e| anyhow::anyhow!("mealplan {} start_date: {e}", row.id))?;
        let meal_slots: Vec<String> = serde_json::from_str(&row.meal_slots)?;
        let assignments: BTreeMap<String, String> = serde_json::from_str(&row.assignments)?;

        let kind = match (row.is_template, row.template_name) {
            (false, _) => PlanKind::Regular,
            (true, Some(name)) => PlanKind::Template(TemplateInfo::new(
                name,
                row.template_description,
            )?),
            (true, None) => plateplan_shared::bail!("template {} has no name", row.id),
        };

        Ok(MealPlan {
            id: row.id,
            name: row.name,
            family_id: row.family_id,
            start_date,
            meal_slots,
            assignments,
            created_by: row.created_by,
            created_at: OffsetDateTime::from_unix_timestamp(row.created_at)
                .map_err(anyhow::Error::from)?,
            updated_at: OffsetDateTime::from_unix_timestamp(row.updated_at)
                .map_err(anyhow::Error::from)?,
            kind,
        })
    }
}

const COLUMNS: [MealPlanTable; 12] = [
    MealPlanTable::Id,
    MealPlanTable::FamilyId,
    MealPlanTable::Name,
    MealPlanTable::StartDate,
    MealPlanTable::MealSlots,
    MealPlanTable::Assignments,
    MealPlanTable::CreatedBy,
    MealPlanTable::CreatedAt,
    MealPlanTable::UpdatedAt,
    MealPlanTable::IsTemplate,
    MealPlanTable::TemplateName,
    MealPlanTable::TemplateDescription,
];

/// SQLite backed [`MealPlanRepository`].
#[derive(Clone)]
pub struct MealPlanStore(pub SqlitePool);

#[async_trait::async_trait]
impl MealPlanRepository for MealPlanStore {
    async fn save(&self, plan: &MealPlan) -> plateplan_shared::Result<()> {
        let start_date = key::format_date(plan.start_date)
            .map_err(|e| anyhow::anyhow!("mealplan {} start_date: {e}", plan.id))?;
        let meal_slots = serde_json::to_string(&plan.meal_slots)?;
        let assignments = serde_json::to_string(&plan.assignments)?;
        let template = plan.template();

        let statement = Query::insert()
            .into_table(MealPlanTable::Table)
            .columns(COLUMNS)
            .values_panic([
                plan.id.to_owned().into(),
                plan.family_id.to_owned().into(),
                plan.name.to_owned().into(),
                start_date.into(),
                meal_slots.into(),
                assignments.into(),
                plan.created_by.to_owned().into(),
                plan.created_at.unix_timestamp().into(),
                plan.updated_at.unix_timestamp().into(),
                template.is_some().into(),
                template.map(|t| t.name().to_owned()).into(),
                template
                    .and_then(|t| t.description())
                    .map(ToOwned::to_owned)
                    .into(),
            ])
            .on_conflict(
                OnConflict::column(MealPlanTable::Id)
                    .update_columns([
                        MealPlanTable::Name,
                        MealPlanTable::StartDate,
                        MealPlanTable::MealSlots,
                        MealPlanTable::Assignments,
                        MealPlanTable::UpdatedAt,
                        MealPlanTable::IsTemplate,
                        MealPlanTable::TemplateName,
                        MealPlanTable::TemplateDescription,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.0).await?;

        tracing::debug!(
            mealplan_id = %plan.id,
            assignments = plan.assignments.len(),
            "mealplan saved"
        );

        Ok(())
    }

    async fn load_all(&self, family_id: &str) -> plateplan_shared::Result<Vec<MealPlan>> {
        let statement = Query::select()
            .columns(COLUMNS)
            .from(MealPlanTable::Table)
            .and_where(Expr::col(MealPlanTable::FamilyId).eq(family_id))
            .order_by(MealPlanTable::StartDate, sea_query::Order::Asc)
            .order_by(MealPlanTable::Id, sea_query::Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, MealPlanRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        tracing::debug!(family_id, count = rows.len(), "mealplans loaded");

        rows.into_iter().map(MealPlan::try_from).collect()
    }

    async fn load_by_id(&self, id: &str) -> plateplan_shared::Result<Option<MealPlan>> {
        let statement = Query::select()
            .columns(COLUMNS)
            .from(MealPlanTable::Table)
            .and_where(Expr::col(MealPlanTable::Id).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, MealPlanRow, _>(&sql, values)
            .fetch_optional(&self.0)
            .await?;

        row.map(MealPlan::try_from).transpose()
    }

    async fn delete(&self, id: &str) -> plateplan_shared::Result<bool> {
        let statement = Query::delete()
            .from_table(MealPlanTable::Table)
            .and_where(Expr::col(MealPlanTable::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(&self.0).await?;

        Ok(result.rows_affected() > 0)
    }
}
