use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::MealPlan;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(MealPlan::Table)
        .col(
            ColumnDef::new(MealPlan::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(MealPlan::FamilyId)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(
            ColumnDef::new(MealPlan::Name)
                .string()
                .not_null()
                .string_len(100),
        )
        .col(
            ColumnDef::new(MealPlan::StartDate)
                .string()
                .not_null()
                .string_len(10),
        )
        .col(ColumnDef::new(MealPlan::MealSlots).text().not_null())
        .col(ColumnDef::new(MealPlan::Assignments).text().not_null())
        .col(
            ColumnDef::new(MealPlan::CreatedBy)
                .string()
                .not_null()
                .string_len(26),
        )
        .col(ColumnDef::new(MealPlan::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(MealPlan::UpdatedAt).big_integer().not_null())
        .col(
            ColumnDef::new(MealPlan::IsTemplate)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(MealPlan::TemplateName)
                .string()
                .null()
                .string_len(100),
        )
        .col(ColumnDef::new(MealPlan::TemplateDescription).text().null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(MealPlan::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct CreateFamilyIdx;

fn create_family_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_mealplan_family_id")
        .table(MealPlan::Table)
        .col(MealPlan::FamilyId)
        .col(MealPlan::StartDate)
        .to_owned()
}

fn drop_family_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_mealplan_family_id")
        .table(MealPlan::Table)
        .to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateFamilyIdx {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_family_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_family_idx().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}
