use sea_query::{
    ColumnDef, Expr, ExprTrait, Index, IndexCreateStatement, IndexDropStatement, Query, Table,
    TableCreateStatement, TableDropStatement,
};
use ulid::Ulid;

use crate::table::Tag;

/// Tags shipped with a fresh database, matching the ones the frontend expects.
const DEFAULT_TAGS: [(&str, &str, &str); 3] = [
    ("Breakfast", "#90EE90", "breakfast"),
    ("Lunch", "#ADD8E6", "lunch"),
    ("Dinner", "#FF7F50", "dinner"),
];

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Tag::Table)
        .col(
            ColumnDef::new(Tag::Id)
                .string()
                .not_null()
                .string_len(26)
                .primary_key(),
        )
        .col(
            ColumnDef::new(Tag::Name)
                .string()
                .not_null()
                .string_len(200),
        )
        .col(
            ColumnDef::new(Tag::Color)
                .string()
                .not_null()
                .string_len(7),
        )
        .col(
            ColumnDef::new(Tag::Slug)
                .string()
                .not_null()
                .string_len(200),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Tag::Table).to_owned()
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

pub struct CreateUk1;

fn create_uk_1() -> IndexCreateStatement {
    Index::create()
        .name("uk_tag_slug")
        .table(Tag::Table)
        .unique()
        .col(Tag::Slug)
        .to_owned()
}

fn drop_uk_1() -> IndexDropStatement {
    Index::drop().name("uk_tag_slug").table(Tag::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateUk1 {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = create_uk_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statement = drop_uk_1().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statement).execute(connection).await?;

        Ok(())
    }
}

pub struct SeedDefaults;

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for SeedDefaults {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        for (name, color, slug) in DEFAULT_TAGS {
            let statement = Query::insert()
                .into_table(Tag::Table)
                .columns([Tag::Id, Tag::Name, Tag::Color, Tag::Slug])
                .values_panic([
                    Ulid::new().to_string().into(),
                    name.into(),
                    color.into(),
                    slug.into(),
                ])
                .to_owned()
                .to_string(sea_query::SqliteQueryBuilder);
            sqlx::query(&statement).execute(&mut *connection).await?;
        }

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        for (_, _, slug) in DEFAULT_TAGS {
            let statement = Query::delete()
                .from_table(Tag::Table)
                .and_where(Expr::col(Tag::Slug).eq(slug))
                .to_owned()
                .to_string(sea_query::SqliteQueryBuilder);
            sqlx::query(&statement).execute(&mut *connection).await?;
        }

        Ok(())
    }
}
