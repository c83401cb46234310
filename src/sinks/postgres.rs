use crate::config::{DatabaseConfig, WriteMode};
use crate::domain::model::CleanTable;
use crate::domain::ports::Sink;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{Connection, Executor, QueryBuilder};

// Postgres SQLSTATE for duplicate_database.
const DUPLICATE_DATABASE: &str = "42P04";

fn connect_options(config: &DatabaseConfig, database: &str) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(database)
        .username(&config.user)
        .password(&config.password)
}

/// Creates the target database via the administrative `postgres` database.
/// An already-existing database counts as success.
pub async fn create_database(config: &DatabaseConfig) -> Result<()> {
    let mut conn = PgConnection::connect_with(&connect_options(config, "postgres")).await?;

    let statement = format!("CREATE DATABASE \"{}\"", config.database);
    match conn.execute(statement.as_str()).await {
        Ok(_) => {
            tracing::info!(database = %config.database, "Database created");
            Ok(())
        }
        Err(sqlx::Error::Database(db_err))
            if db_err.code().as_deref() == Some(DUPLICATE_DATABASE) =>
        {
            tracing::info!(database = %config.database, "Database already exists, skipping");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn append_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (\
         title TEXT, price FLOAT8, rating FLOAT8, colors INTEGER, \
         size TEXT, gender TEXT, timestamp TEXT)"
    )
}

fn overwrite_table_ddl(table: &str) -> String {
    format!(
        "CREATE TABLE {table} (\
         title TEXT, price FLOAT8, rating FLOAT8, colors INTEGER, \
         size TEXT, gender TEXT, timestamp TIMESTAMP)"
    )
}

/// Capture timestamps are RFC 3339 when scraped live, but bare ISO
/// date-times are accepted too.
fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.naive_local());
    }
    Ok(text.parse::<NaiveDateTime>()?)
}

/// Loads the cleaned table into Postgres, either appending to or
/// overwriting the target table depending on the configured mode.
pub struct PostgresSink {
    config: DatabaseConfig,
}

impl PostgresSink {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    async fn connect(&self) -> Result<PgConnection> {
        Ok(PgConnection::connect_with(&connect_options(&self.config, &self.config.database)).await?)
    }

    /// Ensures the table exists, then inserts row by row inside one
    /// transaction.
    async fn append(&self, table: &CleanTable) -> Result<()> {
        let mut conn = self.connect().await?;
        conn.execute(append_table_ddl(&self.config.table).as_str())
            .await?;

        let insert = format!(
            "INSERT INTO {} (title, price, rating, colors, size, gender, timestamp) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            self.config.table
        );

        let mut tx = conn.begin().await?;
        for record in table {
            sqlx::query(&insert)
                .bind(&record.title)
                .bind(record.price)
                .bind(record.rating)
                .bind(record.colors)
                .bind(&record.size)
                .bind(&record.gender)
                .bind(&record.timestamp)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(table = %self.config.table, rows = table.len(), "Rows appended");
        Ok(())
    }

    /// Drops and recreates the table (timestamp as a true TIMESTAMP), then
    /// bulk-inserts everything in one multi-row statement.
    async fn overwrite(&self, table: &CleanTable) -> Result<()> {
        let timestamps = table
            .iter()
            .map(|record| parse_timestamp(&record.timestamp))
            .collect::<Result<Vec<_>>>()?;

        let mut conn = self.connect().await?;
        let mut tx = conn.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.config.table))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&overwrite_table_ddl(&self.config.table))
            .execute(&mut *tx)
            .await?;

        if !table.is_empty() {
            let mut builder: QueryBuilder<sqlx::Postgres> = QueryBuilder::new(format!(
                "INSERT INTO {} (title, price, rating, colors, size, gender, timestamp) ",
                self.config.table
            ));
            builder.push_values(table.iter().zip(timestamps), |mut b, (record, ts)| {
                b.push_bind(&record.title)
                    .push_bind(record.price)
                    .push_bind(record.rating)
                    .push_bind(record.colors)
                    .push_bind(&record.size)
                    .push_bind(&record.gender)
                    .push_bind(ts);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        tracing::info!(table = %self.config.table, rows = table.len(), "Table overwritten");
        Ok(())
    }
}

#[async_trait]
impl Sink for PostgresSink {
    fn name(&self) -> &str {
        "postgres"
    }

    async fn write(&self, table: &CleanTable) -> Result<()> {
        match self.config.mode {
            WriteMode::Append => self.append(table).await,
            WriteMode::Overwrite => self.overwrite(table).await,
        }
    }
}
