//! Postgres-backed ship store.
//!
//! Filters are rendered into a parameterized `WHERE` clause with
//! [`sqlx::QueryBuilder`]; every user-supplied value is bound, never spliced.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (check / not-null / string too long) | `23514`, `23502`, `22001` | `Storage` |
//! | Database (serialization failure) | `40001` | `Conflict` |
//! | Database (other) | Any other | `Storage` |
//! | PoolClosed / Io / other | N/A | `Storage` |

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use shipyard_core::{ExpectedVersion, ShipId};
use shipyard_ships::{NewShip, PageRequest, Predicate, RangeFilter, Ship, ShipFilter, ShipOrder};

use super::r#trait::{ShipStore, StoreError};

const SELECT_SHIPS: &str = r#"
    SELECT id, name, planet, ship_type, prod_date, is_used, speed, crew_size, rating, version
    FROM ship
"#;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS ship (
        id         BIGSERIAL PRIMARY KEY,
        name       VARCHAR(50)      NOT NULL,
        planet     VARCHAR(50)      NOT NULL,
        ship_type  VARCHAR(16)      NOT NULL,
        prod_date  TIMESTAMPTZ      NOT NULL,
        is_used    BOOLEAN          NOT NULL DEFAULT FALSE,
        speed      DOUBLE PRECISION NOT NULL,
        crew_size  INTEGER          NOT NULL,
        rating     DOUBLE PRECISION NOT NULL,
        version    BIGINT           NOT NULL DEFAULT 0
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ship_speed_idx ON ship (speed)",
    "CREATE INDEX IF NOT EXISTS ship_prod_date_idx ON ship (prod_date)",
    "CREATE INDEX IF NOT EXISTS ship_rating_idx ON ship (rating)",
];

/// Postgres-backed ship table.
///
/// `PostgresShipStore` is `Send + Sync`; connection management is left to the
/// SQLx pool.
#[derive(Debug, Clone)]
pub struct PostgresShipStore {
    pool: Arc<PgPool>,
}

impl PostgresShipStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `ship` table and its indexes if they are missing.
    #[instrument(skip(self), err)]
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&*self.pool)
                .await
                .map_err(|e| map_sqlx_error("migrate", e))?;
        }
        tracing::info!("ship schema ready");
        Ok(())
    }
}

#[derive(Debug)]
struct ShipRow {
    id: i64,
    name: String,
    planet: String,
    ship_type: String,
    prod_date: DateTime<Utc>,
    is_used: bool,
    speed: f64,
    crew_size: i32,
    rating: f64,
    version: i64,
}

impl<'r> sqlx::FromRow<'r, PgRow> for ShipRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ShipRow {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            planet: row.try_get("planet")?,
            ship_type: row.try_get("ship_type")?,
            prod_date: row.try_get("prod_date")?,
            is_used: row.try_get("is_used")?,
            speed: row.try_get("speed")?,
            crew_size: row.try_get("crew_size")?,
            rating: row.try_get("rating")?,
            version: row.try_get("version")?,
        })
    }
}

impl TryFrom<ShipRow> for Ship {
    type Error = StoreError;

    fn try_from(row: ShipRow) -> Result<Self, Self::Error> {
        let ship_type = row
            .ship_type
            .parse()
            .map_err(|e| StoreError::CorruptRow(format!("ship {}: {e}", row.id)))?;
        let version = u64::try_from(row.version)
            .map_err(|_| StoreError::CorruptRow(format!("ship {}: negative version", row.id)))?;

        Ok(Ship {
            id: ShipId::from_raw(row.id),
            name: row.name,
            planet: row.planet,
            ship_type,
            prod_date: row.prod_date,
            is_used: row.is_used,
            speed: row.speed,
            crew_size: row.crew_size,
            rating: row.rating,
            version,
        })
    }
}

/// Append ` WHERE <p1> AND <p2> ...` for the filter's predicates.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ShipFilter) {
    if filter.is_unfiltered() {
        return;
    }

    qb.push(" WHERE ");
    for (idx, predicate) in filter.predicates().iter().enumerate() {
        if idx > 0 {
            qb.push(" AND ");
        }
        push_predicate(qb, predicate);
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        // strpos keeps `%` and `_` in the needle literal.
        Predicate::NameContains(needle) => {
            qb.push("strpos(name, ").push_bind(needle.clone()).push(") > 0");
        }
        Predicate::PlanetContains(needle) => {
            qb.push("strpos(planet, ").push_bind(needle.clone()).push(") > 0");
        }
        Predicate::ShipTypeIs(ship_type) => {
            qb.push("ship_type = ").push_bind(ship_type.as_str());
        }
        Predicate::ProdDateWithin(range) => push_range(qb, "prod_date", range),
        Predicate::IsUsed(is_used) => {
            qb.push("is_used = ").push_bind(*is_used);
        }
        Predicate::SpeedWithin(range) => push_range(qb, "speed", range),
        Predicate::CrewSizeWithin(range) => push_range(qb, "crew_size", range),
        Predicate::RatingWithin(range) => push_range(qb, "rating", range),
    }
}

fn push_range<'args, T>(
    qb: &mut QueryBuilder<'args, Postgres>,
    column: &'static str,
    range: &RangeFilter<T>,
) where
    T: 'args + Copy + Send + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres>,
{
    match (range.min, range.max) {
        (Some(min), Some(max)) => {
            qb.push(column)
                .push(" BETWEEN ")
                .push_bind(min)
                .push(" AND ")
                .push_bind(max);
        }
        (Some(min), None) => {
            qb.push(column).push(" >= ").push_bind(min);
        }
        (None, Some(max)) => {
            qb.push(column).push(" <= ").push_bind(max);
        }
        (None, None) => {
            qb.push("TRUE");
        }
    }
}

fn expected_version_param(expected: ExpectedVersion) -> Result<Option<i64>, StoreError> {
    match expected {
        ExpectedVersion::Any => Ok(None),
        ExpectedVersion::Exact(v) => i64::try_from(v)
            .map(Some)
            .map_err(|_| StoreError::Conflict(format!("version {v} out of range"))),
    }
}

#[async_trait::async_trait]
impl ShipStore for PostgresShipStore {
    #[instrument(skip(self, ship), fields(name = %ship.name), err)]
    async fn insert(&self, ship: NewShip) -> Result<Ship, StoreError> {
        let row = sqlx::query_as::<_, ShipRow>(
            r#"
            INSERT INTO ship (name, planet, ship_type, prod_date, is_used, speed, crew_size, rating)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, name, planet, ship_type, prod_date, is_used, speed, crew_size, rating, version
            "#,
        )
        .bind(&ship.name)
        .bind(&ship.planet)
        .bind(ship.ship_type.as_str())
        .bind(ship.prod_date)
        .bind(ship.is_used)
        .bind(ship.speed)
        .bind(ship.crew_size)
        .bind(ship.rating)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        row.try_into()
    }

    #[instrument(skip(self), fields(ship_id = %id), err)]
    async fn get(&self, id: ShipId) -> Result<Option<Ship>, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SHIPS);
        qb.push(" WHERE id = ").push_bind(id.get());

        let row = qb
            .build_query_as::<ShipRow>()
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.map(Ship::try_from).transpose()
    }

    #[instrument(
        skip(self, filter),
        fields(predicates = filter.predicates().len(), order = ?order),
        err
    )]
    async fn find(
        &self,
        filter: &ShipFilter,
        order: ShipOrder,
        page: PageRequest,
    ) -> Result<Vec<Ship>, StoreError> {
        let limit = i64::try_from(page.limit()).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);

        let mut qb = QueryBuilder::<Postgres>::new(SELECT_SHIPS);
        push_filter(&mut qb, filter);
        qb.push(" ORDER BY ").push(order.column());
        if order != ShipOrder::Id {
            qb.push(", id");
        }
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<ShipRow>()
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find", e))?;

        rows.into_iter().map(Ship::try_from).collect()
    }

    #[instrument(skip(self, filter), fields(predicates = filter.predicates().len()), err)]
    async fn count(&self, filter: &ShipFilter) -> Result<u64, StoreError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ship");
        push_filter(&mut qb, filter);

        let total: i64 = qb
            .build_query_scalar()
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        Ok(u64::try_from(total).unwrap_or(0))
    }

    #[instrument(skip(self, ship), fields(ship_id = %ship.id, expected = ?expected), err)]
    async fn update(&self, ship: &Ship, expected: ExpectedVersion) -> Result<Ship, StoreError> {
        let expected_param = expected_version_param(expected)?;

        let row = sqlx::query_as::<_, ShipRow>(
            r#"
            UPDATE ship
            SET name = $2,
                planet = $3,
                ship_type = $4,
                prod_date = $5,
                is_used = $6,
                speed = $7,
                crew_size = $8,
                rating = $9,
                version = version + 1
            WHERE id = $1
                AND ($10::bigint IS NULL OR version = $10)
            RETURNING id, name, planet, ship_type, prod_date, is_used, speed, crew_size, rating, version
            "#,
        )
        .bind(ship.id.get())
        .bind(&ship.name)
        .bind(&ship.planet)
        .bind(ship.ship_type.as_str())
        .bind(ship.prod_date)
        .bind(ship.is_used)
        .bind(ship.speed)
        .bind(ship.crew_size)
        .bind(ship.rating)
        .bind(expected_param)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        if let Some(row) = row {
            return row.try_into();
        }

        // Nothing updated: either the row is gone or its version moved on.
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM ship WHERE id = $1)")
            .bind(ship.id.get())
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_exists", e))?;

        if exists {
            Err(StoreError::Conflict(format!(
                "ship {} was modified concurrently (expected: {expected:?})",
                ship.id
            )))
        } else {
            Err(StoreError::NotFound(ship.id))
        }
    }

    #[instrument(skip(self), fields(ship_id = %id), err)]
    async fn delete(&self, id: ShipId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM ship WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Serialization failure
                Some("40001") => StoreError::Conflict(msg),
                _ => StoreError::Storage(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Storage(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::ColumnDecode { index, source } => StoreError::CorruptRow(format!(
            "failed to decode column {} in {}: {}",
            index, operation, source
        )),
        _ => StoreError::Storage(format!("sqlx error in {}: {}", operation, err)),
    }
}
