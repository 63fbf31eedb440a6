// shop_api/src/db.rs

//! Postgres order storage: one JSON document per cart token.

use async_trait::async_trait;
use checkout_core::{CheckoutResult, Order, OrderRepository, OrderToken};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{info, instrument};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS checkout_orders (
  token       TEXT PRIMARY KEY,
  channel     TEXT NOT NULL,
  state       TEXT NOT NULL,
  document    JSONB NOT NULL,
  updated_at  TIMESTAMPTZ NOT NULL
)
"#;

#[derive(Debug, Clone)]
pub struct PgOrderRepository {
  pool: PgPool,
}

impl PgOrderRepository {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
    let pool = PgPool::connect(database_url).await?;
    info!("Successfully connected to the database.");
    Ok(Self::new(pool))
  }

  pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
    sqlx::query(SCHEMA).execute(&self.pool).await?;
    Ok(())
  }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
  #[instrument(name = "PgOrderRepository::find_by_token", skip(self), err(Display))]
  async fn find_by_token(&self, token: &OrderToken) -> CheckoutResult<Option<Order>> {
    let document = sqlx::query_scalar::<_, Json<Order>>("SELECT document FROM checkout_orders WHERE token = $1")
      .bind(token.as_str())
      .fetch_optional(&self.pool)
      .await
      .map_err(anyhow::Error::from)?;
    Ok(document.map(|Json(order)| order))
  }

  #[instrument(name = "PgOrderRepository::save", skip(self, order), fields(token = %order.token), err(Display))]
  async fn save(&self, order: &Order) -> CheckoutResult<()> {
    sqlx::query(
      "INSERT INTO checkout_orders (token, channel, state, document, updated_at) VALUES ($1, $2, $3, $4, $5) \
       ON CONFLICT (token) DO UPDATE SET state = EXCLUDED.state, document = EXCLUDED.document, updated_at = EXCLUDED.updated_at",
    )
    .bind(order.token.as_str())
    .bind(order.channel.as_str())
    .bind(order.state.to_string())
    .bind(Json(order))
    .bind(order.updated_at)
    .execute(&self.pool)
    .await
    .map_err(anyhow::Error::from)?;
    Ok(())
  }

  #[instrument(name = "PgOrderRepository::insert_new", skip(self, order), fields(token = %order.token), err(Display))]
  async fn insert_new(&self, order: &Order) -> CheckoutResult<bool> {
    let result = sqlx::query(
      "INSERT INTO checkout_orders (token, channel, state, document, updated_at) VALUES ($1, $2, $3, $4, $5) \
       ON CONFLICT (token) DO NOTHING",
    )
    .bind(order.token.as_str())
    .bind(order.channel.as_str())
    .bind(order.state.to_string())
    .bind(Json(order))
    .bind(order.updated_at)
    .execute(&self.pool)
    .await
    .map_err(anyhow::Error::from)?;
    Ok(result.rows_affected() == 1)
  }

  async fn exists(&self, token: &OrderToken) -> CheckoutResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM checkout_orders WHERE token = $1)")
      .bind(token.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(anyhow::Error::from)?;
    Ok(exists)
  }
}
