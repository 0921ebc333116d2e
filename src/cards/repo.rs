use async_trait::async_trait;
use sqlx::PgPool;

use crate::cards::repo_types::{contains_pattern, Card, CardFields, CardQuery};
use crate::error::{AppError, AppResult};

const CARD_COLUMNS: &str = "id, user_id, card_name, card_image_url, set_code, collector_number, \
     language, quantity, buying_price, bought_date, sell_date, created_at, updated_at, deleted_at";

/// Card storage. Every method that touches an existing card is keyed by both
/// the card id and the owning user id, and ignores soft-deleted rows.
#[async_trait]
pub trait CardRepository: Send + Sync {
    async fn create(&self, user_id: i64, fields: &CardFields) -> AppResult<Card>;
    /// Overwrite all editable fields; `NotFound` when no live owned row matched.
    async fn update_owned(&self, card_id: i64, user_id: i64, fields: &CardFields) -> AppResult<Card>;
    /// Set `deleted_at`; `NotFound` when no live owned row matched.
    async fn soft_delete_owned(&self, card_id: i64, user_id: i64) -> AppResult<()>;
    async fn find_owned(&self, card_id: i64, user_id: i64) -> AppResult<Option<Card>>;
    /// One page of live cards, newest first, plus the total matching count.
    async fn list_owned(&self, user_id: i64, query: &CardQuery) -> AppResult<(Vec<Card>, i64)>;
}

#[derive(Clone)]
pub struct PgCardRepository {
    db: PgPool,
}

impl PgCardRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CardRepository for PgCardRepository {
    async fn create(&self, user_id: i64, fields: &CardFields) -> AppResult<Card> {
        let sql = format!(
            r#"
            INSERT INTO cards (user_id, card_name, card_image_url, set_code, collector_number,
                               language, quantity, buying_price, bought_date, sell_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {CARD_COLUMNS}
            "#
        );
        let card = sqlx::query_as::<_, Card>(&sql)
            .bind(user_id)
            .bind(&fields.card_name)
            .bind(&fields.card_image_url)
            .bind(&fields.set_code)
            .bind(&fields.collector_number)
            .bind(&fields.language)
            .bind(fields.quantity)
            .bind(fields.buying_price)
            .bind(fields.bought_date)
            .bind(fields.sell_date)
            .fetch_one(&self.db)
            .await?;
        Ok(card)
    }

    async fn update_owned(&self, card_id: i64, user_id: i64, fields: &CardFields) -> AppResult<Card> {
        let sql = format!(
            r#"
            UPDATE cards
               SET card_name = $3, card_image_url = $4, set_code = $5, collector_number = $6,
                   language = $7, quantity = $8, buying_price = $9, bought_date = $10,
                   sell_date = $11, updated_at = NOW()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            RETURNING {CARD_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Card>(&sql)
            .bind(card_id)
            .bind(user_id)
            .bind(&fields.card_name)
            .bind(&fields.card_image_url)
            .bind(&fields.set_code)
            .bind(&fields.collector_number)
            .bind(&fields.language)
            .bind(fields.quantity)
            .bind(fields.buying_price)
            .bind(fields.bought_date)
            .bind(fields.sell_date)
            .fetch_optional(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn soft_delete_owned(&self, card_id: i64, user_id: i64) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE cards
               SET deleted_at = NOW()
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(card_id)
        .bind(user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    async fn find_owned(&self, card_id: i64, user_id: i64) -> AppResult<Option<Card>> {
        let sql = format!(
            r#"
            SELECT {CARD_COLUMNS}
              FROM cards
             WHERE id = $1 AND user_id = $2 AND deleted_at IS NULL
            "#
        );
        let card = sqlx::query_as::<_, Card>(&sql)
            .bind(card_id)
            .bind(user_id)
            .fetch_optional(&self.db)
            .await?;
        Ok(card)
    }

    async fn list_owned(&self, user_id: i64, query: &CardQuery) -> AppResult<(Vec<Card>, i64)> {
        // NULL pattern disables the search filter.
        let pattern = query.search.as_deref().map(contains_pattern);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
              FROM cards
             WHERE user_id = $1 AND deleted_at IS NULL
               AND ($2::TEXT IS NULL
                    OR card_name ILIKE $2 OR set_code ILIKE $2 OR collector_number ILIKE $2)
            "#,
        )
        .bind(user_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.db)
        .await?;

        let Some(offset) = query.offset() else {
            return Ok((Vec::new(), total));
        };

        let sql = format!(
            r#"
            SELECT {CARD_COLUMNS}
              FROM cards
             WHERE user_id = $1 AND deleted_at IS NULL
               AND ($2::TEXT IS NULL
                    OR card_name ILIKE $2 OR set_code ILIKE $2 OR collector_number ILIKE $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4
            "#
        );
        let cards = sqlx::query_as::<_, Card>(&sql)
            .bind(user_id)
            .bind(pattern.as_deref())
            .bind(query.page_size)
            .bind(offset)
            .fetch_all(&self.db)
            .await?;

        Ok((cards, total))
    }
}
