use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};

/// Card row. `deleted_at` is the soft-delete tombstone; queries filter on it
/// explicitly.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Card {
    pub id: i64,
    pub user_id: i64,
    pub card_name: String,
    pub card_image_url: String,
    pub set_code: String,
    pub collector_number: String,
    pub language: String,
    pub quantity: i32,
    pub buying_price: Decimal,
    pub bought_date: Option<Date>,
    pub sell_date: Option<Date>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub deleted_at: Option<OffsetDateTime>,
}

/// Every user-editable column of a card.
#[derive(Debug, Clone, PartialEq)]
pub struct CardFields {
    pub card_name: String,
    pub card_image_url: String,
    pub set_code: String,
    pub collector_number: String,
    pub language: String,
    pub quantity: i32,
    pub buying_price: Decimal,
    pub bought_date: Option<Date>,
    pub sell_date: Option<Date>,
}

impl Default for CardFields {
    fn default() -> Self {
        Self {
            card_name: String::new(),
            card_image_url: String::new(),
            set_code: String::new(),
            collector_number: String::new(),
            language: String::new(),
            quantity: 1,
            buying_price: Decimal::ZERO,
            bought_date: None,
            sell_date: None,
        }
    }
}

/// Already-normalised listing parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardQuery {
    pub page: i64,
    pub page_size: i64,
    pub search: Option<String>,
}

impl CardQuery {
    /// `None` when the page lies past any representable offset.
    pub fn offset(&self) -> Option<i64> {
        (self.page - 1).checked_mul(self.page_size)
    }
}

/// `ILIKE` pattern matching `search` literally anywhere in the column.
pub fn contains_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
