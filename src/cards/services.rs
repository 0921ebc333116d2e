use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::cards::{
    repo::CardRepository,
    repo_types::{Card, CardFields, CardQuery},
};
use crate::error::{AppError, AppResult};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;
/// Page links shown on each side of the current page.
pub const PAGE_LINK_RADIUS: i64 = 2;

/// One page of a user's collection.
#[derive(Debug, Clone)]
pub struct CardPage {
    pub items: Vec<Card>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl CardPage {
    pub fn total_pages(&self) -> i64 {
        (self.total + self.page_size - 1) / self.page_size
    }

    /// Page numbers to link, centred on the current page and clamped to the
    /// last page. Empty when there is nothing to page through.
    pub fn page_window(&self) -> Vec<i64> {
        let last = self.total_pages();
        if last == 0 {
            return Vec::new();
        }
        let centre = self.page.min(last);
        let start = (centre - PAGE_LINK_RADIUS).max(1);
        let end = centre.saturating_add(PAGE_LINK_RADIUS).min(last);
        (start..=end).collect()
    }

    pub fn prev_page(&self) -> Option<i64> {
        let last = self.total_pages();
        (self.page > 1 && last > 0).then(|| (self.page - 1).min(last))
    }

    pub fn next_page(&self) -> Option<i64> {
        (self.page < self.total_pages()).then(|| self.page + 1)
    }
}

pub fn normalize_quantity(quantity: i32) -> i32 {
    quantity.max(1)
}

/// Page below 1 becomes 1; a page size outside `1..=100` (or none) becomes 20.
pub fn normalize_paging(page: i64, page_size: Option<i64>) -> (i64, i64) {
    let page = page.max(1);
    let page_size = page_size
        .filter(|size| (1..=MAX_PAGE_SIZE).contains(size))
        .unwrap_or(DEFAULT_PAGE_SIZE);
    (page, page_size)
}

#[derive(Clone)]
pub struct CardService {
    cards: Arc<dyn CardRepository>,
}

impl CardService {
    pub fn new(cards: Arc<dyn CardRepository>) -> Self {
        Self { cards }
    }

    #[instrument(skip(self, fields))]
    pub async fn create_card(&self, owner_id: i64, mut fields: CardFields) -> AppResult<Card> {
        fields.quantity = normalize_quantity(fields.quantity);
        let card = self.cards.create(owner_id, &fields).await?;
        info!(card_id = card.id, owner_id, "card created");
        Ok(card)
    }

    /// Not-owned and missing cards both report `NotFound`.
    #[instrument(skip(self, fields))]
    pub async fn update_card(&self, card_id: i64, owner_id: i64, mut fields: CardFields) -> AppResult<Card> {
        if self.cards.find_owned(card_id, owner_id).await?.is_none() {
            warn!(card_id, owner_id, "update of missing or foreign card");
            return Err(AppError::NotFound);
        }
        fields.quantity = normalize_quantity(fields.quantity);
        let card = self.cards.update_owned(card_id, owner_id, &fields).await?;
        info!(card_id, owner_id, "card updated");
        Ok(card)
    }

    #[instrument(skip(self))]
    pub async fn delete_card(&self, card_id: i64, owner_id: i64) -> AppResult<()> {
        self.cards.soft_delete_owned(card_id, owner_id).await?;
        info!(card_id, owner_id, "card deleted");
        Ok(())
    }

    pub async fn get_card(&self, card_id: i64, owner_id: i64) -> AppResult<Card> {
        self.cards
            .find_owned(card_id, owner_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    #[instrument(skip(self))]
    pub async fn list_cards(
        &self,
        owner_id: i64,
        page: i64,
        page_size: Option<i64>,
        search: &str,
    ) -> AppResult<CardPage> {
        let (page, page_size) = normalize_paging(page, page_size);
        let search = search.trim();
        let query = CardQuery {
            page,
            page_size,
            search: (!search.is_empty()).then(|| search.to_string()),
        };
        let (items, total) = self.cards.list_owned(owner_id, &query).await?;
        Ok(CardPage {
            items,
            total,
            page,
            page_size,
        })
    }
}
