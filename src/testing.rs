//! In-memory repositories backing service and router tests.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::{repo::UserRepository, repo_types::User};
use crate::cards::{
    repo::CardRepository,
    repo_types::{Card, CardFields, CardQuery},
};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
    duplicate_next_create: AtomicBool,
}

impl MemoryUserRepository {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    /// Make the next `create` behave as if a concurrent insert won the race.
    pub fn fail_next_create_as_duplicate(&self) {
        self.duplicate_next_create.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> AppResult<User> {
        if self.duplicate_next_create.swap(false, Ordering::SeqCst) {
            return Err(AppError::DuplicateUsername);
        }
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == username) {
            return Err(AppError::DuplicateUsername);
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: users.len() as i64 + 1,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.id == id).cloned())
    }
}

/// Ids are handed out in insertion order, so "newest first" is id-descending.
#[derive(Default)]
pub struct MemoryCardRepository {
    cards: Mutex<Vec<Card>>,
}

fn apply(card: &mut Card, fields: &CardFields) {
    card.card_name = fields.card_name.clone();
    card.card_image_url = fields.card_image_url.clone();
    card.set_code = fields.set_code.clone();
    card.collector_number = fields.collector_number.clone();
    card.language = fields.language.clone();
    card.quantity = fields.quantity;
    card.buying_price = fields.buying_price;
    card.bought_date = fields.bought_date;
    card.sell_date = fields.sell_date;
}

fn matches_search(card: &Card, search: &str) -> bool {
    let needle = search.to_lowercase();
    [&card.card_name, &card.set_code, &card.collector_number]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

#[async_trait]
impl CardRepository for MemoryCardRepository {
    async fn create(&self, user_id: i64, fields: &CardFields) -> AppResult<Card> {
        let mut cards = self.cards.lock().unwrap();
        let now = OffsetDateTime::now_utc();
        let mut card = Card {
            id: cards.len() as i64 + 1,
            user_id,
            card_name: String::new(),
            card_image_url: String::new(),
            set_code: String::new(),
            collector_number: String::new(),
            language: String::new(),
            quantity: 1,
            buying_price: Default::default(),
            bought_date: None,
            sell_date: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        apply(&mut card, fields);
        cards.push(card.clone());
        Ok(card)
    }

    async fn update_owned(&self, card_id: i64, user_id: i64, fields: &CardFields) -> AppResult<Card> {
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .iter_mut()
            .find(|c| c.id == card_id && c.user_id == user_id && c.deleted_at.is_none())
            .ok_or(AppError::NotFound)?;
        apply(card, fields);
        card.updated_at = OffsetDateTime::now_utc();
        Ok(card.clone())
    }

    async fn soft_delete_owned(&self, card_id: i64, user_id: i64) -> AppResult<()> {
        let mut cards = self.cards.lock().unwrap();
        let card = cards
            .iter_mut()
            .find(|c| c.id == card_id && c.user_id == user_id && c.deleted_at.is_none())
            .ok_or(AppError::NotFound)?;
        card.deleted_at = Some(OffsetDateTime::now_utc());
        Ok(())
    }

    async fn find_owned(&self, card_id: i64, user_id: i64) -> AppResult<Option<Card>> {
        let cards = self.cards.lock().unwrap();
        Ok(cards
            .iter()
            .find(|c| c.id == card_id && c.user_id == user_id && c.deleted_at.is_none())
            .cloned())
    }

    async fn list_owned(&self, user_id: i64, query: &CardQuery) -> AppResult<(Vec<Card>, i64)> {
        let cards = self.cards.lock().unwrap();
        let mut matching: Vec<Card> = cards
            .iter()
            .filter(|c| c.user_id == user_id && c.deleted_at.is_none())
            .filter(|c| query.search.as_deref().map_or(true, |s| matches_search(c, s)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.id.cmp(&a.id));

        let total = matching.len() as i64;
        let Some(offset) = query.offset() else {
            return Ok((Vec::new(), total));
        };
        let items = matching
            .into_iter()
            .skip(offset as usize)
            .take(query.page_size as usize)
            .collect();
        Ok((items, total))
    }
}
