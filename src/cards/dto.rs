use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{format_description::FormatItem, macros::format_description, Date};

use crate::cards::repo_types::{Card, CardFields};

const FORM_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Add/edit form body. Every field arrives as text and is parsed leniently.
#[derive(Debug, Clone, Deserialize)]
pub struct CardForm {
    #[serde(default)]
    pub card_name: String,
    #[serde(default)]
    pub card_image_url: String,
    #[serde(default)]
    pub set_code: String,
    #[serde(default)]
    pub collector_number: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub buying_price: String,
    #[serde(default)]
    pub bought_date: String,
    #[serde(default)]
    pub sell_date: String,
}

impl CardForm {
    /// Unparseable quantity becomes 0 (the service floors it to 1), an
    /// unparseable or negative price becomes 0 and a bad date becomes none.
    pub fn to_fields(&self) -> CardFields {
        CardFields {
            card_name: self.card_name.trim().to_string(),
            card_image_url: self.card_image_url.trim().to_string(),
            set_code: self.set_code.trim().to_string(),
            collector_number: self.collector_number.trim().to_string(),
            language: self.language.trim().to_string(),
            quantity: self.quantity.trim().parse().unwrap_or(0),
            buying_price: parse_price(&self.buying_price),
            bought_date: parse_form_date(&self.bought_date),
            sell_date: parse_form_date(&self.sell_date),
        }
    }
}

fn parse_price(raw: &str) -> Decimal {
    raw.trim()
        .parse::<Decimal>()
        .ok()
        .filter(|price| !price.is_sign_negative())
        .map(|price| price.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

pub fn parse_form_date(raw: &str) -> Option<Date> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    Date::parse(raw, FORM_DATE).ok()
}

pub fn format_form_date(date: Option<Date>) -> String {
    date.and_then(|d| d.format(FORM_DATE).ok())
        .unwrap_or_default()
}

/// Card as shown in pages and prefilled into forms.
#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: Option<i64>,
    pub card_name: String,
    pub card_image_url: String,
    pub set_code: String,
    pub collector_number: String,
    pub language: String,
    pub quantity: String,
    pub buying_price: String,
    pub bought_date: String,
    pub sell_date: String,
}

impl Default for CardView {
    fn default() -> Self {
        Self {
            id: None,
            card_name: String::new(),
            card_image_url: String::new(),
            set_code: String::new(),
            collector_number: String::new(),
            language: String::new(),
            quantity: "1".into(),
            buying_price: String::new(),
            bought_date: String::new(),
            sell_date: String::new(),
        }
    }
}

impl From<&Card> for CardView {
    fn from(card: &Card) -> Self {
        Self {
            id: Some(card.id),
            card_name: card.card_name.clone(),
            card_image_url: card.card_image_url.clone(),
            set_code: card.set_code.clone(),
            collector_number: card.collector_number.clone(),
            language: card.language.clone(),
            quantity: card.quantity.to_string(),
            buying_price: card.buying_price.round_dp(2).to_string(),
            bought_date: format_form_date(card.bought_date),
            sell_date: format_form_date(card.sell_date),
        }
    }
}

/// Redisplay exactly what the user typed.
impl From<&CardForm> for CardView {
    fn from(form: &CardForm) -> Self {
        Self {
            id: None,
            card_name: form.card_name.clone(),
            card_image_url: form.card_image_url.clone(),
            set_code: form.set_code.clone(),
            collector_number: form.collector_number.clone(),
            language: form.language.clone(),
            quantity: form.quantity.clone(),
            buying_price: form.buying_price.clone(),
            bought_date: form.bought_date.clone(),
            sell_date: form.sell_date.clone(),
        }
    }
}

/// `/cards` query string. Values stay text so garbage falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub search: Option<String>,
}

impl ListQuery {
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(1)
    }

    pub fn page_size(&self) -> Option<i64> {
        self.page_size.as_deref().and_then(|p| p.trim().parse().ok())
    }

    pub fn search(&self) -> &str {
        self.search.as_deref().unwrap_or_default().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn form(quantity: &str, price: &str, bought: &str) -> CardForm {
        CardForm {
            card_name: " Lightning Bolt ".into(),
            card_image_url: String::new(),
            set_code: "LEA".into(),
            collector_number: "161".into(),
            language: "en".into(),
            quantity: quantity.into(),
            buying_price: price.into(),
            bought_date: bought.into(),
            sell_date: String::new(),
        }
    }

    #[test]
    fn parses_well_formed_fields() {
        let fields = form("4", "12.50", "2024-03-09").to_fields();
        assert_eq!(fields.card_name, "Lightning Bolt");
        assert_eq!(fields.quantity, 4);
        assert_eq!(fields.buying_price, Decimal::new(1250, 2));
        assert_eq!(fields.bought_date, Some(date!(2024 - 03 - 09)));
        assert_eq!(fields.sell_date, None);
    }

    #[test]
    fn malformed_values_fall_back_instead_of_failing() {
        let fields = form("lots", "cheap", "09/03/2024").to_fields();
        assert_eq!(fields.quantity, 0);
        assert_eq!(fields.buying_price, Decimal::ZERO);
        assert_eq!(fields.bought_date, None);

        let negative = form("-2", "-5", "2024-02-30").to_fields();
        assert_eq!(negative.quantity, -2);
        assert_eq!(negative.buying_price, Decimal::ZERO);
        assert_eq!(negative.bought_date, None);
    }

    #[test]
    fn view_formats_dates_for_date_inputs() {
        assert_eq!(format_form_date(Some(date!(2023 - 11 - 05))), "2023-11-05");
        assert_eq!(format_form_date(None), "");
    }

    #[test]
    fn list_query_tolerates_garbage() {
        let q = ListQuery {
            page: Some("two".into()),
            page_size: Some("x".into()),
            search: Some("  bolt ".into()),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.page_size(), None);
        assert_eq!(q.search(), "bolt");

        let q = ListQuery {
            page: Some("3".into()),
            page_size: Some("50".into()),
            search: None,
        };
        assert_eq!(q.page(), 3);
        assert_eq!(q.page_size(), Some(50));
        assert_eq!(q.search(), "");
    }
}
