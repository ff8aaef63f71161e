//! Order payloads, checkout validation and the order notification text.

use std::fmt::Write as _;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::CoreError;

/// Minimum number of digits in a customer phone number (`7XXXXXXXXXX`).
pub const MIN_PHONE_DIGITS: usize = 11;

/// Largest quantity accepted for a single order line.
pub const MAX_ITEM_QUANTITY: i64 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedItem {
    pub product_name: String,
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_at_time_of_order: Decimal,
}

impl OrderedItem {
    /// `None` when the product does not fit in a [`Decimal`].
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.price_at_time_of_order
            .checked_mul(Decimal::from(self.quantity))
    }
}

/// Order body accepted from the storefront and forwarded to `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_name: String,
    pub phone_number: String,
    #[serde(default)]
    pub is_delivery: bool,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    pub ordered_items: Vec<OrderedItem>,
}

/// Contact and delivery details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    pub delivery: Option<DeliveryAddress>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryAddress {
    pub city: String,
    pub address: String,
}

impl OrderRequest {
    /// Builds an order for every line of `cart` at its stored unit price.
    #[must_use]
    pub fn from_cart(cart: &Cart, contact: ContactDetails) -> Self {
        let (is_delivery, city, address) = match contact.delivery {
            Some(d) => (true, d.city, d.address),
            None => (false, String::new(), String::new()),
        };
        Self {
            customer_name: contact.name,
            phone_number: contact.phone,
            is_delivery,
            city,
            address,
            ordered_items: cart
                .items
                .iter()
                .map(|item| OrderedItem {
                    product_name: item.name.clone(),
                    quantity: i64::from(item.quantity),
                    price_at_time_of_order: item.price,
                })
                .collect(),
        }
    }

    /// Validates the order and returns it with a digits-only phone number
    /// and trimmed text fields.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOrder`] with a customer-facing message for
    /// the first problem found.
    pub fn into_validated(self) -> Result<Self, CoreError> {
        let invalid = |msg: &str| Err(CoreError::InvalidOrder(msg.to_string()));

        let customer_name = self.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return invalid("Пожалуйста, введите ваше имя");
        }

        let phone_number: String = self
            .phone_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        if phone_number.len() < MIN_PHONE_DIGITS {
            return invalid("Пожалуйста, введите корректный номер телефона");
        }

        let city = self.city.trim().to_string();
        let address = self.address.trim().to_string();
        if self.is_delivery {
            if city.is_empty() {
                return invalid("Пожалуйста, введите город");
            }
            if address.is_empty() {
                return invalid("Пожалуйста, введите адрес доставки");
            }
        }

        if self.ordered_items.is_empty() {
            return invalid("Корзина пуста");
        }
        for item in &self.ordered_items {
            if item.product_name.trim().is_empty() {
                return invalid("У товара в заказе нет названия");
            }
            if item.quantity < 1 {
                return invalid("Количество товара должно быть не меньше 1");
            }
            if item.quantity > MAX_ITEM_QUANTITY {
                return invalid("Слишком большое количество товара");
            }
            if item.price_at_time_of_order.is_sign_negative() {
                return invalid("Цена товара не может быть отрицательной");
            }
        }

        if self.total().is_none() {
            return invalid("Сумма заказа слишком велика");
        }

        Ok(Self {
            customer_name,
            phone_number,
            is_delivery: self.is_delivery,
            city,
            address,
            ordered_items: self.ordered_items,
        })
    }

    /// Sum of all line totals; `None` on overflow. Always `Some` for an
    /// order returned by [`OrderRequest::into_validated`].
    #[must_use]
    pub fn total(&self) -> Option<Decimal> {
        self.ordered_items
            .iter()
            .try_fold(Decimal::ZERO, |acc, item| acc.checked_add(item.line_total()?))
    }
}

/// Formats an amount the way `ru-RU` locales print numbers: non-breaking
/// space thousands separator, comma decimal separator, at most three
/// fraction digits with trailing zeros dropped.
#[must_use]
pub fn format_rub(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(3, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('\u{a0}');
        }
        grouped.push(digit);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped},{frac_part}")
    }
}

/// Escapes characters that legacy Telegram Markdown treats as markup.
fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Renders the Markdown order summary sent to the shop's chat.
#[must_use]
pub fn format_order_message(
    order: &OrderRequest,
    site_name: &str,
    pickup_address: &str,
) -> String {
    let mut msg = String::new();
    let _ = writeln!(msg, "🛒 *НОВЫЙ ЗАКАЗ С САЙТА {site_name}*");
    msg.push('\n');
    msg.push_str("*Контактные данные:*\n");
    let _ = writeln!(msg, " Имя: {}", escape_markdown(&order.customer_name));
    let _ = writeln!(msg, " Телефон: {}", order.phone_number);
    let method = if order.is_delivery { "Доставка" } else { "Самовывоз" };
    let _ = writeln!(msg, " Способ: {method}");
    msg.push('\n');

    if order.is_delivery {
        msg.push_str("📍 *Адрес доставки:*\n");
        let _ = writeln!(msg, " Город: {}", escape_markdown(&order.city));
        let _ = writeln!(msg, " Адрес: {}", escape_markdown(&order.address));
    } else {
        msg.push_str("📍 *Самовывоз:*\n");
        let _ = writeln!(msg, "{pickup_address}");
    }
    msg.push('\n');

    msg.push_str("*Корзина:*\n");
    for item in &order.ordered_items {
        let _ = writeln!(
            msg,
            "• {} x{}: {} ₽",
            escape_markdown(&item.product_name),
            item.quantity,
            format_rub(item.price_at_time_of_order)
        );
    }
    msg.push('\n');
    let total = order.total().map_or_else(|| "—".to_string(), format_rub);
    let _ = write!(msg, " *Общая сумма:* {total} ₽");

    msg.trim().to_string()
}

#[cfg(test)]
#[path = "orders_test.rs"]
mod tests;
