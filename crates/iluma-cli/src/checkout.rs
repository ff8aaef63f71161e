//! `checkout`: re-check stock, place the order, clear the cart.

use iluma_catalog::{CatalogService, CheckoutService, StockCheckItem};
use iluma_core::{ContactDetails, DeliveryAddress, OrderRequest};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::store::LocalStore;

#[derive(Debug, Serialize)]
pub(crate) struct CheckoutReceipt {
    pub message: &'static str,
    pub items: usize,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

/// Contact data as given on the command line.
#[derive(Debug, Clone)]
pub(crate) struct CheckoutArgs {
    pub name: String,
    pub phone: String,
    pub delivery: bool,
    pub city: Option<String>,
    pub address: Option<String>,
}

impl From<CheckoutArgs> for ContactDetails {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            name: args.name,
            phone: args.phone,
            delivery: args.delivery.then(|| DeliveryAddress {
                city: args.city.unwrap_or_default(),
                address: args.address.unwrap_or_default(),
            }),
        }
    }
}

/// Places an order for the stored cart.
///
/// Every line is re-checked against live stock first; any unavailable line
/// aborts the checkout with the cart untouched. The cart is cleared only
/// after the upstream accepted the order, and the notification task is
/// awaited so it is not lost when the process exits.
///
/// # Errors
///
/// Returns an error for an empty cart, unavailable lines, a failed stock
/// check, validation or upstream failures, or store I/O errors.
pub(crate) async fn run_checkout(
    store: &LocalStore,
    catalog: &CatalogService,
    checkout: &CheckoutService,
    args: CheckoutArgs,
) -> anyhow::Result<CheckoutReceipt> {
    let mut cart = store.load_cart()?;
    if cart.is_empty() {
        anyhow::bail!("cart is empty");
    }

    let checks: Vec<StockCheckItem> = cart
        .items
        .iter()
        .map(|item| StockCheckItem {
            reference: item.reference.clone(),
            variant: item.variant.as_ref().map(|v| v.kind),
            category: None,
        })
        .collect();
    let unavailable: Vec<String> = catalog
        .verify_stock(&checks)
        .await?
        .into_iter()
        .filter(|s| !s.available)
        .map(|s| s.id)
        .collect();
    if !unavailable.is_empty() {
        anyhow::bail!("out of stock: {}", unavailable.join(", "));
    }

    let order = OrderRequest::from_cart(&cart, args.into());
    let placed = checkout.place_order(order).await?;

    cart.clear();
    store.save_cart(&cart)?;

    if let Some(notification) = placed.notification {
        if let Err(e) = notification.await {
            tracing::warn!(error = %e, "notification task did not complete");
        }
    }

    Ok(CheckoutReceipt {
        message: "Заказ успешно оформлен",
        items: placed.order.ordered_items.len(),
        total: placed.total,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use iluma_backend::BackendClient;
    use iluma_catalog::CatalogSettings;
    use iluma_core::{Cart, CartItem, CartVariant, VariantKind};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn pickup() -> CheckoutArgs {
        CheckoutArgs {
            name: "Анна".to_string(),
            phone: "+7 912 345-67-89".to_string(),
            delivery: false,
            city: None,
            address: None,
        }
    }

    fn stored_cart(store: &LocalStore) {
        let mut cart = Cart::default();
        cart.add_item(CartItem {
            id: CartItem::composite_id("amber", Some(VariantKind::Block)),
            reference: "amber".to_string(),
            name: "Terea Amber (блок)".to_string(),
            price: Decimal::from_str("5500").unwrap(),
            quantity: 2,
            image: None,
            variant: Some(CartVariant {
                kind: VariantKind::Block,
                name: "Terea Amber (блок)".to_string(),
            }),
        });
        store.save_cart(&cart).unwrap();
    }

    async fn services(
        server: &MockServer,
        amber_stock: i64,
        order_status: u16,
    ) -> (CatalogService, CheckoutService) {
        let mut lists = vec![(
            "terea",
            json!([{"id": 1, "ref": "amber", "name": "Terea Amber", "type": "terea",
                    "price": 5500, "imagePack": "p.png", "nalichie": amber_stock}]),
        )];
        lists.push(("iqos", json!([])));
        lists.push(("devices", json!([])));
        for (category, list) in lists {
            let mut body = serde_json::Map::new();
            body.insert(category.to_string(), list);
            Mock::given(method("GET"))
                .and(path(format!("/products/{category}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(server)
                .await;
        }
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(order_status))
            .mount(server)
            .await;

        let backend = BackendClient::new(
            &server.uri(),
            Duration::from_secs(5),
            "iluma-test/0.1",
            50,
            0,
            0,
        )
            .expect("backend client");
        (
            CatalogService::new(backend.clone(), CatalogSettings::default()),
            CheckoutService::new(backend, None, "iluma-test.ru", "г. Москва"),
        )
    }

    #[tokio::test]
    async fn successful_checkout_clears_cart() {
        let server = MockServer::start().await;
        let (catalog, checkout) = services(&server, 1, 201).await;
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        stored_cart(&store);

        let receipt = run_checkout(&store, &catalog, &checkout, pickup()).await.unwrap();

        assert_eq!(receipt.items, 1);
        assert_eq!(receipt.total, Decimal::from_str("11000").unwrap());
        assert!(store.load_cart().unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_stock_line_aborts_checkout() {
        let server = MockServer::start().await;
        let (catalog, checkout) = services(&server, 0, 201).await;
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        stored_cart(&store);

        let err = run_checkout(&store, &catalog, &checkout, pickup()).await.unwrap_err();

        assert!(err.to_string().contains("amber-block"));
        assert_eq!(store.load_cart().unwrap().total_items(), 2);
        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().all(|r| r.url.path() != "/orders"));
    }

    #[tokio::test]
    async fn rejected_order_keeps_cart() {
        let server = MockServer::start().await;
        let (catalog, checkout) = services(&server, 1, 500).await;
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        stored_cart(&store);

        assert!(run_checkout(&store, &catalog, &checkout, pickup()).await.is_err());
        assert_eq!(store.load_cart().unwrap().total_items(), 2);
    }

    #[tokio::test]
    async fn empty_cart_is_refused() {
        let server = MockServer::start().await;
        let (catalog, checkout) = services(&server, 1, 201).await;
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());

        let err = run_checkout(&store, &catalog, &checkout, pickup()).await.unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn pickup_args_have_no_delivery_address() {
        let contact: ContactDetails = CheckoutArgs {
            name: "Анна".to_string(),
            phone: "79123456789".to_string(),
            delivery: false,
            city: Some("Казань".to_string()),
            address: None,
        }
        .into();
        assert!(contact.delivery.is_none());
    }

    #[test]
    fn delivery_args_carry_city_and_address() {
        let contact: ContactDetails = CheckoutArgs {
            name: "Анна".to_string(),
            phone: "79123456789".to_string(),
            delivery: true,
            city: Some("Казань".to_string()),
            address: Some("ул. Баумана, 1".to_string()),
        }
        .into();
        assert_eq!(
            contact.delivery,
            Some(DeliveryAddress {
                city: "Казань".to_string(),
                address: "ул. Баумана, 1".to_string(),
            })
        );
    }
}
