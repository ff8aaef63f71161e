//! File-backed key/value store for the cart and wishlist blobs.
//!
//! All keys live in one JSON object at `{store_dir}/store.json`. Writes go
//! through a temp file in the same directory and are renamed into place.

use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use iluma_core::{Cart, Wishlist, CART_KEY, FAVORITES_KEY};
use serde_json::{Map, Value};

const STORE_FILE: &str = "store.json";

#[derive(Debug, Clone)]
pub(crate) struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub(crate) fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    fn read_all(&self) -> anyhow::Result<Map<String, Value>> {
        let path = self.path();
        if !path.exists() {
            return Ok(Map::new());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str::<Map<String, Value>>(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "store file unreadable; starting empty"
                );
                Ok(Map::new())
            }
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create {}", self.dir.display()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)
            .with_context(|| format!("failed to create temp file in {}", self.dir.display()))?;
        serde_json::to_writer_pretty(&mut tmp, map)?;
        tmp.write_all(b"\n")?;
        tmp.persist(self.path())
            .with_context(|| format!("failed to write {}", self.path().display()))?;
        Ok(())
    }

    pub(crate) fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self
            .read_all()?
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    pub(crate) fn set(&self, key: &str, blob: String) -> anyhow::Result<()> {
        let mut map = self.read_all()?;
        map.insert(key.to_string(), Value::String(blob));
        self.write_all(&map)
    }

    pub(crate) fn load_cart(&self) -> anyhow::Result<Cart> {
        Ok(Cart::from_blob(self.get(CART_KEY)?.as_deref()))
    }

    pub(crate) fn save_cart(&self, cart: &Cart) -> anyhow::Result<()> {
        self.set(CART_KEY, cart.to_blob()?)
    }

    pub(crate) fn load_wishlist(&self) -> anyhow::Result<Wishlist> {
        Ok(Wishlist::from_blob(self.get(FAVORITES_KEY)?.as_deref()))
    }

    pub(crate) fn save_wishlist(&self, wishlist: &Wishlist) -> anyhow::Result<()> {
        self.set(FAVORITES_KEY, wishlist.to_blob()?)
    }

    #[cfg(test)]
    pub(crate) fn dir(&self) -> &std::path::Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use iluma_core::CartItem;
    use rust_decimal::Decimal;

    use super::*;

    fn line(reference: &str, quantity: u32) -> CartItem {
        CartItem {
            id: CartItem::composite_id(reference, None),
            reference: reference.to_string(),
            name: reference.to_string(),
            price: Decimal::from_str("550").unwrap(),
            quantity,
            image: None,
            variant: None,
        }
    }

    #[test]
    fn missing_store_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path().join("nested"));
        assert!(store.load_cart().unwrap().is_empty());
        assert!(store.load_wishlist().unwrap().is_empty());
    }

    #[test]
    fn cart_and_wishlist_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());

        let mut cart = Cart::default();
        cart.add_item(line("amber", 2));
        store.save_cart(&cart).unwrap();
        store.save_wishlist(&Wishlist::default()).unwrap();

        let raw = std::fs::read_to_string(store.dir().join(STORE_FILE)).unwrap();
        let map: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert!(map.contains_key(CART_KEY));
        assert!(map.contains_key(FAVORITES_KEY));

        let reloaded = LocalStore::open(dir.path()).load_cart().unwrap();
        assert_eq!(reloaded.total_items(), 2);
    }

    #[test]
    fn corrupt_store_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORE_FILE), "{not json").unwrap();
        let store = LocalStore::open(dir.path());

        assert!(store.load_cart().unwrap().is_empty());
        store.set("other", "x".to_string()).unwrap();
        assert_eq!(store.get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn corrupt_cart_blob_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(dir.path());
        store.set(CART_KEY, "[{\"id\": 1".to_string()).unwrap();

        assert!(store.load_cart().unwrap().is_empty());
    }
}
