use super::ProductStore;
use crate::error::AppError;
use crate::product::{Product, ProductPayload};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// Map-backed product store.
///
/// Intended for tests/dev. Mirrors the join semantics of the Postgres store: category names are
/// looked up at read time, so renaming a category shows up on every product that references it.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<HashMap<i32, Product>>,
    categories: RwLock<HashMap<i32, String>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows are created outside the API, so seeding is the only way in.
    pub fn insert(&self, product: Product) -> Result<(), AppError> {
        self.products
            .write()
            .map_err(|_| poisoned())?
            .insert(product.id, product);
        Ok(())
    }

    pub fn insert_category(&self, category_id: i32, name: impl Into<String>) -> Result<(), AppError> {
        self.categories
            .write()
            .map_err(|_| poisoned())?
            .insert(category_id, name.into());
        Ok(())
    }

    fn joined(&self, mut product: Product) -> Result<Product, AppError> {
        let categories = self.categories.read().map_err(|_| poisoned())?;
        product.category_name = categories.get(&product.category_id).cloned();
        Ok(product)
    }
}

fn poisoned() -> AppError {
    tracing::error!("in-memory product store lock poisoned");
    AppError::Internal("store lock poisoned".into())
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let mut out: Vec<Product> = self
            .products
            .read()
            .map_err(|_| poisoned())?
            .values()
            .cloned()
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        out.into_iter().map(|p| self.joined(p)).collect()
    }

    async fn get_by_id(&self, id: i32) -> Result<Product, AppError> {
        let product = self
            .products
            .read()
            .map_err(|_| poisoned())?
            .get(&id)
            .cloned()
            .ok_or(AppError::NotFound(id))?;
        self.joined(product)
    }

    async fn update_by_id(&self, payload: &ProductPayload, id: i32) -> Result<Product, AppError> {
        let updated = {
            // One write guard covers the read-modify-write.
            let mut products = self.products.write().map_err(|_| poisoned())?;
            let product = products.get_mut(&id).ok_or(AppError::NotFound(id))?;
            product.name = payload.name.clone();
            product.des = payload.des.clone();
            product.price = payload.price;
            product.discount = payload.discount;
            product.available_quantity = payload.available_quantity;
            product.category_id = payload.category_id;
            if let Some(urls) = &payload.image_urls {
                product.image_urls = urls.clone();
            }
            product.clone()
        };
        self.joined(updated)
    }

    async fn delete_by_id(&self, id: i32) -> Result<(), AppError> {
        self.products.write().map_err(|_| poisoned())?.remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i32, name: &str) -> Product {
        Product {
            id,
            name: name.into(),
            des: format!("{} description", name),
            price: 1.5,
            discount: 0.0,
            available_quantity: 10,
            category_id: 1,
            category_name: None,
            image_urls: vec!["https://img.example/1.png".into()],
        }
    }

    fn payload(name: &str) -> ProductPayload {
        ProductPayload {
            name: name.into(),
            des: "Blue pen".into(),
            price: 2.0,
            discount: 0.25,
            available_quantity: 4,
            category_id: 2,
            image_urls: None,
        }
    }

    fn seeded() -> InMemoryProductStore {
        let store = InMemoryProductStore::new();
        store.insert_category(1, "Stationery").unwrap();
        store.insert_category(2, "Office").unwrap();
        store.insert(product(1, "Pen")).unwrap();
        store.insert(product(2, "Eraser")).unwrap();
        store
    }

    #[tokio::test]
    async fn list_is_ordered_by_name_with_category_names() {
        let store = seeded();
        let all = store.list().await.unwrap();
        let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Eraser", "Pen"]);
        assert!(all.iter().all(|p| p.category_name.as_deref() == Some("Stationery")));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = seeded();
        assert!(matches!(store.get_by_id(99).await, Err(AppError::NotFound(99))));
    }

    #[tokio::test]
    async fn update_rewrites_attributes_and_keeps_images_when_absent() {
        let store = seeded();
        let updated = store.update_by_id(&payload("Gel pen"), 1).await.unwrap();
        assert_eq!(updated.name, "Gel pen");
        assert_eq!(updated.category_id, 2);
        assert_eq!(updated.category_name.as_deref(), Some("Office"));
        assert_eq!(updated.image_urls, vec!["https://img.example/1.png".to_string()]);
        assert_eq!(store.get_by_id(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_replaces_images_when_given() {
        let store = seeded();
        let mut p = payload("Pen");
        p.image_urls = Some(vec!["a.png".into(), "b.png".into()]);
        let updated = store.update_by_id(&p, 1).await.unwrap();
        assert_eq!(updated.image_urls, vec!["a.png".to_string(), "b.png".to_string()]);
    }

    #[tokio::test]
    async fn update_missing_leaves_store_untouched() {
        let store = seeded();
        let before = store.list().await.unwrap();
        assert!(matches!(store.update_by_id(&payload("X"), 42).await, Err(AppError::NotFound(42))));
        assert_eq!(store.list().await.unwrap(), before);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = seeded();
        store.delete_by_id(1).await.unwrap();
        store.delete_by_id(1).await.unwrap();
        assert!(matches!(store.get_by_id(1).await, Err(AppError::NotFound(1))));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }
}
