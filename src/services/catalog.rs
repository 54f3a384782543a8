use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::aggregates::{Product, ProductDraft};
use crate::error::{AppError, Result};
use crate::store::Store;

pub async fn list(store: &dyn Store) -> Result<Vec<Product>> {
    store.list_products().await
}

pub async fn get(store: &dyn Store, id: Uuid) -> Result<Product> {
    store.product_by_id(id).await?.ok_or_else(|| AppError::not_found("Product not found"))
}

pub async fn seller_products(store: &dyn Store, seller_id: Uuid) -> Result<Vec<Product>> {
    store.products_by_seller(seller_id).await
}

pub async fn create(store: &dyn Store, seller_id: Uuid, draft: ProductDraft, now: DateTime<Utc>) -> Result<Product> {
    let product = Product::create(seller_id, draft, now)?;
    store.insert_product(&product).await?;
    tracing::info!(product_id = %product.id, %seller_id, "product created");
    Ok(product)
}

async fn owned(store: &dyn Store, seller_id: Uuid, id: Uuid) -> Result<Product> {
    let product = get(store, id).await?;
    if !product.is_owned_by(seller_id) {
        return Err(AppError::forbidden("Not authorized to modify this product"));
    }
    Ok(product)
}

pub async fn update(store: &dyn Store, seller_id: Uuid, id: Uuid, draft: ProductDraft) -> Result<Product> {
    let mut product = owned(store, seller_id, id).await?;
    product.revise(draft)?;
    store.save_product(&product).await?;
    Ok(product)
}

pub async fn delete(store: &dyn Store, seller_id: Uuid, id: Uuid) -> Result<()> {
    owned(store, seller_id, id).await?;
    store.delete_product(id).await?;
    tracing::info!(product_id = %id, %seller_id, "product removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::product::tests::draft;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_only_owner_can_modify() {
        let store = MemoryStore::new();
        let (owner, intruder) = (Uuid::new_v4(), Uuid::new_v4());
        let product = create(&store, owner, draft("Mug", "Kitchen", 12), Utc::now()).await.unwrap();

        assert!(matches!(update(&store, intruder, product.id, draft("Cup", "Kitchen", 1)).await, Err(AppError::Forbidden(_))));
        assert!(matches!(delete(&store, intruder, product.id).await, Err(AppError::Forbidden(_))));

        let revised = update(&store, owner, product.id, draft("Cup", "Kitchen", 1)).await.unwrap();
        assert_eq!(revised.title, "Cup");
        delete(&store, owner, product.id).await.unwrap();
        assert!(matches!(get(&store, product.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_invalid_draft_rejected() {
        let store = MemoryStore::new();
        let result = create(&store, Uuid::new_v4(), draft("", "Kitchen", 1), Utc::now()).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list(&store).await.unwrap().is_empty());
    }
}
