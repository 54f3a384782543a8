use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::analytics::{self, SellerAnalytics, LOW_STOCK_THRESHOLD};
use crate::error::Result;
use crate::store::Store;

/// Composes the seller dashboard from three independent reads.
pub async fn seller_analytics(store: &dyn Store, seller_id: Uuid, now: DateTime<Utc>) -> Result<SellerAnalytics> {
    let lines = store.seller_lines(seller_id).await?;

    // Snapshotted product ids are strings; ids that are not uuids cannot match a live product.
    let mut ids: Vec<Uuid> = lines.iter().filter_map(|l| Uuid::parse_str(&l.product_id).ok()).collect();
    ids.sort_unstable();
    ids.dedup();
    let categories: HashMap<String, String> = store
        .products_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id.to_string(), p.category))
        .collect();

    let low_stock = store.low_stock_products(seller_id, LOW_STOCK_THRESHOLD).await?;

    Ok(SellerAnalytics {
        sales_over_time: analytics::sales_over_time(&lines, now),
        category_breakdown: analytics::category_breakdown(&lines, &categories),
        low_stock_items: analytics::low_stock_items(&low_stock),
        summary: analytics::summary(&lines),
    })
}
