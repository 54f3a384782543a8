//! Seller analytics: pure aggregation over the seller's order lines.
//!
//! Each view is computed from its own read, so the composed response carries
//! no cross-view consistency guarantee.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;
use crate::domain::aggregates::{Order, Product};
use crate::domain::status::OrderStatus;

pub const SALES_WINDOW_DAYS: i64 = 30;
pub const LOW_STOCK_THRESHOLD: i32 = 5;
pub const LOW_STOCK_LIMIT: usize = 5;

/// One line item attributed to a seller, flattened with its order's identity
/// and creation time.
#[derive(Clone, Debug, PartialEq)]
pub struct SellerLine {
    pub order_id: Uuid,
    pub ordered_at: DateTime<Utc>,
    pub product_id: String,
    pub price_at_purchase: Decimal,
    pub quantity: u32,
    pub status: OrderStatus,
}

impl SellerLine {
    pub fn revenue(&self) -> Decimal { self.price_at_purchase * Decimal::from(self.quantity) }
    fn counts_as_revenue(&self) -> bool { self.status != OrderStatus::Cancelled }

    /// Lines of `orders` belonging to `seller_id`.
    pub fn from_orders<'a, I>(orders: I, seller_id: Uuid) -> Vec<SellerLine>
    where
        I: IntoIterator<Item = &'a Order>,
    {
        orders
            .into_iter()
            .flat_map(|order| {
                order.items().iter().filter(move |i| i.seller_id == seller_id).map(move |i| SellerLine {
                    order_id: order.id(),
                    ordered_at: order.created_at(),
                    product_id: i.product_id.clone(),
                    price_at_purchase: i.price_at_purchase,
                    quantity: i.quantity,
                    status: i.status,
                })
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategorySales {
    pub category: String,
    pub sales: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LowStockItem {
    pub id: Uuid,
    pub title: String,
    pub stock: i32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_revenue: Decimal,
    pub total_orders: usize,
    pub active_orders: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerAnalytics {
    pub sales_over_time: Vec<DailyRevenue>,
    pub category_breakdown: Vec<CategorySales>,
    pub low_stock_items: Vec<LowStockItem>,
    pub summary: Summary,
}

/// Daily revenue over the trailing window, oldest day first. Days are UTC
/// calendar days of the order's creation.
pub fn sales_over_time(lines: &[SellerLine], now: DateTime<Utc>) -> Vec<DailyRevenue> {
    let since = now - Duration::days(SALES_WINDOW_DAYS);
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for line in lines.iter().filter(|l| l.ordered_at >= since && l.counts_as_revenue()) {
        *days.entry(line.ordered_at.date_naive()).or_default() += line.revenue();
    }
    days.into_iter().map(|(date, revenue)| DailyRevenue { date, revenue }).collect()
}

/// Revenue per category of the live product behind each line. Lines whose
/// product no longer exists are skipped.
pub fn category_breakdown(lines: &[SellerLine], categories: &HashMap<String, String>) -> Vec<CategorySales> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for line in lines.iter().filter(|l| l.counts_as_revenue()) {
        if let Some(category) = categories.get(&line.product_id) {
            *totals.entry(category.as_str()).or_default() += line.revenue();
        }
    }
    let mut breakdown: Vec<CategorySales> = totals
        .into_iter()
        .map(|(category, sales)| CategorySales { category: category.to_string(), sales })
        .collect();
    breakdown.sort_by(|a, b| b.sales.cmp(&a.sales).then_with(|| a.category.cmp(&b.category)));
    breakdown
}

pub fn low_stock_items(products: &[Product]) -> Vec<LowStockItem> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock(LOW_STOCK_THRESHOLD)).collect();
    low.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.title.cmp(&b.title)));
    low.into_iter()
        .take(LOW_STOCK_LIMIT)
        .map(|p| LowStockItem { id: p.id, title: p.title.clone(), stock: p.stock })
        .collect()
}

pub fn summary(lines: &[SellerLine]) -> Summary {
    let orders: HashSet<Uuid> = lines.iter().map(|l| l.order_id).collect();
    Summary {
        total_revenue: lines.iter().filter(|l| l.counts_as_revenue()).map(SellerLine::revenue).sum(),
        total_orders: orders.len(),
        active_orders: lines.iter().filter(|l| l.status.is_active()).count(),
    }
}
