//! PostgreSQL store on a sqlx pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use std::collections::HashMap;
use uuid::Uuid;

use super::{CouponRepository, OrderRepository, ProductRepository, ReviewRepository, ReviewWithAuthor, UserRepository};
use crate::domain::aggregates::{
    Coupon, Credential, Order, OrderItem, OrderParts, Product, Review, SavedAddress, Sentiment, ShippingAddress,
    StatusChange, TrackingInfo, User,
};
use crate::domain::analytics::SellerLine;
use crate::domain::status::OrderStatus;
use crate::domain::value_objects::{CouponCode, Email, Rating};
use crate::error::{AppError, Result};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("corrupt {what} row: {detail}"))
}

/// Maps a unique-constraint violation to a validation error with `message`.
fn unique_as(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| {
        if matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()) {
            AppError::validation(message)
        } else {
            AppError::Database(err)
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    google_id: Option<String>,
    name: Option<String>,
    picture: Option<String>,
    role: String,
    wishlist: Vec<Uuid>,
    addresses: Json<Vec<SavedAddress>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;
    fn try_from(row: UserRow) -> Result<Self> {
        let credential = match (row.password_hash, row.google_id) {
            (Some(hash), None) => Credential::Password { hash },
            (None, Some(subject)) => Credential::Google { subject },
            _ => return Err(corrupt("user", "credential must be exactly one of password or google id")),
        };
        Ok(User {
            id: row.id,
            email: Email::new(row.email).map_err(|e| corrupt("user", e))?,
            credential,
            name: row.name,
            picture: row.picture,
            role: row.role.parse().map_err(|e| corrupt("user", e))?,
            wishlist: row.wishlist,
            addresses: row.addresses.0,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, google_id, name, picture, role, wishlist, addresses, created_at";

#[async_trait]
impl UserRepository for PgStore {
    async fn insert_user(&self, user: &User) -> Result<()> {
        sqlx::query("INSERT INTO users (id, email, password_hash, google_id, name, picture, role, wishlist, addresses, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
            .bind(user.id).bind(user.email.as_str()).bind(user.password_hash()).bind(user.google_subject())
            .bind(&user.name).bind(&user.picture).bind(user.role.as_str()).bind(&user.wishlist)
            .bind(Json(&user.addresses)).bind(user.created_at)
            .execute(&self.pool).await.map_err(unique_as("Email already in use"))?;
        Ok(())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        let result = sqlx::query("UPDATE users SET name = $2, picture = $3, role = $4, wishlist = $5, addresses = $6, password_hash = $7, google_id = $8 WHERE id = $1")
            .bind(user.id).bind(&user.name).bind(&user.picture).bind(user.role.as_str()).bind(&user.wishlist)
            .bind(Json(&user.addresses)).bind(user.password_hash()).bind(user.google_subject())
            .execute(&self.pool).await?;
        if result.rows_affected() == 0 { return Err(AppError::not_found("User not found")); }
        Ok(())
    }

    async fn user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.as_str()).fetch_optional(&self.pool).await?;
        row.map(User::try_from).transpose()
    }

    async fn user_by_google_subject(&self, subject: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE google_id = $1"))
            .bind(subject).fetch_optional(&self.pool).await?;
        row.map(User::try_from).transpose()
    }
}

const PRODUCT_COLUMNS: &str = "id, title, description, price, original_price, category, images, rating, review_count, stock, badge, seller_id, created_at";

#[async_trait]
impl ProductRepository for PgStore {
    async fn insert_product(&self, p: &Product) -> Result<()> {
        sqlx::query("INSERT INTO products (id, title, description, price, original_price, category, images, rating, review_count, stock, badge, seller_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)")
            .bind(p.id).bind(&p.title).bind(&p.description).bind(p.price).bind(p.original_price).bind(&p.category)
            .bind(&p.images).bind(p.rating).bind(p.review_count).bind(p.stock).bind(&p.badge).bind(p.seller_id).bind(p.created_at)
            .execute(&self.pool).await?;
        Ok(())
    }

    async fn save_product(&self, p: &Product) -> Result<()> {
        let result = sqlx::query("UPDATE products SET title = $2, description = $3, price = $4, original_price = $5, category = $6, images = $7, stock = $8, badge = $9 WHERE id = $1")
            .bind(p.id).bind(&p.title).bind(&p.description).bind(p.price).bind(p.original_price).bind(&p.category)
            .bind(&p.images).bind(p.stock).bind(&p.badge)
            .execute(&self.pool).await?;
        if result.rows_affected() == 0 { return Err(AppError::not_found("Product not found")); }
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM products WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn product_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?)
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC, id DESC"))
            .fetch_all(&self.pool).await?)
    }

    async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"))
            .bind(ids).fetch_all(&self.pool).await?)
    }

    async fn products_by_seller(&self, seller_id: Uuid) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 ORDER BY created_at DESC, id DESC"))
            .bind(seller_id).fetch_all(&self.pool).await?)
    }

    async fn low_stock_products(&self, seller_id: Uuid, threshold: i32) -> Result<Vec<Product>> {
        Ok(sqlx::query_as::<_, Product>(&format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE seller_id = $1 AND stock <= $2 ORDER BY stock, title"))
            .bind(seller_id).bind(threshold).fetch_all(&self.pool).await?)
    }

    async fn set_product_rating(&self, id: Uuid, rating: f64, review_count: i32) -> Result<()> {
        sqlx::query("UPDATE products SET rating = $2, review_count = $3 WHERE id = $1")
            .bind(id).bind(rating).bind(review_count).execute(&self.pool).await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    user_id: Uuid,
    product_id: Uuid,
    rating: i16,
    comment: String,
    sentiment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = AppError;
    fn try_from(row: ReviewRow) -> Result<Self> {
        Ok(Review {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            rating: Rating::new(row.rating.into()).map_err(|e| corrupt("review", e))?,
            comment: row.comment,
            sentiment: row.sentiment.as_deref().and_then(Sentiment::parse),
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ReviewAuthorRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    user_name: Option<String>,
}

const REVIEW_COLUMNS: &str = "id, user_id, product_id, rating, comment, sentiment, created_at";

#[async_trait]
impl ReviewRepository for PgStore {
    async fn insert_review(&self, r: &Review) -> Result<()> {
        sqlx::query("INSERT INTO reviews (id, user_id, product_id, rating, comment, sentiment, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)")
            .bind(r.id).bind(r.user_id).bind(r.product_id).bind(r.rating.value() as i16).bind(&r.comment)
            .bind(r.sentiment.map(|s| s.as_str())).bind(r.created_at)
            .execute(&self.pool).await.map_err(unique_as("You have already reviewed this product"))?;
        Ok(())
    }

    async fn delete_review(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM reviews WHERE id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }

    async fn review_by_id(&self, id: Uuid) -> Result<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id).fetch_optional(&self.pool).await?;
        row.map(Review::try_from).transpose()
    }

    async fn review_by_user_and_product(&self, user_id: Uuid, product_id: Uuid) -> Result<Option<Review>> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND product_id = $2"))
            .bind(user_id).bind(product_id).fetch_optional(&self.pool).await?;
        row.map(Review::try_from).transpose()
    }

    async fn reviews_for_product(&self, product_id: Uuid) -> Result<Vec<ReviewWithAuthor>> {
        let rows = sqlx::query_as::<_, ReviewAuthorRow>(
            "SELECT r.id, r.user_id, r.product_id, r.rating, r.comment, r.sentiment, r.created_at, u.name AS user_name \
             FROM reviews r LEFT JOIN users u ON u.id = r.user_id WHERE r.product_id = $1 ORDER BY r.created_at DESC, r.id DESC")
            .bind(product_id).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> Result<ReviewWithAuthor> { Ok(ReviewWithAuthor { review: row.review.try_into()?, user_name: row.user_name }) })
            .collect()
    }

    async fn ratings_for_product(&self, product_id: Uuid) -> Result<Vec<Rating>> {
        let rows: Vec<(i16,)> = sqlx::query_as("SELECT rating FROM reviews WHERE product_id = $1")
            .bind(product_id).fetch_all(&self.pool).await?;
        rows.into_iter().map(|(r,)| Rating::new(r.into()).map_err(|e| corrupt("review", e))).collect()
    }
}

#[derive(sqlx::FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    discount_percentage: i16,
    expiration_date: DateTime<Utc>,
    is_active: bool,
    usage_limit: Option<i32>,
    used_count: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<CouponRow> for Coupon {
    type Error = AppError;
    fn try_from(row: CouponRow) -> Result<Self> {
        Ok(Coupon {
            id: row.id,
            code: CouponCode::new(row.code).map_err(|e| corrupt("coupon", e))?,
            discount_percentage: u8::try_from(row.discount_percentage).map_err(|e| corrupt("coupon", e))?,
            expiration_date: row.expiration_date,
            is_active: row.is_active,
            usage_limit: row.usage_limit.map(|l| l.max(0) as u32),
            used_count: row.used_count.max(0) as u32,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl CouponRepository for PgStore {
    async fn insert_coupon(&self, c: &Coupon) -> Result<()> {
        sqlx::query("INSERT INTO coupons (id, code, discount_percentage, expiration_date, is_active, usage_limit, used_count, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)")
            .bind(c.id).bind(c.code.as_str()).bind(c.discount_percentage as i16).bind(c.expiration_date).bind(c.is_active)
            .bind(c.usage_limit.map(|l| l as i32)).bind(c.used_count as i32).bind(c.created_at)
            .execute(&self.pool).await.map_err(unique_as("Coupon code already exists"))?;
        Ok(())
    }

    async fn active_coupon(&self, code: &CouponCode) -> Result<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>("SELECT id, code, discount_percentage, expiration_date, is_active, usage_limit, used_count, created_at FROM coupons WHERE code = $1 AND is_active")
            .bind(code.as_str()).fetch_optional(&self.pool).await?;
        row.map(Coupon::try_from).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Option<Uuid>,
    total_amount: Decimal,
    status: String,
    shipping_address: Json<ShippingAddress>,
    tracking_info: Option<Json<TrackingInfo>>,
    status_history: Json<Vec<StatusChange>>,
    coupon_code: Option<String>,
    payment_id: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    order_id: Uuid,
    product_id: String,
    seller_id: Uuid,
    title: String,
    image: Option<String>,
    price_at_purchase: Decimal,
    quantity: i32,
    status: String,
}

impl TryFrom<ItemRow> for OrderItem {
    type Error = AppError;
    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(OrderItem {
            product_id: row.product_id,
            seller_id: row.seller_id,
            title: row.title,
            image: row.image,
            price_at_purchase: row.price_at_purchase,
            quantity: u32::try_from(row.quantity).map_err(|e| corrupt("order item", e))?,
            status: row.status.parse().map_err(|e| corrupt("order item", e))?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SellerLineRow {
    order_id: Uuid,
    ordered_at: DateTime<Utc>,
    product_id: String,
    price_at_purchase: Decimal,
    quantity: i32,
    status: String,
}

const ORDER_COLUMNS: &str = "id, user_id, total_amount, status, shipping_address, tracking_info, status_history, coupon_code, payment_id, created_at";

impl PgStore {
    /// Attaches items to order rows, keeping the rows' order.
    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let items = sqlx::query_as::<_, ItemRow>(
            "SELECT order_id, product_id, seller_id, title, image, price_at_purchase, quantity, status \
             FROM order_items WHERE order_id = ANY($1) ORDER BY order_id, position")
            .bind(&ids).fetch_all(&self.pool).await?;

        let mut by_order: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for row in items {
            let order_id = row.order_id;
            by_order.entry(order_id).or_default().push(row.try_into()?);
        }

        rows.into_iter()
            .map(|row| -> Result<Order> {
                Ok(Order::restore(OrderParts {
                    id: row.id,
                    user_id: row.user_id,
                    items: by_order.remove(&row.id).unwrap_or_default(),
                    total_amount: row.total_amount,
                    status: row.status.parse().map_err(|e| corrupt("order", e))?,
                    shipping_address: row.shipping_address.0,
                    tracking_info: row.tracking_info.map(|t| t.0),
                    status_history: row.status_history.0,
                    coupon_code: row.coupon_code.map(CouponCode::new).transpose().map_err(|e| corrupt("order", e))?,
                    payment_id: row.payment_id,
                    created_at: row.created_at,
                }))
            })
            .collect()
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        if let Some(code) = order.coupon_code() {
            let redeemed = sqlx::query("UPDATE coupons SET used_count = used_count + 1 WHERE code = $1 AND is_active AND (usage_limit IS NULL OR used_count < usage_limit)")
                .bind(code.as_str()).execute(&mut *tx).await?;
            // Dropping the transaction rolls it back.
            if redeemed.rows_affected() == 0 { return Err(AppError::CouponExhausted); }
        }
        sqlx::query("INSERT INTO orders (id, user_id, total_amount, status, shipping_address, tracking_info, status_history, coupon_code, payment_id, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)")
            .bind(order.id()).bind(order.user_id()).bind(order.total_amount()).bind(order.status().as_str())
            .bind(Json(order.shipping_address())).bind(order.tracking_info().map(Json)).bind(Json(order.status_history()))
            .bind(order.coupon_code().map(|c| c.as_str())).bind(order.payment_id()).bind(order.created_at())
            .execute(&mut *tx).await?;
        for (position, item) in order.items().iter().enumerate() {
            sqlx::query("INSERT INTO order_items (order_id, position, product_id, seller_id, title, image, price_at_purchase, quantity, status) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)")
                .bind(order.id()).bind(position as i32).bind(&item.product_id).bind(item.seller_id).bind(&item.title)
                .bind(&item.image).bind(item.price_at_purchase).bind(item.quantity as i32).bind(item.status.as_str())
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE orders SET status = $2, tracking_info = $3, status_history = $4 WHERE id = $1")
            .bind(order.id()).bind(order.status().as_str()).bind(order.tracking_info().map(Json)).bind(Json(order.status_history()))
            .execute(&mut *tx).await?;
        if result.rows_affected() == 0 { return Err(AppError::not_found("Order not found")); }
        for (position, item) in order.items().iter().enumerate() {
            sqlx::query("UPDATE order_items SET status = $3 WHERE order_id = $1 AND position = $2")
                .bind(order.id()).bind(position as i32).bind(item.status.as_str())
                .execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn order_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id).fetch_all(&self.pool).await?;
        Ok(self.hydrate(rows).await?.into_iter().next())
    }

    async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"))
            .bind(user_id).fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    async fn orders_for_seller(&self, seller_id: Uuid) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders o WHERE EXISTS (SELECT 1 FROM order_items i WHERE i.order_id = o.id AND i.seller_id = $1) ORDER BY created_at DESC, id DESC"))
            .bind(seller_id).fetch_all(&self.pool).await?;
        self.hydrate(rows).await
    }

    async fn seller_lines(&self, seller_id: Uuid) -> Result<Vec<SellerLine>> {
        let rows = sqlx::query_as::<_, SellerLineRow>(
            "SELECT i.order_id, o.created_at AS ordered_at, i.product_id, i.price_at_purchase, i.quantity, i.status \
             FROM order_items i JOIN orders o ON o.id = i.order_id WHERE i.seller_id = $1")
            .bind(seller_id).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> Result<SellerLine> {
                Ok(SellerLine {
                    order_id: row.order_id,
                    ordered_at: row.ordered_at,
                    product_id: row.product_id,
                    price_at_purchase: row.price_at_purchase,
                    quantity: u32::try_from(row.quantity).map_err(|e| corrupt("order item", e))?,
                    status: row.status.parse::<OrderStatus>().map_err(|e| corrupt("order item", e))?,
                })
            })
            .collect()
    }
}
