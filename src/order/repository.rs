use super::models::{NewPayment, OrderItemRow, OrderRow, PaymentRow};
use crate::{cart::models::CartLineRow, pagination::PageRequest};
use chrono::NaiveDate;
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const ORDER_SELECT: &str = "SELECT o.order_id, o.email, o.order_date, o.total_amount, o.order_status, \
     o.address_id, o.payment_id \
     FROM orders o JOIN addresses a ON a.address_id = o.address_id";

const ORDER_COUNT: &str = "SELECT COUNT(*) FROM orders o JOIN addresses a ON a.address_id = o.address_id";

/// Whose orders a listing covers
#[derive(Debug, Clone, PartialEq)]
pub enum OrderOwner {
    /// Orders placed under this email
    Email(String),
    /// Orders shipped to addresses of this user
    UserId(i64),
}

/// Filter for order listings
#[derive(Debug, Clone, PartialEq)]
pub struct OrderQuery {
    pub owner: OrderOwner,
    pub status: Option<String>,
}

impl OrderQuery {
    pub fn owned_by(owner: OrderOwner) -> Self {
        Self { owner, status: None }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match &self.owner {
            OrderOwner::Email(email) => qb.push(" WHERE o.email = ").push_bind(email.clone()),
            OrderOwner::UserId(user_id) => qb.push(" WHERE a.user_id = ").push_bind(*user_id),
        };
        if let Some(status) = &self.status {
            qb.push(" AND o.order_status = ").push_bind(status.clone());
        }
    }
}

pub async fn insert_payment<'e>(db: impl SqliteExecutor<'e>, payment: &NewPayment) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO payments (payment_method, pg_payment_id, pg_status, pg_response_message, pg_name) \
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&payment.payment_method)
    .bind(&payment.pg_payment_id)
    .bind(&payment.pg_status)
    .bind(&payment.pg_response_message)
    .bind(&payment.pg_name)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn insert_order<'e>(
    db: impl SqliteExecutor<'e>,
    email: &str,
    order_date: NaiveDate,
    total_amount: f64,
    order_status: &str,
    address_id: i64,
    payment_id: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO orders (email, order_date, total_amount, order_status, address_id, payment_id) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(email)
    .bind(order_date)
    .bind(total_amount)
    .bind(order_status)
    .bind(address_id)
    .bind(payment_id)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Copies one cart line into the order, keeping the product name
pub async fn insert_item<'e>(db: impl SqliteExecutor<'e>, order_id: i64, line: &CartLineRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO order_items (order_id, product_id, product_name, quantity, discount, ordered_product_price) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(order_id)
    .bind(line.product_id)
    .bind(&line.product_name)
    .bind(line.quantity)
    .bind(line.discount)
    .bind(line.product_price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn items_for<'e>(db: impl SqliteExecutor<'e>, order_id: i64) -> Result<Vec<OrderItemRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderItemRow>(
        "SELECT order_item_id, order_id, product_id, product_name, quantity, discount, ordered_product_price \
         FROM order_items WHERE order_id = ? ORDER BY order_item_id",
    )
    .bind(order_id)
    .fetch_all(db)
    .await
}

pub async fn find_payment<'e>(db: impl SqliteExecutor<'e>, payment_id: i64) -> Result<Option<PaymentRow>, sqlx::Error> {
    sqlx::query_as::<_, PaymentRow>(
        "SELECT payment_id, payment_method, pg_payment_id, pg_status, pg_response_message, pg_name \
         FROM payments WHERE payment_id = ?",
    )
    .bind(payment_id)
    .fetch_optional(db)
    .await
}

pub async fn find_order<'e>(db: impl SqliteExecutor<'e>, order_id: i64) -> Result<Option<OrderRow>, sqlx::Error> {
    sqlx::query_as::<_, OrderRow>(&format!("{} WHERE o.order_id = ?", ORDER_SELECT))
        .bind(order_id)
        .fetch_optional(db)
        .await
}

/// One page of orders matching `query`, plus the total match count.
pub async fn fetch_page(
    pool: &SqlitePool,
    query: &OrderQuery,
    page: &PageRequest,
) -> Result<(Vec<OrderRow>, i64), sqlx::Error> {
    let mut select = QueryBuilder::<Sqlite>::new(ORDER_SELECT);
    query.push_where(&mut select);
    select
        .push(" ORDER BY ")
        .push(page.order_clause())
        .push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let rows = select.build_query_as::<OrderRow>().fetch_all(pool).await?;

    let mut count = QueryBuilder::<Sqlite>::new(ORDER_COUNT);
    query.push_where(&mut count);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    Ok((rows, total))
}

/// Every order matching `query`, most recent first.
pub async fn fetch_all(pool: &SqlitePool, query: &OrderQuery) -> Result<Vec<OrderRow>, sqlx::Error> {
    let mut select = QueryBuilder::<Sqlite>::new(ORDER_SELECT);
    query.push_where(&mut select);
    select.push(" ORDER BY o.order_date DESC, o.order_id DESC");
    select.build_query_as::<OrderRow>().fetch_all(pool).await
}
