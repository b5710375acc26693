use sqlx::{MySql, Pool, QueryBuilder};

use super::model::{NewOrder, Order, OrderItem, OrderStatus, OrderWithUser};
use crate::config::batch_size;

/// Values bound per order item row.
const ITEM_COLUMNS: usize = 5;

pub struct OrderCrud {
    pool: Pool<MySql>,
}

impl OrderCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Writes the order and all of its items atomically with status `Placed`.
    pub async fn create(&self, order: &NewOrder) -> Result<i64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                user_id, contact_name, contact_email, phone, country,
                address_line1, address_line2, city, state, pincode,
                address, total, payment_mode, status, idempotency_key
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.user_id)
        .bind(&order.contact_name)
        .bind(&order.contact_email)
        .bind(&order.phone)
        .bind(&order.country)
        .bind(&order.address_line1)
        .bind(&order.address_line2)
        .bind(&order.city)
        .bind(&order.state)
        .bind(&order.pincode)
        .bind(&order.address)
        .bind(order.total)
        .bind(&order.payment_mode)
        .bind(OrderStatus::Placed.as_str())
        .bind(&order.idempotency_key)
        .execute(&mut *tx)
        .await?;

        let order_id = result.last_insert_id() as i64;

        for batch in order.items.chunks(batch_size(ITEM_COLUMNS)) {
            let mut builder =
                QueryBuilder::<MySql>::new("INSERT INTO order_items (order_id, product_id, name, price, qty) ");
            builder.push_values(batch, |mut row, item| {
                row.push_bind(order_id)
                    .push_bind(item.product_id)
                    .push_bind(&item.name)
                    .push_bind(item.price)
                    .push_bind(item.qty);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    pub async fn find_by_idempotency_key(&self, user_id: i64, key: &str) -> Result<Option<i64>, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM orders WHERE user_id = ? AND idempotency_key = ?")
            .bind(user_id)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.0))
    }

    // =========================================================================
    // READ
    // =========================================================================

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// The order only if it belongs to the user with `email`.
    pub async fn find_owned(&self, id: i64, email: &str) -> Result<Option<OrderWithUser>, sqlx::Error> {
        sqlx::query_as::<_, OrderWithUser>(
            r#"
            SELECT o.*, u.username AS user_name, u.email AS user_email
            FROM orders o
            JOIN users u ON u.id = o.user_id
            WHERE o.id = ? AND u.email = ?
            "#,
        )
        .bind(id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_for_user(&self, user_id: i64) -> Result<Vec<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
    }

    pub async fn list_all(&self) -> Result<Vec<OrderWithUser>, sqlx::Error> {
        sqlx::query_as::<_, OrderWithUser>(
            r#"
            SELECT o.*, u.username AS user_name, u.email AS user_email
            FROM orders o
            JOIN users u ON u.id = o.user_id
            ORDER BY o.created_at DESC, o.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// Items of every listed order in one round trip.
    pub async fn items_for_orders(&self, order_ids: &[i64]) -> Result<Vec<OrderItem>, sqlx::Error> {
        let mut items = Vec::new();

        for batch in order_ids.chunks(batch_size(1)) {
            let mut builder = QueryBuilder::<MySql>::new(
                r#"
                SELECT oi.id, oi.order_id, oi.product_id, oi.name, oi.price, oi.qty,
                       p.main_image AS main_image,
                       (SELECT COUNT(*) FROM order_reviews r WHERE r.item_id = oi.id) AS review_count
                FROM order_items oi
                LEFT JOIN products p ON p.id = oi.product_id
                WHERE oi.order_id IN (
                "#,
            );
            let mut ids = builder.separated(", ");
            for id in batch {
                ids.push_bind(*id);
            }
            builder.push(") ORDER BY oi.order_id, oi.id");

            items.extend(builder.build_query_as::<OrderItem>().fetch_all(&self.pool).await?);
        }

        Ok(items)
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    /// Compare-and-set on the status column. Returns false when the order
    /// was no longer in `from`.
    pub async fn update_status(&self, id: i64, from: OrderStatus, to: OrderStatus) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ? AND status = ?")
            .bind(to.as_str())
            .bind(id)
            .bind(from.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // REVIEWS
    // =========================================================================

    pub async fn item_in_order(&self, order_id: i64, item_id: i64) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM order_items WHERE id = ? AND order_id = ?")
            .bind(item_id)
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    pub async fn review_exists(&self, order_id: i64, item_id: i64, user_email: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM order_reviews WHERE order_id = ? AND item_id = ? AND user_email = ?",
        )
        .bind(order_id)
        .bind(item_id)
        .bind(user_email)
        .fetch_one(&self.pool)
        .await?;

        Ok(result.0 > 0)
    }

    pub async fn add_review(
        &self,
        order_id: i64,
        item_id: i64,
        user_email: &str,
        rating: i32,
        comment: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO order_reviews (order_id, item_id, user_email, rating, comment) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(item_id)
        .bind(user_email)
        .bind(rating)
        .bind(comment)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
