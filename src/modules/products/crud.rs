use sqlx::{MySql, Pool, QueryBuilder};

use super::model::{NewProduct, Product, ProductTestimonial, RatingSummary};
use crate::config::batch_size;

/// Values bound per row by the bulk insert.
const PRODUCT_COLUMNS: usize = 12;

pub struct ProductCrud {
    pool: Pool<MySql>,
}

impl ProductCrud {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn create(&self, product: &NewProduct) -> Result<i64, sqlx::Error> {
        let [main_image, sub_image_1, sub_image_2, sub_image_3] = &product.images;

        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, category, subcategory, price, discounted_price,
                short_desc, description, main_image, sub_image_1, sub_image_2,
                sub_image_3, stock
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(product.price)
        .bind(product.discounted_price)
        .bind(&product.short_desc)
        .bind(&product.description)
        .bind(main_image)
        .bind(sub_image_1)
        .bind(sub_image_2)
        .bind(sub_image_3)
        .bind(product.stock)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id() as i64)
    }

    /// Inserts all rows in one transaction, a batch of rows per statement.
    /// Returns the number of rows written.
    pub async fn create_many(&self, products: &[NewProduct]) -> Result<u64, sqlx::Error> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for batch in products.chunks(batch_size(PRODUCT_COLUMNS)) {
            let mut builder = QueryBuilder::<MySql>::new(
                "INSERT INTO products (name, category, subcategory, price, discounted_price, \
                 short_desc, description, main_image, sub_image_1, sub_image_2, sub_image_3, stock) ",
            );
            builder.push_values(batch, |mut row, p| {
                row.push_bind(&p.name)
                    .push_bind(&p.category)
                    .push_bind(&p.subcategory)
                    .push_bind(p.price)
                    .push_bind(p.discounted_price)
                    .push_bind(&p.short_desc)
                    .push_bind(&p.description)
                    .push_bind(&p.images[0])
                    .push_bind(&p.images[1])
                    .push_bind(&p.images[2])
                    .push_bind(&p.images[3])
                    .push_bind(p.stock);
            });

            inserted += builder.build().execute(&mut *tx).await?.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    pub async fn update(&self, id: i64, product: &NewProduct) -> Result<bool, sqlx::Error> {
        let [main_image, sub_image_1, sub_image_2, sub_image_3] = &product.images;

        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = ?, category = ?, subcategory = ?, price = ?, discounted_price = ?,
                short_desc = ?, description = ?, main_image = ?, sub_image_1 = ?,
                sub_image_2 = ?, sub_image_3 = ?, stock = ?
            WHERE id = ?
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.subcategory)
        .bind(product.price)
        .bind(product.discounted_price)
        .bind(&product.short_desc)
        .bind(&product.description)
        .bind(main_image)
        .bind(sub_image_1)
        .bind(sub_image_2)
        .bind(sub_image_3)
        .bind(product.stock)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // REVIEWS
    // =========================================================================

    /// Customer ratings per product, taken from reviews on delivered orders.
    pub async fn rating_summaries(&self) -> Result<Vec<RatingSummary>, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT oi.product_id AS product_id,
                   CAST(AVG(r.rating) AS DECIMAL(10,4)) AS average_rating,
                   COUNT(r.id) AS review_count
            FROM order_reviews r
            JOIN order_items oi ON oi.id = r.item_id
            WHERE oi.product_id IS NOT NULL
            GROUP BY oi.product_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    pub async fn rating_summary(&self, product_id: i64) -> Result<Option<RatingSummary>, sqlx::Error> {
        sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT oi.product_id AS product_id,
                   CAST(AVG(r.rating) AS DECIMAL(10,4)) AS average_rating,
                   COUNT(r.id) AS review_count
            FROM order_reviews r
            JOIN order_items oi ON oi.id = r.item_id
            WHERE oi.product_id = ?
            GROUP BY oi.product_id
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn add_testimonial(
        &self,
        product_id: i64,
        reviewer_name: &str,
        review_text: &str,
        rating: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO product_reviews (product_id, reviewer_name, review_text, rating) VALUES (?, ?, ?, ?)",
        )
        .bind(product_id)
        .bind(reviewer_name)
        .bind(review_text)
        .bind(rating)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn testimonials(&self, product_id: i64) -> Result<Vec<ProductTestimonial>, sqlx::Error> {
        sqlx::query_as::<_, ProductTestimonial>(
            "SELECT * FROM product_reviews WHERE product_id = ? ORDER BY created_at DESC, id DESC",
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
    }
}
