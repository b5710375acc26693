use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::AppState;
use crate::error::{is_duplicate_key, Json};
use crate::modules::auth::{crud::UserCrud, AuthUser, RequireAdmin};
use crate::services::email::send_best_effort;
use crate::services::invoice::{render_invoice, InvoiceData, InvoiceLine};
use crate::services::notifications::{self, EmailLine, EmailOrder};
use super::crud::OrderCrud;
use super::error::OrderError;
use super::model::{NewOrder, OrderStatus};
use super::schema::{
    group_items, AdminOrderResponse, AllOrdersResponse, CreateOrderRequest, CreateOrderResponse,
    MessageResponse, MyOrdersResponse, OrderResponse, ReviewRequest, UpdateStatusRequest,
};

const IDEMPOTENCY_HEADER: &str = "idempotency-key";

// =============================================================================
// POST /api/orders
// =============================================================================

pub async fn create_order(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, OrderError> {
    let owner = UserCrud::new(state.db.clone())
        .find_by_email(&user.email)
        .await?
        .ok_or(OrderError::UserNotFound)?;

    let idempotency_key = headers
        .get(IDEMPOTENCY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let order = req.into_new_order(owner.id, &owner.email, idempotency_key)?;

    let crud = OrderCrud::new(state.db.clone());

    if let Some(key) = &order.idempotency_key {
        if let Some(order_id) = crud.find_by_idempotency_key(owner.id, key).await? {
            tracing::info!(order_id, user_id = owner.id, "Replayed order submission");
            return Ok(Json(CreateOrderResponse { success: true, order_id }));
        }
    }

    let order_id = match crud.create(&order).await {
        Ok(id) => id,
        // A concurrent retry with the same key won the insert.
        Err(e) if is_duplicate_key(&e) && order.idempotency_key.is_some() => {
            let key = order.idempotency_key.as_deref().unwrap_or_default();
            crud.find_by_idempotency_key(owner.id, key)
                .await?
                .ok_or(OrderError::Database(e))?
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(order_id, user_id = owner.id, items = order.items.len(), "Order placed");

    notify_order_placed(&state, order_id, &order).await;

    Ok(Json(CreateOrderResponse { success: true, order_id }))
}

async fn notify_order_placed(state: &AppState, order_id: i64, order: &NewOrder) {
    let lines: Vec<EmailLine> = order
        .items
        .iter()
        .map(|item| EmailLine {
            name: item.name.clone(),
            qty: item.qty,
            price: item.price,
        })
        .collect();

    let summary = EmailOrder {
        order_id,
        contact_name: order.contact_name.as_deref(),
        customer: &order.contact_email,
        total: order.total,
        payment_mode: &order.payment_mode,
        address_line1: order.address_line1.as_deref(),
        address_line2: order.address_line2.as_deref(),
        city: order.city.as_deref(),
        state: order.state.as_deref(),
        pincode: order.pincode.as_deref(),
        country: &order.country,
        lines: &lines,
    };

    match notifications::order_placed_customer(&order.contact_email, &summary) {
        Ok(email) => send_best_effort(state.mailer.as_ref(), email).await,
        Err(e) => tracing::warn!(order_id, error = %e, "Failed to render order confirmation"),
    }

    if let Some(admin_email) = &state.admin_notify_email {
        match notifications::order_placed_admin(admin_email, &summary) {
            Ok(email) => send_best_effort(state.mailer.as_ref(), email).await,
            Err(e) => tracing::warn!(order_id, error = %e, "Failed to render admin order notice"),
        }
    }
}

// =============================================================================
// GET /api/orders/my
// =============================================================================

pub async fn list_my_orders(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MyOrdersResponse>, OrderError> {
    let owner = UserCrud::new(state.db.clone())
        .find_by_email(&user.email)
        .await?
        .ok_or(OrderError::UserNotFound)?;

    let crud = OrderCrud::new(state.db.clone());
    let orders = crud.list_for_user(owner.id).await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let mut items = group_items(crud.items_for_orders(&ids).await?, &state.images);

    let orders = orders
        .into_iter()
        .map(|order| OrderResponse {
            items: items.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(Json(MyOrdersResponse { orders }))
}

// =============================================================================
// GET /api/orders
// =============================================================================

pub async fn list_all_orders(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Result<Json<AllOrdersResponse>, OrderError> {
    let crud = OrderCrud::new(state.db.clone());
    let orders = crud.list_all().await?;

    let ids: Vec<i64> = orders.iter().map(|o| o.order.id).collect();
    let mut items = group_items(crud.items_for_orders(&ids).await?, &state.images);

    let orders = orders
        .into_iter()
        .map(|row| AdminOrderResponse {
            items: items.remove(&row.order.id).unwrap_or_default(),
            order: row.order,
            user_name: row.user_name,
            user_email: row.user_email,
        })
        .collect();

    Ok(Json(AllOrdersResponse { orders }))
}

// =============================================================================
// PUT /api/orders/{id}/status
// =============================================================================

pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, OrderError> {
    let requested = req.status.trim();
    let next: OrderStatus = requested
        .parse()
        .map_err(|_| OrderError::UnknownStatus(requested.to_string()))?;

    let crud = OrderCrud::new(state.db.clone());
    let order = crud.find_by_id(id).await?.ok_or(OrderError::NotFound)?;

    let message = format!("Order {} status updated to {}", id, next);

    // Re-sending the current status is accepted without side effects.
    if order.status == next {
        return Ok(Json(MessageResponse::ok(message)));
    }

    if !order.status.can_transition_to(next) {
        return Err(OrderError::IllegalTransition { from: order.status, to: next });
    }

    if !crud.update_status(id, order.status, next).await? {
        // Another admin moved the order in the meantime.
        let current = crud.find_by_id(id).await?.ok_or(OrderError::NotFound)?;
        return Err(OrderError::IllegalTransition { from: current.status, to: next });
    }

    tracing::info!(order_id = id, from = %order.status, to = %next, admin = %admin.email, "Order status changed");

    if next == OrderStatus::Delivered {
        match notifications::order_delivered(&order.contact_email, order.contact_name.as_deref(), id, order.total) {
            Ok(email) => send_best_effort(state.mailer.as_ref(), email).await,
            Err(e) => tracing::warn!(order_id = id, error = %e, "Failed to render delivery email"),
        }
    }

    Ok(Json(MessageResponse::ok(message)))
}

// =============================================================================
// GET /api/orders/{id}/invoice
// =============================================================================

pub async fn generate_invoice(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Response, OrderError> {
    let crud = OrderCrud::new(state.db.clone());

    let row = crud
        .find_owned(id, &user.email)
        .await?
        .ok_or(OrderError::NotFoundOrUnauthorized)?;
    let items = crud.items_for_orders(&[id]).await?;

    let order = row.order;
    let data = InvoiceData {
        order_id: order.id,
        created_at: order.created_at,
        status: order.status.to_string(),
        bill_to_name: order
            .contact_name
            .clone()
            .or_else(|| Some(row.user_name).filter(|n| !n.is_empty()))
            .unwrap_or_else(|| "Customer".to_string()),
        bill_to_email: order.contact_email.clone(),
        address: order.full_address(),
        phone: order.phone.clone(),
        payment_mode: order.payment_mode.clone(),
        total: order.total,
        lines: items
            .into_iter()
            .map(|item| InvoiceLine {
                name: item.name,
                qty: item.qty,
                price: item.price,
            })
            .collect(),
    };

    let pdf = render_invoice(&data, state.invoice_font.as_deref().map(Vec::as_slice))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=invoice-{}.pdf", id),
            ),
        ],
        pdf,
    )
        .into_response())
}

// =============================================================================
// POST /api/orders/{id}/review
// =============================================================================

pub async fn submit_review(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ReviewRequest>,
) -> Result<Json<MessageResponse>, OrderError> {
    let rating = match req.rating {
        Some(rating) if (1..=5).contains(&rating) => rating,
        _ => return Err(OrderError::InvalidRating),
    };
    let item_id = req
        .item_id
        .ok_or_else(|| OrderError::InvalidItem("item_id is required".to_string()))?;
    let comment = req.comment.as_deref().map(str::trim).unwrap_or_default();

    let crud = OrderCrud::new(state.db.clone());

    let row = crud
        .find_owned(id, &user.email)
        .await?
        .ok_or(OrderError::NotFoundOrUnauthorized)?;

    if row.order.status != OrderStatus::Delivered {
        return Err(OrderError::NotDelivered);
    }

    if !crud.item_in_order(id, item_id).await? {
        return Err(OrderError::ItemNotFound);
    }

    if crud.review_exists(id, item_id, &user.email).await? {
        return Err(OrderError::AlreadyReviewed);
    }

    match crud.add_review(id, item_id, &user.email, rating, comment).await {
        Ok(()) => {}
        Err(e) if is_duplicate_key(&e) => return Err(OrderError::AlreadyReviewed),
        Err(e) => return Err(e.into()),
    }

    tracing::info!(order_id = id, item_id, rating, "Review submitted");
    Ok(Json(MessageResponse::ok(
        "Review submitted successfully. Thank you for your feedback!",
    )))
}
