use askama::Template;
use rust_decimal::Decimal;

use super::email::OutgoingEmail;

/// One cart line as shown in order emails.
pub struct EmailLine {
    pub name: String,
    pub qty: i32,
    pub price: Decimal,
}

/// Shipping/contact block shared by the order emails.
pub struct EmailOrder<'a> {
    pub order_id: i64,
    pub contact_name: Option<&'a str>,
    pub customer: &'a str,
    pub total: Decimal,
    pub payment_mode: &'a str,
    pub address_line1: Option<&'a str>,
    pub address_line2: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub pincode: Option<&'a str>,
    pub country: &'a str,
    pub lines: &'a [EmailLine],
}

impl EmailOrder<'_> {
    fn greeting_name(&self) -> &str {
        self.contact_name.unwrap_or("there")
    }

    fn street(&self) -> String {
        join_present(&[self.address_line1, self.address_line2], " ")
    }

    fn locality(&self) -> String {
        format!(
            "{} - {}, {}, {}",
            self.city.unwrap_or_default(),
            self.pincode.unwrap_or_default(),
            self.state.unwrap_or_default(),
            self.country
        )
    }
}

fn join_present(parts: &[Option<&str>], sep: &str) -> String {
    parts
        .iter()
        .flatten()
        .filter(|p| !p.trim().is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(sep)
}

#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetHtml<'a> {
    username: &'a str,
    reset_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/order_placed_customer.html")]
struct OrderPlacedCustomerHtml<'a> {
    name: &'a str,
    order_id: i64,
    lines: &'a [EmailLine],
    total: Decimal,
    street: String,
    locality: String,
}

#[derive(Template)]
#[template(path = "email/order_placed_admin.html")]
struct OrderPlacedAdminHtml<'a> {
    customer: &'a str,
    order_id: i64,
    lines: &'a [EmailLine],
    total: Decimal,
    payment_mode: &'a str,
    street: String,
    locality: String,
}

#[derive(Template)]
#[template(path = "email/order_delivered.html")]
struct OrderDeliveredHtml<'a> {
    name: &'a str,
    order_id: i64,
    total: Decimal,
}

pub fn password_reset(to: &str, username: &str, reset_url: &str) -> Result<OutgoingEmail, askama::Error> {
    let html = PasswordResetHtml { username, reset_url }.render()?;
    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: "Password Reset Link".to_string(),
        html,
    })
}

pub fn order_placed_customer(to: &str, order: &EmailOrder<'_>) -> Result<OutgoingEmail, askama::Error> {
    let html = OrderPlacedCustomerHtml {
        name: order.greeting_name(),
        order_id: order.order_id,
        lines: order.lines,
        total: order.total,
        street: order.street(),
        locality: order.locality(),
    }
    .render()?;

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: format!("Your order #{} has been placed", order.order_id),
        html,
    })
}

pub fn order_placed_admin(to: &str, order: &EmailOrder<'_>) -> Result<OutgoingEmail, askama::Error> {
    let customer = order.contact_name.unwrap_or(order.customer);
    let html = OrderPlacedAdminHtml {
        customer,
        order_id: order.order_id,
        lines: order.lines,
        total: order.total,
        payment_mode: order.payment_mode,
        street: order.street(),
        locality: order.locality(),
    }
    .render()?;

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: format!("New order #{} placed by {}", order.order_id, customer),
        html,
    })
}

pub fn order_delivered(
    to: &str,
    contact_name: Option<&str>,
    order_id: i64,
    total: Decimal,
) -> Result<OutgoingEmail, askama::Error> {
    let html = OrderDeliveredHtml {
        name: contact_name.unwrap_or("there"),
        order_id,
        total,
    }
    .render()?;

    Ok(OutgoingEmail {
        to: to.to_string(),
        subject: format!("Your order #{} has been delivered", order_id),
        html,
    })
}
