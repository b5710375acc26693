use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rgb};
use rust_decimal::Decimal;
use std::borrow::Cow;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT: f32 = 18.0;
const RIGHT: f32 = 192.0;
const BOTTOM: f32 = 28.0;
const ROW_HEIGHT: f32 = 8.0;
const MAX_ITEM_NAME: usize = 48;

const BRAND: &str = "ADHARV INTERNATIONAL";
const TAGLINE: &str = "Sacred Brass Creations";
const CONTACT: &str = "team.zentrixinfotech@gmail.com";

#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    #[error("PDF rendering failed: {0}")]
    Pdf(#[from] printpdf::Error),
}

#[derive(Debug, Clone)]
pub struct InvoiceLine {
    pub name: String,
    pub qty: i32,
    pub price: Decimal,
}

impl InvoiceLine {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

#[derive(Debug, Clone)]
pub struct InvoiceData {
    pub order_id: i64,
    pub created_at: DateTime<Utc>,
    pub status: String,
    pub bill_to_name: String,
    pub bill_to_email: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_mode: String,
    /// Total stored on the order at checkout.
    pub total: Decimal,
    pub lines: Vec<InvoiceLine>,
}

impl InvoiceData {
    pub fn invoice_number(&self) -> String {
        format!("INV-{:06}", self.order_id)
    }

    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(InvoiceLine::line_total).sum()
    }
}

fn money(amount: Decimal) -> String {
    format!("Rs. {:.2}", amount.round_dp(2))
}

fn truncate(name: &str) -> String {
    if name.chars().count() <= MAX_ITEM_NAME {
        return name.to_string();
    }
    let cut: String = name.chars().take(MAX_ITEM_NAME - 3).collect();
    format!("{}...", cut)
}

/// The standard PDF fonts only cover Latin-1. The rupee sign is spelled out
/// and any other glyph they cannot draw becomes `?`.
fn builtin_text(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| (c as u32) < 0x100) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{20B9}' => out.push_str("Rs."),
            c if (c as u32) < 0x100 => out.push(c),
            _ => out.push('?'),
        }
    }
    Cow::Owned(out)
}

// Helvetica averages roughly half an em per glyph.
fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * 0.5 * 0.3528
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

struct Cursor {
    layer: PdfLayerReference,
    y: f32,
    builtin: bool,
}

impl Cursor {
    fn text(&self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        if self.builtin {
            self.layer.use_text(builtin_text(text), size, Mm(x), Mm(self.y), font);
        } else {
            self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
        }
    }

    fn text_right(&self, text: &str, size: f32, right: f32, font: &IndirectFontRef) {
        self.text(text, size, right - text_width(text, size), font);
    }

    fn text_center(&self, text: &str, size: f32, font: &IndirectFontRef) {
        self.text(text, size, (PAGE_WIDTH - text_width(text, size)) / 2.0, font);
    }

    fn color(&self, r: f32, g: f32, b: f32) {
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
    }

    fn down(&mut self, mm: f32) {
        self.y -= mm;
    }
}

/// Renders an A4 invoice and returns the PDF bytes. With `font` (TrueType
/// bytes) every line is set in that face; without it Helvetica is used.
pub fn render_invoice(data: &InvoiceData, font: Option<&[u8]>) -> Result<Vec<u8>, InvoiceError> {
    let title = format!("Invoice {}", data.invoice_number());
    let (doc, page, layer) = PdfDocument::new(&title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    let fonts = match font {
        Some(bytes) => {
            let face = doc.add_external_font(bytes)?;
            Fonts {
                regular: face.clone(),
                bold: face.clone(),
                italic: face,
            }
        }
        None => Fonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
            italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique)?,
        },
    };

    let mut cur = Cursor {
        layer: doc.get_page(page).get_layer(layer),
        y: PAGE_HEIGHT - 22.0,
        builtin: font.is_none(),
    };

    cur.color(0.34, 0.18, 0.11);
    cur.text_center(BRAND, 20.0, &fonts.bold);
    cur.down(7.0);
    cur.color(0.4, 0.4, 0.4);
    cur.text_center(TAGLINE, 10.0, &fonts.regular);
    cur.down(5.0);
    cur.text_center(&format!("Email: {}", CONTACT), 10.0, &fonts.regular);
    cur.down(14.0);

    cur.color(0.0, 0.0, 0.0);
    cur.text_center("TAX INVOICE", 16.0, &fonts.bold);
    cur.down(12.0);

    let details = [
        format!("Invoice Number: {}", data.invoice_number()),
        format!("Order ID: #{}", data.order_id),
        format!("Date: {}", data.created_at.format("%d %B %Y")),
        format!("Status: {}", data.status),
    ];
    for line in &details {
        cur.text(line, 10.0, LEFT, &fonts.regular);
        cur.down(5.0);
    }
    cur.down(5.0);

    cur.text("Bill To:", 12.0, LEFT, &fonts.bold);
    cur.down(6.0);
    cur.text(&data.bill_to_name, 10.0, LEFT, &fonts.regular);
    cur.down(5.0);
    cur.text(&data.bill_to_email, 10.0, LEFT, &fonts.regular);
    cur.down(5.0);
    if let Some(address) = data.address.as_deref().filter(|a| !a.is_empty()) {
        cur.text(address, 10.0, LEFT, &fonts.regular);
        cur.down(5.0);
    }
    if let Some(phone) = data.phone.as_deref().filter(|p| !p.is_empty()) {
        cur.text(&format!("Phone: {}", phone), 10.0, LEFT, &fonts.regular);
        cur.down(5.0);
    }
    cur.down(8.0);

    table_header(&cur, &fonts);
    cur.down(ROW_HEIGHT);

    for line in &data.lines {
        if cur.y < BOTTOM + ROW_HEIGHT {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            cur = Cursor {
                layer: doc.get_page(page).get_layer(layer),
                y: PAGE_HEIGHT - 22.0,
                builtin: cur.builtin,
            };
            table_header(&cur, &fonts);
            cur.down(ROW_HEIGHT);
        }

        cur.color(0.0, 0.0, 0.0);
        cur.text(&truncate(&line.name), 10.0, LEFT + 2.0, &fonts.regular);
        cur.text_right(&line.qty.to_string(), 10.0, 122.0, &fonts.regular);
        cur.text_right(&money(line.price), 10.0, 155.0, &fonts.regular);
        cur.text_right(&money(line.line_total()), 10.0, RIGHT, &fonts.regular);
        cur.down(ROW_HEIGHT);
    }

    // Totals and footer stay together on one page.
    if cur.y < BOTTOM + 60.0 {
        let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        cur = Cursor {
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - 22.0,
            builtin: cur.builtin,
        };
    }

    cur.color(0.34, 0.18, 0.11);
    cur.text(&"_".repeat(86), 10.0, LEFT, &fonts.regular);
    cur.down(10.0);

    cur.color(0.0, 0.0, 0.0);
    cur.text_right("Subtotal:", 11.0, 155.0, &fonts.regular);
    cur.text_right(&money(data.subtotal()), 11.0, RIGHT, &fonts.regular);
    cur.down(8.0);

    cur.color(0.34, 0.18, 0.11);
    cur.text_right("Grand Total:", 13.0, 155.0, &fonts.bold);
    cur.text_right(&money(data.total), 13.0, RIGHT, &fonts.bold);
    cur.down(12.0);

    cur.color(0.0, 0.0, 0.0);
    cur.text(&format!("Payment Mode: {}", data.payment_mode), 10.0, LEFT, &fonts.regular);
    cur.down(16.0);

    cur.color(0.4, 0.4, 0.4);
    cur.text_center("Thank you for your purchase!", 10.0, &fonts.italic);
    cur.down(5.0);
    cur.text_center(&format!("For any queries, contact us at {}", CONTACT), 10.0, &fonts.italic);
    cur.down(8.0);
    cur.text_center(
        "This is a computer-generated invoice and does not require a signature.",
        8.0,
        &fonts.italic,
    );

    Ok(doc.save_to_bytes()?)
}

fn table_header(cur: &Cursor, fonts: &Fonts) {
    cur.color(0.34, 0.18, 0.11);
    cur.text("Item", 10.0, LEFT + 2.0, &fonts.bold);
    cur.text_right("Qty", 10.0, 122.0, &fonts.bold);
    cur.text_right("Price", 10.0, 155.0, &fonts.bold);
    cur.text_right("Total", 10.0, RIGHT, &fonts.bold);
}
