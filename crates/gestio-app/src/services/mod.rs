//! # Application Services
//!
//! One service per page family. Every service validates its input before
//! the first store call (validation errors never produce network traffic),
//! then delegates to the repositories and lets the change feed keep the
//! caches current.

pub mod catalog;
pub mod contacts;
pub mod dashboard;
pub mod expenses;
pub mod orders;
pub mod recycle_bin;
pub mod stock;

use serde::{Deserialize, Serialize};

use gestio_core::validation;
use gestio_db::repository::NewLineItem;
use gestio_db::Database;

use crate::error::{AppError, AppResult};

/// Caller input for a product-backed line item.
///
/// The unit price is optional: absent, the product's current price is
/// frozen onto the line (sale price for orders/exits, purchase price for
/// entries).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    pub product_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
    #[serde(default)]
    pub discount_bps: u32,
}

/// Which product price a document freezes onto its lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PriceSource {
    Purchase,
    Sale,
}

/// Validates line inputs and resolves each product, freezing its name and
/// (when no explicit price was given) its current price.
pub(crate) async fn resolve_lines(
    db: &Database,
    items: &[LineItemInput],
    price_source: PriceSource,
) -> AppResult<Vec<NewLineItem>> {
    // Pure checks first: a validation failure must not produce any store
    // traffic
    validation::validate_item_count(items.len())?;
    for item in items {
        validation::validate_quantity(item.quantity)?;
        validation::validate_discount_bps(item.discount_bps)?;
        if let Some(cents) = item.unit_price_cents {
            validation::validate_price_cents(cents)?;
        }
    }

    let products = db.products();
    let mut lines = Vec::with_capacity(items.len());

    for item in items {
        let product = products
            .get_by_id(&item.product_id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", &item.product_id))?;

        let unit_price_cents = item.unit_price_cents.unwrap_or(match price_source {
            PriceSource::Purchase => product.purchase_price_cents,
            PriceSource::Sale => product.sale_price_cents,
        });

        lines.push(NewLineItem {
            product_id: product.id,
            product_name: product.name,
            quantity: item.quantity,
            unit_price_cents,
            discount_bps: item.discount_bps,
        });
    }

    Ok(lines)
}
