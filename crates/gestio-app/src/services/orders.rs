//! # Orders Service
//!
//! Order CRUD and the order → stock exit conversion entry point.
//!
//! ## Conversion Preconditions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 convert_order(order_id, invoice)                        │
//! │                                                                         │
//! │  order missing            ──► NOT_FOUND                                 │
//! │  order cancelled          ──► BUSINESS_LOGIC                            │
//! │  order already converted  ──► BUSINESS_LOGIC (names the exit number)    │
//! │  orphan exit exists       ──► adopt it, never create a duplicate        │
//! │  otherwise                ──► transactional conversion in gestio-db     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An orphan exit is one whose `from_order_id` points at a still-pending
//! order: an earlier conversion created the exit but the order update never
//! landed. Re-converting would duplicate the exit and decrement stock
//! twice, so the orphan is adopted instead.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use chrono::NaiveDate;
use gestio_core::{validation, CoreError, Order, OrderItem, StockExit, StockExitItem};
use gestio_db::repository::order::NewOrder;
use gestio_db::Database;

use crate::error::{AppError, AppResult};
use crate::services::{resolve_lines, LineItemInput, PriceSource};

/// Input for creating or editing an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInput {
    pub client_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub discount_bps: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItemInput>,
}

/// Service for order operations.
#[derive(Debug, Clone)]
pub struct OrdersService {
    db: Database,
}

impl OrdersService {
    /// Creates a new OrdersService.
    pub fn new(db: Database) -> Self {
        OrdersService { db }
    }

    /// Creates a pending order.
    pub async fn create_order(&self, input: OrderInput) -> AppResult<(Order, Vec<OrderItem>)> {
        validation::validate_discount_bps(input.discount_bps)?;

        let lines = resolve_lines(&self.db, &input.items, PriceSource::Sale).await?;

        let client = self
            .db
            .clients()
            .get_by_id(&input.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", &input.client_id))?;

        let (order, items) = self
            .db
            .orders()
            .create(NewOrder {
                client_id: client.id,
                client_name: client.name,
                date: input.date,
                discount_bps: input.discount_bps,
                notes: input.notes,
                items: lines,
            })
            .await?;

        Ok((order, items))
    }

    /// Updates a pending order, replacing its items wholesale.
    ///
    /// Converted orders are immutable; cancelled orders cannot be edited
    /// either.
    pub async fn update_order(
        &self,
        order_id: &str,
        input: OrderInput,
    ) -> AppResult<(Order, Vec<OrderItem>)> {
        let existing = self.get_order(order_id).await?;
        self.ensure_pending(&existing)?;

        validation::validate_discount_bps(input.discount_bps)?;

        let lines = resolve_lines(&self.db, &input.items, PriceSource::Sale).await?;

        let client = self
            .db
            .clients()
            .get_by_id(&input.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", &input.client_id))?;

        let updated = Order {
            client_id: client.id,
            client_name: client.name,
            date: input.date,
            discount_bps: input.discount_bps,
            notes: input.notes,
            ..existing
        };

        self.db.orders().update(&updated, Some(&lines)).await?;

        let order = self.get_order(order_id).await?;
        let items = self.db.orders().get_items(order_id).await?;
        Ok((order, items))
    }

    /// Cancels a pending order.
    pub async fn cancel_order(&self, order_id: &str) -> AppResult<Order> {
        let existing = self.get_order(order_id).await?;
        self.ensure_pending(&existing)?;

        Ok(self.db.orders().cancel(order_id).await?)
    }

    /// Converts a pending order into a stock exit.
    ///
    /// Returns the exit with its items. The caches pick up the new exit,
    /// the converted order and the adjusted products from the change feed.
    pub async fn convert_order(
        &self,
        order_id: &str,
        invoice_number: Option<String>,
    ) -> AppResult<(StockExit, Vec<StockExitItem>)> {
        let order = self.get_order(order_id).await?;

        if order.is_cancelled() {
            return Err(CoreError::InvalidOrderStatus {
                order_id: order.id,
                status: "cancelled".to_string(),
            }
            .into());
        }

        if order.is_converted() {
            return Err(CoreError::AlreadyConverted {
                order_id: order.id,
                exit_number: order
                    .converted_to_stock_exit_number
                    .unwrap_or_else(|| "unknown".to_string()),
            }
            .into());
        }

        // Orphan recovery: an exit for this order already exists but the
        // order never got marked. Adopt it instead of converting again.
        if let Some(orphan) = self.db.stock_exits().find_by_order(&order.id).await? {
            warn!(order = %order.number, exit = %orphan.number,
                  "Order has an orphan exit; adopting instead of re-converting");

            self.db.orders().adopt_exit(&order.id, &orphan).await?;
            let items = self.db.stock_exits().get_items(&orphan.id).await?;
            return Ok((orphan, items));
        }

        let (exit, items) = self
            .db
            .orders()
            .convert_to_stock_exit(&order.id, invoice_number.as_deref())
            .await?;

        info!(order = %order.number, exit = %exit.number, "Order converted");

        Ok((exit, items))
    }

    /// Soft-deletes an order.
    pub async fn delete_order(&self, order_id: &str) -> AppResult<()> {
        self.db.orders().soft_delete(order_id).await?;
        Ok(())
    }

    /// Gets an order or fails NotFound.
    pub async fn get_order(&self, order_id: &str) -> AppResult<Order> {
        self.db
            .orders()
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| AppError::not_found("Order", order_id))
    }

    /// Gets an order with its items.
    pub async fn get_order_with_items(&self, order_id: &str) -> AppResult<(Order, Vec<OrderItem>)> {
        let order = self.get_order(order_id).await?;
        let items = self.db.orders().get_items(order_id).await?;
        Ok((order, items))
    }

    /// Lists live orders.
    pub async fn list_orders(&self) -> AppResult<Vec<Order>> {
        Ok(self.db.orders().list().await?)
    }

    fn ensure_pending(&self, order: &Order) -> AppResult<()> {
        if order.is_converted() || order.is_cancelled() {
            let status = if order.is_converted() {
                "converted"
            } else {
                "cancelled"
            };
            return Err(CoreError::InvalidOrderStatus {
                order_id: order.id.clone(),
                status: status.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
