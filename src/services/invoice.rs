//! Invoice documents derived from finalized orders.

use crate::domain::aggregates::order::{Address, Order, OrderItem, PaymentStatus};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Clone, Debug, Serialize)]
pub struct InvoiceLine {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

#[derive(Clone, Debug, Serialize)]
pub struct Invoice {
    pub number: String,
    pub order_number: String,
    pub issued_at: DateTime<Utc>,
    pub bill_to: Address,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
    pub currency: String,
}

/// Builds the invoice for a paid order. Unpaid orders have nothing to
/// invoice yet.
pub fn build(order: &Order, items: &[OrderItem]) -> Result<Invoice> {
    if order.payment_status == PaymentStatus::Unpaid {
        return Err(Error::Validation(
            "invoice is available once the order is paid".into(),
        ));
    }
    Ok(Invoice {
        number: format!("INV-{}", order.order_number.trim_start_matches("ORD-")),
        order_number: order.order_number.clone(),
        issued_at: Utc::now(),
        bill_to: order.shipping_address.0.clone(),
        lines: items
            .iter()
            .map(|i| InvoiceLine {
                sku: i.sku.clone(),
                name: i.name.clone(),
                quantity: i.quantity,
                unit_price: i.unit_price,
                line_total: i.line_total,
            })
            .collect(),
        subtotal: order.subtotal,
        tax: order.tax,
        shipping: order.shipping,
        total: order.total,
        currency: order.currency.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::order::{OrderStatus, OrderTotals};
    use uuid::Uuid;

    fn paid_order() -> Order {
        let mut order = Order::place(
            "user-1",
            "buyer@example.com",
            "upi",
            OrderTotals {
                subtotal: Decimal::new(200, 0),
                tax: Decimal::new(36, 0),
                shipping: Decimal::ZERO,
                total: Decimal::new(236, 0),
            },
            "INR",
            Address::default(),
        );
        order.status = OrderStatus::Paid;
        order.payment_status = PaymentStatus::Paid;
        order
    }

    #[test]
    fn test_invoice_number_mirrors_order_number() {
        let order = paid_order();
        let invoice = build(&order, &[]).unwrap();
        assert_eq!(
            invoice.number,
            format!("INV-{}", order.order_number.trim_start_matches("ORD-"))
        );
        assert_eq!(invoice.total, Decimal::new(236, 0));
    }

    #[test]
    fn test_unpaid_order_has_no_invoice() {
        let mut order = paid_order();
        order.payment_status = PaymentStatus::Unpaid;
        assert!(matches!(
            build(&order, &[]),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_lines_carry_the_snapshot() {
        let order = paid_order();
        let items = vec![OrderItem {
            id: Uuid::new_v4(),
            order_id: order.id,
            product_id: Uuid::new_v4(),
            sku: "HEX-M8".into(),
            name: "M8 Hex Bolt".into(),
            quantity: 4,
            unit_price: Decimal::new(50, 0),
            line_total: Decimal::new(200, 0),
        }];
        let invoice = build(&order, &items).unwrap();
        assert_eq!(invoice.lines.len(), 1);
        assert_eq!(invoice.lines[0].line_total, Decimal::new(200, 0));
    }
}
