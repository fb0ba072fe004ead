//! Derived report figures and the CSV export.

use std::fmt::Write;

use rust_decimal::Decimal;

use giftmart_core::{percentage, round_money};

use crate::models::report::{
    ExportRow, FrequencyBuckets, ProductPerformance, ProductSales, VendorOrderCounts,
    VendorPerformance,
};

/// Header row of the order export.
pub const EXPORT_HEADER: &str = "Order ID,Customer Name,Date,Payment,Status,Amount";

/// Fulfillment rate: delivered over non-cancelled orders.
#[must_use]
pub fn fulfillment_rate(counts: &VendorOrderCounts) -> Decimal {
    percentage(
        counts.delivered_orders,
        counts.total_orders - counts.cancelled_orders,
    )
}

/// Return rate: returned over everything that reached the customer.
#[must_use]
pub fn return_rate(counts: &VendorOrderCounts) -> Decimal {
    percentage(
        counts.returned_orders,
        counts.delivered_orders + counts.returned_orders,
    )
}

#[must_use]
pub fn vendor_performance(counts: VendorOrderCounts) -> VendorPerformance {
    VendorPerformance {
        fulfillment_rate: fulfillment_rate(&counts),
        return_rate: return_rate(&counts),
        seller_id: counts.seller_id,
        store_name: counts.store_name,
        revenue: counts.revenue,
        total_orders: counts.total_orders,
    }
}

#[must_use]
pub fn product_performance(sales: ProductSales) -> ProductPerformance {
    ProductPerformance {
        conversion_rate: percentage(sales.purchases, i64::from(sales.views)),
        product_id: sales.product_id,
        name: sales.name,
        views: sales.views,
        purchases: sales.purchases,
        revenue: sales.revenue,
    }
}

/// Group customers by how many orders each has placed. Customers with no
/// orders are not counted.
#[must_use]
pub fn frequency_buckets(order_counts: impl IntoIterator<Item = i64>) -> FrequencyBuckets {
    order_counts
        .into_iter()
        .fold(FrequencyBuckets::default(), |mut buckets, count| {
            match count {
                1 => buckets.one_time += 1,
                2..=4 => buckets.repeat += 1,
                n if n >= 5 => buckets.frequent += 1,
                _ => {}
            }
            buckets
        })
}

/// Mean of `total` over `count`, zero when empty.
#[must_use]
pub fn average(total: Decimal, count: i64) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    round_money(total / Decimal::from(count))
}

/// Quote a CSV field when it contains a separator, quote or newline.
#[must_use]
pub fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render the order export, ending with a total row.
#[must_use]
pub fn orders_csv(rows: &[ExportRow]) -> String {
    let mut csv = String::from(EXPORT_HEADER);
    csv.push('\n');

    let mut total = Decimal::ZERO;
    for row in rows {
        let payment = if row.payment_id.is_some() { "Online" } else { "COD" };
        let _ = writeln!(
            csv,
            "{},{},{},{},{},{:.2}",
            row.order_id,
            csv_field(&row.customer_name),
            row.created_at.format("%Y-%m-%d"),
            payment,
            row.status,
            row.total_amount
        );
        total += row.total_amount;
    }
    let _ = writeln!(csv, "Total,,,,,{total:.2}");
    csv
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use giftmart_core::{OrderId, OrderStatus, ProductId, SellerId};

    use super::*;

    fn counts(total: i64, delivered: i64, returned: i64, cancelled: i64) -> VendorOrderCounts {
        VendorOrderCounts {
            seller_id: SellerId::new(1),
            store_name: "Petals".into(),
            revenue: Decimal::ZERO,
            total_orders: total,
            delivered_orders: delivered,
            returned_orders: returned,
            cancelled_orders: cancelled,
        }
    }

    #[test]
    fn test_vendor_rates() {
        let c = counts(10, 6, 2, 1);
        assert_eq!(fulfillment_rate(&c), "66.67".parse::<Decimal>().unwrap());
        assert_eq!(return_rate(&c), Decimal::from(25));

        let empty = counts(0, 0, 0, 0);
        assert_eq!(fulfillment_rate(&empty), Decimal::ZERO);
        assert_eq!(return_rate(&empty), Decimal::ZERO);
    }

    #[test]
    fn test_conversion_without_views_is_zero() {
        let perf = product_performance(ProductSales {
            product_id: ProductId::new(1),
            name: "Mug".into(),
            views: 0,
            purchases: 3,
            revenue: Decimal::from(300),
        });
        assert_eq!(perf.conversion_rate, Decimal::ZERO);

        let perf = product_performance(ProductSales {
            product_id: ProductId::new(2),
            name: "Card".into(),
            views: 3,
            purchases: 1,
            revenue: Decimal::from(99),
        });
        assert_eq!(perf.conversion_rate, "33.33".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_frequency_buckets() {
        let buckets = frequency_buckets([1, 1, 2, 4, 5, 9, 0]);
        assert_eq!(
            buckets,
            FrequencyBuckets {
                one_time: 2,
                repeat: 2,
                frequent: 2
            }
        );
    }

    #[test]
    fn test_csv_field_escaping() {
        assert_eq!(csv_field("Asha"), "Asha");
        assert_eq!(csv_field("Rao, Asha"), "\"Rao, Asha\"");
        assert_eq!(csv_field("the \"gift\" guy"), "\"the \"\"gift\"\" guy\"");
    }

    #[test]
    fn test_orders_csv() {
        let at = "2026-10-05T08:30:00Z".parse::<DateTime<Utc>>().unwrap();
        let rows = vec![
            ExportRow {
                order_id: OrderId::new(7),
                customer_name: "Rao, Asha".into(),
                created_at: at,
                payment_id: Some("pay_123".into()),
                status: OrderStatus::Delivered,
                total_amount: "1499.5".parse().unwrap(),
            },
            ExportRow {
                order_id: OrderId::new(8),
                customer_name: "Vikram".into(),
                created_at: at,
                payment_id: None,
                status: OrderStatus::Pending,
                total_amount: Decimal::from(500),
            },
        ];
        let csv = orders_csv(&rows);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], EXPORT_HEADER);
        assert_eq!(lines[1], "7,\"Rao, Asha\",2026-10-05,Online,delivered,1499.50");
        assert_eq!(lines[2], "8,Vikram,2026-10-05,COD,pending,500.00");
        assert_eq!(lines[3], "Total,,,,,1999.50");
    }

    #[test]
    fn test_average() {
        assert_eq!(average(Decimal::from(10), 3), "3.33".parse::<Decimal>().unwrap());
        assert_eq!(average(Decimal::from(10), 0), Decimal::ZERO);
    }
}
