//! 内置场景文本
//!
//! 三个履约场景：常规批量处理、库存不足、供应商比价。未知名称回退到 basic。

pub const BASIC_FULFILLMENT: &str = "
We need to process our latest batch of incoming orders. Review all pending orders
and develop a fulfillment strategy. Start by assessing our current inventory and
identify any components we need to source from our suppliers. Look at our production
capacity and schedule manufacturing accordingly. For any items we're short on, place
orders with our suppliers right away. Once products are ready, coordinate shipping
to the customer, and make sure to keep customers informed throughout the
process. The key priority is to ship whatever we can immediately while setting up
the pipeline for any backordered items.
";

pub const LOW_INVENTORY: &str = "
Process an order for 200 units of SKU001 (more than current inventory).
The system should:
1. Check current inventory
2. Identify the shortage
3. Create appropriate purchase orders
4. Notify the customer about partial fulfillment or delay
";

pub const SUPPLIER_OPTIMIZATION: &str = "
Need to order SKU002 from suppliers.
Compare offers from both suppliers:
- SUP001: $15.00 per unit, min order 30
- SUP002: $16.00 per unit, min order 25
Choose the most cost-effective option considering lead times and minimum orders.
";

/// 全部场景名（实验入口按此顺序跑）
pub const ALL: [&str; 3] = ["basic", "low_inventory", "supplier_optimization"];

pub fn get(name: &str) -> &'static str {
    match name {
        "low_inventory" => LOW_INVENTORY,
        "supplier_optimization" => SUPPLIER_OPTIMIZATION,
        _ => BASIC_FULFILLMENT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_falls_back_to_basic() {
        assert_eq!(get("nonexistent"), BASIC_FULFILLMENT);
        assert_eq!(get("low_inventory"), LOW_INVENTORY);
    }
}
