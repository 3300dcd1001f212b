//! 业务状态
//!
//! 一次执行独占的订单履约状态：库存、待处理订单、供应商、仓库容量，
//! 以及执行过程派生的采购单、排程记录与客户通知。
//! 只能经注册函数修改，绝不跨运行复用（每次运行构造新实例）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub sku: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    pub items: Vec<OrderLine>,
    pub customer_id: String,
    pub shipping_address: String,
    pub priority: String,
}

/// 供应商目录条目：单价与最小起订量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub unit_cost: f64,
    pub min_order: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplier {
    pub name: String,
    pub lead_time_days: u32,
    pub items: BTreeMap<String, CatalogItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarehouseCapacity {
    pub processing: u32,
    pub shipping: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub supplier_id: String,
    pub sku: String,
    pub quantity: u32,
    pub lead_time_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledProcessing {
    pub priority: String,
    pub status: String,
    pub scheduled_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerNotification {
    pub customer_id: String,
    pub message: String,
    pub sent_at: String,
}

/// 共享业务状态：单个执行循环独占，所有修改都经由注册函数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessState {
    pub inventory: BTreeMap<String, u32>,
    pub orders: Vec<Order>,
    pub suppliers: BTreeMap<String, Supplier>,
    pub warehouse: WarehouseCapacity,
    #[serde(default)]
    pub purchase_orders: BTreeMap<String, PurchaseOrder>,
    #[serde(default)]
    pub scheduled: BTreeMap<String, ScheduledProcessing>,
    #[serde(default)]
    pub notifications: BTreeMap<String, CustomerNotification>,
}

impl Default for BusinessState {
    fn default() -> Self {
        Self {
            inventory: BTreeMap::from([
                ("SKU001".to_string(), 100),
                ("SKU002".to_string(), 75),
                ("SKU003".to_string(), 50),
            ]),
            orders: vec![
                Order {
                    order_id: "ORD001".to_string(),
                    items: vec![
                        OrderLine { sku: "SKU001".to_string(), quantity: 30 },
                        OrderLine { sku: "SKU002".to_string(), quantity: 20 },
                    ],
                    customer_id: "CUST001".to_string(),
                    shipping_address: "New York, NY".to_string(),
                    priority: "Standard".to_string(),
                },
                Order {
                    order_id: "ORD002".to_string(),
                    items: vec![OrderLine { sku: "SKU002".to_string(), quantity: 50 }],
                    customer_id: "CUST002".to_string(),
                    shipping_address: "Los Angeles, CA".to_string(),
                    priority: "Express".to_string(),
                },
            ],
            suppliers: BTreeMap::from([
                (
                    "SUP001".to_string(),
                    Supplier {
                        name: "Primary Supplier".to_string(),
                        lead_time_days: 5,
                        items: BTreeMap::from([
                            ("SKU001".to_string(), CatalogItem { unit_cost: 10.00, min_order: 50 }),
                            ("SKU002".to_string(), CatalogItem { unit_cost: 15.00, min_order: 30 }),
                        ]),
                    },
                ),
                (
                    "SUP002".to_string(),
                    Supplier {
                        name: "Secondary Supplier".to_string(),
                        lead_time_days: 7,
                        items: BTreeMap::from([
                            ("SKU002".to_string(), CatalogItem { unit_cost: 16.00, min_order: 25 }),
                            ("SKU003".to_string(), CatalogItem { unit_cost: 20.00, min_order: 40 }),
                        ]),
                    },
                ),
            ]),
            warehouse: WarehouseCapacity { processing: 200, shipping: 150 },
            purchase_orders: BTreeMap::new(),
            scheduled: BTreeMap::new(),
            notifications: BTreeMap::new(),
        }
    }
}

impl BusinessState {
    /// 低库存预设：三个 SKU 都接近售罄
    pub fn low_inventory() -> Self {
        Self {
            inventory: BTreeMap::from([
                ("SKU001".to_string(), 10),
                ("SKU002".to_string(), 5),
                ("SKU003".to_string(), 2),
            ]),
            ..Self::default()
        }
    }

    /// 高需求预设：单笔 Rush 订单超出全部库存
    pub fn high_demand() -> Self {
        Self {
            orders: vec![Order {
                order_id: "ORD001".to_string(),
                items: vec![
                    OrderLine { sku: "SKU001".to_string(), quantity: 300 },
                    OrderLine { sku: "SKU002".to_string(), quantity: 200 },
                ],
                customer_id: "CUST001".to_string(),
                shipping_address: "New York, NY".to_string(),
                priority: "Rush".to_string(),
            }],
            ..Self::default()
        }
    }

    /// 高产能预设：仓库处理与发运容量放大
    pub fn high_capacity() -> Self {
        Self {
            warehouse: WarehouseCapacity { processing: 1000, shipping: 800 },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_levels() {
        let state = BusinessState::default();
        assert_eq!(state.inventory.get("SKU001"), Some(&100));
        assert_eq!(state.orders.len(), 2);
        assert_eq!(state.suppliers.len(), 2);
        assert_eq!(state.warehouse.processing, 200);
        assert!(state.purchase_orders.is_empty());
    }

    #[test]
    fn test_presets_differ_only_where_declared() {
        let low = BusinessState::low_inventory();
        assert_eq!(low.inventory.get("SKU003"), Some(&2));
        assert_eq!(low.warehouse, BusinessState::default().warehouse);

        let high = BusinessState::high_capacity();
        assert_eq!(high.warehouse.processing, 1000);
        assert_eq!(high.inventory, BusinessState::default().inventory);
    }
}
