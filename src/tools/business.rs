//! 订单履约业务函数
//!
//! 十个注册函数：库存查询与分配、供应商目录与采购单、仓库排程、客户通知，
//! 以及收尾信号函数 instructions_complete（仅用于向模型暴露 schema，循环见到即终止、从不执行）。
//! 失败一律返回 DomainError，由注册表折叠为 error payload 回馈模型。

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::core::DomainError;
use crate::state::{BusinessState, CustomerNotification, PurchaseOrder, ScheduledProcessing};
use crate::tools::registry::{FunctionRegistry, FunctionSpec, JsonType, ParamSpec};

/// 收尾信号函数名：出现在 tool_calls 中即宣告执行完成
pub const COMPLETION_FUNCTION: &str = "instructions_complete";

fn str_arg(args: &Map<String, Value>, name: &str) -> Result<String, DomainError> {
    args.get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| DomainError::new(format!("missing or invalid argument: {name}")))
}

fn u32_arg(args: &Map<String, Value>, name: &str) -> Result<u32, DomainError> {
    args.get(name)
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| DomainError::new(format!("missing or invalid argument: {name}")))
}

/// Check current inventory level for a product.
fn check_inventory(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let sku = str_arg(args, "sku")?;
    let quantity = state.inventory.get(&sku).copied().unwrap_or(0);
    Ok(json!({ "sku": sku, "quantity": quantity }))
}

/// Get list of pending orders.
fn get_pending_orders(state: &mut BusinessState, _args: &Map<String, Value>) -> Result<Value, DomainError> {
    serde_json::to_value(&state.orders).map_err(|e| DomainError::new(e.to_string()))
}

/// Allocate inventory for an order. 库存不足时不做部分扣减。
fn allocate_inventory(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let order_id = str_arg(args, "order_id")?;
    let sku = str_arg(args, "sku")?;
    let quantity = u32_arg(args, "quantity")?;

    let available = state.inventory.get(&sku).copied().unwrap_or(0);
    if available < quantity {
        return Err(DomainError::new(format!(
            "Insufficient inventory for {sku}: requested {quantity}, available {available}, allocated 0"
        )));
    }
    state.inventory.insert(sku.clone(), available - quantity);
    Ok(json!({ "order_id": order_id, "sku": sku, "allocated": quantity }))
}

/// Get list of available suppliers.
fn list_suppliers(state: &mut BusinessState, _args: &Map<String, Value>) -> Result<Value, DomainError> {
    let suppliers: Vec<&String> = state.suppliers.keys().collect();
    Ok(json!({ "suppliers": suppliers }))
}

/// Get supplier's available items and pricing.
fn get_supplier_catalog(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let supplier_id = str_arg(args, "supplier_id")?;
    match state.suppliers.get(&supplier_id) {
        Some(supplier) => serde_json::to_value(supplier).map_err(|e| DomainError::new(e.to_string())),
        None => Err(DomainError::new(format!("Supplier {supplier_id} not found"))),
    }
}

/// Create a purchase order for items. 校验供应商、SKU 可得性与最小起订量。
fn create_purchase_order(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let supplier_id = str_arg(args, "supplier_id")?;
    let sku = str_arg(args, "sku")?;
    let quantity = u32_arg(args, "quantity")?;

    let supplier = state
        .suppliers
        .get(&supplier_id)
        .ok_or_else(|| DomainError::new(format!("Supplier {supplier_id} not found")))?;
    let item = supplier
        .items
        .get(&sku)
        .ok_or_else(|| DomainError::new(format!("SKU {sku} not available from supplier {supplier_id}")))?;
    if quantity < item.min_order {
        return Err(DomainError::new(format!(
            "Quantity below minimum order of {}",
            item.min_order
        )));
    }

    let lead_time_days = supplier.lead_time_days;
    let po_number = format!("PO_{supplier_id}_{sku}");
    state.purchase_orders.insert(
        po_number.clone(),
        PurchaseOrder { supplier_id, sku, quantity, lead_time_days },
    );
    Ok(json!({ "po_number": po_number, "expected_delivery": lead_time_days }))
}

/// Check available order processing capacity.
fn check_processing_capacity(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let time_frame = str_arg(args, "time_frame")?;
    Ok(json!({
        "time_frame": time_frame,
        "available_capacity": state.warehouse.processing
    }))
}

/// Schedule order processing. 占用一个处理容量单位。
fn schedule_processing(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let order_id = str_arg(args, "order_id")?;
    let priority = str_arg(args, "priority")?;

    if state.warehouse.processing == 0 {
        return Err(DomainError::new("No processing capacity available"));
    }
    state.warehouse.processing -= 1;
    state.scheduled.insert(
        order_id.clone(),
        ScheduledProcessing {
            priority: priority.clone(),
            status: "Scheduled".to_string(),
            scheduled_at: Utc::now().to_rfc3339(),
        },
    );
    Ok(json!({ "order_id": order_id, "status": "Scheduled", "priority": priority }))
}

/// Send notification to customer.
fn notify_customer(state: &mut BusinessState, args: &Map<String, Value>) -> Result<Value, DomainError> {
    let customer_id = str_arg(args, "customer_id")?;
    let order_id = str_arg(args, "order_id")?;
    let message = str_arg(args, "message")?;

    state.notifications.insert(
        order_id.clone(),
        CustomerNotification {
            customer_id: customer_id.clone(),
            message,
            sent_at: Utc::now().to_rfc3339(),
        },
    );
    Ok(json!({ "customer_id": customer_id, "order_id": order_id, "notification_sent": true }))
}

/// Indicate that the instructions are complete.
/// 执行循环在派发前就对其短路终止，此处理器只为满足注册表签名。
fn instructions_complete(_state: &mut BusinessState, _args: &Map<String, Value>) -> Result<Value, DomainError> {
    Ok(json!({ "status": "Instructions complete" }))
}

/// 注册全部订单履约函数，顺序即 ToolSpec 与功能描述清单的顺序
pub fn build_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::new();

    registry.register(
        FunctionSpec::new("check_inventory", "Check current inventory level for a product.").param(
            ParamSpec::required("sku", JsonType::String)
                .describe("The stock keeping unit identifier")
                .one_of(["SKU001", "SKU002", "SKU003"]),
        ),
        check_inventory,
    );
    registry.register(
        FunctionSpec::new("get_pending_orders", "Get list of pending orders."),
        get_pending_orders,
    );
    registry.register(
        FunctionSpec::new("allocate_inventory", "Allocate inventory for an order.")
            .param(ParamSpec::required("order_id", JsonType::String).describe("The order identifier"))
            .param(ParamSpec::required("sku", JsonType::String).describe("The stock keeping unit identifier"))
            .param(ParamSpec::required("quantity", JsonType::Integer).describe("The quantity to allocate")),
        allocate_inventory,
    );
    registry.register(
        FunctionSpec::new("list_suppliers", "Get list of available suppliers."),
        list_suppliers,
    );
    registry.register(
        FunctionSpec::new("get_supplier_catalog", "Get supplier's available items and pricing.")
            .param(ParamSpec::required("supplier_id", JsonType::String).describe("The supplier identifier")),
        get_supplier_catalog,
    );
    registry.register(
        FunctionSpec::new("create_purchase_order", "Create a purchase order for items.")
            .param(ParamSpec::required("supplier_id", JsonType::String).describe("The supplier identifier"))
            .param(ParamSpec::required("sku", JsonType::String).describe("The stock keeping unit to order"))
            .param(ParamSpec::required("quantity", JsonType::Integer).describe("The quantity to order")),
        create_purchase_order,
    );
    registry.register(
        FunctionSpec::new("check_processing_capacity", "Check available order processing capacity.").param(
            ParamSpec::required("time_frame", JsonType::String)
                .describe("The time frame to check")
                .one_of(["today", "tomorrow", "next_week"]),
        ),
        check_processing_capacity,
    );
    registry.register(
        FunctionSpec::new("schedule_processing", "Schedule order processing.")
            .param(ParamSpec::required("order_id", JsonType::String).describe("The order identifier"))
            .param(
                ParamSpec::required("priority", JsonType::String)
                    .describe("The processing priority level")
                    .one_of(["Standard", "Express", "Rush"]),
            ),
        schedule_processing,
    );
    registry.register(
        FunctionSpec::new("notify_customer", "Send notification to customer.")
            .param(ParamSpec::required("customer_id", JsonType::String).describe("The customer identifier"))
            .param(ParamSpec::required("order_id", JsonType::String).describe("The order identifier"))
            .param(ParamSpec::required("message", JsonType::String).describe("The message to send")),
        notify_customer,
    );
    registry.register(
        FunctionSpec::new(COMPLETION_FUNCTION, "Indicate that the instructions are complete."),
        instructions_complete,
    );

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::DispatchOutcome;

    const KNOWN_TYPES: [&str; 6] = ["string", "integer", "number", "boolean", "object", "array"];

    #[test]
    fn test_every_registered_function_schema_is_well_formed() {
        let registry = build_registry();
        for spec in registry.specs() {
            let tool = spec.tool_spec();
            assert_eq!(tool["type"], "function", "{}", spec.name());
            let params = &tool["function"]["parameters"];
            assert_eq!(params["additionalProperties"], false);

            let required: Vec<&str> = params["required"]
                .as_array()
                .unwrap()
                .iter()
                .map(|v| v.as_str().unwrap())
                .collect();
            for p in spec.params() {
                // 无默认值的参数必须出现在 required 中
                assert_eq!(required.contains(&p.name()), p.is_required(), "{}", spec.name());
                let declared = params["properties"][p.name()]["type"].as_str().unwrap();
                assert!(KNOWN_TYPES.contains(&declared), "{}: {}", spec.name(), declared);
            }
        }
    }

    #[test]
    fn test_completion_function_is_registered() {
        let registry = build_registry();
        assert!(registry.contains(COMPLETION_FUNCTION));
    }

    #[test]
    fn test_check_inventory_unknown_sku_is_zero() {
        let registry = build_registry();
        let mut state = BusinessState::default();
        let outcome = registry.dispatch("check_inventory", r#"{"sku": "SKU999"}"#, &mut state);
        assert_eq!(outcome, DispatchOutcome::Success(json!({"sku": "SKU999", "quantity": 0})));
    }

    #[test]
    fn test_allocate_inventory_boundary() {
        let registry = build_registry();
        let mut state = BusinessState::default();
        assert_eq!(state.inventory.get("SKU001"), Some(&100));

        let outcome = registry.dispatch(
            "allocate_inventory",
            r#"{"order_id": "ORD001", "sku": "SKU001", "quantity": 30}"#,
            &mut state,
        );
        assert_eq!(
            outcome,
            DispatchOutcome::Success(json!({"order_id": "ORD001", "sku": "SKU001", "allocated": 30}))
        );
        assert_eq!(state.inventory.get("SKU001"), Some(&70));

        // 超量分配：报告不足且不做部分扣减
        let outcome = registry.dispatch(
            "allocate_inventory",
            r#"{"order_id": "ORD001", "sku": "SKU001", "quantity": 200}"#,
            &mut state,
        );
        match outcome {
            DispatchOutcome::Domain(message) => {
                assert!(message.contains("Insufficient inventory"), "{message}");
                assert!(message.contains("allocated 0"), "{message}");
            }
            other => panic!("expected domain error, got {other:?}"),
        }
        assert_eq!(state.inventory.get("SKU001"), Some(&70));
    }

    #[test]
    fn test_create_purchase_order_validations() {
        let registry = build_registry();
        let mut state = BusinessState::default();

        let outcome = registry.dispatch(
            "create_purchase_order",
            r#"{"supplier_id": "SUP999", "sku": "SKU001", "quantity": 50}"#,
            &mut state,
        );
        assert_eq!(outcome, DispatchOutcome::Domain("Supplier SUP999 not found".to_string()));

        let outcome = registry.dispatch(
            "create_purchase_order",
            r#"{"supplier_id": "SUP001", "sku": "SKU003", "quantity": 50}"#,
            &mut state,
        );
        assert_eq!(
            outcome,
            DispatchOutcome::Domain("SKU SKU003 not available from supplier SUP001".to_string())
        );

        let outcome = registry.dispatch(
            "create_purchase_order",
            r#"{"supplier_id": "SUP001", "sku": "SKU001", "quantity": 10}"#,
            &mut state,
        );
        assert_eq!(outcome, DispatchOutcome::Domain("Quantity below minimum order of 50".to_string()));
        assert!(state.purchase_orders.is_empty());

        let outcome = registry.dispatch(
            "create_purchase_order",
            r#"{"supplier_id": "SUP001", "sku": "SKU001", "quantity": 60}"#,
            &mut state,
        );
        assert_eq!(
            outcome,
            DispatchOutcome::Success(json!({"po_number": "PO_SUP001_SKU001", "expected_delivery": 5}))
        );
        assert_eq!(state.purchase_orders["PO_SUP001_SKU001"].quantity, 60);
    }

    #[test]
    fn test_schedule_processing_consumes_capacity() {
        let registry = build_registry();
        let mut state = BusinessState::default();
        state.warehouse.processing = 1;

        let outcome = registry.dispatch(
            "schedule_processing",
            r#"{"order_id": "ORD001", "priority": "Express"}"#,
            &mut state,
        );
        assert!(outcome.is_success());
        assert_eq!(state.warehouse.processing, 0);
        assert_eq!(state.scheduled["ORD001"].priority, "Express");

        let outcome = registry.dispatch(
            "schedule_processing",
            r#"{"order_id": "ORD002", "priority": "Standard"}"#,
            &mut state,
        );
        assert_eq!(outcome, DispatchOutcome::Domain("No processing capacity available".to_string()));
        assert!(!state.scheduled.contains_key("ORD002"));
    }

    #[test]
    fn test_notify_customer_records_notification() {
        let registry = build_registry();
        let mut state = BusinessState::default();
        let outcome = registry.dispatch(
            "notify_customer",
            r#"{"customer_id": "CUST001", "order_id": "ORD001", "message": "Your order shipped."}"#,
            &mut state,
        );
        assert_eq!(
            outcome,
            DispatchOutcome::Success(
                json!({"customer_id": "CUST001", "order_id": "ORD001", "notification_sent": true})
            )
        );
        assert_eq!(state.notifications["ORD001"].message, "Your order shipped.");
    }

    #[test]
    fn test_missing_argument_is_domain_error() {
        let registry = build_registry();
        let mut state = BusinessState::default();
        let outcome = registry.dispatch("allocate_inventory", r#"{"order_id": "ORD001"}"#, &mut state);
        assert_eq!(
            outcome,
            DispatchOutcome::Domain("missing or invalid argument: sku".to_string())
        );
    }
}
