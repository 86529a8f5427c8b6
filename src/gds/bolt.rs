//! JSON to Bolt parameter conversion.

use neo4rs::{BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType};
use serde_json::Value;

pub fn json_to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Number(num) => {
            if let Some(i) = num.as_i64() {
                BoltType::Integer(BoltInteger::new(i))
            } else if let Some(f) = num.as_f64() {
                BoltType::Float(BoltFloat::new(f))
            } else {
                log::warn!("无法转换数值参数 {}，按 null 处理", num);
                BoltType::Null(BoltNull)
            }
        }
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::Array(items) => {
            let list: BoltList = items.iter().map(json_to_bolt).collect::<Vec<BoltType>>().into();
            BoltType::List(list)
        }
        Value::Object(obj) => {
            let mut bolt_map = BoltMap::new();
            for (k, v) in obj {
                bolt_map.put(BoltString::new(k), json_to_bolt(v));
            }
            BoltType::Map(bolt_map)
        }
    }
}
