use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

/// Visual properties of one item (color, symbol, opacity...), written by the
/// rendering layer.
pub type ItemVisual = HashMap<String, Value>;

/// Layout of one item, usually a JSON object such as `{"x": .., "y": ..}`.
pub type ItemLayout = Value;

/// Opaque handle to whatever graphic element renders an item.
pub type GraphicElement = Arc<dyn Any + Send + Sync>;

/// Merges `update` into `target`. Objects merge key by key, anything else
/// replaces.
pub fn merge_layout(target: &mut ItemLayout, update: ItemLayout) {
    match (target, update) {
        (Value::Object(dst), Value::Object(src)) => {
            for (k, v) in src {
                dst.insert(k, v);
            }
        }
        (dst, src) => *dst = src,
    }
}
