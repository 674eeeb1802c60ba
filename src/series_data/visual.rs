//! Annotations written by the rendering layer. None of this feeds back into
//! values, extents or identity.

use serde_json::Value;

use super::SeriesData;
use crate::data_types::{merge_layout, GraphicElement, ItemLayout, ItemVisual};

impl SeriesData {
    pub fn set_visual(&mut self, key: impl Into<String>, value: Value) {
        self.visual.insert(key.into(), value);
    }

    pub fn get_visual(&self, key: &str) -> Option<&Value> {
        self.visual.get(key)
    }

    pub fn set_item_visual(&mut self, idx: usize, key: impl Into<String>, value: Value) {
        self.item_visuals
            .entry(idx)
            .or_default()
            .insert(key.into(), value);
    }

    /// Visual `key` of item `idx`, falling back to the store-wide visual.
    pub fn get_item_visual(&self, idx: usize, key: &str) -> Option<&Value> {
        self.item_visuals
            .get(&idx)
            .and_then(|visual| visual.get(key))
            .or_else(|| self.visual.get(key))
    }

    /// Only the visuals set on item `idx` itself.
    pub fn item_visual(&self, idx: usize) -> Option<&ItemVisual> {
        self.item_visuals.get(&idx)
    }

    pub fn clear_all_visual(&mut self) {
        self.visual.clear();
        self.item_visuals.clear();
    }

    /// Sets the layout of item `idx`; with `merge`, object keys are merged
    /// into the existing layout instead of replacing it.
    pub fn set_item_layout(&mut self, idx: usize, layout: ItemLayout, merge: bool) {
        match self.item_layouts.get_mut(&idx) {
            Some(existing) if merge => merge_layout(existing, layout),
            _ => {
                self.item_layouts.insert(idx, layout);
            }
        }
    }

    pub fn get_item_layout(&self, idx: usize) -> Option<&ItemLayout> {
        self.item_layouts.get(&idx)
    }

    pub fn clear_item_layouts(&mut self) {
        self.item_layouts.clear();
    }

    pub fn set_item_graphic_el(&mut self, idx: usize, el: Option<GraphicElement>) {
        match el {
            Some(el) => {
                self.graphic_els.insert(idx, el);
            }
            None => {
                self.graphic_els.remove(&idx);
            }
        }
    }

    pub fn get_item_graphic_el(&self, idx: usize) -> Option<&GraphicElement> {
        self.graphic_els.get(&idx)
    }

    /// Visits graphic elements in logical order.
    pub fn each_item_graphic_el<F>(&self, mut f: F)
    where
        F: FnMut(&GraphicElement, usize),
    {
        let mut indices: Vec<usize> = self.graphic_els.keys().copied().collect();
        indices.sort_unstable();
        for idx in indices {
            if let Some(el) = self.graphic_els.get(&idx) {
                f(el, idx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use crate::data_types::DimensionInfo;
    use crate::SeriesData;

    #[test]
    fn test_item_visual_falls_back_to_global() {
        let mut data = SeriesData::new(vec![DimensionInfo::number("x")]).unwrap();
        data.set_visual("color", json!("red"));
        data.set_item_visual(1, "color", json!("blue"));
        assert_eq!(data.get_item_visual(0, "color"), Some(&json!("red")));
        assert_eq!(data.get_item_visual(1, "color"), Some(&json!("blue")));
        assert!(data.item_visual(0).is_none());

        data.clear_all_visual();
        assert_eq!(data.get_item_visual(1, "color"), None);
    }

    #[test]
    fn test_layout_merge() {
        let mut data = SeriesData::new(vec![DimensionInfo::number("x")]).unwrap();
        data.set_item_layout(0, json!({"x": 1, "y": 2}), false);
        data.set_item_layout(0, json!({"y": 3}), true);
        assert_eq!(data.get_item_layout(0), Some(&json!({"x": 1, "y": 3})));
        data.set_item_layout(0, json!({"r": 5}), false);
        assert_eq!(data.get_item_layout(0), Some(&json!({"r": 5})));
    }

    #[test]
    fn test_graphic_elements_in_order() {
        let mut data = SeriesData::new(vec![DimensionInfo::number("x")]).unwrap();
        data.set_item_graphic_el(2, Some(Arc::new("b")));
        data.set_item_graphic_el(0, Some(Arc::new("a")));
        data.set_item_graphic_el(5, Some(Arc::new("c")));
        data.set_item_graphic_el(5, None);

        let mut seen = Vec::new();
        data.each_item_graphic_el(|el, idx| {
            seen.push((idx, *el.downcast_ref::<&str>().unwrap()));
        });
        assert_eq!(seen, vec![(0, "a"), (2, "b")]);
    }
}
