use std::collections::HashMap;

use super::value::MISSING;

/// Category table of an ordinal dimension.
///
/// Codes are dense and assigned in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct OrdinalMeta {
    categories: Vec<String>,
    codes: HashMap<String, u32>,
    need_collect: bool,
}

impl OrdinalMeta {
    /// An empty table that interns every new category it meets.
    pub fn collecting() -> Self {
        Self {
            need_collect: true,
            ..Default::default()
        }
    }

    /// A closed table: unknown categories parse to `MISSING`.
    pub fn from_categories<I, S>(categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut meta = Self::default();
        for c in categories {
            meta.intern(c.into());
        }
        meta
    }

    fn intern(&mut self, name: String) -> u32 {
        if let Some(&code) = self.codes.get(&name) {
            return code;
        }
        let code = self.categories.len() as u32;
        self.codes.insert(name.clone(), code);
        self.categories.push(name);
        code
    }

    /// Returns the code for `name`, interning it if the table collects.
    pub fn parse_and_collect(&mut self, name: &str) -> f64 {
        if let Some(&code) = self.codes.get(name) {
            return code as f64;
        }
        if self.need_collect {
            self.intern(name.to_string()) as f64
        } else {
            MISSING
        }
    }

    pub fn code_of(&self, name: &str) -> Option<u32> {
        self.codes.get(name).copied()
    }

    pub fn category(&self, code: f64) -> Option<&str> {
        if code.is_nan() || code < 0.0 {
            return None;
        }
        self.categories.get(code as usize).map(String::as_str)
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
