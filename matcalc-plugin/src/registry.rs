//! Operation Registry

use crate::{OperationPlugin, OperationMeta};
use matcalc_core::{Value, CalcError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Central operation registry
pub struct OperationRegistry {
    operations: HashMap<String, Arc<dyn OperationPlugin>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self {
            operations: HashMap::new(),
        }
    }

    pub fn with_operation<O: OperationPlugin + 'static>(mut self, op: O) -> Self {
        let name = op.meta().name.to_lowercase();
        self.operations.insert(name, Arc::new(op));
        self
    }

    pub fn get_operation(&self, name: &str) -> Option<&dyn OperationPlugin> {
        self.operations.get(&name.to_lowercase()).map(|o| o.as_ref())
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn call_operation(&self, name: &str, args: &[Value]) -> Value {
        match self.get_operation(name) {
            Some(op) => op.call(args),
            None => Value::Error(self.unknown_operation(name)),
        }
    }

    /// Error for an unregistered name, with similar names as suggestion
    pub fn unknown_operation(&self, name: &str) -> CalcError {
        let similar = self.find_similar_operations(name);
        let mut err = CalcError::unknown_operation(name);
        if !similar.is_empty() {
            let suggestions: Vec<&str> = similar.iter().take(5).map(|s| s.as_str()).collect();
            err = err.with_suggestion(format!(
                "Similar: {}. Use list_operations for the full list.",
                suggestions.join(", ")
            ));
        }
        err
    }

    /// Find operation names similar to the given name (for error suggestions)
    fn find_similar_operations(&self, name: &str) -> Vec<String> {
        let name_lower = name.to_lowercase();
        let mut matches: Vec<(String, usize)> = self.operations.keys()
            .filter_map(|op_name| {
                let score = Self::similarity_score(&name_lower, op_name);
                if score > 0 {
                    Some((op_name.clone(), score))
                } else {
                    None
                }
            })
            .collect();

        // Higher score first, ties by name so output is stable
        matches.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        matches.into_iter().map(|(name, _)| name).collect()
    }

    /// Calculate similarity score between two strings
    fn similarity_score(query: &str, candidate: &str) -> usize {
        if query.is_empty() {
            return 0;
        }

        let mut score = 0;

        if candidate.starts_with(query) {
            score += 100;
        } else if candidate.contains(query) {
            score += 50;
        } else if query.contains(candidate) {
            score += 30;
        }

        let query_chars: HashSet<char> = query.chars().collect();
        let candidate_chars: HashSet<char> = candidate.chars().collect();
        let common = query_chars.intersection(&candidate_chars).count();

        // Mostly-disjoint names are noise
        if score == 0 && common * 2 < query_chars.len() {
            return 0;
        }
        score += common * 2;

        let len_diff = query.len().abs_diff(candidate.len());
        if len_diff < 5 {
            score += 5 - len_diff;
        }

        score
    }

    /// Metadata for one operation
    pub fn help(&self, name: &str) -> Result<OperationMeta, CalcError> {
        self.get_operation(name)
            .map(|op| op.meta())
            .ok_or_else(|| self.unknown_operation(name))
    }

    /// Metadata for all operations, optionally filtered by category, sorted by name
    pub fn list_operations(&self, category: Option<&str>) -> Vec<OperationMeta> {
        let mut ops: Vec<OperationMeta> = self.operations.values()
            .map(|op| op.meta())
            .filter(|meta| category.map_or(true, |c| meta.category == c))
            .collect();
        ops.sort_by_key(|meta| meta.name);
        ops
    }

    /// Distinct categories, sorted
    pub fn categories(&self) -> Vec<&'static str> {
        let mut cats: Vec<&'static str> = self.operations.values()
            .map(|op| op.meta().category)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        cats.sort_unstable();
        cats
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
