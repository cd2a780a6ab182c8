use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parameters of the main panel request, as produced by the parameter panel.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub ordering_base: String,
    #[serde(default)]
    pub ordering_method: String,
    #[serde(default)]
    pub attribution_method: String,
}

impl Query {
    pub fn range(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ..Default::default()
        }
    }

    pub fn sample_count(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn with_ordering(mut self, choice: OrderingChoice) -> Self {
        self.ordering_base = choice.base;
        self.ordering_method = choice.method;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingChoice {
    pub base: String,
    pub method: String,
}

/// Ordering bases (data sources used to permute samples) and their methods.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Orderings(pub BTreeMap<String, Vec<String>>);

impl Orderings {
    pub fn bases(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn methods(&self, base: &str) -> &[String] {
        self.0.get(base).map_or(&[], Vec::as_slice)
    }

    /// Selecting a base selects its first method.
    pub fn select_base(&self, base: &str) -> Option<OrderingChoice> {
        let method = self.methods(base).first()?;
        Some(OrderingChoice {
            base: base.to_string(),
            method: method.clone(),
        })
    }

    pub fn select_method(&self, base: &str, method: &str) -> Option<OrderingChoice> {
        self.methods(base)
            .iter()
            .any(|m| m == method)
            .then(|| OrderingChoice {
                base: base.to_string(),
                method: method.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orderings() -> Orderings {
        serde_json::from_str(
            r#"{"activations": ["euclidean", "cosine"], "raw": ["dtw"], "empty": []}"#,
        )
        .unwrap()
    }

    #[test]
    fn selecting_base_defaults_to_first_method() {
        let o = orderings();
        let choice = o.select_base("activations").unwrap();
        assert_eq!(choice.method, "euclidean");
        assert!(o.select_base("empty").is_none());
        assert!(o.select_base("missing").is_none());
    }

    #[test]
    fn select_method_checks_membership() {
        let o = orderings();
        assert!(o.select_method("activations", "cosine").is_some());
        assert!(o.select_method("raw", "cosine").is_none());
    }
}
