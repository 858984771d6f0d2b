use crate::adapters::{BanditAdapter, EslintAdapter, MlReviewAdapter, PylintAdapter};
use crate::core::{Analyzer, Language};
use crate::inference::InferenceProvider;
use std::collections::HashMap;
use std::sync::Arc;

pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn Analyzer>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// The production lineup: pylint + bandit for Python, ESLint for
    /// JavaScript, and the ML reviewer for both.
    pub fn with_defaults(provider: Arc<dyn InferenceProvider>) -> Self {
        let mut registry = Self::new();
        registry.register(PylintAdapter);
        registry.register(BanditAdapter);
        registry.register(EslintAdapter);
        registry.register(MlReviewAdapter::new(provider));
        registry
    }

    pub fn register<A: Analyzer + 'static>(&mut self, adapter: A) {
        let id = adapter.id().to_string();
        self.adapters.insert(id, Arc::new(adapter));
    }

    pub fn register_shared(&mut self, adapter: Arc<dyn Analyzer>) {
        let id = adapter.id().to_string();
        self.adapters.insert(id, adapter);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Analyzer>> {
        self.adapters.get(id).cloned()
    }

    pub fn all(&self) -> Vec<Arc<dyn Analyzer>> {
        self.adapters.values().cloned().collect()
    }

    /// Adapters dispatched for a job in the given language. Sorted by id so
    /// dispatch order is deterministic.
    pub fn for_language(&self, language: Language) -> Vec<Arc<dyn Analyzer>> {
        let mut selected: Vec<_> = self
            .adapters
            .values()
            .filter(|adapter| adapter.supports(language))
            .cloned()
            .collect();
        selected.sort_by_key(|adapter| adapter.id());
        selected
    }

    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.adapters.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
