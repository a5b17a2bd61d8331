use std::{collections::BTreeMap, fmt, sync::Arc};

use super::{ConcatFactory, DenseFactory, DropoutFactory, InputFactory, LayerFactory};

/// Normalizes a kind name: lowercased and without `layer`, so `DenseLayer` resolves to `dense`.
pub fn normalize_kind(kind: &str) -> String {
    kind.to_lowercase().replace("layer", "")
}

/// Layer factories by kind name.
#[derive(Clone)]
pub struct LayerRegistry {
    factories: BTreeMap<String, Arc<dyn LayerFactory>>,
}

impl LayerRegistry {
    /// A registry without any factory.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registers a factory under its kind name, replacing any previous one.
    pub fn register(&mut self, factory: Arc<dyn LayerFactory>) -> &mut Self {
        self.factories
            .insert(normalize_kind(factory.kind()), factory);
        self
    }

    pub fn get(&self, kind: &str) -> Option<Arc<dyn LayerFactory>> {
        self.factories.get(&normalize_kind(kind)).cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl Default for LayerRegistry {
    /// A registry with the built in `input`, `dense`, `dropout` and `concat` kinds.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register(Arc::new(InputFactory))
            .register(Arc::new(DenseFactory))
            .register(Arc::new(DropoutFactory))
            .register(Arc::new(ConcatFactory));
        registry
    }
}

impl fmt::Debug for LayerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_layer_suffix() {
        let registry = LayerRegistry::default();

        assert_eq!(registry.get("DenseLayer").map(|f| f.kind().to_string()), Some("dense".into()));
        assert!(registry.get("InputLayer").is_some());
        assert!(registry.get("conv2d").is_none());
        assert_eq!(
            registry.kinds().collect::<Vec<_>>(),
            vec!["concat", "dense", "dropout", "input"]
        );
    }
}
