//! ordered stack of layers
//!
//! Layers are kept in registration order: index 0 has the lowest precedence, the layer
//! added last the highest. Anything that walks layers by precedence goes through
//! [Config::search_order], which is the reverse of [Config::index].
use crate::layer::Layer;
use crate::query::{QueryOptions, QueryResult};
use crate::value::Value;

#[derive(derive_new::new, Debug, Default)]
pub struct Config {
    #[new(default)]
    layers: Vec<Box<dyn Layer>>,
}

impl Config {
    /// Layers in registration order, the last one wins
    pub fn with_layers(layers: impl IntoIterator<Item = Box<dyn Layer>>) -> Self {
        Self {
            layers: layers.into_iter().collect(),
        }
    }

    /// Inserts `layer` at `position`, appending when `None` or past the end
    pub fn insert_layer<L: Layer + 'static>(&mut self, layer: L, position: Option<usize>) {
        self.insert_boxed_layer(Box::new(layer), position)
    }

    pub fn insert_boxed_layer(&mut self, layer: Box<dyn Layer>, position: Option<usize>) {
        let position = position
            .unwrap_or(self.layers.len())
            .min(self.layers.len());
        tracing::debug!(layer = layer.name(), position, "insert layer");
        self.layers.insert(position, layer);
    }

    pub fn remove_layer(&mut self, position: usize) -> Option<Box<dyn Layer>> {
        if position >= self.layers.len() {
            return None;
        }

        let layer = self.layers.remove(position);
        tracing::debug!(layer = layer.name(), position, "remove layer");
        Some(layer)
    }

    pub fn remove_layer_named(&mut self, name: &str) -> Option<Box<dyn Layer>> {
        let position = self.position(name)?;
        self.remove_layer(position)
    }

    /// Layer names in registration order
    pub fn index(&self) -> Vec<&str> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layers from highest to lowest precedence
    pub fn search_order(&self) -> impl Iterator<Item = &dyn Layer> {
        self.layers
            .iter()
            .rev()
            .map(|layer| &**layer as &dyn Layer)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.layers.iter().position(|layer| layer.name() == name)
    }

    pub fn layer(&self, name: &str) -> Option<&dyn Layer> {
        self.layers
            .iter()
            .find(|layer| layer.name() == name)
            .map(|layer| &**layer as &dyn Layer)
    }

    pub fn layer_mut(&mut self, name: &str) -> Option<&mut dyn Layer> {
        let position = self.position(name)?;
        let layer: &mut dyn Layer = &mut *self.layers[position];
        Some(layer)
    }

    /// Creates and executes a query, see [QueryResult]
    pub fn query(&self, query: &str, options: QueryOptions) -> QueryResult {
        let mut result = QueryResult::new(query, options);
        result.execute(self);
        result
    }

    /// The highest precedence value for `query`, if any
    pub fn get(&self, query: &str) -> Option<Value> {
        self.query(query, QueryOptions::new().return_first(true))
            .result()
            .ok()
    }

    pub fn get_or(&self, query: &str, default: impl Into<Value>) -> Value {
        self.get(query).unwrap_or_else(|| default.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::document;
    use crate::layer::MemoryLayer;
    use pretty_assertions::assert_eq;

    fn layer(name: &str) -> MemoryLayer {
        MemoryLayer::new(name, document!({"name": name}))
    }

    fn abc() -> Config {
        let mut config = Config::new();
        config.insert_layer(layer("a"), None);
        config.insert_layer(layer("b"), None);
        config.insert_layer(layer("c"), None);
        config
    }

    #[test]
    fn index_single_layer() {
        let mut config = Config::new();
        config.insert_layer(layer("root"), None);

        assert_eq!(config.index(), vec!["root"]);
    }

    #[test]
    fn index_is_registration_order() {
        assert_eq!(abc().index(), vec!["a", "b", "c"]);
    }

    #[test]
    fn search_order_is_reversed_index() {
        let config = abc();
        let mut reversed = config.index();
        reversed.reverse();

        assert_eq!(
            config
                .search_order()
                .map(|layer| layer.name())
                .collect::<Vec<_>>(),
            reversed
        );
    }

    #[test]
    fn insert_at_position() {
        let mut config = abc();
        config.insert_layer(layer("first"), Some(0));
        config.insert_layer(layer("middle"), Some(2));
        config.insert_layer(layer("last"), Some(99));

        assert_eq!(
            config.index(),
            vec!["first", "a", "middle", "b", "c", "last"]
        );
    }

    #[test]
    fn remove_layers() {
        let mut config = abc();

        assert_eq!(config.remove_layer(1).map(|l| l.name().to_string()), Some("b".into()));
        assert!(config.remove_layer(5).is_none());
        assert_eq!(
            config.remove_layer_named("c").map(|l| l.name().to_string()),
            Some("c".into())
        );
        assert!(config.remove_layer_named("c").is_none());
        assert_eq!(config.index(), vec!["a"]);
    }

    #[test]
    fn later_layers_win() {
        let mut config = abc();
        assert_eq!(config.get("name"), Some("c".into()));

        config.insert_layer(layer("low"), Some(0));
        assert_eq!(config.get("name"), Some("c".into()));

        config.remove_layer_named("c");
        assert_eq!(config.get("name"), Some("b".into()));
    }

    #[test]
    fn lookup_by_name() {
        let mut config = abc();

        assert_eq!(config.position("b"), Some(1));
        assert!(config.layer("missing").is_none());

        config
            .layer_mut("a")
            .unwrap()
            .set("extra", 1.into(), true)
            .unwrap();
        assert!(config.layer("a").unwrap().is_dirty());
        assert_eq!(config.get_or("extra", 0), Value::Integer(1));
        assert_eq!(config.get_or("missing", 0), Value::Integer(0));
    }

    #[test]
    fn with_layers() {
        let config = Config::with_layers([
            Box::new(layer("x")) as Box<dyn Layer>,
            Box::new(layer("y")),
        ]);

        assert_eq!(config.len(), 2);
        assert_eq!(config.get("name"), Some("y".into()));
    }

    #[test]
    fn empty_config_finds_nothing() {
        let config = Config::new();

        assert!(config.is_empty());
        assert!(!config.query("anything", QueryOptions::new()).is_success());
    }
}
