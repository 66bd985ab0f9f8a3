//! JSON toolkit for bundling JSON tools

use crate::spec::JsonSpec;
use crate::tools::{JsonGetValueTool, JsonListKeysTool};
use dashflow::core::tools::{BaseToolkit, Tool};
use std::sync::Arc;

/// Toolkit for interacting with JSON data structures.
///
/// `JsonToolkit` bundles JSON navigation tools that allow agents to explore
/// and query JSON documents by listing keys and retrieving values.
///
/// # Tools Included
///
/// 1. **`JsonListKeysTool`** - Lists keys at a given path
/// 2. **`JsonGetValueTool`** - Retrieves values at a given path
///
/// # Examples
///
/// ```rust
/// use dashflow_json::{JsonSpec, JsonToolkit};
/// use dashflow::core::tools::BaseToolkit;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// let data = json!({
///     "users": [
///         {"name": "Alice", "age": 30},
///         {"name": "Bob", "age": 25}
///     ]
/// });
///
/// let spec = JsonSpec::new(data);
/// let toolkit = JsonToolkit::new(spec);
///
/// // Get tools for use with an agent
/// let tools = toolkit.get_tools();
/// assert_eq!(tools.len(), 2);
/// # }
/// ```
///
/// # Integration with Agents
///
/// ```rust
/// use dashflow_json::{JsonSpec, JsonToolkit};
/// use dashflow::core::tools::BaseToolkit;
/// use serde_json::json;
///
/// # #[tokio::main]
/// # async fn main() {
/// // Load JSON data
/// let data = json!({
///     "products": [
///         {"id": 1, "name": "Widget", "price": 19.99},
///         {"id": 2, "name": "Gadget", "price": 29.99}
///     ]
/// });
///
/// // Create toolkit
/// let spec = JsonSpec::new(data);
/// let toolkit = JsonToolkit::new(spec);
///
/// // Use with agent (pseudo-code)
/// // let agent = AgentExecutor::new(llm, toolkit.get_tools());
/// // let result = agent.run("What's the price of the Widget?").await;
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonToolkit {
    spec: JsonSpec,
}

impl JsonToolkit {
    /// Creates a new `JsonToolkit` with the given JSON spec.
    ///
    /// # Arguments
    ///
    /// * `spec` - The JSON specification to query
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_json::{JsonSpec, JsonToolkit};
    /// use serde_json::json;
    ///
    /// let spec = JsonSpec::new(json!({"key": "value"}));
    /// let toolkit = JsonToolkit::new(spec);
    /// ```
    #[must_use]
    pub fn new(spec: JsonSpec) -> Self {
        Self { spec }
    }
}

impl BaseToolkit for JsonToolkit {
    fn get_tools(&self) -> Vec<Arc<dyn Tool>> {
        vec![
            Arc::new(JsonListKeysTool::new(self.spec.clone())),
            Arc::new(JsonGetValueTool::new(self.spec.clone())),
        ]
    }
}
