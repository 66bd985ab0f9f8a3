//! Calculator tool implementation.

use async_trait::async_trait;
use dashflow::core::tools::{Tool, ToolInput};
use dashflow::core::{Error, Result};

/// A tool for evaluating mathematical expressions.
///
/// The Calculator tool uses the `evalexpr` library to safely evaluate
/// mathematical expressions. It supports basic arithmetic operations
/// and operator precedence.
///
/// # Examples
///
/// ```rust
/// use dashflow_calculator::Calculator;
/// use dashflow::core::tools::Tool;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let calculator = Calculator::new();
///
/// // Simple arithmetic
/// let result = calculator._call_str("10 + 5 * 2".to_string()).await?;
/// assert_eq!(result, "20");
///
/// // With exponentiation
/// let result = calculator._call_str("2 ^ 3".to_string()).await?;
/// assert_eq!(result, "8");
///
/// // Complex expression with parentheses
/// let result = calculator._call_str("(10 + 5) * 2 - 3".to_string()).await?;
/// assert_eq!(result, "27");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    name: String,
    description: String,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Creates a new Calculator tool.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_calculator::Calculator;
    ///
    /// let calculator = Calculator::new();
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: "calculator".to_string(),
            description:
                "Useful for when you need to answer questions about math. \
                         Input should be a valid mathematical expression. \
                         Supports: +, -, *, /, %, ^ (exponentiation), and parentheses for grouping."
                    .to_string(),
        }
    }

    /// Creates a Calculator with a custom name.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_calculator::Calculator;
    ///
    /// let calculator = Calculator::with_name("math");
    /// ```
    pub fn with_name(name: impl Into<String>) -> Self {
        let mut calc = Self::new();
        calc.name = name.into();
        calc
    }

    /// Creates a Calculator with a custom description.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_calculator::Calculator;
    ///
    /// let calculator = Calculator::new()
    ///     .with_description("A simple math evaluator");
    /// ```
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Evaluates a mathematical expression and returns the result.
    ///
    /// # Arguments
    ///
    /// * `expression` - A valid mathematical expression as a string
    ///
    /// # Returns
    ///
    /// Returns the evaluation result as a string, or an error if the expression
    /// is invalid or cannot be evaluated.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_calculator::Calculator;
    ///
    /// let calculator = Calculator::new();
    ///
    /// let result = calculator.evaluate("2 + 2")?;
    /// assert_eq!(result, "4");
    ///
    /// let result = calculator.evaluate("2 ^ 4")?;
    /// assert_eq!(result, "16");
    ///
    /// let result = calculator.evaluate("(5 + 3) * 2")?;
    /// assert_eq!(result, "16");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn evaluate(&self, expression: &str) -> Result<String> {
        // Trim whitespace
        let expression = expression.trim();

        if expression.is_empty() {
            return Err(Error::InvalidInput(
                "Expression cannot be empty".to_string(),
            ));
        }

        // Evaluate the expression using evalexpr with builtin functions
        match evalexpr::eval_with_context(expression, &evalexpr::HashMapContext::new()) {
            Ok(value) => {
                // Convert the value to a string
                match value {
                    evalexpr::Value::Float(f) => {
                        // Format float: if it's a whole number, show without decimal
                        if f.fract() == 0.0 {
                            Ok(format!("{f:.0}"))
                        } else {
                            Ok(format!("{f}"))
                        }
                    }
                    evalexpr::Value::Int(i) => Ok(format!("{i}")),
                    evalexpr::Value::Boolean(b) => Ok(format!("{b}")),
                    evalexpr::Value::String(s) => Ok(s),
                    evalexpr::Value::Empty => Err(Error::other("Empty result")),
                    evalexpr::Value::Tuple(_) => Err(Error::other("Tuple results not supported")),
                }
            }
            Err(e) => Err(Error::InvalidInput(format!(
                "Failed to evaluate expression '{expression}': {e}"
            ))),
        }
    }
}

#[async_trait]
impl Tool for Calculator {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn args_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "A valid mathematical expression to evaluate"
                }
            },
            "required": ["expression"]
        })
    }

    async fn _call(&self, input: ToolInput) -> Result<String> {
        // Extract the expression from the input
        let expression = match input {
            ToolInput::String(s) => s,
            ToolInput::Structured(v) => {
                // Try to extract "expression" field from structured input
                v.get("expression")
                    .and_then(|e| e.as_str())
                    .unwrap_or("")
                    .to_string()
            }
        };

        self.evaluate(&expression)
    }
}
