//! JSON specification for navigating JSON data structures

use regex::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;

/// Static regex for parsing bracket expressions (compiled once).
static BRACKET_REGEX: OnceLock<Regex> = OnceLock::new();

#[allow(clippy::expect_used)] // Safe: regex pattern is a compile-time constant
fn get_bracket_regex() -> &'static Regex {
    BRACKET_REGEX.get_or_init(|| Regex::new(r"\[.*?\]").expect("BRACKET_REGEX pattern is valid"))
}

/// Parses input of the form data\["key1"\]\[0\]\["key2"\] into a list of keys.
///
/// This function extracts the keys from a Python-style path expression and converts
/// numeric strings to integers for array indexing.
///
/// # Examples
///
/// ```ignore
/// let keys = parse_input("data[\"key1\"][0][\"key2\"]");
/// // Returns: vec!["key1", "0", "key2"]
/// ```
fn parse_input(text: &str) -> Vec<String> {
    let re = get_bracket_regex();
    let mut result = Vec::new();

    for cap in re.find_iter(text) {
        let matched = cap.as_str();
        // Strip brackets and quotes
        let stripped = &matched[1..matched.len() - 1];
        let unquoted = stripped.replace(['"', '\''], "");
        result.push(unquoted);
    }

    result
}

/// JSON specification for navigating and querying JSON data.
///
/// `JsonSpec` holds a JSON value and provides methods to navigate it using
/// Python-style path expressions (e.g., `data["key1"][0]["key2"]`).
///
/// # Examples
///
/// ```rust
/// use dashflow_json::JsonSpec;
/// use serde_json::json;
///
/// let data = json!({
///     "users": [
///         {"name": "Alice", "age": 30},
///         {"name": "Bob", "age": 25}
///     ]
/// });
///
/// let spec = JsonSpec::new(data);
///
/// // List keys at root level
/// let keys = spec.keys("data");
/// assert_eq!(keys, "['users']");
///
/// // Get a value
/// let value = spec.value("data[\"users\"][0][\"name\"]");
/// assert_eq!(value, "Alice");
/// ```
#[derive(Debug, Clone)]
pub struct JsonSpec {
    /// The JSON data structure
    dict: Value,
    /// Maximum length for value strings (longer values are truncated)
    max_value_length: usize,
}

impl JsonSpec {
    /// Creates a new `JsonSpec` from a JSON value.
    ///
    /// # Arguments
    ///
    /// * `dict` - The JSON value to wrap
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_json::JsonSpec;
    /// use serde_json::json;
    ///
    /// let spec = JsonSpec::new(json!({"key": "value"}));
    /// ```
    #[must_use]
    pub fn new(dict: Value) -> Self {
        Self {
            dict,
            max_value_length: 200,
        }
    }

    /// Creates a new `JsonSpec` with a custom max value length.
    ///
    /// # Arguments
    ///
    /// * `dict` - The JSON value to wrap
    /// * `max_value_length` - Maximum length for value strings
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_json::JsonSpec;
    /// use serde_json::json;
    ///
    /// let spec = JsonSpec::with_max_length(json!({"key": "value"}), 100);
    /// ```
    #[must_use]
    pub fn with_max_length(dict: Value, max_value_length: usize) -> Self {
        Self {
            dict,
            max_value_length,
        }
    }

    /// Creates a `JsonSpec` from a JSON file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file does not contain valid JSON
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dashflow_json::JsonSpec;
    /// use std::path::Path;
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let spec = JsonSpec::from_file(Path::new("data.json"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!("File not found: {}", path.display());
        }

        let contents = std::fs::read_to_string(path)?;
        let dict: Value = serde_json::from_str(&contents)?;

        Ok(Self::new(dict))
    }

    /// Returns the keys of the dict at the given path.
    ///
    /// The path should be a Python-style expression like `data["key1"][0]["key2"]`.
    /// If the value at the path is not a dict/object, returns an error message.
    ///
    /// # Arguments
    ///
    /// * `text` - Python representation of the path to the dict
    ///
    /// # Returns
    ///
    /// A string representation of the keys, or an error message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_json::JsonSpec;
    /// use serde_json::json;
    ///
    /// let spec = JsonSpec::new(json!({"a": {"b": "value"}}));
    /// let keys = spec.keys("data");
    /// assert_eq!(keys, "['a']");
    ///
    /// let nested_keys = spec.keys("data[\"a\"]");
    /// assert_eq!(nested_keys, "['b']");
    /// ```
    #[must_use]
    pub fn keys(&self, text: &str) -> String {
        match self.keys_impl(text) {
            Ok(result) => result,
            Err(e) => format!("{e:?}"),
        }
    }

    fn keys_impl(&self, text: &str) -> anyhow::Result<String> {
        let items = parse_input(text);
        let mut val = &self.dict;

        for item in items {
            if item.is_empty() {
                continue;
            }

            // Try to parse as array index
            if let Ok(idx) = item.parse::<usize>() {
                val = val
                    .get(idx)
                    .ok_or_else(|| anyhow::anyhow!("Index {idx} out of bounds"))?;
            } else {
                val = val
                    .get(&item)
                    .ok_or_else(|| anyhow::anyhow!("Key '{item}' not found"))?;
            }
        }

        // Check if value is an object
        if let Some(obj) = val.as_object() {
            let keys: Vec<String> = obj.keys().map(|k| format!("'{k}'")).collect();
            Ok(format!("[{}]", keys.join(", ")))
        } else {
            anyhow::bail!("Value at path `{text}` is not a dict, get the value directly.")
        }
    }

    /// Returns the value of the dict at the given path.
    ///
    /// The path should be a Python-style expression like `data["key1"][0]["key2"]`.
    /// Large dictionaries return a message to explore keys instead.
    /// Long values are truncated to `max_value_length`.
    ///
    /// # Arguments
    ///
    /// * `text` - Python representation of the path to the value
    ///
    /// # Returns
    ///
    /// A string representation of the value, or an error message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dashflow_json::JsonSpec;
    /// use serde_json::json;
    ///
    /// let spec = JsonSpec::new(json!({"a": {"b": "value"}}));
    /// let value = spec.value("data[\"a\"][\"b\"]");
    /// assert_eq!(value, "value");
    /// ```
    #[must_use]
    pub fn value(&self, text: &str) -> String {
        match self.value_impl(text) {
            Ok(result) => result,
            Err(e) => format!("{e:?}"),
        }
    }

    fn value_impl(&self, text: &str) -> anyhow::Result<String> {
        let items = parse_input(text);
        let mut val = &self.dict;

        for item in items {
            if item.is_empty() {
                continue;
            }

            // Try to parse as array index
            if let Ok(idx) = item.parse::<usize>() {
                val = val
                    .get(idx)
                    .ok_or_else(|| anyhow::anyhow!("Index {idx} out of bounds"))?;
            } else {
                val = val
                    .get(&item)
                    .ok_or_else(|| anyhow::anyhow!("Key '{item}' not found"))?;
            }
        }

        // Check if it's a large dictionary
        if val.is_object() {
            let str_val = val.to_string();
            if str_val.len() > self.max_value_length {
                return Ok(
                    "Value is a large dictionary, should explore its keys directly".to_string(),
                );
            }
        }

        // Convert to string and truncate if needed
        let str_val = match val {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        if str_val.len() > self.max_value_length {
            Ok(format!("{}...", &str_val[..self.max_value_length]))
        } else {
            Ok(str_val)
        }
    }
}
