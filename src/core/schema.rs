/// Tool Parameter Schemas
///
/// A `ParameterSchema` declares each parameter a tool accepts: its type,
/// optional numeric bounds or enum domain, optional default, and a
/// description. The same declaration drives both the JSON Schema published
/// by tools/list and the validation performed before a handler runs.

use serde_json::{Map, Value, json};

use crate::core::error::ValidationError;

/// Validated call arguments: declared parameters only, defaults filled in.
pub type Arguments = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum ParamKind {
    String,
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Enum(&'static [&'static str]),
}

impl ParamKind {
    fn expected(&self) -> &'static str {
        match self {
            ParamKind::String => "a string",
            ParamKind::Integer { .. } => "an integer",
            ParamKind::Boolean => "a boolean",
            ParamKind::Enum(_) => "a string",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    pub default: Option<Value>,
    pub required: bool,
}

impl Param {
    fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
            required: true,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer { min: None, max: None }, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Boolean, description)
    }

    pub fn one_of(
        name: &'static str,
        values: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(name, ParamKind::Enum(values), description)
    }

    /// Inclusive bounds. Only meaningful for integer parameters.
    pub fn range(mut self, lo: i64, hi: i64) -> Self {
        if let ParamKind::Integer { min, max } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    /// A parameter with a default is never required.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self.required = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn to_json_schema(&self) -> Value {
        let mut schema = Map::new();
        match &self.kind {
            ParamKind::String => {
                schema.insert("type".into(), json!("string"));
            }
            ParamKind::Integer { min, max } => {
                schema.insert("type".into(), json!("integer"));
                if let Some(min) = min {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = max {
                    schema.insert("maximum".into(), json!(max));
                }
            }
            ParamKind::Boolean => {
                schema.insert("type".into(), json!("boolean"));
            }
            ParamKind::Enum(values) => {
                schema.insert("type".into(), json!("string"));
                schema.insert("enum".into(), json!(values));
            }
        }
        if let Some(default) = &self.default {
            schema.insert("default".into(), default.clone());
        }
        schema.insert("description".into(), json!(self.description));
        Value::Object(schema)
    }

    fn check(&self, value: &Value) -> Result<Value, ValidationError> {
        let wrong_type = || ValidationError::WrongType {
            name: self.name.to_string(),
            expected: self.kind.expected(),
        };

        match &self.kind {
            ParamKind::String => value.as_str().map(|_| value.clone()).ok_or_else(wrong_type),
            ParamKind::Boolean => value.as_bool().map(Value::Bool).ok_or_else(wrong_type),
            ParamKind::Integer { min, max } => {
                let n = as_integer(value).ok_or_else(wrong_type)?;
                let lo = min.unwrap_or(i64::MIN);
                let hi = max.unwrap_or(i64::MAX);
                if n < lo || n > hi {
                    return Err(ValidationError::OutOfRange {
                        name: self.name.to_string(),
                        min: lo,
                        max: hi,
                        value: n,
                    });
                }
                Ok(Value::from(n))
            }
            ParamKind::Enum(values) => {
                let s = value.as_str().ok_or_else(wrong_type)?;
                if values.contains(&s) {
                    Ok(value.clone())
                } else {
                    Err(ValidationError::NotInEnum {
                        name: self.name.to_string(),
                        allowed: values.join(", "),
                        value: s.to_string(),
                    })
                }
            }
        }
    }
}

// Accepts 5 and 5.0, rejects 5.5.
fn as_integer(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

#[derive(Debug, Clone, Default)]
pub struct ParameterSchema {
    params: Vec<Param>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// JSON Schema object published in the tool's `inputSchema`.
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.to_json_schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }

    /// Validate raw call arguments.
    ///
    /// `null` (or an absent arguments field) is treated as an empty object.
    /// A parameter explicitly set to `null` counts as omitted. Keys that no
    /// parameter declares are dropped.
    pub fn validate(&self, args: Value) -> Result<Arguments, ValidationError> {
        let mut raw = match args {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            _ => return Err(ValidationError::NotAnObject),
        };

        let mut validated = Arguments::new();
        for param in &self.params {
            match raw.remove(param.name) {
                Some(Value::Null) | None => {
                    if let Some(default) = &param.default {
                        validated.insert(param.name.to_string(), default.clone());
                    } else if param.required {
                        return Err(ValidationError::Missing(param.name.to_string()));
                    }
                }
                Some(value) => {
                    validated.insert(param.name.to_string(), param.check(&value)?);
                }
            }
        }
        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_schema() -> ParameterSchema {
        ParameterSchema::new()
            .param(Param::integer("limit", "Max results").range(1, 100).default(10))
            .param(Param::string("filter", "Filter text").optional())
            .param(Param::boolean("verbose", "Verbose output").default(false))
            .param(Param::one_of("mode", &["json", "compact-json"], "Mode").default("json"))
    }

    #[test]
    fn test_defaults_applied() {
        let args = lookup_schema().validate(json!({})).unwrap();
        assert_eq!(args["limit"], json!(10));
        assert_eq!(args["verbose"], json!(false));
        assert_eq!(args["mode"], json!("json"));
        assert!(!args.contains_key("filter"));
    }

    #[test]
    fn test_null_arguments_treated_as_empty() {
        let args = lookup_schema().validate(Value::Null).unwrap();
        assert_eq!(args["limit"], json!(10));
    }

    #[test]
    fn test_limit_bounds() {
        let schema = lookup_schema();
        assert!(schema.validate(json!({ "limit": 1 })).is_ok());
        assert!(schema.validate(json!({ "limit": 100 })).is_ok());

        let err = schema.validate(json!({ "limit": -1 })).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfRange {
                name: "limit".to_string(),
                min: 1,
                max: 100,
                value: -1
            }
        );
        assert!(schema.validate(json!({ "limit": 101 })).is_err());
        assert!(schema.validate(json!({ "limit": 0 })).is_err());
    }

    #[test]
    fn test_integer_accepts_whole_floats_only() {
        let schema = lookup_schema();
        assert_eq!(schema.validate(json!({ "limit": 5.0 })).unwrap()["limit"], json!(5));
        assert!(matches!(
            schema.validate(json!({ "limit": 5.5 })),
            Err(ValidationError::WrongType { .. })
        ));
        assert!(matches!(
            schema.validate(json!({ "limit": "5" })),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn test_enum_rejects_unknown_value() {
        let err = lookup_schema().validate(json!({ "mode": "yaml" })).unwrap_err();
        assert!(err.to_string().contains("json, compact-json"));
    }

    #[test]
    fn test_wrong_type_and_non_object() {
        let schema = lookup_schema();
        assert!(schema.validate(json!({ "verbose": "yes" })).is_err());
        assert!(schema.validate(json!({ "filter": 3 })).is_err());
        assert_eq!(schema.validate(json!([1, 2])).unwrap_err(), ValidationError::NotAnObject);
    }

    #[test]
    fn test_missing_required() {
        let schema = ParameterSchema::new().param(Param::string("message", "Message"));
        assert_eq!(
            schema.validate(json!({})).unwrap_err(),
            ValidationError::Missing("message".to_string())
        );
    }

    #[test]
    fn test_undeclared_keys_dropped() {
        let args = lookup_schema().validate(json!({ "extra": 1, "limit": 3 })).unwrap();
        assert!(!args.contains_key("extra"));
        assert_eq!(args["limit"], json!(3));
    }

    #[test]
    fn test_json_schema_shape() {
        let schema = lookup_schema().to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["properties"]["limit"]["minimum"], 1);
        assert_eq!(schema["properties"]["limit"]["maximum"], 100);
        assert_eq!(schema["properties"]["limit"]["default"], 10);
        assert_eq!(schema["properties"]["mode"]["enum"], json!(["json", "compact-json"]));
        assert_eq!(schema["required"], json!([]));
    }
}
