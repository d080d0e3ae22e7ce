use serde_json::Value;

/// Simple type system for the JSON documents the model is asked to produce.
#[derive(Debug, Clone)]
pub enum TypeDef {
    Text,
    List(Box<TypeDef>),
    Object(Vec<FieldDef>),
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: TypeDef,
}

impl FieldDef {
    pub fn new(name: &'static str, ty: TypeDef) -> Self {
        Self { name, ty }
    }
}

/// Single validation error, with a JSON path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingField { path: String },
    TypeMismatch { path: String, expected: &'static str, found: &'static str },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MissingField { path } => {
                write!(f, "Missing required field at path {path}")
            }
            ValidationError::TypeMismatch { path, expected, found } => {
                write!(f, "Type mismatch at {path}: expected {expected}, found {found}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a serde_json::Value against a TypeDef.
///
/// Returns Ok(()) if everything matches, or Err(vec![]) with every error found.
/// Validation does not stop at the first problem.
pub fn validate(ty: &TypeDef, value: &Value) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    validate_inner(ty, value, "$", &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_inner(ty: &TypeDef, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    use TypeDef::*;

    let expected = match ty {
        Text if value.is_string() => return,
        Text => "string",
        List(inner) => {
            let Value::Array(items) = value else {
                errors.push(mismatch(path, "array", value));
                return;
            };
            for (idx, item) in items.iter().enumerate() {
                validate_inner(inner, item, &format!("{path}[{idx}]"), errors);
            }
            return;
        }
        Object(fields) => {
            let Some(obj) = value.as_object() else {
                errors.push(mismatch(path, "object", value));
                return;
            };
            for field in fields {
                let field_path = format!("{path}.{}", field.name);
                match obj.get(field.name) {
                    None => errors.push(ValidationError::MissingField { path: field_path }),
                    Some(v) => validate_inner(&field.ty, v, &field_path, errors),
                }
            }
            // Extra fields are ignored.
            return;
        }
    };

    errors.push(mismatch(path, expected, value));
}

fn mismatch(path: &str, expected: &'static str, value: &Value) -> ValidationError {
    ValidationError::TypeMismatch {
        path: path.to_string(),
        expected,
        found: value_type_name(value),
    }
}

fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
