//! Generic recursive normalizer
//!
//! Reply records are adapted once, at the transport boundary, into [`RawValue`]:
//! a closed set of shapes (text, scalar, mapping, sequence, opaque object,
//! callable). [`normalize`] turns any such value into plain JSON.
//!
//! Object graphs handed to us may be deep or cyclic, so every descent spends
//! one unit of an explicit depth budget. When the budget runs out the subtree
//! is replaced by a `class:<TypeName>` sentinel.

use serde_json::{Map, Number, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Default depth budget. Deep enough for any real reply, shallow enough to
/// stay well inside a 2 MiB thread stack.
pub const DEFAULT_DEPTH_BUDGET: usize = 256;

/// Key an object's substructure is wrapped under
pub const AST_KEY: &str = "ast";
/// Key an iterable object's elements are wrapped under
pub const ITER_KEY: &str = "__iter__";

/// Boundary markers in gateway JSON
const TYPE_MARKER: &str = "@type";
const AST_MARKER: &str = "@ast";
const ITER_MARKER: &str = "@iter";
const CALLABLE_MARKER: &str = "@callable";

/// A reply value as seen by the normalizer
#[derive(Debug, Clone)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Key-ordered mapping
    Map(Vec<(String, RawValue)>),
    Seq(Vec<RawValue>),
    Object(Rc<RawObject>),
    /// Live method or function; never serialized
    Callable(String),
}

/// Opaque typed record with introspectable parts
#[derive(Debug, Default)]
pub struct RawObject {
    type_name: String,
    ast: RefCell<Option<RawValue>>,
    iter: RefCell<Option<Vec<RawValue>>>,
    attrs: RefCell<Vec<(String, RawValue)>>,
}

impl RawObject {
    pub fn new(type_name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            type_name: type_name.into(),
            ..Self::default()
        })
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Append an attribute. Attributes may point back at the object itself.
    pub fn set_attr(&self, name: impl Into<String>, value: RawValue) {
        self.attrs.borrow_mut().push((name.into(), value));
    }

    pub fn set_ast(&self, ast: RawValue) {
        *self.ast.borrow_mut() = Some(ast);
    }

    pub fn set_iter(&self, items: Vec<RawValue>) {
        *self.iter.borrow_mut() = Some(items);
    }

    /// Attribute by name, including private and callable ones
    pub fn attr(&self, name: &str) -> Option<RawValue> {
        self.attrs
            .borrow()
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }
}

impl RawValue {
    /// Adapt a gateway JSON value.
    ///
    /// Objects with an `@type` key become [`RawObject`]s (`@ast` and `@iter`
    /// expose their substructure), `{"@callable": name}` becomes a
    /// [`RawValue::Callable`], other objects become mappings.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => RawValue::Number(n),
            Value::String(s) => RawValue::Text(s),
            Value::Array(items) => RawValue::Seq(items.into_iter().map(Self::from_json).collect()),
            Value::Object(mut map) => {
                if let Some(name) = map.get(CALLABLE_MARKER).and_then(|v| v.as_str()) {
                    return RawValue::Callable(name.to_string());
                }
                let Some(type_name) = map.remove(TYPE_MARKER) else {
                    return RawValue::Map(
                        map.into_iter()
                            .map(|(k, v)| (k, Self::from_json(v)))
                            .collect(),
                    );
                };

                let type_name = match type_name {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                let object = RawObject::new(type_name);
                if let Some(ast) = map.remove(AST_MARKER) {
                    object.set_ast(Self::from_json(ast));
                }
                if let Some(items) = map.remove(ITER_MARKER) {
                    let items = match items {
                        Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
                        other => vec![Self::from_json(other)],
                    };
                    object.set_iter(items);
                }
                for (key, value) in map {
                    object.set_attr(key, Self::from_json(value));
                }
                RawValue::Object(object)
            }
        }
    }

    /// Runtime type name used in truncation sentinels
    pub fn type_name(&self) -> &str {
        match self {
            RawValue::Null => "none",
            RawValue::Bool(_) => "bool",
            RawValue::Number(_) => "number",
            RawValue::Text(_) => "str",
            RawValue::Map(_) => "dict",
            RawValue::Seq(_) => "list",
            RawValue::Object(obj) => obj.type_name(),
            RawValue::Callable(_) => "callable",
        }
    }
}

fn sentinel(value: &RawValue) -> Value {
    Value::String(format!("class:{}", value.type_name()))
}

fn is_public(name: &str) -> bool {
    !name.starts_with('_')
}

/// Normalize a value into plain JSON.
///
/// `budget` is the remaining depth; `class_key`, when given, tags every
/// attribute mapping with the object's type name under that key.
pub fn normalize(value: &RawValue, budget: usize, class_key: Option<&str>) -> Value {
    match value {
        RawValue::Text(s) => Value::String(s.clone()),
        RawValue::Map(entries) => {
            let Some(next) = budget.checked_sub(1) else {
                return sentinel(value);
            };
            Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), normalize(v, next, class_key)))
                    .collect(),
            )
        }
        RawValue::Seq(items) => {
            let Some(next) = budget.checked_sub(1) else {
                return sentinel(value);
            };
            Value::Array(items.iter().map(|v| normalize(v, next, class_key)).collect())
        }
        RawValue::Object(object) => {
            let Some(next) = budget.checked_sub(1) else {
                return sentinel(value);
            };
            normalize_object(object, next, class_key)
        }
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(*b),
        RawValue::Number(n) => Value::Number(n.clone()),
        RawValue::Callable(_) => Value::Null,
    }
}

fn normalize_object(object: &RawObject, next: usize, class_key: Option<&str>) -> Value {
    let mut data = Map::new();

    if let Some(ast) = object.ast.borrow().as_ref() {
        data.insert(AST_KEY.to_string(), normalize(ast, next, class_key));
        return Value::Object(data);
    }

    if let Some(items) = object.iter.borrow().as_ref() {
        let items = items.iter().map(|v| normalize(v, next, class_key)).collect();
        data.insert(ITER_KEY.to_string(), Value::Array(items));
        return Value::Object(data);
    }

    for (key, attr) in object.attrs.borrow().iter() {
        if !is_public(key) || matches!(attr, RawValue::Callable(_)) {
            continue;
        }
        data.insert(key.clone(), normalize(attr, next, class_key));
    }
    if let Some(class_key) = class_key {
        data.insert(
            class_key.to_string(),
            Value::String(object.type_name().to_string()),
        );
    }
    Value::Object(data)
}
