//! Format-neutral literal tree.
//!
//! Every source format (script, JSON, YAML) is read into a [`Literal`] before
//! validation. Objects are kept as ordered entry lists so that duplicate keys
//! survive parsing and can be reported by the validator instead of being
//! silently collapsed by a map type.

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;

/// A static value read from a configuration source.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Literal>),
    /// Entries in source order, duplicates preserved.
    Object(Vec<(String, Literal)>),
    /// A free identifier or member path (`colors.blue`) the reader could not resolve.
    Ident(String),
    /// A call expression such as `require('x')` or `plugin({ ... })`.
    Call {
        callee: Box<Literal>,
        args: Vec<Literal>,
    },
}

impl Literal {
    /// Short type name used in validation messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Bool(_) => "a boolean",
            Literal::Number(_) => "a number",
            Literal::String(_) => "a string",
            Literal::Array(_) => "an array",
            Literal::Object(_) => "an object",
            Literal::Ident(_) => "an identifier",
            Literal::Call { .. } => "a call expression",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, Literal)]> {
        match self {
            Literal::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// First entry with the given key, if this is an object.
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.as_object()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Module specifier when this is `require('spec')`.
    pub fn as_require(&self) -> Option<&str> {
        match self {
            Literal::Call { callee, args } => match (callee.as_ref(), args.as_slice()) {
                (Literal::Ident(name), [Literal::String(spec)]) if name == "require" => {
                    Some(spec)
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Convert to JSON for opaque passthrough.
    ///
    /// Returns `None` when the tree contains identifiers or calls, which have
    /// no static value. Duplicate object keys keep the last entry.
    pub fn to_json(&self) -> Option<Value> {
        Some(match self {
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => number_to_json(*n)?,
            Literal::String(s) => Value::String(s.clone()),
            Literal::Array(items) => {
                Value::Array(items.iter().map(Literal::to_json).collect::<Option<_>>()?)
            }
            Literal::Object(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key.clone(), value.to_json()?);
                }
                Value::Object(map)
            }
            Literal::Ident(_) | Literal::Call { .. } => return None,
        })
    }
}

fn number_to_json(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
        Some(Value::from(n as i64))
    } else {
        serde_json::Number::from_f64(n).map(Value::Number)
    }
}

/// Render a scalar map key as a string.
///
/// YAML allows `500: '#fff'`; such keys are read as numbers and turned into
/// their textual form so they behave like the quoted equivalent.
fn key_to_string(key: Literal) -> Option<String> {
    match key {
        Literal::String(s) => Some(s),
        Literal::Number(n) => Some(match number_to_json(n)? {
            Value::Number(num) => num.to_string(),
            _ => return None,
        }),
        Literal::Bool(b) => Some(b.to_string()),
        Literal::Null => Some("null".to_string()),
        _ => None,
    }
}

impl<'de> Deserialize<'de> for Literal {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LiteralVisitor)
    }
}

struct LiteralVisitor;

impl<'de> Visitor<'de> for LiteralVisitor {
    type Value = Literal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a static configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Literal, E> {
        Ok(Literal::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Literal, E> {
        Ok(Literal::Number(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Literal, E> {
        Ok(Literal::Number(v as f64))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Literal, E> {
        Ok(Literal::Number(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Literal, E> {
        Ok(Literal::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Literal, E> {
        Ok(Literal::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Literal, E> {
        Ok(Literal::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Literal, E> {
        Ok(Literal::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Literal, D::Error>
    where
        D: Deserializer<'de>,
    {
        Literal::deserialize(deserializer)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Literal, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Literal::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Literal, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some(key) = map.next_key::<Literal>()? {
            let kind = key.kind();
            let key = key_to_string(key)
                .ok_or_else(|| de::Error::custom(format!("map keys must be scalars, found {}", kind)))?;
            let value = map.next_value()?;
            entries.push((key, value));
        }
        Ok(Literal::Object(entries))
    }
}
