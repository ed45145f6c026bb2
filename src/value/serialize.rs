use std::{cell::RefCell, fmt};

use serde::{
    de::{MapAccess, SeqAccess, Visitor},
    ser::{Error, SerializeMap, SerializeSeq},
    Deserialize, Deserializer, Serialize, Serializer,
};

use super::{Object, Value};

const MAX_SAFE_INTEGER: f64 = 9007199254740991.0;

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let path = RefCell::new(Vec::new());
        Tracked { value: self, path: &path }.serialize(serializer)
    }
}

/// Serializes a value while tracking the objects on the current path, so cycles fail instead of recursing forever.
struct Tracked<'a> {
    value: &'a Value,
    path: &'a RefCell<Vec<usize>>,
}

impl Serialize for Tracked<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.value {
            Value::Undefined | Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::String(s) => serializer.serialize_str(s),
            Value::Symbol(_) => Err(S::Error::custom("cannot serialize a symbol")),
            Value::Function(_) => Err(S::Error::custom("cannot serialize a function")),
            Value::Node(_) => Err(S::Error::custom("cannot serialize a node")),
            Value::Object(o) => {
                let id = o.id();
                if self.path.borrow().contains(&id) {
                    return Err(S::Error::custom("cannot serialize a cyclic value"));
                }
                self.path.borrow_mut().push(id);
                let ret = self.serialize_object(o, serializer);
                self.path.borrow_mut().pop();
                ret
            }
        }
    }
}
impl Tracked<'_> {
    fn serialize_object<S>(&self, o: &Object, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let entries = o.entries();
        if o.is_array() {
            let mut seq = serializer.serialize_seq(Some(entries.len()))?;
            for (_, value) in &entries {
                seq.serialize_element(&Tracked {
                    value,
                    path: self.path,
                })?;
            }
            seq.end()
        } else {
            let mut map = serializer.serialize_map(Some(entries.len()))?;
            for (key, value) in &entries {
                map.serialize_entry(
                    &**key,
                    &Tracked {
                        value,
                        path: self.path,
                    },
                )?;
            }
            map.end()
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a JSON-like value")
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }
    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }
    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        Value::deserialize(deserializer)
    }
    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }
    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }
    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v as f64))
    }
    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v))
    }
    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::from(v))
    }
    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let array = Object::array(Vec::new());
        while let Some(item) = seq.next_element::<Value>()? {
            array.push(item);
        }
        Ok(Value::Object(array))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let object = Object::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            object.set(key, value);
        }
        Ok(Value::Object(object))
    }
}
