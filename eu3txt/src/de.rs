use serde::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, forward_to_deserialize_any};

use crate::{EU3TxtAstItem, EU3TxtParseNode};
use std::fmt;

pub struct Deserializer<'de> {
    input: &'de EU3TxtParseNode,
    child_iter: std::slice::Iter<'de, EU3TxtParseNode>,
}

impl<'de> Deserializer<'de> {
    pub fn from_node(input: &'de EU3TxtParseNode) -> Self {
        Deserializer {
            input,
            child_iter: input.children.iter(),
        }
    }
}

/// Deserializes `T` from a parse tree node.
pub fn from_node<'a, T>(node: &'a EU3TxtParseNode) -> Result<T, Error>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_node(node);
    T::deserialize(&mut deserializer)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(String);
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for Error {}
impl de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error(msg.to_string())
    }
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => visitor.visit_str(s),
            EU3TxtAstItem::IntValue(i) => visitor.visit_i32(*i),
            EU3TxtAstItem::FloatValue(f) => visitor.visit_f64(*f),
            EU3TxtAstItem::AssignmentList => {
                // AST doesn't differentiate object vs array: a block whose first
                // child is an assignment is treated as a map.
                if self
                    .input
                    .children
                    .first()
                    .is_some_and(|first| matches!(first.entry, EU3TxtAstItem::Assignment))
                {
                    return self.deserialize_map(visitor);
                }
                self.deserialize_seq(visitor)
            }
            EU3TxtAstItem::Assignment => Err(Error(
                "Unexpected Assignment in deserialize_any".to_string(),
            )),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => match s.as_str() {
                "yes" => visitor.visit_bool(true),
                "no" => visitor.visit_bool(false),
                _ => Err(Error(format!("Invalid bool: {}", s))),
            },
            _ => Err(Error("Not a bool".to_string())),
        }
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            EU3TxtAstItem::IntValue(i) => visitor.visit_i32(*i),
            _ => Err(Error("Not an i32".to_string())),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            EU3TxtAstItem::FloatValue(f) => visitor.visit_f64(*f),
            EU3TxtAstItem::IntValue(i) => visitor.visit_f64(f64::from(*i)),
            _ => Err(Error("Not a float".to_string())),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match &self.input.entry {
            EU3TxtAstItem::Identifier(s) | EU3TxtAstItem::StringValue(s) => visitor.visit_str(s),
            // Numeric keys (province ids) still deserialize as map keys.
            EU3TxtAstItem::IntValue(i) => visitor.visit_string(i.to_string()),
            EU3TxtAstItem::FloatValue(f) => visitor.visit_string(f.to_string()),
            _ => Err(Error("Not a string".to_string())),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(CommaSeparated::new(&mut self.child_iter))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(CommaSeparated::new(&mut self.child_iter))
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Presence is decided by MapAccess; if we are here, we have a value.
        visitor.visit_some(self)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        // Save blocks mix keyed and bare items freely; skip without looking.
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        i8 i16 i64 u8 u16 u32 u64 char bytes byte_buf unit unit_struct newtype_struct tuple
        tuple_struct enum
    }
}

// Iterator for Seq and Map Access
struct CommaSeparated<'a, 'de: 'a> {
    iter: &'a mut std::slice::Iter<'de, EU3TxtParseNode>,
    value: Option<&'de EU3TxtParseNode>,
}

impl<'a, 'de> CommaSeparated<'a, 'de> {
    fn new(iter: &'a mut std::slice::Iter<'de, EU3TxtParseNode>) -> Self {
        CommaSeparated { iter, value: None }
    }
}

impl<'de> SeqAccess<'de> for CommaSeparated<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(node) => {
                let mut de = Deserializer::from_node(node);
                seed.deserialize(&mut de).map(Some)
            }
            None => Ok(None),
        }
    }
}

impl<'de> MapAccess<'de> for CommaSeparated<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        // Loose values inside a keyed block carry no key; they are skipped.
        for node in self.iter.by_ref() {
            if let EU3TxtAstItem::Assignment = node.entry {
                let key_node = node
                    .children
                    .first()
                    .ok_or(Error("Missing Key".to_string()))?;
                let val_node = node
                    .children
                    .get(1)
                    .ok_or(Error("Missing Val".to_string()))?;
                self.value = Some(val_node);

                let mut de = Deserializer::from_node(key_node);
                return seed.deserialize(&mut de).map(Some);
            }
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let val_node = self.value.take().ok_or(Error(
            "MapAccess::next_value called before next_key".to_string(),
        ))?;
        let mut de = Deserializer::from_node(val_node);
        seed.deserialize(&mut de)
    }
}
