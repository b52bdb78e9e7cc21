//! The item record schema that filter expressions evaluate against.
//!
//! The schema is a fixed external contract: the host supplies `Item` records,
//! this crate only reads them. Expression-language names are the PascalCase
//! serde names (`BaseName`, `MapTier`, ...), resolved through [`Field`] at
//! compile time.

use serde::Deserialize;
use std::fmt;

/// One item record as supplied by the host.
///
/// `map_tier` and `gem_level` only exist on the matching item variants;
/// referencing them in a rule evaluated against any other item is a runtime
/// evaluation fault, not a compile error.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub base_name: String,
    pub class_name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub item_level: i64,
    #[serde(default)]
    pub quality: i64,
    #[serde(default = "default_one")]
    pub width: i64,
    #[serde(default = "default_one")]
    pub height: i64,
    #[serde(default = "default_one")]
    pub stack_size: i64,
    #[serde(default)]
    pub socket_count: i64,
    #[serde(default)]
    pub is_identified: bool,
    #[serde(default)]
    pub is_corrupted: bool,
    #[serde(default)]
    pub map_tier: Option<i64>,
    #[serde(default)]
    pub gem_level: Option<i64>,
}

fn default_one() -> i64 {
    1
}

impl Default for Item {
    fn default() -> Self {
        Item {
            base_name: String::new(),
            class_name: String::new(),
            rarity: Rarity::Normal,
            item_level: 0,
            quality: 0,
            width: 1,
            height: 1,
            stack_size: 1,
            socket_count: 0,
            is_identified: false,
            is_corrupted: false,
            map_tier: None,
            gem_level: None,
        }
    }
}

/// Item rarity, ordered: `Normal < Magic < Rare < Unique`.
///
/// Rules reference rarities by bare name (`Rarity >= Rare`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
pub enum Rarity {
    Normal,
    Magic,
    Rare,
    Unique,
}

impl Rarity {
    pub(crate) fn from_name(name: &str) -> Option<Rarity> {
        match name {
            "Normal" => Some(Rarity::Normal),
            "Magic" => Some(Rarity::Magic),
            "Rare" => Some(Rarity::Rare),
            "Unique" => Some(Rarity::Unique),
            _ => None,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rarity::Normal => write!(f, "Normal"),
            Rarity::Magic => write!(f, "Magic"),
            Rarity::Rare => write!(f, "Rare"),
            Rarity::Unique => write!(f, "Unique"),
        }
    }
}

/// Type of a value in the expression language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKind {
    Bool,
    Int,
    Float,
    Str,
    Rarity,
}

impl ValueKind {
    pub(crate) fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Float)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Bool => write!(f, "boolean"),
            ValueKind::Int => write!(f, "integer"),
            ValueKind::Float => write!(f, "float"),
            ValueKind::Str => write!(f, "string"),
            ValueKind::Rarity => write!(f, "rarity"),
        }
    }
}

/// A runtime value produced while evaluating a predicate.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Rarity(Rarity),
}

/// A schema field, resolved from its expression-language name at compile
/// time. Carries the static type and the accessor used during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field {
    BaseName,
    ClassName,
    Rarity,
    ItemLevel,
    Quality,
    Width,
    Height,
    StackSize,
    SocketCount,
    IsIdentified,
    IsCorrupted,
    MapTier,
    GemLevel,
}

impl Field {
    pub(crate) fn resolve(name: &str) -> Option<Field> {
        let field = match name {
            "BaseName" => Field::BaseName,
            "ClassName" => Field::ClassName,
            "Rarity" => Field::Rarity,
            "ItemLevel" => Field::ItemLevel,
            "Quality" => Field::Quality,
            "Width" => Field::Width,
            "Height" => Field::Height,
            "StackSize" => Field::StackSize,
            "SocketCount" => Field::SocketCount,
            "IsIdentified" => Field::IsIdentified,
            "IsCorrupted" => Field::IsCorrupted,
            "MapTier" => Field::MapTier,
            "GemLevel" => Field::GemLevel,
            _ => return None,
        };
        Some(field)
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Field::BaseName => "BaseName",
            Field::ClassName => "ClassName",
            Field::Rarity => "Rarity",
            Field::ItemLevel => "ItemLevel",
            Field::Quality => "Quality",
            Field::Width => "Width",
            Field::Height => "Height",
            Field::StackSize => "StackSize",
            Field::SocketCount => "SocketCount",
            Field::IsIdentified => "IsIdentified",
            Field::IsCorrupted => "IsCorrupted",
            Field::MapTier => "MapTier",
            Field::GemLevel => "GemLevel",
        }
    }

    pub(crate) fn kind(self) -> ValueKind {
        match self {
            Field::BaseName | Field::ClassName => ValueKind::Str,
            Field::Rarity => ValueKind::Rarity,
            Field::ItemLevel
            | Field::Quality
            | Field::Width
            | Field::Height
            | Field::StackSize
            | Field::SocketCount
            | Field::MapTier
            | Field::GemLevel => ValueKind::Int,
            Field::IsIdentified | Field::IsCorrupted => ValueKind::Bool,
        }
    }

    /// Read the field from an item. `None` means the field is absent on this
    /// particular item (optional fields only); the evaluator reports that as
    /// a runtime fault.
    pub(crate) fn get(self, item: &Item) -> Option<Value> {
        let value = match self {
            Field::BaseName => Value::Str(item.base_name.clone()),
            Field::ClassName => Value::Str(item.class_name.clone()),
            Field::Rarity => Value::Rarity(item.rarity),
            Field::ItemLevel => Value::Int(item.item_level),
            Field::Quality => Value::Int(item.quality),
            Field::Width => Value::Int(item.width),
            Field::Height => Value::Int(item.height),
            Field::StackSize => Value::Int(item.stack_size),
            Field::SocketCount => Value::Int(item.socket_count),
            Field::IsIdentified => Value::Bool(item.is_identified),
            Field::IsCorrupted => Value::Bool(item.is_corrupted),
            Field::MapTier => Value::Int(item.map_tier?),
            Field::GemLevel => Value::Int(item.gem_level?),
        };
        Some(value)
    }
}
