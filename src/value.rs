use std::net::IpAddr;
use std::time::Duration;

/// The locale used when converting numeric tokens.
///
/// Only the decimal separator is configurable; every other aspect of number
/// parsing follows the Rust standard library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLocale {
    decimal_separator: char,
}

impl Default for ParseLocale {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
        }
    }
}

impl ParseLocale {
    /// Create a locale with the given decimal separator.
    pub fn new(decimal_separator: char) -> Self {
        Self { decimal_separator }
    }

    fn float(&self, raw: &str) -> Result<f64, ()> {
        if self.decimal_separator == '.' {
            raw.parse().map_err(|_| ())
        } else if raw.contains('.') {
            // A '.' is not a digit grouping character; reject it outright.
            Err(())
        } else {
            raw.replace(self.decimal_separator, ".")
                .parse()
                .map_err(|_| ())
        }
    }
}

/// The declared shape of an option's value.
///
/// The declared type selects the deserialization strategy once, when the
/// [Schema](crate::Schema) is built.
/// Collection types ([`ValueType::Sequence`], [`ValueType::Set`],
/// [`ValueType::Mapping`]) may not nest; declaring one inside another (or
/// inside a [`ValueType::Pair`]) is a schema construction error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// An arbitrary string, taken verbatim.
    String,
    /// A signed integer (`i64`).
    Integer,
    /// An unsigned integer (`u64`).
    Unsigned,
    /// A floating point number (`f64`), converted via the [`ParseLocale`].
    Float,
    /// A boolean, accepting `{true, t, yes, y, 1}` / `{false, f, no, n, 0}`
    /// case-insensitively.
    /// A `Boolean` option given no value tokens acts as a switch.
    Boolean,
    /// A duration such as `30s`, `5m`, `2h`, `1d`, or a bare seconds count.
    Duration,
    /// An IP address (v4 or v6).
    IpAddress,
    /// One of a closed set of names, matched case-insensitively.
    /// The canonical (declared) spelling is produced.
    Enumeration(Vec<String>),
    /// A `key=value` (or `key:value`) pair; precisely one separator must appear.
    Pair(Box<ValueType>, Box<ValueType>),
    /// Zero or more values appended in encounter order.
    Sequence(Box<ValueType>),
    /// Zero or more values de-duplicated, preserving first-encounter order.
    Set(Box<ValueType>),
    /// Zero or more `key=value` pairs; a repeated key replaces the earlier entry.
    Mapping(Box<ValueType>, Box<ValueType>),
}

impl ValueType {
    pub(crate) fn is_collection(&self) -> bool {
        matches!(
            self,
            ValueType::Sequence(_) | ValueType::Set(_) | ValueType::Mapping(_, _)
        )
    }
}

/// A deserialized option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Produced by [`ValueType::String`] and [`ValueType::Enumeration`].
    Str(String),
    /// Produced by [`ValueType::Integer`].
    Int(i64),
    /// Produced by [`ValueType::Unsigned`].
    Uint(u64),
    /// Produced by [`ValueType::Float`].
    Float(f64),
    /// Produced by [`ValueType::Boolean`].
    Bool(bool),
    /// Produced by [`ValueType::Duration`].
    Duration(Duration),
    /// Produced by [`ValueType::IpAddress`].
    Ip(IpAddr),
    /// Produced by [`ValueType::Pair`].
    Pair(Box<Value>, Box<Value>),
    /// Produced by [`ValueType::Sequence`].
    Sequence(Vec<Value>),
    /// Produced by [`ValueType::Set`].
    Set(Vec<Value>),
    /// Produced by [`ValueType::Mapping`].
    Mapping(Vec<(Value, Value)>),
}

impl Value {
    /// The string content, if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(value) => Some(value),
            _ => None,
        }
    }

    /// The integer content, if this is an `Int`.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// The unsigned content, if this is a `Uint`.
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Value::Uint(value) => Some(*value),
            _ => None,
        }
    }

    /// The float content, if this is a `Float`.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// The boolean content, if this is a `Bool`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// The items, if this is a `Sequence` or `Set`.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) | Value::Set(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a `Mapping`.
    pub fn as_entries(&self) -> Option<&[(Value, Value)]> {
        match self {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Str(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Uint(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Duration(value) => write!(f, "{}s", value.as_secs()),
            Value::Ip(value) => write!(f, "{value}"),
            Value::Pair(key, value) => write!(f, "{key}={value}"),
            Value::Sequence(items) | Value::Set(items) => {
                let rendered: Vec<String> = items.iter().map(|i| i.to_string()).collect();
                write!(f, "{}", rendered.join(" "))
            }
            Value::Mapping(entries) => {
                let rendered: Vec<String> =
                    entries.iter().map(|(k, v)| format!("{k}={v}")).collect();
                write!(f, "{}", rendered.join(" "))
            }
        }
    }
}

/// A deserialization failure: the original token plus a reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct BadValue {
    pub(crate) value: String,
    pub(crate) message: String,
}

impl BadValue {
    fn new(value: &str, message: impl Into<String>) -> Self {
        Self {
            value: value.to_string(),
            message: message.into(),
        }
    }
}

const TRUE_TOKENS: [&str; 5] = ["true", "t", "yes", "y", "1"];
const FALSE_TOKENS: [&str; 5] = ["false", "f", "no", "n", "0"];

/// A strategy that consumes exactly one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScalarKind {
    Str,
    Int,
    Uint,
    Float,
    Bool,
    Duration,
    Ip,
    Enum(Vec<String>),
    Pair(Box<ScalarKind>, Box<ScalarKind>),
}

impl ScalarKind {
    pub(crate) fn deserialize(
        &self,
        locale: &ParseLocale,
        raw: &str,
    ) -> Result<Value, BadValue> {
        match self {
            ScalarKind::Str => Ok(Value::Str(raw.to_string())),
            ScalarKind::Int => raw
                .parse()
                .map(Value::Int)
                .map_err(|_| BadValue::new(raw, "value is not a valid integer")),
            ScalarKind::Uint => raw
                .parse()
                .map(Value::Uint)
                .map_err(|_| BadValue::new(raw, "value is not a valid unsigned integer")),
            ScalarKind::Float => locale
                .float(raw)
                .map(Value::Float)
                .map_err(|_| BadValue::new(raw, "value is not a valid number")),
            ScalarKind::Bool => {
                if TRUE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(raw)) {
                    Ok(Value::Bool(true))
                } else if FALSE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(raw)) {
                    Ok(Value::Bool(false))
                } else {
                    Err(BadValue::new(raw, "value is not a valid boolean"))
                }
            }
            ScalarKind::Duration => parse_duration(raw)
                .map(Value::Duration)
                .ok_or_else(|| BadValue::new(raw, "value is not a valid duration")),
            ScalarKind::Ip => raw
                .parse()
                .map(Value::Ip)
                .map_err(|_| BadValue::new(raw, "value is not a valid IP address")),
            ScalarKind::Enum(variants) => variants
                .iter()
                .find(|v| v.eq_ignore_ascii_case(raw))
                .map(|v| Value::Str(v.clone()))
                .ok_or_else(|| {
                    BadValue::new(
                        raw,
                        format!("value is not one of {{{}}}", variants.join(", ")),
                    )
                }),
            ScalarKind::Pair(key_kind, value_kind) => {
                if raw.matches(['=', ':']).count() != 1 {
                    return Err(BadValue::new(
                        raw,
                        "value must be key=value or key:value, with neither side \
                         containing an equal sign or colon",
                    ));
                }

                match raw.split_once(['=', ':']) {
                    Some((key, value)) => Ok(Value::Pair(
                        Box::new(key_kind.deserialize(locale, key)?),
                        Box::new(value_kind.deserialize(locale, value)?),
                    )),
                    None => unreachable!("internal error - separator count was checked"),
                }
            }
        }
    }

    fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (ScalarKind::Str, Value::Str(_)) => true,
            (ScalarKind::Int, Value::Int(_)) => true,
            (ScalarKind::Uint, Value::Uint(_)) => true,
            (ScalarKind::Float, Value::Float(_)) => true,
            (ScalarKind::Bool, Value::Bool(_)) => true,
            (ScalarKind::Duration, Value::Duration(_)) => true,
            (ScalarKind::Ip, Value::Ip(_)) => true,
            (ScalarKind::Enum(variants), Value::Str(value)) => variants.contains(value),
            (ScalarKind::Pair(key_kind, value_kind), Value::Pair(key, value)) => {
                key_kind.admits(key) && value_kind.admits(value)
            }
            _ => false,
        }
    }
}

fn parse_duration(raw: &str) -> Option<Duration> {
    let (digits, multiplier) = match raw.chars().last()? {
        's' => (&raw[..raw.len() - 1], 1),
        'm' => (&raw[..raw.len() - 1], 60),
        'h' => (&raw[..raw.len() - 1], 3600),
        'd' => (&raw[..raw.len() - 1], 86400),
        _ => (raw, 1),
    };
    let count: u64 = digits.parse().ok()?;
    count.checked_mul(multiplier).map(Duration::from_secs)
}

/// The fold target for a multi-value strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CollectionKind {
    Sequence,
    Set,
    Mapping,
}

impl CollectionKind {
    pub(crate) fn empty(&self) -> Value {
        match self {
            CollectionKind::Sequence => Value::Sequence(Vec::default()),
            CollectionKind::Set => Value::Set(Vec::default()),
            CollectionKind::Mapping => Value::Mapping(Vec::default()),
        }
    }

    pub(crate) fn fold(&self, accumulator: Value, item: Value) -> Value {
        match (self, accumulator) {
            (CollectionKind::Sequence, Value::Sequence(mut items)) => {
                items.push(item);
                Value::Sequence(items)
            }
            (CollectionKind::Set, Value::Set(mut items)) => {
                if !items.contains(&item) {
                    items.push(item);
                }
                Value::Set(items)
            }
            (CollectionKind::Mapping, Value::Mapping(mut entries)) => match item {
                Value::Pair(key, value) => {
                    match entries.iter_mut().find(|(k, _)| *k == *key) {
                        Some((_, existing)) => *existing = *value,
                        None => entries.push((*key, *value)),
                    }
                    Value::Mapping(entries)
                }
                _ => unreachable!("internal error - mapping elements must be pairs"),
            },
            _ => unreachable!("internal error - accumulator shape was checked at schema build"),
        }
    }
}

/// The deserialization strategy for one descriptor, resolved once at schema build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Strategy {
    Single(ScalarKind),
    Fold {
        element: ScalarKind,
        collection: CollectionKind,
    },
}

impl Strategy {
    /// Resolve the declared type into a strategy.
    /// `Err(())` indicates a nested collection declaration.
    pub(crate) fn resolve(declared: &ValueType) -> Result<Self, ()> {
        match declared {
            ValueType::Sequence(element) => Ok(Strategy::Fold {
                element: resolve_scalar(element)?,
                collection: CollectionKind::Sequence,
            }),
            ValueType::Set(element) => Ok(Strategy::Fold {
                element: resolve_scalar(element)?,
                collection: CollectionKind::Set,
            }),
            ValueType::Mapping(key, value) => Ok(Strategy::Fold {
                element: ScalarKind::Pair(
                    Box::new(resolve_scalar(key)?),
                    Box::new(resolve_scalar(value)?),
                ),
                collection: CollectionKind::Mapping,
            }),
            scalar => Ok(Strategy::Single(resolve_scalar(scalar)?)),
        }
    }

    pub(crate) fn is_multi(&self) -> bool {
        matches!(self, Strategy::Fold { .. })
    }

    pub(crate) fn is_switch(&self) -> bool {
        matches!(self, Strategy::Single(ScalarKind::Bool))
    }

    pub(crate) fn admits(&self, value: &Value) -> bool {
        match (self, value) {
            (Strategy::Single(scalar), value) => scalar.admits(value),
            (
                Strategy::Fold {
                    element,
                    collection: CollectionKind::Sequence,
                },
                Value::Sequence(items),
            )
            | (
                Strategy::Fold {
                    element,
                    collection: CollectionKind::Set,
                },
                Value::Set(items),
            ) => items.iter().all(|item| element.admits(item)),
            (
                Strategy::Fold {
                    element,
                    collection: CollectionKind::Mapping,
                },
                Value::Mapping(entries),
            ) => match element {
                ScalarKind::Pair(key_kind, value_kind) => entries
                    .iter()
                    .all(|(k, v)| key_kind.admits(k) && value_kind.admits(v)),
                _ => unreachable!("internal error - mapping elements must be pairs"),
            },
            _ => false,
        }
    }
}

fn resolve_scalar(declared: &ValueType) -> Result<ScalarKind, ()> {
    match declared {
        ValueType::String => Ok(ScalarKind::Str),
        ValueType::Integer => Ok(ScalarKind::Int),
        ValueType::Unsigned => Ok(ScalarKind::Uint),
        ValueType::Float => Ok(ScalarKind::Float),
        ValueType::Boolean => Ok(ScalarKind::Bool),
        ValueType::Duration => Ok(ScalarKind::Duration),
        ValueType::IpAddress => Ok(ScalarKind::Ip),
        ValueType::Enumeration(variants) => Ok(ScalarKind::Enum(variants.clone())),
        ValueType::Pair(key, value) => Ok(ScalarKind::Pair(
            Box::new(resolve_scalar(key)?),
            Box::new(resolve_scalar(value)?),
        )),
        ValueType::Sequence(_) | ValueType::Set(_) | ValueType::Mapping(_, _) => Err(()),
    }
}
