use crate::value::{Value, ValueType};

/// The number of values an option consumes.
///
/// Arity is not declared directly; it derives from the declared
/// [ValueType](crate::ValueType) (collection types are `Multi`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly one value (or none, for a boolean switch).
    Single,
    /// Zero or more values, folded into a collection.
    Multi,
}

/// The name(s) by which an option is addressed on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionName {
    long: Option<String>,
    short: Option<char>,
}

impl OptionName {
    /// A long-form name, such as `--verbose`.
    pub fn long(name: impl Into<String>) -> Self {
        Self {
            long: Some(name.into()),
            short: None,
        }
    }

    /// A short-form name, such as `-v`.
    pub fn short(name: char) -> Self {
        Self {
            long: None,
            short: Some(name),
        }
    }

    /// A name carrying both forms, such as `-v/--verbose`.
    pub fn full(long: impl Into<String>, short: char) -> Self {
        Self {
            long: Some(long.into()),
            short: Some(short),
        }
    }

    /// The long form, if present.
    pub fn long_name(&self) -> Option<&str> {
        self.long.as_deref()
    }

    /// The short form, if present.
    pub fn short_name(&self) -> Option<char> {
        self.short
    }
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.long, &self.short) {
            (Some(long), Some(short)) => write!(f, "-{short}/--{long}"),
            (Some(long), None) => write!(f, "--{long}"),
            (None, Some(short)) => write!(f, "-{short}"),
            (None, None) => unreachable!("internal error - option name with no forms"),
        }
    }
}

/// The validation hook applied after deserialization.
pub type Validator = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// The declaration of a single command line option.
///
/// Built up via chained setters:
///
/// ```
/// use argbind::{OptionDescriptor, ValueType};
///
/// let verbose = OptionDescriptor::new("verbose", ValueType::Boolean).short('v');
/// let count = OptionDescriptor::new("count", ValueType::Unsigned).required();
/// ```
pub struct OptionDescriptor {
    pub(crate) long: String,
    pub(crate) short: Option<char>,
    pub(crate) required: bool,
    pub(crate) parameter_set: Option<String>,
    pub(crate) position: Option<usize>,
    pub(crate) value_type: ValueType,
    pub(crate) default: Option<Value>,
    pub(crate) validator: Option<Validator>,
    pub(crate) help: Option<String>,
}

impl OptionDescriptor {
    /// Declare an option with the given long name and value type.
    pub fn new(long: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            long: long.into(),
            short: None,
            required: false,
            parameter_set: None,
            position: None,
            value_type,
            default: None,
            validator: None,
            help: None,
        }
    }

    /// Also address this option by a short (single character) name.
    pub fn short(mut self, short: char) -> Self {
        self.short = Some(short);
        self
    }

    /// Require this option to be supplied.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Place this option in a mutually exclusive parameter set.
    pub fn parameter_set(mut self, set: impl Into<String>) -> Self {
        self.parameter_set = Some(set.into());
        self
    }

    /// Also accept this option positionally, at the given zero-based position.
    pub fn position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// The value to materialize when this option is not supplied.
    /// Multi-value options fold supplied values on top of the default.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Reject deserialized values the given predicate refuses.
    /// The returned message is reported to the user verbatim.
    pub fn validator(
        mut self,
        validator: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Attach descriptive text, for consumption by help renderers.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    /// The long name.
    pub fn long_name(&self) -> &str {
        &self.long
    }

    /// The full addressable name.
    pub fn option_name(&self) -> OptionName {
        match self.short {
            Some(short) => OptionName::full(self.long.clone(), short),
            None => OptionName::long(self.long.clone()),
        }
    }

    /// The declared value type.
    pub fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The derived arity.
    pub fn arity(&self) -> Arity {
        if self.value_type.is_collection() {
            Arity::Multi
        } else {
            Arity::Single
        }
    }

    /// The attached help text, if any.
    pub fn help_text(&self) -> Option<&str> {
        self.help.as_deref()
    }
}

impl std::fmt::Debug for OptionDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionDescriptor")
            .field("long", &self.long)
            .field("short", &self.short)
            .field("required", &self.required)
            .field("parameter_set", &self.parameter_set)
            .field("position", &self.position)
            .field("value_type", &self.value_type)
            .field("default", &self.default)
            .field("validator", &self.validator.as_ref().map(|_| "<fn>"))
            .field("help", &self.help)
            .finish()
    }
}
