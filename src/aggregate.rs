use std::collections::HashMap;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::binder::Binding;
use crate::errors::{Error, SetConflict};
use crate::model::OptionName;
use crate::schema::Schema;
use crate::value::{ParseLocale, Strategy, Value};

/// The complete outcome of a parse.
///
/// A result is always produced; callers inspect [`ParserResult::errors`] (or
/// [`ParserResult::is_ok`]) to distinguish success from failure.
#[derive(Debug)]
pub struct ParserResult {
    values: HashMap<String, Value>,
    errors: Vec<Error>,
    supplied: Vec<OptionName>,
    parameter_set: Option<String>,
    verb: Option<String>,
}

impl ParserResult {
    /// The deserialized value for the given long name, if present.
    ///
    /// Absent when the option was neither supplied nor defaulted, or when its
    /// deserialization failed.
    pub fn value(&self, long: &str) -> Option<&Value> {
        self.values.get(long)
    }

    /// Every error encountered, in detection order.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Whether the parse completed without any errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The options actually supplied on the command line, in encounter order.
    pub fn supplied(&self) -> &[OptionName] {
        &self.supplied
    }

    /// The parameter set in effect, when exactly one was triggered.
    pub fn parameter_set(&self) -> Option<&str> {
        self.parameter_set.as_deref()
    }

    /// The selected verb, when parsing went through a [VerbRouter](crate::VerbRouter).
    pub fn verb(&self) -> Option<&str> {
        self.verb.as_deref()
    }

    pub(crate) fn failure(errors: Vec<Error>) -> Self {
        Self {
            values: HashMap::default(),
            errors,
            supplied: Vec::default(),
            parameter_set: None,
            verb: None,
        }
    }

    pub(crate) fn with_verb(mut self, verb: impl Into<String>) -> Self {
        self.verb = Some(verb.into());
        self
    }
}

struct Group {
    id: usize,
    occurrences: Vec<Vec<String>>,
}

/// Group the binder's events by descriptor, validate the groups, and
/// deserialize each one into its final value.
pub(crate) fn aggregate(
    schema: &Schema,
    events: Vec<Result<Binding, Error>>,
    locale: &ParseLocale,
) -> ParserResult {
    let mut errors: Vec<Error> = Vec::default();
    let mut groups: Vec<Group> = Vec::default();
    let mut index: HashMap<usize, usize> = HashMap::default();
    let mut supplied: Vec<OptionName> = Vec::default();

    for event in events {
        match event {
            Err(error) => errors.push(error),
            Ok(binding) => match index.get(&binding.id) {
                Some(&at) => {
                    if !schema.strategy(binding.id).is_multi() {
                        errors.push(Error::DuplicateOption {
                            option: binding.name,
                            value: binding.values.first().cloned(),
                        });
                    }
                    groups[at].occurrences.push(binding.values);
                }
                None => {
                    index.insert(binding.id, groups.len());
                    supplied.push(binding.name);
                    groups.push(Group {
                        id: binding.id,
                        occurrences: vec![binding.values],
                    });
                }
            },
        }
    }

    // One conflict error covering every triggered set, not one per pairing.
    let mut triggered: Vec<(String, Vec<OptionName>)> = Vec::default();

    for group in &groups {
        let descriptor = schema.descriptor(group.id);
        if let Some(set) = &descriptor.parameter_set {
            match triggered.iter_mut().find(|(name, _)| name == set) {
                Some((_, options)) => options.push(descriptor.option_name()),
                None => triggered.push((set.clone(), vec![descriptor.option_name()])),
            }
        }
    }

    if triggered.len() > 1 {
        errors.push(Error::MutuallyExclusiveSet {
            conflicts: triggered
                .iter()
                .map(|(set, options)| SetConflict {
                    set: set.clone(),
                    options: options.clone(),
                })
                .collect(),
        });
    }

    for (id, descriptor) in schema.descriptors().iter().enumerate() {
        if descriptor.required && !index.contains_key(&id) {
            let applicable = match &descriptor.parameter_set {
                None => true,
                Some(set) => triggered.iter().any(|(name, _)| name == set),
            };
            if applicable {
                errors.push(Error::MissingRequiredOption {
                    option: descriptor.option_name(),
                });
            }
        }
    }

    let mut values: HashMap<String, Value> = HashMap::default();

    for group in &groups {
        let descriptor = schema.descriptor(group.id);
        let option = descriptor.option_name();

        let parsed = match schema.strategy(group.id) {
            Strategy::Single(scalar) => {
                let Some(last) = group.occurrences.last() else {
                    unreachable!("internal error - group without occurrences")
                };

                match last.first() {
                    None => {
                        if schema.strategy(group.id).is_switch() {
                            Some(("".to_string(), Value::Bool(true)))
                        } else {
                            errors.push(Error::MissingValue { option });
                            None
                        }
                    }
                    Some(raw) => match scalar.deserialize(locale, raw) {
                        Ok(value) => Some((raw.clone(), value)),
                        Err(bad) => {
                            errors.push(Error::BadValueFormat {
                                option,
                                value: bad.value,
                                message: bad.message,
                            });
                            None
                        }
                    },
                }
            }
            Strategy::Fold {
                element,
                collection,
            } => {
                let mut accumulator = descriptor
                    .default
                    .clone()
                    .unwrap_or_else(|| collection.empty());
                let mut raws: Vec<String> = Vec::default();

                for raw in group.occurrences.iter().flatten() {
                    match element.deserialize(locale, raw) {
                        Ok(item) => {
                            raws.push(raw.clone());
                            accumulator = collection.fold(accumulator, item);
                        }
                        Err(bad) => {
                            errors.push(Error::BadValueFormat {
                                option: option.clone(),
                                value: bad.value,
                                message: bad.message,
                            });
                        }
                    }
                }

                Some((raws.join(" "), accumulator))
            }
        };

        if let Some((raw, value)) = parsed {
            match &descriptor.validator {
                Some(validator) => match validator(&value) {
                    Ok(()) => {
                        values.insert(descriptor.long.clone(), value);
                    }
                    Err(message) => {
                        errors.push(Error::InvalidValue {
                            option: descriptor.option_name(),
                            value: raw,
                            parsed: value,
                            message,
                        });
                    }
                },
                None => {
                    values.insert(descriptor.long.clone(), value);
                }
            }
        }
    }

    for (id, descriptor) in schema.descriptors().iter().enumerate() {
        if !index.contains_key(&id) {
            if let Some(default) = &descriptor.default {
                values.insert(descriptor.long.clone(), default.clone());
            }
        }
    }

    let parameter_set = match triggered.as_slice() {
        [(set, _)] => Some(set.clone()),
        _ => None,
    };

    #[cfg(feature = "tracing_debug")]
    debug!(
        "aggregated {} group(s) into {} value(s) with {} error(s)",
        groups.len(),
        values.len(),
        errors.len()
    );

    ParserResult {
        values,
        errors,
        supplied,
        parameter_set,
        verb: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::model::OptionDescriptor;
    use crate::tokens::tokenize;
    use crate::value::ValueType;
    use std::collections::HashSet;

    fn run(schema: &Schema, args: &[&str]) -> ParserResult {
        let aliases: HashSet<String> = ["help", "h", "?"].into_iter().map(String::from).collect();
        let events = bind(schema, &tokenize(args, "--", Some('-')), &aliases);
        aggregate(schema, events, &ParseLocale::default())
    }

    #[test]
    fn switch_sets_true() {
        // Setup
        let schema =
            Schema::new(vec![OptionDescriptor::new("verbose", ValueType::Boolean)]).unwrap();

        // Execute
        let result = run(&schema, &["--verbose"]);

        // Verify
        assert!(result.is_ok());
        assert_eq!(result.value("verbose"), Some(&Value::Bool(true)));
        assert_eq!(result.supplied(), &[OptionName::long("verbose")]);
    }

    #[test]
    fn explicit_boolean_value() {
        let schema =
            Schema::new(vec![OptionDescriptor::new("verbose", ValueType::Boolean)]).unwrap();
        let result = run(&schema, &["--verbose", "no"]);
        assert!(result.is_ok());
        assert_eq!(result.value("verbose"), Some(&Value::Bool(false)));
    }

    #[test]
    fn missing_value_for_non_switch() {
        let schema = Schema::new(vec![
            OptionDescriptor::new("count", ValueType::Unsigned),
            OptionDescriptor::new("verbose", ValueType::Boolean),
        ])
        .unwrap();

        let result = run(&schema, &["--count", "--verbose"]);

        assert_eq!(
            result.errors(),
            &[Error::MissingValue {
                option: OptionName::long("count")
            }]
        );
        assert_eq!(result.value("count"), None);
        assert_eq!(result.value("verbose"), Some(&Value::Bool(true)));
    }

    #[test]
    fn duplicate_single_last_wins() {
        // Setup
        let schema = Schema::new(vec![OptionDescriptor::new("count", ValueType::Unsigned)]).unwrap();

        // Execute
        let result = run(&schema, &["--count", "1", "--count", "2"]);

        // Verify
        assert_eq!(
            result.errors(),
            &[Error::DuplicateOption {
                option: OptionName::long("count"),
                value: Some("2".to_string()),
            }]
        );
        assert_eq!(result.value("count"), Some(&Value::Uint(2)));
        assert_eq!(result.supplied(), &[OptionName::long("count")]);
    }

    #[test]
    fn repeated_multi_concatenates() {
        let schema = Schema::new(vec![OptionDescriptor::new(
            "items",
            ValueType::Sequence(Box::new(ValueType::String)),
        )])
        .unwrap();

        let result = run(&schema, &["--items", "a", "--items", "b", "c"]);

        assert!(result.is_ok());
        assert_eq!(
            result.value("items"),
            Some(&Value::Sequence(vec![
                Value::Str("a".to_string()),
                Value::Str("b".to_string()),
                Value::Str("c".to_string()),
            ]))
        );
    }

    #[test]
    fn fold_seeds_from_default() {
        let schema = Schema::new(vec![OptionDescriptor::new(
            "items",
            ValueType::Sequence(Box::new(ValueType::Integer)),
        )
        .default_value(Value::Sequence(vec![Value::Int(0)]))])
        .unwrap();

        let result = run(&schema, &["--items", "1"]);

        assert_eq!(
            result.value("items"),
            Some(&Value::Sequence(vec![Value::Int(0), Value::Int(1)]))
        );
    }

    #[test]
    fn bad_element_reported_and_fold_continues() {
        // Setup
        let schema = Schema::new(vec![OptionDescriptor::new(
            "counts",
            ValueType::Sequence(Box::new(ValueType::Integer)),
        )])
        .unwrap();

        // Execute
        let result = run(&schema, &["--counts", "1", "x", "2"]);

        // Verify
        assert_eq!(
            result.errors(),
            &[Error::BadValueFormat {
                option: OptionName::long("counts"),
                value: "x".to_string(),
                message: "value is not a valid integer".to_string(),
            }]
        );
        assert_eq!(
            result.value("counts"),
            Some(&Value::Sequence(vec![Value::Int(1), Value::Int(2)]))
        );
    }

    #[test]
    fn missing_required() {
        let schema = Schema::new(vec![
            OptionDescriptor::new("count", ValueType::Unsigned).required()
        ])
        .unwrap();

        let result = run(&schema, &[]);

        assert_eq!(
            result.errors(),
            &[Error::MissingRequiredOption {
                option: OptionName::long("count")
            }]
        );
    }

    #[test]
    fn required_in_untriggered_set_is_not_missing() {
        let schema = Schema::new(vec![
            OptionDescriptor::new("host", ValueType::String)
                .parameter_set("remote")
                .required(),
            OptionDescriptor::new("verbose", ValueType::Boolean),
        ])
        .unwrap();

        let result = run(&schema, &["--verbose"]);

        assert!(result.is_ok());
        assert_eq!(result.parameter_set(), None);
    }

    #[test]
    fn required_in_triggered_set_is_missing() {
        let schema = Schema::new(vec![
            OptionDescriptor::new("remote", ValueType::Boolean).parameter_set("remote"),
            OptionDescriptor::new("host", ValueType::String)
                .parameter_set("remote")
                .required(),
        ])
        .unwrap();

        let result = run(&schema, &["--remote"]);

        assert_eq!(
            result.errors(),
            &[Error::MissingRequiredOption {
                option: OptionName::long("host")
            }]
        );
        assert_eq!(result.parameter_set(), Some("remote"));
    }

    #[test]
    fn mutually_exclusive_sets_report_once() {
        // Setup
        let schema = Schema::new(vec![
            OptionDescriptor::new("host", ValueType::String).parameter_set("remote"),
            OptionDescriptor::new("port", ValueType::Unsigned).parameter_set("remote"),
            OptionDescriptor::new("path", ValueType::String).parameter_set("local"),
        ])
        .unwrap();

        // Execute
        let result = run(&schema, &["--host", "example.com", "--path", "/tmp", "--port", "80"]);

        // Verify
        assert_eq!(
            result.errors(),
            &[Error::MutuallyExclusiveSet {
                conflicts: vec![
                    SetConflict {
                        set: "remote".to_string(),
                        options: vec![OptionName::long("host"), OptionName::long("port")],
                    },
                    SetConflict {
                        set: "local".to_string(),
                        options: vec![OptionName::long("path")],
                    },
                ],
            }]
        );
        assert_eq!(result.parameter_set(), None);
    }

    #[test]
    fn validator_rejection() {
        // Setup
        let schema = Schema::new(vec![OptionDescriptor::new("count", ValueType::Unsigned)
            .validator(|value| match value {
                Value::Uint(count) if *count > 0 => Ok(()),
                _ => Err("count must be positive".to_string()),
            })])
        .unwrap();

        // Execute
        let result = run(&schema, &["--count", "0"]);

        // Verify
        assert_eq!(
            result.errors(),
            &[Error::InvalidValue {
                option: OptionName::long("count"),
                value: "0".to_string(),
                parsed: Value::Uint(0),
                message: "count must be positive".to_string(),
            }]
        );
        assert_eq!(result.value("count"), None);
    }

    #[test]
    fn unsupplied_default_materialized() {
        let schema = Schema::new(vec![
            OptionDescriptor::new("count", ValueType::Unsigned).default_value(Value::Uint(3))
        ])
        .unwrap();

        let result = run(&schema, &[]);

        assert!(result.is_ok());
        assert_eq!(result.value("count"), Some(&Value::Uint(3)));
        assert!(result.supplied().is_empty());
    }

    #[test]
    fn errors_collected_in_detection_order() {
        // Stream errors and duplicates in encounter order, then mutual
        // exclusion, then missing-required, then deserialization failures.
        let schema = Schema::new(vec![
            OptionDescriptor::new("count", ValueType::Unsigned),
            OptionDescriptor::new("needed", ValueType::String).required(),
        ])
        .unwrap();

        let result = run(
            &schema,
            &["--missing", "--count", "1", "--count", "x", "stray"],
        );

        assert_eq!(
            result.errors(),
            &[
                Error::UnknownOption {
                    option: OptionName::long("missing")
                },
                Error::DuplicateOption {
                    option: OptionName::long("count"),
                    value: Some("x".to_string()),
                },
                Error::UnexpectedValue {
                    value: "stray".to_string()
                },
                Error::MissingRequiredOption {
                    option: OptionName::long("needed")
                },
                Error::BadValueFormat {
                    option: OptionName::long("count"),
                    value: "x".to_string(),
                    message: "value is not a valid unsigned integer".to_string(),
                },
            ]
        );
    }
}
