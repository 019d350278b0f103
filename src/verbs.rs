use std::collections::HashMap;

use crate::aggregate::ParserResult;
use crate::errors::Error;
use crate::parser::{ConfigError, Parser};
use crate::schema::Schema;

const HELP_VERB: &str = "help";

/// Routes the first argument to one of several named schemas.
///
/// ```
/// use argbind::{OptionDescriptor, Parser, Schema, Value, ValueType, VerbRouter};
///
/// let router = VerbRouter::default()
///     .verb(
///         "fetch",
///         Schema::new(vec![OptionDescriptor::new("url", ValueType::String).position(0)])
///             .unwrap(),
///     )
///     .unwrap();
/// let parser = Parser::default();
///
/// let result = router.parse(&parser, &["fetch", "https://example.com"]);
///
/// assert_eq!(result.verb(), Some("fetch"));
/// assert_eq!(
///     result.value("url"),
///     Some(&Value::Str("https://example.com".to_string()))
/// );
/// ```
#[derive(Debug, Default)]
pub struct VerbRouter {
    verbs: Vec<(String, Schema)>,
    by_name: HashMap<String, usize>,
}

impl VerbRouter {
    /// Register a verb with its schema.
    pub fn verb(mut self, name: impl Into<String>, schema: Schema) -> Result<Self, ConfigError> {
        let name = name.into();

        if self.by_name.contains_key(&name) {
            return Err(ConfigError(format!("duplicate verb '{name}'.")));
        }

        self.by_name.insert(name.clone(), self.verbs.len());
        self.verbs.push((name, schema));
        Ok(self)
    }

    /// The registered verb names, in registration order.
    pub fn verbs(&self) -> impl Iterator<Item = &str> {
        self.verbs.iter().map(|(name, _)| name.as_str())
    }

    /// The schema registered under the given verb, if any.
    pub fn schema(&self, verb: &str) -> Option<&Schema> {
        self.by_name.get(verb).map(|&at| &self.verbs[at].1)
    }

    /// Select a verb from the first argument and run the remainder through
    /// its schema.
    pub fn parse(&self, parser: &Parser, args: &[&str]) -> ParserResult {
        match args.first() {
            None => ParserResult::failure(vec![Error::NoVerbSelected]),
            Some(&first) => match self.by_name.get(first) {
                Some(&at) => parser
                    .parse(&self.verbs[at].1, &args[1..])
                    .with_verb(first),
                None if first == HELP_VERB => {
                    ParserResult::failure(vec![Error::HelpVerbRequested]).with_verb(first)
                }
                None => ParserResult::failure(vec![Error::BadVerbSelected {
                    verb: first.to_string(),
                }])
                .with_verb(first),
            },
        }
    }
}
