use std::collections::HashSet;

use thiserror::Error;

use crate::aggregate::{aggregate, ParserResult};
use crate::binder::bind;
use crate::schema::Schema;
use crate::tokens::tokenize;
use crate::value::ParseLocale;

/// An error originating from an invalid parser configuration.
///
/// Configuration errors come from programmer mistakes, and so unlike parse
/// errors they surface immediately at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(pub(crate) String);

/// The knobs governing a [`Parser`].
///
/// ```
/// use argbind::{ParseLocale, ParserSettings};
///
/// let settings = ParserSettings::default()
///     .long_prefix("++")
///     .short_prefix('+')
///     .locale(ParseLocale::new(','));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserSettings {
    pub(crate) long_prefix: String,
    pub(crate) short_prefix: Option<char>,
    pub(crate) help_aliases: HashSet<String>,
    pub(crate) locale: ParseLocale,
}

impl Default for ParserSettings {
    fn default() -> Self {
        Self {
            long_prefix: "--".to_string(),
            short_prefix: Some('-'),
            help_aliases: ["help", "h", "?"].into_iter().map(String::from).collect(),
            locale: ParseLocale::default(),
        }
    }
}

impl ParserSettings {
    /// Use the given long option prefix in place of `--`.
    pub fn long_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.long_prefix = prefix.into();
        self
    }

    /// Use the given short option prefix in place of `-`.
    pub fn short_prefix(mut self, prefix: char) -> Self {
        self.short_prefix = Some(prefix);
        self
    }

    /// Disable short options entirely.
    pub fn without_short_prefix(mut self) -> Self {
        self.short_prefix = None;
        self
    }

    /// Replace the help aliases (`help`, `h`, `?` by default).
    /// An alias only takes effect when no declared option claims the name.
    pub fn help_aliases(
        mut self,
        aliases: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.help_aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Use the given numeric locale in place of `.`-separated decimals.
    pub fn locale(mut self, locale: ParseLocale) -> Self {
        self.locale = locale;
        self
    }
}

/// The front door: tokenizes, binds, and aggregates an argument stream
/// against a [`Schema`].
///
/// ```
/// use argbind::{OptionDescriptor, Parser, Schema, Value, ValueType};
///
/// let schema = Schema::new(vec![
///     OptionDescriptor::new("verbose", ValueType::Boolean).short('v'),
///     OptionDescriptor::new("count", ValueType::Unsigned),
/// ])
/// .unwrap();
/// let parser = Parser::default();
///
/// let result = parser.parse(&schema, &["-v", "--count", "5"]);
///
/// assert!(result.is_ok());
/// assert_eq!(result.value("count"), Some(&Value::Uint(5)));
/// ```
#[derive(Debug)]
pub struct Parser {
    settings: ParserSettings,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            settings: ParserSettings::default(),
        }
    }
}

impl Parser {
    /// Build a parser over the given settings.
    pub fn new(settings: ParserSettings) -> Result<Self, ConfigError> {
        if settings.long_prefix.is_empty() {
            return Err(ConfigError(
                "the long option prefix cannot be empty.".to_string(),
            ));
        }

        if let Some(short) = settings.short_prefix {
            if settings.long_prefix == short.to_string() {
                return Err(ConfigError(
                    "the long and short option prefixes cannot coincide.".to_string(),
                ));
            }
        }

        Ok(Self { settings })
    }

    /// Run the full pipeline over the given arguments.
    ///
    /// Never fails; all problems are collected onto the returned
    /// [`ParserResult`].
    pub fn parse(&self, schema: &Schema, args: &[&str]) -> ParserResult {
        let tokens = tokenize(args, &self.settings.long_prefix, self.settings.short_prefix);
        let events = bind(schema, &tokens, &self.settings.help_aliases);
        aggregate(schema, events, &self.settings.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OptionDescriptor;
    use crate::value::{Value, ValueType};

    #[test]
    fn settings_default() {
        let settings = ParserSettings::default();
        assert_eq!(settings.long_prefix, "--");
        assert_eq!(settings.short_prefix, Some('-'));
        assert_eq!(settings.help_aliases.len(), 3);
    }

    #[test]
    fn rejects_empty_long_prefix() {
        let result = Parser::new(ParserSettings::default().long_prefix(""));
        assert_matches!(result, Err(ConfigError(_)));
    }

    #[test]
    fn rejects_coinciding_prefixes() {
        let result = Parser::new(ParserSettings::default().long_prefix("-"));
        assert_matches!(result, Err(ConfigError(_)));
    }

    #[test]
    fn distinct_prefixes_accepted() {
        let result = Parser::new(ParserSettings::default().long_prefix("++").short_prefix('+'));
        assert!(result.is_ok());
    }

    #[test]
    fn custom_prefixes_parse() {
        // Setup
        let schema = Schema::new(vec![
            OptionDescriptor::new("verbose", ValueType::Boolean).short('v'),
            OptionDescriptor::new("count", ValueType::Unsigned),
        ])
        .unwrap();
        let parser =
            Parser::new(ParserSettings::default().long_prefix("++").short_prefix('+')).unwrap();

        // Execute
        let result = parser.parse(&schema, &["+v", "++count", "5"]);

        // Verify
        assert!(result.is_ok());
        assert_eq!(result.value("verbose"), Some(&Value::Bool(true)));
        assert_eq!(result.value("count"), Some(&Value::Uint(5)));
    }

    #[test]
    fn custom_help_aliases() {
        // Setup
        let schema = Schema::new(vec![OptionDescriptor::new("verbose", ValueType::Boolean)])
            .unwrap();
        let parser = Parser::new(ParserSettings::default().help_aliases(["assist"])).unwrap();

        // Execute & verify
        let result = parser.parse(&schema, &["--assist"]);
        assert_eq!(result.errors(), &[crate::Error::HelpRequested]);

        // The stock aliases no longer apply.
        let result = parser.parse(&schema, &["--help"]);
        assert_matches!(result.errors(), [crate::Error::UnknownOption { .. }]);
    }

    #[test]
    fn locale_applies_to_floats() {
        // Setup
        let schema = Schema::new(vec![OptionDescriptor::new("ratio", ValueType::Float)]).unwrap();
        let parser =
            Parser::new(ParserSettings::default().locale(ParseLocale::new(','))).unwrap();

        // Execute
        let result = parser.parse(&schema, &["--ratio", "1,5"]);

        // Verify
        assert!(result.is_ok());
        assert_eq!(result.value("ratio"), Some(&Value::Float(1.5)));
    }
}
