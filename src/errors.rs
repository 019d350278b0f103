use thiserror::Error;

use crate::model::OptionName;
use crate::value::Value;

/// An error encountered while parsing a token stream against a schema.
///
/// Parse errors are collected, never thrown; the parser always runs the stream
/// to completion and reports everything it found via
/// [ParserResult::errors](crate::ParserResult::errors).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// An option that expects a value received none.
    #[error("missing value for option '{option}'.")]
    MissingValue {
        /// The option missing its value.
        option: OptionName,
    },

    /// An option token did not resolve against the schema.
    #[error("unknown option '{option}'.")]
    UnknownOption {
        /// The unresolved name, as written.
        option: OptionName,
    },

    /// A value token arrived with no option capturing and no positional slot left.
    #[error("unexpected value '{value}'.")]
    UnexpectedValue {
        /// The stray token.
        value: String,
    },

    /// A required option was never supplied.
    #[error("missing required option '{option}'.")]
    MissingRequiredOption {
        /// The absent option.
        option: OptionName,
    },

    /// A single-value option was supplied more than once.
    /// The earlier occurrences are discarded; the last one wins.
    #[error("duplicate option '{option}'.")]
    DuplicateOption {
        /// The repeated option.
        option: OptionName,
        /// The value carried by the extra occurrence, if any.
        value: Option<String>,
    },

    /// Options from more than one parameter set were supplied together.
    #[error("mutually exclusive options supplied: {}.", render_conflicts(.conflicts))]
    MutuallyExclusiveSet {
        /// The conflicting options, grouped by parameter set.
        conflicts: Vec<SetConflict>,
    },

    /// A value token could not be deserialized into the declared type.
    #[error("invalid value '{value}' for option '{option}': {message}.")]
    BadValueFormat {
        /// The option whose value failed to deserialize.
        option: OptionName,
        /// The offending token, verbatim.
        value: String,
        /// What the deserializer expected.
        message: String,
    },

    /// A deserialized value was rejected by the descriptor's validator.
    #[error("rejected value '{value}' for option '{option}': {message}.")]
    InvalidValue {
        /// The option whose value was rejected.
        option: OptionName,
        /// The raw input, verbatim.
        value: String,
        /// The deserialized value that was rejected.
        parsed: Value,
        /// The validator's rejection message.
        message: String,
    },

    /// A help alias was supplied as an option token.
    #[error("help requested.")]
    HelpRequested,

    /// The argument stream was empty where a verb was expected.
    #[error("no verb selected.")]
    NoVerbSelected,

    /// The first argument did not name a registered verb.
    #[error("unknown verb '{verb}'.")]
    BadVerbSelected {
        /// The unrecognized verb, as written.
        verb: String,
    },

    /// The help verb was supplied in place of a registered verb.
    #[error("verb help requested.")]
    HelpVerbRequested,
}

/// The options supplied from a single parameter set, reported as part of a
/// [`Error::MutuallyExclusiveSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetConflict {
    /// The parameter set name.
    pub set: String,
    /// The supplied options belonging to that set, in encounter order.
    pub options: Vec<OptionName>,
}

impl std::fmt::Display for SetConflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.options.iter().map(|o| format!("'{o}'")).collect();
        write!(f, "{} from set '{}'", rendered.join(", "), self.set)
    }
}

fn render_conflicts(conflicts: &[SetConflict]) -> String {
    let rendered: Vec<String> = conflicts.iter().map(|c| c.to_string()).collect();
    rendered.join("; ")
}
