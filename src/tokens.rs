#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The classification of a single raw argument (or piece of one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// A long-form option name, such as `--verbose`.
    LongOption,
    /// A long-form option name carrying an inline value, such as `--count=5`.
    /// The inline value follows as a separate `Value` token.
    LongOptionWithInlineValue,
    /// A single short-form option character; `-xyz` produces three of these.
    ShortOption,
    /// A bare value.
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    /// The raw argument this token came from, verbatim.
    pub(crate) raw: String,
    /// The token payload: an option name, a short character, or a value.
    pub(crate) value: String,
}

impl Token {
    fn new(kind: TokenKind, raw: &str, value: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.to_string(),
            value: value.into(),
        }
    }
}

/// Split raw arguments into classified tokens.
///
/// Purely lexical; no schema lookups happen here.  A bare long prefix (`--`)
/// produces a `LongOption` with an empty name.  Short arguments explode one
/// `ShortOption` per character, with no inline value form.
pub(crate) fn tokenize(args: &[&str], long_prefix: &str, short_prefix: Option<char>) -> Vec<Token> {
    let mut tokens = Vec::default();

    for arg in args {
        if let Some(name) = arg.strip_prefix(long_prefix) {
            match name.split_once('=') {
                Some((name, inline)) => {
                    tokens.push(Token::new(TokenKind::LongOptionWithInlineValue, arg, name));
                    tokens.push(Token::new(TokenKind::Value, arg, inline));
                }
                None => {
                    tokens.push(Token::new(TokenKind::LongOption, arg, name));
                }
            }
        } else if let Some(remainder) = short_prefix.and_then(|p| arg.strip_prefix(p)) {
            // The bare prefix has no characters left, and so emits nothing.
            for short in remainder.chars() {
                tokens.push(Token::new(TokenKind::ShortOption, arg, short.to_string()));
            }
        } else {
            tokens.push(Token::new(TokenKind::Value, arg, *arg));
        }
    }

    #[cfg(feature = "tracing_debug")]
    debug!("tokenized {} argument(s) into {} token(s)", args.len(), tokens.len());

    tokens
}
