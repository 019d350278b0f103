use std::collections::HashSet;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

use crate::errors::Error;
use crate::model::OptionName;
use crate::schema::Schema;
use crate::tokens::{Token, TokenKind};

/// One resolved option occurrence: a descriptor plus the raw values it captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    pub(crate) id: usize,
    pub(crate) name: OptionName,
    pub(crate) values: Vec<String>,
}

/// The option currently capturing value tokens.
struct Capture {
    id: usize,
    name: OptionName,
    values: Vec<String>,
    /// An inline `=` promised a value; flush as soon as it arrives.
    value_expected: bool,
}

/// Walk the token stream against the schema, producing bindings interleaved
/// with the errors encountered along the way.
///
/// The machine is greedy with a single token of lookahead: a value token
/// always feeds the capturing option if there is one.  Positional values
/// consume the in-effect position list one slot at a time; only a multi-value
/// descriptor in the final slot keeps capturing.
pub(crate) fn bind(
    schema: &Schema,
    tokens: &[Token],
    help_aliases: &HashSet<String>,
) -> Vec<Result<Binding, Error>> {
    let mut out: Vec<Result<Binding, Error>> = Vec::default();
    let mut current: Option<Capture> = None;
    let mut triggered_set: Option<String> = None;
    let mut position = 0;

    for token in tokens {
        match token.kind {
            TokenKind::LongOption | TokenKind::LongOptionWithInlineValue | TokenKind::ShortOption => {
                flush(&mut current, &mut out);

                let (resolved, name) = match token.kind {
                    TokenKind::ShortOption => {
                        let Some(short) = token.value.chars().next() else {
                            unreachable!("internal error - short option token without a character")
                        };
                        (schema.resolve_short(short), OptionName::short(short))
                    }
                    _ => (
                        schema.resolve_long(&token.value),
                        OptionName::long(token.value.clone()),
                    ),
                };

                match resolved {
                    Some(id) => {
                        let descriptor = schema.descriptor(id);
                        if triggered_set.is_none() {
                            triggered_set.clone_from(&descriptor.parameter_set);
                        }

                        #[cfg(feature = "tracing_debug")]
                        debug!("capturing '{}'", descriptor.long_name());

                        current = Some(Capture {
                            id,
                            name: descriptor.option_name(),
                            values: Vec::default(),
                            value_expected: token.kind == TokenKind::LongOptionWithInlineValue,
                        });
                    }
                    None => {
                        if help_aliases.contains(&token.value) {
                            out.push(Err(Error::HelpRequested));
                        } else {
                            out.push(Err(Error::UnknownOption { option: name }));
                        }
                    }
                }
            }
            TokenKind::Value => match current.as_mut() {
                Some(capture) => {
                    capture.values.push(token.value.clone());

                    if capture.value_expected || !schema.strategy(capture.id).is_multi() {
                        capture.value_expected = false;
                        flush(&mut current, &mut out);
                    }
                }
                None => {
                    let list = schema.positions(triggered_set.as_deref());

                    if position < list.len() {
                        let id = list[position];
                        position += 1;
                        let name = schema.descriptor(id).option_name();

                        if position == list.len() && schema.strategy(id).is_multi() {
                            // The final slot's multi-value descriptor is a catch-all.
                            current = Some(Capture {
                                id,
                                name,
                                values: vec![token.value.clone()],
                                value_expected: false,
                            });
                        } else {
                            out.push(Ok(Binding {
                                id,
                                name,
                                values: vec![token.value.clone()],
                            }));
                        }
                    } else {
                        out.push(Err(Error::UnexpectedValue {
                            value: token.value.clone(),
                        }));
                    }
                }
            },
        }
    }

    flush(&mut current, &mut out);

    #[cfg(feature = "tracing_debug")]
    debug!("bound {} token(s) into {} event(s)", tokens.len(), out.len());

    out
}

fn flush(current: &mut Option<Capture>, out: &mut Vec<Result<Binding, Error>>) {
    if let Some(capture) = current.take() {
        if capture.value_expected && capture.values.is_empty() {
            out.push(Err(Error::MissingValue {
                option: capture.name.clone(),
            }));
        }

        out.push(Ok(Binding {
            id: capture.id,
            name: capture.name,
            values: capture.values,
        }));
    }
}
