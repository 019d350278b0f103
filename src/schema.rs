use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use crate::model::OptionDescriptor;
use crate::value::Strategy;

/// A fatal schema construction error.
///
/// Unlike parse-time [Error](crate::Error)s, these abort construction; a
/// schema is either fully valid or does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A descriptor was declared with an empty long name.
    #[error("option long names cannot be empty.")]
    EmptyLongName,

    /// Two descriptors share a long name.
    #[error("duplicate option long name '{long}'.")]
    DuplicateLongName {
        /// The repeated name.
        long: String,
    },

    /// Two descriptors share a short name.
    #[error("duplicate option short name '{short}'.")]
    DuplicateShortName {
        /// The repeated character.
        short: char,
    },

    /// Two descriptors claim the same position within one effective ordering.
    #[error("options '{first}' and '{second}' collide at position {position}.")]
    PositionCollision {
        /// The long name of the earlier claimant.
        first: String,
        /// The long name of the later claimant.
        second: String,
        /// The contested position.
        position: usize,
    },

    /// A collection type was declared inside another collection (or a pair).
    #[error("option '{long}' declares a collection nested inside another collection.")]
    NestedCollection {
        /// The offending descriptor's long name.
        long: String,
    },

    /// A default value does not match the shape of the declared type.
    #[error("the default value of option '{long}' does not match its declared type.")]
    DefaultMismatch {
        /// The offending descriptor's long name.
        long: String,
    },
}

/// The immutable catalog of option descriptors, indexed for binding.
///
/// Construction resolves every descriptor's deserialization strategy and
/// verifies the catalog invariants up front; a constructed schema cannot fail
/// structurally during a parse.  Schemas are freely shareable across threads
/// and parse calls.
#[derive(Debug)]
pub struct Schema {
    descriptors: Vec<OptionDescriptor>,
    strategies: Vec<Strategy>,
    by_long: HashMap<String, usize>,
    by_short: HashMap<char, usize>,
    by_position: HashMap<Option<String>, Vec<usize>>,
}

impl Schema {
    /// Build a schema from the given descriptors.
    pub fn new(descriptors: Vec<OptionDescriptor>) -> Result<Self, SchemaError> {
        let mut by_long: HashMap<String, usize> = HashMap::default();
        let mut by_short: HashMap<char, usize> = HashMap::default();
        let mut strategies = Vec::with_capacity(descriptors.len());

        for (id, descriptor) in descriptors.iter().enumerate() {
            if descriptor.long.is_empty() {
                return Err(SchemaError::EmptyLongName);
            }

            if by_long.insert(descriptor.long.clone(), id).is_some() {
                return Err(SchemaError::DuplicateLongName {
                    long: descriptor.long.clone(),
                });
            }

            if let Some(short) = descriptor.short {
                if by_short.insert(short, id).is_some() {
                    return Err(SchemaError::DuplicateShortName { short });
                }
            }

            let strategy = Strategy::resolve(&descriptor.value_type).map_err(|()| {
                SchemaError::NestedCollection {
                    long: descriptor.long.clone(),
                }
            })?;

            if let Some(default) = &descriptor.default {
                if !strategy.admits(default) {
                    return Err(SchemaError::DefaultMismatch {
                        long: descriptor.long.clone(),
                    });
                }
            }

            strategies.push(strategy);
        }

        let sets: BTreeSet<&String> = descriptors
            .iter()
            .filter_map(|d| d.parameter_set.as_ref())
            .collect();

        let mut by_position = HashMap::default();
        by_position.insert(None, ordering(&descriptors, None)?);

        for set in sets {
            by_position.insert(Some(set.clone()), ordering(&descriptors, Some(set))?);
        }

        Ok(Self {
            descriptors,
            strategies,
            by_long,
            by_short,
            by_position,
        })
    }

    /// The descriptors, in declaration order.
    pub fn descriptors(&self) -> &[OptionDescriptor] {
        &self.descriptors
    }

    pub(crate) fn descriptor(&self, id: usize) -> &OptionDescriptor {
        &self.descriptors[id]
    }

    pub(crate) fn strategy(&self, id: usize) -> &Strategy {
        &self.strategies[id]
    }

    pub(crate) fn resolve_long(&self, name: &str) -> Option<usize> {
        self.by_long.get(name).copied()
    }

    pub(crate) fn resolve_short(&self, name: char) -> Option<usize> {
        self.by_short.get(&name).copied()
    }

    /// The position-ordered descriptor ids in effect for the given parameter set.
    pub(crate) fn positions(&self, set: Option<&str>) -> &[usize] {
        self.by_position
            .get(&set.map(String::from))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// The effective positional ordering for one parameter set: descriptors
/// belonging to no set plus the set's own, sorted by declared position.
fn ordering(
    descriptors: &[OptionDescriptor],
    set: Option<&String>,
) -> Result<Vec<usize>, SchemaError> {
    let mut positioned: Vec<(usize, usize)> = descriptors
        .iter()
        .enumerate()
        .filter(|(_, d)| d.parameter_set.is_none() || d.parameter_set.as_ref() == set)
        .filter_map(|(id, d)| d.position.map(|position| (position, id)))
        .collect();
    positioned.sort();

    for window in positioned.windows(2) {
        let (position, first) = window[0];
        let (second_position, second) = window[1];
        if position == second_position {
            return Err(SchemaError::PositionCollision {
                first: descriptors[first].long.clone(),
                second: descriptors[second].long.clone(),
                position,
            });
        }
    }

    Ok(positioned.into_iter().map(|(_, id)| id).collect())
}
