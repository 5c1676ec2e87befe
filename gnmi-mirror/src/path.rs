/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! gNMI data paths and their `/a/b[k=v]/c` string form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use thiserror::Error;

/// One step of a [`Path`]: a node name plus, for list entries, its key values.
///
/// Keys keep insertion order; equality ignores it.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PathElement {
    pub name: String,
    pub keys: IndexMap<String, String>,
}

impl PathElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: IndexMap::new(),
        }
    }

    /// Adds (or replaces) one key of a list entry element.
    #[must_use]
    pub fn with_key(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(field.into(), value.into());
        self
    }

    /// Whether this element addresses a list entry.
    pub fn is_keyed(&self) -> bool {
        !self.keys.is_empty()
    }
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        for (field, value) in &self.keys {
            write!(f, "[{field}=")?;
            for ch in value.chars() {
                if ch == ']' || ch == '\\' {
                    f.write_str("\\")?;
                }
                write!(f, "{ch}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Root-relative sequence of [`PathElement`]s. The empty path is the root `/`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_root(&self) -> bool {
        self.elements.is_empty()
    }

    /// Concatenates `prefix` (position-wise) in front of this path.
    #[must_use]
    pub fn prefixed(&self, prefix: Option<&Path>) -> Path {
        match prefix {
            Some(prefix) if !prefix.is_root() => Path {
                elements: prefix
                    .elements
                    .iter()
                    .chain(self.elements.iter())
                    .cloned()
                    .collect(),
            },
            _ => self.clone(),
        }
    }

    /// Appends one element.
    #[must_use]
    pub fn child(mut self, element: PathElement) -> Path {
        self.elements.push(element);
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.elements.is_empty() {
            return f.write_str("/");
        }
        for element in &self.elements {
            write!(f, "/{element}")?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PathParseError {
    #[error("empty element in path '{input}'")]
    EmptyElement { input: String },
    #[error("unterminated key in path '{input}'")]
    UnterminatedKey { input: String },
    #[error("key without a value in path '{input}'")]
    MissingKeyValue { input: String },
    #[error("key without a name in path '{input}'")]
    MissingKeyName { input: String },
    #[error("unexpected '{found}' after a key in path '{input}'")]
    UnexpectedCharacter { input: String, found: char },
}

impl FromStr for Path {
    type Err = PathParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        let body = trimmed.strip_prefix('/').unwrap_or(trimmed);
        let body = body.strip_suffix('/').unwrap_or(body);
        if body.is_empty() {
            return Ok(Path::root());
        }

        let mut elements = Vec::new();
        let mut chars = body.chars().peekable();
        loop {
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch == '/' || ch == '[' {
                    break;
                }
                name.push(ch);
                chars.next();
            }
            if name.is_empty() {
                return Err(PathParseError::EmptyElement {
                    input: input.to_string(),
                });
            }

            let mut element = PathElement::new(name);
            while chars.peek() == Some(&'[') {
                chars.next();
                let (field, value) = parse_key(&mut chars, input)?;
                element.keys.insert(field, value);
            }
            elements.push(element);

            match chars.next() {
                None => break,
                Some('/') => continue,
                Some(found) => {
                    return Err(PathParseError::UnexpectedCharacter {
                        input: input.to_string(),
                        found,
                    })
                }
            }
        }

        Ok(Path { elements })
    }
}

fn parse_key(
    chars: &mut Peekable<Chars<'_>>,
    input: &str,
) -> Result<(String, String), PathParseError> {
    let unterminated = || PathParseError::UnterminatedKey {
        input: input.to_string(),
    };

    let mut field = String::new();
    loop {
        match chars.next() {
            None => return Err(unterminated()),
            Some('=') => break,
            Some(']') => {
                return Err(PathParseError::MissingKeyValue {
                    input: input.to_string(),
                })
            }
            Some(ch) => field.push(ch),
        }
    }
    if field.is_empty() {
        return Err(PathParseError::MissingKeyName {
            input: input.to_string(),
        });
    }

    let mut value = String::new();
    loop {
        match chars.next() {
            None => return Err(unterminated()),
            Some('\\') => value.push(chars.next().ok_or_else(unterminated)?),
            Some(']') => break,
            Some(ch) => value.push(ch),
        }
    }

    Ok((field, value))
}

impl TryFrom<String> for Path {
    type Error = PathParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}
