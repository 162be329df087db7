//! `$(Name)` substitution in project-file values.
//!
//! Values such as `bin\$(Configuration)\` are split into literal text and
//! variable references by a small [`chumsky`] grammar:
//!
//! ```text
//! template = (variable | literal)*
//! variable = "$(" name ")"
//! literal  = any char that does not start a variable
//! ```
//!
//! Only bound variables are replaced.  Unbound references and an
//! unterminated `$(` stay in the output exactly as written.

use chumsky::prelude::*;
use std::collections::HashMap;

/// Name of the variable that carries the selected build configuration.
pub const CONFIGURATION: &str = "Configuration";

/// A fragment of a template string.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Text copied through unchanged.
    Literal(String),
    /// A `$(Name)` reference.
    Variable(String),
}

fn template_parser<'a>() -> impl Parser<'a, &'a str, Vec<Segment>, extra::Err<Simple<'a, char>>> {
    let variable = just("$(")
        .ignore_then(none_of(')').repeated().to_slice())
        .then_ignore(just(')'))
        .map(|name: &str| Segment::Variable(name.to_string()));

    let literal = any()
        .and_is(variable.clone().not())
        .repeated()
        .at_least(1)
        .to_slice()
        .map(|text: &str| Segment::Literal(text.to_string()));

    choice((variable, literal)).repeated().collect::<Vec<_>>()
}

/// Split a raw value into [`Segment`]s.
pub fn parse_template(input: &str) -> Vec<Segment> {
    template_parser()
        .parse(input)
        .into_result()
        .unwrap_or_else(|_| vec![Segment::Literal(input.to_string())])
}

/// Replace every bound `$(Name)` reference in `raw`.
pub fn substitute(raw: &str, vars: &HashMap<String, String>) -> String {
    let mut result = String::with_capacity(raw.len());
    for segment in parse_template(raw) {
        match segment {
            Segment::Literal(text) => result.push_str(&text),
            Segment::Variable(name) => match vars.get(&name) {
                Some(value) => result.push_str(value),
                None => {
                    result.push_str("$(");
                    result.push_str(&name);
                    result.push(')');
                }
            },
        }
    }
    result
}

/// Variable map binding only `$(Configuration)`.
pub fn configuration_vars(configuration: &str) -> HashMap<String, String> {
    HashMap::from([(CONFIGURATION.to_string(), configuration.to_string())])
}
