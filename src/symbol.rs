use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::grammar::PhraseStructure;

/// The identity of a symbol in a grammar.
///
/// Identities are a closed set of variants rather than an open trait object
/// so that equality and hashing stay well-defined. Two symbols are equal iff
/// their identity values are equal; a `Grammar` identity compares by
/// reference, so two of them are equal only when they point at the same
/// [`PhraseStructure`] allocation.
#[derive(Debug, Clone)]
pub enum SymbolId {
    /// A textual symbol such as `"NP"` or `"dog"`.
    Text(String),
    /// A numeric symbol. Negative numbers are reserved for symbols
    /// synthesized during BNF-to-CNF conversion.
    Number(i64),
    /// A whole grammar used as a single symbol of another grammar. The
    /// generator expands it by running generation on the nested grammar and
    /// splicing the result into the output sequence.
    Grammar(Arc<PhraseStructure>),
}

impl PartialEq for SymbolId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (SymbolId::Text(a), SymbolId::Text(b)) => a == b,
            (SymbolId::Number(a), SymbolId::Number(b)) => a == b,
            (SymbolId::Grammar(a), SymbolId::Grammar(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for SymbolId {}

impl Hash for SymbolId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            SymbolId::Text(text) => text.hash(state),
            SymbolId::Number(number) => number.hash(state),
            SymbolId::Grammar(grammar) => (Arc::as_ptr(grammar) as usize).hash(state),
        }
    }
}

impl fmt::Display for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolId::Text(text) => write!(f, "{}", text),
            SymbolId::Number(number) => write!(f, "#{}", number),
            SymbolId::Grammar(grammar) => write!(f, "<grammar {:p}>", Arc::as_ptr(grammar)),
        }
    }
}

impl From<&str> for SymbolId {
    fn from(text: &str) -> Self {
        SymbolId::Text(text.to_string())
    }
}

impl From<String> for SymbolId {
    fn from(text: String) -> Self {
        SymbolId::Text(text)
    }
}

impl From<i64> for SymbolId {
    fn from(number: i64) -> Self {
        SymbolId::Number(number)
    }
}

impl From<Arc<PhraseStructure>> for SymbolId {
    fn from(grammar: Arc<PhraseStructure>) -> Self {
        SymbolId::Grammar(grammar)
    }
}
