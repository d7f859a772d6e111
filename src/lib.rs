//! cnf-gen is a Chomsky-normal-form grammar engine.
//!
//! Grammars are built symbol-by-symbol and rule-by-rule: every production is
//! either a binary rule (a non-terminal expands to exactly two symbols) or a
//! terminal rule (a non-terminal expands to one terminal). A built grammar
//! generates random terminal-symbol sequences, bounded by a recursion depth
//! limit and a retry ("bruteforce") budget, so even a grammar with an
//! infinite derivation space either produces a sequence or fails with an
//! explicit error.
//!
//! Symbol identities are not limited to text: a whole grammar can be
//! registered as a symbol of another grammar, and grammars in plain
//! Backus-Naur form can be converted to CNF with [`Bnf::to_cnf`].
//!
//! # Example
//!
//! ```rust
//! use cnf_gen::{PhraseStructure, SymbolId};
//!
//! let mut grammar = PhraseStructure::new();
//! grammar.add_symbol("H", false).unwrap();
//! grammar.add_symbol("W", false).unwrap();
//! grammar.add_symbol("hello", true).unwrap();
//! grammar.add_symbol("world", true).unwrap();
//! grammar.add_intermediate_rule(None, "H", "W").unwrap();
//! grammar.add_terminal_rule(Some("H".into()), "hello").unwrap();
//! grammar.add_terminal_rule(Some("W".into()), "world").unwrap();
//!
//! let words = grammar.generate_symbol_string(4, 8).unwrap();
//! assert_eq!(words, vec![SymbolId::from("hello"), SymbolId::from("world")]);
//! ```

pub mod bnf;
mod generator;
pub mod grammar;
pub mod symbol;
pub mod utils;

pub use bnf::Bnf;
pub use grammar::{PhraseStructure, PhraseStructureBuilder, Rule};
pub use symbol::SymbolId;
pub use utils::{GrammarError, Result};
