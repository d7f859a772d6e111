//! Backus-Naur-form grammars and their conversion to Chomsky normal form.
//!
//! [`Bnf`] is the construction surface for grammars whose productions have
//! arbitrary arity; [`Bnf::to_cnf`] rewrites the ruleset with the
//! START/TERM/BIN/UNIT pipeline and emits a [`PhraseStructure`] ready for
//! generation. Epsilon productions are rejected at insertion, so the DEL
//! step of the textbook conversion is not needed.

use std::collections::{HashMap, HashSet};

use crate::grammar::PhraseStructure;
use crate::symbol::SymbolId;
use crate::utils::{GrammarError, Result};

/// A grammar in Backus-Naur form: one non-terminal produces a sequence of
/// one or more symbols.
///
/// A fresh `Bnf` holds a single distinguished start symbol,
/// [`SymbolId::Number`]`(0)`, already registered as a non-terminal. Negative
/// `Number` identities are reserved for symbols synthesized during
/// conversion; avoid them for user symbols.
///
/// # Example
///
/// ```rust
/// use cnf_gen::{Bnf, SymbolId};
///
/// let mut bnf = Bnf::new();
/// bnf.add_intermediate_symbol("Greeting").unwrap();
/// bnf.add_terminal_symbol("hello").unwrap();
/// bnf.add_terminal_symbol("world").unwrap();
/// bnf.add_start_rule(vec!["Greeting".into()]).unwrap();
/// bnf.add_rule("Greeting", vec!["hello".into(), "world".into()]).unwrap();
///
/// let grammar = bnf.to_cnf().unwrap();
/// let words = grammar.generate_symbol_string(8, 8).unwrap();
/// assert_eq!(words, vec![SymbolId::from("hello"), SymbolId::from("world")]);
/// ```
#[derive(Debug, Clone)]
pub struct Bnf {
    /// Symbol table: identity to is_terminal.
    symbols: HashMap<SymbolId, bool>,
    /// Productions per non-terminal. A set, so duplicate adds are no-ops.
    rules: HashMap<SymbolId, HashSet<Vec<SymbolId>>>,
    start: SymbolId,
    /// Next synthetic identity, counting down from -1.
    fresh: i64,
}

impl Default for Bnf {
    fn default() -> Self {
        Bnf::new()
    }
}

impl Bnf {
    /// Create an empty BNF grammar holding only the start symbol.
    pub fn new() -> Self {
        let start = SymbolId::Number(0);
        let mut symbols = HashMap::new();
        symbols.insert(start.clone(), false);
        Bnf {
            symbols,
            rules: HashMap::new(),
            start,
            fresh: -1,
        }
    }

    /// The distinguished start symbol.
    pub fn start_symbol(&self) -> &SymbolId {
        &self.start
    }

    /// Register `identity` with a terminal/non-terminal classification.
    /// Same duplicate semantics as [`PhraseStructure::add_symbol`]:
    /// identical re-registration is a no-op, a conflicting one fails.
    pub fn add_symbol(&mut self, identity: impl Into<SymbolId>, is_terminal: bool) -> Result<()> {
        let identity = identity.into();
        match self.symbols.get(&identity) {
            Some(&registered) if registered == is_terminal => Ok(()),
            Some(_) => Err(GrammarError::DuplicateSymbol(identity.to_string())),
            None => {
                self.symbols.insert(identity, is_terminal);
                Ok(())
            }
        }
    }

    /// Register a terminal symbol.
    pub fn add_terminal_symbol(&mut self, identity: impl Into<SymbolId>) -> Result<()> {
        self.add_symbol(identity, true)
    }

    /// Register a non-terminal symbol.
    pub fn add_intermediate_symbol(&mut self, identity: impl Into<SymbolId>) -> Result<()> {
        self.add_symbol(identity, false)
    }

    /// Add the production `parent -> produces`.
    ///
    /// Fails with [`GrammarError::EmptyProduction`] for an empty right-hand
    /// side, [`GrammarError::UnknownSymbol`] for unregistered symbols, and
    /// [`GrammarError::InvalidParentClassification`] for a terminal parent.
    pub fn add_rule(&mut self, parent: impl Into<SymbolId>, produces: Vec<SymbolId>) -> Result<()> {
        let parent = parent.into();
        if produces.is_empty() {
            return Err(GrammarError::EmptyProduction(parent.to_string()));
        }
        match self.symbols.get(&parent).copied() {
            None => return Err(GrammarError::UnknownSymbol(parent.to_string())),
            Some(true) => {
                return Err(GrammarError::InvalidParentClassification(parent.to_string()))
            }
            Some(false) => {}
        }
        for symbol in &produces {
            if !self.symbols.contains_key(symbol) {
                return Err(GrammarError::UnknownSymbol(symbol.to_string()));
            }
        }
        self.rules.entry(parent).or_default().insert(produces);
        Ok(())
    }

    /// Add a production for the start symbol.
    pub fn add_start_rule(&mut self, produces: Vec<SymbolId>) -> Result<()> {
        let start = self.start.clone();
        self.add_rule(start, produces)
    }

    /// Convert to Chomsky normal form and emit a [`PhraseStructure`].
    ///
    /// The receiver is untouched; conversion works on a copy. The emitted
    /// grammar maps the (possibly replaced) start symbol to the `None` rule
    /// key of the phrase structure, so it is ready for
    /// [`PhraseStructure::generate_symbol_string`].
    pub fn to_cnf(&self) -> Result<PhraseStructure> {
        let mut work = self.clone();
        // An already-CNF ruleset can still have the start symbol on a
        // right-hand side, which the None rule key cannot express; START
        // must run even when the shape check would skip the loop.
        work.conversion_start();
        while !work.is_cnf() {
            work.conversion_start();
            work.conversion_term();
            work.conversion_bin();
            work.conversion_unit();
        }
        work.build_phrase_structure()
    }

    fn is_terminal_symbol(&self, symbol: &SymbolId) -> bool {
        self.symbols.get(symbol).copied().unwrap_or(false)
    }

    fn fresh_symbol(&mut self) -> SymbolId {
        let identity = SymbolId::Number(self.fresh);
        self.fresh -= 1;
        identity
    }

    /// Every rule is either a unary terminal production or a binary
    /// production over non-terminals.
    fn is_cnf(&self) -> bool {
        self.rules.values().flatten().all(|rule| match rule.as_slice() {
            [only] => self.is_terminal_symbol(only),
            [left, right] => {
                !self.is_terminal_symbol(left) && !self.is_terminal_symbol(right)
            }
            _ => false,
        })
    }

    fn start_occurs_on_rhs(&self) -> bool {
        self.rules
            .values()
            .flatten()
            .any(|rule| rule.contains(&self.start))
    }

    /// START: when the start symbol occurs on a right-hand side, introduce a
    /// fresh start with a unit rule to the old one.
    fn conversion_start(&mut self) {
        if !self.start_occurs_on_rhs() {
            return;
        }
        let fresh = self.fresh_symbol();
        self.symbols.insert(fresh.clone(), false);
        let old_start = std::mem::replace(&mut self.start, fresh.clone());
        self.rules.entry(fresh).or_default().insert(vec![old_start]);
    }

    /// TERM: in every rule of arity >= 2, replace each terminal with a fresh
    /// non-terminal wrapping it in a unit rule. One wrapper per terminal.
    fn conversion_term(&mut self) {
        let mut wrappers: HashMap<SymbolId, SymbolId> = HashMap::new();
        let parents: Vec<SymbolId> = self.rules.keys().cloned().collect();
        for parent in parents {
            let old_rules: Vec<Vec<SymbolId>> = match self.rules.get(&parent) {
                Some(rules) => rules.iter().cloned().collect(),
                None => continue,
            };
            let mut rewritten: HashSet<Vec<SymbolId>> = HashSet::new();
            for rule in old_rules {
                if rule.len() < 2 || !rule.iter().any(|s| self.is_terminal_symbol(s)) {
                    rewritten.insert(rule);
                    continue;
                }
                let mut replacement = Vec::with_capacity(rule.len());
                for item in rule {
                    if !self.is_terminal_symbol(&item) {
                        replacement.push(item);
                        continue;
                    }
                    let wrapper = match wrappers.get(&item) {
                        Some(wrapper) => wrapper.clone(),
                        None => {
                            let wrapper = self.fresh_symbol();
                            self.symbols.insert(wrapper.clone(), false);
                            self.rules
                                .entry(wrapper.clone())
                                .or_default()
                                .insert(vec![item.clone()]);
                            wrappers.insert(item, wrapper.clone());
                            wrapper
                        }
                    };
                    replacement.push(wrapper);
                }
                rewritten.insert(replacement);
            }
            self.rules.insert(parent, rewritten);
        }
    }

    /// BIN: split every rule of arity > 2 into a chain of binary rules over
    /// fresh carrier non-terminals.
    fn conversion_bin(&mut self) {
        let parents: Vec<SymbolId> = self.rules.keys().cloned().collect();
        for parent in parents {
            let long_rules: Vec<Vec<SymbolId>> = match self.rules.get(&parent) {
                Some(rules) => rules.iter().filter(|r| r.len() > 2).cloned().collect(),
                None => continue,
            };
            for rule in long_rules {
                if let Some(rules) = self.rules.get_mut(&parent) {
                    rules.remove(&rule);
                }
                let mut carrier = parent.clone();
                for item in &rule[..rule.len() - 2] {
                    let next = self.fresh_symbol();
                    self.symbols.insert(next.clone(), false);
                    self.rules
                        .entry(carrier)
                        .or_default()
                        .insert(vec![item.clone(), next.clone()]);
                    carrier = next;
                }
                let tail = vec![
                    rule[rule.len() - 2].clone(),
                    rule[rule.len() - 1].clone(),
                ];
                self.rules.entry(carrier).or_default().insert(tail);
            }
        }
    }

    /// UNIT: replace each parent's ruleset with the non-unit rules of its
    /// unit closure, removing `A -> B` indirections in one pass.
    fn conversion_unit(&mut self) {
        let parents: Vec<SymbolId> = self.rules.keys().cloned().collect();
        for parent in parents {
            let mut reachable = vec![parent.clone()];
            let mut seen: HashSet<SymbolId> = HashSet::new();
            seen.insert(parent.clone());
            let mut index = 0;
            while index < reachable.len() {
                let current = reachable[index].clone();
                index += 1;
                let Some(rules) = self.rules.get(&current) else {
                    continue;
                };
                for rule in rules {
                    if let [child] = rule.as_slice() {
                        if !self.is_terminal_symbol(child) && seen.insert(child.clone()) {
                            reachable.push(child.clone());
                        }
                    }
                }
            }

            let mut replacement: HashSet<Vec<SymbolId>> = HashSet::new();
            for symbol in &reachable {
                let Some(rules) = self.rules.get(symbol) else {
                    continue;
                };
                for rule in rules {
                    let unit_nonterminal = matches!(
                        rule.as_slice(),
                        [child] if !self.is_terminal_symbol(child)
                    );
                    if !unit_nonterminal {
                        replacement.insert(rule.clone());
                    }
                }
            }
            self.rules.insert(parent, replacement);
        }
    }

    /// Register the converted ruleset into a [`PhraseStructure`], mapping
    /// the start symbol to the `None` rule key.
    fn build_phrase_structure(&self) -> Result<PhraseStructure> {
        let mut phrase = PhraseStructure::new();
        for (symbol, &is_terminal) in &self.symbols {
            if *symbol != self.start {
                phrase.add_symbol(symbol.clone(), is_terminal)?;
            }
        }
        for (parent, rules) in &self.rules {
            let key = if *parent == self.start {
                None
            } else {
                Some(parent.clone())
            };
            for rule in rules {
                match rule.as_slice() {
                    [child] => phrase.add_terminal_rule(key.clone(), child.clone())?,
                    [left, right] => {
                        phrase.add_intermediate_rule(key.clone(), left.clone(), right.clone())?
                    }
                    _ => unreachable!("to_cnf only builds from a CNF ruleset"),
                }
            }
        }
        Ok(phrase)
    }
}
