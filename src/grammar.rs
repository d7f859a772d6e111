use std::collections::HashMap;

use rand::Rng;

use crate::generator;
use crate::symbol::SymbolId;
use crate::utils::{GrammarError, Result};

/// A single production alternative in Chomsky normal form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Binary production `parent -> left right`.
    Intermediate { left: SymbolId, right: SymbolId },
    /// Unary production `parent -> child`, where `child` is a terminal.
    Terminal { child: SymbolId },
}

/// A context-free grammar restricted to Chomsky normal form.
///
/// A `PhraseStructure` owns a symbol table (identity to terminal or
/// non-terminal classification) and a rule store (parent to alternative
/// productions). Rules keyed by a parent of `None` are the start rules,
/// the entry point for generation. The grammar is built incrementally:
/// symbols first, then rules referencing those symbols. There is no
/// deletion API and an empty grammar cannot generate.
///
/// A fully built grammar is read-only through the generation methods and
/// can be shared across threads behind an `Arc`; mutation is not
/// synchronized against concurrent readers.
///
/// # Example
///
/// ```rust
/// use cnf_gen::PhraseStructure;
///
/// let mut grammar = PhraseStructure::new();
/// grammar.add_symbol("H", false).unwrap();
/// grammar.add_symbol("W", false).unwrap();
/// grammar.add_symbol("hello", true).unwrap();
/// grammar.add_symbol("world", true).unwrap();
/// grammar.add_intermediate_rule(None, "H", "W").unwrap();
/// grammar.add_terminal_rule(Some("H".into()), "hello").unwrap();
/// grammar.add_terminal_rule(Some("W".into()), "world").unwrap();
///
/// let words = grammar.generate_symbol_string(2, 0).unwrap();
/// assert_eq!(words.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PhraseStructure {
    /// Symbol table: identity to is_terminal.
    symbols: HashMap<SymbolId, bool>,
    /// Rule store for named parents.
    rules: HashMap<SymbolId, Vec<Rule>>,
    /// Alternatives under the distinguished `None` parent.
    start_rules: Vec<Rule>,
}

impl PhraseStructure {
    /// Create a new empty grammar.
    pub fn new() -> Self {
        PhraseStructure::default()
    }

    /// Register `identity` with a terminal/non-terminal classification.
    ///
    /// Re-registering an identity with the same classification is a no-op;
    /// re-registering with the other classification fails with
    /// [`GrammarError::DuplicateSymbol`].
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

    /// Whether `identity` has been registered. Never fails.
    pub fn is_registered(&self, identity: &SymbolId) -> bool {
        self.symbols.contains_key(identity)
    }

    /// Whether `identity` is classified terminal.
    pub fn classify(&self, identity: &SymbolId) -> Result<bool> {
        self.symbols
            .get(identity)
            .copied()
            .ok_or_else(|| GrammarError::UnknownSymbol(identity.to_string()))
    }

    /// Add the binary production `parent -> left right`.
    ///
    /// A `parent` of `None` adds a start rule. Both `left` and `right` must
    /// already be registered, and a present `parent` must be a registered
    /// non-terminal. Re-adding an identical rule leaves the alternative set
    /// unchanged.
    pub fn add_intermediate_rule(
        &mut self,
        parent: Option<SymbolId>,
        left: impl Into<SymbolId>,
        right: impl Into<SymbolId>,
    ) -> Result<()> {
        let (left, right) = (left.into(), right.into());
        self.classify(&left)?;
        self.classify(&right)?;
        if let Some(parent) = &parent {
            self.require_nonterminal(parent)?;
        }
        self.push_rule(parent, Rule::Intermediate { left, right });
        Ok(())
    }

    /// Add the unary production `parent -> child`.
    ///
    /// A `parent` of `None` adds a start rule that terminal-expands
    /// directly, which is how a grammar produces a length-1 sequence.
    /// `child` must be registered terminal; a present `parent` must be a
    /// registered non-terminal. Re-adding an identical rule leaves the
    /// alternative set unchanged.
    pub fn add_terminal_rule(
        &mut self,
        parent: Option<SymbolId>,
        child: impl Into<SymbolId>,
    ) -> Result<()> {
        let child = child.into();
        if !self.classify(&child)? {
            return Err(GrammarError::InvalidChildClassification(child.to_string()));
        }
        if let Some(parent) = &parent {
            self.require_nonterminal(parent)?;
        }
        self.push_rule(parent, Rule::Terminal { child });
        Ok(())
    }

    /// All alternatives registered under `parent`; empty when the parent has
    /// no productions. `None` selects the start rules.
    pub fn alternatives_for(&self, parent: Option<&SymbolId>) -> &[Rule] {
        match parent {
            None => &self.start_rules,
            Some(parent) => self.rules.get(parent).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// The alternatives under the distinguished `None` parent.
    pub fn start_rules(&self) -> &[Rule] {
        &self.start_rules
    }

    /// Iterate every `(parent, rule)` pair in the store, start rules first.
    pub fn rules(&self) -> impl Iterator<Item = (Option<&SymbolId>, &Rule)> {
        self.start_rules.iter().map(|rule| (None, rule)).chain(
            self.rules
                .iter()
                .flat_map(|(parent, alternatives)| {
                    alternatives.iter().map(move |rule| (Some(parent), rule))
                }),
        )
    }

    /// Iterate every registered `(identity, is_terminal)` pair.
    pub fn symbols(&self) -> impl Iterator<Item = (&SymbolId, bool)> {
        self.symbols.iter().map(|(identity, &is_terminal)| (identity, is_terminal))
    }

    /// Generate a random terminal-symbol sequence from the start rules.
    ///
    /// `depth` bounds the height of the derivation tree, consumed once per
    /// binary expansion level rather than per emitted symbol. `bruteforce`
    /// is the number of retries granted after the first attempt, so a value
    /// of 0 means exactly one attempt. Fails with
    /// [`GrammarError::NoStartRule`] when no start rule exists and with
    /// [`GrammarError::GenerationExhausted`] once the whole attempt budget
    /// is spent without deriving a terminal sequence. No partial sequence is
    /// ever returned.
    pub fn generate_symbol_string(&self, depth: usize, bruteforce: usize) -> Result<Vec<SymbolId>> {
        self.generate_symbol_string_with_rng(depth, bruteforce, &mut rand::thread_rng())
    }

    /// Like [`generate_symbol_string`](Self::generate_symbol_string), with a
    /// caller-supplied random source. A seeded rng makes the output
    /// reproducible: the same seed, grammar, and budgets derive the same
    /// sequence.
    pub fn generate_symbol_string_with_rng<R: Rng + ?Sized>(
        &self,
        depth: usize,
        bruteforce: usize,
        rng: &mut R,
    ) -> Result<Vec<SymbolId>> {
        generator::generate(self, depth, bruteforce, rng)
    }

    fn require_nonterminal(&self, parent: &SymbolId) -> Result<()> {
        if self.classify(parent)? {
            return Err(GrammarError::InvalidParentClassification(parent.to_string()));
        }
        Ok(())
    }

    // Identical re-adds keep the alternative counts stable.
    fn push_rule(&mut self, parent: Option<SymbolId>, rule: Rule) {
        let alternatives = match parent {
            None => &mut self.start_rules,
            Some(parent) => self.rules.entry(parent).or_default(),
        };
        if !alternatives.contains(&rule) {
            alternatives.push(rule);
        }
    }
}

/// Builder for constructing [`PhraseStructure`] instances.
///
/// The first failing operation is remembered and returned by
/// [`build`](Self::build); subsequent calls on a failed builder are no-ops.
///
/// # Example
///
/// ```rust
/// use cnf_gen::PhraseStructureBuilder;
///
/// let grammar = PhraseStructureBuilder::new()
///     .nonterminal("A")
///     .terminal("a")
///     .intermediate_rule(None, "A", "A")
///     .terminal_rule(Some("A".into()), "a")
///     .build()
///     .unwrap();
///
/// assert_eq!(grammar.start_rules().len(), 1);
/// ```
#[derive(Debug)]
pub struct PhraseStructureBuilder {
    state: Result<PhraseStructure>,
}

impl Default for PhraseStructureBuilder {
    fn default() -> Self {
        PhraseStructureBuilder {
            state: Ok(PhraseStructure::new()),
        }
    }
}

impl PhraseStructureBuilder {
    /// Create a builder over an empty grammar.
    pub fn new() -> Self {
        PhraseStructureBuilder::default()
    }

    /// Register a symbol.
    pub fn symbol(mut self, identity: impl Into<SymbolId>, is_terminal: bool) -> Self {
        self.apply(|grammar| grammar.add_symbol(identity, is_terminal));
        self
    }

    /// Register a terminal symbol.
    pub fn terminal(self, identity: impl Into<SymbolId>) -> Self {
        self.symbol(identity, true)
    }

    /// Register a non-terminal symbol.
    pub fn nonterminal(self, identity: impl Into<SymbolId>) -> Self {
        self.symbol(identity, false)
    }

    /// Add a binary production.
    pub fn intermediate_rule(
        mut self,
        parent: Option<SymbolId>,
        left: impl Into<SymbolId>,
        right: impl Into<SymbolId>,
    ) -> Self {
        self.apply(|grammar| grammar.add_intermediate_rule(parent, left, right));
        self
    }

    /// Add a unary terminal production.
    pub fn terminal_rule(mut self, parent: Option<SymbolId>, child: impl Into<SymbolId>) -> Self {
        self.apply(|grammar| grammar.add_terminal_rule(parent, child));
        self
    }

    /// Finish building, surfacing the first error encountered.
    pub fn build(self) -> Result<PhraseStructure> {
        self.state
    }

    fn apply(&mut self, op: impl FnOnce(&mut PhraseStructure) -> Result<()>) {
        if let Ok(grammar) = &mut self.state {
            if let Err(err) = op(grammar) {
                self.state = Err(err);
            }
        }
    }
}
