//! The expansion engine behind
//! [`PhraseStructure::generate_symbol_string`](crate::PhraseStructure::generate_symbol_string).
//!
//! Expansion walks the rule store with an explicit work stack and an explicit
//! depth counter, so a cyclic ruleset given a huge depth fails with
//! [`GrammarError::GenerationExhausted`] instead of overflowing the call
//! stack. The retry ("bruteforce") loop lives here at the top level only:
//! a dead end anywhere in an attempt abandons the whole attempt, and the
//! next attempt restarts from the start rules with fresh random choices.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::grammar::{PhraseStructure, Rule};
use crate::symbol::SymbolId;
use crate::utils::{GrammarError, Result};

/// Budgets handed unchanged to nested grammars: every nested expansion runs
/// with the caller's full depth and bruteforce allowance.
#[derive(Debug, Clone, Copy)]
struct Limits {
    depth: usize,
    bruteforce: usize,
}

/// A branch-local failure: depth ran out, or a non-terminal had no
/// alternatives. Recovered by the retry loop, never surfaced to callers.
struct DeadEnd;

enum Task<'a> {
    /// Pick and apply one alternative for this parent. `None` is the start key.
    Expand(Option<&'a SymbolId>, usize),
    /// Emit a symbol, or queue its expansion if it is a non-terminal.
    Place(&'a SymbolId, usize),
}

pub(crate) fn generate<R: Rng + ?Sized>(
    grammar: &PhraseStructure,
    depth: usize,
    bruteforce: usize,
    rng: &mut R,
) -> Result<Vec<SymbolId>> {
    if grammar.start_rules().is_empty() {
        return Err(GrammarError::NoStartRule);
    }
    let limits = Limits { depth, bruteforce };
    let attempts = bruteforce.saturating_add(1);
    for _ in 0..attempts {
        if let Ok(sequence) = attempt(grammar, limits, rng) {
            return Ok(sequence);
        }
    }
    Err(GrammarError::GenerationExhausted { attempts })
}

/// One all-or-nothing derivation attempt.
fn attempt<'a, R: Rng + ?Sized>(
    grammar: &'a PhraseStructure,
    limits: Limits,
    rng: &mut R,
) -> std::result::Result<Vec<SymbolId>, DeadEnd> {
    let mut output = Vec::new();
    let mut stack = vec![Task::Expand(None, limits.depth)];

    while let Some(task) = stack.pop() {
        match task {
            Task::Expand(parent, depth) => {
                let rule = grammar
                    .alternatives_for(parent)
                    .choose(rng)
                    .ok_or(DeadEnd)?;
                match rule {
                    Rule::Terminal { child } => stack.push(Task::Place(child, depth)),
                    Rule::Intermediate { left, right } => {
                        // Depth pays for binary expansion levels, not for
                        // emitted symbols, so it bounds the derivation
                        // tree's height rather than the output length.
                        let remaining = depth.checked_sub(1).ok_or(DeadEnd)?;
                        // Right below left: left-to-right production order.
                        stack.push(Task::Place(right, remaining));
                        stack.push(Task::Place(left, remaining));
                    }
                }
            }
            Task::Place(symbol, depth) => {
                if let SymbolId::Grammar(nested) = symbol {
                    // A nested grammar runs its own retry loop with fresh
                    // budgets; any failure inside it is a dead end here.
                    let spliced =
                        generate(nested, limits.depth, limits.bruteforce, rng)
                            .map_err(|_| DeadEnd)?;
                    output.extend(spliced);
                } else if grammar.classify(symbol).map_err(|_| DeadEnd)? {
                    output.push(symbol.clone());
                } else {
                    stack.push(Task::Expand(Some(symbol), depth));
                }
            }
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use crate::grammar::PhraseStructure;
    use crate::symbol::SymbolId;
    use crate::utils::GrammarError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// Start rule (None, A, A), intermediate rule (A, A, A), terminal rule
    /// (A, a).
    fn recursive_grammar() -> PhraseStructure {
        let mut grammar = PhraseStructure::new();
        grammar.add_symbol("A", false).unwrap();
        grammar.add_symbol("a", true).unwrap();
        grammar.add_intermediate_rule(None, "A", "A").unwrap();
        grammar
            .add_intermediate_rule(Some("A".into()), "A", "A")
            .unwrap();
        grammar.add_terminal_rule(Some("A".into()), "a").unwrap();
        grammar
    }

    #[test]
    fn test_empty_grammar_has_no_start_rule() {
        let grammar = PhraseStructure::new();
        let err = grammar.generate_symbol_string(8, 8).unwrap_err();
        assert!(matches!(err, GrammarError::NoStartRule));
    }

    #[test]
    fn test_start_terminal_rule_yields_length_one() {
        let mut grammar = PhraseStructure::new();
        grammar.add_symbol("a", true).unwrap();
        grammar.add_terminal_rule(None, "a").unwrap();

        // Terminal expansion consumes no depth, so even depth 0 succeeds.
        let words = grammar.generate_symbol_string(0, 0).unwrap();
        assert_eq!(words, vec![SymbolId::from("a")]);
    }

    #[test]
    fn test_recursive_grammar_at_depth_one() {
        let grammar = recursive_grammar();
        let mut rng = StdRng::seed_from_u64(7);

        // At depth 1 the only derivation is the start rule resolving
        // directly to two terminal expansions of A. Each attempt picks the
        // terminal alternative for both children with probability 1/4, so
        // a budget of 1000 retries fails with probability well under 1e-100.
        let words = grammar
            .generate_symbol_string_with_rng(1, 1000, &mut rng)
            .unwrap();
        assert_eq!(words, vec![SymbolId::from("a"), SymbolId::from("a")]);
    }

    #[test]
    fn test_recursive_grammar_at_depth_zero_always_fails() {
        let grammar = recursive_grammar();
        let mut rng = StdRng::seed_from_u64(7);

        let err = grammar
            .generate_symbol_string_with_rng(0, 50, &mut rng)
            .unwrap_err();
        assert!(matches!(
            err,
            GrammarError::GenerationExhausted { attempts: 51 }
        ));
    }

    #[test]
    fn test_bruteforce_zero_means_single_attempt() {
        // Cyclic non-terminal-only productions: no derivation terminates.
        let mut grammar = PhraseStructure::new();
        grammar.add_symbol("A", false).unwrap();
        grammar.add_intermediate_rule(None, "A", "A").unwrap();
        grammar
            .add_intermediate_rule(Some("A".into()), "A", "A")
            .unwrap();

        let err = grammar.generate_symbol_string(64, 0).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::GenerationExhausted { attempts: 1 }
        ));
    }

    #[test]
    fn test_nonterminal_without_productions_is_a_dead_end() {
        // B is registered but has no alternatives, so every attempt dies
        // there no matter how much depth is left.
        let mut grammar = PhraseStructure::new();
        grammar.add_symbol("A", false).unwrap();
        grammar.add_symbol("B", false).unwrap();
        grammar.add_symbol("a", true).unwrap();
        grammar.add_intermediate_rule(None, "A", "B").unwrap();
        grammar.add_terminal_rule(Some("A".into()), "a").unwrap();

        let err = grammar.generate_symbol_string(32, 2).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::GenerationExhausted { attempts: 3 }
        ));
    }

    #[test]
    fn test_cyclic_grammar_with_huge_depth_fails_cleanly() {
        // The depth budget is an explicit counter walked on a heap stack;
        // a self-cycle with depth left absurdly high must exhaust the retry
        // budget, not the call stack.
        let mut grammar = PhraseStructure::new();
        grammar.add_symbol("A", false).unwrap();
        grammar.add_intermediate_rule(None, "A", "A").unwrap();
        grammar
            .add_intermediate_rule(Some("A".into()), "A", "A")
            .unwrap();

        let err = grammar.generate_symbol_string(200_000, 0).unwrap_err();
        assert!(matches!(err, GrammarError::GenerationExhausted { .. }));
    }

    #[test]
    fn test_output_preserves_production_order() {
        let mut grammar = PhraseStructure::new();
        for nonterminal in ["L", "R"] {
            grammar.add_symbol(nonterminal, false).unwrap();
        }
        for terminal in ["left", "right"] {
            grammar.add_symbol(terminal, true).unwrap();
        }
        grammar.add_intermediate_rule(None, "L", "R").unwrap();
        grammar.add_terminal_rule(Some("L".into()), "left").unwrap();
        grammar
            .add_terminal_rule(Some("R".into()), "right")
            .unwrap();

        for _ in 0..20 {
            let words = grammar.generate_symbol_string(1, 0).unwrap();
            assert_eq!(
                words,
                vec![SymbolId::from("left"), SymbolId::from("right")]
            );
        }
    }

    #[test]
    fn test_output_contains_only_terminals() {
        let grammar = recursive_grammar();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..50 {
            let words = grammar
                .generate_symbol_string_with_rng(6, 100, &mut rng)
                .unwrap();
            assert!(!words.is_empty());
            for word in &words {
                assert!(grammar.classify(word).unwrap());
            }
        }
    }

    #[test]
    fn test_identical_seed_reproduces_sequence() {
        let grammar = recursive_grammar();

        let mut first = StdRng::seed_from_u64(1234);
        let mut second = StdRng::seed_from_u64(1234);

        let a = grammar
            .generate_symbol_string_with_rng(8, 100, &mut first)
            .unwrap();
        let b = grammar
            .generate_symbol_string_with_rng(8, 100, &mut second)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_nested_grammar_is_spliced() {
        let mut inner = PhraseStructure::new();
        inner.add_symbol("X", false).unwrap();
        inner.add_symbol("Y", false).unwrap();
        inner.add_symbol("x", true).unwrap();
        inner.add_symbol("y", true).unwrap();
        inner.add_intermediate_rule(None, "X", "Y").unwrap();
        inner.add_terminal_rule(Some("X".into()), "x").unwrap();
        inner.add_terminal_rule(Some("Y".into()), "y").unwrap();
        let inner = Arc::new(inner);

        let mut outer = PhraseStructure::new();
        outer.add_symbol("W", false).unwrap();
        outer.add_symbol("w", true).unwrap();
        outer.add_symbol(Arc::clone(&inner), true).unwrap();
        outer
            .add_intermediate_rule(None, "W", SymbolId::Grammar(Arc::clone(&inner)))
            .unwrap();
        outer.add_terminal_rule(Some("W".into()), "w").unwrap();

        let words = outer.generate_symbol_string(4, 8).unwrap();
        assert_eq!(
            words,
            vec![
                SymbolId::from("w"),
                SymbolId::from("x"),
                SymbolId::from("y")
            ]
        );
    }

    #[test]
    fn test_nested_grammar_failure_is_a_dead_end() {
        // The nested grammar has no start rule, so every expansion through
        // it fails and the outer budget is what runs out.
        let inner = Arc::new(PhraseStructure::new());

        let mut outer = PhraseStructure::new();
        outer.add_symbol(Arc::clone(&inner), true).unwrap();
        outer
            .add_terminal_rule(None, SymbolId::Grammar(inner))
            .unwrap();

        let err = outer.generate_symbol_string(4, 3).unwrap_err();
        assert!(matches!(
            err,
            GrammarError::GenerationExhausted { attempts: 4 }
        ));
    }
}
