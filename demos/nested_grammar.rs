use cnf_gen::{PhraseStructure, PhraseStructureBuilder, SymbolId};
use std::error::Error;
use std::sync::Arc;

/// A noun-phrase grammar reused as a single symbol of a sentence grammar.
fn noun_phrase() -> Result<PhraseStructure, Box<dyn Error>> {
    let grammar = PhraseStructureBuilder::new()
        .nonterminal("Det")
        .nonterminal("N")
        .terminal("the")
        .terminal("a")
        .terminal("dog")
        .terminal("compiler")
        .terminal("grammar")
        .intermediate_rule(None, "Det", "N")
        .terminal_rule(Some("Det".into()), "the")
        .terminal_rule(Some("Det".into()), "a")
        .terminal_rule(Some("N".into()), "dog")
        .terminal_rule(Some("N".into()), "compiler")
        .terminal_rule(Some("N".into()), "grammar")
        .build()?;
    Ok(grammar)
}

fn main() -> Result<(), Box<dyn Error>> {
    let noun_phrase = Arc::new(noun_phrase()?);

    // The nested grammar is registered like any other terminal symbol; the
    // generator expands it by generating from it and splicing the result.
    let mut sentence = PhraseStructure::new();
    sentence.add_symbol("Subject", false)?;
    sentence.add_symbol("Predicate", false)?;
    sentence.add_symbol("VP", false)?;
    sentence.add_symbol("accepts", true)?;
    sentence.add_symbol("rejects", true)?;
    sentence.add_symbol(Arc::clone(&noun_phrase), true)?;

    sentence.add_intermediate_rule(None, "Subject", "Predicate")?;
    sentence.add_terminal_rule(
        Some("Subject".into()),
        SymbolId::Grammar(Arc::clone(&noun_phrase)),
    )?;
    sentence.add_intermediate_rule(
        Some("Predicate".into()),
        "VP",
        SymbolId::Grammar(Arc::clone(&noun_phrase)),
    )?;
    sentence.add_terminal_rule(Some("VP".into()), "accepts")?;
    sentence.add_terminal_rule(Some("VP".into()), "rejects")?;

    println!("Generating 10 sentences with a nested noun-phrase grammar:\n");
    for i in 1..=10 {
        let words = sentence.generate_symbol_string(4, 16)?;
        let rendered: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        println!("{:2}. {}", i, rendered.join(" "));
    }

    Ok(())
}
