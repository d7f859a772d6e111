use cnf_gen::Bnf;
use std::error::Error;

/// Build an arithmetic-expression grammar in plain BNF, convert it to
/// Chomsky normal form, and generate random expressions from it.
fn main() -> Result<(), Box<dyn Error>> {
    let mut bnf = Bnf::new();

    bnf.add_intermediate_symbol("Expr")?;
    bnf.add_intermediate_symbol("Op")?;
    bnf.add_intermediate_symbol("Num")?;
    for terminal in ["+", "*", "(", ")", "0", "1", "2", "7"] {
        bnf.add_terminal_symbol(terminal)?;
    }

    bnf.add_start_rule(vec!["Expr".into()])?;
    bnf.add_rule("Expr", vec!["Num".into()])?;
    bnf.add_rule("Expr", vec!["Expr".into(), "Op".into(), "Expr".into()])?;
    bnf.add_rule("Expr", vec!["(".into(), "Expr".into(), ")".into()])?;
    bnf.add_rule("Op", vec!["+".into()])?;
    bnf.add_rule("Op", vec!["*".into()])?;
    for digit in ["0", "1", "2", "7"] {
        bnf.add_rule("Num", vec![digit.into()])?;
    }

    let grammar = bnf.to_cnf()?;
    println!(
        "Converted to a CNF phrase structure with {} symbols and {} rules.",
        grammar.symbols().count(),
        grammar.rules().count()
    );
    println!("Generating 10 random expressions:\n");

    for i in 1..=10 {
        let words = grammar.generate_symbol_string(12, 64)?;
        let rendered: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        println!("{:2}. {}", i, rendered.join(" "));
    }

    Ok(())
}
