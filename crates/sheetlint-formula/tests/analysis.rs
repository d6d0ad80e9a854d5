//! End-to-end checks of parsing, single-formula analysis and cycle detection

use pretty_assertions::assert_eq;
use sheetlint_formula::{
    analyze_formula, parse_formula, CycleStrategy, DependencyGraph, FormulaNode, NodeKind,
};

#[test]
fn sum_over_range_is_single_call_with_range_argument() {
    let ast = parse_formula("SUM(A1:A10)").unwrap();
    match &ast {
        FormulaNode::Function { token, args } => {
            assert_eq!(token.value, "SUM");
            assert_eq!(args.len(), 1);
            assert_eq!(args[0].kind(), NodeKind::RangeRef);
            assert_eq!(args[0].value(), "A1:A10");
        }
        other => panic!("Expected Function, got {other:?}"),
    }
}

#[test]
fn nested_ifs_are_complex() {
    let analysis = analyze_formula("IF(A1>0,IF(A1<10,IF(A1<5,\"Low\",\"Medium\"),\"High\"))");
    assert!(analysis.is_valid);
    assert!(analysis.complexity > 5.0);
}

#[test]
fn simple_arithmetic_is_clean() {
    let analysis = analyze_formula("A1+B1*2");
    assert!(analysis.complexity <= 3.0);
    assert!(analysis.volatile_functions.is_empty());
    assert_eq!(analysis.dependencies, vec!["A1", "B1"]);
    assert!(analysis.errors.is_empty());
}

#[test]
fn unclosed_call_is_invalid() {
    let analysis = analyze_formula("SUM(A1:A10");
    assert!(!analysis.is_valid);
    assert!(analysis.errors.iter().any(|e| e == "Unmatched parentheses"));
}

#[test]
fn volatile_call_is_reported() {
    assert_eq!(analyze_formula("NOW() + A1").volatile_functions, vec!["NOW"]);
}

#[test]
fn malformed_formulas_are_invalid() {
    for formula in ["A1 + + B1", "SUM()", "", "=", "A1 B1", "MID(A1,1)", "1 +"] {
        let analysis = analyze_formula(formula);
        assert!(!analysis.is_valid, "{formula:?} should be invalid");
        assert_eq!(analysis.complexity, 0.0);
    }
}

#[test]
fn circular_chain_flags_every_participant() {
    let graph = DependencyGraph::from_formulas([("A1", "B1+1"), ("B1", "C1+1"), ("C1", "A1+1")]);
    for strategy in [CycleStrategy::default(), CycleStrategy::StronglyConnected] {
        let report = graph.find_circular_references_with(strategy);
        assert_eq!(report.iter().collect::<Vec<_>>(), vec!["A1", "B1", "C1"]);
    }
}

#[test]
fn forward_reference_is_not_circular() {
    let graph = DependencyGraph::from_formulas([("A1", "1"), ("B1", "A1*2")]);
    assert!(graph.find_circular_references().is_empty());
}

#[test]
fn cycle_through_function_arguments() {
    let graph = DependencyGraph::from_formulas([
        ("A1", "IF(B2>0, SUM(C1:C3), 0)"),
        ("C3", "VLOOKUP(A1, D1:E5, 2)"),
        ("B2", "NOW()"),
    ]);
    let report = graph.find_circular_references();
    assert_eq!(report.iter().collect::<Vec<_>>(), vec!["A1", "C3"]);
}

#[test]
fn long_chain_does_not_overflow_the_stack() {
    let formulas: Vec<(String, String)> = (1..=5000)
        .map(|row| (format!("A{row}"), format!("A{}+1", row + 1)))
        .chain(std::iter::once(("A5001".to_string(), "A1".to_string())))
        .collect();
    let graph = DependencyGraph::from_formulas(
        formulas.iter().map(|(c, f)| (c.as_str(), f.as_str())),
    );
    for strategy in [CycleStrategy::default(), CycleStrategy::StronglyConnected] {
        let report = graph.find_circular_references_with(strategy);
        assert_eq!(report.len(), 5001);
    }
}

#[test]
fn deeply_nested_formula_is_analyzed() {
    let formula = format!("{}A1{}", "(".repeat(2000), ")".repeat(2000));
    let analysis = analyze_formula(&formula);
    assert!(analysis.is_valid);
    assert_eq!(analysis.dependencies, vec!["A1"]);
}
