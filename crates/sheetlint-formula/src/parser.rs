//! Formula parser
//!
//! An operator-precedence parser over the token stream, working with two explicit
//! stacks (operands and pending operators) in the manner of shunting-yard,
//! extended with call frames for variadic function calls. It never recurses.
//!
//! Precedence, highest first:
//! 1. Range: `:`
//! 2. Exponentiation: `^`
//! 3. Multiplication/Division: `*`, `/`
//! 4. Addition/Subtraction: `+`, `-`
//! 5. Concatenation: `&`
//! 6. Comparison: `=`, `<>`, `<`, `<=`, `>`, `>=`
//!
//! Operators of equal precedence associate left to right.

use crate::ast::FormulaNode;
use crate::error::{FormulaError, FormulaResult};
use crate::functions;
use crate::token::{Token, TokenKind};
use crate::tokenizer::tokenize;

/// Parse a formula string into an AST
///
/// A leading `=` is optional.
///
/// # Example
/// ```rust
/// use sheetlint_formula::{parse_formula, FormulaNode};
///
/// let ast = parse_formula("=SUM(A1:A10)").unwrap();
/// assert!(matches!(ast, FormulaNode::Function { .. }));
/// assert!(parse_formula("SUM(A1:A10").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaNode> {
    let formula = formula.trim();
    let formula = formula.strip_prefix('=').unwrap_or(formula);
    if formula.trim().is_empty() {
        return Err(FormulaError::Empty);
    }

    parse_tokens(tokenize(formula))
}

/// Build an AST from an already tokenized formula
pub fn parse_tokens(tokens: Vec<Token>) -> FormulaResult<FormulaNode> {
    if tokens.is_empty() {
        return Err(FormulaError::Empty);
    }

    let mut parser = ExpressionParser::default();
    for token in tokens {
        parser.push(token)?;
    }
    parser.finish()
}

/// Binding strength of a binary operator
pub fn precedence(operator: &str) -> u8 {
    match operator {
        ":" => 5,
        "^" => 4,
        "*" | "/" => 3,
        "+" | "-" => 2,
        "&" => 1,
        _ => 0,
    }
}

/// Entry on the pending-operator stack
#[derive(Debug)]
enum Pending {
    Operator(Token),
    /// `(`, with the operand stack height when it was opened and when its
    /// current argument started
    OpenParen {
        token: Token,
        operand_base: usize,
        arg_base: usize,
    },
    Function(Token),
}

/// Argument separators seen so far in an open call
#[derive(Debug, Default)]
struct CallFrame {
    arg_count: usize,
}

#[derive(Debug, Default)]
struct ExpressionParser {
    operands: Vec<FormulaNode>,
    pending: Vec<Pending>,
    calls: Vec<CallFrame>,
}

impl ExpressionParser {
    fn push(&mut self, token: Token) -> FormulaResult<()> {
        match token.kind {
            TokenKind::Number => self.operands.push(FormulaNode::Number(token)),
            TokenKind::Text => self.operands.push(FormulaNode::Text(token)),
            TokenKind::CellRef => self.operands.push(FormulaNode::CellRef(token)),
            TokenKind::RangeRef => self.operands.push(FormulaNode::RangeRef(token)),
            TokenKind::Function => {
                self.calls.push(CallFrame::default());
                self.pending.push(Pending::Function(token));
            }
            TokenKind::Operator => match token.value.as_str() {
                "(" => self.pending.push(Pending::OpenParen {
                    token,
                    operand_base: self.operands.len(),
                    arg_base: self.operands.len(),
                }),
                ")" => self.close_paren(token)?,
                "," => self.separator()?,
                _ => self.operator(token)?,
            },
        }
        Ok(())
    }

    fn operator(&mut self, token: Token) -> FormulaResult<()> {
        let prec = precedence(&token.value);
        while matches!(
            self.pending.last(),
            Some(Pending::Operator(top)) if precedence(&top.value) >= prec
        ) {
            if let Some(Pending::Operator(top)) = self.pending.pop() {
                self.apply(top)?;
            }
        }
        self.pending.push(Pending::Operator(token));
        Ok(())
    }

    fn separator(&mut self) -> FormulaResult<()> {
        self.reduce_to_paren()?;

        // Operators after the comma cannot reach the arguments before it
        let height = self.operands.len();
        if let Some(Pending::OpenParen { arg_base, .. }) = self.pending.last_mut() {
            *arg_base = height;
        }

        // Only a comma directly inside a call's own parentheses separates arguments
        let len = self.pending.len();
        let in_call = len >= 2
            && matches!(self.pending[len - 1], Pending::OpenParen { .. })
            && matches!(self.pending[len - 2], Pending::Function(_));
        if in_call {
            if let Some(frame) = self.calls.last_mut() {
                frame.arg_count += 1;
            }
        }
        Ok(())
    }

    fn close_paren(&mut self, token: Token) -> FormulaResult<()> {
        self.reduce_to_paren()?;

        let operand_base = match self.pending.pop() {
            Some(Pending::OpenParen { operand_base, .. }) => operand_base,
            _ => {
                return Err(FormulaError::UnmatchedParentheses {
                    position: token.span.start,
                })
            }
        };

        if matches!(self.pending.last(), Some(Pending::Function(_))) {
            if let Some(Pending::Function(function)) = self.pending.pop() {
                self.finish_call(function, operand_base)?;
            }
        }
        Ok(())
    }

    fn finish_call(&mut self, function: Token, operand_base: usize) -> FormulaResult<()> {
        let frame = self.calls.pop().unwrap_or_default();
        let available = self.operands.len().saturating_sub(operand_base);
        if available > frame.arg_count + 1 {
            return Err(FormulaError::MissingOperator {
                function: function.value,
            });
        }

        let args = self.operands.split_off(self.operands.len() - available);
        let (min, max) = functions::arity(&function.value);
        if args.len() < min {
            return Err(FormulaError::TooFewArguments {
                function: function.value,
                min,
                actual: args.len(),
            });
        }
        if let Some(max) = max.filter(|&max| args.len() > max) {
            return Err(FormulaError::TooManyArguments {
                function: function.value,
                max,
                actual: args.len(),
            });
        }

        self.operands.push(FormulaNode::Function {
            token: function,
            args,
        });
        Ok(())
    }

    /// Apply pending operators down to the innermost open parenthesis
    fn reduce_to_paren(&mut self) -> FormulaResult<()> {
        while matches!(self.pending.last(), Some(Pending::Operator(_))) {
            if let Some(Pending::Operator(op)) = self.pending.pop() {
                self.apply(op)?;
            }
        }
        Ok(())
    }

    /// Combine the top two operands with `op`.
    ///
    /// Operands pushed before the innermost `(` or before the last `,` inside
    /// it are out of reach.
    fn apply(&mut self, op: Token) -> FormulaResult<()> {
        let floor = self
            .pending
            .iter()
            .rev()
            .find_map(|p| match p {
                Pending::OpenParen { arg_base, .. } => Some(*arg_base),
                _ => None,
            })
            .unwrap_or(0);

        if self.operands.len() < floor + 2 {
            return Err(FormulaError::MissingOperand {
                operator: op.value,
                position: op.span.start,
            });
        }

        match (self.operands.pop(), self.operands.pop()) {
            (Some(right), Some(left)) => {
                self.operands.push(FormulaNode::Operator {
                    token: op,
                    operands: Box::new([left, right]),
                });
                Ok(())
            }
            _ => Err(FormulaError::MissingOperand {
                operator: op.value,
                position: op.span.start,
            }),
        }
    }

    fn finish(mut self) -> FormulaResult<FormulaNode> {
        let unclosed = self.pending.iter().find_map(|p| match p {
            Pending::OpenParen { token, .. } => Some(token.span.start),
            Pending::Function(token) => Some(token.span.end),
            Pending::Operator(_) => None,
        });
        if let Some(position) = unclosed {
            return Err(FormulaError::UnmatchedParentheses { position });
        }

        while let Some(Pending::Operator(op)) = self.pending.pop() {
            self.apply(op)?;
        }

        if self.operands.len() != 1 {
            return Err(FormulaError::InvalidStructure {
                operands: self.operands.len(),
            });
        }
        match self.operands.pop() {
            Some(root) => Ok(root),
            None => Err(FormulaError::InvalidStructure { operands: 0 }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::NodeKind;
    use pretty_assertions::assert_eq;

    /// Compact s-expression rendering for structural assertions
    fn sexpr(node: &FormulaNode) -> String {
        match node {
            FormulaNode::Operator { operands, .. } => format!(
                "({} {} {})",
                node.value(),
                sexpr(&operands[0]),
                sexpr(&operands[1])
            ),
            FormulaNode::Function { args, .. } => {
                let args: Vec<String> = args.iter().map(sexpr).collect();
                format!("{}[{}]", node.value(), args.join(" "))
            }
            FormulaNode::Text(_) => format!("{:?}", node.value()),
            _ => node.value().to_string(),
        }
    }

    fn parsed(formula: &str) -> String {
        sexpr(&parse_formula(formula).unwrap())
    }

    #[test]
    fn test_parse_simple_arithmetic() {
        let ast = parse_formula("A1 + B1").unwrap();
        assert_eq!(ast.kind(), NodeKind::Operator);
        assert_eq!(ast.value(), "+");
        assert_eq!(ast.children()[0].kind(), NodeKind::CellRef);
        assert_eq!(ast.children()[1].kind(), NodeKind::CellRef);
    }

    #[test]
    fn test_parse_leading_equals_and_whitespace() {
        assert_eq!(parsed("  =1.5 + 2 "), "(+ 1.5 2)");
    }

    #[test]
    fn test_precedence() {
        assert_eq!(parsed("A1+B1*2"), "(+ A1 (* B1 2))");
        assert_eq!(parsed("(A1+B1)*2"), "(* (+ A1 B1) 2)");
        assert_eq!(parsed("1+2^3*4"), "(+ 1 (* (^ 2 3) 4))");
        assert_eq!(parsed("\"a\"&1+2"), "(& \"a\" (+ 1 2))");
        assert_eq!(parsed("A1&B1=C1"), "(= (& A1 B1) C1)");
        assert_eq!(parsed("A1 >= B1"), "(>= A1 B1)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(parsed("A1-B1-C1"), "(- (- A1 B1) C1)");
        assert_eq!(parsed("A1/B1*C1"), "(* (/ A1 B1) C1)");
        assert_eq!(parsed("2^3^2"), "(^ (^ 2 3) 2)");
    }

    #[test]
    fn test_parse_range_argument() {
        let ast = parse_formula("SUM(A1:A10)").unwrap();
        assert_eq!(ast.kind(), NodeKind::Function);
        assert_eq!(ast.value(), "SUM");
        assert_eq!(ast.children().len(), 1);
        assert_eq!(ast.children()[0].kind(), NodeKind::RangeRef);
        assert_eq!(ast.children()[0].value(), "A1:A10");
    }

    #[test]
    fn test_standalone_range_operator() {
        assert_eq!(parsed("(A1):B2"), "(: A1 B2)");
    }

    #[test]
    fn test_parse_nested_functions() {
        assert_eq!(
            parsed("IF(SUM(A1:A10)>0,MAX(B1:B10),0)"),
            "IF[(> SUM[A1:A10] 0) MAX[B1:B10] 0]"
        );
        assert_eq!(
            parsed("SUMIFS(A1:A10,B1:B10,\">0\",C1:C10,\"<100\")"),
            "SUMIFS[A1:A10 B1:B10 \">0\" C1:C10 \"<100\"]"
        );
        assert_eq!(
            parsed("SUM(IF(A1:A10>0,B1:B10,0))"),
            "SUM[IF[(> A1:A10 0) B1:B10 0]]"
        );
    }

    #[test]
    fn test_zero_argument_call_keeps_outer_operand() {
        assert_eq!(parsed("NOW() + A1"), "(+ NOW[] A1)");
        assert_eq!(parsed("A1 + NOW()"), "(+ A1 NOW[])");
        assert_eq!(parsed("B1*TODAY()-1"), "(- (* B1 TODAY[]) 1)");
    }

    #[test]
    fn test_parenthesized_arguments() {
        assert_eq!(parsed("SUM((A1+B1),C1)"), "SUM[(+ A1 B1) C1]");
        assert_eq!(parsed("((A1 + B1) * (C1 + D1))"), "(* (+ A1 B1) (+ C1 D1))");
    }

    #[test]
    fn test_absolute_references_preserved() {
        assert_eq!(parsed("$A$1 + B$2"), "(+ $A$1 B$2)");
        assert_eq!(parsed("$A1 + A$1"), "(+ $A1 A$1)");
    }

    #[test]
    fn test_unknown_function_is_accepted() {
        assert_eq!(parsed("INVALID(A1)"), "INVALID[A1]");
        assert_eq!(
            parse_formula("INVALID()"),
            Err(FormulaError::TooFewArguments {
                function: "INVALID".into(),
                min: 1,
                actual: 0,
            })
        );
    }

    #[test]
    fn test_empty_formula() {
        assert_eq!(parse_formula(""), Err(FormulaError::Empty));
        assert_eq!(parse_formula("  = "), Err(FormulaError::Empty));
        assert_eq!(parse_formula("#?"), Err(FormulaError::Empty));
    }

    #[test]
    fn test_unmatched_parentheses() {
        assert_eq!(
            parse_formula("SUM(A1:A10"),
            Err(FormulaError::UnmatchedParentheses { position: 3 })
        );
        assert_eq!(
            parse_formula("(A1+B1"),
            Err(FormulaError::UnmatchedParentheses { position: 0 })
        );
        assert_eq!(
            parse_formula("A1+B1)"),
            Err(FormulaError::UnmatchedParentheses { position: 5 })
        );
        assert_eq!(
            parse_formula("SUM(A1:A10").unwrap_err().to_string(),
            "Unmatched parentheses"
        );
    }

    #[test]
    fn test_missing_operand() {
        assert_eq!(
            parse_formula("A1 + + B1"),
            Err(FormulaError::MissingOperand {
                operator: "+".into(),
                position: 3,
            })
        );
        assert!(matches!(
            parse_formula("-5"),
            Err(FormulaError::MissingOperand { .. })
        ));
        assert!(matches!(
            parse_formula("SUM(A1*)"),
            Err(FormulaError::MissingOperand { .. })
        ));
    }

    #[test]
    fn test_operator_cannot_reach_outside_parentheses() {
        // The '+' inside the call must not combine B1 with A1
        assert!(matches!(
            parse_formula("B1*SUM(+A1)"),
            Err(FormulaError::MissingOperand { .. })
        ));
    }

    #[test]
    fn test_operator_cannot_reach_previous_argument() {
        assert_eq!(
            parse_formula("SUM(A1,B1+)"),
            Err(FormulaError::MissingOperand {
                operator: "+".into(),
                position: 9,
            })
        );
        assert_eq!(
            parse_formula("SUM(A1,+B1)"),
            Err(FormulaError::MissingOperand {
                operator: "+".into(),
                position: 7,
            })
        );
        for formula in ["IF(A1>0,*B1,C1)", "SUM(A1,B1,C1*)", "(A1,-B1)"] {
            assert!(
                matches!(parse_formula(formula), Err(FormulaError::MissingOperand { .. })),
                "{formula}"
            );
        }
        // Operators inside a single argument are unaffected
        assert_eq!(parsed("SUM(A1,B1+C1*2)"), "SUM[A1 (+ B1 (* C1 2))]");
    }

    #[test]
    fn test_arity_validation() {
        assert_eq!(
            parse_formula("SUM()"),
            Err(FormulaError::TooFewArguments {
                function: "SUM".into(),
                min: 1,
                actual: 0,
            })
        );
        assert_eq!(
            parse_formula("VLOOKUP(A1,B1:C10)"),
            Err(FormulaError::TooFewArguments {
                function: "VLOOKUP".into(),
                min: 3,
                actual: 2,
            })
        );
        assert_eq!(
            parse_formula("NOW(A1)"),
            Err(FormulaError::TooManyArguments {
                function: "NOW".into(),
                max: 0,
                actual: 1,
            })
        );
        assert!(parse_formula("vlookup(A1,B1:C10,2,0)").is_ok());
        assert!(parse_formula("IF(A1>0,\"Yes\")").is_ok());
    }

    #[test]
    fn test_missing_separator_between_arguments() {
        assert_eq!(
            parse_formula("SUM(A1 B1)"),
            Err(FormulaError::MissingOperator {
                function: "SUM".into()
            })
        );
    }

    #[test]
    fn test_invalid_structure() {
        assert_eq!(
            parse_formula("A1 B1"),
            Err(FormulaError::InvalidStructure { operands: 2 })
        );
        assert_eq!(
            parse_formula("A1,B1"),
            Err(FormulaError::InvalidStructure { operands: 2 })
        );
        assert_eq!(
            parse_formula("SUM (A1)"),
            Err(FormulaError::InvalidStructure { operands: 2 })
        );
    }

    #[test]
    fn test_complex_formula() {
        let ast = parse_formula("IF(AND(A1>0,B1<100),A1*B1/100,0)").unwrap();
        assert_eq!(ast.kind(), NodeKind::Function);
        assert_eq!(ast.leaf_count(), 8);
    }
}
