//! Formula Abstract Syntax Tree types

use crate::token::Token;

/// Formula expression AST
///
/// Every node keeps the token it was built from, so diagnostics can point back
/// into the source text.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaNode {
    // === Literals ===
    /// Numeric literal, kept as written
    Number(Token),
    /// Text literal
    Text(Token),

    // === References ===
    /// Single cell reference (`A1`, `$B$2`)
    CellRef(Token),
    /// Range reference (`A1:B10`)
    RangeRef(Token),

    // === Operators ===
    /// Binary operation; operands are `[left, right]`
    Operator {
        token: Token,
        operands: Box<[FormulaNode; 2]>,
    },

    // === Function call ===
    Function { token: Token, args: Vec<FormulaNode> },
}

/// Node classification, for callers that only need the kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Operator,
    Function,
    CellRef,
    RangeRef,
    Number,
    Text,
}

impl FormulaNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            FormulaNode::Number(_) => NodeKind::Number,
            FormulaNode::Text(_) => NodeKind::Text,
            FormulaNode::CellRef(_) => NodeKind::CellRef,
            FormulaNode::RangeRef(_) => NodeKind::RangeRef,
            FormulaNode::Operator { .. } => NodeKind::Operator,
            FormulaNode::Function { .. } => NodeKind::Function,
        }
    }

    /// The token this node was built from
    pub fn token(&self) -> &Token {
        match self {
            FormulaNode::Number(token)
            | FormulaNode::Text(token)
            | FormulaNode::CellRef(token)
            | FormulaNode::RangeRef(token)
            | FormulaNode::Operator { token, .. }
            | FormulaNode::Function { token, .. } => token,
        }
    }

    /// Source text of the originating token (function names keep their spelling)
    pub fn value(&self) -> &str {
        &self.token().value
    }

    /// Ordered child nodes; empty for leaves
    pub fn children(&self) -> &[FormulaNode] {
        match self {
            FormulaNode::Operator { operands, .. } => &operands[..],
            FormulaNode::Function { args, .. } => args,
            _ => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(
            self,
            FormulaNode::Operator { .. } | FormulaNode::Function { .. }
        )
    }

    /// Pre-order traversal yielding each node with its distance from `self`.
    ///
    /// Uses an explicit work-list, so deeply nested formulas cannot exhaust the
    /// call stack.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }

    /// Number of leaf nodes (operands) in the tree
    pub fn leaf_count(&self) -> usize {
        self.walk().filter(|(_, node)| node.is_leaf()).count()
    }
}

/// Iterator returned by [`FormulaNode::walk`]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a FormulaNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a FormulaNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}
