//! Statements, commands and statement lists.

use tessa_ir::Span;

use crate::Expr;

#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub kind: StatementKind,
    /// False when the statement ended with `;`.
    pub print_result: bool,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum StatementKind {
    Expression(Expr),
    Command(Command),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Spmd(SpmdCommand),
}

/// `spmd ... endspmd` block. The body runs once, in order, in the
/// enclosing evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct SpmdCommand {
    pub body: StatementList,
}

impl Statement {
    pub fn expression(expr: Expr, print_result: bool) -> Self {
        let span = expr.span;
        Statement {
            kind: StatementKind::Expression(expr),
            print_result,
            span,
        }
    }

    pub fn spmd(body: StatementList, span: Span) -> Self {
        Statement {
            kind: StatementKind::Command(Command::Spmd(SpmdCommand { body })),
            print_result: false,
            span,
        }
    }

    pub fn expr(&self) -> Option<&Expr> {
        match &self.kind {
            StatementKind::Expression(expr) => Some(expr),
            StatementKind::Command(_) => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatementList {
    statements: Vec<Statement>,
}

impl StatementList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statement> {
        self.statements.iter()
    }
}

impl FromIterator<Statement> for StatementList {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        StatementList {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for StatementList {
    type Item = Statement;
    type IntoIter = std::vec::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a StatementList {
    type Item = &'a Statement;
    type IntoIter = std::slice::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
