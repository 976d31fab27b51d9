//! Output AST Module
//!
//! The statements and expressions the binding generator splices around a user
//! function. The model is deliberately small: variable declarations, calls,
//! literals and references into the runtime support library.

use crate::parse_util::ParseSourceSpan;

///// Expressions

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    ReadVar(ReadVarExpr),
    InvokeFn(InvokeFunctionExpr),
    Literal(LiteralExpr),
    External(ExternalExpr),
    TypeRef(TypeRefExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadVarExpr {
    pub name: String,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvokeFunctionExpr {
    pub fn_: Box<Expression>,
    pub args: Vec<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: LiteralValue,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Null,
    String(String),
    Number(f64),
    Bool(bool),
}

/// A reference to a symbol exported by another module, e.g. a runtime
/// accessor in the support library.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalExpr {
    pub value: ExternalReference,
    pub source_span: Option<ParseSourceSpan>,
}

/// A reference to a user-declared type used as a value, e.g. `Order[]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRefExpr {
    pub name: String,
    /// Array nesting depth.
    pub dims: usize,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExternalReference {
    pub module_name: Option<String>,
    pub name: String,
}

impl Expression {
    pub fn source_span(&self) -> Option<&ParseSourceSpan> {
        match self {
            Expression::ReadVar(e) => e.source_span.as_ref(),
            Expression::InvokeFn(e) => e.source_span.as_ref(),
            Expression::Literal(e) => e.source_span.as_ref(),
            Expression::External(e) => e.source_span.as_ref(),
            Expression::TypeRef(e) => e.source_span.as_ref(),
        }
    }

    /// Invokes this expression as a function with `args`.
    pub fn call_fn(&self, args: Vec<Expression>) -> Box<Expression> {
        Box::new(Expression::InvokeFn(InvokeFunctionExpr {
            fn_: Box::new(self.clone()),
            args,
            source_span: None,
        }))
    }

    pub fn to_stmt(&self) -> Statement {
        Statement::Expression(ExpressionStatement {
            expr: Box::new(self.clone()),
            source_span: None,
        })
    }

    /// Name of the function being called, if this is a call.
    pub fn callee_name(&self) -> Option<&str> {
        match self {
            Expression::InvokeFn(call) => match call.fn_.as_ref() {
                Expression::ReadVar(v) => Some(&v.name),
                Expression::External(e) => Some(&e.value.name),
                _ => None,
            },
            _ => None,
        }
    }
}

///// Statements

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    DeclareVar(DeclareVarStmt),
    DeclareFn(DeclareFunctionStmt),
    Expression(ExpressionStatement),
    Return(ReturnStatement),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareVarStmt {
    pub name: String,
    pub value: Option<Box<Expression>>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FnParam {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeclareFunctionStmt {
    pub name: String,
    pub params: Vec<FnParam>,
    pub statements: Vec<Statement>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Box<Expression>,
    pub source_span: Option<ParseSourceSpan>,
}

impl Statement {
    /// The variable introduced by this statement, if any.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Statement::DeclareVar(stmt) => Some(&stmt.name),
            Statement::DeclareFn(stmt) => Some(&stmt.name),
            _ => None,
        }
    }

    pub fn source_span(&self) -> Option<&ParseSourceSpan> {
        match self {
            Statement::DeclareVar(s) => s.source_span.as_ref(),
            Statement::DeclareFn(s) => s.source_span.as_ref(),
            Statement::Expression(s) => s.source_span.as_ref(),
            Statement::Return(s) => s.source_span.as_ref(),
        }
    }

    /// Attaches `span` to the statement, replacing any previous one.
    pub fn with_source_span(mut self, span: Option<ParseSourceSpan>) -> Self {
        match &mut self {
            Statement::DeclareVar(s) => s.source_span = span,
            Statement::DeclareFn(s) => s.source_span = span,
            Statement::Expression(s) => s.source_span = span,
            Statement::Return(s) => s.source_span = span,
        }
        self
    }
}

// Helper functions for creating common expressions
pub fn variable(name: impl Into<String>) -> Box<Expression> {
    Box::new(Expression::ReadVar(ReadVarExpr {
        name: name.into(),
        source_span: None,
    }))
}

pub fn literal(value: impl Into<LiteralValue>) -> Box<Expression> {
    Box::new(Expression::Literal(LiteralExpr {
        value: value.into(),
        source_span: None,
    }))
}

pub fn import_expr(module_name: Option<&str>, name: impl Into<String>) -> Box<Expression> {
    Box::new(Expression::External(ExternalExpr {
        value: ExternalReference {
            module_name: module_name.map(str::to_string),
            name: name.into(),
        },
        source_span: None,
    }))
}

pub fn type_ref(name: impl Into<String>, dims: usize) -> Box<Expression> {
    Box::new(Expression::TypeRef(TypeRefExpr {
        name: name.into(),
        dims,
        source_span: None,
    }))
}

pub fn declare_var(name: impl Into<String>, value: Option<Box<Expression>>) -> Statement {
    Statement::DeclareVar(DeclareVarStmt {
        name: name.into(),
        value,
        source_span: None,
    })
}

pub fn declare_fn(
    name: impl Into<String>,
    params: Vec<FnParam>,
    statements: Vec<Statement>,
) -> Statement {
    Statement::DeclareFn(DeclareFunctionStmt {
        name: name.into(),
        params,
        statements,
        source_span: None,
    })
}

// Implement conversions
impl From<String> for LiteralValue {
    fn from(s: String) -> Self {
        LiteralValue::String(s)
    }
}

impl From<&str> for LiteralValue {
    fn from(s: &str) -> Self {
        LiteralValue::String(s.to_string())
    }
}

impl From<f64> for LiteralValue {
    fn from(n: f64) -> Self {
        LiteralValue::Number(n)
    }
}

impl From<i64> for LiteralValue {
    fn from(n: i64) -> Self {
        LiteralValue::Number(n as f64)
    }
}

impl From<bool> for LiteralValue {
    fn from(b: bool) -> Self {
        LiteralValue::Bool(b)
    }
}
