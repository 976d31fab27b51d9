//! Abstract Emitter Module
//!
//! Renders output AST statements as source text with tracked indentation.

use crate::output::output_ast as o;
use once_cell::sync::Lazy;
use regex::Regex;

static LEGAL_IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_$][0-9a-zA-Z_$]*$").expect("identifier pattern is valid"));

#[derive(Debug, Clone)]
struct EmittedLine {
    parts: Vec<String>,
    indent: usize,
}

impl EmittedLine {
    fn new(indent: usize) -> Self {
        EmittedLine {
            parts: Vec::new(),
            indent,
        }
    }
}

pub struct EmitterVisitorContext {
    lines: Vec<EmittedLine>,
    indent: usize,
    indent_with: String,
}

impl EmitterVisitorContext {
    pub fn create_root() -> Self {
        EmitterVisitorContext::new(0, 2)
    }

    pub fn new(indent: usize, indent_width: usize) -> Self {
        EmitterVisitorContext {
            lines: vec![EmittedLine::new(indent)],
            indent,
            indent_with: " ".repeat(indent_width),
        }
    }

    pub fn println(&mut self, last_part: &str) {
        self.print(last_part, true);
    }

    pub fn line_is_empty(&self) -> bool {
        self.lines.last().map_or(true, |l| l.parts.is_empty())
    }

    pub fn print(&mut self, part: &str, new_line: bool) {
        if !part.is_empty() {
            if let Some(current) = self.lines.last_mut() {
                current.parts.push(part.to_string());
            }
        }
        if new_line {
            self.lines.push(EmittedLine::new(self.indent));
        }
    }

    pub fn inc_indent(&mut self) {
        self.indent += 1;
        if self.line_is_empty() {
            if let Some(current) = self.lines.last_mut() {
                current.indent = self.indent;
            }
        }
    }

    pub fn dec_indent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        if self.line_is_empty() {
            if let Some(current) = self.lines.last_mut() {
                current.indent = self.indent;
            }
        }
    }

    pub fn to_source(&self) -> String {
        let mut lines: &[EmittedLine] = &self.lines;
        if let Some((last, rest)) = lines.split_last() {
            if last.parts.is_empty() {
                lines = rest;
            }
        }
        lines
            .iter()
            .map(|l| {
                if l.parts.is_empty() {
                    String::new()
                } else {
                    format!("{}{}", self.indent_with.repeat(l.indent), l.parts.join(""))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Quotes `input` as a double-quoted string literal.
pub fn escape_string(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len() + 2);
    escaped.push('"');
    for ch in input.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(ch),
        }
    }
    escaped.push('"');
    escaped
}

/// Returns `input` unchanged when it is a legal identifier, otherwise quotes it
/// with a leading `'` (quoted-identifier syntax).
pub fn escape_identifier(input: &str) -> String {
    if is_legal_identifier(input) {
        input.to_string()
    } else {
        let mut quoted = String::from("'");
        for ch in input.chars() {
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                quoted.push('\\');
            }
            quoted.push(ch);
        }
        quoted
    }
}

pub fn is_legal_identifier(input: &str) -> bool {
    LEGAL_IDENTIFIER_RE.is_match(input)
}

/// Emits output AST nodes into an [`EmitterVisitorContext`].
pub struct AbstractEmitterVisitor {
    module_separator: &'static str,
}

impl AbstractEmitterVisitor {
    pub fn new() -> Self {
        AbstractEmitterVisitor {
            module_separator: ":",
        }
    }

    pub fn visit_all_statements(&self, statements: &[o::Statement], ctx: &mut EmitterVisitorContext) {
        for stmt in statements {
            self.visit_statement(stmt, ctx);
        }
    }

    pub fn visit_statement(&self, stmt: &o::Statement, ctx: &mut EmitterVisitorContext) {
        match stmt {
            o::Statement::DeclareVar(stmt) => {
                ctx.print("var ", false);
                ctx.print(&escape_identifier(&stmt.name), false);
                if let Some(value) = &stmt.value {
                    ctx.print(" = ", false);
                    self.visit_expression(value, ctx);
                }
                ctx.println(";");
            }
            o::Statement::DeclareFn(stmt) => {
                let params = stmt
                    .params
                    .iter()
                    .map(|p| escape_identifier(&p.name))
                    .collect::<Vec<_>>()
                    .join(", ");
                ctx.println(&format!(
                    "function {}({}) {{",
                    escape_identifier(&stmt.name),
                    params
                ));
                ctx.inc_indent();
                self.visit_all_statements(&stmt.statements, ctx);
                ctx.dec_indent();
                ctx.println("}");
            }
            o::Statement::Expression(stmt) => {
                self.visit_expression(&stmt.expr, ctx);
                ctx.println(";");
            }
            o::Statement::Return(stmt) => {
                ctx.print("return ", false);
                self.visit_expression(&stmt.value, ctx);
                ctx.println(";");
            }
        }
    }

    pub fn visit_expression(&self, expr: &o::Expression, ctx: &mut EmitterVisitorContext) {
        match expr {
            o::Expression::ReadVar(e) => ctx.print(&escape_identifier(&e.name), false),
            o::Expression::External(e) => {
                if let Some(module) = &e.value.module_name {
                    ctx.print(module, false);
                    ctx.print(self.module_separator, false);
                }
                ctx.print(&e.value.name, false);
            }
            o::Expression::TypeRef(e) => {
                ctx.print(&escape_identifier(&e.name), false);
                ctx.print(&"[]".repeat(e.dims), false);
            }
            o::Expression::Literal(e) => {
                let text = match &e.value {
                    o::LiteralValue::Null => "()".to_string(),
                    o::LiteralValue::String(s) => escape_string(s),
                    o::LiteralValue::Number(n) => n.to_string(),
                    o::LiteralValue::Bool(b) => b.to_string(),
                };
                ctx.print(&text, false);
            }
            o::Expression::InvokeFn(e) => {
                self.visit_expression(&e.fn_, ctx);
                ctx.print("(", false);
                for (i, arg) in e.args.iter().enumerate() {
                    if i > 0 {
                        ctx.print(", ", false);
                    }
                    self.visit_expression(arg, ctx);
                }
                ctx.print(")", false);
            }
        }
    }
}

impl Default for AbstractEmitterVisitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `statements` at the given indentation width.
pub fn emit_statements(statements: &[o::Statement], indent_width: usize) -> String {
    let mut ctx = EmitterVisitorContext::new(0, indent_width);
    AbstractEmitterVisitor::new().visit_all_statements(statements, &mut ctx);
    ctx.to_source()
}
