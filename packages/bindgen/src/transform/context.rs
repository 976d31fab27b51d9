//! Per-function generation state.

use crate::config::GeneratorOptions;
use azfunc_compiler::output::output_ast::{self as o, Expression, Statement};
use std::collections::HashSet;

/// Ordered accumulator of synthetic statements around the user body.
#[derive(Debug, Default, Clone)]
pub struct CodeAssembler {
    pre_call: Vec<Statement>,
    post_call: Vec<Statement>,
}

impl CodeAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a statement to run before the user body.
    pub fn prepend(&mut self, stmt: Statement) {
        self.pre_call.push(stmt);
    }

    /// Queues a statement to run after the user body.
    pub fn append(&mut self, stmt: Statement) {
        self.post_call.push(stmt);
    }

    pub fn pre_call(&self) -> &[Statement] {
        &self.pre_call
    }

    pub fn post_call(&self) -> &[Statement] {
        &self.post_call
    }

    /// Pre-call statements, then `user_body` untouched, then post-call
    /// statements.
    pub fn assemble(self, user_body: Vec<Statement>) -> Vec<Statement> {
        let mut body =
            Vec::with_capacity(self.pre_call.len() + user_body.len() + self.post_call.len());
        body.extend(self.pre_call);
        body.extend(user_body);
        body.extend(self.post_call);
        body
    }
}

/// State private to the generation of one function. Never shared.
pub struct GenerationContext<'o> {
    options: &'o GeneratorOptions,
    name_counter: usize,
    reserved: HashSet<String>,
    pub assembler: CodeAssembler,
}

impl<'o> GenerationContext<'o> {
    /// `reserved` names are never handed out as synthetic names.
    pub fn new<'a>(
        options: &'o GeneratorOptions,
        reserved: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        let mut reserved: HashSet<String> = reserved.into_iter().map(str::to_string).collect();
        reserved.insert(options.invocation_handle.clone());
        GenerationContext {
            options,
            name_counter: 0,
            reserved,
            assembler: CodeAssembler::new(),
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        self.options
    }

    /// A fresh synthetic variable name, distinct from every name handed out
    /// before and from the reserved names.
    pub fn next_name(&mut self) -> String {
        loop {
            let name = format!("{}{}", self.options.synthetic_prefix, self.name_counter);
            self.name_counter += 1;
            if self.reserved.insert(name.clone()) {
                return name;
            }
        }
    }

    /// Reads the invocation parameters handle.
    pub fn handle(&self) -> Box<Expression> {
        o::variable(self.options.invocation_handle.as_str())
    }

    /// Calls a runtime support function with `args`.
    pub fn runtime_call(&self, name: &str, args: Vec<Expression>) -> Box<Expression> {
        o::import_expr(self.options.runtime_module(), name).call_fn(args)
    }

    /// Declares a synthetic variable initialised with `value` before the user
    /// body and returns its name.
    pub fn declare_synthetic(&mut self, value: Box<Expression>) -> String {
        let name = self.next_name();
        self.assembler.prepend(o::declare_var(name.as_str(), Some(value)));
        name
    }
}
