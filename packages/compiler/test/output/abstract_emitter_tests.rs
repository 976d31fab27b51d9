use azfunc_compiler::output::abstract_emitter::{
    emit_statements, escape_identifier, escape_string, is_legal_identifier,
};
use azfunc_compiler::output::output_ast as o;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_escape_double_quotes_and_backslashes() {
        assert_eq!(escape_string("a\"b\\c"), "\"a\\\"b\\\\c\"");
    }

    #[test]
    fn should_escape_newlines() {
        assert_eq!(escape_string("line\nnext"), "\"line\\nnext\"");
    }

    #[test]
    fn should_keep_legal_identifiers() {
        assert!(is_legal_identifier("__v0"));
        assert_eq!(escape_identifier("orderHandler"), "orderHandler");
    }

    #[test]
    fn should_quote_illegal_identifiers() {
        assert!(!is_legal_identifier("0abc"));
        assert_eq!(escape_identifier("my-fn"), "'my\\-fn");
    }

    #[test]
    fn should_emit_module_qualified_calls() {
        let call = o::import_expr(Some("af"), "getStringFromInputData")
            .call_fn(vec![*o::variable("params"), *o::literal("msg")]);
        let source = emit_statements(&[o::declare_var("__v0", Some(call))], 4);
        assert_eq!(
            source,
            "var __v0 = af:getStringFromInputData(params, \"msg\");"
        );
    }

    #[test]
    fn should_emit_function_with_indented_body() {
        let body = vec![
            o::declare_var("__v0", Some(o::literal(1i64))),
            o::variable("run")
                .call_fn(vec![*o::variable("__v0"), *o::literal(true)])
                .to_stmt(),
        ];
        let func = o::declare_fn(
            "runHandler",
            vec![o::FnParam {
                name: "params".to_string(),
            }],
            body,
        );
        assert_eq!(
            emit_statements(&[func], 4),
            "function runHandler(params) {\n    var __v0 = 1;\n    run(__v0, true);\n}"
        );
    }

    #[test]
    fn should_emit_nil_literal() {
        let stmt = o::Statement::Return(o::ReturnStatement {
            value: o::literal(o::LiteralValue::Null),
            source_span: None,
        });
        assert_eq!(emit_statements(&[stmt], 2), "return ();");
    }

    #[test]
    fn should_emit_type_refs_with_array_suffix() {
        let call = o::variable("read").call_fn(vec![*o::type_ref("Order", 1)]);
        assert_eq!(emit_statements(&[call.to_stmt()], 4), "read(Order[]);");
    }

    #[test]
    fn should_escape_illegal_type_ref_names() {
        let stmt = o::type_ref("line-item", 2).to_stmt();
        assert_eq!(emit_statements(&[stmt], 4), "'line\\-item[][];");
    }
}
