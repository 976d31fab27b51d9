use azfunc_bindgen::handlers::{resolve_parameter, ParameterHandler};
use azfunc_bindgen::transform::GenerationContext;
use azfunc_bindgen::{BindingAnnotation, DeclaredType, ErrorCode, GeneratorOptions, ParameterSpec};
use azfunc_compiler::output::abstract_emitter::emit_statements;
use azfunc_compiler::parse_util::ParseSourceSpan;
use serde_json::json;

/// Renders the initializer produced for `param`.
fn initializer(param: &ParameterSpec) -> String {
    let options = GeneratorOptions::default();
    let ctx = GenerationContext::new(&options, []);
    let handler = resolve_parameter(param).expect("handler resolves");
    let expr = handler.invocation_process(&ctx).expect("type is accepted");
    emit_statements(&[expr.to_stmt()], 4)
}

fn queue_trigger(ty: DeclaredType) -> ParameterSpec {
    ParameterSpec::new("msg", ty)
        .annotated(BindingAnnotation::new("queueTrigger").with("queueName", "orders"))
}

#[cfg(test)]
mod dispatch {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_pick_variant_from_registry_role() {
        let trigger = queue_trigger(DeclaredType::String);
        assert!(matches!(
            resolve_parameter(&trigger),
            Ok(ParameterHandler::Trigger { .. })
        ));

        let output = ParameterSpec::new("out", DeclaredType::String)
            .annotated(BindingAnnotation::new("queueOutput").with("queueName", "done"));
        assert!(matches!(
            resolve_parameter(&output),
            Ok(ParameterHandler::Output { .. })
        ));

        let input = ParameterSpec::new("doc", DeclaredType::Json).annotated(
            BindingAnnotation::new("cosmosDBInput")
                .with("connectionStringSetting", "CosmosDB")
                .with("databaseName", "shop")
                .with("collectionName", "orders"),
        );
        assert!(matches!(
            resolve_parameter(&input),
            Ok(ParameterHandler::Input { .. })
        ));
    }

    #[test]
    fn should_pick_context_for_unannotated_context_role() {
        let param = ParameterSpec::context("ctx");
        let handler = resolve_parameter(&param).expect("context");
        assert!(matches!(handler, ParameterHandler::Context { .. }));
        assert!(handler.generate_binding().is_none());
    }

    #[test]
    fn should_reject_unknown_kind() {
        let param = ParameterSpec::new("msg", DeclaredType::String)
            .annotated(BindingAnnotation::new("eventGridTrigger"))
            .with_span(ParseSourceSpan::point("main.bal", 7, 5));
        let err = resolve_parameter(&param).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownBindingKind);
        assert!(err.message.contains("eventGridTrigger"));
    }

    #[test]
    fn should_reject_unannotated_normal_parameter() {
        let param = ParameterSpec::new("x", DeclaredType::String);
        let err = resolve_parameter(&param).unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingBindingAnnotation);
    }

    #[test]
    fn should_reject_function_marker_on_parameter() {
        let param = ParameterSpec::new("x", DeclaredType::String)
            .annotated(BindingAnnotation::new("function"));
        let err = resolve_parameter(&param).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownBindingKind);
        assert!(err.message.contains("marks a function"));
    }
}

#[cfg(test)]
mod invocation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_read_string_trigger_payload() {
        assert_eq!(
            initializer(&queue_trigger(DeclaredType::String)),
            r#"af:getStringFromInputData(params, "msg");"#
        );
        assert_eq!(
            initializer(&queue_trigger(DeclaredType::Json)),
            r#"af:getJsonFromInputData(params, "msg");"#
        );
    }

    #[test]
    fn should_read_http_body_for_plain_http_trigger_types() {
        let body = ParameterSpec::new("body", DeclaredType::Json)
            .annotated(BindingAnnotation::new("httpTrigger"));
        assert_eq!(
            initializer(&body),
            r#"af:getJsonFromHttpBody(params, "body");"#
        );

        let request = ParameterSpec::new("req", DeclaredType::named("HttpRequest"))
            .annotated(BindingAnnotation::new("httpTrigger"));
        assert_eq!(
            initializer(&request),
            r#"af:getHttpRequestFromInputData(params, "req");"#
        );
    }

    #[test]
    fn should_pass_type_descriptor_for_records() {
        let param = ParameterSpec::new("orders", DeclaredType::array_of(DeclaredType::record("Order")))
            .annotated(
                BindingAnnotation::new("cosmosDBTrigger")
                    .with("connectionStringSetting", "CosmosDB")
                    .with("databaseName", "shop")
                    .with("collectionName", "orders"),
            );
        assert_eq!(
            initializer(&param),
            r#"af:getRecordFromInputData(params, "orders", Order[]);"#
        );
    }

    #[test]
    fn should_escape_record_type_names() {
        let param = ParameterSpec::new("items", DeclaredType::array_of(DeclaredType::record("line-item")))
            .annotated(
                BindingAnnotation::new("cosmosDBInput")
                    .with("connectionStringSetting", "CosmosDB")
                    .with("databaseName", "shop")
                    .with("collectionName", "items"),
            );
        assert_eq!(
            initializer(&param),
            r#"af:getRecordFromInputData(params, "items", 'line\-item[]);"#
        );
    }

    #[test]
    fn should_capture_outputs_in_fresh_binding() {
        let param = ParameterSpec::new("out", DeclaredType::Bytes)
            .annotated(BindingAnnotation::new("blobOutput").with("path", "out/{id}"));
        assert_eq!(initializer(&param), "af:newOutputBinding();");
    }

    #[test]
    fn should_materialize_context() {
        assert_eq!(
            initializer(&ParameterSpec::context("ctx")),
            "af:createContext(params);"
        );
    }

    #[test]
    fn should_prefer_metadata_name_key() {
        let renamed = ParameterSpec::new("id", DeclaredType::String)
            .annotated(BindingAnnotation::new("bindingName").with("name", "orderId"));
        assert_eq!(
            initializer(&renamed),
            r#"af:getStringFromMetadata(params, "orderId");"#
        );

        let plain = ParameterSpec::new("meta", DeclaredType::Json)
            .annotated(BindingAnnotation::new("bindingName"));
        assert_eq!(
            initializer(&plain),
            r#"af:getJsonFromMetadata(params, "meta");"#
        );
    }

    #[test]
    fn should_print_unqualified_calls_without_runtime_module() {
        let options = GeneratorOptions {
            runtime_module: String::new(),
            ..GeneratorOptions::default()
        };
        let ctx = GenerationContext::new(&options, []);
        let param = queue_trigger(DeclaredType::String);
        let handler = resolve_parameter(&param).expect("resolves");
        let expr = handler.invocation_process(&ctx).expect("accepted");
        assert_eq!(
            emit_statements(&[expr.to_stmt()], 4),
            r#"getStringFromInputData(params, "msg");"#
        );
    }
}

#[cfg(test)]
mod type_checks {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unsupported(param: &ParameterSpec) -> String {
        let options = GeneratorOptions::default();
        let ctx = GenerationContext::new(&options, []);
        let handler = resolve_parameter(param).expect("resolves");
        let err = handler.invocation_process(&ctx).unwrap_err();
        assert_eq!(err.code, ErrorCode::UnsupportedParameterType);
        err.message
    }

    #[test]
    fn should_reject_bytes_queue_trigger() {
        let message = unsupported(&queue_trigger(DeclaredType::Bytes));
        assert!(message.contains("`byte[]`"), "{}", message);
        assert!(message.contains("string, json"), "{}", message);
    }

    #[test]
    fn should_reject_json_blob_trigger() {
        let param = ParameterSpec::new("blob", DeclaredType::Json)
            .annotated(BindingAnnotation::new("blobTrigger").with("path", "in/{name}"));
        assert!(unsupported(&param).contains("`json`"));
    }

    #[test]
    fn should_reject_foreign_named_type_on_output() {
        let param = ParameterSpec::new("res", DeclaredType::named("HttpRequest"))
            .annotated(BindingAnnotation::new("httpOutput"));
        assert!(unsupported(&param).contains("`HttpRequest`"));
    }

    #[test]
    fn should_reject_boolean_metadata() {
        let param = ParameterSpec::new("flag", DeclaredType::Boolean)
            .annotated(BindingAnnotation::new("bindingName"));
        unsupported(&param);
    }
}

#[cfg(test)]
mod post_invocation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn should_append_setter_for_outputs_only() {
        let options = GeneratorOptions::default();
        let mut ctx = GenerationContext::new(&options, []);
        let output = ParameterSpec::new("thumb", DeclaredType::Bytes)
            .annotated(BindingAnnotation::new("blobOutput").with("path", "thumbs/{name}"));
        let trigger = queue_trigger(DeclaredType::String);

        resolve_parameter(&trigger)
            .expect("trigger")
            .post_invocation_process(&mut ctx, "__v0")
            .expect("no-op");
        resolve_parameter(&output)
            .expect("output")
            .post_invocation_process(&mut ctx, "__v1")
            .expect("setter");

        assert_eq!(
            emit_statements(ctx.assembler.post_call(), 4),
            r#"af:setBytesOutput(params, "thumb", __v1);"#
        );
        assert!(ctx.assembler.pre_call().is_empty());
    }

    #[test]
    fn should_describe_blob_output_as_string() {
        let output = ParameterSpec::new("thumb", DeclaredType::Bytes)
            .annotated(BindingAnnotation::new("blobOutput").with("path", "thumbs/{name}"));
        let fragment = resolve_parameter(&output)
            .expect("output")
            .generate_binding()
            .expect("fragment");
        assert_eq!(
            fragment.to_json(),
            json!({
                "type": "blob",
                "path": "thumbs/{name}",
                "connection": "AzureWebJobsStorage",
                "dataType": "string",
                "direction": "out",
                "name": "thumb"
            })
        );
    }

    #[test]
    fn should_not_describe_metadata() {
        let param = ParameterSpec::new("id", DeclaredType::String)
            .annotated(BindingAnnotation::new("bindingName"));
        let handler = resolve_parameter(&param).expect("metadata");
        assert_eq!(handler.binding_name(), "id");
        assert!(handler.generate_binding().is_none());
    }
}
