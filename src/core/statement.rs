use crate::core::arn;
use crate::core::grammar::{self, StatementDefinition};
use crate::domain::model::{Effect, PermissionStatement};
use crate::domain::ports::TemplateStore;
use crate::utils::error::{CompilerError, Result};

/// Shape shared by every deny statement, whatever the service.
pub const DENY_SHAPE_KEY: &str = "Deny";

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRequirement {
    pub access_level: String,
    pub statements: Vec<PermissionStatement>,
}

pub fn shape_key(service: &str, access_level: &str, effect: Effect) -> String {
    match effect {
        Effect::Deny => DENY_SHAPE_KEY.to_string(),
        Effect::Allow => format!("{}{}", service, access_level),
    }
}

/// Compiles one grammar string for `service` into populated statements, in
/// source order.
pub fn compile<T: TemplateStore + ?Sized>(
    store: &T,
    service: &str,
    requirement: &str,
) -> Result<CompiledRequirement> {
    let parsed = grammar::parse(requirement).map_err(|err| CompilerError::MalformedRequirement {
        service: service.to_string(),
        input: requirement.to_string(),
        position: err.position,
        reason: err.reason,
    })?;

    let statements = parsed
        .statements
        .iter()
        .map(|definition| populate(store, service, &parsed.access_level, definition))
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledRequirement {
        access_level: parsed.access_level,
        statements,
    })
}

fn populate<T: TemplateStore + ?Sized>(
    store: &T,
    service: &str,
    access_level: &str,
    definition: &StatementDefinition,
) -> Result<PermissionStatement> {
    let key = shape_key(service, access_level, definition.effect);
    let shape = store.statement_shape(&key)?;
    let resources = arn::resolve(service, &definition.resources, &definition.sources);

    tracing::debug!(
        "Statement {} for {}: {} resources from shape {}",
        definition.effect,
        service,
        resources.len(),
        key
    );

    Ok(PermissionStatement::from_shape(
        shape,
        definition.effect,
        resources,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::template_store::sample_store;

    #[test]
    fn test_single_allow_statement() {
        let store = sample_store();
        let compiled = compile(
            &store,
            "S3",
            "ReadOnly|Effect:Allow;Resource:bucket1;Source:sys1",
        )
        .unwrap();

        assert_eq!(compiled.access_level, "ReadOnly");
        assert_eq!(compiled.statements.len(), 1);
        let statement = &compiled.statements[0];
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.resources, vec!["arn:aws:s3:::bucket1/sys1"]);
        assert_eq!(statement.shape, store.statement_shape("S3ReadOnly").unwrap());
    }

    #[test]
    fn test_deny_uses_service_agnostic_shape() {
        let store = sample_store();
        for service in ["S3", "Athena", "Unlisted"] {
            let compiled = compile(
                &store,
                service,
                "Full|Effect:Deny;Resource:bucket1,bucket2;Source:sys1",
            )
            .unwrap();

            let statement = &compiled.statements[0];
            assert_eq!(statement.effect, Effect::Deny);
            assert_eq!(statement.shape, store.statement_shape(DENY_SHAPE_KEY).unwrap());
            assert_eq!(statement.resources.len(), 2);
        }
    }

    #[test]
    fn test_statements_stay_separate_and_ordered() {
        let store = sample_store();
        let compiled = compile(
            &store,
            "S3",
            "Full|Effect:Allow;Resource:a;Source:x,y|Effect:Deny;Resource:b;Source:x",
        )
        .unwrap();

        assert_eq!(compiled.statements.len(), 2);
        assert_eq!(
            compiled.statements[0].resources,
            vec!["arn:aws:s3:::a/x", "arn:aws:s3:::a/y"]
        );
        assert_eq!(compiled.statements[1].effect, Effect::Deny);
    }

    #[test]
    fn test_missing_shape_is_fatal() {
        let store = sample_store();
        let err = compile(&store, "Glue", "ReadOnly|Effect:Allow;Resource:a;Source:x").unwrap_err();
        assert!(matches!(err, CompilerError::TemplateNotFound { name } if name == "GlueReadOnly"));
    }

    #[test]
    fn test_missing_shape_not_needed_without_statements() {
        let store = sample_store();
        let compiled = compile(&store, "Glue", "ReadOnly").unwrap();
        assert!(compiled.statements.is_empty());
    }

    #[test]
    fn test_malformed_requirement_carries_service_and_position() {
        let store = sample_store();
        let err = compile(&store, "S3", "ReadOnly|Effect:Allow;Resource:a").unwrap_err();
        match err {
            CompilerError::MalformedRequirement {
                service, position, ..
            } => {
                assert_eq!(service, "S3");
                assert_eq!(position, 32);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
