use crate::core::naming::ALL_PLATFORMS;
use crate::core::statement;
use crate::domain::model::{InlinePolicy, POLICY_DOCUMENT_KEY};
use crate::domain::ports::TemplateStore;
use crate::utils::error::{CompilerError, Result};
use serde_yaml::{Mapping, Value};

/// `<RoleKey><Platform><Service><AccessLevel>Access`; the `all` platform
/// contributes nothing.
pub fn policy_name(role_key: &str, platform: &str, service: &str, access_level: &str) -> String {
    let platform = if platform == ALL_PLATFORMS { "" } else { platform };
    format!("{}{}{}{}Access", role_key, platform, service, access_level)
}

/// Builds an empty policy from a stub mapping holding `PolicyDocument`; the
/// stub's `Statement` is replaced by the compiled statements when rendered.
pub fn instantiate(template: &str, stub: &Mapping, name: String) -> Result<InlinePolicy> {
    match stub.get(POLICY_DOCUMENT_KEY) {
        Some(Value::Mapping(document)) => Ok(InlinePolicy {
            name,
            statements: Vec::new(),
            document: document.clone(),
        }),
        _ => Err(CompilerError::InvalidTemplate {
            name: template.to_string(),
            reason: format!("policy has no {} mapping", POLICY_DOCUMENT_KEY),
        }),
    }
}

/// Compiles `requirement` for one service into a named inline policy.
pub fn assemble_policy<T: TemplateStore + ?Sized>(
    store: &T,
    role_key: &str,
    platform: &str,
    service: &str,
    requirement: &str,
) -> Result<InlinePolicy> {
    let compiled = statement::compile(store, service, requirement)?;
    let name = policy_name(role_key, platform, service, &compiled.access_level);

    if compiled.statements.is_empty() {
        tracing::warn!("Policy {} has no statements", name);
    }

    let mut policy = instantiate("policy stub", &store.policy_stub()?, name)?;
    policy.statements = compiled.statements;

    tracing::debug!(
        "Assembled policy {} with {} statements",
        policy.name,
        policy.statements.len()
    );
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::template_store::sample_store;
    use crate::domain::model::Effect;

    #[test]
    fn test_policy_name() {
        assert_eq!(
            policy_name("DataAnalyst", "Retail", "S3", "ReadOnly"),
            "DataAnalystRetailS3ReadOnlyAccess"
        );
        assert_eq!(
            policy_name("DataAnalyst", ALL_PLATFORMS, "Athena", "Full"),
            "DataAnalystAthenaFullAccess"
        );
    }

    #[test]
    fn test_assemble_policy() {
        let store = sample_store();
        let policy = assemble_policy(
            &store,
            "DataAnalyst",
            "Retail",
            "S3",
            "ReadOnly|Effect:Allow;Resource:bucket1;Source:sys1",
        )
        .unwrap();

        assert_eq!(policy.name, "DataAnalystRetailS3ReadOnlyAccess");
        assert_eq!(policy.statements.len(), 1);
        assert_eq!(policy.statements[0].effect, Effect::Allow);

        let rendered = policy.to_value();
        assert!(rendered["PolicyName"] == "DataAnalystRetailS3ReadOnlyAccess");
        assert!(rendered["PolicyDocument"]["Version"] == "2012-10-17");
        assert!(rendered["PolicyDocument"]["Statement"][0]["Resource"][0] == "arn:aws:s3:::bucket1/sys1");
    }

    #[test]
    fn test_instantiate_rejects_stub_without_document() {
        let stub: Mapping = serde_yaml::from_str("PolicyName: X\n").unwrap();
        assert!(matches!(
            instantiate("policy stub", &stub, "Y".to_string()),
            Err(CompilerError::InvalidTemplate { .. })
        ));
    }

    #[test]
    fn test_instantiate_replaces_stub_statements() {
        let stub: Mapping = serde_yaml::from_str(
            "PolicyDocument:\n  Version: '2012-10-17'\n  Statement:\n    - Effect: Allow\n      Action: sts:GetCallerIdentity\n      Resource: '*'\n",
        )
        .unwrap();
        let policy = instantiate("policy stub", &stub, "P".to_string()).unwrap();
        assert!(policy.statements.is_empty());

        let rendered = policy.to_value();
        assert!(rendered["PolicyDocument"]["Version"] == "2012-10-17");
        assert_eq!(
            rendered["PolicyDocument"]["Statement"].as_sequence().unwrap().len(),
            0
        );
    }
}
