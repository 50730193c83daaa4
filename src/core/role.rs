use crate::core::naming::NamingConvention;
use crate::core::policy;
use crate::domain::model::{
    AccessRequirementRecord, RoleDocument, POLICIES_KEY, POLICY_NAME_KEY, PROPERTIES_KEY,
};
use crate::domain::ports::TemplateStore;
use crate::utils::error::{CompilerError, Result};
use serde_yaml::Value;

/// Key of the single entry in the role stub.
pub const ROLE_STUB_PLACEHOLDER: &str = "RESOURCE_NAME";
const ROLE_STUB: &str = "role stub";

/// Instantiates the role stub for one record. Stub policies are kept as
/// written except that the first is renamed `<resourceName>BasePolicy`; one
/// policy per granted service follows in column order.
pub fn assemble_role<T: TemplateStore + ?Sized>(
    store: &T,
    naming: &NamingConvention,
    role_key: &str,
    record: &AccessRequirementRecord,
) -> Result<RoleDocument> {
    let resource_name = naming.resource_name(&record.role_name)?;
    let platform = naming.platform(&record.role_name);

    let stub = store.role_stub()?;
    let body = match stub.get(ROLE_STUB_PLACEHOLDER) {
        Some(Value::Mapping(body)) => body.clone(),
        _ => {
            return Err(CompilerError::TemplateNotFound {
                name: format!("{} entry {}", ROLE_STUB, ROLE_STUB_PLACEHOLDER),
            })
        }
    };

    let stub_policies = match body.get(PROPERTIES_KEY).and_then(|p| p.get(POLICIES_KEY)) {
        Some(Value::Sequence(policies)) if !policies.is_empty() => policies,
        _ => {
            return Err(CompilerError::InvalidTemplate {
                name: ROLE_STUB.to_string(),
                reason: format!(
                    "expected a base policy under {}.{}",
                    PROPERTIES_KEY, POLICIES_KEY
                ),
            })
        }
    };

    let mut stub_policies = stub_policies
        .iter()
        .map(|policy| {
            policy
                .as_mapping()
                .cloned()
                .ok_or_else(|| CompilerError::InvalidTemplate {
                    name: ROLE_STUB.to_string(),
                    reason: "policies must be mappings".to_string(),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    if let Some(base) = stub_policies.first_mut() {
        base.insert(
            POLICY_NAME_KEY.into(),
            format!("{}BasePolicy", resource_name).into(),
        );
    }

    let mut policies = Vec::with_capacity(record.requirements.len());
    for (service, requirement) in record.grants() {
        policies.push(policy::assemble_policy(
            store,
            role_key,
            &platform,
            service,
            requirement,
        )?);
    }

    tracing::debug!(
        "Assembled role {} ({}) with {} policies",
        resource_name,
        record.role_name,
        stub_policies.len() + policies.len()
    );

    Ok(RoleDocument {
        resource_name,
        role_name: record.role_name.clone(),
        stub_policies,
        policies,
        body,
    })
}
