use crate::core::naming::NamingConvention;
use crate::core::role::assemble_role;
use crate::domain::model::{CollisionPolicy, GroupDocument, RoleGroup, Upsert};
use crate::domain::ports::TemplateStore;
use crate::utils::error::{CompilerError, Result};

#[derive(Debug, Clone)]
pub struct GroupAssembly {
    pub document: GroupDocument,
    /// Resource names that were overwritten by a later record.
    pub collisions: Vec<String>,
}

/// Builds the document for one group. Any failing record fails the group.
pub fn assemble_group<T: TemplateStore + ?Sized>(
    store: &T,
    naming: &NamingConvention,
    collision_policy: CollisionPolicy,
    group: &RoleGroup,
) -> Result<GroupAssembly> {
    let mut document = GroupDocument::new(&group.key, store.header()?);
    let mut collisions = Vec::new();

    for record in &group.records {
        let role = assemble_role(store, naming, &group.key, record)?;

        if collision_policy == CollisionPolicy::Reject && document.get(&role.resource_name).is_some()
        {
            return Err(CompilerError::DuplicateResourceName {
                group: group.key.clone(),
                resource_name: role.resource_name,
            });
        }

        let resource_name = role.resource_name.clone();
        if let Upsert::Replaced(previous) = document.upsert(role) {
            tracing::warn!(
                "Resource {} in group {}: role {} replaced by {}",
                resource_name,
                group.key,
                previous.role_name,
                record.role_name
            );
            collisions.push(resource_name);
        }
    }

    tracing::info!(
        "Group {} assembled: {} roles from {} records",
        group.key,
        document.len(),
        group.records.len()
    );

    Ok(GroupAssembly {
        document,
        collisions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::template_store::sample_store;
    use crate::domain::model::AccessRequirementRecord;

    fn group(records: Vec<AccessRequirementRecord>) -> RoleGroup {
        RoleGroup {
            key: "DataAnalyst".to_string(),
            records,
        }
    }

    #[test]
    fn test_assemble_group() {
        let store = sample_store();
        let records = vec![
            AccessRequirementRecord::new("ADFS-DataAnalyst_Retail")
                .with_requirement("S3", "ReadOnly|Effect:Allow;Resource:b1;Source:retail"),
            AccessRequirementRecord::new("ADFS-DataAnalyst_Finance")
                .with_requirement("S3", "FALSE"),
        ];

        let assembly = assemble_group(
            &store,
            &NamingConvention::default(),
            CollisionPolicy::Overwrite,
            &group(records),
        )
        .unwrap();

        let document = assembly.document;
        assert_eq!(document.name, "dataanalyst-iam-template");
        assert_eq!(document.header, store.header().unwrap());
        let names: Vec<_> = document.roles().iter().map(|r| r.resource_name.as_str()).collect();
        assert_eq!(names, vec!["DataAnalystRetail", "DataAnalystFinance"]);
        assert!(assembly.collisions.is_empty());
    }

    #[test]
    fn test_collision_overwrites_by_default() {
        let store = sample_store();
        let records = vec![
            AccessRequirementRecord::new("ADFS-DataAnalyst_Retail").with_requirement("S3", "FALSE"),
            AccessRequirementRecord::new("ADFS_DataAnalyst-Retail")
                .with_requirement("S3", "Full|Effect:Allow;Resource:b;Source:s"),
        ];

        let assembly = assemble_group(
            &store,
            &NamingConvention::default(),
            CollisionPolicy::Overwrite,
            &group(records),
        )
        .unwrap();

        assert_eq!(assembly.document.len(), 1);
        assert_eq!(assembly.collisions, vec!["DataAnalystRetail".to_string()]);
        let role = assembly.document.get("DataAnalystRetail").unwrap();
        assert_eq!(role.role_name, "ADFS_DataAnalyst-Retail");
        assert_eq!(role.policy_names().len(), 2);
    }

    #[test]
    fn test_collision_rejected_when_configured() {
        let store = sample_store();
        let records = vec![
            AccessRequirementRecord::new("ADFS-DataAnalyst_Retail"),
            AccessRequirementRecord::new("ADFS-DataAnalyst-Retail"),
        ];

        let err = assemble_group(
            &store,
            &NamingConvention::default(),
            CollisionPolicy::Reject,
            &group(records),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CompilerError::DuplicateResourceName { resource_name, .. } if resource_name == "DataAnalystRetail"
        ));
    }

    #[test]
    fn test_failing_record_fails_group() {
        let store = sample_store();
        let records = vec![
            AccessRequirementRecord::new("ADFS-DataAnalyst_Retail"),
            AccessRequirementRecord::new("ADFS-DataAnalyst_Finance")
                .with_requirement("Glue", "ReadOnly|Effect:Allow;Resource:db;Source:finance"),
        ];

        assert!(assemble_group(
            &store,
            &NamingConvention::default(),
            CollisionPolicy::Overwrite,
            &group(records),
        )
        .is_err());
    }
}
