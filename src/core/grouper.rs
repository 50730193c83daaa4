use crate::core::naming::NamingConvention;
use crate::domain::model::{AccessRequirementRecord, RoleGroup};
use crate::utils::error::{CompilerError, Result};

#[derive(Debug, Clone)]
pub struct GroupedRecords {
    pub groups: Vec<RoleGroup>,
    /// Role names dropped because they did not follow the naming convention.
    pub skipped: Vec<String>,
}

/// Partitions records by role key. Groups come out in order of first
/// appearance and keep their records in input order.
///
/// With `skip_malformed` unset, the first malformed role name aborts grouping.
pub fn group_records(
    records: Vec<AccessRequirementRecord>,
    naming: &NamingConvention,
    skip_malformed: bool,
) -> Result<GroupedRecords> {
    let mut groups: Vec<RoleGroup> = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        let key = match naming.role_key(&record.role_name) {
            Ok(key) => key,
            Err(err @ CompilerError::MalformedRoleName { .. }) if skip_malformed => {
                tracing::warn!("Skipping record: {}", err);
                skipped.push(record.role_name);
                continue;
            }
            Err(err) => return Err(err),
        };

        match groups.iter_mut().find(|group| group.key == key) {
            Some(group) => group.records.push(record),
            None => {
                tracing::debug!("New role group '{}'", key);
                groups.push(RoleGroup {
                    key,
                    records: vec![record],
                });
            }
        }
    }

    Ok(GroupedRecords { groups, skipped })
}
