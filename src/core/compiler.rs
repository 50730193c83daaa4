use crate::core::group::assemble_group;
use crate::core::grouper::group_records;
use crate::core::naming::NamingConvention;
use crate::domain::model::{AccessRequirementRecord, CollisionPolicy, CompileResult};
use crate::domain::ports::TemplateStore;
use crate::utils::error::Result;

/// Runs grouping and assembly for a whole mapping. Output is all-or-nothing:
/// the first failing group aborts compilation.
pub struct TemplateCompiler<T: TemplateStore> {
    store: T,
    naming: NamingConvention,
    collision_policy: CollisionPolicy,
    skip_malformed: bool,
}

impl<T: TemplateStore> TemplateCompiler<T> {
    pub fn new(store: T) -> Self {
        Self {
            store,
            naming: NamingConvention::default(),
            collision_policy: CollisionPolicy::default(),
            skip_malformed: false,
        }
    }

    pub fn with_naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_collision_policy(mut self, collision_policy: CollisionPolicy) -> Self {
        self.collision_policy = collision_policy;
        self
    }

    pub fn with_skip_malformed(mut self, skip_malformed: bool) -> Self {
        self.skip_malformed = skip_malformed;
        self
    }

    pub fn store(&self) -> &T {
        &self.store
    }

    pub fn compile(&self, records: Vec<AccessRequirementRecord>) -> Result<CompileResult> {
        let total = records.len();
        let grouped = group_records(records, &self.naming, self.skip_malformed)?;
        tracing::info!(
            "Grouped {} records into {} groups",
            total - grouped.skipped.len(),
            grouped.groups.len()
        );

        let mut documents = Vec::with_capacity(grouped.groups.len());
        let mut collisions = 0;
        for group in &grouped.groups {
            let assembly =
                assemble_group(&self.store, &self.naming, self.collision_policy, group)?;
            collisions += assembly.collisions.len();
            documents.push(assembly.document);
        }

        Ok(CompileResult {
            documents,
            records_compiled: total - grouped.skipped.len(),
            records_skipped: grouped.skipped.len(),
            collisions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::template_store::sample_store;
    use crate::domain::model::OutputFormat;
    use crate::utils::error::CompilerError;

    fn records() -> Vec<AccessRequirementRecord> {
        vec![
            AccessRequirementRecord::new("ADFS-DataAnalyst_Retail")
                .with_requirement("S3", "ReadOnly|Effect:Allow;Resource:b1,b2;Source:retail")
                .with_requirement("Athena", "FALSE"),
            AccessRequirementRecord::new("ADFS-Engineer_Retail")
                .with_requirement("S3", "Full|Effect:Allow;Resource:b1;Source:retail|Effect:Deny;Resource:b3;Source:retail")
                .with_requirement("Athena", "ReadOnly|Effect:Allow;Resource:wg;Source:retail"),
            AccessRequirementRecord::new("ADFS-DataAnalyst_Finance")
                .with_requirement("S3", "FALSE")
                .with_requirement("Athena", "FALSE"),
        ]
    }

    #[test]
    fn test_compile_groups_into_documents() {
        let compiler = TemplateCompiler::new(sample_store());
        let result = compiler.compile(records()).unwrap();

        let names: Vec<_> = result.documents.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["dataanalyst-iam-template", "engineer-iam-template"]);
        assert_eq!(result.records_compiled, 3);
        assert_eq!(result.records_skipped, 0);
        assert_eq!(result.collisions, 0);
        assert_eq!(result.documents[0].len(), 2);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let compiler = TemplateCompiler::new(sample_store());
        let first = compiler.compile(records()).unwrap();
        let second = compiler.compile(records()).unwrap();

        for (a, b) in first.documents.iter().zip(second.documents.iter()) {
            assert_eq!(
                OutputFormat::Yaml.render(a).unwrap(),
                OutputFormat::Yaml.render(b).unwrap()
            );
            assert_eq!(
                OutputFormat::Json.render(a).unwrap(),
                OutputFormat::Json.render(b).unwrap()
            );
        }
    }

    #[test]
    fn test_skip_malformed() {
        let mut input = records();
        input.push(AccessRequirementRecord::new("NoSeparators"));

        let strict = TemplateCompiler::new(sample_store());
        assert!(matches!(
            strict.compile(input.clone()),
            Err(CompilerError::MalformedRoleName { .. })
        ));

        let lenient = TemplateCompiler::new(sample_store()).with_skip_malformed(true);
        let result = lenient.compile(input).unwrap();
        assert_eq!(result.records_skipped, 1);
        assert_eq!(result.records_compiled, 3);
    }

    #[test]
    fn test_custom_naming_convention() {
        let naming = NamingConvention {
            role_name_field: "Role".to_string(),
            role_prefix: "SSO-".to_string(),
        };
        let compiler = TemplateCompiler::new(sample_store()).with_naming(naming);
        let result = compiler
            .compile(vec![AccessRequirementRecord::new("SSO-Ops_Finance")])
            .unwrap();

        assert!(result.documents[0].get("OpsFinance").is_some());
    }
}
