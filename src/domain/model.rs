use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;

pub const EFFECT_KEY: &str = "Effect";
pub const RESOURCE_KEY: &str = "Resource";
pub const STATEMENT_KEY: &str = "Statement";
pub const POLICY_NAME_KEY: &str = "PolicyName";
pub const POLICY_DOCUMENT_KEY: &str = "PolicyDocument";
pub const PROPERTIES_KEY: &str = "Properties";
pub const ROLE_NAME_KEY: &str = "RoleName";
pub const POLICIES_KEY: &str = "Policies";
pub const RESOURCES_KEY: &str = "Resources";

/// What a single mapping cell asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessRequirement {
    /// The `FALSE` cell.
    Denied,
    /// Blank cell.
    Unspecified,
    /// A requirement-grammar string, e.g. `ReadOnly|Effect:Allow;Resource:b1;Source:s1`.
    Grant(String),
}

impl AccessRequirement {
    pub const DENIED_SENTINEL: &'static str = "FALSE";

    pub fn from_cell(cell: &str) -> Self {
        let trimmed = cell.trim();
        if trimmed.is_empty() {
            Self::Unspecified
        } else if trimmed == Self::DENIED_SENTINEL {
            Self::Denied
        } else {
            Self::Grant(trimmed.to_string())
        }
    }

    pub fn grammar(&self) -> Option<&str> {
        match self {
            Self::Grant(grammar) => Some(grammar),
            Self::Denied | Self::Unspecified => None,
        }
    }
}

/// One row of the mapping file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequirementRecord {
    pub role_name: String,
    /// `(service, requirement)` in column order.
    pub requirements: Vec<(String, AccessRequirement)>,
}

impl AccessRequirementRecord {
    pub fn new(role_name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            requirements: Vec::new(),
        }
    }

    pub fn with_requirement(mut self, service: impl Into<String>, cell: &str) -> Self {
        self.requirements
            .push((service.into(), AccessRequirement::from_cell(cell)));
        self
    }

    /// Services with a grammar string, in column order.
    pub fn grants(&self) -> impl Iterator<Item = (&str, &str)> {
        self.requirements
            .iter()
            .filter_map(|(service, req)| req.grammar().map(|g| (service.as_str(), g)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGroup {
    pub key: String,
    pub records: Vec<AccessRequirementRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "Allow",
            Effect::Deny => "Deny",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A populated statement shape. `shape` keeps every field of the stub in
/// order; `Effect` and `Resource` are overridden when rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct PermissionStatement {
    pub effect: Effect,
    pub resources: Vec<String>,
    pub shape: Mapping,
}

impl PermissionStatement {
    pub fn from_shape(shape: Mapping, effect: Effect, resources: Vec<String>) -> Self {
        Self {
            effect,
            resources,
            shape,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut rendered = self.shape.clone();
        rendered.insert(EFFECT_KEY.into(), self.effect.as_str().into());
        rendered.insert(
            RESOURCE_KEY.into(),
            Value::Sequence(self.resources.iter().map(|r| r.as_str().into()).collect()),
        );
        Value::Mapping(rendered)
    }
}

/// An inline policy built from the policy stub.
#[derive(Debug, Clone, PartialEq)]
pub struct InlinePolicy {
    pub name: String,
    pub statements: Vec<PermissionStatement>,
    /// `PolicyDocument` from the stub; `Statement` is replaced when rendered.
    pub document: Mapping,
}

impl InlinePolicy {
    pub fn to_value(&self) -> Value {
        let mut document = self.document.clone();
        document.insert(
            STATEMENT_KEY.into(),
            Value::Sequence(self.statements.iter().map(PermissionStatement::to_value).collect()),
        );

        let mut policy = Mapping::new();
        policy.insert(POLICY_NAME_KEY.into(), self.name.as_str().into());
        policy.insert(POLICY_DOCUMENT_KEY.into(), Value::Mapping(document));
        Value::Mapping(policy)
    }
}

/// One IAM role resource.
#[derive(Debug, Clone, PartialEq)]
pub struct RoleDocument {
    pub resource_name: String,
    pub role_name: String,
    /// Policies copied verbatim from the role stub; only the first is renamed.
    pub stub_policies: Vec<Mapping>,
    /// One compiled policy per granted service, after the stub policies.
    pub policies: Vec<InlinePolicy>,
    /// The stub's resource body (`Type`, `Properties`, ...).
    pub body: Mapping,
}

impl RoleDocument {
    pub fn policy_names(&self) -> Vec<String> {
        self.stub_policies
            .iter()
            .filter_map(|policy| policy.get(POLICY_NAME_KEY).and_then(Value::as_str))
            .map(str::to_string)
            .chain(self.policies.iter().map(|policy| policy.name.clone()))
            .collect()
    }

    pub fn to_value(&self) -> Value {
        let mut body = self.body.clone();
        let mut properties = match body.get(PROPERTIES_KEY) {
            Some(Value::Mapping(properties)) => properties.clone(),
            _ => Mapping::new(),
        };
        properties.insert(ROLE_NAME_KEY.into(), self.role_name.as_str().into());
        properties.insert(
            POLICIES_KEY.into(),
            Value::Sequence(
                self.stub_policies
                    .iter()
                    .cloned()
                    .map(Value::Mapping)
                    .chain(self.policies.iter().map(InlinePolicy::to_value))
                    .collect(),
            ),
        );
        body.insert(PROPERTIES_KEY.into(), Value::Mapping(properties));
        Value::Mapping(body)
    }
}

/// Result of inserting a role into a [`GroupDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert {
    Inserted,
    /// An entry with the same resource name existed and was replaced in place.
    Replaced(Box<RoleDocument>),
}

/// All roles of one group, written as a single template.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupDocument {
    pub name: String,
    pub header: Mapping,
    roles: Vec<RoleDocument>,
}

impl GroupDocument {
    pub fn new(group_key: &str, header: Mapping) -> Self {
        Self {
            name: format!("{}-iam-template", group_key.to_lowercase()),
            header,
            roles: Vec::new(),
        }
    }

    /// Last write wins: a role whose resource name already exists replaces
    /// the earlier one and keeps its position.
    pub fn upsert(&mut self, role: RoleDocument) -> Upsert {
        match self
            .roles
            .iter_mut()
            .find(|existing| existing.resource_name == role.resource_name)
        {
            Some(existing) => Upsert::Replaced(Box::new(std::mem::replace(existing, role))),
            None => {
                self.roles.push(role);
                Upsert::Inserted
            }
        }
    }

    pub fn get(&self, resource_name: &str) -> Option<&RoleDocument> {
        self.roles.iter().find(|r| r.resource_name == resource_name)
    }

    pub fn roles(&self) -> &[RoleDocument] {
        &self.roles
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    pub fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.name, format.extension())
    }

    pub fn to_value(&self) -> Value {
        let mut resources = Mapping::new();
        for role in &self.roles {
            resources.insert(role.resource_name.as_str().into(), role.to_value());
        }

        let mut document = self.header.clone();
        document.insert(RESOURCES_KEY.into(), Value::Mapping(resources));
        Value::Mapping(document)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Yaml => "yaml",
            OutputFormat::Json => "json",
        }
    }

    pub fn render(&self, document: &GroupDocument) -> Result<String> {
        let value = document.to_value();
        match self {
            OutputFormat::Yaml => Ok(serde_yaml::to_string(&value)?),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&value)?),
        }
    }
}

/// What to do when two records in a group resolve to the same resource name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Replace the earlier role, logging a warning.
    #[default]
    Overwrite,
    /// Fail the group with `DuplicateResourceName`.
    Reject,
}

#[derive(Debug, Clone)]
pub struct CompileResult {
    pub documents: Vec<GroupDocument>,
    pub records_compiled: usize,
    pub records_skipped: usize,
    pub collisions: usize,
}
