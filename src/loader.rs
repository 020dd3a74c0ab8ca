//! Declarative policy configuration.
//!
//! Policies that only inspect claims can be kept in a JSON document instead
//! of code:
//!
//! ```json
//! {
//!   "policies": [
//!     {
//!       "name": "SearchPolicy",
//!       "require_authenticated_user": true,
//!       "requirements": [
//!         { "claim": { "type": "role", "any_of": ["Admin", "Customer"] } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Predicate assertions have no textual form; register those in code.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AuthzError;
use crate::registry::PolicyRegistry;
use crate::types::{ClaimRequirement, Policy, Requirement};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    pub policies: Vec<PolicyDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PolicyDefinition {
    pub name: String,
    #[serde(default)]
    pub require_authenticated_user: bool,
    #[serde(default)]
    pub requirements: Vec<RequirementDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RequirementDefinition {
    Claim(ClaimRequirement),
    Operation(String),
}

impl TryFrom<RequirementDefinition> for Requirement {
    type Error = AuthzError;

    /// Operations need a resource, which a policy never has.
    fn try_from(def: RequirementDefinition) -> Result<Self, Self::Error> {
        match def {
            RequirementDefinition::Claim(claim) => Ok(Requirement::Claim(claim)),
            RequirementDefinition::Operation(name) => Err(AuthzError::InvalidFormat(format!(
                "operation '{name}' needs a resource and cannot be part of a policy"
            ))),
        }
    }
}

impl PolicyDefinition {
    pub fn into_policy(self) -> Result<Policy, AuthzError> {
        if self.name.trim().is_empty() {
            return Err(AuthzError::InvalidFormat(
                "policy name must not be empty".to_string(),
            ));
        }

        let mut builder = Policy::builder(self.name);
        if self.require_authenticated_user {
            builder = builder.require_authenticated_user();
        }
        for definition in self.requirements {
            builder = builder.require(Requirement::try_from(definition)?);
        }
        Ok(builder.build())
    }
}

/// Compile a JSON policy document into a `PolicyRegistry`.
///
/// Malformed JSON maps to `AuthzError::ParseError`; a name that appears twice
/// maps to `AuthzError::DuplicatePolicy`.
pub fn compile_policies(text: &str) -> Result<PolicyRegistry, AuthzError> {
    let document: PolicyDocument = serde_json::from_str(text)?;
    let mut registry = PolicyRegistry::new();
    for definition in document.policies {
        registry.register(definition.into_policy()?)?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Claim, Principal, RequirementKind};

    const SEARCH_DOCUMENT: &str = r#"
    {
      "policies": [
        {
          "name": "Default",
          "require_authenticated_user": true
        },
        {
          "name": "SearchPolicy",
          "require_authenticated_user": true,
          "requirements": [
            { "claim": { "type": "role", "any_of": ["Admin", "Customer"] } }
          ]
        }
      ]
    }
    "#;

    #[test]
    fn test_compile_policies() {
        let registry = compile_policies(SEARCH_DOCUMENT).unwrap();
        assert_eq!(registry.names(), vec!["Default", "SearchPolicy"]);

        let search = registry.resolve("SearchPolicy").unwrap();
        assert!(search.require_authenticated_user());
        assert_eq!(search.requirements().len(), 1);
        assert_eq!(search.requirements()[0].kind(), RequirementKind::Claim);

        let Requirement::Claim(claim) = &search.requirements()[0] else {
            panic!("Expected claim requirement");
        };
        let customer = Principal::authenticated("Cookies", vec![Claim::role("Customer")]);
        let viewer = Principal::authenticated("Cookies", vec![Claim::role("Viewer")]);
        assert!(claim.is_satisfied_by(&customer));
        assert!(!claim.is_satisfied_by(&viewer));
    }

    #[test]
    fn test_operation_requirement_is_rejected() {
        let result = compile_policies(
            r#"{"policies": [{"name": "Reviewing", "requirements": [{"operation": "Review"}]}]}"#,
        );
        assert_eq!(
            result.map(|r| r.len()),
            Err(AuthzError::InvalidFormat(
                "operation 'Review' needs a resource and cannot be part of a policy".to_string()
            ))
        );
    }

    #[test]
    fn test_malformed_document() {
        let result = compile_policies(r#"{"policies": [ { "name": "Broken" "#);
        assert!(matches!(result, Err(AuthzError::ParseError(_))));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = compile_policies(r#"{"policies": [{"name": "A", "require_admin": true}]}"#);
        assert!(matches!(result, Err(AuthzError::ParseError(_))));
    }

    #[test]
    fn test_duplicate_policy() {
        let result = compile_policies(r#"{"policies": [{"name": "A"}, {"name": "A"}]}"#);
        assert_eq!(
            result.map(|r| r.len()),
            Err(AuthzError::DuplicatePolicy("A".to_string()))
        );
    }

    #[test]
    fn test_empty_name() {
        let result = compile_policies(r#"{"policies": [{"name": " "}]}"#);
        assert!(matches!(result, Err(AuthzError::InvalidFormat(_))));
    }
}
