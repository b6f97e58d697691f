use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub mod logging;

// ============================================================================
// Claims
// ============================================================================

/// Read access to claims by name.
///
/// Implemented by [`ClaimSet`] and [`Principal`]; anything that can hand out a
/// claim value by its name can be fed to the claims resolver.
pub trait ClaimSource {
    /// Raw claim value, including explicit JSON `null`.
    fn claim(&self, name: &str) -> Option<&Value>;

    /// Claim value converted to text, or `None` when absent or `null`.
    ///
    /// Strings are returned verbatim (an empty string is a present value),
    /// numbers and booleans use their display form, and arrays/objects are
    /// serialized as compact JSON.
    fn claim_text(&self, name: &str) -> Option<String> {
        self.claim(name).and_then(value_to_text)
    }
}

/// Convert a single claim value to text. `null` has no text form.
pub fn value_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

impl ClaimSource for Map<String, Value> {
    fn claim(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Immutable set of claims asserted by the identity provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClaimSet(Map<String, Value>);

impl ClaimSet {
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The claims as a JSON object, verbatim.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for ClaimSet {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}

impl ClaimSource for ClaimSet {
    fn claim(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

// ============================================================================
// Principal
// ============================================================================

/// The authenticated user as handed to the application by the gateway.
///
/// Created once per session at successful token exchange and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Principal {
    name: String,
    claims: ClaimSet,
}

impl Principal {
    pub fn new(name: impl Into<String>, claims: ClaimSet) -> Self {
        Self {
            name: name.into(),
            claims,
        }
    }

    /// Build a principal whose authentication name is taken from
    /// `name_attribute`, falling back to `sub`.
    pub fn from_claims(claims: ClaimSet, name_attribute: &str) -> Self {
        let name = claims
            .claim_text(name_attribute)
            .or_else(|| claims.claim_text("sub"))
            .unwrap_or_default();
        Self { name, claims }
    }

    /// Authentication name (the configured user-name claim).
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn claims(&self) -> &ClaimSet {
        &self.claims
    }
}

impl ClaimSource for Principal {
    fn claim(&self, name: &str) -> Option<&Value> {
        self.claims.claim(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> ClaimSet {
        match value {
            Value::Object(map) => ClaimSet::new(map),
            _ => panic!("claims must be an object"),
        }
    }

    #[test]
    fn test_claim_text_conversion() {
        let set = claims(json!({
            "email": "",
            "age": 42,
            "verified": true,
            "roles": ["admin", "user"],
            "address": {"country": "NZ"},
            "nothing": null
        }));

        assert_eq!(set.claim_text("email"), Some(String::new()));
        assert_eq!(set.claim_text("age"), Some("42".to_string()));
        assert_eq!(set.claim_text("verified"), Some("true".to_string()));
        assert_eq!(set.claim_text("roles"), Some(r#"["admin","user"]"#.to_string()));
        assert_eq!(set.claim_text("address"), Some(r#"{"country":"NZ"}"#.to_string()));
        assert_eq!(set.claim_text("nothing"), None);
        assert_eq!(set.claim_text("missing"), None);
    }

    #[test]
    fn test_principal_name_from_attribute() {
        let principal = Principal::from_claims(
            claims(json!({"sub": "abc", "preferred_username": "ann@x.com"})),
            "preferred_username",
        );
        assert_eq!(principal.name(), "ann@x.com");
    }

    #[test]
    fn test_principal_name_falls_back_to_sub() {
        let principal = Principal::from_claims(claims(json!({"sub": "abc"})), "oid");
        assert_eq!(principal.name(), "abc");
    }

    #[test]
    fn test_claim_set_serializes_transparently() {
        let set = claims(json!({"name": "Ann"}));
        assert_eq!(serde_json::to_value(&set).unwrap(), json!({"name": "Ann"}));
    }
}
