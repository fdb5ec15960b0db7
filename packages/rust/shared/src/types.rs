//! Core domain types for operating agreement generation.
//!
//! These records are produced by external collaborators (persistence/API
//! layers) and treated as read-only inputs for the duration of a single
//! generation call. Field names in serialized form match the upstream API
//! payloads; notably [`Member::member_class`] travels as `"class"`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Agreement
// ---------------------------------------------------------------------------

/// One LLC operating agreement record, with its members and capital
/// structure.
///
/// `company_name`, `manager_name`, `formation_date`, and `effective_date`
/// are required; everything else is optional with defaults applied at
/// document-assembly time. `data` is the open-ended extension map merged
/// into the render context last, so extension keys override core keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agreement {
    /// Legal company name.
    pub company_name: String,

    /// State of formation.
    #[serde(default = "default_state")]
    pub state: String,

    /// Date the Certificate of Formation was filed.
    pub formation_date: NaiveDate,

    /// Date the agreement takes effect.
    pub effective_date: NaiveDate,

    /// Natural person acting as Manager.
    pub manager_name: String,

    /// Entity the manager acts through, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_entity: Option<String>,

    /// Principal place of business.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_place_of_business: Option<String>,

    /// Registered agent name and address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_agent: Option<String>,

    /// The company's stated purpose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Free-form extension data, merged into the render context last.
    #[serde(default)]
    pub data: Map<String, Value>,

    /// Members of the company.
    #[serde(default)]
    pub members: Vec<Member>,

    /// The company's capital structure, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capital_structure: Option<CapitalStructure>,

    /// When the record was created (set by the persistence layer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// When the record was last updated (set by the persistence layer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_state() -> String {
    "Delaware".into()
}

// ---------------------------------------------------------------------------
// Member
// ---------------------------------------------------------------------------

/// A party holding Units in the company.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    /// Member's name.
    pub name: String,

    /// Entity name, if the member is an entity rather than a person.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    /// Free-form class label ("A", "B", "C", ...). Unknown labels are
    /// rendered literally by the document builder.
    #[serde(rename = "class", default)]
    pub member_class: String,

    /// Number of Units held.
    #[serde(default)]
    pub units: f64,

    /// Committed capital in pounds.
    #[serde(default)]
    pub capital_commitment: f64,

    /// Percentage interest, expressed in [0, 100].
    #[serde(default)]
    pub percentage_interest: f64,

    /// Whether this member also acts as Manager.
    #[serde(default)]
    pub is_manager: bool,

    /// Mailing address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Scheduled capital commitments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub capital_commitments: Vec<CapitalCommitment>,
}

// ---------------------------------------------------------------------------
// CapitalCommitment
// ---------------------------------------------------------------------------

/// A single scheduled capital contribution by a member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalCommitment {
    /// Amount due, in pounds.
    pub amount: f64,

    /// When the contribution is due.
    pub due_date: NaiveDate,

    /// Whether the contribution has been paid.
    #[serde(default)]
    pub paid: bool,

    /// When it was paid. Set only when `paid` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// CapitalStructure
// ---------------------------------------------------------------------------

/// Per-class unit authorization and waterfall terms.
///
/// Carried for external collaborators and template contexts; the
/// scratch-build Article V text is fixed boilerplate and does not read
/// `carry_percentage` or `preferred_return` (see DESIGN.md).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalStructure {
    /// Class A (Anchor Units) authorized count.
    #[serde(default)]
    pub class_a_authorized: f64,
    /// Class A pre-money valuation.
    #[serde(default)]
    pub class_a_pre_money_valuation: f64,
    /// Class A rights description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_a_rights: Option<String>,

    /// Class B (Investor Units) authorized count.
    #[serde(default)]
    pub class_b_authorized: f64,
    /// Class B pre-money valuation.
    #[serde(default)]
    pub class_b_pre_money_valuation: f64,
    /// Class B rights description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_b_rights: Option<String>,

    /// Class C (Sweat-Equity Units) pool percentage.
    #[serde(default = "default_class_c_pool")]
    pub class_c_pool_percentage: f64,
    /// Class C vesting terms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_c_vesting_terms: Option<String>,

    /// Manager carry percentage.
    #[serde(default = "default_carry")]
    pub carry_percentage: f64,
    /// Preferred return percentage.
    #[serde(default)]
    pub preferred_return: f64,
}

fn default_class_c_pool() -> f64 {
    25.0
}

fn default_carry() -> f64 {
    20.0
}

// ---------------------------------------------------------------------------
// RenderContext
// ---------------------------------------------------------------------------

/// Flat key/value mapping assembled from an [`Agreement`], consumed by both
/// the template renderer and the procedural document builder.
///
/// Two-layer by construction: typed core keys are inserted first, then the
/// agreement's extension map is merged last so extension entries override
/// core entries on key collision. Keys listed in `emphasized` carry a
/// rich-text hint (bold, 20 pt) honored only by the template renderer.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    values: Map<String, Value>,
    emphasized: Vec<String>,
}

impl RenderContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a core key. Later [`merge_extension`](Self::merge_extension)
    /// calls may override it.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Merge the agreement's extension map, overriding any existing keys.
    pub fn merge_extension(&mut self, extension: &Map<String, Value>) {
        for (key, value) in extension {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Mark a key for emphasized (bold, larger-size) template rendering.
    pub fn emphasize(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.emphasized.contains(&key) {
            self.emphasized.push(key);
        }
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    /// Whether the context contains `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The full mapping.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Keys marked for emphasized template rendering.
    pub fn emphasized(&self) -> &[String] {
        &self.emphasized
    }

    /// Number of keys in the mapping.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
