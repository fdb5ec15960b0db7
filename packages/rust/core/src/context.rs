//! Context builder: one flat mapping from an agreement aggregate.
//!
//! The resulting [`RenderContext`] feeds both the template renderer and
//! the procedural document builder. Core keys are assembled first; the
//! agreement's free-form extension map is merged last so callers can
//! inject ad-hoc overrides per document.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use opagen_shared::{Agreement, Member, RenderContext};

use crate::format;

/// One row of the members summary table exposed to templates as
/// `members_table`. Commitment uses the `N/A` missing-value convention,
/// percentage the `TBD` convention.
#[derive(Debug, Clone, Serialize)]
pub struct MemberRow {
    pub name: String,
    pub entity: String,
    #[serde(rename = "class")]
    pub member_class: String,
    pub commitment: String,
    pub percentage: String,
}

/// Build the summary rows for `members`, in member order.
pub fn member_rows(members: &[Member]) -> Vec<MemberRow> {
    members
        .iter()
        .map(|member| MemberRow {
            name: member.name.clone(),
            entity: member.entity_name.clone().unwrap_or_default(),
            member_class: member.member_class.clone(),
            commitment: format::money(member.capital_commitment, format::MONEY_NOT_APPLICABLE),
            percentage: format::percentage(member.percentage_interest),
        })
        .collect()
}

/// Assemble the flat substitution mapping for one agreement.
pub fn build_context(agreement: &Agreement) -> RenderContext {
    let mut ctx = RenderContext::new();

    ctx.insert("company_name", agreement.company_name.to_uppercase());
    ctx.insert("state", agreement.state.clone());
    ctx.insert(
        "formation_date",
        format::long_date(agreement.formation_date),
    );
    ctx.insert(
        "effective_date",
        format::long_date(agreement.effective_date),
    );
    ctx.insert("manager_name", agreement.manager_name.clone());
    ctx.insert(
        "manager_entity",
        agreement.manager_entity.clone().unwrap_or_default(),
    );
    ctx.insert(
        "principal_place",
        format::or_placeholder(
            agreement.principal_place_of_business.as_deref(),
            format::TO_BE_CONFIRMED,
        ),
    );
    ctx.insert(
        "registered_agent",
        format::or_placeholder(agreement.registered_agent.as_deref(), format::INSERT_AGENT),
    );
    ctx.insert("purpose", resolved_purpose(agreement));
    ctx.insert(
        "members_table",
        serde_json::to_value(member_rows(&agreement.members)).unwrap_or_default(),
    );

    // Extension data wins on key collision.
    ctx.merge_extension(&agreement.data);

    if ctx.contains("title") {
        ctx.emphasize("title");
    }

    debug!(
        keys = ctx.len(),
        members = agreement.members.len(),
        "render context assembled"
    );
    ctx
}

/// The typed purpose field, else the extension map's `purpose`, else empty.
fn resolved_purpose(agreement: &Agreement) -> String {
    match agreement.purpose.as_deref() {
        Some(purpose) if !purpose.is_empty() => purpose.to_string(),
        _ => agreement
            .data
            .get("purpose")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}
