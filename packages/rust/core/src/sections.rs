//! Procedural document builder.
//!
//! Used when no template artifact matches the requested name. The full
//! agreement is constructed as an AST in a fixed section order (title
//! block, recitals, six articles, signature page), with each section built
//! by its own function so it can be tested in isolation. Prose is fixed
//! legal boilerplate with agreement data points substituted in.

use serde_json::Value;

use opagen_docx::{Block, Document, ParaStyle, Paragraph, Row, Run, Table, TableStyle};
use opagen_shared::{Agreement, Member};

use crate::format;

/// Blank signature line width.
const SIGNATURE_LINE: &str = "______________________________";

/// Build the complete scratch document for `agreement`.
///
/// Tolerates violating records by design: unknown member classes render
/// literally, missing optionals render bracketed placeholders, and date
/// ordering is never checked.
pub fn build(agreement: &Agreement) -> Document {
    let mut doc = Document::new();
    doc.extend(title_block(agreement));
    doc.extend(effective_date_line(agreement));
    doc.extend(key_facts(agreement));
    doc.extend(recitals(agreement));
    doc.extend(article_definitions(agreement));
    doc.extend(article_formation(agreement));
    doc.extend(article_capitalization(agreement));
    doc.extend(article_allocations());
    doc.extend(article_distributions());
    doc.extend(article_governance(agreement));
    doc.extend(signature_page(agreement));
    doc
}

// ---------------------------------------------------------------------------
// Front matter
// ---------------------------------------------------------------------------

/// Centered title with three emphasis levels: heading, company name,
/// subtitle.
fn title_block(agreement: &Agreement) -> Vec<Block> {
    let title = Paragraph::empty()
        .with_run(
            Run::new("LIMITED LIABILITY COMPANY AGREEMENT\nOF\n")
                .bold()
                .size(16),
        )
        .with_run(
            Run::new(format!("{}\n", agreement.company_name.to_uppercase()))
                .bold()
                .size(18),
        )
        .with_run(Run::new(format!("(a {} limited liability company)", agreement.state)).size(12))
        .centered();

    vec![title.into(), Paragraph::empty().into()]
}

fn effective_date_line(agreement: &Agreement) -> Vec<Block> {
    vec![
        Paragraph::text(format!(
            "Effective Date: {}",
            format::long_date(agreement.effective_date)
        ))
        .centered()
        .into(),
        Paragraph::empty().into(),
    ]
}

fn key_facts(agreement: &Agreement) -> Vec<Block> {
    let manager = match agreement.manager_entity.as_deref() {
        Some(entity) if !entity.is_empty() => {
            format!("Manager: {} ({entity})", agreement.manager_name)
        }
        _ => format!("Manager: {}", agreement.manager_name),
    };

    let state_prefix: String = agreement
        .state
        .chars()
        .take(2)
        .collect::<String>()
        .to_uppercase();

    vec![
        Paragraph::text(manager).into(),
        Paragraph::text(format!(
            "Principal Place of Business: {}",
            format::or_placeholder(
                agreement.principal_place_of_business.as_deref(),
                format::TO_BE_CONFIRMED,
            )
        ))
        .into(),
        Paragraph::text(format!(
            "Registered Agent ({state_prefix}): {}",
            format::or_placeholder(agreement.registered_agent.as_deref(), format::INSERT_AGENT)
        ))
        .into(),
        Paragraph::empty().into(),
    ]
}

fn recitals(agreement: &Agreement) -> Vec<Block> {
    let statements = [
        format!(
            "{} (the \"Company\") was formed on {} by filing a Certificate of Formation with the {} Secretary of State.",
            agreement.company_name,
            format::long_date(agreement.formation_date),
            agreement.state
        ),
        format!(
            "The Company has been organized to {}",
            purpose_text(agreement)
        ),
        "The parties desire to enter into this Agreement to govern their rights and obligations as members of the Company.".to_string(),
    ];

    let mut blocks: Vec<Block> = vec![Paragraph::styled(ParaStyle::Heading1, "Recitals").into()];
    for (i, statement) in statements.iter().enumerate() {
        let letter = char::from(b'A' + i as u8);
        blocks.push(Paragraph::text(format!("{letter}. {statement}")).into());
    }
    blocks.push(Paragraph::empty().into());
    blocks.push(
        Paragraph::text(
            "NOW, THEREFORE, in consideration of the mutual covenants herein, the parties agree as follows:",
        )
        .into(),
    );
    blocks
}

// ---------------------------------------------------------------------------
// Articles
// ---------------------------------------------------------------------------

fn article_definitions(agreement: &Agreement) -> Vec<Block> {
    vec![
        Paragraph::styled(ParaStyle::Heading1, "ARTICLE I – Definitions & Construction").into(),
        Paragraph::text(format!(
            "Key defined terms are set out in Schedule A. Where terms are not defined, they have the meaning given in the {} Limited Liability Company Act.",
            agreement.state
        ))
        .into(),
        Paragraph::empty().into(),
    ]
}

fn article_formation(agreement: &Agreement) -> Vec<Block> {
    vec![
        Paragraph::styled(ParaStyle::Heading1, "ARTICLE II – Formation, Purpose, Term").into(),
        Paragraph::styled(ParaStyle::Heading2, "2.1 Formation & Name.").into(),
        Paragraph::text(format!(
            "The Company exists as a {} LLC under the name {} and may operate under trade or \"doing-business-as\" names approved by the Manager.",
            agreement.state, agreement.company_name
        ))
        .into(),
        Paragraph::styled(ParaStyle::Heading2, "2.2 Purpose.").into(),
        Paragraph::text(format!(
            "The Company's purpose is limited to: {}",
            purpose_text(agreement)
        ))
        .into(),
        Paragraph::styled(ParaStyle::Heading2, "2.3 Term.").into(),
        Paragraph::text("Perpetual, unless dissolved under Article X.").into(),
        Paragraph::empty().into(),
    ]
}

fn article_capitalization(agreement: &Agreement) -> Vec<Block> {
    let mut blocks: Vec<Block> = vec![
        Paragraph::styled(
            ParaStyle::Heading1,
            "ARTICLE III – Units, Capitalization & Classes",
        )
        .into(),
        Paragraph::styled(ParaStyle::Heading2, "3.1 Authorized Units.").into(),
        Paragraph::text(
            "The Company is authorized to issue three classes of limited liability company interests (collectively, \"Units\"):",
        )
        .into(),
        units_table(agreement).into(),
        Paragraph::empty().into(),
        Paragraph::styled(ParaStyle::Heading2, "3.2 Initial Capital Commitments.").into(),
        commitments_table(&agreement.members).into(),
    ];
    blocks.push(Paragraph::empty().into());
    blocks
}

/// 3.1 authorized-units table: three fixed class rows with valuation and
/// rights cells read from the extension map, falling back to fixed text.
fn units_table(agreement: &Agreement) -> Table {
    let mut table = Table::new(TableStyle::LightList);
    table.push_row(Row::header([
        "Class",
        "Designation",
        "Pre-Money Valuation",
        "Rights Snapshot",
    ]));
    table.push_row(Row::body([
        "Class A".to_string(),
        "Anchor Units".to_string(),
        extension_text(agreement, "class_a_valuation", "£0.95m"),
        extension_text(
            agreement,
            "class_a_rights",
            "≥1 Board seat; veto over Reserved Matters",
        ),
    ]));
    table.push_row(Row::body([
        "Class B".to_string(),
        "Investor Units".to_string(),
        extension_text(agreement, "class_b_valuation", "£3.25m"),
        extension_text(
            agreement,
            "class_b_rights",
            "Standard voting; pro-rata pre-emptive rights",
        ),
    ]));
    table.push_row(Row::body([
        "Class C".to_string(),
        "Sweat-Equity Units".to_string(),
        "N/A (services)".to_string(),
        extension_text(agreement, "class_c_rights", "Vesting schedules tied to KPIs"),
    ]));
    table
}

/// 3.2 commitments table: header plus one row per member. Zero members
/// degrades to the header-only frame.
fn commitments_table(members: &[Member]) -> Table {
    let mut table = Table::new(TableStyle::LightList);
    table.push_row(Row::header(["Member", "Class", "Commitment", "Payment Terms"]));
    for member in members {
        table.push_row(Row::body([
            member.name.clone(),
            member.member_class.clone(),
            format::money(member.capital_commitment, format::MONEY_SERVICES),
            payment_terms(member).to_string(),
        ]));
    }
    table
}

fn payment_terms(member: &Member) -> &'static str {
    if member.member_class == "A" {
        "See Schedule C"
    } else {
        "Pro-rata calls"
    }
}

fn article_allocations() -> Vec<Block> {
    vec![
        Paragraph::styled(ParaStyle::Heading1, "ARTICLE IV – Allocations & Tax").into(),
        Paragraph::text(
            "Standard tax provisions apply, with profits and losses allocated pro-rata to Percentage Interests.",
        )
        .into(),
        Paragraph::empty().into(),
    ]
}

/// The waterfall percentages are fixed contract text, not derived from
/// the capital structure record (see DESIGN.md).
fn article_distributions() -> Vec<Block> {
    let waterfall = [
        "Transaction Costs & Liabilities.",
        "Return of Capital. Repay Members pro-rata until all Capital Contributions returned.",
        "Catch-Up / Carry. 20% to Manager until it has received 20% of total distributed amounts above return of capital.",
        "Residual. 80% to all Members pro-rata by fully-diluted ownership; 20% to Manager (carry).",
    ];

    let mut blocks: Vec<Block> = vec![
        Paragraph::styled(ParaStyle::Heading1, "ARTICLE V – Distributions & Waterfall").into(),
        Paragraph::styled(ParaStyle::Heading2, "5.1 Timing.").into(),
        Paragraph::text(
            "Distributions are at Manager discretion, subject to lender covenants and cash-flow needs.",
        )
        .into(),
        Paragraph::styled(ParaStyle::Heading2, "5.2 Waterfall.").into(),
        Paragraph::text("Distributable cash (including exit proceeds) is applied:").into(),
    ];
    for (i, step) in waterfall.iter().enumerate() {
        blocks.push(
            Paragraph::styled(ParaStyle::ListNumber, format!("{}. {step}", i + 1)).into(),
        );
    }
    blocks.push(Paragraph::empty().into());
    blocks
}

fn article_governance(agreement: &Agreement) -> Vec<Block> {
    let reserved_matters = [
        "Issuance of equity or options outside approved pools.",
        "Incurrence of new secured debt above specified thresholds.",
        "Sale or encumbrance of material assets.",
        "Key personnel decisions.",
    ];

    let mut blocks: Vec<Block> = vec![
        Paragraph::styled(ParaStyle::Heading1, "ARTICLE VI – Governance").into(),
        Paragraph::styled(ParaStyle::Heading2, "6.1 Manager Powers.").into(),
        Paragraph::text(format!(
            "The Manager ({}) has exclusive authority over operations, subject only to Reserved Matters.",
            agreement.manager_name
        ))
        .into(),
        Paragraph::styled(ParaStyle::Heading2, "6.2 Reserved Matters.").into(),
        Paragraph::text("No action without requisite Member consent on:").into(),
    ];
    for matter in reserved_matters {
        blocks.push(Paragraph::styled(ParaStyle::ListBullet, format!("• {matter}")).into());
    }
    blocks.push(Paragraph::empty().into());
    blocks
}

// ---------------------------------------------------------------------------
// Signature page
// ---------------------------------------------------------------------------

fn signature_page(agreement: &Agreement) -> Vec<Block> {
    let mut table = Table::new(TableStyle::TableGrid);
    table.push_row(Row::header([
        "Member / Manager",
        "Capacity",
        "Signature / Date",
    ]));
    table.push_row(Row::body([
        agreement.manager_name.clone(),
        "Manager".to_string(),
        SIGNATURE_LINE.to_string(),
    ]));
    for member in &agreement.members {
        table.push_row(Row::body([
            member.name.clone(),
            format!("Member (Class {})", member.member_class),
            SIGNATURE_LINE.to_string(),
        ]));
    }

    vec![
        Block::PageBreak,
        Paragraph::styled(ParaStyle::Heading1, "Signature Page").into(),
        Paragraph::text(format!(
            "By signing below, each undersigned Person agrees to be bound by this Limited Liability Company Agreement of {} as of the Effective Date.",
            agreement.company_name
        ))
        .into(),
        Paragraph::empty().into(),
        table.into(),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Scratch-path purpose: the typed field with the bracketed placeholder.
fn purpose_text(agreement: &Agreement) -> String {
    format::or_placeholder(agreement.purpose.as_deref(), format::INSERT_PURPOSE)
}

/// A string value from the extension map, else the fixed default.
fn extension_text(agreement: &Agreement, key: &str, default: &str) -> String {
    agreement
        .data
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use opagen_docx::Alignment;
    use serde_json::Map;

    fn agreement_with_members(members: Vec<Member>) -> Agreement {
        Agreement {
            company_name: "Acme LLC".into(),
            state: "Delaware".into(),
            formation_date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            effective_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            manager_name: "Jane Doe".into(),
            manager_entity: None,
            principal_place_of_business: None,
            registered_agent: None,
            purpose: None,
            data: Map::new(),
            members,
            capital_structure: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn member(name: &str, class: &str, commitment: f64) -> Member {
        Member {
            name: name.into(),
            entity_name: None,
            member_class: class.into(),
            units: 0.0,
            capital_commitment: commitment,
            percentage_interest: 25.0,
            is_manager: false,
            address: None,
            email: None,
            capital_commitments: vec![],
        }
    }

    fn paragraph_texts(doc: &Document) -> Vec<String> {
        doc.blocks
            .iter()
            .filter_map(|b| match b {
                Block::Paragraph(p) => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn table_row_counts_track_member_count() {
        for n in [0usize, 1, 3] {
            let members = (0..n)
                .map(|i| member(&format!("M{i}"), "B", 1_000.0))
                .collect();
            let doc = build(&agreement_with_members(members));
            let tables: Vec<_> = doc.tables().collect();

            // Units, commitments, signature, in that order.
            assert_eq!(tables.len(), 3);
            assert_eq!(tables[0].rows.len(), 4);
            assert_eq!(tables[1].rows.len(), n + 1, "commitments with {n} members");
            assert_eq!(tables[2].rows.len(), n + 2, "signature with {n} members");
        }
    }

    #[test]
    fn title_block_has_three_emphasis_levels() {
        let doc = build(&agreement_with_members(vec![]));
        let Block::Paragraph(title) = &doc.blocks[0] else {
            panic!("first block must be the title paragraph");
        };

        assert_eq!(title.align, Alignment::Center);
        assert_eq!(title.runs.len(), 3);
        assert_eq!(title.runs[0].size_pt, Some(16));
        assert!(title.runs[0].bold);
        assert_eq!(title.runs[1].size_pt, Some(18));
        assert!(title.runs[1].text.contains("ACME LLC"));
        assert_eq!(title.runs[2].size_pt, Some(12));
        assert!(title.runs[2].text.contains("(a Delaware limited liability company)"));
    }

    #[test]
    fn key_facts_use_defaults_and_state_prefix() {
        let doc = build(&agreement_with_members(vec![]));
        let texts = paragraph_texts(&doc);

        assert!(texts.iter().any(|t| t == "Manager: Jane Doe"));
        assert!(
            texts
                .iter()
                .any(|t| t == "Principal Place of Business: [To be confirmed]")
        );
        assert!(
            texts
                .iter()
                .any(|t| t == "Registered Agent (DE): [Insert name & address]")
        );
    }

    #[test]
    fn manager_entity_shown_in_parentheses() {
        let mut agreement = agreement_with_members(vec![]);
        agreement.manager_entity = Some("Doe Management LLC".into());
        let texts = paragraph_texts(&build(&agreement));
        assert!(texts.iter().any(|t| t == "Manager: Jane Doe (Doe Management LLC)"));
    }

    #[test]
    fn recitals_are_lettered_and_default_purpose() {
        let doc = build(&agreement_with_members(vec![]));
        let texts = paragraph_texts(&doc);

        assert!(texts.iter().any(|t| t.starts_with("A. Acme LLC (the \"Company\") was formed on 15 January 2024")));
        assert!(
            texts
                .iter()
                .any(|t| t == "B. The Company has been organized to [insert purpose]")
        );
        assert!(texts.iter().any(|t| t.starts_with("C. The parties desire")));
        assert!(texts.iter().any(|t| t.starts_with("NOW, THEREFORE,")));
    }

    #[test]
    fn commitment_cells_use_services_convention() {
        let members = vec![member("Bob", "A", 50_000.0), member("Eve", "C", 0.0)];
        let doc = build(&agreement_with_members(members));
        let commitments = doc.tables().nth(1).unwrap();

        assert_eq!(commitments.rows[1].cells[2].text, "£50,000");
        assert_eq!(commitments.rows[2].cells[2].text, "Services");
    }

    #[test]
    fn payment_terms_special_case_class_a_only() {
        let members = vec![
            member("Bob", "A", 1.0),
            member("Eve", "B", 1.0),
            member("Zed", "Founder", 1.0),
        ];
        let doc = build(&agreement_with_members(members));
        let commitments = doc.tables().nth(1).unwrap();

        assert_eq!(commitments.rows[1].cells[3].text, "See Schedule C");
        assert_eq!(commitments.rows[2].cells[3].text, "Pro-rata calls");
        // Unknown class renders literally, no special-casing.
        assert_eq!(commitments.rows[3].cells[1].text, "Founder");
        assert_eq!(commitments.rows[3].cells[3].text, "Pro-rata calls");
    }

    #[test]
    fn units_table_defaults_and_extension_overrides() {
        let doc = build(&agreement_with_members(vec![]));
        let units = doc.tables().next().unwrap();
        assert_eq!(units.rows[1].cells[2].text, "£0.95m");
        assert_eq!(
            units.rows[1].cells[3].text,
            "≥1 Board seat; veto over Reserved Matters"
        );
        assert_eq!(units.rows[3].cells[2].text, "N/A (services)");

        let mut agreement = agreement_with_members(vec![]);
        agreement
            .data
            .insert("class_a_valuation".into(), Value::String("£2.10m".into()));
        let doc = build(&agreement);
        let units = doc.tables().next().unwrap();
        assert_eq!(units.rows[1].cells[2].text, "£2.10m");
    }

    #[test]
    fn waterfall_steps_are_numbered_fixed_text() {
        let doc = build(&agreement_with_members(vec![]));
        let texts = paragraph_texts(&doc);

        assert!(texts.iter().any(|t| t == "1. Transaction Costs & Liabilities."));
        assert!(texts.iter().any(|t| t.starts_with("3. Catch-Up / Carry. 20% to Manager")));
        assert!(texts.iter().any(|t| t.starts_with("4. Residual. 80% to all Members")));
    }

    #[test]
    fn governance_names_manager_and_reserved_matters() {
        let doc = build(&agreement_with_members(vec![]));
        let texts = paragraph_texts(&doc);

        assert!(texts.iter().any(|t| t.contains("The Manager (Jane Doe) has exclusive authority")));
        assert_eq!(texts.iter().filter(|t| t.starts_with("• ")).count(), 4);
    }

    #[test]
    fn signature_page_follows_page_break() {
        let doc = build(&agreement_with_members(vec![member("Bob", "A", 1.0)]));
        let break_index = doc
            .blocks
            .iter()
            .position(|b| matches!(b, Block::PageBreak))
            .expect("page break present");

        let Block::Paragraph(heading) = &doc.blocks[break_index + 1] else {
            panic!("heading must follow the page break");
        };
        assert_eq!(heading.plain_text(), "Signature Page");

        let signature = doc.tables().nth(2).unwrap();
        assert_eq!(signature.rows[1].cells[1].text, "Manager");
        assert_eq!(signature.rows[2].cells[1].text, "Member (Class A)");
        assert_eq!(signature.rows[2].cells[2].text, SIGNATURE_LINE);
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let doc = build(&agreement_with_members(vec![]));
        let texts = paragraph_texts(&doc);
        let index_of = |needle: &str| {
            texts
                .iter()
                .position(|t| t.starts_with(needle))
                .unwrap_or_else(|| panic!("missing section {needle}"))
        };

        let order = [
            index_of("Effective Date:"),
            index_of("Manager: "),
            index_of("Recitals"),
            index_of("ARTICLE I "),
            index_of("ARTICLE II "),
            index_of("ARTICLE III "),
            index_of("ARTICLE IV "),
            index_of("ARTICLE V "),
            index_of("ARTICLE VI "),
            index_of("Signature Page"),
        ];
        assert!(order.windows(2).all(|w| w[0] < w[1]), "order: {order:?}");
    }
}
