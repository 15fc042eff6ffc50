//! Built-in clinical note templates.

use crate::model::template::{FormatRule, HeadingCase, SectionSpec, Template, TemplateError};

/// Identifier of the default template.
pub const DEFAULT_TEMPLATE_ID: &str = "soap";

pub const SOAP_ID: &str = "soap";
pub const HP_ID: &str = "hp";
pub const DISCHARGE_ID: &str = "discharge";

const PROSE: FormatRule = FormatRule {
    heading_case: HeadingCase::AsDeclared,
    collapse_blank_lines: true,
    normalize_bullets: false,
};

const LIST: FormatRule = FormatRule {
    heading_case: HeadingCase::AsDeclared,
    collapse_blank_lines: true,
    normalize_bullets: true,
};

const DISCHARGE_PROSE: FormatRule = FormatRule {
    heading_case: HeadingCase::Upper,
    ..PROSE
};

const DISCHARGE_LIST: FormatRule = FormatRule {
    heading_case: HeadingCase::Upper,
    ..LIST
};

/// Built-in templates with their lookup aliases, in registration order.
pub(crate) fn builtin_templates() -> Result<Vec<(Template, &'static [&'static str])>, TemplateError>
{
    Ok(vec![
        (soap()?, &["soap"]),
        (hp()?, &["h&p", "h and p", "history and physical"]),
        (
            discharge()?,
            &["discharge-summary", "discharge summary", "discharge_summary"],
        ),
    ])
}

pub fn soap() -> Result<Template, TemplateError> {
    Template::ordered(
        SOAP_ID,
        "SOAP Note",
        vec![
            SectionSpec::required("Subjective")
                .with_aliases(&["S"])
                .with_keywords(&[
                    "cc",
                    "chief complaint",
                    "hpi",
                    "pmh",
                    "history",
                    "meds",
                    "medication*",
                    "allerg*",
                    "subjective",
                    "reports",
                    "complains",
                ])
                .with_rule(PROSE),
            SectionSpec::required("Objective")
                .with_aliases(&["O"])
                .with_keywords(&[
                    "vitals",
                    "bp",
                    "hr",
                    "temp",
                    "spo2",
                    "o2 sat",
                    "exam*",
                    "physical",
                    "objective",
                    "neuro*",
                ])
                .with_rule(PROSE),
            SectionSpec::required("Assessment")
                .with_aliases(&["A", "Dx", "Diagnosis", "Impression"])
                .with_rule(PROSE),
            SectionSpec::required("Plan")
                .with_aliases(&["P", "Tx"])
                .with_rule(LIST),
            SectionSpec::optional("Narrative")
                .with_aliases(&["Notes"])
                .with_rule(PROSE),
        ],
    )
}

pub fn hp() -> Result<Template, TemplateError> {
    Template::ordered(
        HP_ID,
        "History and Physical",
        vec![
            SectionSpec::required("Chief Complaint")
                .with_aliases(&["CC"])
                .with_rule(PROSE),
            SectionSpec::required("History of Present Illness")
                .with_aliases(&["HPI"])
                .with_rule(PROSE),
            SectionSpec::optional("Past Medical History")
                .with_aliases(&["PMH", "PMHx"])
                .with_rule(LIST),
            SectionSpec::optional("Medications")
                .with_aliases(&["Meds", "Current Medications"])
                .with_rule(LIST),
            SectionSpec::optional("Allergies")
                .with_aliases(&["Allergy"])
                .with_rule(LIST),
            SectionSpec::optional("Social History")
                .with_aliases(&["SH", "SHx"])
                .with_rule(PROSE),
            SectionSpec::optional("Family History")
                .with_aliases(&["FH", "FHx"])
                .with_rule(PROSE),
            SectionSpec::optional("Review of Systems")
                .with_aliases(&["ROS"])
                .with_rule(LIST),
            SectionSpec::required("Physical Exam")
                .with_aliases(&["PE", "Exam", "Physical Examination"])
                .with_rule(PROSE),
            SectionSpec::required("Assessment")
                .with_aliases(&["A", "Impression"])
                .with_rule(PROSE),
            SectionSpec::required("Plan")
                .with_aliases(&["P"])
                .with_rule(LIST),
        ],
    )
}

pub fn discharge() -> Result<Template, TemplateError> {
    Template::ordered(
        DISCHARGE_ID,
        "Discharge Summary",
        vec![
            SectionSpec::required("Diagnoses")
                .with_aliases(&["Diagnosis", "Discharge Diagnosis", "Discharge Diagnoses"])
                .with_rule(DISCHARGE_LIST),
            SectionSpec::required("Hospital Course")
                .with_aliases(&["Brief Hospital Course", "Course"])
                .with_rule(DISCHARGE_PROSE),
            SectionSpec::required("Discharge Medications")
                .with_aliases(&["Medications", "Meds"])
                .with_rule(DISCHARGE_LIST),
            SectionSpec::required("Follow Up")
                .with_aliases(&["Followup", "Follow Up Appointments"])
                .with_rule(DISCHARGE_LIST),
            SectionSpec::optional("Discharge Instructions")
                .with_aliases(&["Instructions", "Patient Instructions"])
                .with_rule(DISCHARGE_PROSE),
            SectionSpec::optional("Condition at Discharge")
                .with_aliases(&["Condition", "Discharge Condition"])
                .with_rule(DISCHARGE_PROSE),
        ],
    )
}
