//! Versioned field-name catalogs.
//!
//! Upstream schemas and form builders rename fields without notice; the
//! alternate spellings live here as data so new variants are an additive
//! edit, not a new conditional in a handler.

/// A semantic contact field: the CRM property it lands on and the ordered
/// candidate spellings it may arrive under.
pub struct FieldSpec {
    pub property: &'static str,
    pub candidates: &'static [&'static str],
    /// Treat the `"pending"` placeholder as absent for this field.
    pub exclude_pending: bool,
}

/// Spellings under which intake forms submit the contact email.
pub const EMAIL_KEYS: &[&str] = &["email", "Email", "email:", "Email:"];

/// Contact intake fields mapped onto CRM contact properties.
pub const CONTACT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        property: "agent_age",
        candidates: &["age", "Agent age", "Agent age:", "agent_age", "agentAge"],
        exclude_pending: true,
    },
    FieldSpec {
        property: "agent_city",
        candidates: &["city", "Agent city", "Agent city:", "agent_city", "agentCity"],
        exclude_pending: true,
    },
    FieldSpec {
        property: "agent_skin_allergies",
        candidates: &[
            "allergies",
            "skin allergies",
            "Agent skin allergies",
            "Agent skin allergies:",
            "agent_skin_allergies",
            "skinAllergies",
        ],
        exclude_pending: true,
    },
];

/// CRM collection path for the meetings custom object.
pub const MEETINGS_OBJECT_PATH: &str = "/crm/v3/objects/2-50779282";

/// Property-priority list projecting the `meeting` output field.
pub const MEETING_PROPS: &[&str] = &[
    "meeting",
    "meeting_name",
    "meeting_title",
    "meeting_time",
    "meeting_date",
];

/// Property-priority list projecting the `languages` output field.
pub const LANGUAGE_PROPS: &[&str] = &["languages", "language", "language_of_instruction"];

/// Properties requested from the CRM when the caller does not name any.
pub const DEFAULT_MEETING_PROPS: &[&str] = &[
    "meeting",
    "meeting_name",
    "meeting_title",
    "meeting_time",
    "meeting_date",
    "languages",
    "language",
    "language_of_instruction",
];
