#![forbid(unsafe_code)]

pub mod board;

pub mod ids {
    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct PipelineId(String);

    impl PipelineId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, PipelineIdError> {
            let value = value.into();
            validate_pipeline_id(&value)?;
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum PipelineIdError {
        Empty,
        TooLong,
        InvalidFirstChar,
        InvalidChar { ch: char, index: usize },
    }

    fn validate_pipeline_id(value: &str) -> Result<(), PipelineIdError> {
        if value.is_empty() {
            return Err(PipelineIdError::Empty);
        }
        if value.len() > 128 {
            return Err(PipelineIdError::TooLong);
        }
        let Some(first) = value.chars().next() else {
            return Err(PipelineIdError::Empty);
        };
        if !first.is_ascii_alphanumeric() {
            return Err(PipelineIdError::InvalidFirstChar);
        }
        for (index, ch) in value.chars().enumerate() {
            if index == 0 {
                continue;
            }
            if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '/' | '-') {
                continue;
            }
            return Err(PipelineIdError::InvalidChar { ch, index });
        }
        Ok(())
    }

    #[derive(Clone, Debug, PartialEq, Eq, Hash)]
    pub struct CardId(String);

    impl CardId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, CardIdError> {
            let value = value.into();
            if value.is_empty() {
                return Err(CardIdError::Empty);
            }
            if value.len() > 64 {
                return Err(CardIdError::TooLong);
            }
            if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
                return Err(CardIdError::InvalidChar);
            }
            Ok(Self(value))
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum CardIdError {
        Empty,
        TooLong,
        InvalidChar,
    }

    /// Stage labels are free text; trimming is part of canonicalization so
    /// `" won "` and `"won"` name the same partition.
    pub fn canonical_stage_label(value: &str) -> Result<String, StageLabelError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(StageLabelError::Empty);
        }
        if trimmed.len() > 200 {
            return Err(StageLabelError::TooLong);
        }
        if trimmed.chars().any(|c| c.is_control()) {
            return Err(StageLabelError::ContainsControl);
        }
        Ok(trimmed.to_string())
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum StageLabelError {
        Empty,
        TooLong,
        ContainsControl,
    }

    impl StageLabelError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::Empty => "stage label must not be empty",
                Self::TooLong => "stage label exceeds 200 bytes",
                Self::ContainsControl => "stage label contains control characters",
            }
        }
    }
}

pub mod model {
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum EntityKind {
        Client,
        Contact,
    }

    impl EntityKind {
        pub fn as_str(self) -> &'static str {
            match self {
                EntityKind::Client => "client",
                EntityKind::Contact => "contact",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value.trim() {
                "client" => Some(EntityKind::Client),
                "contact" => Some(EntityKind::Contact),
                _ => None,
            }
        }
    }

    /// Reference to an external contact/client record. Opaque to the
    /// ordering engine; only non-emptiness is enforced.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct EntityRef {
        pub kind: EntityKind,
        pub id: String,
    }

    impl EntityRef {
        pub fn try_new(kind: EntityKind, id: impl Into<String>) -> Result<Self, EntityRefError> {
            let id = id.into();
            if id.trim().is_empty() {
                return Err(EntityRefError::EmptyId);
            }
            Ok(Self { kind, id })
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum EntityRefError {
        EmptyId,
    }

    #[derive(Clone, Debug, PartialEq)]
    pub struct Card {
        pub id: String,
        pub pipeline_id: String,
        pub entity: EntityRef,
        pub stage: String,
        pub stage_color: String,
        pub position: i64,
        pub tags: Vec<String>,
        pub amount: Option<f64>,
        pub capture_date_ms: Option<i64>,
        pub notes: Option<String>,
        pub created_at_ms: i64,
        pub updated_at_ms: i64,
        pub deleted_at_ms: Option<i64>,
    }

    impl Card {
        pub fn is_deleted(&self) -> bool {
            self.deleted_at_ms.is_some()
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct StageSummary {
        pub label: String,
        pub color: String,
        pub card_count: usize,
    }

    /// Tags keep insertion order for display; matching treats them as a
    /// case-insensitive set, so duplicates differing only by case collapse
    /// onto the first occurrence.
    pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, TagError> {
        let mut seen = std::collections::BTreeSet::new();
        let mut out = Vec::new();
        for tag in tags {
            let trimmed = tag.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.chars().any(|c| c.is_control()) {
                return Err(TagError::ContainsControl);
            }
            if seen.insert(trimmed.to_lowercase()) {
                out.push(trimmed.to_string());
            }
        }
        Ok(out)
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum TagError {
        ContainsControl,
    }

    impl TagError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::ContainsControl => "tag contains control characters",
            }
        }
    }
}
