#![forbid(unsafe_code)]

#[derive(Clone, Debug, PartialEq)]
pub struct CreateCardRequest {
    pub pipeline_id: String,
    pub entity_kind: String,
    pub entity_id: String,
    pub stage: String,
    pub stage_color: String,
    pub tags: Vec<String>,
    pub amount: Option<f64>,
    pub capture_date_ms: Option<i64>,
    pub notes: Option<String>,
}

/// Partial field update. Outer `Option` = "was the field supplied",
/// inner `Option` = "set vs clear". Stage and position are deliberately
/// absent: placement changes go through [`MoveCardRequest`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UpdateCardRequest {
    pub pipeline_id: String,
    pub card_id: String,
    pub entity_kind: Option<String>,
    pub entity_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub amount: Option<Option<f64>>,
    pub capture_date_ms: Option<Option<i64>>,
    pub notes: Option<Option<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveCardRequest {
    pub pipeline_id: String,
    pub card_id: String,
    pub target_stage: String,
    pub target_position: i64,
    pub color_override: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateStageRequest {
    pub pipeline_id: String,
    pub label: String,
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenameStageRequest {
    pub pipeline_id: String,
    pub old_label: String,
    pub new_label: String,
    pub color: String,
}
