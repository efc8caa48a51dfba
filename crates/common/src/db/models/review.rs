//! Review entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a single reviewer's evaluation workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "IN_PROGRESS")]
    InProgress,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Assignment revoked before completion; record retained for audit
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReviewStatus::Pending => "PENDING",
            ReviewStatus::InProgress => "IN_PROGRESS",
            ReviewStatus::Completed => "COMPLETED",
            ReviewStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Reviewer's categorical verdict, distinct from the editor-set paper status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    #[sea_orm(string_value = "ACCEPT")]
    Accept,
    #[sea_orm(string_value = "MINOR_REVISION")]
    MinorRevision,
    #[sea_orm(string_value = "MAJOR_REVISION")]
    MajorRevision,
    #[sea_orm(string_value = "REJECT")]
    Reject,
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Recommendation::Accept => "ACCEPT",
            Recommendation::MinorRevision => "MINOR_REVISION",
            Recommendation::MajorRevision => "MAJOR_REVISION",
            Recommendation::Reject => "REJECT",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reviews")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub paper_id: Uuid,

    /// Reviewer identity (identity service reference)
    pub reviewer_id: Uuid,

    /// Paper version the reviewer was assigned to evaluate.
    /// Retained across revisions for audit; new rounds create new records.
    pub paper_version: i32,

    pub status: ReviewStatus,

    /// Scores are 1-10 integers, present only once the review is completed
    pub quality_score: Option<i32>,

    pub originality_score: Option<i32>,

    pub clarity_score: Option<i32>,

    pub significance_score: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub comments: Option<String>,

    /// Visible to editors and admins only
    #[sea_orm(column_type = "Text", nullable)]
    pub confidential_comments: Option<String>,

    pub recommendation: Option<Recommendation>,

    pub due_date: Option<DateTimeWithTimeZone>,

    pub completed_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::paper::Entity",
        from = "Column::PaperId",
        to = "super::paper::Column::Id",
        on_delete = "Cascade"
    )]
    Paper,
}

impl Related<super::paper::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Paper.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
