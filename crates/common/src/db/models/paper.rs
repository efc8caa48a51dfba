//! Paper entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a paper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaperStatus {
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "UNDER_REVIEW")]
    UnderReview,
    #[sea_orm(string_value = "REVISION_REQUIRED")]
    RevisionRequired,
    #[sea_orm(string_value = "REVISED")]
    Revised,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "PUBLISHED")]
    Published,
    #[sea_orm(string_value = "ARCHIVED")]
    Archived,
}

impl fmt::Display for PaperStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaperStatus::Submitted => "SUBMITTED",
            PaperStatus::UnderReview => "UNDER_REVIEW",
            PaperStatus::RevisionRequired => "REVISION_REQUIRED",
            PaperStatus::Revised => "REVISED",
            PaperStatus::Accepted => "ACCEPTED",
            PaperStatus::Rejected => "REJECTED",
            PaperStatus::Published => "PUBLISHED",
            PaperStatus::Archived => "ARCHIVED",
        };
        f.write_str(s)
    }
}

impl FromStr for PaperStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUBMITTED" => Ok(PaperStatus::Submitted),
            "UNDER_REVIEW" => Ok(PaperStatus::UnderReview),
            "REVISION_REQUIRED" => Ok(PaperStatus::RevisionRequired),
            "REVISED" => Ok(PaperStatus::Revised),
            "ACCEPTED" => Ok(PaperStatus::Accepted),
            "REJECTED" => Ok(PaperStatus::Rejected),
            "PUBLISHED" => Ok(PaperStatus::Published),
            "ARCHIVED" => Ok(PaperStatus::Archived),
            other => Err(format!("Unknown paper status: {}", other)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "papers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub abstract_text: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub keywords: Option<String>,

    /// Author who submitted the paper (identity service reference)
    pub owner_id: Uuid,

    /// Increases only via accepted revisions, never decreases
    pub current_version: i32,

    pub status: PaperStatus,

    #[sea_orm(column_type = "Text", nullable)]
    pub editor_comments: Option<String>,

    /// Supplied asynchronously by the external scoring service
    pub plagiarism_score: Option<f64>,

    #[sea_orm(column_type = "Text", nullable)]
    pub plagiarism_report: Option<String>,

    pub assigned_editor_id: Option<Uuid>,

    /// Opaque reference into the external file store
    #[sea_orm(column_type = "Text", nullable)]
    pub file_ref: Option<String>,

    pub submitted_at: DateTimeWithTimeZone,

    pub published_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::revision::Entity", on_delete = "Cascade")]
    Revisions,

    #[sea_orm(has_many = "super::review::Entity", on_delete = "Cascade")]
    Reviews,

    #[sea_orm(has_many = "super::paper_reviewer::Entity", on_delete = "Cascade")]
    ReviewerAssignments,
}

impl Related<super::revision::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Revisions.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reviews.def()
    }
}

impl Related<super::paper_reviewer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewerAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
