//! Revision entity
//!
//! Append-only ledger of manuscript versions. Rows are immutable once
//! created and owned exclusively by their paper.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "revisions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub paper_id: Uuid,

    /// Strictly increasing per paper, unique (paper_id, version_number)
    pub version_number: i32,

    #[sea_orm(column_type = "Text")]
    pub changes_summary: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub author_response: Option<String>,

    /// Opaque reference into the external file store
    #[sea_orm(column_type = "Text", nullable)]
    pub file_ref: Option<String>,

    pub created_at: DateTimeWithTimeZone,
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
