//! SeaORM entity models
//!
//! Database entities for the ReviewDesk workflow engine

mod paper;
mod paper_reviewer;
mod review;
mod revision;

pub use paper::{
    ActiveModel as PaperActiveModel, Column as PaperColumn, Entity as PaperEntity, Model as Paper,
    PaperStatus,
};

pub use revision::{
    ActiveModel as RevisionActiveModel, Column as RevisionColumn, Entity as RevisionEntity,
    Model as Revision,
};

pub use review::{
    ActiveModel as ReviewActiveModel, Column as ReviewColumn, Entity as ReviewEntity,
    Model as Review, Recommendation, ReviewStatus,
};

pub use paper_reviewer::{
    ActiveModel as PaperReviewerActiveModel, Column as PaperReviewerColumn,
    Entity as PaperReviewerEntity, Model as PaperReviewer,
};
