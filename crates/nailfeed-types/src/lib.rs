pub mod api;
pub mod events;
pub mod models;

pub use events::Notice;
pub use models::{
    Author, Comment, Media, Page, Pagination, Post, ReactionCounts, ReactionKind, ReactionPage,
    ReactionSummary, ReactionUser, ReportReason, UploadedMedia,
};
