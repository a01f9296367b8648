//! Client-side state for the nail-art feed: optimistic reactions, threaded
//! comments and the paged post feed, reconciled against the backend through
//! the traits in [`services`].

pub mod comments;
pub mod error;
pub mod feed;
pub mod notifier;
pub mod reaction_listing;
pub mod reactions;
pub mod reporting;
pub mod services;
pub mod session;
pub mod tree;
pub mod validation;

pub use comments::{CommentDraft, CommentThread, ThreadState};
pub use error::{FeedError, Result};
pub use feed::{Feed, FeedItem};
pub use notifier::Notifier;
pub use reaction_listing::{ReactionListing, ReactionTab, ScrollPosition, TabState};
pub use reactions::{ReactionController, ReactionState};
pub use services::{
    Attachment, CommentInput, CommentsService, PostsService, ReactionQuery, ReactionService,
    Services, UploadService,
};
pub use session::{Session, Viewer};
pub use validation::ContentValidator;
