//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod email;
pub mod favourite;
pub mod moderation;
pub mod notification;
pub mod post;
pub mod privacy_policy;
pub mod rating;
pub mod user;
pub mod user_story;

pub use comment::{CommentNode, CommentService, CreateCommentInput, UpdateCommentInput};
pub use email::EmailService;
pub use favourite::FavouriteService;
pub use moderation::{ModerationService, RecomputeReport};
pub use notification::NotificationService;
pub use post::{CreatePostInput, PostListPage, PostService, UpdatePostInput};
pub use privacy_policy::{PrivacyPolicyService, PublishPolicyInput};
pub use rating::RatingService;
pub use user::{
    ChangePasswordInput, CreateUserInput, UpdateUserInput, UserService,
};
pub use user_story::{RecordStoryInput, UserStoryService};
