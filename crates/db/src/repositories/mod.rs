//! Database repositories.

#![allow(missing_docs)]

mod comment;
mod favourite;
mod notification;
mod post;
mod post_rating;
mod privacy_policy;
mod user;
mod user_story;

pub use comment::CommentRepository;
pub use favourite::FavouriteRepository;
pub use notification::NotificationRepository;
pub use post::{PostListFilter, PostRepository, PostSort};
pub use post_rating::PostRatingRepository;
pub use privacy_policy::PrivacyPolicyRepository;
pub use user::UserRepository;
pub use user_story::{StoryFilter, UserStoryRepository};
