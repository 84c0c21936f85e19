//! Database entities.

#![allow(missing_docs)]

pub mod comment;
pub mod favourite;
pub mod notification;
pub mod post;
pub mod post_rating;
pub mod privacy_policy;
pub mod user;
pub mod user_story;

pub use comment::Entity as Comment;
pub use favourite::Entity as Favourite;
pub use notification::Entity as Notification;
pub use post::Entity as Post;
pub use post_rating::Entity as PostRating;
pub use privacy_policy::Entity as PrivacyPolicy;
pub use user::Entity as User;
pub use user_story::Entity as UserStory;
