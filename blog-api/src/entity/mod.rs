pub mod prelude;

pub mod author_profiles;
pub mod comments;
pub mod post_likes;
pub mod posts;
pub mod users;
