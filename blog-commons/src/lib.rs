pub mod validation;

pub mod data_structures {
    use chrono::NaiveDateTime;
    use serde;
    use uuid::Uuid;
    use validator::Validate;

    pub const POSTS_PER_PAGE: u64 = 5;
    pub const AUTHORS_PER_PAGE: u64 = 10;

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, Validate)]
    pub struct RegistrationData {
        #[validate(
            length(min = 3, message = "Username must be at least 3 characters long."),
            custom(function = "crate::validation::validate_username")
        )]
        pub username: String,
        #[validate(email(message = "Enter a valid email address."))]
        pub email: String,
        #[validate(custom(function = "crate::validation::validate_password"))]
        pub password1: String,
        #[validate(must_match(
            other = "password1",
            message = "The two password fields didn't match."
        ))]
        pub password2: String,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug)]
    pub struct LoginData {
        pub username: String,
        pub password: String,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, Validate)]
    pub struct PostFormData {
        #[validate(length(min = 1, max = 200, message = "title must be between 1 and 200 characters"))]
        pub title: String,
        #[validate(length(max = 500, message = "description must be at most 500 characters"))]
        pub description: Option<String>,
        pub content: Option<String>,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, Validate)]
    pub struct CommentFormData {
        #[validate(length(min = 1, message = "comment content is required"))]
        pub content: String,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, Default, Validate)]
    pub struct ProfileFormData {
        #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
        #[serde(default)]
        pub bio: String,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
    pub struct PostsQuery {
        pub q: Option<String>,
        pub page: Option<u64>,
    }

    #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Default)]
    pub struct PageQuery {
        pub page: Option<u64>,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct Page<T> {
        pub items: Vec<T>,
        pub page: u64,
        pub num_pages: u64,
        pub total: u64,
    }

    #[derive(Clone, Copy, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct SiteStats {
        pub num_posts: u64,
        pub num_authors: u64,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct UserData {
        pub user_id: Uuid,
        pub username: String,
        pub email: String,
        pub joined: NaiveDateTime,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct PostData {
        pub post_id: Uuid,
        pub user_id: Uuid,
        pub author: String,
        pub title: String,
        pub description: Option<String>,
        pub content: Option<String>,
        pub posted: NaiveDateTime,
        pub total_likes: u64,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct CommentData {
        pub comment_id: Uuid,
        pub post_id: Uuid,
        pub user_id: Uuid,
        pub author: String,
        pub posted: NaiveDateTime,
        pub content: String,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct PostDetail {
        pub post: PostData,
        pub comments: Vec<CommentData>,
        /// Present only when the request carries a valid session.
        #[serde(skip_serializing_if = "Option::is_none", default)]
        pub is_liked: Option<bool>,
    }

    #[derive(Clone, Copy, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct LikeToggle {
        pub liked: bool,
        pub total_likes: u64,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct ProfileData {
        pub profile_id: Uuid,
        pub user_id: Uuid,
        pub username: String,
        pub bio: String,
        pub has_picture: bool,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct AuthorSummary {
        pub user_id: Uuid,
        pub username: String,
        pub profile_id: Option<Uuid>,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct AuthorDetail {
        pub profile: ProfileData,
        pub posts: Vec<PostData>,
        pub total_likes: u64,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct DashboardData {
        pub posts: Vec<PostData>,
        pub total_posts: u64,
        pub total_likes: u64,
        pub total_comments: u64,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct ProfilePageData {
        pub user: UserData,
        pub profile: Option<ProfileData>,
        #[serde(flatten)]
        pub dashboard: DashboardData,
    }

    #[derive(Clone, serde::Serialize, Debug)]
    pub struct ValidationErrorResponse {
        pub reason: String,
        pub errors: validator::ValidationErrors,
    }

    #[derive(Clone, serde::Serialize, serde::Deserialize, Debug, PartialEq, Eq)]
    pub struct ErrorResponse {
        pub error: String,
    }
}
