pub mod auth;
pub mod comment;
pub mod database;
pub mod follow;
pub mod group;
pub mod memory;
pub mod post;
pub mod repository;
pub mod user;

// 重新导出常用类型
pub use auth::AuthService;
pub use comment::CommentService;
pub use database::Database;
pub use follow::FollowService;
pub use group::GroupService;
pub use memory::MemoryStore;
pub use post::PostService;
pub use repository::Repository;
pub use user::UserService;
