use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{comment::Comment, follow::Follow, group::Group, post::Post, user::User};
use crate::services::repository::Repository;
use async_trait::async_trait;
use chrono::Utc;
use serde::de::DeserializeOwned;
use surrealdb::engine::any::{self, Any};
use surrealdb::opt::auth::Root;
use surrealdb::{Response, Surreal};
use tracing::{debug, error, info};

const USER_TABLE: &str = "blog_user";
const GROUP_TABLE: &str = "blog_group";
const POST_TABLE: &str = "post";
const COMMENT_TABLE: &str = "comment";
const FOLLOW_TABLE: &str = "follow";

/// 唯一索引保证并发写入下的数据完整性
const SCHEMA: &str = r#"
    DEFINE INDEX blog_user_username ON TABLE blog_user COLUMNS username UNIQUE;
    DEFINE INDEX blog_group_slug ON TABLE blog_group COLUMNS slug UNIQUE;
    DEFINE INDEX follow_user_following ON TABLE follow COLUMNS user, following UNIQUE;
    DEFINE INDEX comment_post ON TABLE comment COLUMNS post;
"#;

const USER_FIELDS: &str =
    "meta::id(id) AS id, username, email, first_name, last_name, password_hash, date_joined";
const GROUP_FIELDS: &str = "meta::id(id) AS id, title, slug, description";
const POST_FIELDS: &str = "meta::id(id) AS id, text, pub_date, author, group_id, image";
const COMMENT_FIELDS: &str = "meta::id(id) AS id, author, post, text, created";
const FOLLOW_FIELDS: &str = "meta::id(id) AS id, user, following, created_at";

/// SurrealDB 数据库服务
#[derive(Clone)]
pub struct Database {
    client: Surreal<Any>,
    pub config: Config,
}

impl Database {
    /// 创建新的数据库实例
    pub async fn new(config: &Config) -> Result<Self> {
        info!("Initializing database connection to {}", config.database_url);

        let client = any::connect(config.database_url.as_str()).await?;

        // 内存引擎不需要登录
        if !config.database_url.starts_with("mem://") {
            client
                .signin(Root {
                    username: &config.database_username,
                    password: &config.database_password,
                })
                .await?;
        }

        client
            .use_ns(config.database_namespace.as_str())
            .use_db(config.database_name.as_str())
            .await?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// 验证数据库连接
    pub async fn verify_connection(&self) -> Result<()> {
        match self.client.query("INFO FOR DB").await.and_then(Response::check) {
            Ok(_) => {
                info!("Database connection verified successfully");
                Ok(())
            }
            Err(e) => {
                error!("Failed to verify database connection: {}", e);
                Err(AppError::from(e))
            }
        }
    }

    /// 定义唯一索引
    pub async fn define_schema(&self) -> Result<()> {
        self.client.query(SCHEMA).await?.check()?;
        info!("Database indexes defined");
        Ok(())
    }

    async fn delete_record(&self, table: &str, id: &str) -> Result<()> {
        self.client
            .query("DELETE type::thing($tb, $id)")
            .bind(("tb", table.to_string()))
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}

fn take_all<T: DeserializeOwned>(mut response: Response) -> Result<Vec<T>> {
    Ok(response.take::<Vec<T>>(0)?)
}

fn take_first<T: DeserializeOwned>(response: Response) -> Result<Option<T>> {
    Ok(take_all(response)?.into_iter().next())
}

/// 唯一索引冲突转换为 Conflict，其余错误原样返回
///
/// SurrealDB 1.x 对唯一索引冲突报告
/// "Database index `<name>` already contains <value>, with record `<id>`"，
/// 这里依赖其中的 "already contains" 片段。
fn write_error(err: surrealdb::Error, conflict: &str) -> AppError {
    if err.to_string().contains("already contains") {
        debug!("Unique index rejected write: {}", err);
        AppError::conflict(conflict)
    } else {
        AppError::Database(err)
    }
}

#[async_trait]
impl Repository for Database {
    async fn insert_user(&self, user: User) -> Result<User> {
        self.client
            .query(
                "CREATE type::thing($tb, $id) SET username = $username, email = $email, \
                 first_name = $first_name, last_name = $last_name, \
                 password_hash = $password_hash, date_joined = $date_joined",
            )
            .bind(("tb", USER_TABLE))
            .bind(("id", user.id.clone()))
            .bind(("username", user.username.clone()))
            .bind(("email", user.email.clone()))
            .bind(("first_name", user.first_name.clone()))
            .bind(("last_name", user.last_name.clone()))
            .bind(("password_hash", user.password_hash.clone()))
            .bind(("date_joined", user.date_joined))
            .await?
            .check()
            .map_err(|e| write_error(e, "A user with that username already exists"))?;
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        let response = self
            .client
            .query(format!("SELECT {} FROM type::thing($tb, $id)", USER_FIELDS))
            .bind(("tb", USER_TABLE))
            .bind(("id", id.to_string()))
            .await?;
        take_first(response)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let response = self
            .client
            .query(format!(
                "SELECT {} FROM type::table($tb) WHERE username = $username LIMIT 1",
                USER_FIELDS
            ))
            .bind(("tb", USER_TABLE))
            .bind(("username", username.to_string()))
            .await?;
        take_first(response)
    }

    async fn insert_group(&self, group: Group) -> Result<Group> {
        self.client
            .query(
                "CREATE type::thing($tb, $id) SET title = $title, slug = $slug, \
                 description = $description",
            )
            .bind(("tb", GROUP_TABLE))
            .bind(("id", group.id.clone()))
            .bind(("title", group.title.clone()))
            .bind(("slug", group.slug.clone()))
            .bind(("description", group.description.clone()))
            .await?
            .check()
            .map_err(|e| write_error(e, "A group with that slug already exists"))?;
        Ok(group)
    }

    async fn list_groups(&self) -> Result<Vec<Group>> {
        let response = self
            .client
            .query(format!("SELECT {} FROM type::table($tb) ORDER BY title", GROUP_FIELDS))
            .bind(("tb", GROUP_TABLE))
            .await?;
        take_all(response)
    }

    async fn get_group(&self, id: &str) -> Result<Option<Group>> {
        let response = self
            .client
            .query(format!("SELECT {} FROM type::thing($tb, $id)", GROUP_FIELDS))
            .bind(("tb", GROUP_TABLE))
            .bind(("id", id.to_string()))
            .await?;
        take_first(response)
    }

    async fn insert_post(&self, post: Post) -> Result<Post> {
        self.client
            .query(
                "CREATE type::thing($tb, $id) SET text = $text, pub_date = $pub_date, \
                 author = $author, group_id = $group_id, image = $image",
            )
            .bind(("tb", POST_TABLE))
            .bind(("id", post.id.clone()))
            .bind(("text", post.text.clone()))
            .bind(("pub_date", post.pub_date))
            .bind(("author", post.author.clone()))
            .bind(("group_id", post.group.clone()))
            .bind(("image", post.image.clone()))
            .await?
            .check()?;
        Ok(post)
    }

    async fn list_posts(&self) -> Result<Vec<Post>> {
        let response = self
            .client
            .query(format!("SELECT {} FROM type::table($tb) ORDER BY pub_date", POST_FIELDS))
            .bind(("tb", POST_TABLE))
            .await?;
        take_all(response)
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        let response = self
            .client
            .query(format!("SELECT {} FROM type::thing($tb, $id)", POST_FIELDS))
            .bind(("tb", POST_TABLE))
            .bind(("id", id.to_string()))
            .await?;
        take_first(response)
    }

    async fn update_post(&self, post: Post) -> Result<Post> {
        self.client
            .query(
                "UPDATE type::thing($tb, $id) SET text = $text, group_id = $group_id, \
                 image = $image",
            )
            .bind(("tb", POST_TABLE))
            .bind(("id", post.id.clone()))
            .bind(("text", post.text.clone()))
            .bind(("group_id", post.group.clone()))
            .bind(("image", post.image.clone()))
            .await?
            .check()?;
        Ok(post)
    }

    async fn delete_post(&self, id: &str) -> Result<()> {
        // 帖子与其评论在同一事务中删除
        self.client
            .query(
                "BEGIN TRANSACTION; \
                 DELETE type::table($comments) WHERE post = $id; \
                 DELETE type::thing($tb, $id); \
                 COMMIT TRANSACTION;",
            )
            .bind(("comments", COMMENT_TABLE))
            .bind(("tb", POST_TABLE))
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(())
    }

    async fn insert_comment(&self, comment: Comment) -> Result<Comment> {
        self.client
            .query(
                "CREATE type::thing($tb, $id) SET author = $author, post = $post, \
                 text = $text, created = $created",
            )
            .bind(("tb", COMMENT_TABLE))
            .bind(("id", comment.id.clone()))
            .bind(("author", comment.author.clone()))
            .bind(("post", comment.post.clone()))
            .bind(("text", comment.text.clone()))
            .bind(("created", comment.created))
            .await?
            .check()?;
        Ok(comment)
    }

    async fn list_comments(&self, post_id: &str) -> Result<Vec<Comment>> {
        let response = self
            .client
            .query(format!(
                "SELECT {} FROM type::table($tb) WHERE post = $post ORDER BY created",
                COMMENT_FIELDS
            ))
            .bind(("tb", COMMENT_TABLE))
            .bind(("post", post_id.to_string()))
            .await?;
        take_all(response)
    }

    async fn get_comment(&self, post_id: &str, id: &str) -> Result<Option<Comment>> {
        let response = self
            .client
            .query(format!(
                "SELECT {} FROM type::thing($tb, $id) WHERE post = $post",
                COMMENT_FIELDS
            ))
            .bind(("tb", COMMENT_TABLE))
            .bind(("id", id.to_string()))
            .bind(("post", post_id.to_string()))
            .await?;
        take_first(response)
    }

    async fn update_comment(&self, comment: Comment) -> Result<Comment> {
        self.client
            .query("UPDATE type::thing($tb, $id) SET text = $text")
            .bind(("tb", COMMENT_TABLE))
            .bind(("id", comment.id.clone()))
            .bind(("text", comment.text.clone()))
            .await?
            .check()?;
        Ok(comment)
    }

    async fn delete_comment(&self, id: &str) -> Result<()> {
        self.delete_record(COMMENT_TABLE, id).await
    }

    async fn insert_follow(&self, follow: Follow) -> Result<Follow> {
        self.client
            .query(
                "CREATE type::thing($tb, $id) SET user = $user, following = $following, \
                 created_at = $created_at",
            )
            .bind(("tb", FOLLOW_TABLE))
            .bind(("id", follow.id.clone()))
            .bind(("user", follow.user.clone()))
            .bind(("following", follow.following.clone()))
            .bind(("created_at", Utc::now()))
            .await?
            .check()
            .map_err(|e| write_error(e, "Follow edge already exists"))?;
        Ok(follow)
    }

    async fn list_follows(&self, username: &str) -> Result<Vec<Follow>> {
        let response = self
            .client
            .query(format!(
                "SELECT {} FROM type::table($tb) WHERE user = $user ORDER BY created_at",
                FOLLOW_FIELDS
            ))
            .bind(("tb", FOLLOW_TABLE))
            .bind(("user", username.to_string()))
            .await?;
        take_all(response)
    }

    async fn follow_exists(&self, username: &str, following: &str) -> Result<bool> {
        let response = self
            .client
            .query(format!(
                "SELECT {} FROM type::table($tb) WHERE user = $user AND following = $following LIMIT 1",
                FOLLOW_FIELDS
            ))
            .bind(("tb", FOLLOW_TABLE))
            .bind(("user", username.to_string()))
            .bind(("following", following.to_string()))
            .await?;
        Ok(take_first::<Follow>(response)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    async fn memory_database() -> Database {
        let config = Config {
            database_url: "mem://".to_string(),
            ..Config::default()
        };
        let db = Database::new(&config).await.unwrap();
        db.define_schema().await.unwrap();
        db
    }

    fn follow(id: &str, user: &str, following: &str) -> Follow {
        Follow {
            id: id.to_string(),
            user: user.to_string(),
            following: following.to_string(),
        }
    }

    fn user(id: &str, username: &str) -> User {
        User {
            id: id.to_string(),
            username: username.to_string(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            password_hash: "hash".to_string(),
            date_joined: Utc::now(),
        }
    }

    fn post(id: &str, group: Option<&str>) -> Post {
        let second = id.trim_start_matches('p').parse().unwrap_or(0);
        Post {
            id: id.to_string(),
            text: format!("text of {}", id),
            pub_date: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, second).unwrap(),
            author: "alice".to_string(),
            group: group.map(str::to_string),
            image: Some("posts/cat.png".to_string()),
        }
    }

    fn comment(id: &str, post_id: &str) -> Comment {
        Comment {
            id: id.to_string(),
            author: "bob".to_string(),
            post: post_id.to_string(),
            text: "nice".to_string(),
            created: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_database_connection() {
        let db = memory_database().await;
        assert!(db.verify_connection().await.is_ok());
    }

    #[tokio::test]
    async fn test_follow_unique_index() {
        let db = memory_database().await;
        db.insert_follow(follow("f1", "alice", "bob")).await.unwrap();

        let err = db.insert_follow(follow("f2", "alice", "bob")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let edges = db.list_follows("alice").await.unwrap();
        assert_eq!(edges, vec![follow("f1", "alice", "bob")]);
        assert!(db.follow_exists("alice", "bob").await.unwrap());
        assert!(!db.follow_exists("bob", "alice").await.unwrap());
    }

    #[tokio::test]
    async fn test_post_fields_round_trip() {
        let db = memory_database().await;
        db.insert_post(post("p1", Some("g1"))).await.unwrap();
        db.insert_post(post("p2", None)).await.unwrap();

        let stored = db.get_post("p1").await.unwrap().unwrap();
        assert_eq!(stored.id, "p1");
        assert_eq!(stored.text, "text of p1");
        assert_eq!(stored.author, "alice");
        assert_eq!(stored.group.as_deref(), Some("g1"));
        assert_eq!(stored.image.as_deref(), Some("posts/cat.png"));

        let mut edited = stored.clone();
        edited.text = "edited".to_string();
        edited.group = None;
        db.update_post(edited).await.unwrap();
        let stored = db.get_post("p1").await.unwrap().unwrap();
        assert_eq!(stored.text, "edited");
        assert!(stored.group.is_none());

        let ids: Vec<_> = db.list_posts().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert!(db.get_post("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_comment_lookup_is_scoped_to_post() {
        let db = memory_database().await;
        db.insert_post(post("p1", None)).await.unwrap();
        db.insert_post(post("p2", None)).await.unwrap();
        db.insert_comment(comment("c1", "p1")).await.unwrap();

        let found = db.get_comment("p1", "c1").await.unwrap().unwrap();
        assert_eq!(found.id, "c1");
        assert_eq!(found.post, "p1");
        assert_eq!(found.author, "bob");
        assert!(db.get_comment("p2", "c1").await.unwrap().is_none());

        assert_eq!(db.list_comments("p1").await.unwrap().len(), 1);
        assert!(db.list_comments("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_post_removes_its_comments() {
        let db = memory_database().await;
        db.insert_post(post("p1", None)).await.unwrap();
        db.insert_post(post("p2", None)).await.unwrap();
        db.insert_comment(comment("c1", "p1")).await.unwrap();
        db.insert_comment(comment("c2", "p2")).await.unwrap();

        db.delete_post("p1").await.unwrap();

        assert!(db.get_post("p1").await.unwrap().is_none());
        assert!(db.list_comments("p1").await.unwrap().is_empty());
        assert!(db.get_post("p2").await.unwrap().is_some());
        assert_eq!(db.list_comments("p2").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_username_unique_index_is_conflict() {
        let db = memory_database().await;
        db.insert_user(user("u1", "alice")).await.unwrap();

        // 依赖 SurrealDB 的 "already contains" 报错才能得到 Conflict
        let err = db.insert_user(user("u2", "alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = db.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(stored.id, "u1");
        assert_eq!(stored.password_hash, "hash");
        assert!(db.get_user("u2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_validation_error() {
        use crate::{
            models::user::RegisterRequest,
            services::{auth::AuthService, user::UserService},
        };
        use std::sync::Arc;

        let db = memory_database().await;
        let auth = AuthService::new(&Config::default()).unwrap();
        let users = UserService::new(Arc::new(db), auth);
        let request = RegisterRequest {
            username: "alice".to_string(),
            password: "correct-horse".to_string(),
            email: None,
            first_name: None,
            last_name: None,
        };

        users.register(request.clone()).await.unwrap();
        let err = users.register(request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_group_slug_unique_index_is_conflict() {
        let db = memory_database().await;
        let group = |id: &str| Group {
            id: id.to_string(),
            title: "Cats".to_string(),
            slug: "cats".to_string(),
            description: String::new(),
        };
        db.insert_group(group("g1")).await.unwrap();
        assert!(matches!(
            db.insert_group(group("g2")).await,
            Err(AppError::Conflict(_))
        ));
        assert_eq!(db.list_groups().await.unwrap().len(), 1);
    }
}
