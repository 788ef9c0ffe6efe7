use crate::{
    error::{AppError, Result},
    models::follow::*,
    services::{auth::AuthUser, repository::Repository},
    utils::{
        permissions::{Access, Policy},
        validation::normalize_search,
    },
};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

const SELF_FOLLOW: &str = "Cannot follow yourself";
const DUPLICATE_FOLLOW: &str = "You are already following this user";

/// 按被关注者用户名过滤关注关系，不区分大小写的子串匹配
/// 未提供或为空白的 search 不做过滤
pub fn filter_follows(edges: Vec<Follow>, search: Option<&str>) -> Vec<Follow> {
    match normalize_search(search) {
        None => edges,
        Some(needle) => {
            let needle = needle.to_lowercase();
            edges
                .into_iter()
                .filter(|edge| edge.following.to_lowercase().contains(&needle))
                .collect()
        }
    }
}

#[derive(Clone)]
pub struct FollowService {
    db: Arc<dyn Repository>,
    policy: Policy,
}

impl FollowService {
    pub fn new(db: Arc<dyn Repository>) -> Self {
        Self {
            db,
            policy: Policy::authenticated(),
        }
    }

    fn identity<'a>(&self, user: Option<&'a AuthUser>, access: Access) -> Result<&'a AuthUser> {
        self.policy.check(user, access)?;
        user.ok_or_else(|| AppError::unauthorized("Authentication credentials were not provided"))
    }

    pub async fn follow_user(
        &self,
        user: Option<&AuthUser>,
        request: CreateFollowRequest,
    ) -> Result<Follow> {
        let user = self.identity(user, Access::Unsafe)?;
        debug!("User {} following user {}", user.username, request.following);

        let target = self
            .db
            .find_user_by_username(&request.following)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        if target.username == user.username {
            return Err(AppError::validation(SELF_FOLLOW));
        }

        if self.db.follow_exists(&user.username, &target.username).await? {
            return Err(AppError::validation(DUPLICATE_FOLLOW));
        }

        let follow = Follow {
            id: Uuid::new_v4().to_string(),
            user: user.username.clone(),
            following: target.username,
        };

        // 存储层唯一约束捕获并发重复关注
        let follow = self.db.insert_follow(follow).await.map_err(|e| match e {
            AppError::Conflict(_) => AppError::validation(DUPLICATE_FOLLOW),
            other => other,
        })?;

        info!("User {} followed user {}", follow.user, follow.following);
        Ok(follow)
    }

    pub async fn get_following(
        &self,
        user: Option<&AuthUser>,
        search: Option<&str>,
    ) -> Result<Vec<Follow>> {
        let user = self.identity(user, Access::Safe)?;
        debug!("Getting following for user: {}", user.username);

        let edges = self.db.list_follows(&user.username).await?;
        Ok(filter_follows(edges, search))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::user::User, services::memory::MemoryStore};
    use chrono::Utc;
    use proptest::prelude::*;

    fn edge(user: &str, following: &str) -> Follow {
        Follow {
            id: format!("{}->{}", user, following),
            user: user.to_string(),
            following: following.to_string(),
        }
    }

    fn identity(username: &str) -> AuthUser {
        AuthUser {
            id: format!("id-{}", username),
            username: username.to_string(),
        }
    }

    async fn service_with_users(usernames: &[&str]) -> FollowService {
        let store = MemoryStore::new();
        for username in usernames {
            store
                .insert_user(User {
                    id: format!("id-{}", username),
                    username: username.to_string(),
                    email: String::new(),
                    first_name: String::new(),
                    last_name: String::new(),
                    password_hash: String::new(),
                    date_joined: Utc::now(),
                })
                .await
                .unwrap();
        }
        FollowService::new(Arc::new(store))
    }

    fn request(following: &str) -> CreateFollowRequest {
        CreateFollowRequest {
            following: following.to_string(),
        }
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let edges = vec![
            edge("me", "alice"),
            edge("me", "ALINA"),
            edge("me", "bob"),
        ];
        let found: Vec<_> = filter_follows(edges, Some("ali"))
            .into_iter()
            .map(|e| e.following)
            .collect();
        assert_eq!(found, vec!["alice", "ALINA"]);
    }

    #[test]
    fn test_filter_without_search_keeps_order() {
        let edges = vec![edge("me", "carol"), edge("me", "alice"), edge("me", "bob")];
        assert_eq!(filter_follows(edges.clone(), None), edges);
        assert_eq!(filter_follows(edges.clone(), Some("")), edges);
    }

    #[test]
    fn test_filter_matches_only_following_side() {
        let edges = vec![edge("alice", "bob")];
        assert!(filter_follows(edges, Some("alice")).is_empty());
    }

    #[tokio::test]
    async fn test_follow_and_list() {
        let follows = service_with_users(&["me", "alice", "alina", "bob"]).await;
        let me = identity("me");
        for target in ["alice", "alina", "bob"] {
            follows.follow_user(Some(&me), request(target)).await.unwrap();
        }

        let all = follows.get_following(Some(&me), None).await.unwrap();
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|e| e.user == "me"));

        let found: Vec<_> = follows
            .get_following(Some(&me), Some("ALI"))
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.following)
            .collect();
        assert_eq!(found, vec!["alice", "alina"]);
    }

    #[tokio::test]
    async fn test_duplicate_follow_is_rejected() {
        let follows = service_with_users(&["me", "alice"]).await;
        let me = identity("me");
        follows.follow_user(Some(&me), request("alice")).await.unwrap();

        let err = follows.follow_user(Some(&me), request("alice")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(follows.get_following(Some(&me), None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_target_is_not_found() {
        let follows = service_with_users(&["me"]).await;
        let err = follows
            .follow_user(Some(&identity("me")), request("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_anonymous_is_unauthenticated() {
        let follows = service_with_users(&["alice"]).await;
        assert!(matches!(
            follows.get_following(None, None).await,
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            follows.follow_user(None, request("alice")).await,
            Err(AppError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_edges_are_private_to_follower() {
        let follows = service_with_users(&["alice", "bob"]).await;
        follows
            .follow_user(Some(&identity("alice")), request("bob"))
            .await
            .unwrap();

        // 被关注者看不到这条关系
        assert!(follows
            .get_following(Some(&identity("bob")), None)
            .await
            .unwrap()
            .is_empty());
    }

    proptest! {
        #[test]
        fn prop_self_follow_always_fails(username in "[a-zA-Z0-9_.@+-]{1,30}") {
            let result = tokio_test::block_on(async {
                let follows = service_with_users(&[username.as_str()]).await;
                follows
                    .follow_user(Some(&identity(&username)), request(&username))
                    .await
            });
            prop_assert!(matches!(result, Err(AppError::Validation(_))));
        }
    }
}
