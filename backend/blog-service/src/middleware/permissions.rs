/// Authorization module for blog-service
///
/// Anonymous access to protected pages is answered with a redirect to the
/// login page. Ownership is checked against the post's author: editing falls
/// back to a redirect, deleting is refused outright.
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Post, User};

/// Outcome of a login check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted(User),
    /// Send the client here instead
    Redirect(String),
}

/// `{login_url}?next={path}` with the path percent-encoded
pub fn login_redirect(login_url: &str, next_path: &str) -> String {
    format!("{}?next={}", login_url, urlencoding::encode(next_path))
}

pub fn login_required(identity: Option<User>, next_path: &str, login_url: &str) -> Access {
    match identity {
        Some(user) => Access::Granted(user),
        None => Access::Redirect(login_redirect(login_url, next_path)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Owner,
    NotOwner,
}

/// Check if a user owns a post
pub fn check_post_ownership(user_id: Uuid, post: &Post) -> Ownership {
    if post.author_id == user_id {
        Ownership::Owner
    } else {
        Ownership::NotOwner
    }
}

/// Only the author can delete their own posts
pub fn require_post_owner(user_id: Uuid, post: &Post) -> Result<()> {
    match check_post_ownership(user_id, post) {
        Ownership::Owner => Ok(()),
        Ownership::NotOwner => Err(AppError::PermissionDenied(
            "You don't have permission to modify this post".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
        }
    }

    fn post_by(author: &User) -> Post {
        Post {
            id: 1,
            text: "text".to_string(),
            created_at: Utc::now(),
            author_id: author.id,
            group_id: None,
            image: None,
        }
    }

    #[test]
    fn test_anonymous_is_redirected_with_next() {
        let access = login_required(None, "/posts/5/comment/", "/auth/login/");
        assert_eq!(
            access,
            Access::Redirect("/auth/login/?next=%2Fposts%2F5%2Fcomment%2F".to_string())
        );
    }

    #[test]
    fn test_logged_in_user_is_granted() {
        let leo = user("leo");
        assert_eq!(
            login_required(Some(leo.clone()), "/create/", "/auth/login/"),
            Access::Granted(leo)
        );
    }

    #[test]
    fn test_post_ownership() {
        let author = user("author");
        let other = user("other");
        let post = post_by(&author);

        assert_eq!(check_post_ownership(author.id, &post), Ownership::Owner);
        assert_eq!(check_post_ownership(other.id, &post), Ownership::NotOwner);
        assert!(require_post_owner(author.id, &post).is_ok());
        assert!(matches!(
            require_post_owner(other.id, &post),
            Err(AppError::PermissionDenied(_))
        ));
    }
}
