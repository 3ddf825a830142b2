//! Admission checks run before a player is let in.

use crate::list::PermissionList;
use std::net::SocketAddr;
use std::sync::Arc;

/// Identity a connecting player presents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    pub name: String,
    pub addr: SocketAddr,
}

impl LoginRequest {
    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            addr,
        }
    }
}

/// Reason shown to a player who was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct Rejection {
    pub message: String,
}

impl Rejection {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Decides whether a connecting player may join.
pub trait Allower: Send + Sync {
    fn allow(&self, request: &LoginRequest) -> Result<(), Rejection>;
}

impl<F> Allower for F
where
    F: Fn(&LoginRequest) -> Result<(), Rejection> + Send + Sync,
{
    fn allow(&self, request: &LoginRequest) -> Result<(), Rejection> {
        self(request)
    }
}

/// How list membership maps to admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Listed names are refused (ban list).
    Deny,
    /// Only listed names are admitted (whitelist).
    Require,
}

/// Admits or refuses players by their presence in a [`PermissionList`].
#[derive(Debug, Clone)]
pub struct ListAllower {
    list: Arc<PermissionList>,
    membership: Membership,
    message: String,
}

impl ListAllower {
    pub fn new(
        list: Arc<PermissionList>,
        membership: Membership,
        message: impl Into<String>,
    ) -> Self {
        Self {
            list,
            membership,
            message: message.into(),
        }
    }

    /// Refuses every listed name with `message`.
    pub fn deny(list: Arc<PermissionList>, message: impl Into<String>) -> Self {
        Self::new(list, Membership::Deny, message)
    }

    /// Admits only listed names.
    pub fn require(list: Arc<PermissionList>, message: impl Into<String>) -> Self {
        Self::new(list, Membership::Require, message)
    }

    /// Whether `name` passes this allower. Also used to gate commands by source name.
    pub fn permits(&self, name: &str) -> bool {
        match self.membership {
            Membership::Deny => !self.list.has(name),
            Membership::Require => self.list.has(name),
        }
    }
}

impl Allower for ListAllower {
    fn allow(&self, request: &LoginRequest) -> Result<(), Rejection> {
        if self.permits(&request.name) {
            Ok(())
        } else {
            Err(Rejection::new(self.message.clone()))
        }
    }
}

/// Runs allowers in order; the first rejection wins.
///
/// An empty chain admits everyone.
#[derive(Default)]
pub struct AllowerChain {
    allowers: Vec<Box<dyn Allower>>,
}

impl AllowerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an allower, builder style.
    pub fn with(mut self, allower: impl Allower + 'static) -> Self {
        self.push(allower);
        self
    }

    pub fn push(&mut self, allower: impl Allower + 'static) {
        self.allowers.push(Box::new(allower));
    }

    pub fn len(&self) -> usize {
        self.allowers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowers.is_empty()
    }
}

impl Allower for AllowerChain {
    fn allow(&self, request: &LoginRequest) -> Result<(), Rejection> {
        self.allowers.iter().try_for_each(|allower| allower.allow(request))
    }
}

impl std::fmt::Debug for AllowerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AllowerChain")
            .field("allowers", &self.allowers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request(name: &str) -> LoginRequest {
        LoginRequest::new(name, "127.0.0.1:19132".parse().unwrap())
    }

    async fn list(dir: &TempDir, file: &str, names: &[&str]) -> Arc<PermissionList> {
        Arc::new(PermissionList::load(dir.path().join(file), names).await.unwrap())
    }

    #[tokio::test]
    async fn test_deny_and_require_membership() {
        let dir = TempDir::new().unwrap();
        let bans = ListAllower::deny(list(&dir, "bans.txt", &["Griefer"]).await, "Banned by admin");
        let whitelist =
            ListAllower::require(list(&dir, "white.txt", &["Steve"]).await, "Not whitelisted");

        assert_eq!(bans.allow(&request("Griefer")), Err(Rejection::new("Banned by admin")));
        assert!(bans.allow(&request("Steve")).is_ok());
        assert!(whitelist.allow(&request("Steve")).is_ok());
        assert!(!whitelist.permits("Alex"));
    }

    #[tokio::test]
    async fn test_chain_first_rejection_wins() {
        let dir = TempDir::new().unwrap();
        let chain = AllowerChain::new()
            .with(ListAllower::deny(list(&dir, "bans.txt", &["Griefer"]).await, "banned"))
            .with(|req: &LoginRequest| {
                if req.name.len() > 3 {
                    Ok(())
                } else {
                    Err(Rejection::new("name too short"))
                }
            });

        assert_eq!(chain.len(), 2);
        assert_eq!(chain.allow(&request("Griefer")).unwrap_err().message, "banned");
        assert_eq!(chain.allow(&request("Bo")).unwrap_err().message, "name too short");
        assert!(chain.allow(&request("Steve")).is_ok());
    }

    #[test]
    fn test_empty_chain_admits_everyone() {
        let chain = AllowerChain::new();
        assert!(chain.is_empty());
        assert!(chain.allow(&request("anyone")).is_ok());
    }
}
