/// Admin and client accounts (`/users`)
use crate::{
    api::{client::StatusBody, CreateApi, ListApi, RemoveApi, RestClient, StatusApi, UpdateApi},
    error::{AdminError, AdminResult},
    models::{NewUser, Role, User, UserStatus, UserUpdate},
};
use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

/// The slice of accounts one screen manages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserScope {
    /// Admins and superadmins
    Admins,
    /// Shop customers
    Clients,
}

impl UserScope {
    pub fn contains(&self, role: Role) -> bool {
        match self {
            UserScope::Admins => role.is_staff(),
            UserScope::Clients => role == Role::Client,
        }
    }

    /// Role forced onto accounts created or edited from this scope
    ///
    /// The admins screen keeps a requested superadmin role and turns
    /// anything else into admin; the clients screen always yields client.
    pub fn force_role(&self, requested: Role) -> Role {
        match self {
            UserScope::Admins if requested == Role::SuperAdmin => Role::SuperAdmin,
            UserScope::Admins => Role::Admin,
            UserScope::Clients => Role::Client,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UserScope::Admins => "admins",
            UserScope::Clients => "clients",
        }
    }
}

/// Refuse ids that exist outside `scope` or not at all
pub(crate) fn check_scope(scope: UserScope, users: &[User], id: i64) -> AdminResult<()> {
    match users.iter().find(|user| user.id == id) {
        Some(user) if scope.contains(user.role) => Ok(()),
        _ => Err(AdminError::NotFound(format!(
            "Utilisateur {} introuvable parmi les {}",
            id,
            scope.label()
        ))),
    }
}

/// `/users` restricted to one scope
#[derive(Clone)]
pub struct UserDirectory {
    client: RestClient,
    scope: UserScope,
}

impl UserDirectory {
    pub fn new(client: RestClient, scope: UserScope) -> Self {
        Self { client, scope }
    }

    pub fn scope(&self) -> UserScope {
        self.scope
    }

    /// There is no per-id route, so the full list is fetched
    async fn ensure_in_scope(&self, id: i64) -> AdminResult<()> {
        let users: Vec<User> = self.client.get("/users").await?;
        check_scope(self.scope, &users, id)
    }
}

#[async_trait]
impl ListApi for UserDirectory {
    type Record = User;

    async fn list_all(&self) -> AdminResult<Vec<User>> {
        let users: Vec<User> = self.client.get("/users").await?;
        let total = users.len();
        let scoped: Vec<User> = users
            .into_iter()
            .filter(|user| self.scope.contains(user.role))
            .collect();
        debug!("{} of {} users are {}", scoped.len(), total, self.scope.label());
        Ok(scoped)
    }
}

#[async_trait]
impl CreateApi for UserDirectory {
    type Draft = NewUser;

    async fn create(&self, draft: &NewUser) -> AdminResult<()> {
        self.client.send_unit(Method::POST, "/users", Some(draft)).await
    }
}

#[async_trait]
impl UpdateApi for UserDirectory {
    type Patch = UserUpdate;

    async fn update(&self, id: &i64, patch: &UserUpdate) -> AdminResult<()> {
        self.ensure_in_scope(*id).await?;
        self.client
            .send_unit(Method::PUT, &format!("/users/{}", id), Some(patch))
            .await
    }
}

#[async_trait]
impl RemoveApi for UserDirectory {
    async fn remove(&self, id: &i64) -> AdminResult<()> {
        self.ensure_in_scope(*id).await?;
        self.client
            .send_unit::<()>(Method::DELETE, &format!("/users/{}", id), None)
            .await
    }
}

#[async_trait]
impl StatusApi for UserDirectory {
    type Status = UserStatus;

    async fn set_status(&self, id: &i64, status: UserStatus) -> AdminResult<()> {
        self.ensure_in_scope(*id).await?;
        self.client
            .send_unit(
                Method::PATCH,
                &format!("/users/{}/status", id),
                Some(&StatusBody { status }),
            )
            .await
    }
}
