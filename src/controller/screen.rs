/// Per-screen policies: reconciliation, draft normalization, wording
use crate::api::UserScope;
use crate::error::AdminResult;
use crate::models::{NewContent, NewUser, UserUpdate};
use validator::Validate;

/// How local state follows a confirmed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    /// Refetch the whole collection
    Resync,
    /// Change only the record the call is known to have touched
    Patch,
}

/// The dashboard screens backed by a list controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    Admins,
    Clients,
    Comments,
    Newsletter,
    Content,
}

impl ScreenKind {
    pub fn label(&self) -> &'static str {
        match self {
            ScreenKind::Admins => "admins",
            ScreenKind::Clients => "clients",
            ScreenKind::Comments => "comments",
            ScreenKind::Newsletter => "newsletter",
            ScreenKind::Content => "content",
        }
    }

    pub fn on_delete(&self) -> Reconcile {
        match self {
            ScreenKind::Comments | ScreenKind::Newsletter => Reconcile::Patch,
            ScreenKind::Admins | ScreenKind::Clients | ScreenKind::Content => Reconcile::Resync,
        }
    }

    pub fn on_status(&self) -> Reconcile {
        match self {
            ScreenKind::Newsletter => Reconcile::Patch,
            _ => Reconcile::Resync,
        }
    }

    pub fn user_scope(&self) -> Option<UserScope> {
        match self {
            ScreenKind::Admins => Some(UserScope::Admins),
            ScreenKind::Clients => Some(UserScope::Clients),
            _ => None,
        }
    }

    pub fn messages(&self) -> &'static Messages {
        match self {
            ScreenKind::Admins => &ADMIN_MESSAGES,
            ScreenKind::Clients => &CLIENT_MESSAGES,
            ScreenKind::Comments => &COMMENT_MESSAGES,
            ScreenKind::Newsletter => &NEWSLETTER_MESSAGES,
            ScreenKind::Content => &CONTENT_MESSAGES,
        }
    }
}

/// Notice wording for one screen
#[derive(Debug)]
pub struct Messages {
    pub load_failed: &'static str,
    pub created: &'static str,
    pub create_failed: &'static str,
    pub updated: &'static str,
    pub update_failed: &'static str,
    pub deleted: &'static str,
    pub delete_failed: &'static str,
    pub status_changed: &'static str,
    pub status_failed: &'static str,
}

static ADMIN_MESSAGES: Messages = Messages {
    load_failed: "Erreur lors du chargement des administrateurs",
    created: "Administrateur ajouté avec succès",
    create_failed: "Erreur lors de l'ajout de l'administrateur",
    updated: "Administrateur mis à jour",
    update_failed: "Erreur lors de la mise à jour de l'administrateur",
    deleted: "Administrateur supprimé",
    delete_failed: "Erreur lors de la suppression de l'administrateur",
    status_changed: "Statut de l'administrateur mis à jour",
    status_failed: "Erreur lors du changement de statut de l'administrateur",
};

static CLIENT_MESSAGES: Messages = Messages {
    load_failed: "Erreur lors du chargement des clients",
    created: "Client ajouté avec succès",
    create_failed: "Erreur lors de l'ajout du client",
    updated: "Client mis à jour",
    update_failed: "Erreur lors de la mise à jour du client",
    deleted: "Client supprimé",
    delete_failed: "Erreur lors de la suppression du client",
    status_changed: "Statut du client mis à jour",
    status_failed: "Erreur lors du changement de statut du client",
};

static COMMENT_MESSAGES: Messages = Messages {
    load_failed: "Erreur lors du chargement des commentaires",
    created: "Commentaire ajouté",
    create_failed: "Erreur lors de l'ajout du commentaire",
    updated: "Commentaire mis à jour",
    update_failed: "Erreur lors de la mise à jour du commentaire",
    deleted: "Commentaire supprimé",
    delete_failed: "Erreur lors de la suppression du commentaire",
    status_changed: "Statut du commentaire mis à jour",
    status_failed: "Erreur lors du changement de statut du commentaire",
};

static NEWSLETTER_MESSAGES: Messages = Messages {
    load_failed: "Erreur lors du chargement des abonnés",
    created: "Abonné ajouté",
    create_failed: "Erreur lors de l'ajout de l'abonné",
    updated: "Abonné mis à jour",
    update_failed: "Erreur lors de la mise à jour de l'abonné",
    deleted: "Abonné supprimé",
    delete_failed: "Erreur lors de la suppression de l'abonné",
    status_changed: "Statut de l'abonnement mis à jour",
    status_failed: "Erreur lors du changement de statut de l'abonnement",
};

static CONTENT_MESSAGES: Messages = Messages {
    load_failed: "Erreur lors du chargement du contenu",
    created: "Contenu ajouté",
    create_failed: "Erreur lors de l'ajout du contenu",
    updated: "Contenu mis à jour",
    update_failed: "Erreur lors de la mise à jour du contenu",
    deleted: "Contenu supprimé",
    delete_failed: "Erreur lors de la suppression du contenu",
    status_changed: "Statut du contenu mis à jour",
    status_failed: "Erreur lors du changement de statut du contenu",
};

/// Fields a screen fixes or checks before a draft leaves the client
pub trait Prepare: Sized {
    fn prepare(self, screen: ScreenKind) -> AdminResult<Self>;
}

impl Prepare for NewUser {
    fn prepare(mut self, screen: ScreenKind) -> AdminResult<Self> {
        if let Some(scope) = screen.user_scope() {
            self.role = scope.force_role(self.role);
        }
        self.email = self.email.trim().to_lowercase();
        self.validate()?;
        Ok(self)
    }
}

impl Prepare for UserUpdate {
    fn prepare(mut self, screen: ScreenKind) -> AdminResult<Self> {
        if let (Some(scope), Some(role)) = (screen.user_scope(), self.role) {
            self.role = Some(scope.force_role(role));
        }
        if let Some(email) = self.email.as_mut() {
            *email = email.trim().to_lowercase();
        }
        self.validate()?;
        Ok(self)
    }
}

impl Prepare for NewContent {
    fn prepare(mut self, _screen: ScreenKind) -> AdminResult<Self> {
        self.key = self.key.trim().to_string();
        self.validate()?;
        Ok(self)
    }
}
