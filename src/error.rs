//! Errors returned by this crate

use thiserror::Error;

use crate::task::TaskId;

/// Shown when the server gives no usable explanation for a failure
pub const GENERIC_FAILURE_MESSAGE: &str = "Une erreur inattendue s'est produite. Veuillez réessayer plus tard.";

#[derive(Error, Debug)]
pub enum Error {
    /// A form did not pass local validation. No request has been sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server could not be reached at all. The inner string is only meant for logs.
    #[error("Impossible de se connecter au serveur. Veuillez vérifier votre connexion internet.")]
    Network(String),

    /// The server answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No authentication token is available
    #[error("Vous n'êtes pas connecté.")]
    Unauthenticated,

    #[error("Réponse invalide du serveur: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("Unknown task {0}")]
    UnknownTask(TaskId),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unable to access the session file: {0}")]
    Storage(#[from] std::io::Error),
}

impl Error {
    /// Build a server-rejection error, falling back to a generic message when the payload had none
    pub fn server(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| m.trim().is_empty() == false)
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        Error::Server { status, message }
    }

    /// Whether this error happened before anything was sent to the server
    pub fn is_local(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::Unauthenticated)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;


/// A form field that does not pass local validation.
///
/// The messages are the ones displayed inline, under the form.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValidationError {
    // Task editor, in the order the checks are made
    #[error("Veuillez entrer un titre pour la tâche")]
    EmptyTitle,
    #[error("Le titre ne doit pas dépasser 16 caractères")]
    TitleTooLong,
    #[error("Veuillez entrer une description pour la tâche")]
    EmptyDescription,
    #[error("Veuillez sélectionner une catégorie")]
    NoCategory,
    #[error("Veuillez sélectionner une priorité")]
    NoPriority,
    #[error("Veuillez sélectionner un jour")]
    NoDate,

    #[error("Veuillez entrer un nom de catégorie")]
    EmptyCategoryName,

    // Account forms
    #[error("Veuillez remplir tous les champs de saisie")]
    MissingFields,
    #[error("Veuillez fournir un email valide")]
    InvalidEmail,
    #[error("Les 2 emails ne sont pas identiques")]
    EmailMismatch,
    #[error("Le mot de passe doit contenir au moins 8 caractères, une majuscule, une minuscule et un chiffre.")]
    WeakPassword,
    #[error("Les deux mots de passe ne sont pas identiques")]
    PasswordMismatch,
}
