//! Sign-in and registration.
//!
//! [`login`] exchanges credentials for a [`Session`]; [`register`] sends a
//! [`RegistrationForm`] once its password confirmation matches.

use std::fmt;

use tracing::{info, instrument, warn};
use uuid::Uuid;
use zeroize::Zeroize;

use crate::{
    api::{LoginRequest, RegisterRequest, RentalApi},
    audit::{AuditEvent, AuditEventType, audit_log},
    error::{RentalError, Result},
    models::{Role, RoleId, User},
    session::{AuthToken, Credentials, Session},
    transport::Transport,
};

/// Shown when the server rejects a login without saying why.
pub const LOGIN_FAILED_MESSAGE: &str = "Credenciales inválidas";

/// Shown when the password and its confirmation differ.
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Las contraseñas no coinciden";

/// Shown when a registration field is blank.
pub const REGISTRATION_INCOMPLETE_MESSAGE: &str = "Por favor, completa todos los campos.";

/// Signs in and returns the authenticated session.
///
/// The user id is taken from the response; when the response embeds the user
/// record, name, email and role are kept as well.
///
/// # Errors
///
/// - [`RentalError::Api`] for rejected credentials, carrying the server's
///   message or [`LOGIN_FAILED_MESSAGE`]
/// - [`RentalError::InvalidResponse`] if the response has no user id
/// - any other request error
#[instrument(skip(api, email, password), fields(email = %crate::audit::redact_email(email)))]
pub async fn login<T: Transport>(
    api: &RentalApi<T>,
    email: &str,
    password: &str,
) -> Result<Session> {
    let request = LoginRequest { email: email.trim().to_owned(), password: password.to_owned() };
    let request_id = Uuid::new_v4();

    let response = match api.login(&request).await {
        Ok(response) => response,
        Err(e) => {
            let e = match e {
                RentalError::Api { status, message: None } => {
                    RentalError::Api { status, message: Some(LOGIN_FAILED_MESSAGE.to_owned()) }
                }
                other => other,
            };
            warn!(error = %e, "login rejected");
            audit_log(
                &AuditEvent::new(AuditEventType::LoginFailed, request_id)
                    .with_email(&request.email)
                    .with_error(e.to_string()),
            );
            return Err(e);
        }
    };

    let Some(user_id) = response.user_id() else {
        return Err(RentalError::InvalidResponse("login response carries no user id".into()));
    };
    let token = AuthToken::new(response.token.clone());
    let credentials = match &response.user {
        Some(user) => Credentials::from_user(token, user),
        None => Credentials::new(token, user_id),
    };

    audit_log(
        &AuditEvent::new(AuditEventType::LoginSucceeded, request_id)
            .with_user(user_id)
            .with_email(&request.email),
    );
    info!(user = %user_id, "signed in");
    Ok(Session::Authenticated(credentials))
}

/// Roles offered on the registration form.
///
/// # Errors
///
/// Returns any request error.
pub async fn roles<T: Transport>(api: &RentalApi<T>) -> Result<Vec<Role>> {
    api.list_roles().await
}

/// Profile of the signed-in user.
///
/// # Errors
///
/// Returns [`RentalError::Unauthenticated`] without a session, or any request
/// error.
pub async fn profile<T: Transport>(api: &RentalApi<T>, session: &Session) -> Result<User> {
    let user_id = session.require()?.user_id();
    api.get_user(session, user_id).await
}

/// Sign-up form as entered.
///
/// Passwords are zeroized on drop and never printed by `Debug`.
///
/// # Examples
///
/// ```
/// use rental_client::{auth::RegistrationForm, models::RoleId};
///
/// let mut form = RegistrationForm {
///     nombres: "Ana López".into(),
///     email: "ana@example.com".into(),
///     telefono: "7777-0000".into(),
///     dui: "01234567-8".into(),
///     id_rol: Some(RoleId::new(2)),
///     password: "secreto".into(),
///     confirm_password: "secreto".into(),
/// };
/// assert!(form.validate().is_ok());
///
/// form.confirm_password = "otro".into();
/// assert!(form.validate().is_err());
/// ```
#[derive(Clone, Default)]
pub struct RegistrationForm {
    /// Full name.
    pub nombres: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub telefono: String,
    /// Identity document number.
    pub dui: String,
    /// Selected role.
    pub id_rol: Option<RoleId>,
    /// Password.
    pub password: String,
    /// Password typed again.
    pub confirm_password: String,
}

impl RegistrationForm {
    /// Checks the confirmation, then that every field is filled in.
    ///
    /// # Errors
    ///
    /// Returns [`RentalError::Validation`] with
    /// [`PASSWORD_MISMATCH_MESSAGE`] or [`REGISTRATION_INCOMPLETE_MESSAGE`].
    pub fn validate(&self) -> Result<()> {
        if self.password != self.confirm_password {
            return Err(RentalError::Validation(PASSWORD_MISMATCH_MESSAGE.to_owned()));
        }
        let fields = [&self.nombres, &self.email, &self.telefono, &self.dui, &self.password];
        if fields.iter().any(|f| f.trim().is_empty()) || self.id_rol.is_none() {
            return Err(RentalError::Validation(REGISTRATION_INCOMPLETE_MESSAGE.to_owned()));
        }
        Ok(())
    }

    /// Validated request body.
    ///
    /// # Errors
    ///
    /// Returns the [`validate`](Self::validate) error.
    pub fn request(&self) -> Result<RegisterRequest> {
        self.validate()?;
        let id_rol = self
            .id_rol
            .ok_or_else(|| RentalError::Validation(REGISTRATION_INCOMPLETE_MESSAGE.to_owned()))?;
        Ok(RegisterRequest {
            nombres: self.nombres.trim().to_owned(),
            email: self.email.trim().to_owned(),
            telefono: self.telefono.trim().to_owned(),
            dui: self.dui.trim().to_owned(),
            id_rol,
            password: self.password.clone(),
        })
    }
}

impl fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("nombres", &self.nombres)
            .field("email", &self.email)
            .field("id_rol", &self.id_rol)
            .finish_non_exhaustive()
    }
}

impl Drop for RegistrationForm {
    fn drop(&mut self) {
        self.password.zeroize();
        self.confirm_password.zeroize();
    }
}

/// Creates an account. The user signs in separately afterwards.
///
/// # Errors
///
/// Returns the form's validation error without sending, or any request
/// error.
#[instrument(skip(api, form), fields(email = %crate::audit::redact_email(&form.email)))]
pub async fn register<T: Transport>(api: &RentalApi<T>, form: &RegistrationForm) -> Result<()> {
    let request = form.request()?;
    api.register(&request).await?;
    info!("account registered");
    Ok(())
}
