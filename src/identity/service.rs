//! Login, registration, and administrative principal management.

use std::sync::Arc;

use tracing::info;

use super::directory::{NewAdmin, NewStaff, NewStudent, PrincipalDirectory};
use super::gate::AuthContext;
use super::password;
use super::policy::{self, Operation};
use super::principal::{Principal, PrincipalId, StaffRecord, StaffRole};
use super::resolver::{normalize_email, IdentityResolver};
use super::token::TokenService;
use super::IdentityError;

/// Successful authentication outcome: a signed session token plus the
/// resolved principal for response shaping.
#[derive(Debug)]
pub struct AuthSession {
    pub token: String,
    pub principal: Principal,
}

/// Public self-registration input. Registration is student-only; staff and
/// admin accounts are provisioned by an administrator.
#[derive(Debug, Clone)]
pub struct StudentRegistration {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
    pub location: Option<String>,
    pub degree: Option<String>,
}

/// Admin-provisioned staff account input.
#[derive(Debug, Clone)]
pub struct StaffInvitation {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password: String,
    pub mobile_no: Option<String>,
    pub role: StaffRole,
}

pub struct AuthService<D> {
    resolver: IdentityResolver<D>,
    tokens: Arc<TokenService>,
}

impl<D: PrincipalDirectory> AuthService<D> {
    pub fn new(directory: Arc<D>, tokens: Arc<TokenService>) -> Self {
        Self {
            resolver: IdentityResolver::new(directory),
            tokens,
        }
    }

    pub fn resolver(&self) -> &IdentityResolver<D> {
        &self.resolver
    }

    /// Resolve the email across all three stores and verify the credential.
    /// The error never reveals which step failed.
    pub fn login(&self, email: &str, secret: &str) -> Result<AuthSession, IdentityError> {
        let (principal, kind) = self
            .resolver
            .resolve(email)
            .ok_or(IdentityError::InvalidCredentials)?;

        if !password::verify(secret, principal.password_hash()) {
            return Err(IdentityError::InvalidCredentials);
        }
        if !principal.active() {
            return Err(IdentityError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&principal)
            .map_err(|_| IdentityError::TokenIssue)?;

        info!(principal = %principal.id(), %kind, "login succeeded");
        Ok(AuthSession { token, principal })
    }

    /// Create a student account and log it straight in.
    ///
    /// The availability check is advisory; the directory claims the email
    /// atomically at insert, so a concurrent duplicate still loses cleanly.
    pub fn register_student(
        &self,
        registration: StudentRegistration,
    ) -> Result<AuthSession, IdentityError> {
        let email = normalize_email(&registration.email);
        self.resolver.assert_email_available(&email)?;

        let password_hash = password::hash(&registration.password)?;
        let student = self.resolver.directory().insert_student(NewStudent {
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name,
            email,
            password_hash,
            mobile_no: registration.mobile_no,
            location: registration.location,
            degree: registration.degree,
        })?;

        info!(principal = %student.id, "student registered");

        let principal = Principal::Student(student);
        let token = self
            .tokens
            .issue(&principal)
            .map_err(|_| IdentityError::TokenIssue)?;

        Ok(AuthSession { token, principal })
    }

    /// Admin-only staff provisioning.
    pub fn create_staff(
        &self,
        actor: &AuthContext,
        invitation: StaffInvitation,
    ) -> Result<StaffRecord, IdentityError> {
        if !policy::allows(actor.role, Operation::ManagePrincipals) {
            return Err(IdentityError::Forbidden);
        }

        let email = normalize_email(&invitation.email);
        self.resolver.assert_email_available(&email)?;

        let password_hash = password::hash(&invitation.password)?;
        let staff = self.resolver.directory().insert_staff(NewStaff {
            first_name: invitation.first_name.trim().to_string(),
            last_name: invitation.last_name,
            email,
            password_hash,
            mobile_no: invitation.mobile_no,
            role: invitation.role,
        })?;

        info!(principal = %staff.id, role = %staff.role.as_role(), by = %actor.principal_id, "staff account created");
        Ok(staff)
    }

    /// Admin-only staff removal; releases the email for reuse.
    pub fn delete_staff(
        &self,
        actor: &AuthContext,
        staff_id: PrincipalId,
    ) -> Result<(), IdentityError> {
        if !policy::allows(actor.role, Operation::DeleteStaff) {
            return Err(IdentityError::Forbidden);
        }

        self.resolver.directory().delete_staff(staff_id)?;
        info!(principal = %staff_id, by = %actor.principal_id, "staff account deleted");
        Ok(())
    }

    /// Seed the default administrator on startup when configured. A no-op if
    /// the email already resolves.
    pub fn seed_admin(&self, email: &str, secret: &str) -> Result<(), IdentityError> {
        let email = normalize_email(email);
        if self.resolver.resolve(&email).is_some() {
            info!(%email, "admin seed skipped; principal already exists");
            return Ok(());
        }

        let password_hash = password::hash(secret)?;
        let admin = self.resolver.directory().insert_admin(NewAdmin {
            first_name: "Admin".to_string(),
            last_name: None,
            email: email.clone(),
            password_hash,
            mobile_no: None,
        })?;

        info!(principal = %admin.id, %email, "default admin seeded");
        Ok(())
    }
}
