use crate::config::Config;
use crate::{model::role::Role, models::Claims};
use actix_web::{FromRequest, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::decode;
use jsonwebtoken::{DecodingKey, Validation};

/// Authenticated actor extracted from the bearer token. Handlers receive the
/// actor and role explicitly; nothing reads authorization out of ambient
/// state.
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(data.claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            username: data.claims.sub,
            role,
        }))
    }
}

impl AuthUser {
    pub fn require_administrator(&self) -> actix_web::Result<()> {
        if self.role == Role::Administrator {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Administrator only"))
        }
    }

    pub fn require_warehouse(&self) -> actix_web::Result<()> {
        if self.role == Role::Warehouse {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("Warehouse only"))
        }
    }

    pub fn require_hr_admin(&self) -> actix_web::Result<()> {
        if self.role == Role::HrAdmin {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR admin only"))
        }
    }

    /// Authorization check for a specific lifecycle role, distinct from the
    /// state-machine guard: wrong role is 403, wrong status is a guard
    /// violation.
    pub fn require_role(&self, role: Role) -> actix_web::Result<()> {
        match role {
            Role::Administrator => self.require_administrator(),
            Role::Warehouse => self.require_warehouse(),
            Role::HrAdmin => self.require_hr_admin(),
        }
    }
}
