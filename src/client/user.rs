use crate::{
    api::{
        user::{Id, Registration, Role},
        User,
    },
    lifecycle,
};

use super::{Call, Client, Error};

impl Client {
    /// Registered accounts, optionally only those holding `role`.
    pub async fn users(&self, role: Option<Role>) -> Result<Vec<User>, Error> {
        let mut call = Call::get("/users");
        if let Some(role) = role {
            call = call.query("role", role);
        }
        self.send(call).await
    }

    /// Manager opens an account for a customer or a technician.
    pub async fn create_user(
        &self,
        registration: &Registration,
    ) -> Result<(), Error> {
        let manager = self.signed_in().await?;
        lifecycle::ensure_role(&manager, Role::Manager)?;
        self.send_unit(Call::post("/users").json(registration)?).await
    }

    /// Manager changes the role of an account.
    pub async fn update_user_role(
        &self,
        id: Id,
        role: Role,
    ) -> Result<User, Error> {
        let manager = self.signed_in().await?;
        lifecycle::ensure_role(&manager, Role::Manager)?;
        self.send(Call::patch(format!("/users/{id}")).query("role", role))
            .await
    }
}
