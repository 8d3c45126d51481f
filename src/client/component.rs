use crate::{
    api::{
        component::{Id, New, Update},
        Component,
    },
    lifecycle::Inventory,
};

use super::{Call, Client, Error};

impl Client {
    /// Fetches a fresh inventory snapshot.
    pub async fn inventory(&self) -> Result<Inventory, Error> {
        let components: Vec<Component> =
            self.send(Call::get("/components")).await?;
        Ok(Inventory::new(components))
    }

    pub async fn create_component(
        &self,
        new: &New,
    ) -> Result<Component, Error> {
        self.send(Call::post("/components").json(new)?).await
    }

    pub async fn update_component(
        &self,
        id: Id,
        update: &Update,
    ) -> Result<Component, Error> {
        self.send(Call::patch(format!("/components/{id}")).json(update)?)
            .await
    }
}
