use crate::api::{
    notification::{Id, New},
    Notification,
};

use super::{Call, Client, Error};

impl Client {
    pub async fn notifications(&self) -> Result<Vec<Notification>, Error> {
        self.send(Call::get("/notifications")).await
    }

    pub async fn mark_notifications_read(
        &self,
        ids: &[Id],
    ) -> Result<(), Error> {
        self.send_unit(Call::post("/notifications/as-read").json(ids)?)
            .await
    }

    /// Sends a notification from the signed-in user.
    pub async fn send_notification(
        &self,
        new: &New,
    ) -> Result<Notification, Error> {
        self.send(Call::post("/notifications").json(new)?).await
    }
}
