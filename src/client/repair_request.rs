use time::OffsetDateTime;

use crate::{
    api::{
        repair_request::{Id, New, Status},
        user::Role,
        RepairRequest,
    },
    lifecycle::{self, Inventory, Personalization, Step},
};

use super::{Call, Client, Error};

impl Client {
    /// Submits a new repair request on behalf of the signed-in customer.
    pub async fn create_repair_request(
        &self,
        new: &New,
    ) -> Result<RepairRequest, Error> {
        let user = self.signed_in().await?;
        lifecycle::ensure_role(&user, Role::User)?;
        self.send(Call::post("/repair-requests").json(new)?).await
    }

    /// Requests owned by the signed-in customer.
    pub async fn my_repair_requests(
        &self,
    ) -> Result<Vec<RepairRequest>, Error> {
        self.send(Call::get("/repair-requests/me")).await
    }

    /// All requests, optionally only those in `status`.
    pub async fn repair_requests(
        &self,
        status: Option<Status>,
    ) -> Result<Vec<RepairRequest>, Error> {
        let mut call = Call::get("/repair-requests");
        if let Some(status) = status {
            call = call.query("status", status);
        }
        self.send(call).await
    }

    /// Requests assigned to the signed-in technician.
    pub async fn assigned_repair_requests(
        &self,
    ) -> Result<Vec<RepairRequest>, Error> {
        self.send(Call::get("/repair-requests/master")).await
    }

    /// Fetches the current state of one request.
    ///
    /// Customers may only read their own requests, so for them the request
    /// is looked up in their own list.
    pub async fn repair_request(&self, id: Id) -> Result<RepairRequest, Error> {
        let user = self.signed_in().await?;
        if user.role != Role::User {
            return self.send(Call::get(format!("/repair-requests/{id}"))).await;
        }
        self.my_repair_requests()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::NotFound(format!("repair request {id}")))
    }

    /// Manager marks a created request as triaged.
    pub async fn check(
        &self,
        request: &RepairRequest,
    ) -> Result<RepairRequest, Error> {
        self.advance(request, Step::Check, None).await
    }

    /// Manager turns a created or checked request down.
    pub async fn reject(
        &self,
        request: &RepairRequest,
    ) -> Result<RepairRequest, Error> {
        self.advance(request, Step::Reject, None).await
    }

    /// Technician prices and schedules a checked request, taking it over.
    ///
    /// Component quantities are checked against `inventory`, which should be
    /// the latest snapshot fetched with [`Client::inventory`].
    pub async fn personalize(
        &self,
        request: &RepairRequest,
        personalization: Personalization,
        inventory: &Inventory,
    ) -> Result<RepairRequest, Error> {
        self.advance(
            request,
            Step::Personalize(personalization),
            Some(inventory),
        )
        .await
    }

    /// Owner accepts the price and date, work begins.
    pub async fn start(
        &self,
        request: &RepairRequest,
    ) -> Result<RepairRequest, Error> {
        self.advance(request, Step::Start, None).await
    }

    /// Assigned technician finishes the work.
    pub async fn complete(
        &self,
        request: &RepairRequest,
    ) -> Result<RepairRequest, Error> {
        self.advance(request, Step::Complete, None).await
    }

    /// Moves `request` along the lifecycle.
    ///
    /// `request` is the caller's snapshot: the move is refused with
    /// [`Error::StatusChanged`] if the ticket is no longer in the status the
    /// snapshot shows. Allocations of a personalization are checked against
    /// `inventory` once the lifecycle guard has passed.
    async fn advance(
        &self,
        request: &RepairRequest,
        step: Step,
        inventory: Option<&Inventory>,
    ) -> Result<RepairRequest, Error> {
        let actor = self.signed_in().await?;
        let transition = lifecycle::validate(
            request,
            &step,
            &actor,
            OffsetDateTime::now_utc(),
        )?;
        let target = transition.target();

        if let (Step::Personalize(p), Some(inventory)) = (&step, inventory) {
            inventory.check(&p.components)?;
        }

        let current = self.repair_request(request.id).await?;
        if current.status != request.status {
            return Err(Error::StatusChanged {
                id: request.id,
                expected: request.status,
                actual: current.status,
            });
        }

        tracing::info!(
            id = %request.id,
            from = %request.status,
            to = %target,
            actor = %actor.id,
            "advancing repair request"
        );
        let updated: RepairRequest =
            self.send(endpoint(request.id, &step)?).await?;
        if updated.status != target {
            return Err(Error::StatusChanged {
                id: request.id,
                expected: target,
                actual: updated.status,
            });
        }
        Ok(updated)
    }
}

fn endpoint(id: Id, step: &Step) -> Result<Call, Error> {
    let base = format!("/repair-requests/{id}");
    Ok(match step {
        Step::Check => Call::post(format!("{base}/as-checked")),
        Step::Reject => Call::post(format!("{base}/as-rejected")),
        Step::Personalize(p) => {
            Call::patch(format!("{base}/personalize-order")).json(p)?
        }
        Step::Start => Call::post(format!("{base}/as-in-progress")),
        Step::Complete => Call::patch(format!("{base}/as-completed")),
    })
}
