//! Repair-request lifecycle.
//!
//! The lifecycle is a finite state machine over [`Status`]. Every legal
//! move is a row of [`TABLE`]; anything else is an invalid transition.
//! [`validate`] is the single guard every caller goes through before a
//! transition is submitted, and [`apply`] is its mutating counterpart for
//! local models of a ticket.

pub mod stock;

use derive_more::Display;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api::{component, repair_request, user::Role, RepairRequest, User};

pub use self::stock::Inventory;

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Submitted by the owner, nobody looked at it yet.
    #[display("created")]
    Created,

    /// Triaged by a manager and visible to technicians.
    #[display("checked")]
    Checked,

    /// Priced and scheduled by a technician, waiting for the owner to
    /// accept the offer.
    #[display("approved")]
    Approved,

    /// Owner accepted the offer, work is ongoing.
    #[display("in_progress")]
    InProgress,

    /// Work is finished.
    #[display("completed")]
    Completed,

    /// Turned down by a manager.
    #[display("rejected")]
    Rejected,
}

impl Status {
    pub const ALL: [Self; 6] = [
        Self::Created,
        Self::Checked,
        Self::Approved,
        Self::InProgress,
        Self::Completed,
        Self::Rejected,
    ];

    /// Statuses reachable from this one in a single transition.
    pub fn next(self) -> impl Iterator<Item = Self> {
        TABLE
            .iter()
            .filter(move |(from, _, _)| *from == self)
            .map(|(_, to, _)| *to)
    }

    pub fn is_terminal(self) -> bool {
        self.next().next().is_none()
    }
}

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    #[display("check")]
    Check,
    #[display("reject")]
    Reject,
    #[display("personalize")]
    Personalize,
    #[display("start")]
    Start,
    #[display("complete")]
    Complete,
}

impl Transition {
    pub fn target(self) -> Status {
        match self {
            Self::Check => Status::Checked,
            Self::Reject => Status::Rejected,
            Self::Personalize => Status::Approved,
            Self::Start => Status::InProgress,
            Self::Complete => Status::Completed,
        }
    }

    /// Who is allowed to trigger the transition.
    pub fn actor(self) -> Actor {
        match self {
            Self::Check | Self::Reject => Actor::Manager,
            Self::Personalize | Self::Complete => Actor::Master,
            Self::Start => Actor::Owner,
        }
    }
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Actor {
    #[display("manager")]
    Manager,
    #[display("master")]
    Master,
    #[display("owner")]
    Owner,
}

/// Every legal `(from, to)` move of a repair request.
pub static TABLE: [(Status, Status, Transition); 6] = [
    (Status::Created, Status::Checked, Transition::Check),
    (Status::Created, Status::Rejected, Transition::Reject),
    (Status::Checked, Status::Rejected, Transition::Reject),
    (Status::Checked, Status::Approved, Transition::Personalize),
    (Status::Approved, Status::InProgress, Transition::Start),
    (Status::InProgress, Status::Completed, Transition::Complete),
];

/// Looks up the transition moving a request from `from` to `to`.
pub fn transition(from: Status, to: Status) -> Result<Transition, Error> {
    TABLE
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, transition)| *transition)
        .ok_or(Error::InvalidTransition { from, to })
}

/// Price, due date and consumed components attached to a checked request.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Personalization {
    pub price: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub end_date: OffsetDateTime,
    #[serde(default)]
    pub components: Vec<component::Allocation>,
}

impl Personalization {
    pub fn validate(&self, now: OffsetDateTime) -> Result<(), Error> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(Error::InvalidPrice(self.price));
        }
        if self.end_date <= now {
            return Err(Error::EndDateNotInFuture(self.end_date));
        }
        if let Some(a) = self.components.iter().find(|a| a.quantity == 0) {
            return Err(Error::ZeroQuantity(a.id));
        }
        Ok(())
    }
}

/// Transition together with the input it carries.
#[derive(Clone, Debug, PartialEq)]
pub enum Step {
    Check,
    Reject,
    Personalize(Personalization),
    Start,
    Complete,
}

impl Step {
    pub fn transition(&self) -> Transition {
        match self {
            Self::Check => Transition::Check,
            Self::Reject => Transition::Reject,
            Self::Personalize(_) => Transition::Personalize,
            Self::Start => Transition::Start,
            Self::Complete => Transition::Complete,
        }
    }
}

/// Checks that `actor` may perform `step` on `request` as it is now.
///
/// Nothing is mutated. Stock availability is not part of this guard, see
/// [`Inventory::check`].
pub fn validate(
    request: &RepairRequest,
    step: &Step,
    actor: &User,
    now: OffsetDateTime,
) -> Result<Transition, Error> {
    let wanted = step.transition();
    transition(request.status, wanted.target())?;

    authorize(request, wanted, actor)?;

    match step {
        Step::Check | Step::Reject | Step::Complete => {}
        Step::Personalize(personalization) => personalization.validate(now)?,
        Step::Start => {
            if request.master.is_none() {
                return Err(Error::MasterNotAssigned(request.id));
            }
            if request.price.is_none() {
                return Err(Error::MissingPrice(request.id));
            }
            if request.end_time.is_none() {
                return Err(Error::MissingEndTime(request.id));
            }
        }
    }

    Ok(wanted)
}

/// Validates and performs `step` on a local copy of a request.
///
/// On failure `request` is left untouched.
pub fn apply(
    request: &mut RepairRequest,
    step: Step,
    actor: &User,
    now: OffsetDateTime,
) -> Result<(), Error> {
    let transition = validate(request, &step, actor, now)?;

    if let Step::Personalize(p) = step {
        request.master = Some(actor.clone());
        request.price = Some(p.price);
        request.end_time = Some(p.end_date);
        request.components = p.components;
    }
    request.status = transition.target();

    Ok(())
}

/// Fails unless `user` holds `role`.
pub fn ensure_role(user: &User, role: Role) -> Result<(), Error> {
    if user.role == role {
        Ok(())
    } else {
        Err(Error::WrongRole {
            expected: role,
            actual: user.role,
        })
    }
}

fn authorize(
    request: &RepairRequest,
    transition: Transition,
    actor: &User,
) -> Result<(), Error> {
    match transition.actor() {
        Actor::Manager => ensure_role(actor, Role::Manager),
        Actor::Master => {
            ensure_role(actor, Role::Master)?;
            if transition != Transition::Complete {
                return Ok(());
            }
            match &request.master {
                None => Err(Error::MasterNotAssigned(request.id)),
                Some(master) if master.id != actor.id => {
                    Err(Error::NotAssignedMaster(request.id))
                }
                Some(_) => Ok(()),
            }
        }
        Actor::Owner => {
            if request.owner.id == actor.id {
                Ok(())
            } else {
                Err(Error::NotOwner(request.id))
            }
        }
    }
}

#[derive(Clone, Debug, Display, PartialEq)]
pub enum Error {
    #[display("cannot move a repair request from {from} to {to}")]
    InvalidTransition { from: Status, to: Status },

    #[display(
        "this action requires the {expected} role, signed in as {actual}"
    )]
    WrongRole { expected: Role, actual: Role },

    #[display("only the owner of repair request {_0} can accept its offer")]
    NotOwner(repair_request::Id),

    #[display("repair request {_0} is assigned to another technician")]
    NotAssignedMaster(repair_request::Id),

    #[display("repair request {_0} has no assigned technician")]
    MasterNotAssigned(repair_request::Id),

    #[display("repair request {_0} has no price")]
    MissingPrice(repair_request::Id),

    #[display("repair request {_0} has no completion date")]
    MissingEndTime(repair_request::Id),

    #[display("price must be a positive amount, got {_0}")]
    InvalidPrice(f64),

    #[display("completion date {_0} is not in the future")]
    EndDateNotInFuture(OffsetDateTime),

    #[display("quantity of component {_0} must be at least 1")]
    ZeroQuantity(component::Id),

    #[display("component {_0} is not in the inventory")]
    UnknownComponent(component::Id),

    #[display(
        "not enough {name} (component {id}) in stock: \
         requested {requested}, available {in_stock}"
    )]
    InsufficientStock {
        id: component::Id,
        name: String,
        requested: u32,
        in_stock: u32,
    },
}

impl std::error::Error for Error {}
