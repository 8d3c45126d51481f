pub mod component;
pub mod notification;
pub mod repair_request;
pub mod user;

pub use self::{
    component::Component, notification::Notification,
    repair_request::RepairRequest, user::User,
};
