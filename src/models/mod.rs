//! # Data Models
//!
//! This module contains the SeaORM entity models for every table in the
//! ticketing schema, plus the string-backed enums shared between them.

pub mod account;
pub mod event;
pub mod event_admin;
pub mod participant;
pub mod payment;
pub mod ticket;
pub mod ticket_send_result;
pub mod ticket_setting;
pub mod ticket_usage;
pub mod ticket_user;
pub mod user;

pub use account::Entity as Account;
pub use event::Entity as Event;
pub use event::EventType;
pub use event_admin::Entity as EventAdmin;
pub use participant::Entity as Participant;
pub use payment::Entity as Payment;
pub use payment::PaymentStatus;
pub use ticket::Entity as Ticket;
pub use ticket_send_result::Entity as TicketSendResult;
pub use ticket_setting::Entity as TicketSetting;
pub use ticket_usage::Entity as TicketUsage;
pub use ticket_user::Entity as TicketUser;
pub use user::Entity as User;
