//! # Repository Layer
//!
//! Repositories encapsulate SeaORM operations per aggregate. Multi-step
//! mutations run inside transactions; notification fan-out happens after
//! commit and is best-effort.

pub mod admin_request;
pub mod comment;
pub mod issue;
pub mod notification;
pub mod stats;
pub mod team;
pub mod user;

pub use admin_request::AdminRequestRepository;
pub use comment::CommentRepository;
pub use issue::IssueRepository;
pub use notification::NotificationRepository;
pub use team::TeamRepository;
pub use user::UserRepository;
