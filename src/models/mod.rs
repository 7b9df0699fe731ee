pub mod booking;
pub mod exhibit;
pub mod museum;
pub mod ticket;
pub mod user;
pub mod visitor;

pub use booking::{Booking, BookingSummary};
pub use exhibit::Exhibit;
pub use museum::Museum;
pub use ticket::Ticket;
pub use user::User;
pub use visitor::Visitor;
