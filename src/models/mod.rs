pub mod booking;
pub mod payment;
pub mod results;
pub mod service;
pub mod user;

pub use booking::{Booking, BookingFilter, BookingUpdate, DeliveryStatus, NewBooking, PaymentStatus, RawPrice};
pub use payment::Payment;
pub use results::{DeleteResult, InsertResult, UpdateResult};
pub use service::{NewService, Service, ServiceUpdate};
pub use user::{Role, User, UserStatus};
