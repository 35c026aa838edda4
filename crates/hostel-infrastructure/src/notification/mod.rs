//! Delivery channels for student notifications

mod email;
mod sms;

pub use email::SmtpEmailSender;
pub use sms::HttpSmsSender;
