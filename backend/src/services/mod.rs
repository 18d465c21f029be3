pub mod cache;
pub mod connect;
pub mod dispatch;
pub mod guard;
pub mod qrcode;
pub mod sms;

#[cfg(test)]
pub mod testing;

pub use cache::{CodeCache, InMemoryCodeCache};
pub use connect::ConnectService;
pub use dispatch::{DispatchedMessage, MessageDispatcher, QueueDispatcher};
pub use guard::ConnectionGuard;
pub use qrcode::QrCodeService;
pub use sms::{HttpSmsSender, SmsChallengeService, SmsError, SmsSender};
