// =============================================================================
// TribeLink Backend Constants
// =============================================================================
// This file contains all constants used throughout the backend to enable
// easy tuning and configuration from a single location.

// =============================================================================
// EPHEMERAL CODE CACHE
// =============================================================================

/// Cache namespace for connect QR codes, keyed by the owner's user id
pub const QR_CODE_CACHE_NAMESPACE: &str = "ConnectQRCodeString";

/// Cache namespace for SMS challenge codes, keyed by phone number
pub const SMS_CHALLENGE_CACHE_NAMESPACE: &str = "SMSChallengeCodesByPhoneNumber";

/// How long a generated QR code stays valid
pub const QR_CODE_TTL_SECONDS: u64 = 600;

/// How long an SMS challenge code stays valid
pub const SMS_CHALLENGE_TTL_SECONDS: u64 = 300;

/// Random bytes per QR code (hex-encoded, so the code is twice this length)
pub const QR_CODE_RANDOM_BYTES: usize = 12;

/// Number of digits in an SMS challenge code
pub const SMS_CHALLENGE_CODE_DIGITS: u32 = 6;

// =============================================================================
// PUSH MESSAGING
// =============================================================================

/// Logical destination for connect-protocol notices to a specific user
pub const CONNECT_QUEUE_DESTINATION: &str = "/connect/user/queue/specific-user";

/// Maximum undelivered messages retained per recipient; oldest are dropped
pub const DISPATCH_MAILBOX_CAPACITY: usize = 64;

// =============================================================================
// PROTOCOL MESSAGE TEXTS
// =============================================================================

pub const MSG_INVALID_QR_CODE: &str = "Invalid QR code; failed to connect.";
pub const MSG_CONFIRMATION_REQUEST: &str = "Please confirm that you wish to connect.";
pub const MSG_CONNECTION_SAVED: &str = "Successfully saved connection!";
pub const MSG_CONNECTION_SAVE_FAILED: &str = "Failed to save connection to database.";
pub const MSG_CONNECTION_DENIED: &str = "Connection request denied.";

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Default server port if not specified in environment
pub const DEFAULT_SERVER_PORT: u16 = 3000;
