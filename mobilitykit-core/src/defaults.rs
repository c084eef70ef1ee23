//! Well-known service contracts of the enterprise-mobility ecosystem.
//!
//! These are wire-level constants shared with the peer applications; any
//! interoperating implementation must use them verbatim.

/// Capability name of the cross-application email composer service.
pub const SEND_EMAIL_SERVICE: &str = "com.good.gfeservice.send-email";

/// Contract version of the email composer service.
pub const SEND_EMAIL_VERSION: &str = "1.0.0.0";

/// Method of the email composer service.
pub const SEND_EMAIL_METHOD: &str = "sendEmail";

/// Application identifier of the well-known enterprise email client.
pub const EMAIL_PROVIDER_ID: &str = "com.good.gcs.g3";

/// Where the well-known email client can be installed from.
pub const EMAIL_PROVIDER_INSTALL_URL: &str =
    "https://apps.apple.com/us/app/blackberry-work/id890656632";

/// Capability name of the secure file-transfer service.
pub const TRANSFER_FILE_SERVICE: &str = "com.good.gdservice.transfer-file";

/// Contract version of the file-transfer service.
pub const TRANSFER_FILE_VERSION: &str = "1.0.0.0";

/// Method of the file-transfer service.
pub const TRANSFER_FILE_METHOD: &str = "transferFile";

/// Step-type key under which the email workflow step is registered.
pub const EMAIL_STEP_TYPE: &str = "io.mobileworkflow.bbd.email";
