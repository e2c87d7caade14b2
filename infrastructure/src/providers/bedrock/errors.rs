//! SDK error mapping onto the application's gateway errors.
//!
//! Classification goes by the service error code, so both operations share
//! one table of transient codes.

use aws_sdk_bedrockruntime::error::{ProvideErrorMetadata, SdkError};
use aws_smithy_types::error::display::DisplayErrorContext;
use rewriter_application::{GatewayError, ValidationError};
use std::error::Error as StdError;

/// How a failed call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ErrorClass {
    Throttled,
    Unavailable,
    Timeout,
    NotAvailable,
    Fatal,
}

pub(super) fn classify_code(code: Option<&str>) -> ErrorClass {
    match code {
        Some("ThrottlingException" | "TooManyRequestsException" | "ServiceQuotaExceededException") => {
            ErrorClass::Throttled
        }
        Some("ServiceUnavailableException" | "InternalServerException") => ErrorClass::Unavailable,
        Some("RequestTimeout" | "ModelTimeoutException") => ErrorClass::Timeout,
        Some("ModelNotReadyException" | "ResourceNotFoundException" | "AccessDeniedException") => {
            ErrorClass::NotAvailable
        }
        _ => ErrorClass::Fatal,
    }
}

/// Class and message for any SDK failure. Transport-level failures count
/// as unavailable so they are retried.
fn describe<E, R>(err: &SdkError<E, R>) -> (ErrorClass, String)
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: std::fmt::Debug,
{
    let message = DisplayErrorContext(err).to_string();
    let class = match err {
        SdkError::ServiceError(service_err) => classify_code(service_err.err().code()),
        SdkError::TimeoutError(_) => ErrorClass::Timeout,
        SdkError::DispatchFailure(_) => ErrorClass::Unavailable,
        _ => ErrorClass::Fatal,
    };
    (class, message)
}

pub(super) fn gateway_error<E, R>(err: &SdkError<E, R>) -> GatewayError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: std::fmt::Debug,
{
    let (class, message) = describe(err);
    to_gateway_error(class, message)
}

pub(super) fn validation_error<E, R>(err: &SdkError<E, R>) -> ValidationError
where
    E: ProvideErrorMetadata + StdError + 'static,
    R: std::fmt::Debug,
{
    let (class, message) = describe(err);
    to_validation_error(class, message)
}

fn to_gateway_error(class: ErrorClass, message: String) -> GatewayError {
    match class {
        ErrorClass::Throttled => GatewayError::Throttled(message),
        ErrorClass::Unavailable => GatewayError::ConnectionError(message),
        ErrorClass::Timeout => GatewayError::Timeout,
        ErrorClass::NotAvailable => GatewayError::ModelNotAvailable(message),
        ErrorClass::Fatal => GatewayError::RequestFailed(message),
    }
}

fn to_validation_error(class: ErrorClass, message: String) -> ValidationError {
    match class {
        ErrorClass::Throttled => ValidationError::Throttled(message),
        ErrorClass::Unavailable => ValidationError::Unavailable(message),
        ErrorClass::Timeout => ValidationError::Timeout,
        ErrorClass::NotAvailable | ErrorClass::Fatal => ValidationError::RequestFailed(message),
    }
}
