/// Error record written into the output buffer for positive statuses.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(string, tag = "1")]
    pub details: ::prost::alloc::string::String,
}

/// Status codes returned by every boundary call.
///
/// Zero is success, negatives are low-level decode failures with no
/// payload, positives are structured failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum CallStatus {
    Ok = 0,
    DecodeError = -1,
    InvalidArguments = 1,
    InvalidArgumentsDetails = 2,
    UnknownEnumValue = 3,
    EmptyParams = 4,
    InternalError = 5,
}

impl CallStatus {
    /// Name as it appears in the `.proto` definition.
    pub fn as_str_name(&self) -> &'static str {
        match self {
            CallStatus::Ok => "OK",
            CallStatus::DecodeError => "DECODE_ERROR",
            CallStatus::InvalidArguments => "INVALID_ARGUMENTS",
            CallStatus::InvalidArgumentsDetails => "INVALID_ARGUMENTS_DETAILS",
            CallStatus::UnknownEnumValue => "UNKNOWN_ENUM_VALUE",
            CallStatus::EmptyParams => "EMPTY_PARAMS",
            CallStatus::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Raw wire value.
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }
}
