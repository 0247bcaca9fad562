//! The room error taxonomy.

use parlor_channel::ErrorInfo;

use crate::RoomFeature;

/// Stable numeric codes for room lifecycle errors.
///
/// Attachment and detachment failures get one code per feature so that a
/// caller can tell which feature broke the room without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    MessagesAttachmentFailed = 102_001,
    PresenceAttachmentFailed = 102_002,
    ReactionsAttachmentFailed = 102_003,
    OccupancyAttachmentFailed = 102_004,
    TypingAttachmentFailed = 102_005,

    MessagesDetachmentFailed = 102_051,
    PresenceDetachmentFailed = 102_052,
    ReactionsDetachmentFailed = 102_053,
    OccupancyDetachmentFailed = 102_054,
    TypingDetachmentFailed = 102_055,

    RoomInFailedState = 102_101,
    RoomIsReleasing = 102_102,
    RoomIsReleased = 102_103,

    InconsistentPrecondition = 102_199,
}

impl ErrorCode {
    /// The HTTP-like status code reported alongside this error code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::RoomInFailedState | Self::RoomIsReleasing | Self::RoomIsReleased => 400,
            _ => 500,
        }
    }
}

/// Errors surfaced by room lifecycle operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RoomError {
    /// The room is in the process of releasing; no further lifecycle
    /// operations are accepted.
    #[error("cannot perform operation; room is releasing")]
    RoomIsReleasing,

    /// The room has been released. The manager is permanently retired.
    #[error("cannot perform operation; room is released")]
    RoomIsReleased,

    /// The room is in the failed state and must not be detached.
    #[error("cannot perform operation; room is in a failed state")]
    RoomInFailedState,

    /// A contributor's channel failed to attach.
    #[error("the {feature} feature failed to attach")]
    AttachmentFailed {
        /// The feature whose channel failed.
        feature: RoomFeature,
        /// The channel's underlying error.
        #[source]
        cause: ErrorInfo,
    },

    /// A contributor's channel failed to detach and entered the failed
    /// state.
    #[error("the {feature} feature failed to detach")]
    DetachmentFailed {
        /// The feature whose channel failed.
        feature: RoomFeature,
        /// The channel's recorded error reason.
        #[source]
        cause: ErrorInfo,
    },

    /// A collaborator broke its contract (for example, a contributor
    /// reported failure while still in an in-progress state). Fatal: this
    /// variant is only ever surfaced as a panic message, never returned.
    #[error("inconsistent precondition: {0}")]
    InconsistentPrecondition(String),
}

impl RoomError {
    /// The stable numeric code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::RoomIsReleasing => ErrorCode::RoomIsReleasing,
            Self::RoomIsReleased => ErrorCode::RoomIsReleased,
            Self::RoomInFailedState => ErrorCode::RoomInFailedState,
            Self::InconsistentPrecondition(_) => ErrorCode::InconsistentPrecondition,
            Self::AttachmentFailed { feature, .. } => match feature {
                RoomFeature::Messages => ErrorCode::MessagesAttachmentFailed,
                RoomFeature::Presence => ErrorCode::PresenceAttachmentFailed,
                RoomFeature::Reactions => ErrorCode::ReactionsAttachmentFailed,
                RoomFeature::Occupancy => ErrorCode::OccupancyAttachmentFailed,
                RoomFeature::Typing => ErrorCode::TypingAttachmentFailed,
            },
            Self::DetachmentFailed { feature, .. } => match feature {
                RoomFeature::Messages => ErrorCode::MessagesDetachmentFailed,
                RoomFeature::Presence => ErrorCode::PresenceDetachmentFailed,
                RoomFeature::Reactions => ErrorCode::ReactionsDetachmentFailed,
                RoomFeature::Occupancy => ErrorCode::OccupancyDetachmentFailed,
                RoomFeature::Typing => ErrorCode::TypingDetachmentFailed,
            },
        }
    }

    /// The HTTP-like status code for this error.
    pub fn status_code(&self) -> u16 {
        self.code().status_code()
    }

    /// The contributor error underlying this one, if any.
    pub fn cause(&self) -> Option<&ErrorInfo> {
        match self {
            Self::AttachmentFailed { cause, .. } | Self::DetachmentFailed { cause, .. } => {
                Some(cause)
            }
            _ => None,
        }
    }
}

/// Conversion to the channel layer's wire-shaped error, preserving the
/// cause chain.
impl From<RoomError> for ErrorInfo {
    fn from(error: RoomError) -> Self {
        let mut info = ErrorInfo::new(
            error.code() as u32,
            error.status_code(),
            error.to_string(),
        );
        if let Some(cause) = error.cause() {
            info = info.with_cause(cause.clone());
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cause() -> ErrorInfo {
        ErrorInfo::new(80_000, 500, "connection refused")
    }

    #[test]
    fn test_attachment_codes_are_distinct_per_feature() {
        let features = [
            RoomFeature::Messages,
            RoomFeature::Presence,
            RoomFeature::Reactions,
            RoomFeature::Occupancy,
            RoomFeature::Typing,
        ];

        let mut codes: Vec<u32> = features
            .iter()
            .map(|feature| {
                RoomError::AttachmentFailed {
                    feature: *feature,
                    cause: cause(),
                }
                .code() as u32
            })
            .chain(features.iter().map(|feature| {
                RoomError::DetachmentFailed {
                    feature: *feature,
                    cause: cause(),
                }
                .code() as u32
            }))
            .collect();

        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 10);
    }

    #[test]
    fn test_fail_fast_errors_are_caller_mistakes() {
        assert_eq!(RoomError::RoomIsReleasing.status_code(), 400);
        assert_eq!(RoomError::RoomIsReleased.status_code(), 400);
        assert_eq!(RoomError::RoomInFailedState.status_code(), 400);
    }

    #[test]
    fn test_conversion_to_error_info_preserves_cause() {
        let error = RoomError::AttachmentFailed {
            feature: RoomFeature::Typing,
            cause: cause(),
        };

        let info: ErrorInfo = error.into();
        assert_eq!(info.code, ErrorCode::TypingAttachmentFailed as u32);
        assert_eq!(info.status_code, 500);
        assert_eq!(info.cause(), Some(&cause()));
    }

    #[test]
    fn test_source_exposes_contributor_error() {
        let error = RoomError::DetachmentFailed {
            feature: RoomFeature::Presence,
            cause: cause(),
        };
        assert!(std::error::Error::source(&error).is_some());
        assert!(std::error::Error::source(&RoomError::RoomIsReleased).is_none());
    }
}
