use mercato_core::{DataType, MercatoError};

/// Terminal error for a request whose candidates were exhausted.
///
/// Rules:
/// - Nothing was attempted (every candidate disabled) -> `NoPlatform`.
/// - Otherwise -> `AllPlatformsFailed` carrying the attempt errors in call order.
pub fn collapse_errors(
    data_type: DataType,
    platforms_tried: &[String],
    errors: Vec<MercatoError>,
) -> MercatoError {
    if platforms_tried.is_empty() {
        return MercatoError::NoPlatform { data_type };
    }
    MercatoError::AllPlatformsFailed { data_type, errors }
}
