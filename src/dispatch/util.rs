use super::FleetError;
use crate::model::Window;

/// Prédicat de chevauchement à bornes incluses.
pub fn overlaps(a: &Window, b: &Window) -> bool {
    a.overlaps(b)
}

/// Rejette les fenêtres inversées ; l'instant (`start == end`) est accepté.
pub(super) fn ensure_window(window: &Window) -> Result<(), FleetError> {
    if window.end < window.start {
        return Err(FleetError::InvalidWindow("end must not be before start"));
    }
    Ok(())
}

/// Un trajet doit avoir une durée non nulle.
pub(super) fn ensure_trip_window(window: &Window) -> Result<(), FleetError> {
    ensure_window(window)?;
    if window.is_instant() {
        return Err(FleetError::InvalidWindow("trip end must be strictly after start"));
    }
    Ok(())
}
