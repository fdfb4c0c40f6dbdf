use super::config::ADC_SPAN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEdge {
    Rising,
    Falling,
}

impl TriggerEdge {
    pub fn from_invert(invert: bool) -> Self {
        if invert {
            TriggerEdge::Falling
        } else {
            TriggerEdge::Rising
        }
    }

    fn crosses(self, current: u16, next: u16, threshold: i32) -> bool {
        let (current, next) = (current as i32, next as i32);
        match self {
            TriggerEdge::Rising => current > threshold && next < threshold,
            TriggerEdge::Falling => current < threshold && next > threshold,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerSearch {
    /// First buffer index of the window to draw.
    pub index: usize,
    /// False when no crossing was found and `index` is the untriggered window start.
    pub found: bool,
}

/// Trigger level is given as distance from the top of the code range.
pub fn threshold_for(trigger_level: u16) -> i32 {
    ADC_SPAN as i32 - trigger_level as i32
}

/// Finds the newest crossing at or before the untriggered window start.
///
/// The scan walks backward from `len - visible_width` so a full window fits after
/// the crossing. When the window already covers the whole buffer there is no older
/// history, so the scan starts at the newest complete pair instead.
pub fn find_trigger_index(
    buffer: &[u16],
    visible_width: usize,
    trigger_level: u16,
    invert: bool,
) -> TriggerSearch {
    let fallback = buffer.len().saturating_sub(visible_width);
    let untriggered = TriggerSearch {
        index: fallback,
        found: false,
    };
    if buffer.len() < 2 {
        return untriggered;
    }
    let last_pair = buffer.len() - 2;
    let scan_from = if fallback == 0 {
        last_pair
    } else {
        fallback.min(last_pair)
    };
    let edge = TriggerEdge::from_invert(invert);
    let threshold = threshold_for(trigger_level);
    (0..=scan_from)
        .rev()
        .find(|&i| edge.crosses(buffer[i], buffer[i + 1], threshold))
        .map(|index| TriggerSearch { index, found: true })
        .unwrap_or(untriggered)
}
