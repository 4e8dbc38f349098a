//! Decoded measurement records and the sink they are published to.
//!
//! The session controller emits one [`UwbReport`] per accepted frame
//! through a [`ReportSink`]. The default sink is a
//! [`tokio::sync::broadcast`] channel so multiple consumers (an estimator,
//! a logger, a UI) can subscribe independently; the controller itself has
//! no opinion on delivery, retention, or subscriber count.

use tokio::sync::broadcast;

use crate::types::{GpsPosition, Position, MAX_ANCHORS};

/// The one-shot record produced when the grid survey completes.
///
/// Establishes anchor layout and identity before continuous ranging
/// begins. Anchor positions are an indexed array; slots beyond
/// `anchor_count` are zero-filled by the module.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSurveyReport {
    /// 16-byte identifier of the surveyed grid.
    pub grid_uuid: [u8; 16],
    /// Initiator clock at survey time, microseconds.
    pub initiator_time: i64,
    /// Number of live anchors in the grid (<= [`MAX_ANCHORS`]).
    pub anchor_count: u8,
    /// GPS reference for the grid origin.
    pub gps: GpsPosition,
    /// Target (landing point) position in the grid frame.
    pub target_position: Position,
    /// Surveyed anchor positions, one slot per possible anchor.
    pub anchor_positions: [Position; MAX_ANCHORS],
}

/// One ranging cycle's distance measurements.
///
/// Produced repeatedly while the session is in the ranging phase.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceReport {
    /// Module status byte; `0x00` is no error.
    pub status: u8,
    /// Monotonically increasing cycle counter from the module.
    pub counter: u16,
    /// Anchors heard this cycle (<= [`MAX_ANCHORS`]).
    pub anchor_count: u8,
    /// Yaw offset between grid frame and module frame, degrees.
    pub yaw_offset_deg: f32,
    /// Clock offset for this cycle, milliseconds.
    pub time_offset_ms: f32,
    /// Distance to each anchor slot, centimeters. Slots for anchors not
    /// heard this cycle are zero.
    pub anchor_distances_cm: [f32; MAX_ANCHORS],
}

/// A decoded measurement record, ready for publication.
#[derive(Debug, Clone, PartialEq)]
pub enum UwbReport {
    /// Grid survey completed (once per session).
    GridSurvey(GridSurveyReport),
    /// One ranging cycle (repeatedly during ranging).
    Distance(DistanceReport),
}

/// Where accepted records go.
///
/// `publish` must be non-blocking; the session controller consumes no
/// return value and performs no retry. Delivery guarantees belong to the
/// sink implementation.
pub trait ReportSink: Send {
    /// Publish one accepted record.
    fn publish(&self, report: UwbReport);
}

/// The default sink: a broadcast channel.
///
/// A send error only means there are currently no subscribers, which is
/// fine -- records are a live feed, not a queue.
impl ReportSink for broadcast::Sender<UwbReport> {
    fn publish(&self, report: UwbReport) {
        let _ = self.send(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_sink_delivers_to_subscriber() {
        let (tx, mut rx) = broadcast::channel(16);
        let report = UwbReport::Distance(DistanceReport {
            status: 0,
            counter: 7,
            anchor_count: 3,
            yaw_offset_deg: 1.5,
            time_offset_ms: 0.0,
            anchor_distances_cm: [0.0; MAX_ANCHORS],
        });

        tx.publish(report.clone());
        assert_eq!(rx.try_recv().unwrap(), report);
    }

    #[test]
    fn broadcast_sink_without_subscribers_is_silent() {
        let (tx, rx) = broadcast::channel(16);
        drop(rx);
        // Must not panic or block.
        tx.publish(UwbReport::GridSurvey(GridSurveyReport {
            grid_uuid: [0; 16],
            initiator_time: 0,
            anchor_count: 0,
            gps: GpsPosition::default(),
            target_position: Position::default(),
            anchor_positions: [Position::default(); MAX_ANCHORS],
        }));
    }
}
