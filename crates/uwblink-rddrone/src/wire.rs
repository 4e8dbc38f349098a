//! Wire formats for the RDDrone UWB module.
//!
//! The module speaks a fixed pair of binary message layouts over the UART,
//! with no preamble, no length prefix, and no checksum -- the only framing
//! signal is silence between messages (handled by
//! [`framer`](crate::framer)) and the only structural check available is
//! the total length plus a fixed terminal stop byte.
//!
//! # Message layouts
//!
//! All multi-byte fields are little-endian; floats are IEEE-754 `f32`.
//!
//! Grid survey result, 163 bytes:
//!
//! ```text
//! cmd sub status counter[2] uuid[16] initiator_time[8] anchor_nr
//! gps{lat lon alt}[12] target{x y z}[12] anchors{x y z}[9*12] stop
//! ```
//!
//! Distance result, 51 bytes:
//!
//! ```text
//! cmd sub status counter[2] anchor_nr yaw_offset[4] time_offset[4]
//! distances[9*4] stop
//! ```
//!
//! # Outbound commands
//!
//! Every command is 20 bytes: a 4-byte prefix followed by a 16-byte grid
//! UUID field. For pure ranging and stop ranging the UUID is unused and
//! zero-filled. The prefix bytes are a hardware contract and must match
//! bit-for-bit.

use bytes::{Buf, BufMut, BytesMut};

use uwblink_core::error::{Error, Result};
use uwblink_core::report::{DistanceReport, GridSurveyReport};
use uwblink_core::types::{GpsPosition, Position, MAX_ANCHORS};

/// Terminal byte required on every accepted inbound message.
pub const STOP_BYTE: u8 = 0x1B;

/// Total size of the grid survey result message.
pub const GRID_SURVEY_MSG_LEN: usize = 163;

/// Total size of the distance result message.
pub const DISTANCE_RESULT_MSG_LEN: usize = 51;

/// Total size of an outbound command frame (4-byte prefix + 16-byte UUID).
pub const COMMAND_LEN: usize = 20;

const fn command(sub: u8) -> [u8; COMMAND_LEN] {
    let mut cmd = [0u8; COMMAND_LEN];
    cmd[0] = 0x8E;
    cmd[1] = 0x00;
    cmd[2] = 0x11;
    cmd[3] = sub;
    cmd
}

/// Request a one-shot grid survey.
pub const CMD_GRID_SURVEY: [u8; COMMAND_LEN] = command(0x01);

/// Begin continuous ranging against the surveyed grid.
pub const CMD_PURE_RANGING: [u8; COMMAND_LEN] = command(0x02);

/// Stop ranging.
pub const CMD_STOP_RANGING: [u8; COMMAND_LEN] = command(0x00);

/// Length + stop-byte gate shared by both message decoders.
///
/// The framer already guarantees the exact length, but the decoder
/// re-checks it as an invariant since it also serves callers that did not
/// come through the framer.
fn check_envelope(frame: &[u8], expected: usize) -> Result<()> {
    if frame.len() != expected {
        return Err(Error::MalformedFrame(format!(
            "expected {expected} bytes, got {}",
            frame.len()
        )));
    }
    let terminal = frame[expected - 1];
    if terminal != STOP_BYTE {
        return Err(Error::MalformedFrame(format!(
            "bad stop byte 0x{terminal:02X}"
        )));
    }
    Ok(())
}

fn get_position(buf: &mut &[u8]) -> Position {
    Position {
        x: buf.get_f32_le(),
        y: buf.get_f32_le(),
        z: buf.get_f32_le(),
    }
}

/// Decode a grid survey result message.
///
/// Acceptance is purely structural: exact length and stop byte. Field
/// content -- including the leading cmd/sub-cmd bytes -- is copied out,
/// never judged; an all-zero frame with a valid stop byte decodes to an
/// all-zero report.
pub fn decode_grid_survey(frame: &[u8]) -> Result<GridSurveyReport> {
    check_envelope(frame, GRID_SURVEY_MSG_LEN)?;

    let mut buf = &frame[..GRID_SURVEY_MSG_LEN - 1];
    // cmd, sub_cmd, status, counter: module bookkeeping, not part of the
    // survey record.
    buf.advance(5);

    let mut grid_uuid = [0u8; 16];
    buf.copy_to_slice(&mut grid_uuid);
    let initiator_time = buf.get_i64_le();
    let anchor_count = buf.get_u8();
    let gps = GpsPosition {
        lat: buf.get_f32_le(),
        lon: buf.get_f32_le(),
        alt: buf.get_f32_le(),
    };
    let target_position = get_position(&mut buf);
    let mut anchor_positions = [Position::default(); MAX_ANCHORS];
    for slot in &mut anchor_positions {
        *slot = get_position(&mut buf);
    }

    Ok(GridSurveyReport {
        grid_uuid,
        initiator_time,
        anchor_count,
        gps,
        target_position,
        anchor_positions,
    })
}

/// Decode a distance result message.
pub fn decode_distance_result(frame: &[u8]) -> Result<DistanceReport> {
    check_envelope(frame, DISTANCE_RESULT_MSG_LEN)?;

    let mut buf = &frame[..DISTANCE_RESULT_MSG_LEN - 1];
    buf.advance(2); // cmd, sub_cmd
    let status = buf.get_u8();
    let counter = buf.get_u16_le();
    let anchor_count = buf.get_u8();
    let yaw_offset_deg = buf.get_f32_le();
    let time_offset_ms = buf.get_f32_le();
    let mut anchor_distances_cm = [0.0f32; MAX_ANCHORS];
    for slot in &mut anchor_distances_cm {
        *slot = buf.get_f32_le();
    }

    Ok(DistanceReport {
        status,
        counter,
        anchor_count,
        yaw_offset_deg,
        time_offset_ms,
        anchor_distances_cm,
    })
}

/// Encode a grid survey result message.
///
/// Used by simulators and the test harness; the module bookkeeping bytes
/// (status, counter) are zero.
pub fn encode_grid_survey(report: &GridSurveyReport) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(GRID_SURVEY_MSG_LEN);
    buf.put_u8(0x8E);
    buf.put_u8(0x01);
    buf.put_u8(0x00); // status
    buf.put_u16_le(0); // counter
    buf.put_slice(&report.grid_uuid);
    buf.put_i64_le(report.initiator_time);
    buf.put_u8(report.anchor_count);
    buf.put_f32_le(report.gps.lat);
    buf.put_f32_le(report.gps.lon);
    buf.put_f32_le(report.gps.alt);
    put_position(&mut buf, &report.target_position);
    for anchor in &report.anchor_positions {
        put_position(&mut buf, anchor);
    }
    buf.put_u8(STOP_BYTE);
    debug_assert_eq!(buf.len(), GRID_SURVEY_MSG_LEN);
    buf.to_vec()
}

/// Encode a distance result message.
pub fn encode_distance_result(report: &DistanceReport) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(DISTANCE_RESULT_MSG_LEN);
    buf.put_u8(0x8E);
    buf.put_u8(0x02);
    buf.put_u8(report.status);
    buf.put_u16_le(report.counter);
    buf.put_u8(report.anchor_count);
    buf.put_f32_le(report.yaw_offset_deg);
    buf.put_f32_le(report.time_offset_ms);
    for distance in &report.anchor_distances_cm {
        buf.put_f32_le(*distance);
    }
    buf.put_u8(STOP_BYTE);
    debug_assert_eq!(buf.len(), DISTANCE_RESULT_MSG_LEN);
    buf.to_vec()
}

fn put_position(buf: &mut BytesMut, pos: &Position) {
    buf.put_f32_le(pos.x);
    buf.put_f32_le(pos.y);
    buf.put_f32_le(pos.z);
}

fn component_ok(value: f32, limit: f32) -> bool {
    value.is_finite() && value.abs() <= limit
}

/// Opt-in plausibility gate for survey records.
///
/// When one or more anchors are missed during the survey, the module can
/// report wildly large positions. The structural decoder never judges
/// content, so callers that enable range validation apply this after
/// decoding. GPS fields are excluded (different units and scale).
pub fn survey_within_range(report: &GridSurveyReport, limit_cm: f32) -> bool {
    component_ok(report.target_position.max_abs(), limit_cm)
        && report
            .anchor_positions
            .iter()
            .all(|p| component_ok(p.max_abs(), limit_cm))
}

/// Opt-in plausibility gate for distance records.
pub fn distance_within_range(report: &DistanceReport, limit_cm: f32) -> bool {
    report
        .anchor_distances_cm
        .iter()
        .all(|&d| component_ok(d, limit_cm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_survey() -> GridSurveyReport {
        let mut anchor_positions = [Position::default(); MAX_ANCHORS];
        anchor_positions[0] = Position {
            x: 100.0,
            y: -250.5,
            z: 30.0,
        };
        anchor_positions[8] = Position {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        };
        GridSurveyReport {
            grid_uuid: *b"\x00\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0A\x0B\x0C\x0D\x0E\x0F",
            initiator_time: 1_234_567_890,
            anchor_count: 4,
            gps: GpsPosition {
                lat: 52.37,
                lon: 4.89,
                alt: 12.5,
            },
            target_position: Position {
                x: 10.0,
                y: 20.0,
                z: 0.0,
            },
            anchor_positions,
        }
    }

    fn sample_distance() -> DistanceReport {
        let mut anchor_distances_cm = [0.0f32; MAX_ANCHORS];
        anchor_distances_cm[0] = 312.5;
        anchor_distances_cm[3] = 871.0;
        DistanceReport {
            status: 0,
            counter: 0x0102,
            anchor_count: 2,
            yaw_offset_deg: -12.5,
            time_offset_ms: 4.25,
            anchor_distances_cm,
        }
    }

    // ---------------------------------------------------------------
    // Command frames (hardware contract, bit-for-bit)
    // ---------------------------------------------------------------

    #[test]
    fn command_frames_match_hardware_contract() {
        assert_eq!(&CMD_STOP_RANGING[..4], &[0x8E, 0x00, 0x11, 0x00]);
        assert_eq!(&CMD_PURE_RANGING[..4], &[0x8E, 0x00, 0x11, 0x02]);
        assert_eq!(&CMD_GRID_SURVEY[..4], &[0x8E, 0x00, 0x11, 0x01]);

        // The UUID field is zero-filled for all three.
        for cmd in [&CMD_STOP_RANGING, &CMD_PURE_RANGING, &CMD_GRID_SURVEY] {
            assert_eq!(cmd.len(), 20);
            assert!(cmd[4..].iter().all(|&b| b == 0));
        }
    }

    // ---------------------------------------------------------------
    // Envelope validation
    // ---------------------------------------------------------------

    #[test]
    fn zero_filled_survey_with_stop_byte_is_accepted() {
        let mut frame = vec![0u8; GRID_SURVEY_MSG_LEN];
        frame[GRID_SURVEY_MSG_LEN - 1] = STOP_BYTE;

        let report = decode_grid_survey(&frame).unwrap();
        assert_eq!(report.grid_uuid, [0u8; 16]);
        assert_eq!(report.initiator_time, 0);
        assert_eq!(report.anchor_count, 0);
        assert_eq!(report.target_position, Position::default());
        assert!(report
            .anchor_positions
            .iter()
            .all(|p| *p == Position::default()));
    }

    #[test]
    fn survey_with_wrong_stop_byte_is_malformed() {
        let frame = vec![0u8; GRID_SURVEY_MSG_LEN]; // terminal byte 0x00
        let result = decode_grid_survey(&frame);
        assert!(matches!(result, Err(Error::MalformedFrame(_))));
    }

    #[test]
    fn survey_with_wrong_length_is_malformed() {
        let mut frame = vec![0u8; GRID_SURVEY_MSG_LEN - 1];
        *frame.last_mut().unwrap() = STOP_BYTE;
        assert!(matches!(
            decode_grid_survey(&frame),
            Err(Error::MalformedFrame(_))
        ));
    }

    #[test]
    fn distance_with_wrong_stop_byte_is_malformed() {
        let mut frame = encode_distance_result(&sample_distance());
        *frame.last_mut().unwrap() = 0xFF;
        assert!(matches!(
            decode_distance_result(&frame),
            Err(Error::MalformedFrame(_))
        ));
    }

    #[test]
    fn distance_rejects_survey_sized_frame() {
        let mut frame = vec![0u8; GRID_SURVEY_MSG_LEN];
        frame[GRID_SURVEY_MSG_LEN - 1] = STOP_BYTE;
        assert!(matches!(
            decode_distance_result(&frame),
            Err(Error::MalformedFrame(_))
        ));
    }

    // ---------------------------------------------------------------
    // Field extraction
    // ---------------------------------------------------------------

    #[test]
    fn survey_round_trip() {
        let report = sample_survey();
        let frame = encode_grid_survey(&report);
        assert_eq!(frame.len(), GRID_SURVEY_MSG_LEN);
        assert_eq!(decode_grid_survey(&frame).unwrap(), report);
    }

    #[test]
    fn distance_round_trip() {
        let report = sample_distance();
        let frame = encode_distance_result(&report);
        assert_eq!(frame.len(), DISTANCE_RESULT_MSG_LEN);
        assert_eq!(decode_distance_result(&frame).unwrap(), report);
    }

    #[test]
    fn distance_fields_sit_at_fixed_offsets() {
        let mut frame = vec![0u8; DISTANCE_RESULT_MSG_LEN];
        frame[0] = 0x8E;
        frame[1] = 0x02;
        frame[2] = 0x01; // status
        frame[3..5].copy_from_slice(&0x0304u16.to_le_bytes());
        frame[5] = 7; // anchor_nr
        frame[6..10].copy_from_slice(&90.0f32.to_le_bytes());
        frame[10..14].copy_from_slice(&2.5f32.to_le_bytes());
        // Anchor slot 2 starts at offset 14 + 2*4.
        frame[22..26].copy_from_slice(&123.0f32.to_le_bytes());
        frame[50] = STOP_BYTE;

        let report = decode_distance_result(&frame).unwrap();
        assert_eq!(report.status, 0x01);
        assert_eq!(report.counter, 0x0304);
        assert_eq!(report.anchor_count, 7);
        assert_eq!(report.yaw_offset_deg, 90.0);
        assert_eq!(report.time_offset_ms, 2.5);
        assert_eq!(report.anchor_distances_cm[2], 123.0);
        assert_eq!(report.anchor_distances_cm[1], 0.0);
    }

    #[test]
    fn survey_uuid_and_time_sit_at_fixed_offsets() {
        let mut frame = vec![0u8; GRID_SURVEY_MSG_LEN];
        frame[5..21].copy_from_slice(&[0xAB; 16]);
        frame[21..29].copy_from_slice(&(-5i64).to_le_bytes());
        frame[29] = 9;
        frame[162] = STOP_BYTE;

        let report = decode_grid_survey(&frame).unwrap();
        assert_eq!(report.grid_uuid, [0xAB; 16]);
        assert_eq!(report.initiator_time, -5);
        assert_eq!(report.anchor_count, 9);
    }

    // ---------------------------------------------------------------
    // Optional range validation
    // ---------------------------------------------------------------

    #[test]
    fn range_gate_rejects_missed_anchor_artifacts() {
        let mut report = sample_distance();
        assert!(distance_within_range(&report, 10_000.0));

        report.anchor_distances_cm[5] = 1.0e30; // missed anchor artifact
        assert!(!distance_within_range(&report, 10_000.0));

        report.anchor_distances_cm[5] = f32::NAN;
        assert!(!distance_within_range(&report, 10_000.0));
    }

    #[test]
    fn range_gate_on_survey_ignores_gps() {
        let mut report = sample_survey();
        report.gps.lat = 1.0e9; // implausible as cm, but GPS is not gated
        assert!(survey_within_range(&report, 10_000.0));

        report.anchor_positions[2].z = -1.0e9;
        assert!(!survey_within_range(&report, 10_000.0));
    }
}
