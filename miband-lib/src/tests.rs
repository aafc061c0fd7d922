use crate::ack::AcknowledgmentMessage;
use crate::auth::{AuthenticationPacket, DeviceAddress, Gender, UserProfile, WristSide};
use crate::checksum::crc8;
use crate::session::{ActivitySession, ReassemblerState, SessionConfig};
use chrono::NaiveDate;
use zerocopy::IntoBytes;

/// Two headers: four zero-step blocks, then the final header
const SIMPLE_TRANSFER: [u8; 34] = [
    1, 17, 4, 7, 9, 42, 1, 4, 0, 4, 0, // header, 4 blocks follow
    5, 0, 0, 5, 0, 0, 5, 0, 0, 5, 0, 0, // blocks
    1, 17, 4, 7, 9, 46, 1, 4, 0, 0, 0, // final header
];

/// Three headers with steps, so the second header gets acknowledged
const STEPPING_TRANSFER: [u8; 43] = [
    1, 17, 4, 7, 9, 42, 0, 2, 0, 2, 0, // header, 2 blocks
    0, 10, 10, 0, 20, 20, // blocks
    1, 17, 4, 7, 9, 44, 0, 1, 0, 1, 0, // header, 1 block
    0, 7, 7, // block
    1, 17, 4, 7, 9, 45, 0, 0, 0, 0, 0, // final header
    0xee, // stray byte after the end
];

fn testy_profile() -> UserProfile {
    let address: DeviceAddress = "c80f10768f85".parse().expect("valid address");
    UserProfile::new(address, "testy")
        .with_gender(Gender::Other)
        .with_age(25)
        .with_height_cm(175)
        .with_weight_kg(70)
        .with_wrist_side(WristSide::Left)
        .with_feature_code(5)
        .with_appearance_code(0)
}

#[test]
fn test_auth_packet_golden() {
    let packet = AuthenticationPacket::build(&testy_profile());
    assert_eq!(
        hex::encode(packet.as_bytes()),
        "274e92060219af46000500746573747900000016",
        "Authentication packet does not match the official app's output"
    );
    assert_eq!(packet.uid(), 110251559);
    assert_eq!(packet.to_string(), "274e92060219af46000500746573747900000016");
}

#[test]
fn test_auth_packet_layout() {
    let profile = testy_profile()
        .with_gender(Gender::Male)
        .with_age(31)
        .with_height_cm(182)
        .with_weight_kg(80)
        .with_wrist_side(WristSide::Right)
        .with_feature_code(4)
        .with_appearance_code(3);
    let bytes = AuthenticationPacket::build(&profile).to_bytes();

    assert_eq!(&bytes[0..4], &110251559i32.to_le_bytes());
    assert_eq!(&bytes[4..11], &[1, 31, 182, 80, 1, 4, 3]);
    assert_eq!(&bytes[11..19], b"testy\0\0\0");
    assert_eq!(bytes[19], crc8(&bytes[..19]) ^ 0x85);
}

#[test]
fn test_auth_packet_is_deterministic() {
    let profile = testy_profile();
    assert_eq!(AuthenticationPacket::build(&profile), AuthenticationPacket::build(&profile));
}

#[test]
fn test_auth_checksum_is_bound_to_address() {
    let other: DeviceAddress = "c8:0f:10:76:8f:86".parse().unwrap();
    let a = AuthenticationPacket::build(&testy_profile());
    let b = AuthenticationPacket::build(&UserProfile::new(other, "testy"));

    assert_eq!(&a.as_bytes()[..19], &b.as_bytes()[..19]);
    assert_eq!(a.checksum() ^ b.checksum(), 0x85 ^ 0x86);
}

#[test]
fn test_numeric_alias_uid() {
    let address: DeviceAddress = "c80f10768f85".parse().unwrap();
    let packet = AuthenticationPacket::build(&UserProfile::new(address, "123"));
    assert_eq!(packet.uid(), 123);
    assert_eq!(&packet.to_bytes()[0..4], &[123, 0, 0, 0]);
    assert_eq!(&packet.to_bytes()[11..19], b"123\0\0\0\0\0");
}

#[test]
fn test_simple_transfer_single_ingest() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));
    session.ingest(&SIMPLE_TRANSFER);

    assert_eq!(session.total_steps(), 0);
    assert!(session.is_complete());
    assert_eq!(session.headers_seen(), 2);
    assert_eq!(session.segments().len(), 1);
    assert_eq!(session.segments()[0].blocks.len(), 4);
    assert!(session.pending_acknowledgments().is_empty());
    assert_eq!(session.buffered_len(), 0);
    assert_eq!(session.unframed_bytes(), 0);
    assert_eq!(session.bytes_observed(), SIMPLE_TRANSFER.len() as u64);
}

#[test]
fn test_fragmentation_invariance() {
    let mut whole = ActivitySession::new(SessionConfig::for_year_offset(17));
    whole.ingest(&STEPPING_TRANSFER);

    for chunk_size in 1..=STEPPING_TRANSFER.len() {
        let mut chunked = ActivitySession::new(SessionConfig::for_year_offset(17));
        for chunk in STEPPING_TRANSFER.chunks(chunk_size) {
            chunked.ingest(chunk);
        }

        assert_eq!(chunked.total_steps(), whole.total_steps(), "chunk size {}", chunk_size);
        assert_eq!(
            chunked.pending_acknowledgments(),
            whole.pending_acknowledgments(),
            "chunk size {}",
            chunk_size
        );
        assert_eq!(chunked.segments(), whole.segments(), "chunk size {}", chunk_size);
        assert!(chunked.is_complete(), "chunk size {}", chunk_size);
    }
}

#[test]
fn test_second_header_is_acknowledged() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));
    session.ingest(&STEPPING_TRANSFER);

    assert_eq!(session.total_steps(), 37);
    assert_eq!(session.headers_seen(), 3);
    assert_eq!(session.segments().len(), 2);
    assert_eq!(session.segments()[0].steps(), 30);
    assert_eq!(session.segments()[1].steps(), 7);

    let acks = session.pending_acknowledgments();
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].to_bytes(), [0x0a, 17, 4, 7, 9, 44, 0, 3, 0]);

    assert_eq!(session.trailing_bytes(), &[0xee]);
}

#[test]
fn test_retain_on_device_polarity() {
    let config = SessionConfig::for_year_offset(17).with_retain_on_device(true);
    let mut session = ActivitySession::new(config);
    session.ingest(&STEPPING_TRANSFER);

    let acks = session.take_acknowledgments();
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].to_bytes(), [0x0a, 17, 4, 7, 9, 44, 0, 0xfc, 0xff]);
    assert!(session.pending_acknowledgments().is_empty());
}

#[test]
fn test_partial_frames_stay_buffered() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));

    session.ingest(&SIMPLE_TRANSFER[..10]);
    assert_eq!(session.state(), ReassemblerState::AwaitingHeader);
    assert_eq!(session.buffered_len(), 10);

    session.ingest(&SIMPLE_TRANSFER[10..13]);
    assert_eq!(session.state(), ReassemblerState::ReadingBlocks { remaining: 12 });
    assert_eq!(session.buffered_len(), 2);

    session.ingest(&SIMPLE_TRANSFER[13..14]);
    assert_eq!(session.state(), ReassemblerState::ReadingBlocks { remaining: 9 });
    assert_eq!(session.buffered_len(), 0);

    session.ingest(&SIMPLE_TRANSFER[14..]);
    assert!(session.is_complete());
}

#[test]
fn test_unrecognized_window_is_skipped() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));
    let mut stream = vec![0xaa; 11];
    stream.extend_from_slice(&SIMPLE_TRANSFER);
    session.ingest(&stream);

    assert_eq!(session.unframed_bytes(), 11);
    assert!(session.is_complete());
    assert_eq!(session.headers_seen(), 2);
}

#[test]
fn test_stale_year_is_not_a_header() {
    // Headers stamped 2017 are not recognized by a 2026 session
    let mut session = ActivitySession::new(SessionConfig::for_date(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()));
    session.ingest(&SIMPLE_TRANSFER);

    assert!(!session.is_complete());
    assert_eq!(session.headers_seen(), 0);
    assert_eq!(session.unframed_bytes(), 33);
    assert_eq!(session.buffered_len(), 1);
}

#[test]
fn test_session_config_for_date_accepts_previous_year() {
    let config = SessionConfig::for_date(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    assert_eq!(config.accepted_year_offsets, 25..=26);
    assert!(!config.retain_on_device);
}

#[test]
fn test_samples_are_timestamped_per_minute() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));
    session.ingest(&STEPPING_TRANSFER);

    let samples: Vec<_> = session.samples().collect();
    assert_eq!(samples.len(), 3);

    let start = NaiveDate::from_ymd_opt(2017, 5, 7).unwrap().and_hms_opt(9, 42, 0).unwrap();
    assert_eq!(samples[0].time, Some(start));
    assert_eq!(samples[1].time, Some(start + chrono::TimeDelta::minutes(1)));
    assert_eq!(samples[1].block.steps, 20);
    assert_eq!(
        samples[2].time,
        NaiveDate::from_ymd_opt(2017, 5, 7).unwrap().and_hms_opt(9, 44, 0)
    );
}

#[test]
fn test_ack_matches_session_output() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));
    session.ingest(&STEPPING_TRANSFER);

    let header = session.segments()[1].header;
    assert_eq!(session.pending_acknowledgments()[0], AcknowledgmentMessage::build(&header, false));
}

#[test]
fn test_profile_defaults() {
    assert_eq!(Gender::default(), Gender::Other);
    assert_eq!(WristSide::default(), WristSide::Left);
    assert_eq!(u8::from(Gender::Male), 1);
    assert_eq!(u8::from(WristSide::Right), 1);
    assert_eq!(Gender::try_from(0u8).unwrap(), Gender::Female);

    let profile = UserProfile::new("c80f10768f85".parse().unwrap(), "testy");
    assert_eq!(profile.gender(), Gender::Other);
    assert_eq!(profile.wrist_side(), WristSide::Left);
}

#[test]
fn test_confirm_acknowledgment_pops_in_order() {
    let mut session = ActivitySession::new(SessionConfig::for_year_offset(17));
    session.ingest(&STEPPING_TRANSFER);

    let queued = session.pending_acknowledgments()[0];
    assert_eq!(session.confirm_acknowledgment(), Some(queued));
    assert!(session.pending_acknowledgments().is_empty());
    assert_eq!(session.confirm_acknowledgment(), None);
}
