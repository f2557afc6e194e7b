//! Integration tests: detail-buffer assembly into CSA documents with the
//! standard-metadata overlay.

mod common;

use common::{detail_buffer, game_info_frame, move_event_frame};
use kifu_core::{assemble_bundle, export_record, DecodeError, ErrorKind, MetadataKey};

fn info() -> Vec<u8> {
    game_info_frame(
        798,
        "202507201000",
        "202507201830",
        "第83期名人戦七番勝負第1局",
        "矢倉",
        "東京・将棋会館",
        360,
        4,
    )
}

#[test]
fn test_full_game_to_record_document() {
    let buf = detail_buffer(
        info(),
        &[
            move_event_frame(0, 0, 0, 0, ""),
            move_event_frame(1, 1, 77, 76, "初手"),
            move_event_frame(2, 1, 33, 34, ""),
            move_event_frame(3, 0, 0, 0, "ここで投了"),
        ],
    );
    let bundle = assemble_bundle(&buf).unwrap();
    let doc = export_record(&bundle).unwrap();

    assert_eq!(
        doc.csa,
        "PI\n+\n+7776FU\nT7\n'*初手\n-3334FU\nT7\n%TORYO\n'*ここで投了"
    );
    assert!(doc
        .metadata
        .contains(&(MetadataKey::Title, "第83期名人戦七番勝負第1局".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::Tournament, "名人戦".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::BlackName, "佐藤 天彦".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::WhiteName, "豊島 将之".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::Date, "2025/07/20".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::StartDatetime, "2025/07/20 10:00:00".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::EndDatetime, "2025/07/20 18:30:00".to_string())));
    // Location is normalized: the katakana middle dot folds to half width.
    assert!(doc
        .metadata
        .contains(&(MetadataKey::Place, "東京･将棋会館".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::Strategy, "矢倉".to_string())));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::TimeLimit, "360".to_string())));
}

#[test]
fn test_promotion_flag_in_full_pipeline() {
    // Destination 0x85 → coordinate 05, piece 6 (KA) promoted to UM.
    let buf = detail_buffer(info(), &[move_event_frame(11, 6, 88, 0x85, "")]);
    let bundle = assemble_bundle(&buf).unwrap();
    assert_eq!(bundle.events[0].next, 5);
    assert_eq!(bundle.events[0].piece, 14);
    let doc = export_record(&bundle).unwrap();
    assert_eq!(doc.csa, "+8805UM\nT7");
}

#[test]
fn test_bundle_without_moves_is_semantic_error() {
    let buf = detail_buffer(info(), &[]);
    let err = assemble_bundle(&buf).unwrap_err();
    assert!(matches!(err, DecodeError::NoMoves));
    assert_eq!(err.kind(), ErrorKind::Semantic);
}

#[test]
fn test_in_progress_game_has_no_end_metadata() {
    let open_info = game_info_frame(
        799,
        "202507201000",
        "000000000000",
        "第83期名人戦七番勝負第2局",
        "",
        "",
        360,
        0x400,
    );
    let buf = detail_buffer(open_info, &[move_event_frame(0, 0, 0, 0, "")]);
    let bundle = assemble_bundle(&buf).unwrap();
    assert_eq!(bundle.info.end_time, None);
    assert_eq!(bundle.info.moves, 0);
    assert_eq!(bundle.info.time_limit, 0);

    let doc = export_record(&bundle).unwrap();
    assert!(doc.metadata.iter().all(|(k, _)| *k != MetadataKey::EndDatetime));
    assert!(doc.metadata.iter().all(|(k, _)| *k != MetadataKey::Place));
    assert!(doc.metadata.iter().all(|(k, _)| *k != MetadataKey::Strategy));
    assert!(doc
        .metadata
        .contains(&(MetadataKey::Length, "0".to_string())));
}
