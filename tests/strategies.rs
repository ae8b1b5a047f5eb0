mod common;

use std::io::Cursor;

use common::*;
use shx_index::{
    IdentifierIndexReader, IndexSource, LocatorEntry, LocatorReader, ReadOptions, Strategy,
};

/// Every way of opening the same bytes, paired with the strategy expected to serve it.
fn sources(bytes: &[u8], dir: &tempfile::TempDir, name: &str) -> Vec<(IndexSource, ReadOptions, Strategy)> {
    let path = write_file(dir.path(), name, bytes);
    let mut sources = Vec::new();

    for window in [1usize, 3, 7, 2000] {
        sources.push((
            IndexSource::seekable(Cursor::new(bytes.to_vec())),
            ReadOptions::default().window_entries(window),
            Strategy::Windowed,
        ));
    }
    sources.push((
        IndexSource::stream(Cursor::new(bytes.to_vec())),
        ReadOptions::default(),
        Strategy::Loaded,
    ));
    sources.push((
        IndexSource::probe(Unseekable(Cursor::new(bytes.to_vec()))),
        ReadOptions::default(),
        Strategy::Loaded,
    ));
    if !bytes.is_empty() {
        let options = ReadOptions::default();
        sources.push((
            IndexSource::open_path(&path, &options).expect("map index file"),
            options,
            Strategy::Mapped,
        ));
    }
    let options = ReadOptions::default().memory_map(false).window_entries(5);
    sources.push((
        IndexSource::open_path(&path, &options).expect("open index file"),
        options,
        Strategy::Windowed,
    ));
    sources
}

#[test]
fn locator_lookups_agree_across_strategies() {
    let dir = setup_temp_dir();
    let entries = sequential_entries(1_000);
    let bytes = locator_bytes(&entries);
    // Forward, backward and scattered access patterns.
    let pattern: Vec<u64> = (0..1_000)
        .chain((0..1_000).rev())
        .chain((0..1_000u64).map(|i| (i * 389) % 1_000))
        .collect();

    for (source, options, expected) in sources(&bytes, &dir, "roads.shx") {
        let mut reader = LocatorReader::open(source, &options).unwrap();
        assert_eq!(reader.strategy(), Some(expected));
        assert_eq!(reader.record_count(), 1_000);

        for &i in &pattern {
            let want = entries[i as usize];
            assert_eq!(reader.offset(i).unwrap(), want.offset, "{} offset {}", expected, i);
            assert_eq!(reader.content_length(i).unwrap(), want.length, "{} length {}", expected, i);
            assert_eq!(reader.offset_in_bytes(i).unwrap(), want.offset_in_bytes());
        }

        let all: Vec<LocatorEntry> = reader.entries().map(|e| e.unwrap()).collect();
        assert_eq!(all, entries, "{} iteration", expected);
        reader.close();
    }
}

#[test]
fn identifier_lookups_agree_across_strategies() {
    let dir = setup_temp_dir();
    let entries = identifiers_with_gaps(3_000, |id| id % 5 == 0 || (1_200..1_500).contains(&id));
    let bytes = identifier_bytes(&entries, 10);

    for (source, options, expected) in sources(&bytes, &dir, "roads.fix") {
        let mut reader = IdentifierIndexReader::open(source, None, &options).unwrap();
        assert_eq!(reader.strategy(), Some(expected));
        assert_eq!(reader.count(), entries.len() as u64);
        assert_eq!(reader.deleted_count(), 10);

        for &(identifier, ordinal) in entries.iter().step_by(7) {
            assert_eq!(
                reader.find_ordinal(identifier).unwrap(),
                Some(ordinal as u64),
                "{} lookup of {}",
                expected,
                identifier
            );
        }
        for missing in [0u64, 5, 1_200, 1_333, 1_499, 3_000, 3_001] {
            assert_eq!(reader.find_ordinal(missing).unwrap(), None, "{} found {}", expected, missing);
        }

        let walked: Vec<(u64, u32)> = reader
            .iter()
            .map(|e| e.map(|e| (e.identifier, e.ordinal)).unwrap())
            .collect();
        assert_eq!(walked, entries, "{} iteration", expected);
    }
}

#[test]
fn empty_locator_stream_is_an_empty_index() {
    let reader = LocatorReader::open(IndexSource::stream(Cursor::new(Vec::new())), &ReadOptions::default())
        .unwrap();
    assert_eq!(reader.record_count(), 0);
    assert_eq!(reader.strategy(), Some(Strategy::Loaded));

    let dir = setup_temp_dir();
    for (source, options, _) in sources(&[], &dir, "empty.shx") {
        let mut reader = LocatorReader::open(source, &options).unwrap();
        assert_eq!(reader.record_count(), 0);
        assert!(reader.header().is_none());
        assert!(reader.offset(0).is_err());
    }
}

#[test]
fn empty_identifier_source_is_corruption_everywhere() {
    let err = IdentifierIndexReader::open(
        IndexSource::stream(Cursor::new(Vec::new())),
        None,
        &ReadOptions::default(),
    )
    .err()
    .expect("empty stream must fail");
    assert!(err.is_corruption());

    let err = IdentifierIndexReader::open(
        IndexSource::seekable(Cursor::new(Vec::new())),
        None,
        &ReadOptions::default(),
    )
    .err()
    .expect("empty seekable source must fail");
    assert!(err.is_corruption());
}

#[test]
fn unseekable_reader_is_probed_as_stream() {
    let source = IndexSource::probe(Unseekable(Cursor::new(Vec::new())));
    assert!(matches!(source, IndexSource::StreamOnly(_)));

    let source = IndexSource::probe(Cursor::new(vec![0u8; 4]));
    assert!(matches!(source, IndexSource::Seekable(_)));
}

#[test]
fn truncated_stream_is_reported_as_corrupt() {
    let mut bytes = locator_bytes(&sequential_entries(10));
    bytes.truncate(100 + 9 * 8 + 3);
    let err = LocatorReader::open(IndexSource::stream(Cursor::new(bytes)), &ReadOptions::default())
        .err()
        .expect("short stream must fail");
    assert!(err.is_corruption(), "unexpected error: {}", err);
}
