// Property tests for the fuzz contract: arbitrary bytes never panic, never
// corrupt cursor invariants, and chunking a stream never changes the result.

use corvid_common::config::TerminalConfig;
use corvid_term::delegate::NullDelegate;
use corvid_term::terminal::Terminal;
use proptest::prelude::*;

const COLS: usize = 20;
const ROWS: usize = 6;

fn terminal() -> Terminal<NullDelegate> {
    let config = TerminalConfig {
        cols: COLS,
        rows: ROWS,
        scrollback_max: 16,
        osc_cap: 256,
        dcs_cap: 512,
        ..TerminalConfig::default()
    };
    match Terminal::new(config, NullDelegate) {
        Ok(term) => term,
        Err(e) => panic!("terminal construction failed: {e}"),
    }
}

fn grid_dump(term: &Terminal<NullDelegate>) -> Vec<String> {
    (0..ROWS)
        .map(|y| term.line(y).map(|r| r.as_text(false)).unwrap_or_default())
        .collect()
}

proptest! {
    #[test]
    fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..2048)) {
        let mut term = terminal();
        term.feed(&bytes);

        prop_assert!(term.cursor().pos.y < ROWS);
        prop_assert!(term.cursor().pos.x <= COLS);
    }

    #[test]
    fn feeding_twice_never_panics_either(
        first in prop::collection::vec(any::<u8>(), 0..512),
        second in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let mut term = terminal();
        term.feed(&first);
        term.feed(&second);
        prop_assert!(term.cursor().pos.y < ROWS);
    }

    #[test]
    fn chunking_is_invariant(
        bytes in prop::collection::vec(any::<u8>(), 0..256),
        split in any::<prop::sample::Index>(),
    ) {
        let mut whole = terminal();
        whole.feed(&bytes);

        let split = split.index(bytes.len().max(1)).min(bytes.len());
        let mut chunked = terminal();
        chunked.feed(&bytes[..split]);
        chunked.feed(&bytes[split..]);

        prop_assert_eq!(grid_dump(&whole), grid_dump(&chunked));
        prop_assert_eq!(whole.cursor(), chunked.cursor());
    }

    #[test]
    fn structured_streams_chunk_identically(
        pieces in prop::collection::vec(
            prop::sample::select(vec![
                b"hello".to_vec(),
                b"\x1b[2J".to_vec(),
                b"\x1b[1;31m".to_vec(),
                b"\x1b[10;10H".to_vec(),
                b"\r\n".to_vec(),
                "あいう".as_bytes().to_vec(),
                b"\x1b]0;title\x1b\\".to_vec(),
                b"\x1b[?1049h".to_vec(),
                b"\x1b[?1049l".to_vec(),
                b"\x1b[3;5r".to_vec(),
                b"\x1b7x\x1b8".to_vec(),
                b"\x1bM".to_vec(),
                b"\x1b[5L".to_vec(),
                b"\x1b[2P".to_vec(),
                b"\t".to_vec(),
            ]),
            0..24,
        ),
        split in any::<prop::sample::Index>(),
    ) {
        let bytes: Vec<u8> = pieces.concat();

        let mut whole = terminal();
        whole.feed(&bytes);

        let split = split.index(bytes.len().max(1)).min(bytes.len());
        let mut chunked = terminal();
        chunked.feed(&bytes[..split]);
        chunked.feed(&bytes[split..]);

        prop_assert_eq!(grid_dump(&whole), grid_dump(&chunked));
        prop_assert_eq!(whole.cursor(), chunked.cursor());
    }

    // Regression-style corpus: snippets that historically trip terminal
    // parsers, fed whole and byte-by-byte.
    #[test]
    fn hostile_corpus_fed_byte_by_byte(extra in prop::collection::vec(any::<u8>(), 0..64)) {
        let corpus: &[&[u8]] = &[
            b"\x1b[",
            b"\x1b[;;;;;;;;;;;;;;;;;;;;;;;;m",
            b"\x1b[99999999999999999999H",
            b"\x1b]0;unterminated",
            b"\x1bP$q",
            b"\x1b\x1b\x1b\x1b",
            b"\x18\x1a\x18\x1a",
            b"\xff\xfe\xc0\x80\xed\xa0\x80",
            b"\x1b[?1;2;3;4;5;6;7;8;9;10;11;12;13;14;15;16;17h",
            b"\x1b]4;999;#zzzzzz\x07",
        ];

        let mut term = terminal();
        for chunk in corpus {
            for &b in *chunk {
                term.feed(&[b]);
            }
        }
        term.feed(&extra);
        prop_assert!(term.cursor().pos.y < ROWS);
    }
}
