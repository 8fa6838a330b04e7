// End-to-end scenarios driven through the public byte interface.

use corvid_common::attribute::Attribute;
use corvid_common::colors::TerminalColor;
use corvid_common::config::TerminalConfig;
use corvid_common::style::StyleFlags;
use corvid_term::ansi_components::osc::{SemanticPrompt, TitleKind};
use corvid_term::delegate::{ImageFormat, TerminalDelegate};
use corvid_term::input::TerminalKey;
use corvid_term::mouse::{MouseButton, MouseEvent, MouseEventKind, MouseModifiers};
use corvid_term::terminal::Terminal;

#[derive(Default)]
struct Recording {
    sent: Vec<u8>,
    titles: Vec<(TitleKind, String)>,
    bells: usize,
    images: Vec<(ImageFormat, usize, usize, usize)>,
    scrolled_out: usize,
    clipboard_sets: Vec<(String, Vec<u8>)>,
    hyperlinks: Vec<(u32, String)>,
    prompts: Vec<SemanticPrompt>,
}

impl TerminalDelegate for Recording {
    fn send(&mut self, bytes: &[u8]) {
        self.sent.extend_from_slice(bytes);
    }

    fn bell(&mut self) {
        self.bells += 1;
    }

    fn set_title(&mut self, kind: TitleKind, title: &str) {
        self.titles.push((kind, title.to_string()));
    }

    fn lines_scrolled_out(&mut self, count: usize) {
        self.scrolled_out += count;
    }

    fn clipboard_set(&mut self, selection: &str, payload: &[u8]) {
        self.clipboard_sets
            .push((selection.to_string(), payload.to_vec()));
    }

    fn hyperlink_activated(&mut self, id: u32, uri: &str) {
        self.hyperlinks.push((id, uri.to_string()));
    }

    fn show_image(&mut self, format: ImageFormat, width: usize, height: usize, data: &[u8]) {
        self.images.push((format, width, height, data.len()));
    }

    fn semantic_prompt(&mut self, mark: SemanticPrompt) {
        self.prompts.push(mark);
    }
}

fn terminal() -> Terminal<Recording> {
    terminal_sized(80, 24)
}

fn terminal_sized(cols: usize, rows: usize) -> Terminal<Recording> {
    let config = TerminalConfig {
        cols,
        rows,
        ..TerminalConfig::default()
    };
    match Terminal::new(config, Recording::default()) {
        Ok(term) => term,
        Err(e) => panic!("terminal construction failed: {e}"),
    }
}

fn row_text(term: &Terminal<Recording>, y: usize) -> String {
    term.line(y).map(|r| r.as_text(true)).unwrap_or_default()
}

fn sent(term: &Terminal<Recording>) -> String {
    String::from_utf8_lossy(&term.delegate().sent).to_string()
}

#[test]
fn hello_lands_at_origin() {
    let mut term = terminal();
    term.feed(b"Hello");

    for (i, expected) in ['H', 'e', 'l', 'l', 'o'].into_iter().enumerate() {
        let Some(row) = term.line(0) else {
            panic!("row 0 missing")
        };
        let cell = row.resolve_cell(i);
        assert_eq!(cell.base(), expected);
        assert_eq!(cell.attr(), &Attribute::default());
    }
    assert_eq!(term.cursor().pos.x, 5);
    assert_eq!(term.cursor().pos.y, 0);
}

#[test]
fn sgr_bold_red_then_reset() {
    let mut term = terminal();
    term.feed(b"\x1b[1;31mA\x1b[0mB");

    let Some(row) = term.line(0) else {
        panic!("row 0 missing")
    };
    let a = row.resolve_cell(0);
    assert_eq!(a.base(), 'A');
    assert!(a.attr().flags.contains(StyleFlags::BOLD));
    assert_eq!(a.attr().fg, TerminalColor::Red);

    let b = row.resolve_cell(1);
    assert_eq!(b.base(), 'B');
    assert_eq!(b.attr(), &Attribute::default());
}

#[test]
fn clear_screen_and_home() {
    let mut term = terminal();
    term.feed(b"some junk\r\nmore junk");
    term.feed(b"\x1b[2J\x1b[H");

    assert_eq!(term.cursor().pos.x, 0);
    assert_eq!(term.cursor().pos.y, 0);
    for y in 0..24 {
        assert_eq!(row_text(&term, y), "", "row {y} not blank");
    }
}

#[test]
fn cursor_position_report() {
    let mut term = terminal();
    // 1-based row 6, column 4
    term.feed(b"\x1b[6;4H");
    term.feed(b"\x1b[6n");

    assert_eq!(sent(&term), "\x1b[6;4R");
}

#[test]
fn osc_title_with_st_and_partial() {
    let mut term = terminal();
    term.feed(b"\x1b]0;hello\x1b\\");

    assert_eq!(term.title(), "hello");
    assert_eq!(term.icon_title(), "hello");
    assert_eq!(
        term.delegate().titles,
        vec![(TitleKind::Both, "hello".to_string())]
    );

    // a partial OSC must not touch the title
    term.feed(b"\x1b]0;hel");
    assert_eq!(term.title(), "hello");
    assert_eq!(term.delegate().titles.len(), 1);
}

#[test]
fn wide_char_wraps_from_last_column() {
    let mut term = terminal();
    term.feed(&[b'x'; 79]);
    term.feed("あ".as_bytes());

    let Some(row0) = term.line(0) else {
        panic!("row 0 missing")
    };
    assert!(row0.resolve_cell(79).is_blank());

    let Some(row1) = term.line(1) else {
        panic!("row 1 missing")
    };
    assert!(row1.resolve_cell(0).is_head());
    assert!(row1.resolve_cell(1).is_continuation());
    assert_eq!(term.cursor().pos.y, 1);
    assert_eq!(term.cursor().pos.x, 2);
}

#[test]
fn ech_restores_default_attribute() {
    let mut term = terminal();
    term.feed(b"\x1b[41mA\x1b[0m\x1b[H\x1b[X");

    let Some(row) = term.line(0) else {
        panic!("row 0 missing")
    };
    let cell = row.resolve_cell(0);
    assert!(cell.is_blank());
    assert_eq!(cell.attr(), &Attribute::default());
}

#[test]
fn decsc_decrc_round_trips_everything() {
    let mut term = terminal();
    term.feed(b"\x1b[3;7H\x1b[1;33m");
    term.feed(b"\x1b7"); // DECSC
    term.feed(b"\x1b[H\x1b[0m\x1b[44m\x1b(0");
    term.feed(b"\x1b8"); // DECRC

    assert_eq!(term.cursor().pos.y, 2);
    assert_eq!(term.cursor().pos.x, 6);
    assert!(term.current_attribute().flags.contains(StyleFlags::BOLD));
    assert_eq!(term.current_attribute().fg, TerminalColor::Yellow);

    // charset was restored to ASCII: 'q' prints as 'q', not a line glyph
    term.feed(b"q");
    let Some(row) = term.line(2) else {
        panic!("row 2 missing")
    };
    assert_eq!(row.resolve_cell(6).base(), 'q');
}

#[test_log::test]
fn alternate_screen_round_trip() {
    let mut term = terminal();
    term.feed(b"normal text\x1b[5;10H");
    term.feed(b"\x1b[?1049h");
    assert!(term.is_alternate());
    assert_eq!(row_text(&term, 0), "");

    term.feed(b"full screen app");
    term.feed(b"\x1b[?1049l");

    assert!(!term.is_alternate());
    assert_eq!(row_text(&term, 0), "normal text");
    assert_eq!(term.cursor().pos.y, 4);
    assert_eq!(term.cursor().pos.x, 9);
}

#[test]
fn legacy_alt_screen_47_does_not_save_cursor() {
    let mut term = terminal();
    term.feed(b"\x1b[3;3H");
    term.feed(b"\x1b[?47h");
    assert!(term.is_alternate());
    term.feed(b"\x1b[?47l");
    assert!(!term.is_alternate());
}

#[test]
fn da1_reply_matches_declared_feature_set() {
    let mut term = terminal();
    term.feed(b"\x1b[c");
    assert_eq!(sent(&term), "\x1b[?65;1;6;9;15;22c");
}

#[test]
fn da2_da3_and_xtversion() {
    let mut term = terminal();
    term.feed(b"\x1b[>c");
    assert_eq!(sent(&term), "\x1b[>41;377;0c");

    let mut term = terminal();
    term.feed(b"\x1b[=c");
    assert_eq!(sent(&term), "\x1bP!|00000000\x1b\\");

    let mut term = terminal();
    term.feed(b"\x1b[>q");
    let reply = sent(&term);
    assert!(reply.starts_with("\x1bP>|corvid "));
    assert!(reply.ends_with("\x1b\\"));
}

#[test]
fn decrqm_reports_live_state() {
    let mut term = terminal();
    term.feed(b"\x1b[?2004$p");
    assert_eq!(sent(&term), "\x1b[?2004;2$y");

    term.delegate_mut().sent.clear();
    term.feed(b"\x1b[?2004h\x1b[?2004$p");
    assert_eq!(sent(&term), "\x1b[?2004;1$y");

    term.delegate_mut().sent.clear();
    term.feed(b"\x1b[?31337$p");
    assert_eq!(sent(&term), "\x1b[?31337;0$y");
}

#[test]
fn decrqss_reports_margins_and_sgr() {
    let mut term = terminal();
    term.feed(b"\x1b[3;10r");
    term.feed(b"\x1bP$qr\x1b\\");
    assert_eq!(sent(&term), "\x1bP1$r3;10r\x1b\\");

    term.delegate_mut().sent.clear();
    term.feed(b"\x1b[1;31m");
    term.feed(b"\x1bP$qm\x1b\\");
    assert_eq!(sent(&term), "\x1bP1$r0;1;31m\x1b\\");
}

#[test]
fn scroll_region_keeps_lines_out_of_history() {
    let mut term = terminal_sized(10, 6);
    term.feed(b"\x1b[2;4r"); // margins rows 2..4
    term.feed(b"\x1b[4;1H");
    for _ in 0..10 {
        term.feed(b"\n");
    }
    assert_eq!(term.delegate().scrolled_out, 0);
    assert_eq!(term.active_buffer().max_scroll_offset(), 0);
}

#[test]
fn full_screen_scrolls_feed_history_and_notify() {
    let mut term = terminal_sized(10, 4);
    for i in 0..8 {
        term.feed(format!("line{i}\r\n").as_bytes());
    }
    assert!(term.delegate().scrolled_out >= 4);
    assert!(term.active_buffer().max_scroll_offset() > 0);
}

#[test]
fn bracketed_paste_wraps_text() {
    let mut term = terminal();
    term.send_paste("plain");
    assert_eq!(sent(&term), "plain");

    term.delegate_mut().sent.clear();
    term.feed(b"\x1b[?2004h");
    term.send_paste("wrapped");
    assert_eq!(sent(&term), "\x1b[200~wrapped\x1b[201~");
}

#[test]
fn application_cursor_keys_follow_decckm() {
    let mut term = terminal();
    term.send_key(&TerminalKey::ArrowUp);
    assert_eq!(sent(&term), "\x1b[A");

    term.delegate_mut().sent.clear();
    term.feed(b"\x1b[?1h");
    term.send_key(&TerminalKey::ArrowUp);
    assert_eq!(sent(&term), "\x1bOA");
}

#[test]
fn sgr_mouse_reporting() {
    let mut term = terminal();
    let press = MouseEvent {
        kind: MouseEventKind::Press,
        button: MouseButton::Left,
        modifiers: MouseModifiers::empty(),
        col: 4,
        row: 2,
    };

    // tracking disabled: nothing is sent
    term.send_mouse(&press);
    assert_eq!(sent(&term), "");

    term.feed(b"\x1b[?1000h\x1b[?1006h");
    term.send_mouse(&press);
    assert_eq!(sent(&term), "\x1b[<0;5;3M");
}

#[test]
fn focus_reporting_is_gated_by_mode() {
    let mut term = terminal();
    term.focus_changed(true);
    assert_eq!(sent(&term), "");

    term.feed(b"\x1b[?1004h");
    term.focus_changed(true);
    term.focus_changed(false);
    assert_eq!(sent(&term), "\x1b[I\x1b[O");
}

#[test]
fn dec_special_graphics_translate() {
    let mut term = terminal();
    term.feed(b"\x1b(0qx\x1b(Bq");

    let Some(row) = term.line(0) else {
        panic!("row 0 missing")
    };
    assert_eq!(row.resolve_cell(0).base(), '─');
    assert_eq!(row.resolve_cell(1).base(), '│');
    assert_eq!(row.resolve_cell(2).base(), 'q');
}

#[test]
fn single_shift_applies_to_one_character() {
    let mut term = terminal();
    term.feed(b"\x1b*0"); // G2 := DEC special graphics
    term.feed(b"\x1bNqq"); // SS2 shifts exactly one character

    let Some(row) = term.line(0) else {
        panic!("row 0 missing")
    };
    assert_eq!(row.resolve_cell(0).base(), '─');
    assert_eq!(row.resolve_cell(1).base(), 'q');
}

#[test]
fn newline_mode_adds_carriage_return() {
    let mut term = terminal();
    term.feed(b"ab\ncd");
    assert_eq!(term.cursor().pos.x, 4);

    let mut term = terminal();
    term.feed(b"\x1b[20h");
    term.feed(b"ab\ncd");
    assert_eq!(row_text(&term, 1), "cd");
    assert_eq!(term.cursor().pos.x, 2);
}

#[test]
fn decaln_fills_the_screen() {
    let mut term = terminal_sized(5, 3);
    term.feed(b"\x1b#8");
    for y in 0..3 {
        assert_eq!(row_text(&term, y), "EEEEE");
    }
}

#[test]
fn tabs_default_every_eight_columns() {
    let mut term = terminal();
    term.feed(b"\tX");
    let Some(row) = term.line(0) else {
        panic!("row 0 missing")
    };
    assert_eq!(row.resolve_cell(8).base(), 'X');
}

#[test]
fn osc8_hyperlinks_attach_to_cells() {
    let mut term = terminal();
    term.feed(b"\x1b]8;;https://example.com\x1b\\link\x1b]8;;\x1b\\plain");

    let Some(row) = term.line(0) else {
        panic!("row 0 missing")
    };
    assert!(row.resolve_cell(0).attr().url_id.is_some());
    assert!(row.resolve_cell(4).attr().url_id.is_none());

    term.activate_hyperlink_at(0, 0);
    assert_eq!(
        term.delegate().hyperlinks,
        vec![(1, "https://example.com".to_string())]
    );
}

#[test]
fn osc52_clipboard_goes_to_delegate() {
    let mut term = terminal();
    term.feed(b"\x1b]52;c;aGVsbG8=\x07");
    assert_eq!(
        term.delegate().clipboard_sets,
        vec![("c".to_string(), b"aGVsbG8=".to_vec())]
    );
}

#[test]
fn osc_palette_query_round_trips() {
    let mut term = terminal();
    term.feed(b"\x1b]4;1;#102030\x07");
    term.feed(b"\x1b]4;1;?\x07");
    assert_eq!(sent(&term), "\x1b]4;1;rgb:1010/2020/3030\x1b\\");

    term.delegate_mut().sent.clear();
    term.feed(b"\x1b]104;1\x07\x1b]4;1;?\x07");
    assert_eq!(sent(&term), "\x1b]4;1;rgb:cdcd/0000/0000\x1b\\");
}

#[test]
fn osc133_semantic_prompts_reach_delegate() {
    let mut term = terminal();
    term.feed(b"\x1b]133;A\x07\x1b]133;D;0\x07");
    assert_eq!(
        term.delegate().prompts,
        vec![
            SemanticPrompt::PromptStart,
            SemanticPrompt::CommandFinished(Some(0))
        ]
    );
}

#[test]
fn sixel_payload_is_delivered_with_geometry() {
    let mut term = terminal();
    term.feed(b"\x1bP0;0;0q\"1;1;20;10#0;2;0;0;0~~-\x1b\\");
    assert_eq!(term.delegate().images.len(), 1);
    let (format, width, height, _) = term.delegate().images[0];
    assert_eq!(format, ImageFormat::Sixel);
    assert_eq!((width, height), (20, 10));
}

#[test]
fn bell_reaches_delegate() {
    let mut term = terminal();
    term.feed(b"\x07");
    assert_eq!(term.delegate().bells, 1);
}

#[test]
fn ris_resets_modes_and_grid() {
    let mut term = terminal();
    term.feed(b"\x1b[?1049h\x1b[1;31mgarbage\x1b[?2004h\x1b[5;10r");
    term.feed(b"\x1bc");

    assert!(!term.is_alternate());
    assert_eq!(term.current_attribute(), &Attribute::default());
    assert!(!term.modes().bracketed_paste.enabled());
    assert_eq!(row_text(&term, 0), "");
    assert_eq!(term.cursor().pos.x, 0);
    assert_eq!(term.cursor().pos.y, 0);
}

#[test]
fn resize_validates_arguments() {
    let mut term = terminal();
    assert!(term.set_size(0, 10).is_err());
    assert!(term.set_size(100, 30).is_ok());
    assert_eq!(term.active_buffer().width(), 100);
    assert_eq!(term.active_buffer().height(), 30);
}

#[test]
fn selection_survives_and_extracts() {
    let mut term = terminal();
    term.feed(b"hello world");
    term.selection_begin(
        corvid_buffer::selection::SelectionMode::Word,
        7,
        0,
    );
    term.selection_extend(7, 0);
    let text = term.selected_text(Default::default());
    assert_eq!(text.as_deref(), Some("world"));

    term.selection_clear();
    assert!(term.selected_text(Default::default()).is_none());
}

#[test]
fn origin_mode_affects_cursor_report() {
    let mut term = terminal_sized(20, 10);
    term.feed(b"\x1b[3;8r\x1b[?6h\x1b[2;2H\x1b[6n");
    // origin row 2 inside the region is absolute row 4; the report stays
    // region-relative
    assert_eq!(sent(&term), "\x1b[2;2R");
}
