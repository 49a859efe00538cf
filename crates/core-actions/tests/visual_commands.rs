mod common;

use common::*;
use core_actions::{ModeKind, Session, VisualCommand, VisualSpan};
use core_config::Settings;
use core_state::{OperationKind, RegisterName, RegisterOperation, RegisterValue};
use core_text::{LineRange, Position};
use pretty_assertions::assert_eq;

fn spaces(shift_width: usize) -> Settings {
    Settings {
        shift_width,
        expand_tab: true,
        ..Settings::default()
    }
}

fn register_text(session: &Session, name: RegisterName) -> String {
    session.registers.get_register(name).value.text()
}

#[test]
fn characterwise_delete_includes_caret_character() {
    let mut host = host_with("abcdef");
    let mut session = Session::new();
    host.set_caret(0, 1);
    host.feed(&mut session, "vld");
    assert_eq!(host.text(), "adef");
    assert_eq!(host.caret(), Position::new(0, 1));
    assert_eq!(host.mode, ModeKind::Normal);
    assert_eq!(host.active().selection(), None);
    assert_eq!(register_text(&session, RegisterName::Unnamed), "bc");
}

#[test]
fn delete_into_named_register_mirrors_unnamed() {
    let mut host = host_with("abcdef");
    let mut session = Session::new();
    host.set_caret(0, 1);
    host.feed(&mut session, "vl\"ad");
    assert_eq!(host.text(), "adef");
    assert_eq!(register_text(&session, RegisterName::Named('a')), "bc");
    assert_eq!(register_text(&session, RegisterName::Unnamed), "bc");
}

#[test]
fn linewise_delete() {
    let mut host = host_with("a\nb\nc");
    let mut session = Session::new();
    host.feed(&mut session, "Vjd");
    assert_eq!(host.text(), "c");
    let reg = session.registers.get_register(RegisterName::Unnamed);
    assert_eq!(reg.value.text(), "a\nb\n");
    assert_eq!(reg.value.kind, OperationKind::LineWise);
}

#[test]
fn capital_d_widens_characterwise_to_lines() {
    let mut host = host_with("abc\ndef\nghi");
    let mut session = Session::new();
    host.set_caret(0, 1);
    host.feed(&mut session, "vjD");
    assert_eq!(host.text(), "ghi");
}

#[test]
fn yank_returns_to_normal_at_selection_start() {
    let mut host = host_with("abcdef");
    let mut session = Session::new();
    host.set_caret(0, 3);
    host.feed(&mut session, "vhhy");
    assert_eq!(host.mode, ModeKind::Normal);
    assert_eq!(host.text(), "abcdef");
    assert_eq!(host.caret(), Position::new(0, 1));
    assert_eq!(register_text(&session, RegisterName::Unnamed), "bcd");
    assert_eq!(session.last_command(), None);
}

#[test]
fn escape_leaves_visual_without_editing() {
    let mut host = host_with("abc");
    let mut session = Session::new();
    host.feed(&mut session, "vl<Esc>");
    assert_eq!(host.mode, ModeKind::Normal);
    assert_eq!(host.text(), "abc");
    assert_eq!(host.caret(), Position::new(0, 1));
}

#[test]
fn block_shift_right_skips_short_lines() {
    let mut host = host_with_settings("abcdef\nab\nabcdef", spaces(4));
    let mut session = Session::new();
    host.set_caret(0, 2);
    host.feed(&mut session, "<C-v>2j>");
    assert_eq!(host.text(), "ab    cdef\nab\nab    cdef");
    assert_eq!(host.caret(), Position::new(0, 2));
    assert_eq!(host.mode, ModeKind::Normal);
}

#[test]
fn block_shift_left_removes_available_whitespace() {
    let mut host = host_with_settings("ab    cdef\nab\nab  cdef", spaces(4));
    let mut session = Session::new();
    host.set_caret(0, 2);
    host.feed(&mut session, "<C-v>2j<");
    assert_eq!(host.text(), "abcdef\nab\nabcdef");
}

#[test]
fn line_shift_uses_count_as_multiplier() {
    let mut host = host_with_settings("a\nb", spaces(2));
    let mut session = Session::new();
    host.feed(&mut session, "Vj3>");
    assert_eq!(host.text(), "      a\n      b");
}

#[test]
fn join_selection() {
    let mut host = host_with("a\nb\nc");
    let mut session = Session::new();
    host.feed(&mut session, "VjJ");
    assert_eq!(host.text(), "a b\nc");

    // a one-line selection still joins two lines
    let mut host = host_with("a\n  b\nc");
    host.feed(&mut session, "vgJ");
    assert_eq!(host.text(), "a  b\nc");
}

#[test]
fn replace_and_case_change_selection() {
    let mut host = host_with("abcdef\nxyz");
    let mut session = Session::new();
    host.feed(&mut session, "vlr*");
    assert_eq!(host.text(), "**cdef\nxyz");
    host.feed(&mut session, "vjU");
    assert_eq!(host.text(), "**CDEF\nXyz");
    assert_eq!(host.caret(), Position::new(0, 0));
}

#[test]
fn put_over_selection_swaps_into_unnamed() {
    let mut host = host_with("abc def");
    let mut session = Session::new();
    session.registers.set_register_value(
        RegisterName::Named('a'),
        RegisterOperation::Yank,
        RegisterValue::characters("XY"),
    );
    host.feed(&mut session, "vl\"ap");
    assert_eq!(host.text(), "XYc def");
    assert_eq!(register_text(&session, RegisterName::Unnamed), "ab");
    assert_eq!(register_text(&session, RegisterName::Named('a')), "XY");
    host.feed(&mut session, "u");
    assert_eq!(host.text(), "abc def");
}

#[test]
fn put_lines_over_line_selection() {
    let mut session = Session::new();
    session.registers.set_register_value(
        RegisterName::Unnamed,
        RegisterOperation::Yank,
        RegisterValue::lines("x\n"),
    );

    let mut host = host_with("a\nb\nc");
    host.set_caret(1, 0);
    host.feed(&mut session, "Vp");
    assert_eq!(host.text(), "a\nx\nc");
    assert_eq!(register_text(&session, RegisterName::Unnamed), "b\n");

    let mut host = host_with("a\nb\nc");
    host.set_caret(2, 0);
    session.registers.set_register_value(
        RegisterName::Unnamed,
        RegisterOperation::Yank,
        RegisterValue::lines("x\n"),
    );
    host.feed(&mut session, "Vp");
    assert_eq!(host.text(), "a\nb\nx");
}

#[test]
fn change_line_selection_keeps_indent() {
    let mut host = host_with("  a\nb\nc");
    let mut session = Session::new();
    host.feed(&mut session, "VjcX<Esc>");
    assert_eq!(host.text(), "  X\nc");
    host.feed(&mut session, "u");
    assert_eq!(host.text(), "  a\nb\nc");
}

#[test]
fn fold_selection() {
    let mut host = host_with("a\nb\nc");
    let mut session = Session::new();
    host.feed(&mut session, "Vjzf");
    assert_eq!(host.active().folds().folds()[0].range, LineRange::new(0, 2));
    host.feed(&mut session, "VGzD");
    assert!(host.active().folds().folds().is_empty());
}

#[test]
fn visual_delete_repeats_with_same_shape() {
    let mut host = host_with("abcdef");
    let mut session = Session::new();
    host.feed(&mut session, "vld");
    assert_eq!(host.text(), "cdef");
    host.feed(&mut session, ".");
    assert_eq!(host.text(), "ef");

    let mut host = host_with("a\nb\nc\nd\ne");
    host.feed(&mut session, "Vjd.");
    assert_eq!(host.text(), "e");
}

#[test]
fn visual_change_repeats_with_typed_text() {
    let mut host = host_with("abcdef");
    let mut session = Session::new();
    host.feed(&mut session, "vlcZ<Esc>");
    assert_eq!(host.text(), "Zcdef");
    assert_eq!(host.caret(), Position::new(0, 0));
    host.feed(&mut session, ".");
    assert_eq!(host.text(), "Zdef");
}

#[test]
fn executor_accepts_span_directly() {
    let mut host = host_with("one\ntwo\nthree");
    let mut session = Session::new();
    host.run_visual(
        &mut session,
        VisualCommand::DeleteSelection,
        register('b'),
        &VisualSpan::Line(LineRange::new(1, 1)),
    );
    assert_eq!(host.text(), "one\nthree");
    assert_eq!(register_text(&session, RegisterName::Named('b')), "two\n");
}
