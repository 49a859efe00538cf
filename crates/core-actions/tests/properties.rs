//! Property-based checks for the commands whose results have a closed form.

mod common;

use common::*;
use core_actions::{NormalCommand, Session};
use core_state::{RegisterName, RegisterOperation, RegisterValue};
use core_text::Position;
use proptest::prelude::*;

proptest! {
    // `{L}x` at column C removes exactly [C, C+L) and leaves the caret on C
    // or the new last character.
    #[test]
    fn counted_x_removes_the_span(text in "[a-z ]{1,40}", c in 0usize..40, l in 1usize..40) {
        let c = c % text.len();
        let l = 1 + (l - 1) % (text.len() - c);
        let mut host = host_with(&text);
        let mut session = Session::new();
        host.set_caret(0, c);
        host.run(&mut session, NormalCommand::DeleteCharacterAtCaret, count(l));
        let expected = format!("{}{}", &text[..c], &text[c + l..]);
        let caret = if c < expected.len() { c } else { expected.len().saturating_sub(1) };
        prop_assert_eq!(host.text(), expected);
        prop_assert_eq!(host.caret(), Position::new(0, caret));
        prop_assert_eq!(
            session.registers.get_register(RegisterName::Unnamed).value.text(),
            text[c..c + l].to_string()
        );
    }

    #[test]
    fn join_uses_a_single_space(first in "[a-z]{1,8}", indent in " {0,4}", second in "[a-z]{1,8}") {
        let mut host = host_with(&format!("{first}\n{indent}{second}"));
        let mut session = Session::new();
        host.feed(&mut session, "J");
        prop_assert_eq!(host.text(), format!("{first} {second}"));
        prop_assert_eq!(host.caret(), Position::new(0, first.len()));
    }

    // `p` of a one-line character run at P puts the caret at P + len.
    #[test]
    fn put_after_lands_on_last_character(text in "[a-z]{1,20}", reg in "[A-Z]{1,5}", p in 0usize..20) {
        let p = p % text.len();
        let mut host = host_with(&text);
        let mut session = Session::new();
        session.registers.set_register_value(
            RegisterName::Unnamed,
            RegisterOperation::Yank,
            RegisterValue::characters(reg.clone()),
        );
        host.set_caret(0, p);
        host.feed(&mut session, "p");
        prop_assert_eq!(host.text(), format!("{}{}{}", &text[..=p], reg, &text[p + 1..]));
        prop_assert_eq!(host.caret(), Position::new(0, p + reg.len()));
    }

    // Repeating is the same as issuing the stored command again.
    #[test]
    fn repeat_equals_reissue(text in "[a-z]{2,30}", n in 1usize..4, c1 in 0usize..30, c2 in 0usize..30) {
        let mut repeated = host_with(&text);
        let mut reissued = host_with(&text);
        let mut session = Session::new();
        for host in [&mut repeated, &mut reissued] {
            host.set_caret(0, c1 % text.len());
            host.run(&mut session, NormalCommand::DeleteCharacterAtCaret, count(n));
            host.set_caret(0, c2);
        }
        repeated.run(&mut session, NormalCommand::RepeatLastCommand, Default::default());
        reissued.run(&mut session, NormalCommand::DeleteCharacterAtCaret, count(n));
        prop_assert_eq!(repeated.text(), reissued.text());
        prop_assert_eq!(repeated.caret(), reissued.caret());
    }
}
