mod common;

use common::{OPENER, TestContext};
use predicates::prelude::*;

#[test]
fn dry_run_chat_shows_first_question_prompt_and_ends_on_quit() {
    let ctx = TestContext::new();
    ctx.cli()
        .args(["chat", "--dry-run", "--discipline", "mechanical engineering"])
        .write_stdin(format!("{}\nquit\n", OPENER))
        .assert()
        .success()
        .stdout(predicate::str::contains("Tutor [Question 1/10]"))
        .stdout(predicate::str::contains("[dry-run]"))
        .stdout(predicate::str::contains("If building a bridge requires"))
        .stdout(predicate::str::contains("Session ended"));
}

#[test]
fn dry_run_chat_hints_then_advances() {
    let ctx = TestContext::new();
    ctx.cli()
        .args(["chat", "--dry-run", "--discipline", "physics", "--message", OPENER])
        .write_stdin("only the steel tonnage matters\nthe foregone alternative is the houses\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tutor [Hint, question 1/10]"))
        .stdout(predicate::str::contains("Tutor [Question 2/10]"));
}

#[test]
fn dry_run_chat_asks_for_clarification_on_vague_opener() {
    let ctx = TestContext::new();
    ctx.cli()
        .args(["chat", "--dry-run", "--discipline", "physics"])
        .write_stdin("hello there\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tutor [Tell me more]"));
}

#[test]
fn discipline_is_read_from_input_when_not_a_terminal() {
    let ctx = TestContext::new();
    ctx.cli()
        .args(["chat", "--dry-run"])
        .write_stdin(format!("underwater basket weaving\n{}\n", OPENER))
        .assert()
        .success()
        .stdout(predicate::str::contains("primary discipline is underwater basket weaving"));
}
